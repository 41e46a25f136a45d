// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Constant-buffer layouts shared by the CPU side and the clustered forward shaders.
//!
//! Every structure here is `#[repr(C)]`, `Pod`, and a multiple of 16 bytes so it
//! can be copied into a constant buffer with `bytemuck::bytes_of`.

use crate::math::{LinearRgba, Mat4, Vec4};

/// The maximum number of lights the light array buffer holds.
pub const MAX_LIGHTS: usize = 32;

/// Per-draw transforms, bound to `VS b0`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MatricesUniforms {
    /// The object's world matrix.
    pub world: [[f32; 4]; 4],
    /// The camera view matrix.
    pub view: [[f32; 4]; 4],
    /// The projection matrix.
    pub projection: [[f32; 4]; 4],
}

impl MatricesUniforms {
    /// Packs the three transforms, transposed for row-major shader consumption.
    pub fn new(world: &Mat4, view: &Mat4, projection: &Mat4) -> Self {
        Self {
            world: world.transpose().to_cols_array_2d(),
            view: view.transpose().to_cols_array_2d(),
            projection: projection.transpose().to_cols_array_2d(),
        }
    }
}

impl Default for MatricesUniforms {
    fn default() -> Self {
        let identity = Mat4::IDENTITY.to_cols_array_2d();
        Self {
            world: identity,
            view: identity,
            projection: identity,
        }
    }
}

/// The user clip plane, bound to `VS b1`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ClipPlaneUniforms {
    /// Plane coefficients `(a, b, c, d)` with `ax + by + cz + d >= 0` kept.
    pub plane: [f32; 4],
}

impl ClipPlaneUniforms {
    /// A plane far enough away to keep the whole scene.
    pub const DEFAULT: Self = Self {
        plane: [-1.0, -1.0, -1.0, 1000.0],
    };

    /// Creates the uniform from plane coefficients.
    pub fn new(plane: Vec4) -> Self {
        Self {
            plane: plane.to_array(),
        }
    }
}

impl Default for ClipPlaneUniforms {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The planar reflection transform, bound to `VS b2`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ReflectionUniforms {
    /// The reflected view matrix, transposed for the shader.
    pub reflection: [[f32; 4]; 4],
}

impl ReflectionUniforms {
    /// Packs a reflection matrix.
    pub fn new(reflection: &Mat4) -> Self {
        Self {
            reflection: reflection.transpose().to_cols_array_2d(),
        }
    }
}

impl Default for ReflectionUniforms {
    fn default() -> Self {
        Self::new(&Mat4::IDENTITY)
    }
}

/// Surface shading parameters of the material currently in use, bound to `PS b0`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniforms {
    /// Emissive color.
    pub emissive: LinearRgba,
    /// Ambient reflectance.
    pub ambient: LinearRgba,
    /// Diffuse reflectance.
    pub diffuse: LinearRgba,
    /// Specular reflectance.
    pub specular: LinearRgba,
    /// Specular exponent.
    pub specular_power: f32,
    /// Non-zero when the diffuse texture should be sampled.
    pub use_texture: u32,
    /// Non-zero when the normal map should be sampled.
    pub use_normal_map: u32,
    /// Padding to a 16-byte boundary.
    pub _padding: u32,
}

impl Default for MaterialUniforms {
    fn default() -> Self {
        Self {
            emissive: LinearRgba::BLACK,
            ambient: LinearRgba::new(0.1, 0.1, 0.1, 1.0),
            diffuse: LinearRgba::WHITE,
            specular: LinearRgba::WHITE,
            specular_power: 128.0,
            use_texture: 0,
            use_normal_map: 0,
            _padding: 0,
        }
    }
}

/// Scene-wide lighting terms, bound to `PS b1`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalLightingUniforms {
    /// The global ambient color.
    pub global_ambient: LinearRgba,
    /// The camera position in world space (`w = 1`).
    pub camera_position: [f32; 4],
}

impl GlobalLightingUniforms {
    /// Creates the structure with the given ambient term and the camera at the origin.
    pub fn new(global_ambient: LinearRgba) -> Self {
        Self {
            global_ambient,
            camera_position: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Default for GlobalLightingUniforms {
    fn default() -> Self {
        Self::new(LinearRgba::DEFAULT_AMBIENT)
    }
}

/// A single light, packed for the light array.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLight {
    /// Position (xyz), `w = 1`.
    pub position: [f32; 4],
    /// Direction (xyz), `w = 0`.
    pub direction: [f32; 4],
    /// Color (rgb) and intensity (a).
    pub color: [f32; 4],
    /// Attenuation range in world units.
    pub range: f32,
    /// Cosine of the spot cone half-angle.
    pub spot_cos: f32,
    /// `0` directional, `1` point, `2` spot.
    pub light_type: u32,
    /// Non-zero when the slot holds a live light.
    pub is_enabled: u32,
}

impl GpuLight {
    /// A disabled, zeroed record.
    pub const DISABLED: Self = Self {
        position: [0.0; 4],
        direction: [0.0; 4],
        color: [0.0; 4],
        range: 0.0,
        spot_cos: 0.0,
        light_type: 0,
        is_enabled: 0,
    };

    /// Returns `true` if the slot holds a live light.
    pub fn enabled(&self) -> bool {
        self.is_enabled != 0
    }

    /// Returns a copy with position and direction transformed by `view`.
    pub fn to_view_space(&self, view: &Mat4) -> Self {
        let position = view.transform_point(Vec4::from_array(self.position));
        let direction = view.transform_direction(Vec4::from_array(self.direction));
        Self {
            position: position.to_array(),
            direction: direction.to_array(),
            ..*self
        }
    }
}

/// The fixed-size light array, bound to `PS b2`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightArrayUniforms {
    /// One record per slot; unused slots are disabled.
    pub lights: [GpuLight; MAX_LIGHTS],
}

impl Default for LightArrayUniforms {
    fn default() -> Self {
        Self {
            lights: [GpuLight::DISABLED; MAX_LIGHTS],
        }
    }
}
