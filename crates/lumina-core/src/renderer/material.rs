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

//! Materials: named sets of surface parameters that own GPU resources.

use crate::renderer::api::{GpuResource, MaterialUniforms};
use crate::renderer::error::ResourceError;
use crate::renderer::traits::GraphicsDevice;
use std::fmt::Debug;

/// A surface description an effect can look up by name.
pub trait Material: Debug + Send {
    /// The material's name.
    fn name(&self) -> &str;

    /// Renames the material.
    fn set_name(&mut self, name: String);

    /// The parameters copied into the material constant buffer when in use.
    fn uniforms(&self) -> MaterialUniforms;

    /// Releases any GPU objects the material owns. Called once at teardown.
    fn release(&mut self, device: &dyn GraphicsDevice) -> Result<(), ResourceError>;
}

/// A material defined by constant parameters plus any textures or buffers it owns.
#[derive(Debug, Clone, Default)]
pub struct StandardMaterial {
    name: String,
    /// The shading parameters.
    pub uniforms: MaterialUniforms,
    resources: Vec<GpuResource>,
}

impl StandardMaterial {
    /// Creates a material with default parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Creates a material with the given parameters.
    pub fn with_uniforms(name: impl Into<String>, uniforms: MaterialUniforms) -> Self {
        Self {
            name: name.into(),
            uniforms,
            resources: Vec::new(),
        }
    }

    /// Hands ownership of a GPU object to the material.
    pub fn own_resource(&mut self, resource: impl Into<GpuResource>) {
        self.resources.push(resource.into());
    }

    /// The GPU objects the material still owns.
    pub fn resources(&self) -> &[GpuResource] {
        &self.resources
    }
}

impl Material for StandardMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn uniforms(&self) -> MaterialUniforms {
        self.uniforms
    }

    fn release(&mut self, device: &dyn GraphicsDevice) -> Result<(), ResourceError> {
        // Release everything before reporting the first failure.
        let mut first_error = None;
        for resource in self.resources.drain(..) {
            if let Err(e) = resource.release(device) {
                log::warn!("Material '{}' failed to release {resource:?}: {e}", self.name);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
