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

//! Light sources and the channel that carries their state changes to an effect.
//!
//! A [`Light`] is owned by scene code. Once registered with an effect it holds a
//! [`LightLink`]: every mutation packs a fresh [`LightParams`] snapshot and sends it,
//! tagged with the light's [`LightHandle`], to the effect's registry. The registry
//! drops snapshots whose handle generation no longer matches the slot, so a light
//! removed and a new one added in the same slot never see each other's updates.

use crate::math::{LinearRgba, Vec3};
use crate::renderer::api::GpuLight;

/// The kind of a light source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LightKind {
    /// Infinitely distant light with parallel rays and no falloff.
    #[default]
    Directional,
    /// Omnidirectional light with distance falloff.
    Point,
    /// Cone-shaped light with distance and angular falloff.
    Spot,
}

impl LightKind {
    /// The value written to [`GpuLight::light_type`].
    pub const fn gpu_code(self) -> u32 {
        match self {
            LightKind::Directional => 0,
            LightKind::Point => 1,
            LightKind::Spot => 2,
        }
    }
}

/// The shading parameters of a light, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightParams {
    /// The kind of light.
    pub kind: LightKind,
    /// World-space position. Ignored by directional lights.
    pub position: Vec3,
    /// World-space direction the light points at. Ignored by point lights.
    pub direction: Vec3,
    /// Linear color.
    pub color: LinearRgba,
    /// Intensity multiplier.
    pub intensity: f32,
    /// Attenuation range in world units.
    pub range: f32,
    /// Spot cone half-angle in radians.
    pub spot_angle: f32,
    /// Whether the light contributes to shading.
    pub enabled: bool,
}

impl LightParams {
    /// A white point light at `position`.
    pub fn point(position: Vec3, range: f32) -> Self {
        Self {
            kind: LightKind::Point,
            position,
            range,
            ..Self::default()
        }
    }

    /// A white directional light pointing along `direction`.
    pub fn directional(direction: Vec3) -> Self {
        Self {
            kind: LightKind::Directional,
            direction: direction.normalize(),
            ..Self::default()
        }
    }

    /// A white spot light at `position` pointing along `direction`.
    pub fn spot(position: Vec3, direction: Vec3, range: f32, spot_angle: f32) -> Self {
        Self {
            kind: LightKind::Spot,
            position,
            direction: direction.normalize(),
            range,
            spot_angle,
            ..Self::default()
        }
    }

    /// Packs the parameters into the light array record.
    pub fn to_gpu(&self) -> GpuLight {
        GpuLight {
            position: [self.position.x, self.position.y, self.position.z, 1.0],
            direction: [self.direction.x, self.direction.y, self.direction.z, 0.0],
            color: [self.color.r, self.color.g, self.color.b, self.intensity],
            range: self.range,
            spot_cos: self.spot_angle.cos(),
            light_type: self.kind.gpu_code(),
            is_enabled: u32::from(self.enabled),
        }
    }
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            kind: LightKind::Directional,
            position: Vec3::ZERO,
            direction: Vec3::new(0.0, -1.0, 0.0),
            color: LinearRgba::WHITE,
            intensity: 1.0,
            range: 10.0,
            spot_angle: 30.0_f32.to_radians(),
            enabled: true,
        }
    }
}

/// Identifies a registered light: its slot index and the generation of that slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightHandle {
    /// The slot index in the light array, unique among live lights.
    pub index: u32,
    /// The slot generation at registration time.
    pub generation: u32,
}

/// A state change sent from a registered light to its registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightUpdate {
    /// The light the snapshot belongs to.
    pub handle: LightHandle,
    /// The light's parameters after the mutation.
    pub params: LightParams,
}

/// The connection between a registered light and its registry.
#[derive(Debug, Clone)]
pub struct LightLink {
    handle: LightHandle,
    sender: flume::Sender<LightUpdate>,
}

impl LightLink {
    /// Creates a link that reports updates for `handle` over `sender`.
    pub fn new(handle: LightHandle, sender: flume::Sender<LightUpdate>) -> Self {
        Self { handle, sender }
    }

    /// The handle this link reports for.
    pub fn handle(&self) -> LightHandle {
        self.handle
    }

    /// The channel updates travel over.
    pub fn sender(&self) -> &flume::Sender<LightUpdate> {
        &self.sender
    }

    fn send(&self, params: LightParams) {
        let update = LightUpdate {
            handle: self.handle,
            params,
        };
        if self.sender.send(update).is_err() {
            log::debug!(
                "Light update for slot {} dropped: registry is gone.",
                self.handle.index
            );
        }
    }
}

/// A light source owned by scene code.
#[derive(Debug, Default)]
pub struct Light {
    params: LightParams,
    link: Option<LightLink>,
}

impl Light {
    /// Creates an unregistered light.
    pub fn new(params: LightParams) -> Self {
        Self { params, link: None }
    }

    /// The current parameters.
    pub fn params(&self) -> &LightParams {
        &self.params
    }

    /// The registration handle, if the light is registered with an effect.
    pub fn handle(&self) -> Option<LightHandle> {
        self.link.as_ref().map(LightLink::handle)
    }

    /// The link to the registry the light is registered with.
    pub fn link(&self) -> Option<&LightLink> {
        self.link.as_ref()
    }

    /// Returns `true` if the light is registered with an effect.
    pub fn is_registered(&self) -> bool {
        self.link.is_some()
    }

    /// Connects the light to a registry. Replaces any previous link.
    pub fn connect(&mut self, link: LightLink) {
        self.link = Some(link);
    }

    /// Disconnects the light from its registry and returns the old link.
    pub fn disconnect(&mut self) -> Option<LightLink> {
        self.link.take()
    }

    /// Applies `f` to the parameters, then reports the new snapshot if registered.
    pub fn update(&mut self, f: impl FnOnce(&mut LightParams)) -> LightParams {
        f(&mut self.params);
        if let Some(link) = &self.link {
            link.send(self.params);
        }
        self.params
    }

    /// Moves the light.
    pub fn set_position(&mut self, position: Vec3) {
        self.update(|p| p.position = position);
    }

    /// Re-aims the light. The direction is normalized.
    pub fn set_direction(&mut self, direction: Vec3) {
        self.update(|p| p.direction = direction.normalize());
    }

    /// Changes the color and intensity.
    pub fn set_color(&mut self, color: LinearRgba, intensity: f32) {
        self.update(|p| {
            p.color = color;
            p.intensity = intensity;
        });
    }

    /// Enables or disables the light without unregistering it.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.update(|p| p.enabled = enabled);
    }
}
