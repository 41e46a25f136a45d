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

//! The six constant buffers of the clustered forward effect.

use super::dispose::DisposeQueue;
use lumina_core::renderer::{
    BufferDescriptor, BufferId, ClipPlaneUniforms, DeviceContext, GlobalLightingUniforms,
    GraphicsDevice, LightArrayUniforms, MaterialUniforms, MatricesUniforms, ReflectionUniforms,
    ResourceError, StageSlot, UpdateFrequency,
};
use std::mem::size_of;

/// `VS b0`: world, view and projection.
pub const MATRICES_SLOT: StageSlot = StageSlot::vertex(0);
/// `VS b1`: user clip plane.
pub const CLIP_PLANE_SLOT: StageSlot = StageSlot::vertex(1);
/// `VS b2`: reflection transform.
pub const REFLECTION_SLOT: StageSlot = StageSlot::vertex(2);
/// `PS b0`: material parameters.
pub const MATERIAL_SLOT: StageSlot = StageSlot::pixel(0);
/// `PS b1`: ambient term and camera position.
pub const GLOBAL_LIGHTING_SLOT: StageSlot = StageSlot::pixel(1);
/// `PS b2`: light array.
pub const LIGHTS_SLOT: StageSlot = StageSlot::pixel(2);

/// A constant buffer bound to a fixed stage slot.
///
/// The update frequency chosen at creation decides how [`ConstantBuffer::write`]
/// uploads: `PerFrame` buffers are mapped with discard, `Rare` buffers are
/// replaced whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantBuffer {
    id: BufferId,
    label: &'static str,
    size: u64,
    frequency: UpdateFrequency,
    slot: StageSlot,
}

impl ConstantBuffer {
    /// Creates a constant buffer of `size` bytes.
    pub fn create(
        device: &dyn GraphicsDevice,
        label: &'static str,
        size: u64,
        frequency: UpdateFrequency,
        slot: StageSlot,
    ) -> Result<Self, ResourceError> {
        let id = device.create_buffer(&BufferDescriptor::constant(label, size, frequency))?;
        log::debug!("Created constant buffer '{label}' ({size} bytes, {frequency:?}) for {slot}");
        Ok(Self {
            id,
            label,
            size,
            frequency,
            slot,
        })
    }

    /// Creates a constant buffer sized for `T`.
    pub fn for_uniform<T: bytemuck::Pod>(
        device: &dyn GraphicsDevice,
        label: &'static str,
        frequency: UpdateFrequency,
        slot: StageSlot,
    ) -> Result<Self, ResourceError> {
        Self::create(device, label, size_of::<T>() as u64, frequency, slot)
    }

    /// The buffer handle.
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// The debug label.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// The size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The update frequency.
    pub fn frequency(&self) -> UpdateFrequency {
        self.frequency
    }

    /// The stage slot the buffer binds to.
    pub fn slot(&self) -> StageSlot {
        self.slot
    }

    /// Binds the buffer to its slot.
    pub fn bind(&self, ctx: &mut dyn DeviceContext) {
        ctx.set_constant_buffer(self.slot, self.id);
    }

    /// Uploads `data`, which must be exactly the buffer's size.
    pub fn write(&self, ctx: &mut dyn DeviceContext, data: &[u8]) -> Result<(), ResourceError> {
        if data.len() as u64 != self.size {
            log::error!(
                "Write of {} bytes to constant buffer '{}' of {} bytes",
                data.len(),
                self.label,
                self.size
            );
            return Err(ResourceError::OutOfBounds);
        }
        match self.frequency {
            UpdateFrequency::PerFrame => ctx.write_discard(self.id, data),
            UpdateFrequency::Rare => ctx.update_subresource(self.id, data),
        }
    }

    /// Uploads a `Pod` value.
    pub fn write_value<T: bytemuck::Pod>(
        &self,
        ctx: &mut dyn DeviceContext,
        value: &T,
    ) -> Result<(), ResourceError> {
        self.write(ctx, bytemuck::bytes_of(value))
    }
}

/// Owns the constant buffers the effect binds every frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuResourceSet {
    /// Per-draw transforms.
    pub matrices: ConstantBuffer,
    /// Clip plane.
    pub clip_plane: ConstantBuffer,
    /// Reflection transform.
    pub reflection: ConstantBuffer,
    /// Material parameters.
    pub material: ConstantBuffer,
    /// Ambient term and camera position.
    pub global_lighting: ConstantBuffer,
    /// Light array.
    pub lights: ConstantBuffer,
}

impl GpuResourceSet {
    /// Creates all six buffers, registering each with `dispose` as soon as it exists.
    ///
    /// If a creation fails, the buffers created before it stay registered and are
    /// released with the rest of the queue.
    pub fn create(
        device: &dyn GraphicsDevice,
        dispose: &mut DisposeQueue,
    ) -> Result<Self, ResourceError> {
        use UpdateFrequency::{PerFrame, Rare};

        let mut make = |buffer: Result<ConstantBuffer, ResourceError>| {
            buffer.inspect(|b| dispose.register(b.id()))
        };
        let matrices = make(ConstantBuffer::for_uniform::<MatricesUniforms>(
            device,
            "Matrices",
            PerFrame,
            MATRICES_SLOT,
        ))?;
        let clip_plane = make(ConstantBuffer::for_uniform::<ClipPlaneUniforms>(
            device,
            "Clip Plane",
            PerFrame,
            CLIP_PLANE_SLOT,
        ))?;
        let reflection = make(ConstantBuffer::for_uniform::<ReflectionUniforms>(
            device,
            "Reflection",
            PerFrame,
            REFLECTION_SLOT,
        ))?;
        let material = make(ConstantBuffer::for_uniform::<MaterialUniforms>(
            device,
            "Material",
            PerFrame,
            MATERIAL_SLOT,
        ))?;
        let global_lighting = make(ConstantBuffer::for_uniform::<GlobalLightingUniforms>(
            device,
            "Global Lighting",
            Rare,
            GLOBAL_LIGHTING_SLOT,
        ))?;
        let lights = make(ConstantBuffer::for_uniform::<LightArrayUniforms>(
            device,
            "Lights",
            PerFrame,
            LIGHTS_SLOT,
        ))?;

        Ok(Self {
            matrices,
            clip_plane,
            reflection,
            material,
            global_lighting,
            lights,
        })
    }

    /// The buffers in binding order.
    pub fn buffers(&self) -> [&ConstantBuffer; 6] {
        [
            &self.matrices,
            &self.clip_plane,
            &self.reflection,
            &self.material,
            &self.global_lighting,
            &self.lights,
        ]
    }

    /// Binds every buffer to its slot.
    pub fn bind_all(&self, ctx: &mut dyn DeviceContext) {
        for buffer in self.buffers() {
            buffer.bind(ctx);
        }
    }
}
