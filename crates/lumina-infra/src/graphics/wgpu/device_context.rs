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

//! Immediate device context for the wgpu backend.

use super::device::WgpuDevice;
use lumina_core::renderer::api::{
    BufferId, BufferUsage, DepthStencilViewId, RenderTargetId, StageSlot, Viewport,
};
use lumina_core::renderer::error::ResourceError;
use lumina_core::renderer::traits::DeviceContext;
use std::collections::BTreeMap;

/// The immediate context of a [`WgpuDevice`].
///
/// Constant-buffer bindings, the viewport and the output targets are recorded
/// as pipeline state that render passes read when they are encoded. Buffer
/// writes go straight to the queue and land before the next submission.
#[derive(Debug)]
pub struct WgpuDeviceContext {
    device: WgpuDevice,
    constant_buffers: BTreeMap<StageSlot, BufferId>,
    viewport: Option<Viewport>,
    depth_stencil: Option<DepthStencilViewId>,
    color_targets: Vec<RenderTargetId>,
    /// Reused CPU copy for mapped write-discard emulation.
    staging: Vec<u8>,
    bytes_written: u64,
}

impl WgpuDeviceContext {
    /// Creates a context with no bindings that writes through `device`.
    pub fn new(device: WgpuDevice) -> Self {
        Self {
            device,
            constant_buffers: BTreeMap::new(),
            viewport: None,
            depth_stencil: None,
            color_targets: Vec::new(),
            staging: Vec::new(),
            bytes_written: 0,
        }
    }

    /// The device this context writes through.
    pub fn device(&self) -> &WgpuDevice {
        &self.device
    }

    /// The buffer bound at `slot`, if any.
    pub fn constant_buffer(&self, slot: StageSlot) -> Option<BufferId> {
        self.constant_buffers.get(&slot).copied()
    }

    /// All constant-buffer bindings, ordered by stage then slot.
    pub fn constant_buffers(&self) -> impl Iterator<Item = (StageSlot, BufferId)> + '_ {
        self.constant_buffers.iter().map(|(s, b)| (*s, *b))
    }

    /// The last viewport set, if any.
    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// The bound depth-stencil view and color targets.
    pub fn render_targets(&self) -> (Option<DepthStencilViewId>, &[RenderTargetId]) {
        (self.depth_stencil, &self.color_targets)
    }

    /// Total bytes pushed to the queue since creation.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Submits an empty command list so queued buffer writes are flushed.
    pub fn flush(&self) -> Result<(), ResourceError> {
        self.device.with_context(|context| {
            context.queue.submit(std::iter::empty());
            Ok(())
        })
    }

    fn write_whole(
        &mut self,
        buffer: &wgpu::Buffer,
        id: BufferId,
        data: &[u8],
    ) -> Result<(), ResourceError> {
        self.device.with_context(|context| {
            context.queue.write_buffer(buffer, 0, data);
            Ok(())
        })?;
        self.bytes_written += data.len() as u64;
        log::debug!(
            "WgpuDeviceContext: Wrote {} bytes to buffer ID: {:?}",
            data.len(),
            id
        );
        Ok(())
    }
}

impl DeviceContext for WgpuDeviceContext {
    fn set_constant_buffer(&mut self, slot: StageSlot, buffer: BufferId) {
        self.constant_buffers.insert(slot, buffer);
    }

    fn map_write_discard(
        &mut self,
        buffer: BufferId,
        write: &mut dyn FnMut(&mut [u8]) -> Result<(), ResourceError>,
    ) -> Result<(), ResourceError> {
        let (wgpu_buffer, size, usage) = self.device.buffer_info(buffer)?;
        if !usage.contains(BufferUsage::MAP_WRITE) {
            return Err(ResourceError::UsageMismatch(format!(
                "buffer {buffer:?} is not CPU-writable ({usage:?})"
            )));
        }

        // Discard semantics: the previous contents are never read back.
        let mut staging = std::mem::take(&mut self.staging);
        staging.clear();
        staging.resize(size as usize, 0);
        let result = write(staging.as_mut_slice())
            .and_then(|()| self.write_whole(&wgpu_buffer, buffer, &staging));
        self.staging = staging;
        result
    }

    fn update_subresource(&mut self, buffer: BufferId, data: &[u8]) -> Result<(), ResourceError> {
        let (wgpu_buffer, size, usage) = self.device.buffer_info(buffer)?;
        if !usage.contains(BufferUsage::COPY_DST) {
            return Err(ResourceError::UsageMismatch(format!(
                "buffer {buffer:?} cannot be replaced ({usage:?})"
            )));
        }
        if data.len() as u64 != size {
            return Err(ResourceError::OutOfBounds);
        }
        self.write_whole(&wgpu_buffer, buffer, data)
    }

    fn set_viewport(&mut self, viewport: &Viewport) {
        self.viewport = Some(*viewport);
    }

    fn set_render_targets(
        &mut self,
        depth_stencil: Option<DepthStencilViewId>,
        color_targets: &[RenderTargetId],
    ) {
        self.depth_stencil = depth_stencil;
        self.color_targets.clear();
        self.color_targets.extend_from_slice(color_targets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::wgpu::WgpuGraphicsContext;
    use lumina_core::renderer::api::{BufferDescriptor, UpdateFrequency};
    use lumina_core::renderer::traits::GraphicsDevice;
    use std::sync::{Arc, Mutex};

    fn create_test_context() -> Option<WgpuDeviceContext> {
        let context = WgpuGraphicsContext::new_headless_blocking().ok()?;
        let device = WgpuDevice::new(Arc::new(Mutex::new(context)));
        Some(WgpuDeviceContext::new(device))
    }

    #[test]
    fn write_paths_follow_buffer_usage_or_skips() {
        let mut ctx = match create_test_context() {
            Some(c) => c,
            None => {
                println!("Skipping device context test: could not create test device.");
                return;
            }
        };

        let per_frame = ctx
            .device()
            .create_buffer(&BufferDescriptor::constant("Clip Plane", 16, UpdateFrequency::PerFrame))
            .expect("per-frame buffer");
        let rare = ctx
            .device()
            .create_buffer(&BufferDescriptor::constant("Global Lighting", 32, UpdateFrequency::Rare))
            .expect("rare buffer");

        ctx.write_discard(per_frame, &[1u8; 16]).expect("mapped write");
        ctx.update_subresource(rare, &[2u8; 32]).expect("full update");
        assert_eq!(ctx.bytes_written(), 48);

        assert!(matches!(
            ctx.write_discard(rare, &[0u8; 32]),
            Err(ResourceError::UsageMismatch(_))
        ));
        assert!(matches!(
            ctx.update_subresource(per_frame, &[0u8; 16]),
            Err(ResourceError::UsageMismatch(_))
        ));
        assert!(matches!(
            ctx.update_subresource(rare, &[0u8; 16]),
            Err(ResourceError::OutOfBounds)
        ));
        assert!(matches!(
            ctx.write_discard(per_frame, &[0u8; 17]),
            Err(ResourceError::OutOfBounds)
        ));
        assert_eq!(ctx.bytes_written(), 48);
        ctx.flush().expect("flush");
        ctx.device().poll_device_blocking();
    }

    #[test]
    fn pipeline_state_is_recorded_or_skips() {
        let mut ctx = match create_test_context() {
            Some(c) => c,
            None => {
                println!("Skipping device context test: could not create test device.");
                return;
            }
        };

        ctx.set_constant_buffer(StageSlot::pixel(2), BufferId(7));
        ctx.set_constant_buffer(StageSlot::vertex(0), BufferId(3));
        ctx.set_constant_buffer(StageSlot::pixel(2), BufferId(9));
        assert_eq!(ctx.constant_buffer(StageSlot::pixel(2)), Some(BufferId(9)));
        let slots: Vec<_> = ctx.constant_buffers().map(|(s, _)| s).collect();
        assert_eq!(slots, vec![StageSlot::vertex(0), StageSlot::pixel(2)]);

        ctx.set_viewport(&Viewport::from_size(640.0, 480.0));
        ctx.set_render_targets(Some(DepthStencilViewId(1)), &[RenderTargetId(4)]);
        assert_eq!(ctx.viewport().map(|v| v.width), Some(640.0));
        assert_eq!(
            ctx.render_targets(),
            (Some(DepthStencilViewId(1)), &[RenderTargetId(4)][..])
        );
    }
}
