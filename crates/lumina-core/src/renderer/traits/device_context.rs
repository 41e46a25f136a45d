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

use crate::renderer::api::*;
use crate::renderer::error::ResourceError;

/// Records state changes and buffer uploads on an immediate or deferred context.
///
/// The context is driven from a single thread; `&mut self` receivers reflect that.
pub trait DeviceContext {
    /// Binds `buffer` as the constant buffer at `slot`.
    fn set_constant_buffer(&mut self, slot: StageSlot, buffer: BufferId);

    /// Maps a CPU-writable buffer with discard semantics and lets `write` fill it.
    ///
    /// The slice handed to `write` covers the whole buffer. Its previous contents
    /// are undefined. If `write` fails, nothing reaches the buffer and its error
    /// is returned.
    /// ## Errors
    /// * `ResourceError::UsageMismatch` - If the buffer was not created with `MAP_WRITE`.
    fn map_write_discard(
        &mut self,
        buffer: BufferId,
        write: &mut dyn FnMut(&mut [u8]) -> Result<(), ResourceError>,
    ) -> Result<(), ResourceError>;

    /// Replaces the whole contents of a buffer created with `COPY_DST`.
    /// ## Errors
    /// * `ResourceError::OutOfBounds` - If `data` does not match the buffer size.
    fn update_subresource(&mut self, buffer: BufferId, data: &[u8]) -> Result<(), ResourceError>;

    /// Sets the rasterizer viewport.
    fn set_viewport(&mut self, viewport: &Viewport);

    /// Binds the depth-stencil view and color targets for subsequent draws.
    fn set_render_targets(
        &mut self,
        depth_stencil: Option<DepthStencilViewId>,
        color_targets: &[RenderTargetId],
    );

    /// Copies `data` into a CPU-writable buffer through [`Self::map_write_discard`].
    ///
    /// Fails with `ResourceError::OutOfBounds`, leaving the buffer untouched, when
    /// `data` is larger than the buffer.
    fn write_discard(&mut self, buffer: BufferId, data: &[u8]) -> Result<(), ResourceError> {
        self.map_write_discard(buffer, &mut |mapped: &mut [u8]| -> Result<(), ResourceError> {
            let target = mapped
                .get_mut(..data.len())
                .ok_or(ResourceError::OutOfBounds)?;
            target.copy_from_slice(data);
            Ok(())
        })
    }
}
