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
use std::fmt::Debug;

/// Creates and releases GPU objects.
///
/// Implemented by a graphics backend (see `lumina-infra`). All methods take
/// `&self`; backends synchronize their internal resource tables themselves.
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// Creates a new GPU buffer.
    /// ## Arguments
    /// * `descriptor` - The size, usage flags and label of the buffer.
    /// ## Returns
    /// The ID of the created buffer.
    /// ## Errors
    /// * `ResourceError` - If the backend rejects the descriptor or runs out of memory.
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError>;

    /// Destroys a GPU buffer.
    /// ## Errors
    /// * `ResourceError::NotFound` - If the buffer does not exist or was already destroyed.
    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    /// Creates a vertex input layout validated against a compiled shader.
    /// ## Errors
    /// * `ResourceError::Shader` - If the layout does not match the shader's input signature.
    fn create_input_layout(
        &self,
        descriptor: &InputLayoutDescriptor,
    ) -> Result<InputLayoutId, ResourceError>;

    /// Destroys a vertex input layout.
    fn destroy_input_layout(&self, id: InputLayoutId) -> Result<(), ResourceError>;
}
