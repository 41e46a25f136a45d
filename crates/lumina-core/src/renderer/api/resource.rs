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

//! A type-erased handle to any GPU object an effect owns.

use super::buffer::BufferId;
use super::shader::InputLayoutId;
use crate::renderer::error::ResourceError;
use crate::renderer::traits::GraphicsDevice;

/// A GPU object registered for release at teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuResource {
    /// A buffer created with [`GraphicsDevice::create_buffer`].
    Buffer(BufferId),
    /// An input layout created with [`GraphicsDevice::create_input_layout`].
    InputLayout(InputLayoutId),
}

impl GpuResource {
    /// Releases the object on `device`.
    pub fn release(self, device: &dyn GraphicsDevice) -> Result<(), ResourceError> {
        match self {
            GpuResource::Buffer(id) => device.destroy_buffer(id),
            GpuResource::InputLayout(id) => device.destroy_input_layout(id),
        }
    }
}

impl From<BufferId> for GpuResource {
    fn from(id: BufferId) -> Self {
        GpuResource::Buffer(id)
    }
}

impl From<InputLayoutId> for GpuResource {
    fn from(id: InputLayoutId) -> Self {
        GpuResource::InputLayout(id)
    }
}
