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

//! Deferred release of the GPU objects an effect creates.

use lumina_core::renderer::{GpuResource, GraphicsDevice};

/// Collects GPU objects as they are created and releases them together at teardown.
///
/// Releasing drains the queue, so every registered object is released at most
/// once no matter how often [`DisposeQueue::release_all`] is called.
#[derive(Debug, Default)]
pub struct DisposeQueue {
    resources: Vec<GpuResource>,
}

impl DisposeQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an object for release.
    pub fn register(&mut self, resource: impl Into<GpuResource>) {
        self.resources.push(resource.into());
    }

    /// Number of objects waiting for release.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns `true` if nothing is waiting for release.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Releases every registered object, most recently registered first.
    ///
    /// Failures are logged and do not stop the remaining releases. Returns the
    /// number of objects released successfully.
    pub fn release_all(&mut self, device: &dyn GraphicsDevice) -> usize {
        let mut released = 0;
        while let Some(resource) = self.resources.pop() {
            match resource.release(device) {
                Ok(()) => released += 1,
                Err(e) => log::warn!("Failed to release {resource:?}: {e}"),
            }
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumina_core::renderer::{
        BufferDescriptor, BufferId, InputLayoutDescriptor, InputLayoutId, ResourceError,
    };
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct MockGraphicsDevice {
        destroyed: Mutex<Vec<GpuResource>>,
    }

    impl GraphicsDevice for MockGraphicsDevice {
        fn create_buffer(&self, _desc: &BufferDescriptor) -> Result<BufferId, ResourceError> {
            Ok(BufferId(0))
        }

        fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
            if id.0 == 13 {
                return Err(ResourceError::NotFound);
            }
            self.destroyed.lock().unwrap().push(GpuResource::Buffer(id));
            Ok(())
        }

        fn create_input_layout(
            &self,
            _desc: &InputLayoutDescriptor,
        ) -> Result<InputLayoutId, ResourceError> {
            Ok(InputLayoutId(0))
        }

        fn destroy_input_layout(&self, id: InputLayoutId) -> Result<(), ResourceError> {
            self.destroyed
                .lock()
                .unwrap()
                .push(GpuResource::InputLayout(id));
            Ok(())
        }
    }

    #[test]
    fn release_all_drains_in_reverse_order() {
        let device = MockGraphicsDevice::default();
        let mut queue = DisposeQueue::new();
        queue.register(BufferId(1));
        queue.register(InputLayoutId(2));

        assert_eq!(queue.release_all(&device), 2);
        assert!(queue.is_empty());
        assert_eq!(
            *device.destroyed.lock().unwrap(),
            vec![
                GpuResource::InputLayout(InputLayoutId(2)),
                GpuResource::Buffer(BufferId(1))
            ]
        );

        assert_eq!(queue.release_all(&device), 0);
        assert_eq!(device.destroyed.lock().unwrap().len(), 2);
    }

    #[test]
    fn failed_release_does_not_stop_the_rest() {
        let device = MockGraphicsDevice::default();
        let mut queue = DisposeQueue::new();
        queue.register(BufferId(1));
        queue.register(BufferId(13));

        assert_eq!(queue.release_all(&device), 1);
        assert!(queue.is_empty());
    }
}
