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

use super::context::WgpuGraphicsContext;
use super::conversions::{vertex_attributes, IntoWgpu};
use lumina_core::renderer::api::{
    vertex_stride, BufferDescriptor, BufferId, BufferUsage, InputLayoutDescriptor, InputLayoutId,
};
use lumina_core::renderer::error::{ResourceError, ShaderError};
use lumina_core::renderer::traits::GraphicsDevice;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug)]
pub(crate) struct WgpuBufferEntry {
    pub(crate) wgpu_buffer: Arc<wgpu::Buffer>,
    pub(crate) size: u64, // To track VRAM accurately on destruction
    pub(crate) usage: BufferUsage,
}

#[derive(Debug)]
struct WgpuInputLayoutEntry {
    attributes: Vec<wgpu::VertexAttribute>,
    stride: u64,
}

/// The internal state of the device, shared by every clone of [`WgpuDevice`].
#[derive(Debug)]
struct WgpuDeviceInternal {
    context: Arc<Mutex<WgpuGraphicsContext>>,
    buffers: Mutex<HashMap<BufferId, WgpuBufferEntry>>,
    input_layouts: Mutex<HashMap<InputLayoutId, WgpuInputLayoutEntry>>,
    next_buffer_id: AtomicUsize,
    next_input_layout_id: AtomicUsize,
    vram_allocated_bytes: AtomicUsize,
}

/// A clonable, thread-safe handle to the WGPU graphics device.
/// It wraps the actual device state (`WgpuDeviceInternal`) in an Arc,
/// allowing it to be shared with the device context and across threads.
#[derive(Clone, Debug)]
pub struct WgpuDevice {
    internal: Arc<WgpuDeviceInternal>,
}

impl WgpuDevice {
    pub fn new(context: Arc<Mutex<WgpuGraphicsContext>>) -> Self {
        Self {
            internal: Arc::new(WgpuDeviceInternal {
                context,
                buffers: Mutex::new(HashMap::new()),
                input_layouts: Mutex::new(HashMap::new()),
                next_buffer_id: AtomicUsize::new(0),
                next_input_layout_id: AtomicUsize::new(0),
                vram_allocated_bytes: AtomicUsize::new(0),
            }),
        }
    }

    // --- ID Generation Helpers ---

    fn generate_buffer_id(&self) -> BufferId {
        BufferId(self.internal.next_buffer_id.fetch_add(1, Ordering::Relaxed))
    }

    fn generate_input_layout_id(&self) -> InputLayoutId {
        InputLayoutId(
            self.internal
                .next_input_layout_id
                .fetch_add(1, Ordering::Relaxed),
        )
    }

    /// Helper function to execute an operation with the graphics context locked.
    /// Returns a Result to propagate lock errors or operation errors.
    pub(crate) fn with_context<F, R>(&self, operation: F) -> Result<R, ResourceError>
    where
        F: FnOnce(&WgpuGraphicsContext) -> Result<R, ResourceError>,
    {
        let context_guard = self.internal.context.lock().map_err(|e| {
            ResourceError::BackendError(format!("Failed to lock WgpuGraphicsContext: {e}"))
        })?;
        operation(&context_guard)
    }

    fn lock_buffers(&self) -> Result<MutexGuard<'_, HashMap<BufferId, WgpuBufferEntry>>, ResourceError> {
        self.internal
            .buffers
            .lock()
            .map_err(|e| ResourceError::BackendError(format!("Buffer table poisoned: {e}")))
    }

    fn lock_input_layouts(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<InputLayoutId, WgpuInputLayoutEntry>>, ResourceError> {
        self.internal
            .input_layouts
            .lock()
            .map_err(|e| ResourceError::BackendError(format!("Input layout table poisoned: {e}")))
    }

    /// Looks up a live buffer and returns its wgpu handle, size and usage.
    pub(crate) fn buffer_info(
        &self,
        id: BufferId,
    ) -> Result<(Arc<wgpu::Buffer>, u64, BufferUsage), ResourceError> {
        let buffers = self.lock_buffers()?;
        let entry = buffers.get(&id).ok_or(ResourceError::NotFound)?;
        Ok((Arc::clone(&entry.wgpu_buffer), entry.size, entry.usage))
    }

    /// Retrieves a reference-counted pointer to the internal WGPU buffer.
    /// Returns `None` if the ID is invalid.
    pub fn get_wgpu_buffer(&self, id: BufferId) -> Option<Arc<wgpu::Buffer>> {
        self.buffer_info(id).ok().map(|(buffer, _, _)| buffer)
    }

    /// Returns the vertex attributes and stride registered for an input layout.
    pub fn input_layout_attributes(
        &self,
        id: InputLayoutId,
    ) -> Option<(Vec<wgpu::VertexAttribute>, u64)> {
        let layouts = self.lock_input_layouts().ok()?;
        layouts
            .get(&id)
            .map(|entry| (entry.attributes.clone(), entry.stride))
    }

    /// Number of live buffers.
    pub fn buffer_count(&self) -> usize {
        self.lock_buffers().map(|b| b.len()).unwrap_or(0)
    }

    /// Number of live input layouts.
    pub fn input_layout_count(&self) -> usize {
        self.lock_input_layouts().map(|l| l.len()).unwrap_or(0)
    }

    /// Bytes currently held by live buffers.
    pub fn allocated_bytes(&self) -> usize {
        self.internal.vram_allocated_bytes.load(Ordering::Relaxed)
    }

    /// Polls the underlying wgpu::Device in a blocking manner.
    /// Used at shutdown so queued writes finish before resources are dropped.
    pub fn poll_device_blocking(&self) {
        if let Ok(context_guard) = self.internal.context.lock() {
            // PollType::Wait is blocking and will wait for the queue to be empty.
            if let Err(e) = context_guard.device.poll(wgpu::PollType::wait_indefinitely()) {
                log::warn!("Failed to poll device during shutdown: {:?}", e);
            }
        } else {
            log::error!("WgpuDevice context mutex was poisoned during shutdown poll.");
        }
    }
}

impl GraphicsDevice for WgpuDevice {
    // --- Buffer Operations ---

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        let usage: wgpu::BufferUsages = descriptor.usage.into_wgpu();
        if usage.contains(wgpu::BufferUsages::MAP_READ)
            && !(wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST).contains(usage)
        {
            return Err(ResourceError::UsageMismatch(format!(
                "MAP_READ can only be combined with COPY_DST, got {:?}",
                descriptor.usage
            )));
        }

        let wgpu_buffer = self.with_context(|context| {
            let buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
                label: descriptor.label.as_deref(),
                size: descriptor.size,
                usage,
                mapped_at_creation: descriptor.mapped_at_creation,
            });
            // Mapped writes go through the queue, so nothing stays mapped.
            if descriptor.mapped_at_creation {
                buffer.unmap();
            }
            Ok(buffer)
        })?;
        let id = self.generate_buffer_id();

        // Track VRAM usage
        self.internal
            .vram_allocated_bytes
            .fetch_add(descriptor.size as usize, Ordering::Relaxed);

        self.lock_buffers()?.insert(
            id,
            WgpuBufferEntry {
                wgpu_buffer: Arc::new(wgpu_buffer),
                size: descriptor.size,
                usage: descriptor.usage,
            },
        );

        log::info!(
            "WgpuDevice: Created buffer '{}' with ID: {:?}, size: {} bytes",
            descriptor.label.as_deref().unwrap_or_default(),
            id,
            descriptor.size
        );
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let mut buffers = self.lock_buffers()?;

        // Remove the buffer from the map and track VRAM usage
        if let Some(entry) = buffers.remove(&id) {
            self.internal
                .vram_allocated_bytes
                .fetch_sub(entry.size as usize, Ordering::Relaxed);
            entry.wgpu_buffer.destroy();
            log::debug!("WgpuDevice: Destroyed buffer with ID: {id:?}");
            Ok(())
        } else {
            Err(ResourceError::NotFound)
        }
    }

    // --- Input Layout Operations ---

    fn create_input_layout(
        &self,
        descriptor: &InputLayoutDescriptor,
    ) -> Result<InputLayoutId, ResourceError> {
        let label = descriptor
            .label
            .as_deref()
            .unwrap_or(descriptor.shader.path())
            .to_string();

        if descriptor.shader.bytecode().is_empty() {
            return Err(ShaderError::InputLayoutMismatch {
                label,
                details: format!("shader '{}' has no bytecode", descriptor.shader.path()),
            }
            .into());
        }
        if descriptor.elements.is_empty() {
            return Err(ShaderError::InputLayoutMismatch {
                label,
                details: "no input elements".to_string(),
            }
            .into());
        }
        if let Some(element) = descriptor.elements.iter().find(|e| e.input_slot != 0) {
            return Err(ShaderError::InputLayoutMismatch {
                label,
                details: format!(
                    "element {}{} uses input slot {}; only slot 0 is supported",
                    element.semantic, element.semantic_index, element.input_slot
                ),
            }
            .into());
        }

        let entry = WgpuInputLayoutEntry {
            attributes: vertex_attributes(descriptor.elements),
            stride: vertex_stride(descriptor.elements) as u64,
        };
        let id = self.generate_input_layout_id();
        log::info!(
            "WgpuDevice: Created input layout '{}' with ID: {:?}, stride: {} bytes",
            label,
            id,
            entry.stride
        );
        self.lock_input_layouts()?.insert(id, entry);
        Ok(id)
    }

    fn destroy_input_layout(&self, id: InputLayoutId) -> Result<(), ResourceError> {
        if self.lock_input_layouts()?.remove(&id).is_some() {
            log::debug!("WgpuDevice: Destroyed input layout with ID: {id:?}");
            Ok(())
        } else {
            Err(ResourceError::NotFound)
        }
    }
}
