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

use anyhow::anyhow;
use anyhow::Result;
use wgpu::{Adapter, Instance};

/// Holds the core WGPU state objects required to run the lighting effect.
///
/// The context is headless: it owns no surface, so it can drive the effect in
/// tests and offline tools as well as underneath a windowing layer that
/// presents elsewhere.
#[derive(Debug)]
pub struct WgpuGraphicsContext {
    #[allow(dead_code)]
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,

    // Store info for easy access
    pub adapter_name: String,
    pub adapter_backend: wgpu::Backend,
    pub adapter_device_type: wgpu::DeviceType,
    pub device_limits: wgpu::Limits,
}

impl WgpuGraphicsContext {
    /// Asynchronously initializes a headless context on the default adapter.
    ///
    /// ## Returns
    /// * `Result<Self>` - The initialized context, or an error if no adapter or
    ///   logical device could be obtained.
    pub async fn new_headless() -> Result<Self> {
        log::info!("Initializing headless WGPU Graphics Context...");

        let instance = Instance::new(wgpu::InstanceDescriptor::new_without_display_handle());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .map_err(|e| anyhow!("No suitable graphics adapter found: {}", e))?;

        Self::with_adapter(adapter).await
    }

    /// Blocking variant of [`Self::new_headless`].
    pub fn new_headless_blocking() -> Result<Self> {
        pollster::block_on(Self::new_headless())
    }

    /// Creates the logical device and queue on a pre-selected adapter.
    pub async fn with_adapter(adapter: Adapter) -> Result<Self> {
        let adapter_info = adapter.get_info();
        log::info!(
            "Using graphics adapter: \"{}\" (Backend: {:?})",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Lumina Logical Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
            })
            .await
            .map_err(|e| anyhow!("Failed to create logical device: {}", e))?;
        log::info!("Logical device and command queue created.");

        device.on_uncaptured_error(std::sync::Arc::new(|e| {
            log::error!("WGPU Uncaptured Error: {e:?}");
        }));

        let device_limits = device.limits();
        log::debug!("Device limits: {device_limits:?}");

        Ok(WgpuGraphicsContext {
            adapter,
            device,
            queue,
            adapter_name: adapter_info.name,
            adapter_backend: adapter_info.backend,
            adapter_device_type: adapter_info.device_type,
            device_limits,
        })
    }
}
