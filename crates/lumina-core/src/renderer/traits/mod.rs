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

//! Defines the contracts that decouple effects from any specific graphics backend.
//!
//! - [`GraphicsDevice`]: creates and releases GPU objects.
//! - [`DeviceContext`]: binds buffers and records uploads.
//! - [`ContentManager`]: hands out precompiled shaders and the device.

mod content;
mod device_context;
mod graphics_device;

pub use self::content::ContentManager;
pub use self::device_context::DeviceContext;
pub use self::graphics_device::GraphicsDevice;
