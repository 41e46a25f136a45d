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

//! Backend-agnostic rendering API types.
//!
//! - **[`buffer`]**: buffer handles, descriptors and update frequencies.
//! - **[`shader`]**: compiled shader handles and vertex input layouts.
//! - **[`stage`]**: shader stages and constant-buffer slots.
//! - **[`target`]**: viewport and output view handles.
//! - **[`resource`]**: type-erased handles for deferred release.
//! - **[`uniforms`]**: constant-buffer layouts.

pub mod buffer;
pub mod resource;
pub mod shader;
pub mod stage;
pub mod target;
pub mod uniforms;

pub use self::buffer::*;
pub use self::resource::GpuResource;
pub use self::shader::*;
pub use self::stage::*;
pub use self::target::*;
pub use self::uniforms::*;
