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

//! Backend-agnostic rendering contracts.
//!
//! This module holds the "what" of rendering for the lighting effect: the traits a
//! backend implements ([`GraphicsDevice`], [`DeviceContext`]), the content
//! pipeline contract ([`ContentManager`]), constant-buffer layouts, and the scene
//! inputs an effect consumes (lights, materials, camera).

pub mod api;
pub mod camera;
pub mod error;
pub mod light;
pub mod material;
pub mod settings;
pub mod traits;

pub use self::api::*;
pub use self::camera::Camera;
pub use self::error::{RenderError, ResourceError, ShaderError};
pub use self::light::{Light, LightHandle, LightKind, LightLink, LightParams, LightUpdate};
pub use self::material::{Material, StandardMaterial};
pub use self::settings::{EffectSettings, RenderMode};
pub use self::traits::{ContentManager, DeviceContext, GraphicsDevice};
