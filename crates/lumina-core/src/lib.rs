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

//! # Lumina Core
//!
//! Foundational crate containing the traits, data layouts, and interface contracts
//! shared by the lighting effect lanes and the graphics backends.
//!
//! Nothing in this crate talks to a GPU directly. Backends (see `lumina-infra`)
//! implement the [`renderer::GraphicsDevice`] and [`renderer::DeviceContext`]
//! contracts, and the effect lanes (see `lumina-lanes`) drive them.

#![warn(missing_docs)]

pub mod event;
pub mod math;
pub mod renderer;
pub mod utils;

pub use utils::dirty::DirtyCell;
