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

//! Effect lane: per-frame lighting effects driven through the device contracts.

mod clustered_forward;
mod dispose;
mod error;
mod gpu_resources;
mod light_registry;
mod material_registry;

pub use clustered_forward::*;
pub use dispose::DisposeQueue;
pub use error::{EffectError, EffectResult};
pub use gpu_resources::*;
pub use light_registry::{LightRegistry, RegisteredLight};
pub use material_registry::MaterialRegistry;

use lumina_core::renderer::{ContentManager, DeviceContext};

/// A lifecycle notification sent by an effect to its subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectEvent {
    /// [`Effect::initialize`] completed.
    Initialized,
    /// [`Effect::load_content`] created every GPU resource.
    ContentLoaded,
    /// [`Effect::dispose`] released the effect's resources.
    Disposed,
}

/// A rendering effect with a load / apply / dispose lifecycle.
///
/// The owner calls [`Effect::initialize`] and [`Effect::load_content`] once,
/// [`Effect::apply`] every frame before issuing draws, and [`Effect::dispose`] at
/// teardown.
pub trait Effect {
    /// Human-readable name, used in logs.
    fn name(&self) -> &'static str;

    /// Prepares CPU-side state. Does not touch the GPU.
    fn initialize(&mut self) -> EffectResult<()>;

    /// Loads shaders and creates GPU resources.
    ///
    /// Any failure is logged and returned; the resources created before it remain
    /// registered for release.
    fn load_content(&mut self, content: &mut dyn ContentManager) -> EffectResult<()>;

    /// Binds the effect's buffers and uploads whatever changed since the last call.
    ///
    /// Preconditions are checked first; on failure nothing is bound or written.
    fn apply(&mut self, ctx: &mut dyn DeviceContext) -> EffectResult<()>;

    /// Releases every GPU resource and material. Calling it again does nothing.
    fn dispose(&mut self, content: &mut dyn ContentManager);

    /// Returns `true` once [`Effect::initialize`] has run.
    fn is_initialized(&self) -> bool;

    /// Returns `true` once [`Effect::load_content`] has succeeded and until disposal.
    fn is_content_loaded(&self) -> bool;

    /// Returns `true` once [`Effect::dispose`] has run.
    fn is_disposed(&self) -> bool;
}
