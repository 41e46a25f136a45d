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

//! Name-keyed material registry with case-insensitive lookup.

use super::error::{EffectError, EffectResult};
use lumina_core::renderer::{GraphicsDevice, Material};
use std::collections::HashMap;

/// Materials keyed by their lowercase name. The first registration of a name wins.
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    materials: HashMap<String, Box<dyn Material>>,
}

fn normalize(name: &str) -> String {
    name.to_lowercase()
}

impl MaterialRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `material` under its own name.
    ///
    /// If the name is already taken the existing entry is kept and the rejected
    /// material is handed back so the caller can release it.
    ///
    /// # Errors
    /// [`EffectError::InvalidArgument`] if the material's name is empty.
    pub fn add(&mut self, material: Box<dyn Material>) -> EffectResult<Option<Box<dyn Material>>> {
        if material.name().is_empty() {
            return Err(EffectError::invalid_argument("material name must not be empty"));
        }

        let key = normalize(material.name());
        if self.materials.contains_key(&key) {
            log::warn!(
                "Material '{}' already exists ({} registered). Keeping the existing one.",
                material.name(),
                self.materials.len()
            );
            return Ok(Some(material));
        }

        log::debug!("Material '{}' registered", material.name());
        self.materials.insert(key, material);
        Ok(None)
    }

    /// Renames `material` to `name`, then registers it like [`MaterialRegistry::add`].
    pub fn add_named(
        &mut self,
        name: &str,
        mut material: Box<dyn Material>,
    ) -> EffectResult<Option<Box<dyn Material>>> {
        if name.is_empty() {
            return Err(EffectError::invalid_argument("material name must not be empty"));
        }
        material.set_name(name.to_string());
        self.add(material)
    }

    /// Looks up a material by name, ignoring case.
    ///
    /// # Errors
    /// [`EffectError::InvalidArgument`] if `name` is empty. A missing material is
    /// not an error: a warning is logged and `None` returned.
    pub fn get(&self, name: &str) -> EffectResult<Option<&dyn Material>> {
        if name.is_empty() {
            return Err(EffectError::invalid_argument("material name must not be empty"));
        }
        let found = self.materials.get(&normalize(name)).map(|m| &**m);
        if found.is_none() {
            log::warn!(
                "Material '{name}' not found ({} registered)",
                self.materials.len()
            );
        }
        Ok(found)
    }

    /// Number of registered materials.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Returns `true` if no material is registered.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Releases every material's GPU objects and empties the registry.
    ///
    /// Returns the number of materials that released cleanly.
    pub fn release_all(&mut self, device: &dyn GraphicsDevice) -> usize {
        let mut released = 0;
        for (_, mut material) in self.materials.drain() {
            match material.release(device) {
                Ok(()) => released += 1,
                Err(e) => log::warn!("Material '{}' failed to release: {e}", material.name()),
            }
        }
        released
    }
}
