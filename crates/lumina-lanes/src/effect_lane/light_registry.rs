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

//! Bounded registry of the lights an effect shades with.
//!
//! Slots live in a fixed arena of [`MAX_LIGHTS`] entries. A free list hands out the
//! lowest free index first, and removing a light returns its index to the list.
//! Each slot carries a generation that is bumped on removal, so a [`LightHandle`]
//! held by a removed light never matches the slot again.

use lumina_core::event::EventBus;
use lumina_core::renderer::{
    GpuLight, Light, LightArrayUniforms, LightHandle, LightLink, LightParams, LightUpdate,
    MAX_LIGHTS,
};
use lumina_core::DirtyCell;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    generation: u32,
    occupied: bool,
}

/// A live light as the registry last saw it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegisteredLight {
    /// The light's handle.
    pub handle: LightHandle,
    /// The light's latest world-space parameters.
    pub params: LightParams,
}

/// The lights registered with an effect and the packed array mirrored to the GPU.
#[derive(Debug)]
pub struct LightRegistry {
    slots: [Slot; MAX_LIGHTS],
    free: BinaryHeap<Reverse<u32>>,
    live: Vec<RegisteredLight>,
    packed: DirtyCell<LightArrayUniforms>,
    updates: EventBus<LightUpdate>,
}

impl LightRegistry {
    /// Creates an empty registry. The packed array starts dirty so it is uploaded once.
    pub fn new() -> Self {
        Self {
            slots: [Slot::default(); MAX_LIGHTS],
            free: (0..MAX_LIGHTS as u32).map(Reverse).collect(),
            live: Vec::with_capacity(MAX_LIGHTS),
            packed: DirtyCell::new(LightArrayUniforms::default()),
            updates: EventBus::new(),
        }
    }

    /// Registers `light`, assigning it the lowest free slot.
    ///
    /// Returns `None` and leaves every slot untouched when the registry is full.
    /// A light that is already registered here keeps its handle. A light
    /// registered with another live registry is refused with `None`.
    pub fn add(&mut self, light: &mut Light) -> Option<LightHandle> {
        if let Some(handle) = self.owned_handle(light) {
            log::warn!(
                "Light in slot {} is already registered. Light not added again.",
                handle.index
            );
            return Some(handle);
        }
        if light
            .link()
            .is_some_and(|link| !link.sender().is_disconnected())
        {
            log::warn!(
                "Light is registered with another effect. Remove it there first. Light not added."
            );
            return None;
        }
        // The registry that issued any remaining link has been dropped.
        light.disconnect();

        if self.live.len() >= MAX_LIGHTS {
            log::warn!(
                "The maximum number of lights reached. Light not added - Max Lights: {MAX_LIGHTS}"
            );
            return None;
        }

        let Reverse(index) = self.free.pop()?;
        let slot = &mut self.slots[index as usize];
        slot.occupied = true;
        let handle = LightHandle {
            index,
            generation: slot.generation,
        };

        let params = *light.params();
        self.packed
            .modify(|array| array.lights[index as usize] = params.to_gpu());
        light.connect(LightLink::new(handle, self.updates.sender()));
        self.live.push(RegisteredLight { handle, params });

        log::debug!("Light added to slot {index} ({} live)", self.live.len());
        Some(handle)
    }

    /// Unregisters `light`. Returns `false` if it was not registered here.
    ///
    /// The slot's record is disabled in place; other lights keep their slots.
    pub fn remove(&mut self, light: &mut Light) -> bool {
        let Some(handle) = self.owned_handle(light) else {
            return false;
        };

        let index = handle.index as usize;
        self.packed
            .modify(|array| array.lights[index].is_enabled = 0);
        light.disconnect();
        self.live.retain(|l| l.handle != handle);

        let slot = &mut self.slots[index];
        slot.occupied = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(Reverse(handle.index));

        log::debug!("Light removed from slot {index} ({} live)", self.live.len());
        true
    }

    /// Folds queued light updates into the live list and the packed array.
    ///
    /// Updates whose handle no longer matches a live slot are discarded. Returns
    /// the number of updates applied.
    pub fn pump_updates(&mut self) -> usize {
        let updates: Vec<LightUpdate> = self.updates.drain().collect();
        let mut applied = 0;
        for update in updates {
            if !self.is_live(update.handle) {
                log::trace!("Discarding stale update for slot {}", update.handle.index);
                continue;
            }
            if let Some(entry) = self.live.iter_mut().find(|l| l.handle == update.handle) {
                entry.params = update.params;
            }
            let index = update.handle.index as usize;
            self.packed
                .modify(|array| array.lights[index] = update.params.to_gpu());
            applied += 1;
        }
        applied
    }

    /// The handle of `light` if this registry issued it and it is still live.
    fn owned_handle(&self, light: &Light) -> Option<LightHandle> {
        light
            .link()
            .filter(|link| self.updates.owns(link.sender()))
            .map(|link| link.handle())
            .filter(|h| self.is_live(*h))
    }

    /// Returns `true` if `handle` refers to a currently registered light.
    pub fn is_live(&self, handle: LightHandle) -> bool {
        self.slots
            .get(handle.index as usize)
            .is_some_and(|s| s.occupied && s.generation == handle.generation)
    }

    /// The live lights in registration order.
    pub fn lights(&self) -> &[RegisteredLight] {
        &self.live
    }

    /// Looks up a live light.
    pub fn get(&self, handle: LightHandle) -> Option<&RegisteredLight> {
        self.live.iter().find(|l| l.handle == handle)
    }

    /// Number of live lights.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns `true` if no light is registered.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Returns `true` if no slot is free.
    pub fn is_full(&self) -> bool {
        self.live.len() >= MAX_LIGHTS
    }

    /// The packed world-space light array and its dirty flag.
    pub fn packed(&self) -> &DirtyCell<LightArrayUniforms> {
        &self.packed
    }

    /// Mutable access to the packed array's dirty flag, for the uploader.
    pub fn packed_mut(&mut self) -> &mut DirtyCell<LightArrayUniforms> {
        &mut self.packed
    }

    /// The packed record of slot `index`.
    pub fn record(&self, index: usize) -> Option<&GpuLight> {
        self.packed.get().lights.get(index)
    }
}

impl Default for LightRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumina_core::math::Vec3;

    fn point_at(x: f32) -> Light {
        Light::new(LightParams::point(Vec3::new(x, 0.0, 0.0), 5.0))
    }

    #[test]
    fn slots_are_assigned_lowest_first() {
        let mut registry = LightRegistry::new();
        let mut a = point_at(0.0);
        let mut b = point_at(1.0);
        assert_eq!(registry.add(&mut a).map(|h| h.index), Some(0));
        assert_eq!(registry.add(&mut b).map(|h| h.index), Some(1));
        assert!(registry.packed().is_dirty());
        assert!(registry.record(1).unwrap().enabled());
    }

    #[test]
    fn removed_index_is_reused_with_new_generation() {
        let mut registry = LightRegistry::new();
        let mut a = point_at(0.0);
        let mut b = point_at(1.0);
        let mut c = point_at(2.0);
        let old = registry.add(&mut a).unwrap();
        registry.add(&mut b);

        assert!(registry.remove(&mut a));
        assert!(!registry.record(0).unwrap().enabled());
        assert!(!a.is_registered());

        let reused = registry.add(&mut c).unwrap();
        assert_eq!(reused.index, old.index);
        assert_ne!(reused.generation, old.generation);
        assert!(!registry.is_live(old));
        assert_eq!(registry.get(b.handle().unwrap()).unwrap().handle.index, 1);
    }

    #[test]
    fn overflow_is_ignored() {
        let mut registry = LightRegistry::new();
        let mut lights: Vec<Light> = (0..MAX_LIGHTS).map(|i| point_at(i as f32)).collect();
        for light in &mut lights {
            assert!(registry.add(light).is_some());
        }
        let before = *registry.packed().get();

        let mut extra = point_at(99.0);
        assert!(registry.add(&mut extra).is_none());
        assert!(!extra.is_registered());
        assert_eq!(registry.len(), MAX_LIGHTS);
        assert_eq!(*registry.packed().get(), before);
    }

    #[test]
    fn adding_twice_keeps_the_handle() {
        let mut registry = LightRegistry::new();
        let mut a = point_at(0.0);
        let first = registry.add(&mut a);
        assert_eq!(registry.add(&mut a), first);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn removing_unregistered_light_is_a_noop() {
        let mut registry = LightRegistry::new();
        let mut stranger = point_at(0.0);
        assert!(!registry.remove(&mut stranger));
    }

    #[test]
    fn updates_from_live_lights_are_applied() {
        let mut registry = LightRegistry::new();
        let mut a = point_at(0.0);
        registry.add(&mut a);
        registry.packed_mut().mark_clean();

        a.set_position(Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(registry.pump_updates(), 1);
        assert!(registry.packed().is_dirty());
        assert_eq!(registry.record(0).unwrap().position, [4.0, 5.0, 6.0, 1.0]);
        assert_eq!(registry.lights()[0].params.position, Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn stale_updates_do_not_reach_a_reused_slot() {
        let mut registry = LightRegistry::new();
        let mut old = point_at(0.0);
        registry.add(&mut old);

        // Queue an update, then free the slot before it is pumped.
        old.set_position(Vec3::new(100.0, 0.0, 0.0));
        registry.remove(&mut old);
        let mut new = point_at(7.0);
        registry.add(&mut new);

        assert_eq!(registry.pump_updates(), 0);
        assert_eq!(registry.record(0).unwrap().position, [7.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn foreign_lights_are_neither_removed_nor_added() {
        let mut first = LightRegistry::new();
        let mut second = LightRegistry::new();
        let mut mine = point_at(0.0);
        let mut theirs = point_at(1.0);
        let handle = first.add(&mut theirs).unwrap();
        second.add(&mut mine).unwrap();
        second.packed_mut().mark_clean();

        assert!(!second.remove(&mut theirs));
        assert_eq!(second.len(), 1);
        assert!(second.record(0).unwrap().enabled());
        assert!(!second.packed().is_dirty());
        assert_eq!(theirs.handle(), Some(handle));
        assert!(first.is_live(handle));

        assert_eq!(second.add(&mut theirs), None);
        assert_eq!(second.len(), 1);
        assert_eq!(theirs.handle(), Some(handle));
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn light_from_dropped_registry_can_be_added() {
        let mut light = point_at(3.0);
        {
            let mut gone = LightRegistry::new();
            gone.add(&mut light).unwrap();
        }
        let mut registry = LightRegistry::new();
        let handle = registry.add(&mut light).expect("stale link is replaced");
        assert!(registry.is_live(handle));
        light.set_position(Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(registry.pump_updates(), 1);
    }
}
