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

//! Defines data structures related to GPU buffer resources.

use crate::lumina_bitflags;
use std::borrow::Cow;

lumina_bitflags! {
    /// A set of flags describing the allowed usages of a [`BufferId`].
    ///
    /// The driver uses them to place the buffer in the right memory type and to
    /// validate that the buffer is used correctly at runtime.
    pub struct BufferUsage: u32 {
        /// The buffer can be mapped for reading on the CPU.
        const MAP_READ = 1 << 0;
        /// The buffer can be mapped for writing on the CPU.
        const MAP_WRITE = 1 << 1;
        /// The buffer can be used as the source of a copy operation.
        const COPY_SRC = 1 << 2;
        /// The buffer can be used as the destination of a copy or full update.
        const COPY_DST = 1 << 3;
        /// The buffer can be bound as a vertex buffer.
        const VERTEX = 1 << 4;
        /// The buffer can be bound as an index buffer.
        const INDEX = 1 << 5;
        /// The buffer can be bound as a constant (uniform) buffer.
        const UNIFORM = 1 << 6;
    }
}

/// How often the contents of a buffer are expected to change.
///
/// The frequency selects both the memory placement and the upload path used by
/// the effect: CPU-writable buffers are refreshed through a mapped write that
/// discards the previous contents, and rarely written buffers are replaced whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateFrequency {
    /// Written every frame or most frames. Uses a mapped write-discard.
    PerFrame,
    /// Written rarely. Uses a full-buffer replace.
    Rare,
}

impl UpdateFrequency {
    /// Returns the buffer usage flags a constant buffer with this frequency needs.
    pub fn constant_buffer_usage(self) -> BufferUsage {
        match self {
            UpdateFrequency::PerFrame => BufferUsage::UNIFORM | BufferUsage::MAP_WRITE,
            UpdateFrequency::Rare => BufferUsage::UNIFORM | BufferUsage::COPY_DST,
        }
    }
}

/// A descriptor used to create a [`BufferId`].
#[derive(Debug, Clone)]
pub struct BufferDescriptor<'a> {
    /// An optional debug label for the buffer.
    pub label: Option<Cow<'a, str>>,
    /// The total size of the buffer in bytes.
    pub size: u64,
    /// A bitmask of [`BufferUsage`] flags describing how the buffer will be used.
    pub usage: BufferUsage,
    /// If `true`, the buffer is created mapped, ready for immediate CPU access.
    pub mapped_at_creation: bool,
}

impl<'a> BufferDescriptor<'a> {
    /// Describes a constant buffer of `size` bytes updated at `frequency`.
    pub fn constant(label: impl Into<Cow<'a, str>>, size: u64, frequency: UpdateFrequency) -> Self {
        Self {
            label: Some(label.into()),
            size,
            usage: frequency.constant_buffer_usage(),
            mapped_at_creation: false,
        }
    }
}

/// An opaque handle to a GPU buffer resource.
///
/// Returned by [`GraphicsDevice::create_buffer`](crate::renderer::GraphicsDevice::create_buffer)
/// and used to reference the buffer in all subsequent operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_frame_buffers_are_cpu_writable() {
        let usage = UpdateFrequency::PerFrame.constant_buffer_usage();
        assert!(usage.contains(BufferUsage::UNIFORM | BufferUsage::MAP_WRITE));
        assert!(!usage.contains(BufferUsage::COPY_DST));
    }

    #[test]
    fn rare_buffers_are_copy_destinations() {
        let desc = BufferDescriptor::constant("Global Lighting", 32, UpdateFrequency::Rare);
        assert_eq!(desc.size, 32);
        assert!(desc.usage.contains(BufferUsage::COPY_DST));
        assert!(!desc.usage.contains(BufferUsage::MAP_WRITE));
        assert_eq!(desc.label.as_deref(), Some("Global Lighting"));
    }
}
