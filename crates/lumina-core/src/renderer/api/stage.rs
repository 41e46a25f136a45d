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

//! Programmable pipeline stages and constant-buffer binding points.

use std::fmt;

/// A programmable shader stage constant buffers can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    /// The vertex shader stage.
    Vertex,
    /// The pixel (fragment) shader stage.
    Pixel,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("VS"),
            ShaderStage::Pixel => f.write_str("PS"),
        }
    }
}

/// A constant-buffer slot on a given stage, e.g. `PS b2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StageSlot {
    /// The stage the slot belongs to.
    pub stage: ShaderStage,
    /// The register index within the stage.
    pub slot: u32,
}

impl StageSlot {
    /// A vertex-stage slot.
    pub const fn vertex(slot: u32) -> Self {
        Self {
            stage: ShaderStage::Vertex,
            slot,
        }
    }

    /// A pixel-stage slot.
    pub const fn pixel(slot: u32) -> Self {
        Self {
            stage: ShaderStage::Pixel,
            slot,
        }
    }
}

impl fmt::Display for StageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} b{}", self.stage, self.slot)
    }
}
