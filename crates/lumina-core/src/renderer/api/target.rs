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

//! Output target handles rebound by effects in multi-threaded render mode.

use serde::{Deserialize, Serialize};

/// A rectangle of the render target mapped to normalized device coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Minimum depth, usually `0.0`.
    pub min_depth: f32,
    /// Maximum depth, usually `1.0`.
    pub max_depth: f32,
}

impl Viewport {
    /// A full-depth viewport covering `width` x `height` pixels from the origin.
    pub const fn from_size(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// An opaque handle to a color render target view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetId(pub usize);

/// An opaque handle to a depth-stencil view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilViewId(pub usize);

/// The viewport and views an effect binds before drawing on a deferred context.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTargets {
    /// The viewport to set.
    pub viewport: Viewport,
    /// The depth-stencil view, if depth testing is used.
    pub depth_stencil: Option<DepthStencilViewId>,
    /// The color targets, bound in order.
    pub color_targets: Vec<RenderTargetId>,
}
