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

//! The camera state an effect reads when building view-space data.

use crate::math::{Mat4, Vec3};

/// The view of the scene an effect renders from.
///
/// Only the transforms are carried; windowing and projection setup live with the
/// caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World-to-view transform.
    pub view: Mat4,
    /// View-to-clip transform.
    pub projection: Mat4,
    /// Eye position in world space.
    pub position: Vec3,
}

impl Camera {
    /// Creates a camera from explicit transforms.
    pub fn new(view: Mat4, projection: Mat4, position: Vec3) -> Self {
        Self {
            view,
            projection,
            position,
        }
    }

    /// A camera at the origin whose view is the identity.
    pub fn identity() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec3::ZERO)
    }

    /// A right-handed camera at `eye` looking at `target`.
    ///
    /// Returns `None` if the view direction is degenerate.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3, projection: Mat4) -> Option<Self> {
        Mat4::look_at_rh(eye, target, up).map(|view| Self::new(view, projection, eye))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::identity()
    }
}
