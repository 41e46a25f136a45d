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

//! Errors raised by effect lanes.

use lumina_core::renderer::{ResourceError, ShaderError};

/// An error returned by an effect operation.
#[derive(thiserror::Error, Debug)]
pub enum EffectError {
    /// An argument was rejected, e.g. an empty material name.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// `apply` or a per-draw write was called before a camera was set.
    #[error("No camera is set on the effect")]
    MissingCamera,

    /// The effect's GPU resources have not been created yet.
    #[error("Effect content is not loaded")]
    NotLoaded,

    /// Multi-threaded render mode needs output targets to rebind.
    #[error("Multi-threaded render mode requires output targets")]
    MissingOutputTargets,

    /// The effect was already disposed.
    #[error("Effect has been disposed")]
    Disposed,

    /// A GPU resource operation failed.
    #[error("GPU resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Loading the shader or building its input layout failed.
    #[error("Shader error: {0}")]
    Shader(#[from] ShaderError),
}

impl EffectError {
    /// Convenience constructor for [`EffectError::InvalidArgument`].
    pub fn invalid_argument<T: ToString>(msg: T) -> Self {
        EffectError::InvalidArgument(msg.to_string())
    }
}

/// Result type alias for effect operations.
pub type EffectResult<T> = Result<T, EffectError>;
