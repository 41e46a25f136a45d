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

//! Defines the hierarchy of error types for the rendering contracts.

use std::fmt;

/// An error related to loading a compiled shader or describing its input layout.
#[derive(Debug)]
pub enum ShaderError {
    /// The compiled shader could not be loaded from the given path.
    LoadError {
        /// The path of the shader that failed to load.
        path: String,
        /// The underlying loader error.
        source_error: String,
    },
    /// No compiled shader exists at the given path.
    NotFound {
        /// The requested path.
        path: String,
    },
    /// The input layout could not be built from the shader's input signature.
    InputLayoutMismatch {
        /// A descriptive label for the shader.
        label: String,
        /// Details reported by the backend.
        details: String,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::LoadError { path, source_error } => {
                write!(f, "Failed to load compiled shader from '{path}': {source_error}")
            }
            ShaderError::NotFound { path } => {
                write!(f, "Compiled shader not found at '{path}'")
            }
            ShaderError::InputLayoutMismatch { label, details } => {
                write!(f, "Input layout creation failed for '{label}': {details}")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// An error related to the creation or use of a GPU resource.
#[derive(Debug)]
pub enum ResourceError {
    /// A shader-specific error occurred.
    Shader(ShaderError),
    /// A generic resource could not be found.
    NotFound,
    /// The handle used to reference a resource is invalid or already released.
    InvalidHandle,
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
    /// An attempt was made to access a resource out of its bounds.
    OutOfBounds,
    /// The buffer was not created with the usage the requested operation needs.
    UsageMismatch(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Shader(err) => write!(f, "Shader resource error: {err}"),
            ResourceError::NotFound => write!(f, "Resource not found with ID."),
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle or ID."),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
            ResourceError::OutOfBounds => write!(f, "Resource access out of bounds."),
            ResourceError::UsageMismatch(msg) => {
                write!(f, "Resource used in a way its usage flags forbid: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Shader(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(err: ShaderError) -> Self {
        ResourceError::Shader(err)
    }
}

/// A high-level error raised while bringing up or driving a graphics device.
#[derive(Debug)]
pub enum RenderError {
    /// An operation was attempted before the device was initialized.
    NotInitialized,
    /// A failure occurred during the initialization of the graphics backend.
    InitializationFailed(String),
    /// An error occurred while managing a GPU resource.
    ResourceError(ResourceError),
    /// The graphics device was lost.
    DeviceLost,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NotInitialized => {
                write!(f, "The graphics device is not initialized.")
            }
            RenderError::InitializationFailed(msg) => {
                write!(f, "Failed to initialize graphics backend: {msg}")
            }
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
            RenderError::DeviceLost => write!(
                f,
                "The graphics device was lost and needs to be reinitialized."
            ),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}
