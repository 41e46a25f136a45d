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

//! Compiled shader handles and vertex input layout descriptions.

use std::borrow::Cow;
use std::sync::Arc;

/// An opaque, already-compiled shader produced by the content pipeline.
///
/// The effect never inspects the bytecode; it only hands it back to the device
/// when building an input layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledShader {
    path: String,
    bytecode: Arc<[u8]>,
}

impl CompiledShader {
    /// Wraps compiled bytecode loaded from `path`.
    pub fn new(path: impl Into<String>, bytecode: impl Into<Arc<[u8]>>) -> Self {
        Self {
            path: path.into(),
            bytecode: bytecode.into(),
        }
    }

    /// The path the shader was loaded from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The compiled bytecode.
    pub fn bytecode(&self) -> &[u8] {
        &self.bytecode
    }
}

/// The format of a single vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// Two 32-bit floats.
    Float32x2,
    /// Three 32-bit floats.
    Float32x3,
    /// Four 32-bit floats.
    Float32x4,
}

impl VertexFormat {
    /// Size of the attribute in bytes.
    pub const fn size(self) -> u32 {
        match self {
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 => 16,
        }
    }
}

/// One element of a vertex input layout, matched to the shader by semantic name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputElement {
    /// The semantic name, e.g. `POSITION`.
    pub semantic: &'static str,
    /// The semantic index, for repeated semantics.
    pub semantic_index: u32,
    /// The attribute format.
    pub format: VertexFormat,
    /// The byte offset within the vertex.
    pub offset: u32,
    /// The vertex buffer slot the element is read from.
    pub input_slot: u32,
}

impl InputElement {
    const fn per_vertex(semantic: &'static str, format: VertexFormat, offset: u32) -> Self {
        Self {
            semantic,
            semantic_index: 0,
            format,
            offset,
            input_slot: 0,
        }
    }
}

/// The vertex layout every mesh drawn with the clustered forward effect uses:
/// position, color, texture coordinate, normal, tangent and binormal, tightly packed.
pub const STANDARD_VERTEX_LAYOUT: [InputElement; 6] = [
    InputElement::per_vertex("POSITION", VertexFormat::Float32x3, 0),
    InputElement::per_vertex("COLOR", VertexFormat::Float32x4, 12),
    InputElement::per_vertex("TEXCOORD", VertexFormat::Float32x2, 28),
    InputElement::per_vertex("NORMAL", VertexFormat::Float32x3, 36),
    InputElement::per_vertex("TANGENT", VertexFormat::Float32x3, 48),
    InputElement::per_vertex("BINORMAL", VertexFormat::Float32x3, 60),
];

/// Returns the stride of a vertex described by `elements`.
pub fn vertex_stride(elements: &[InputElement]) -> u32 {
    elements
        .iter()
        .map(|e| e.offset + e.format.size())
        .max()
        .unwrap_or(0)
}

/// A descriptor used to create an [`InputLayoutId`].
#[derive(Debug, Clone)]
pub struct InputLayoutDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The vertex elements.
    pub elements: &'a [InputElement],
    /// The shader whose input signature the layout must match.
    pub shader: &'a CompiledShader,
}

/// An opaque handle to a vertex input layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputLayoutId(pub usize);
