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

use super::GraphicsDevice;
use crate::renderer::api::CompiledShader;
use crate::renderer::error::ShaderError;

/// The content pipeline an effect loads its shaders through.
///
/// Compiling shader source is out of scope; implementations hand back bytecode
/// that was compiled ahead of time.
pub trait ContentManager {
    /// The device GPU objects are created on.
    fn device(&self) -> &dyn GraphicsDevice;

    /// Loads the compiled shader at `path`.
    fn load_shader(&mut self, path: &str) -> Result<CompiledShader, ShaderError>;

    /// Drops the cached shader at `path`. Unknown paths are ignored.
    fn release_shader(&mut self, path: &str);
}
