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

//! Runs the clustered forward effect for a few frames on a headless wgpu device.
//!
//! Usage: `sandbox [settings.json]`

use anyhow::{anyhow, Context, Result};
use lumina_core::math::{LinearRgba, Mat4, Vec3, Vec4};
use lumina_core::renderer::api::{
    CompiledShader, DepthStencilViewId, MaterialUniforms, OutputTargets, RenderTargetId, Viewport,
};
use lumina_core::renderer::{
    Camera, ContentManager, EffectSettings, GraphicsDevice, Light, LightParams, RenderMode,
    ShaderError, StandardMaterial,
};
use lumina_infra::{WgpuDevice, WgpuDeviceContext, WgpuGraphicsContext};
use lumina_lanes::effect_lane::{ClusteredForwardEffect, Effect};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const FRAME_COUNT: usize = 4;
const WIDTH: f32 = 1280.0;
const HEIGHT: f32 = 720.0;

/// Stand-in bytecode for when no compiled shader ships next to the binary.
const PLACEHOLDER_BYTECODE: &[u8] = b"DXBC\0lumina-placeholder";

/// Loads compiled shaders from disk and caches them by path.
struct SandboxContent {
    device: WgpuDevice,
    shaders: HashMap<String, CompiledShader>,
}

impl SandboxContent {
    fn new(device: WgpuDevice) -> Self {
        Self {
            device,
            shaders: HashMap::new(),
        }
    }
}

impl ContentManager for SandboxContent {
    fn device(&self) -> &dyn GraphicsDevice {
        &self.device
    }

    fn load_shader(&mut self, path: &str) -> Result<CompiledShader, ShaderError> {
        if let Some(shader) = self.shaders.get(path) {
            return Ok(shader.clone());
        }
        let bytecode = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("SandboxContent: '{path}' not found, using placeholder bytecode");
                PLACEHOLDER_BYTECODE.to_vec()
            }
            Err(e) => {
                return Err(ShaderError::LoadError {
                    path: path.to_string(),
                    source_error: e.to_string(),
                })
            }
        };
        let shader = CompiledShader::new(path, bytecode);
        self.shaders.insert(path.to_string(), shader.clone());
        Ok(shader)
    }

    fn release_shader(&mut self, path: &str) {
        if self.shaders.remove(path).is_some() {
            log::debug!("SandboxContent: Released shader '{path}'");
        }
    }
}

fn load_settings() -> Result<EffectSettings> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings file '{path}'"))?;
            EffectSettings::from_json(&json)
                .with_context(|| format!("Invalid settings in '{path}'"))
        }
        None => Ok(EffectSettings::default()),
    }
}

fn orbit_camera(frame: usize) -> Result<Camera> {
    let angle = frame as f32 * 0.25;
    let eye = Vec3::new(8.0 * angle.sin(), 4.0, 8.0 * angle.cos());
    let projection = Mat4::perspective_rh_zo(60f32.to_radians(), WIDTH / HEIGHT, 0.1, 100.0);
    Camera::look_at(eye, Vec3::ZERO, Vec3::Y, projection)
        .ok_or_else(|| anyhow!("Degenerate camera at frame {frame}"))
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("wgpu_hal", log::LevelFilter::Error)
        .init();

    let settings = load_settings()?;
    let context = WgpuGraphicsContext::new_headless_blocking()?;
    log::info!(
        "Sandbox: running on \"{}\" ({:?})",
        context.adapter_name,
        context.adapter_backend
    );
    let device = WgpuDevice::new(Arc::new(Mutex::new(context)));
    let mut content = SandboxContent::new(device.clone());
    let mut ctx = WgpuDeviceContext::new(device.clone());

    let mut effect = ClusteredForwardEffect::new(settings);
    let events = effect.subscribe();
    effect.initialize()?;
    effect.load_content(&mut content)?;

    // --- Scene ---
    let mut sun = Light::new(LightParams::directional(Vec3::new(-0.3, -1.0, -0.2)));
    let mut lamp = Light::new(LightParams::point(Vec3::new(2.0, 1.0, 0.0), 6.0));
    let mut torch = Light::new(LightParams::spot(
        Vec3::new(0.0, 3.0, 3.0),
        Vec3::new(0.0, -1.0, -1.0),
        10.0,
        30f32.to_radians(),
    ));
    for light in [&mut sun, &mut lamp, &mut torch] {
        effect.add_light(light);
    }
    lamp.set_color(LinearRgba::rgb(1.0, 0.8, 0.6), 2.0);

    let brick = StandardMaterial::with_uniforms(
        "Brick",
        MaterialUniforms {
            diffuse: LinearRgba::rgb(0.7, 0.3, 0.2),
            specular_power: 16.0,
            ..Default::default()
        },
    );
    effect.add_material(Box::new(brick))?;
    effect.add_material_named("chrome", Box::new(StandardMaterial::new("Chrome")))?;
    effect.set_ambient_color(LinearRgba::rgb(0.2, 0.2, 0.25));
    effect.set_clip_plane(Vec4::new(0.0, 1.0, 0.0, 0.0));

    if effect.render_mode() == RenderMode::MultiThread {
        effect.set_output_targets(OutputTargets {
            viewport: Viewport::from_size(WIDTH, HEIGHT),
            depth_stencil: Some(DepthStencilViewId(0)),
            color_targets: vec![RenderTargetId(0)],
        });
    }

    // --- Frames ---
    for frame in 0..FRAME_COUNT {
        effect.set_camera(orbit_camera(frame)?);
        lamp.set_position(Vec3::new(2.0 * (frame as f32).cos(), 1.0, 2.0 * (frame as f32).sin()));
        if frame == 2 {
            effect.remove_light(&mut torch);
        }

        effect.apply(&mut ctx)?;
        for (i, name) in ["brick", "CHROME"].iter().enumerate() {
            effect.use_material(name)?;
            effect.apply(&mut ctx)?;
            effect.write_matrices(&mut ctx, &Mat4::from_translation(Vec3::new(i as f32 * 2.0, 0.0, 0.0)))?;
        }
        ctx.flush()?;
        log::info!(
            "Sandbox: frame {frame} done, {} lights, {} bytes uploaded so far",
            effect.light_count(),
            ctx.bytes_written()
        );
    }

    effect.dispose(&mut content);
    device.poll_device_blocking();
    for event in events.drain() {
        log::info!("Sandbox: effect event {event:?}");
    }
    log::info!(
        "Sandbox: {} buffers and {} bytes still allocated after dispose",
        device.buffer_count(),
        device.allocated_bytes()
    );
    Ok(())
}
