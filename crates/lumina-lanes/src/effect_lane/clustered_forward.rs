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

//! Clustered forward lighting effect.
//!
//! The effect keeps scene-wide lighting and the current material on the CPU,
//! mirrors them into six constant buffers, and uploads only what changed:
//!
//! | Buffer          | Slot    | Upload                                       |
//! |-----------------|---------|----------------------------------------------|
//! | matrices        | `VS b0` | per draw, [`ClusteredForwardEffect::write_matrices`] |
//! | clip plane      | `VS b1` | on `apply` when dirty                        |
//! | reflection      | `VS b2` | per draw, [`ClusteredForwardEffect::write_reflection`] |
//! | material        | `PS b0` | on `apply` when dirty                        |
//! | global lighting | `PS b1` | on every `apply`, full replace               |
//! | lights          | `PS b2` | on `apply` when dirty or the view changed    |
//!
//! Lights are stored in world space. Each `apply` transforms a scratch copy into
//! the view space of the current camera before uploading it.

use super::dispose::DisposeQueue;
use super::error::{EffectError, EffectResult};
use super::gpu_resources::GpuResourceSet;
use super::light_registry::{LightRegistry, RegisteredLight};
use super::material_registry::MaterialRegistry;
use super::{Effect, EffectEvent};
use lumina_core::math::{LinearRgba, Mat4, Vec4};
use lumina_core::renderer::{
    Camera, ClipPlaneUniforms, CompiledShader, ContentManager, DeviceContext, EffectSettings,
    GlobalLightingUniforms, InputLayoutDescriptor, InputLayoutId, Light, LightArrayUniforms,
    LightHandle, Material, MaterialUniforms, MatricesUniforms, OutputTargets, ReflectionUniforms,
    RenderMode, STANDARD_VERTEX_LAYOUT,
};
use lumina_core::DirtyCell;

/// The clustered forward lighting effect.
#[derive(Debug)]
pub struct ClusteredForwardEffect {
    settings: EffectSettings,

    lights: LightRegistry,
    materials: MaterialRegistry,
    material_buffer: DirtyCell<MaterialUniforms>,
    clip_plane: DirtyCell<ClipPlaneUniforms>,
    global_lighting: GlobalLightingUniforms,

    camera: Option<Camera>,
    output_targets: Option<OutputTargets>,

    gpu: Option<GpuResourceSet>,
    shader: Option<CompiledShader>,
    input_layout: Option<InputLayoutId>,
    dispose_queue: DisposeQueue,

    /// The view matrix the light array was last uploaded with.
    uploaded_view: Option<Mat4>,
    scratch_lights: LightArrayUniforms,

    initialized: bool,
    disposed: bool,
    listeners: Vec<flume::Sender<EffectEvent>>,
}

impl ClusteredForwardEffect {
    /// Creates the effect with the given settings. No GPU work happens until
    /// [`Effect::load_content`].
    pub fn new(settings: EffectSettings) -> Self {
        let clip_plane = DirtyCell::new(ClipPlaneUniforms::new(settings.clip_plane));
        let global_lighting = GlobalLightingUniforms::new(settings.ambient);
        Self {
            settings,
            lights: LightRegistry::new(),
            materials: MaterialRegistry::new(),
            material_buffer: DirtyCell::new(MaterialUniforms::default()),
            clip_plane,
            global_lighting,
            camera: None,
            output_targets: None,
            gpu: None,
            shader: None,
            input_layout: None,
            dispose_queue: DisposeQueue::new(),
            uploaded_view: None,
            scratch_lights: LightArrayUniforms::default(),
            initialized: false,
            disposed: false,
            listeners: Vec::new(),
        }
    }

    /// Returns a channel that receives this effect's lifecycle events.
    pub fn subscribe(&mut self) -> flume::Receiver<EffectEvent> {
        let (sender, receiver) = flume::unbounded();
        self.listeners.push(sender);
        receiver
    }

    fn notify(&mut self, event: EffectEvent) {
        self.listeners.retain(|l| l.send(event).is_ok());
    }

    /// The settings the effect was created with, with the current render mode.
    pub fn settings(&self) -> &EffectSettings {
        &self.settings
    }

    /// The GPU resource set, once content is loaded.
    pub fn gpu_resources(&self) -> Option<&GpuResourceSet> {
        self.gpu.as_ref()
    }

    /// The input layout built from the standard vertex description.
    pub fn input_layout(&self) -> Option<InputLayoutId> {
        self.input_layout
    }

    // --- Lights ---

    /// Registers a light. Returns `None` when [`MAX_LIGHTS`](lumina_core::renderer::MAX_LIGHTS)
    /// lights are already registered.
    pub fn add_light(&mut self, light: &mut Light) -> Option<LightHandle> {
        self.lights.add(light)
    }

    /// Unregisters a light. Returns `false` if it was not registered with this effect.
    pub fn remove_light(&mut self, light: &mut Light) -> bool {
        self.lights.remove(light)
    }

    /// Folds pending light updates into the registry without waiting for `apply`.
    pub fn sync_lights(&mut self) -> usize {
        self.lights.pump_updates()
    }

    /// The registered lights in registration order, as of the last sync.
    pub fn lights(&self) -> &[RegisteredLight] {
        self.lights.lights()
    }

    /// Number of registered lights.
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// The light registry, including the packed world-space array.
    pub fn light_registry(&self) -> &LightRegistry {
        &self.lights
    }

    // --- Materials ---

    /// Registers a material under its own name.
    ///
    /// Returns the material back if the name is already taken.
    pub fn add_material(
        &mut self,
        material: Box<dyn Material>,
    ) -> EffectResult<Option<Box<dyn Material>>> {
        self.materials.add(material)
    }

    /// Registers a material under `name`.
    pub fn add_material_named(
        &mut self,
        name: &str,
        material: Box<dyn Material>,
    ) -> EffectResult<Option<Box<dyn Material>>> {
        self.materials.add_named(name, material)
    }

    /// Looks up a material by name, ignoring case.
    pub fn get_material(&self, name: &str) -> EffectResult<Option<&dyn Material>> {
        self.materials.get(name)
    }

    /// Makes the named material's parameters the pending material buffer.
    ///
    /// Returns `false` if no material has that name.
    pub fn use_material(&mut self, name: &str) -> EffectResult<bool> {
        match self.materials.get(name)? {
            Some(material) => {
                let uniforms = material.uniforms();
                self.set_material_buffer(uniforms);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Number of registered materials.
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// The pending material buffer.
    pub fn material_buffer(&self) -> &MaterialUniforms {
        self.material_buffer.get()
    }

    /// Replaces the pending material buffer. Uploaded on the next `apply`.
    pub fn set_material_buffer(&mut self, uniforms: MaterialUniforms) {
        self.material_buffer.set(uniforms);
    }

    // --- Scene-wide state ---

    /// The global ambient color.
    pub fn ambient_color(&self) -> LinearRgba {
        self.global_lighting.global_ambient
    }

    /// Sets the global ambient color. The pending lighting structure is updated
    /// immediately; it is pushed on every `apply`.
    pub fn set_ambient_color(&mut self, color: LinearRgba) {
        self.global_lighting.global_ambient = color;
    }

    /// The pending global lighting structure.
    pub fn global_lighting(&self) -> &GlobalLightingUniforms {
        &self.global_lighting
    }

    /// The clip plane coefficients.
    pub fn clip_plane(&self) -> Vec4 {
        Vec4::from_array(self.clip_plane.get().plane)
    }

    /// Sets the clip plane. Uploaded on the next `apply`.
    pub fn set_clip_plane(&mut self, plane: Vec4) {
        self.clip_plane.set(ClipPlaneUniforms::new(plane));
    }

    /// The current camera, if any.
    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    /// Sets the camera used by `apply` and the per-draw writes.
    pub fn set_camera(&mut self, camera: Camera) {
        let p = camera.position;
        self.global_lighting.camera_position = [p.x, p.y, p.z, 1.0];
        self.camera = Some(camera);
    }

    /// The camera position as last set.
    pub fn camera_position(&self) -> Vec4 {
        Vec4::from_array(self.global_lighting.camera_position)
    }

    /// Overrides the camera position used for shading until the next
    /// [`set_camera`](Self::set_camera). Pushed on the next `apply`.
    pub fn set_camera_position(&mut self, position: Vec4) {
        self.global_lighting.camera_position = position.to_array();
    }

    /// The render mode.
    pub fn render_mode(&self) -> RenderMode {
        self.settings.render_mode
    }

    /// Switches the render mode.
    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.settings.render_mode = mode;
    }

    /// Sets the viewport and views rebound by `apply` in multi-threaded mode.
    pub fn set_output_targets(&mut self, targets: OutputTargets) {
        self.output_targets = Some(targets);
    }

    // --- Per-draw uploads ---

    /// Uploads the world transform of the next draw with the camera's view and projection.
    pub fn write_matrices(&self, ctx: &mut dyn DeviceContext, world: &Mat4) -> EffectResult<()> {
        let gpu = self.loaded()?;
        let camera = self.camera.as_ref().ok_or(EffectError::MissingCamera)?;
        let uniforms = MatricesUniforms::new(world, &camera.view, &camera.projection);
        gpu.matrices.write_value(ctx, &uniforms)?;
        Ok(())
    }

    /// Uploads the reflection transform of the next draw.
    pub fn write_reflection(
        &self,
        ctx: &mut dyn DeviceContext,
        reflection: &Mat4,
    ) -> EffectResult<()> {
        let gpu = self.loaded()?;
        gpu.reflection
            .write_value(ctx, &ReflectionUniforms::new(reflection))?;
        Ok(())
    }

    fn loaded(&self) -> EffectResult<&GpuResourceSet> {
        if self.disposed {
            return Err(EffectError::Disposed);
        }
        self.gpu.as_ref().ok_or(EffectError::NotLoaded)
    }
}

impl Default for ClusteredForwardEffect {
    fn default() -> Self {
        Self::new(EffectSettings::default())
    }
}

impl Effect for ClusteredForwardEffect {
    fn name(&self) -> &'static str {
        "ClusteredForward"
    }

    fn initialize(&mut self) -> EffectResult<()> {
        if self.disposed {
            return Err(EffectError::Disposed);
        }
        if !self.initialized {
            self.initialized = true;
            log::info!("{}: initialized", self.name());
            self.notify(EffectEvent::Initialized);
        }
        Ok(())
    }

    fn load_content(&mut self, content: &mut dyn ContentManager) -> EffectResult<()> {
        if self.disposed {
            return Err(EffectError::Disposed);
        }
        if self.gpu.is_some() {
            log::warn!("{}: content already loaded", self.name());
            return Ok(());
        }

        log::info!("{}: loading content...", self.name());

        let shader = content
            .load_shader(&self.settings.shader_path)
            .inspect_err(|e| log::error!("{}: shader load failed: {e}", self.name()))?;
        let shader = self.shader.insert(shader);

        let device = content.device();
        let layout = device
            .create_input_layout(&InputLayoutDescriptor {
                label: Some("Clustered Forward Vertex".into()),
                elements: &STANDARD_VERTEX_LAYOUT,
                shader,
            })
            .inspect_err(|e| log::error!("ClusteredForward: input layout creation failed: {e}"))?;
        self.dispose_queue.register(layout);
        self.input_layout = Some(layout);

        let gpu = GpuResourceSet::create(device, &mut self.dispose_queue)
            .inspect_err(|e| log::error!("ClusteredForward: buffer creation failed: {e}"))?;
        self.gpu = Some(gpu);
        self.uploaded_view = None;

        log::info!("{}: content loaded", self.name());
        self.notify(EffectEvent::ContentLoaded);
        Ok(())
    }

    fn apply(&mut self, ctx: &mut dyn DeviceContext) -> EffectResult<()> {
        if self.disposed {
            return Err(EffectError::Disposed);
        }
        let Some(gpu) = self.gpu.as_ref() else {
            log::error!("ClusteredForward: apply called before content was loaded");
            return Err(EffectError::NotLoaded);
        };
        let Some(camera) = self.camera else {
            log::error!("ClusteredForward: apply called without a camera");
            return Err(EffectError::MissingCamera);
        };
        let targets = match self.settings.render_mode {
            RenderMode::SingleThread => None,
            RenderMode::MultiThread => match self.output_targets.as_ref() {
                Some(targets) => Some(targets),
                None => {
                    log::error!("ClusteredForward: multi-threaded apply without output targets");
                    return Err(EffectError::MissingOutputTargets);
                }
            },
        };

        self.lights.pump_updates();

        gpu.bind_all(ctx);

        self.clip_plane
            .consume(|clip| gpu.clip_plane.write_value(&mut *ctx, clip))?;

        gpu.global_lighting
            .write_value(ctx, &self.global_lighting)?;

        let view_changed = self.uploaded_view != Some(camera.view);
        if self.lights.packed().is_dirty() || view_changed {
            let world = self.lights.packed().get();
            for (dst, src) in self.scratch_lights.lights.iter_mut().zip(world.lights.iter()) {
                *dst = if src.enabled() {
                    src.to_view_space(&camera.view)
                } else {
                    *src
                };
            }
            gpu.lights.write_value(ctx, &self.scratch_lights)?;
            self.lights.packed_mut().mark_clean();
            self.uploaded_view = Some(camera.view);
        }

        self.material_buffer
            .consume(|material| gpu.material.write_value(&mut *ctx, material))?;

        if let Some(targets) = targets {
            ctx.set_viewport(&targets.viewport);
            ctx.set_render_targets(targets.depth_stencil, &targets.color_targets);
        }

        Ok(())
    }

    fn dispose(&mut self, content: &mut dyn ContentManager) {
        if self.disposed {
            log::debug!("{}: already disposed", self.name());
            return;
        }

        let device = content.device();
        let buffers = self.dispose_queue.release_all(device);
        let materials = self.materials.release_all(device);
        self.gpu = None;
        self.input_layout = None;
        self.uploaded_view = None;

        if let Some(shader) = self.shader.take() {
            content.release_shader(shader.path());
        }

        self.disposed = true;
        log::info!(
            "{}: disposed ({buffers} GPU objects, {materials} materials released)",
            self.name()
        );
        self.notify(EffectEvent::Disposed);
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn is_content_loaded(&self) -> bool {
        self.gpu.is_some()
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}
