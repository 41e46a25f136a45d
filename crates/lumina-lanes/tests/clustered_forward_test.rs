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

//! Drives the clustered forward effect against recording device doubles.

use lumina_core::math::{LinearRgba, Mat4, Vec3, Vec4};
use lumina_core::renderer::api::*;
use lumina_core::renderer::traits::{ContentManager, DeviceContext, GraphicsDevice};
use lumina_core::renderer::{
    Camera, EffectSettings, Light, LightParams, Material, RenderMode, ResourceError, ShaderError,
};
use lumina_lanes::effect_lane::{ClusteredForwardEffect, Effect, EffectError, EffectEvent};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// --- Recording device ---

#[derive(Debug, Default)]
struct RecordingDevice {
    next_id: AtomicUsize,
    creations: AtomicUsize,
    fail_buffer_at: Option<usize>,
    buffers: Mutex<HashMap<BufferId, (u64, BufferUsage)>>,
    destroyed_buffers: Mutex<Vec<BufferId>>,
    destroyed_layouts: Mutex<Vec<InputLayoutId>>,
}

impl RecordingDevice {
    fn failing_at(n: usize) -> Self {
        Self {
            fail_buffer_at: Some(n),
            ..Default::default()
        }
    }

    fn live_buffers(&self) -> usize {
        self.buffers.lock().unwrap().len()
    }

    fn buffer(&self, id: BufferId) -> Option<(u64, BufferUsage)> {
        self.buffers.lock().unwrap().get(&id).copied()
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_buffer(&self, desc: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        let n = self.creations.fetch_add(1, Ordering::Relaxed);
        if Some(n) == self.fail_buffer_at {
            return Err(ResourceError::BackendError("out of device memory".into()));
        }
        let id = BufferId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.buffers
            .lock()
            .unwrap()
            .insert(id, (desc.size, desc.usage));
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        self.buffers
            .lock()
            .unwrap()
            .remove(&id)
            .ok_or(ResourceError::NotFound)?;
        self.destroyed_buffers.lock().unwrap().push(id);
        Ok(())
    }

    fn create_input_layout(
        &self,
        desc: &InputLayoutDescriptor,
    ) -> Result<InputLayoutId, ResourceError> {
        assert_eq!(desc.elements.len(), 6);
        assert_eq!(desc.elements[0].semantic, "POSITION");
        Ok(InputLayoutId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1))
    }

    fn destroy_input_layout(&self, id: InputLayoutId) -> Result<(), ResourceError> {
        self.destroyed_layouts.lock().unwrap().push(id);
        Ok(())
    }
}

// --- Recording context ---

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Bind(StageSlot, BufferId),
    Map(BufferId, Vec<u8>),
    Update(BufferId, Vec<u8>),
    Viewport(Viewport),
    Targets(Option<DepthStencilViewId>, Vec<RenderTargetId>),
}

struct RecordingContext {
    device: Arc<RecordingDevice>,
    calls: Vec<Call>,
}

impl RecordingContext {
    fn new(device: &Arc<RecordingDevice>) -> Self {
        Self {
            device: device.clone(),
            calls: Vec::new(),
        }
    }

    fn writes_to(&self, id: BufferId) -> Vec<&[u8]> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Map(b, data) | Call::Update(b, data) if *b == id => Some(data.as_slice()),
                _ => None,
            })
            .collect()
    }

    fn write_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Map(..) | Call::Update(..)))
            .count()
    }

    fn clear(&mut self) {
        self.calls.clear();
    }
}

impl DeviceContext for RecordingContext {
    fn set_constant_buffer(&mut self, slot: StageSlot, buffer: BufferId) {
        self.calls.push(Call::Bind(slot, buffer));
    }

    fn map_write_discard(
        &mut self,
        buffer: BufferId,
        write: &mut dyn FnMut(&mut [u8]) -> Result<(), ResourceError>,
    ) -> Result<(), ResourceError> {
        let (size, usage) = self.device.buffer(buffer).ok_or(ResourceError::NotFound)?;
        if !usage.contains(BufferUsage::MAP_WRITE) {
            return Err(ResourceError::UsageMismatch("map without MAP_WRITE".into()));
        }
        let mut data = vec![0u8; size as usize];
        write(&mut data)?;
        self.calls.push(Call::Map(buffer, data));
        Ok(())
    }

    fn update_subresource(&mut self, buffer: BufferId, data: &[u8]) -> Result<(), ResourceError> {
        let (size, usage) = self.device.buffer(buffer).ok_or(ResourceError::NotFound)?;
        if !usage.contains(BufferUsage::COPY_DST) {
            return Err(ResourceError::UsageMismatch("update without COPY_DST".into()));
        }
        if data.len() as u64 != size {
            return Err(ResourceError::OutOfBounds);
        }
        self.calls.push(Call::Update(buffer, data.to_vec()));
        Ok(())
    }

    fn set_viewport(&mut self, viewport: &Viewport) {
        self.calls.push(Call::Viewport(*viewport));
    }

    fn set_render_targets(
        &mut self,
        depth_stencil: Option<DepthStencilViewId>,
        color_targets: &[RenderTargetId],
    ) {
        self.calls
            .push(Call::Targets(depth_stencil, color_targets.to_vec()));
    }
}

// --- Content and materials ---

struct TestContent {
    device: Arc<RecordingDevice>,
    shader_missing: bool,
    released_shaders: Vec<String>,
}

impl TestContent {
    fn new(device: &Arc<RecordingDevice>) -> Self {
        Self {
            device: device.clone(),
            shader_missing: false,
            released_shaders: Vec::new(),
        }
    }
}

impl ContentManager for TestContent {
    fn device(&self) -> &dyn GraphicsDevice {
        self.device.as_ref()
    }

    fn load_shader(&mut self, path: &str) -> Result<CompiledShader, ShaderError> {
        if self.shader_missing {
            return Err(ShaderError::NotFound {
                path: path.to_string(),
            });
        }
        Ok(CompiledShader::new(path, vec![0x44, 0x58, 0x42, 0x43]))
    }

    fn release_shader(&mut self, path: &str) {
        self.released_shaders.push(path.to_string());
    }
}

#[derive(Debug)]
struct CountingMaterial {
    name: String,
    tag: f32,
    releases: Arc<AtomicUsize>,
}

impl CountingMaterial {
    fn boxed(name: &str, tag: f32, releases: &Arc<AtomicUsize>) -> Box<dyn Material> {
        Box::new(Self {
            name: name.to_string(),
            tag,
            releases: releases.clone(),
        })
    }
}

impl Material for CountingMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn uniforms(&self) -> MaterialUniforms {
        MaterialUniforms {
            specular_power: self.tag,
            ..Default::default()
        }
    }

    fn release(&mut self, _device: &dyn GraphicsDevice) -> Result<(), ResourceError> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// --- Helpers ---

fn loaded_effect(settings: EffectSettings) -> (ClusteredForwardEffect, Arc<RecordingDevice>, TestContent) {
    let device = Arc::new(RecordingDevice::default());
    let mut content = TestContent::new(&device);
    let mut effect = ClusteredForwardEffect::new(settings);
    effect.initialize().unwrap();
    effect.load_content(&mut content).unwrap();
    (effect, device, content)
}

fn light_array(bytes: &[u8]) -> LightArrayUniforms {
    bytemuck::pod_read_unaligned(bytes)
}

fn point_light(x: f32, y: f32, z: f32) -> Light {
    Light::new(LightParams::point(Vec3::new(x, y, z), 10.0))
}

fn ids(effect: &ClusteredForwardEffect) -> GpuResourceIds {
    let gpu = effect.gpu_resources().expect("content loaded");
    GpuResourceIds {
        clip: gpu.clip_plane.id(),
        global: gpu.global_lighting.id(),
        lights: gpu.lights.id(),
        material: gpu.material.id(),
        matrices: gpu.matrices.id(),
        reflection: gpu.reflection.id(),
    }
}

struct GpuResourceIds {
    clip: BufferId,
    global: BufferId,
    lights: BufferId,
    material: BufferId,
    matrices: BufferId,
    reflection: BufferId,
}

// --- Tests ---

#[test]
fn load_creates_six_buffers_and_an_input_layout() {
    let (effect, device, _content) = loaded_effect(EffectSettings::default());
    assert!(effect.is_content_loaded());
    assert_eq!(device.live_buffers(), 6);
    assert!(effect.input_layout().is_some());

    let ids = ids(&effect);
    let (_, global_usage) = device.buffer(ids.global).unwrap();
    assert!(global_usage.contains(BufferUsage::COPY_DST));
    let (lights_size, lights_usage) = device.buffer(ids.lights).unwrap();
    assert!(lights_usage.contains(BufferUsage::MAP_WRITE));
    assert_eq!(lights_size, (64 * MAX_LIGHTS) as u64);
}

#[test]
fn apply_binds_all_buffers_to_their_slots() {
    let (mut effect, device, _content) = loaded_effect(EffectSettings::default());
    effect.set_camera(Camera::identity());
    let mut ctx = RecordingContext::new(&device);
    effect.apply(&mut ctx).unwrap();

    let ids = ids(&effect);
    let binds: Vec<_> = ctx
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::Bind(slot, id) => Some((*slot, *id)),
            _ => None,
        })
        .collect();
    assert_eq!(
        binds,
        vec![
            (StageSlot::vertex(0), ids.matrices),
            (StageSlot::vertex(1), ids.clip),
            (StageSlot::vertex(2), ids.reflection),
            (StageSlot::pixel(0), ids.material),
            (StageSlot::pixel(1), ids.global),
            (StageSlot::pixel(2), ids.lights),
        ]
    );
}

#[test]
fn extra_light_beyond_capacity_is_ignored() {
    let (mut effect, _device, _content) = loaded_effect(EffectSettings::default());
    let mut lights: Vec<Light> = (0..MAX_LIGHTS)
        .map(|i| point_light(i as f32, 0.0, 0.0))
        .collect();
    for light in &mut lights {
        assert!(effect.add_light(light).is_some());
    }
    let before: Vec<_> = effect.lights().to_vec();

    let mut extra = point_light(-1.0, -1.0, -1.0);
    assert!(effect.add_light(&mut extra).is_none());
    assert_eq!(effect.light_count(), MAX_LIGHTS);
    assert_eq!(effect.lights(), before.as_slice());
    assert!(!extra.is_registered());
}

#[test]
fn removed_light_is_disabled_and_others_keep_their_slots() {
    let (mut effect, device, _content) = loaded_effect(EffectSettings::default());
    effect.set_camera(Camera::identity());
    let mut a = point_light(1.0, 0.0, 0.0);
    let mut b = point_light(2.0, 0.0, 0.0);
    let mut c = point_light(3.0, 0.0, 0.0);
    effect.add_light(&mut a);
    let hb = effect.add_light(&mut b).unwrap();
    let hc = effect.add_light(&mut c).unwrap();

    assert!(effect.remove_light(&mut b));
    assert!(!effect.remove_light(&mut b));
    assert_eq!(effect.light_count(), 2);
    assert!(effect.lights().iter().all(|l| l.handle != hb));
    assert_eq!(c.handle(), Some(hc));

    let mut ctx = RecordingContext::new(&device);
    effect.apply(&mut ctx).unwrap();
    let uploads = ctx.writes_to(ids(&effect).lights);
    assert_eq!(uploads.len(), 1);
    let array = light_array(uploads[0]);
    assert!(array.lights[0].enabled());
    assert!(!array.lights[hb.index as usize].enabled());
    assert!(array.lights[hc.index as usize].enabled());
    assert_eq!(array.lights[hc.index as usize].position, [3.0, 0.0, 0.0, 1.0]);
}

#[test]
fn lights_stay_with_the_effect_that_registered_them() {
    let (mut first, first_device, _first_content) = loaded_effect(EffectSettings::default());
    let (mut second, second_device, _second_content) = loaded_effect(EffectSettings::default());
    first.set_camera(Camera::identity());
    second.set_camera(Camera::identity());
    let mut theirs = point_light(1.0, 0.0, 0.0);
    let mut mine = point_light(2.0, 0.0, 0.0);
    let handle = first.add_light(&mut theirs).unwrap();
    second.add_light(&mut mine).unwrap();

    assert!(!second.remove_light(&mut theirs));
    assert!(second.add_light(&mut theirs).is_none());
    assert_eq!(second.light_count(), 1);
    assert_eq!(first.light_count(), 1);
    assert_eq!(theirs.handle(), Some(handle));

    let mut ctx = RecordingContext::new(&second_device);
    second.apply(&mut ctx).unwrap();
    let array = light_array(ctx.writes_to(ids(&second).lights)[0]);
    assert!(array.lights[0].enabled());
    assert_eq!(array.lights[0].position, [2.0, 0.0, 0.0, 1.0]);

    theirs.set_position(Vec3::new(5.0, 0.0, 0.0));
    let mut ctx = RecordingContext::new(&first_device);
    first.apply(&mut ctx).unwrap();
    let array = light_array(ctx.writes_to(ids(&first).lights)[0]);
    assert_eq!(array.lights[0].position, [5.0, 0.0, 0.0, 1.0]);
}

#[test]
fn materials_are_case_insensitive_and_first_wins() {
    let mut effect = ClusteredForwardEffect::default();
    let releases = Arc::new(AtomicUsize::new(0));
    assert!(effect
        .add_material_named("Foo", CountingMaterial::boxed("", 1.0, &releases))
        .unwrap()
        .is_none());
    let rejected = effect
        .add_material_named("foo", CountingMaterial::boxed("", 2.0, &releases))
        .unwrap();
    assert!(rejected.is_some());

    let found = effect.get_material("FOO").unwrap().expect("registered");
    assert_eq!(found.uniforms().specular_power, 1.0);
    assert_eq!(effect.material_count(), 1);
}

#[test]
fn material_lookup_errors() {
    let mut effect = ClusteredForwardEffect::default();
    let releases = Arc::new(AtomicUsize::new(0));
    effect
        .add_material(CountingMaterial::boxed("Stone", 1.0, &releases))
        .unwrap();

    assert!(matches!(
        effect.get_material(""),
        Err(EffectError::InvalidArgument(_))
    ));
    assert!(effect.get_material("Marble").unwrap().is_none());
    assert!(matches!(
        effect.add_material(CountingMaterial::boxed("", 1.0, &releases)),
        Err(EffectError::InvalidArgument(_))
    ));
}

#[test]
fn two_clip_plane_changes_upload_once_with_the_last_value() {
    let (mut effect, device, _content) = loaded_effect(EffectSettings::default());
    effect.set_camera(Camera::identity());
    let mut ctx = RecordingContext::new(&device);
    effect.apply(&mut ctx).unwrap();
    ctx.clear();

    effect.set_clip_plane(Vec4::new(0.0, 1.0, 0.0, 5.0));
    effect.set_clip_plane(Vec4::new(0.0, -1.0, 0.0, 7.0));
    effect.apply(&mut ctx).unwrap();

    let clip = ids(&effect).clip;
    let uploads = ctx.writes_to(clip);
    assert_eq!(uploads.len(), 1);
    let plane: ClipPlaneUniforms = bytemuck::pod_read_unaligned(uploads[0]);
    assert_eq!(plane.plane, [0.0, -1.0, 0.0, 7.0]);

    ctx.clear();
    effect.apply(&mut ctx).unwrap();
    assert!(ctx.writes_to(clip).is_empty());
}

#[test]
fn identity_camera_keeps_positions_and_disables_unused_slots() {
    let (mut effect, device, _content) = loaded_effect(EffectSettings::default());
    let mut lights = [
        point_light(1.0, 2.0, 3.0),
        point_light(-4.0, 5.0, 6.0),
        point_light(7.0, -8.0, 9.0),
    ];
    for light in &mut lights {
        effect.add_light(light).unwrap();
    }
    effect.set_camera(Camera::identity());

    let mut ctx = RecordingContext::new(&device);
    effect.apply(&mut ctx).unwrap();

    let uploads = ctx.writes_to(ids(&effect).lights);
    assert_eq!(uploads.len(), 1);
    let array = light_array(uploads[0]);
    assert_eq!(array.lights[0].position, [1.0, 2.0, 3.0, 1.0]);
    assert_eq!(array.lights[1].position, [-4.0, 5.0, 6.0, 1.0]);
    assert_eq!(array.lights[2].position, [7.0, -8.0, 9.0, 1.0]);
    assert!(array.lights[3..].iter().all(|l| !l.enabled()));
}

#[test]
fn lights_are_transformed_into_view_space_without_touching_world_state() {
    let (mut effect, device, _content) = loaded_effect(EffectSettings::default());
    let mut light = point_light(1.0, 0.0, 0.0);
    effect.add_light(&mut light).unwrap();
    let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -10.0));
    effect.set_camera(Camera::new(view, Mat4::IDENTITY, Vec3::new(0.0, 0.0, 10.0)));

    let mut ctx = RecordingContext::new(&device);
    effect.apply(&mut ctx).unwrap();
    effect.apply(&mut ctx).unwrap();

    let lights_id = ids(&effect).lights;
    let uploads = ctx.writes_to(lights_id);
    // The second apply has neither a light change nor a view change.
    assert_eq!(uploads.len(), 1);
    assert_eq!(light_array(uploads[0]).lights[0].position, [1.0, 0.0, -10.0, 1.0]);
    assert_eq!(
        effect.light_registry().record(0).unwrap().position,
        [1.0, 0.0, 0.0, 1.0]
    );

    // Moving the camera re-uploads even though no light changed.
    ctx.clear();
    let moved = Mat4::from_translation(Vec3::new(0.0, -2.0, 0.0));
    effect.set_camera(Camera::new(moved, Mat4::IDENTITY, Vec3::new(0.0, 2.0, 0.0)));
    effect.apply(&mut ctx).unwrap();
    let uploads = ctx.writes_to(lights_id);
    assert_eq!(uploads.len(), 1);
    assert_eq!(light_array(uploads[0]).lights[0].position, [1.0, -2.0, 0.0, 1.0]);
}

#[test]
fn light_mutations_reach_the_gpu_on_next_apply() {
    let (mut effect, device, _content) = loaded_effect(EffectSettings::default());
    effect.set_camera(Camera::identity());
    let mut light = point_light(0.0, 0.0, 0.0);
    effect.add_light(&mut light).unwrap();

    let mut ctx = RecordingContext::new(&device);
    effect.apply(&mut ctx).unwrap();
    ctx.clear();

    light.set_position(Vec3::new(3.0, 3.0, 3.0));
    light.set_color(LinearRgba::BLUE, 4.0);
    effect.apply(&mut ctx).unwrap();

    let uploads = ctx.writes_to(ids(&effect).lights);
    assert_eq!(uploads.len(), 1);
    let record = light_array(uploads[0]).lights[0];
    assert_eq!(record.position, [3.0, 3.0, 3.0, 1.0]);
    assert_eq!(record.color, [0.0, 0.0, 1.0, 4.0]);
    assert_eq!(effect.lights()[0].params.position, Vec3::new(3.0, 3.0, 3.0));
}

#[test]
fn global_lighting_is_pushed_every_apply() {
    let (mut effect, device, _content) = loaded_effect(EffectSettings::default());
    effect.set_camera(Camera::identity());
    let mut ctx = RecordingContext::new(&device);
    effect.apply(&mut ctx).unwrap();
    effect.set_ambient_color(LinearRgba::rgb(0.1, 0.2, 0.3));
    effect.set_camera_position(Vec4::new(0.0, 2.0, -4.0, 1.0));
    effect.apply(&mut ctx).unwrap();

    let global = ids(&effect).global;
    let updates: Vec<_> = ctx
        .calls
        .iter()
        .filter(|c| matches!(c, Call::Update(id, _) if *id == global))
        .collect();
    assert_eq!(updates.len(), 2);

    let uploads = ctx.writes_to(global);
    let last: GlobalLightingUniforms = bytemuck::pod_read_unaligned(uploads[1]);
    assert_eq!(last.global_ambient, LinearRgba::rgb(0.1, 0.2, 0.3));
    assert_eq!(last.camera_position, [0.0, 2.0, -4.0, 1.0]);
}

#[test]
fn material_buffer_uploads_only_when_changed() {
    let (mut effect, device, _content) = loaded_effect(EffectSettings::default());
    effect.set_camera(Camera::identity());
    let releases = Arc::new(AtomicUsize::new(0));
    effect
        .add_material(CountingMaterial::boxed("Gold", 64.0, &releases))
        .unwrap();

    let mut ctx = RecordingContext::new(&device);
    effect.apply(&mut ctx).unwrap();
    let material = ids(&effect).material;
    assert_eq!(ctx.writes_to(material).len(), 1);

    ctx.clear();
    effect.apply(&mut ctx).unwrap();
    assert!(ctx.writes_to(material).is_empty());

    assert!(effect.use_material("gold").unwrap());
    assert!(!effect.use_material("silver").unwrap());
    effect.apply(&mut ctx).unwrap();
    let uploads = ctx.writes_to(material);
    assert_eq!(uploads.len(), 1);
    let uniforms: MaterialUniforms = bytemuck::pod_read_unaligned(uploads[0]);
    assert_eq!(uniforms.specular_power, 64.0);
}

#[test]
fn apply_without_camera_fails_and_writes_nothing() {
    let (mut effect, device, _content) = loaded_effect(EffectSettings::default());
    let mut light = point_light(1.0, 1.0, 1.0);
    effect.add_light(&mut light);
    effect.set_clip_plane(Vec4::new(1.0, 0.0, 0.0, 0.0));

    let mut ctx = RecordingContext::new(&device);
    assert!(matches!(
        effect.apply(&mut ctx),
        Err(EffectError::MissingCamera)
    ));
    assert!(ctx.calls.is_empty());
    assert_eq!(ctx.write_count(), 0);
}

#[test]
fn apply_before_load_fails() {
    let device = Arc::new(RecordingDevice::default());
    let mut effect = ClusteredForwardEffect::default();
    effect.set_camera(Camera::identity());
    let mut ctx = RecordingContext::new(&device);
    assert!(matches!(effect.apply(&mut ctx), Err(EffectError::NotLoaded)));
    assert!(ctx.calls.is_empty());
}

#[test]
fn multi_thread_mode_rebinds_output_targets() {
    let settings = EffectSettings {
        render_mode: RenderMode::MultiThread,
        ..Default::default()
    };
    let (mut effect, device, _content) = loaded_effect(settings);
    effect.set_camera(Camera::identity());
    let mut ctx = RecordingContext::new(&device);

    assert!(matches!(
        effect.apply(&mut ctx),
        Err(EffectError::MissingOutputTargets)
    ));
    assert!(ctx.calls.is_empty());

    let viewport = Viewport::from_size(1280.0, 720.0);
    effect.set_output_targets(OutputTargets {
        viewport,
        depth_stencil: Some(DepthStencilViewId(7)),
        color_targets: vec![RenderTargetId(3)],
    });
    effect.apply(&mut ctx).unwrap();

    let n = ctx.calls.len();
    assert_eq!(ctx.calls[n - 2], Call::Viewport(viewport));
    assert_eq!(
        ctx.calls[n - 1],
        Call::Targets(Some(DepthStencilViewId(7)), vec![RenderTargetId(3)])
    );
}

#[test]
fn single_thread_mode_leaves_targets_alone() {
    let (mut effect, device, _content) = loaded_effect(EffectSettings::default());
    effect.set_camera(Camera::identity());
    let mut ctx = RecordingContext::new(&device);
    effect.apply(&mut ctx).unwrap();
    assert!(!ctx
        .calls
        .iter()
        .any(|c| matches!(c, Call::Viewport(_) | Call::Targets(..))));
}

#[test]
fn per_draw_writes_need_a_camera() {
    let (mut effect, device, _content) = loaded_effect(EffectSettings::default());
    let mut ctx = RecordingContext::new(&device);
    assert!(matches!(
        effect.write_matrices(&mut ctx, &Mat4::IDENTITY),
        Err(EffectError::MissingCamera)
    ));

    effect.set_camera(Camera::identity());
    let world = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    effect.write_matrices(&mut ctx, &world).unwrap();
    effect.write_reflection(&mut ctx, &Mat4::IDENTITY).unwrap();

    let ids = ids(&effect);
    let uploads = ctx.writes_to(ids.matrices);
    assert_eq!(uploads.len(), 1);
    let matrices: MatricesUniforms = bytemuck::pod_read_unaligned(uploads[0]);
    // Transposed: the translation ends up in the last element of each row.
    assert_eq!(matrices.world[0][3], 1.0);
    assert_eq!(matrices.world[1][3], 2.0);
    assert_eq!(matrices.world[2][3], 3.0);
    assert_eq!(ctx.writes_to(ids.reflection).len(), 1);
}

#[test]
fn dispose_releases_everything_once() {
    let (mut effect, device, mut content) = loaded_effect(EffectSettings::default());
    let events = effect.subscribe();
    let releases = Arc::new(AtomicUsize::new(0));
    effect
        .add_material(CountingMaterial::boxed("A", 1.0, &releases))
        .unwrap();
    effect
        .add_material(CountingMaterial::boxed("B", 2.0, &releases))
        .unwrap();

    effect.dispose(&mut content);
    assert_eq!(device.destroyed_buffers.lock().unwrap().len(), 6);
    assert_eq!(device.destroyed_layouts.lock().unwrap().len(), 1);
    assert_eq!(device.live_buffers(), 0);
    assert_eq!(releases.load(Ordering::SeqCst), 2);
    assert_eq!(content.released_shaders, vec![EffectSettings::default().shader_path]);
    assert!(effect.is_disposed());
    assert_eq!(effect.material_count(), 0);

    effect.dispose(&mut content);
    assert_eq!(device.destroyed_buffers.lock().unwrap().len(), 6);
    assert_eq!(releases.load(Ordering::SeqCst), 2);
    assert_eq!(content.released_shaders.len(), 1);
    assert_eq!(events.drain().collect::<Vec<_>>(), vec![EffectEvent::Disposed]);

    let mut ctx = RecordingContext::new(&device);
    assert!(matches!(effect.apply(&mut ctx), Err(EffectError::Disposed)));
}

#[test]
fn missing_shader_aborts_load() {
    let device = Arc::new(RecordingDevice::default());
    let mut content = TestContent::new(&device);
    content.shader_missing = true;
    let mut effect = ClusteredForwardEffect::default();

    assert!(matches!(
        effect.load_content(&mut content),
        Err(EffectError::Shader(ShaderError::NotFound { .. }))
    ));
    assert!(!effect.is_content_loaded());
    assert_eq!(device.live_buffers(), 0);
}

#[test]
fn buffer_failure_aborts_load_and_dispose_cleans_up() {
    let device = Arc::new(RecordingDevice::failing_at(4));
    let mut content = TestContent::new(&device);
    let mut effect = ClusteredForwardEffect::default();
    let events = effect.subscribe();

    assert!(matches!(
        effect.load_content(&mut content),
        Err(EffectError::Resource(ResourceError::BackendError(_)))
    ));
    assert!(!effect.is_content_loaded());
    assert_eq!(device.live_buffers(), 4);
    assert!(events.try_recv().is_err());

    effect.dispose(&mut content);
    assert_eq!(device.live_buffers(), 0);
    assert_eq!(device.destroyed_layouts.lock().unwrap().len(), 1);
}

#[test]
fn lifecycle_events_are_delivered_in_order() {
    let device = Arc::new(RecordingDevice::default());
    let mut content = TestContent::new(&device);
    let mut effect = ClusteredForwardEffect::default();
    let events = effect.subscribe();

    effect.initialize().unwrap();
    effect.load_content(&mut content).unwrap();
    effect.dispose(&mut content);

    assert_eq!(
        events.drain().collect::<Vec<_>>(),
        vec![
            EffectEvent::Initialized,
            EffectEvent::ContentLoaded,
            EffectEvent::Disposed
        ]
    );
}
