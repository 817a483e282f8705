//! Phong-lit cubes plus a small marker cube at the light position.
//!
//! Two pipelines share one pass: the lit cubes bind models, view, projection
//! and normal matrices (group 0), the light position (group 1) and the camera
//! position (group 2); the marker only needs its own model matrix.

use glam::{Mat4, Vec3};
use orrery_engine::device::Gpu;
use orrery_engine::lifecycle::{FrameControl, FrameInput, LifecycleError, Scene};
use orrery_engine::transform::{compose, normal_matrix, pack_matrices, Camera, LocalTransform};
use orrery_engine::window::{ConfigChange, InteractiveScene};
use winit::keyboard::KeyCode;

use super::common::{
    bind_buffers, build_pipeline, clear_pass, matrix_uniform, point_uniform, random_offsets, shader,
    storage_buffer, MeshPipeline,
};
use crate::mesh::{cube, Mesh};

const MOVE_STEP: f32 = 0.5;
const LIGHT_MARKER_SCALE: f32 = 0.1;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LitConfig {
    pub eye: Vec3,
    pub light: Vec3,
    pub count: usize,
    pub spread: f32,
    pub cube_scale: f32,
    pub seed: u64,
}

impl Default for LitConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 6.0),
            light: Vec3::new(1.5, 1.5, 2.0),
            count: 5,
            spread: 2.0,
            cube_scale: 0.5,
            seed: 0x11fe,
        }
    }
}

impl LitConfig {
    pub fn camera(&self, aspect: f32) -> Camera {
        Camera::looking_at(self.eye, Vec3::ZERO).with_aspect(aspect)
    }
}

/// Model matrices of the lit cubes after `total` seconds.
pub fn lit_models(offsets: &[Vec3], scale: f32, total: f32) -> Vec<Mat4> {
    offsets
        .iter()
        .map(|&offset| {
            let local = LocalTransform::from_translation(offset)
                .with_euler_xyz(1.0, 1.0 + 0.5 * total, 1.0)
                .with_scale(Vec3::splat(scale));
            compose(&local, None)
        })
        .collect()
}

pub fn light_model(light: Vec3) -> Mat4 {
    compose(
        &LocalTransform::from_translation(light).with_scale(Vec3::splat(LIGHT_MARKER_SCALE)),
        None,
    )
}

pub struct LitAssets {
    mesh: Mesh,
    offsets: Vec<Vec3>,
    models: wgpu::Buffer,
    normals: wgpu::Buffer,
    view: wgpu::Buffer,
    projection: wgpu::Buffer,
    light: wgpu::Buffer,
    eye: wgpu::Buffer,
    light_model: wgpu::Buffer,
}

pub struct LitPipeline {
    lit: wgpu::RenderPipeline,
    lit_groups: [wgpu::BindGroup; 3],
    marker: wgpu::RenderPipeline,
    marker_group: wgpu::BindGroup,
}

#[derive(Debug, Default)]
pub struct LitScene;

impl LitScene {
    fn write_frame(gpu: &Gpu, assets: &LitAssets, config: &LitConfig, total: f32) {
        let camera = config.camera(gpu.aspect());
        let models = lit_models(&assets.offsets, config.cube_scale, total);
        let normals: Vec<Mat4> = models.iter().map(|&m| normal_matrix(m)).collect();

        let queue = gpu.queue();
        queue.write_buffer(&assets.models, 0, bytemuck::cast_slice(&pack_matrices(&models)));
        queue.write_buffer(&assets.normals, 0, bytemuck::cast_slice(&pack_matrices(&normals)));
        queue.write_buffer(&assets.view, 0, bytemuck::bytes_of(&camera.view().to_cols_array_2d()));
        queue.write_buffer(
            &assets.projection,
            0,
            bytemuck::bytes_of(&camera.projection().to_cols_array_2d()),
        );
        queue.write_buffer(&assets.light, 0, bytemuck::bytes_of(&config.light.extend(1.0).to_array()));
        queue.write_buffer(&assets.eye, 0, bytemuck::bytes_of(&config.eye.extend(1.0).to_array()));
        queue.write_buffer(
            &assets.light_model,
            0,
            bytemuck::bytes_of(&light_model(config.light).to_cols_array_2d()),
        );
    }
}

impl Scene for LitScene {
    type Context = Gpu;
    type Config = LitConfig;
    type Assets = LitAssets;
    type Pipeline = LitPipeline;

    fn load_assets(&mut self, gpu: &Gpu, config: &LitConfig) -> Result<LitAssets, LifecycleError> {
        if config.count == 0 {
            return Err(LifecycleError::asset_load("lit cubes", "cube count must be at least one"));
        }

        let device = gpu.device();
        let offsets = random_offsets(config.count, config.spread, config.seed);
        let models = lit_models(&offsets, config.cube_scale, 0.0);
        let normals: Vec<Mat4> = models.iter().map(|&m| normal_matrix(m)).collect();
        let camera = config.camera(gpu.aspect());

        Ok(LitAssets {
            mesh: Mesh::upload(device, &cube(), "cube"),
            models: storage_buffer(device, "lit models", bytemuck::cast_slice(&pack_matrices(&models))),
            normals: storage_buffer(device, "lit normals", bytemuck::cast_slice(&pack_matrices(&normals))),
            view: matrix_uniform(device, "lit view", camera.view()),
            projection: matrix_uniform(device, "lit projection", camera.projection()),
            light: point_uniform(device, "light position", config.light),
            eye: point_uniform(device, "camera position", config.eye),
            light_model: matrix_uniform(device, "light model", light_model(config.light)),
            offsets,
        })
    }

    fn build_pipeline(
        &mut self,
        gpu: &Gpu,
        assets: &LitAssets,
        _config: &LitConfig,
    ) -> Result<LitPipeline, LifecycleError> {
        let device = gpu.device();
        let format = gpu.surface_format();

        let lit_module = shader(device, "lit shader", include_str!("shaders/lit.wgsl"));
        let lit = build_pipeline(
            device,
            MeshPipeline {
                label: "lit pipeline",
                shader: &lit_module,
                layout: None,
                vertex_layout: assets.mesh.layout(),
                format,
                cull_mode: Some(wgpu::Face::Back),
                depth_stencil: None,
            },
        );

        let lit_groups = [
            bind_buffers(
                device,
                &lit.get_bind_group_layout(0),
                "lit transforms",
                &[&assets.models, &assets.view, &assets.projection, &assets.normals],
            ),
            bind_buffers(device, &lit.get_bind_group_layout(1), "lit light", &[&assets.light]),
            bind_buffers(device, &lit.get_bind_group_layout(2), "lit camera", &[&assets.eye]),
        ];

        let marker_module = shader(device, "light marker shader", include_str!("shaders/light.wgsl"));
        let marker = build_pipeline(
            device,
            MeshPipeline {
                label: "light marker pipeline",
                shader: &marker_module,
                layout: None,
                vertex_layout: assets.mesh.layout(),
                format,
                cull_mode: Some(wgpu::Face::Back),
                depth_stencil: None,
            },
        );

        let marker_group = bind_buffers(
            device,
            &marker.get_bind_group_layout(0),
            "light marker transforms",
            &[&assets.light_model, &assets.view, &assets.projection],
        );

        Ok(LitPipeline {
            lit,
            lit_groups,
            marker,
            marker_group,
        })
    }

    fn render(&mut self, frame: FrameInput<'_, Self>) -> anyhow::Result<FrameControl> {
        let FrameInput {
            context: gpu,
            assets,
            pipeline,
            config,
            time,
        } = frame;

        let Some(mut target) = gpu.acquire_frame()? else {
            return Ok(FrameControl::Continue);
        };

        Self::write_frame(gpu, assets, config, time.total);

        {
            let mut pass = clear_pass(&mut target.encoder, &target.view, None, "lit pass");

            pass.set_pipeline(&pipeline.lit);
            for (index, group) in pipeline.lit_groups.iter().enumerate() {
                pass.set_bind_group(index as u32, group, &[]);
            }
            assets.mesh.draw(&mut pass, 0..assets.offsets.len() as u32);

            pass.set_pipeline(&pipeline.marker);
            pass.set_bind_group(0, &pipeline.marker_group, &[]);
            assets.mesh.draw(&mut pass, 0..1);
        }

        gpu.submit(target);
        Ok(FrameControl::Continue)
    }
}

impl InteractiveScene for LitScene {
    /// Arrow keys move the light in its XY plane, WASD moves the camera.
    fn on_key(&mut self, key: KeyCode, config: &mut LitConfig) -> ConfigChange {
        match key {
            KeyCode::ArrowLeft => config.light.x -= MOVE_STEP,
            KeyCode::ArrowRight => config.light.x += MOVE_STEP,
            KeyCode::ArrowUp => config.light.y += MOVE_STEP,
            KeyCode::ArrowDown => config.light.y -= MOVE_STEP,
            KeyCode::KeyW => config.eye.z -= MOVE_STEP,
            KeyCode::KeyS => config.eye.z += MOVE_STEP,
            KeyCode::KeyA => config.eye.x -= MOVE_STEP,
            KeyCode::KeyD => config.eye.x += MOVE_STEP,
            _ => return ConfigChange::Unchanged,
        }
        ConfigChange::Resume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn models_place_cubes_at_offsets() {
        let offsets = random_offsets(5, 2.0, 3);
        let models = lit_models(&offsets, 0.5, 1.25);
        assert_eq!(models.len(), 5);
        for (model, offset) in models.iter().zip(&offsets) {
            assert_relative_eq!(model.transform_point3(Vec3::ZERO), *offset, epsilon = 1e-5);
        }
    }

    #[test]
    fn normals_stay_perpendicular_under_scale() {
        let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0)) * Mat4::from_rotation_z(0.7);
        let n = normal_matrix(model).transform_vector3(Vec3::Y).normalize();
        // Tangent of the surface whose untransformed normal was +Y.
        let t = model.transform_vector3(Vec3::X);
        assert_relative_eq!(n.dot(t), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn light_marker_is_small_and_at_light() {
        let m = light_model(Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(m.transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(m.transform_vector3(Vec3::X).length(), LIGHT_MARKER_SCALE);
    }

    #[test]
    fn keys_move_light_and_camera() {
        let mut scene = LitScene;
        let mut config = LitConfig::default();
        let start = config;

        assert_eq!(scene.on_key(KeyCode::ArrowRight, &mut config), ConfigChange::Resume);
        assert_eq!(scene.on_key(KeyCode::KeyW, &mut config), ConfigChange::Resume);
        assert_relative_eq!(config.light, start.light + Vec3::new(0.5, 0.0, 0.0));
        assert_relative_eq!(config.eye, start.eye - Vec3::new(0.0, 0.0, 0.5));

        assert_eq!(scene.on_key(KeyCode::Space, &mut config), ConfigChange::Unchanged);
    }
}
