//! A field of spinning cubes seen from a movable camera.

use glam::{Mat4, Vec3};
use orrery_engine::device::Gpu;
use orrery_engine::lifecycle::{FrameControl, FrameInput, LifecycleError, Scene};
use orrery_engine::transform::{compose, pack_matrices, Camera, LocalTransform};
use orrery_engine::window::{ConfigChange, InteractiveScene};
use winit::keyboard::KeyCode;

use super::common::{bind_buffers, build_pipeline, clear_pass, random_offsets, shader, storage_buffer, MeshPipeline};
use crate::mesh::{cube, Mesh};

const CAMERA_STEP: f32 = 0.5;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FieldConfig {
    /// Camera position; the camera always looks at the field center.
    pub eye: Vec3,
    pub count: usize,
    pub spread: f32,
    pub cube_scale: f32,
    pub seed: u64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 3.0),
            count: 500,
            spread: 1.0,
            cube_scale: 0.3,
            seed: 0x0e11,
        }
    }
}

impl FieldConfig {
    pub fn camera(&self, aspect: f32) -> Camera {
        let mut camera = Camera::looking_at(self.eye, Vec3::ZERO).with_aspect(aspect);

        // Keep the view defined when the eye reaches the center or the Y axis.
        let forward = -self.eye;
        if forward.length_squared() < 1e-6 {
            camera.target = self.eye - Vec3::Z;
        } else if forward.normalize().cross(Vec3::Y).length_squared() < 1e-6 {
            camera.up = Vec3::NEG_Z;
        }
        camera
    }
}

/// `view_projection · T(offset) · R(t, t, t) · S(scale)` per cube.
pub fn field_matrices(offsets: &[Vec3], scale: f32, view_projection: Mat4, total: f32) -> Vec<Mat4> {
    offsets
        .iter()
        .map(|&offset| {
            let local = LocalTransform::from_translation(offset)
                .with_euler_xyz(total, total, total)
                .with_scale(Vec3::splat(scale));
            view_projection * compose(&local, None)
        })
        .collect()
}

pub struct FieldAssets {
    mesh: Mesh,
    offsets: Vec<Vec3>,
    mvps: wgpu::Buffer,
}

pub struct FieldPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
}

#[derive(Debug, Default)]
pub struct FieldScene;

impl Scene for FieldScene {
    type Context = Gpu;
    type Config = FieldConfig;
    type Assets = FieldAssets;
    type Pipeline = FieldPipeline;

    fn load_assets(&mut self, gpu: &Gpu, config: &FieldConfig) -> Result<FieldAssets, LifecycleError> {
        if config.count == 0 {
            return Err(LifecycleError::asset_load(
                "cube field",
                "cube count must be at least one",
            ));
        }

        let device = gpu.device();
        let offsets = random_offsets(config.count, config.spread, config.seed);
        let view_projection = config.camera(gpu.aspect()).view_projection();
        let mvps = pack_matrices(&field_matrices(&offsets, config.cube_scale, view_projection, 0.0));

        log::debug!("cube field: {} cubes", offsets.len());
        Ok(FieldAssets {
            mesh: Mesh::upload(device, &cube(), "cube"),
            mvps: storage_buffer(device, "field mvps", bytemuck::cast_slice(&mvps)),
            offsets,
        })
    }

    fn build_pipeline(
        &mut self,
        gpu: &Gpu,
        assets: &FieldAssets,
        _config: &FieldConfig,
    ) -> Result<FieldPipeline, LifecycleError> {
        let device = gpu.device();
        let module = shader(device, "field shader", include_str!("shaders/field.wgsl"));

        let pipeline = build_pipeline(
            device,
            MeshPipeline {
                label: "field pipeline",
                shader: &module,
                layout: None,
                vertex_layout: assets.mesh.layout(),
                format: gpu.surface_format(),
                cull_mode: Some(wgpu::Face::Back),
                depth_stencil: None,
            },
        );

        let bind_group = bind_buffers(
            device,
            &pipeline.get_bind_group_layout(0),
            "field bind group",
            &[&assets.mvps],
        );

        Ok(FieldPipeline { pipeline, bind_group })
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

        let view_projection = config.camera(gpu.aspect()).view_projection();
        let mvps = pack_matrices(&field_matrices(
            &assets.offsets,
            config.cube_scale,
            view_projection,
            time.total,
        ));
        gpu.queue().write_buffer(&assets.mvps, 0, bytemuck::cast_slice(&mvps));

        {
            let mut pass = clear_pass(&mut target.encoder, &target.view, None, "field pass");
            pass.set_pipeline(&pipeline.pipeline);
            pass.set_bind_group(0, &pipeline.bind_group, &[]);
            assets.mesh.draw(&mut pass, 0..assets.offsets.len() as u32);
        }

        gpu.submit(target);
        Ok(FrameControl::Continue)
    }
}

impl InteractiveScene for FieldScene {
    fn on_key(&mut self, key: KeyCode, config: &mut FieldConfig) -> ConfigChange {
        let step = match key {
            KeyCode::KeyW => Vec3::NEG_Z,
            KeyCode::KeyS => Vec3::Z,
            KeyCode::KeyA => Vec3::NEG_X,
            KeyCode::KeyD => Vec3::X,
            KeyCode::KeyQ => Vec3::NEG_Y,
            KeyCode::KeyE => Vec3::Y,
            _ => return ConfigChange::Unchanged,
        };
        config.eye += step * CAMERA_STEP;
        log::debug!("field camera: {}", config.eye);
        ConfigChange::Resume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ── matrices ──────────────────────────────────────────────────────────

    #[test]
    fn one_matrix_per_offset_in_order() {
        let offsets = [Vec3::X, Vec3::Y, Vec3::Z];
        let mvps = field_matrices(&offsets, 0.3, Mat4::IDENTITY, 0.0);
        assert_eq!(mvps.len(), 3);
        for (mvp, offset) in mvps.iter().zip(offsets) {
            assert_relative_eq!(mvp.transform_point3(Vec3::ZERO), offset, epsilon = 1e-6);
        }
    }

    #[test]
    fn scale_applies_before_translation() {
        let mvps = field_matrices(&[Vec3::X], 0.3, Mat4::IDENTITY, 0.0);
        let corner = mvps[0].transform_point3(Vec3::splat(1.0));
        assert_relative_eq!(corner, Vec3::new(1.3, 0.3, 0.3), epsilon = 1e-6);
    }

    #[test]
    fn view_projection_is_applied_last() {
        let vp = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
        let mvps = field_matrices(&[Vec3::X], 1.0, vp, 0.0);
        assert_relative_eq!(
            mvps[0].transform_point3(Vec3::ZERO),
            Vec3::new(1.0, 0.0, -5.0),
            epsilon = 1e-6
        );
    }

    // ── camera ────────────────────────────────────────────────────────────

    #[test]
    fn default_camera_sees_the_field_center() {
        let camera = FieldConfig::default().camera(1.0);
        let ndc = camera.view_projection().project_point3(Vec3::ZERO);
        assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn moved_camera_still_faces_the_center() {
        let config = FieldConfig {
            eye: Vec3::new(1.5, -0.5, 2.0),
            ..FieldConfig::default()
        };
        let ndc = config.camera(1.0).view_projection().project_point3(Vec3::ZERO);
        assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn camera_on_center_or_vertical_axis_stays_finite() {
        for eye in [Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0)] {
            let config = FieldConfig {
                eye,
                ..FieldConfig::default()
            };
            assert!(config.camera(1.0).view_projection().is_finite());
        }
    }

    #[test]
    fn wasd_moves_camera() {
        let mut scene = FieldScene;
        let mut config = FieldConfig::default();

        assert_eq!(scene.on_key(KeyCode::KeyW, &mut config), ConfigChange::Resume);
        assert_eq!(scene.on_key(KeyCode::KeyD, &mut config), ConfigChange::Resume);
        assert_eq!(scene.on_key(KeyCode::KeyE, &mut config), ConfigChange::Resume);
        assert_relative_eq!(config.eye, Vec3::new(0.5, 0.5, 2.5));

        assert_eq!(scene.on_key(KeyCode::KeyC, &mut config), ConfigChange::Unchanged);
        assert_relative_eq!(config.eye, Vec3::new(0.5, 0.5, 2.5));
    }
}
