//! One spinning cube with a switchable cull mode.
//!
//! The cull mode is baked into the pipeline, so changing it goes through a
//! lifecycle restart.

use glam::{Mat4, Vec3};
use orrery_engine::device::Gpu;
use orrery_engine::lifecycle::{FrameControl, FrameInput, LifecycleError, Scene};
use orrery_engine::transform::{compose, Camera, LocalTransform};
use orrery_engine::window::{ConfigChange, InteractiveScene};
use winit::keyboard::KeyCode;

use super::common::{bind_buffers, build_pipeline, clear_pass, matrix_uniform, shader, CullMode, MeshPipeline};
use crate::mesh::{cube, Mesh};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CubeConfig {
    pub cull_mode: CullMode,
    pub eye: Vec3,
    pub scale: f32,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::Back,
            eye: Vec3::new(0.0, 0.0, 2.0),
            scale: 0.5,
        }
    }
}

/// Model-view-projection of the cube after `total` seconds.
pub fn cube_mvp(config: &CubeConfig, aspect: f32, total: f32) -> Mat4 {
    let local = LocalTransform::from_scale(Vec3::splat(config.scale)).with_euler_xyz(total, total, total);
    let camera = Camera::looking_at(config.eye, Vec3::ZERO).with_aspect(aspect);
    camera.view_projection() * compose(&local, None)
}

pub struct CubeAssets {
    mesh: Mesh,
    mvp: wgpu::Buffer,
}

pub struct CubePipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
}

#[derive(Debug, Default)]
pub struct CubeScene;

impl Scene for CubeScene {
    type Context = Gpu;
    type Config = CubeConfig;
    type Assets = CubeAssets;
    type Pipeline = CubePipeline;

    fn load_assets(&mut self, gpu: &Gpu, config: &CubeConfig) -> Result<CubeAssets, LifecycleError> {
        let device = gpu.device();
        Ok(CubeAssets {
            mesh: Mesh::upload(device, &cube(), "cube"),
            mvp: matrix_uniform(device, "cube mvp", cube_mvp(config, gpu.aspect(), 0.0)),
        })
    }

    fn build_pipeline(
        &mut self,
        gpu: &Gpu,
        assets: &CubeAssets,
        config: &CubeConfig,
    ) -> Result<CubePipeline, LifecycleError> {
        let device = gpu.device();
        let module = shader(device, "cube shader", include_str!("shaders/cube.wgsl"));

        log::debug!("cube pipeline cull mode: {:?}", config.cull_mode);
        let pipeline = build_pipeline(
            device,
            MeshPipeline {
                label: "cube pipeline",
                shader: &module,
                layout: None,
                vertex_layout: assets.mesh.layout(),
                format: gpu.surface_format(),
                cull_mode: config.cull_mode.face(),
                depth_stencil: None,
            },
        );

        let bind_group = bind_buffers(
            device,
            &pipeline.get_bind_group_layout(0),
            "cube bind group",
            &[&assets.mvp],
        );

        Ok(CubePipeline { pipeline, bind_group })
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

        let mvp = cube_mvp(config, gpu.aspect(), time.total).to_cols_array_2d();
        gpu.queue().write_buffer(&assets.mvp, 0, bytemuck::bytes_of(&mvp));

        {
            let mut pass = clear_pass(&mut target.encoder, &target.view, None, "cube pass");
            pass.set_pipeline(&pipeline.pipeline);
            pass.set_bind_group(0, &pipeline.bind_group, &[]);
            assets.mesh.draw(&mut pass, 0..1);
        }

        gpu.submit(target);
        Ok(FrameControl::Continue)
    }
}

impl InteractiveScene for CubeScene {
    fn on_key(&mut self, key: KeyCode, config: &mut CubeConfig) -> ConfigChange {
        if key != KeyCode::KeyC {
            return ConfigChange::Unchanged;
        }
        config.cull_mode = config.cull_mode.next();
        log::info!("cull mode: {:?}", config.cull_mode);
        ConfigChange::Restart
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cube_starts_unrotated_in_front_of_camera() {
        let config = CubeConfig::default();
        let mvp = cube_mvp(&config, 1.0, 0.0);

        let camera = Camera::looking_at(config.eye, Vec3::ZERO);
        let expected = camera.view_projection() * Mat4::from_scale(Vec3::splat(0.5));
        assert_relative_eq!(mvp, expected, epsilon = 1e-6);

        let center = mvp.project_point3(Vec3::ZERO);
        assert_relative_eq!(center.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(center.y, 0.0, epsilon = 1e-6);
        assert!(center.z > 0.0 && center.z < 1.0);
    }

    #[test]
    fn cube_spins_over_time() {
        let config = CubeConfig::default();
        let a = cube_mvp(&config, 1.0, 0.0);
        let b = cube_mvp(&config, 1.0, 1.0);
        assert!(!a.abs_diff_eq(b, 1e-3));
    }

    #[test]
    fn c_key_cycles_cull_mode_and_requests_restart() {
        let mut scene = CubeScene;
        let mut config = CubeConfig::default();

        assert_eq!(scene.on_key(KeyCode::KeyC, &mut config), ConfigChange::Restart);
        assert_eq!(config.cull_mode, CullMode::None);

        assert_eq!(scene.on_key(KeyCode::KeyW, &mut config), ConfigChange::Unchanged);
        assert_eq!(config.cull_mode, CullMode::None);
    }
}
