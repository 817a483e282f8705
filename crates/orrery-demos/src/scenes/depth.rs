//! Three overlapping discs sorted by the depth test, one of them movable.

use std::f32::consts::PI;

use glam::{Mat4, Vec3};
use orrery_engine::device::Gpu;
use orrery_engine::lifecycle::{FrameControl, FrameInput, LifecycleError, Scene};
use orrery_engine::transform::{compose, pack_matrices, Camera, LocalTransform};
use orrery_engine::window::{ConfigChange, InteractiveScene};
use winit::keyboard::KeyCode;

use super::common::{
    bind_buffers, build_pipeline, clear_pass, depth_less, shader, storage_buffer, DepthTarget, MeshPipeline,
};
use crate::mesh::{circle, Mesh};

const DISC_RADIUS: f32 = 0.05;
const DISC_SEGMENTS: u32 = 48;
const MOVE_STEP: f32 = 0.1;

/// Position of the red disc. `x`/`y` stay in `[-1, 1]`, `z` in `[0, 0.9]`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct DepthConfig {
    pub pos: Vec3,
}

impl DepthConfig {
    fn nudge(&mut self, delta: Vec3) {
        let pos = self.pos + delta;
        self.pos = pos.clamp(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.9));
    }
}

pub fn depth_camera(aspect: f32) -> Camera {
    Camera {
        fov_y: PI * 0.3,
        near: 0.001,
        far: 10.0,
        ..Camera::looking_at(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO)
    }
    .with_aspect(aspect)
}

/// Red (movable), green and blue disc models, in draw order.
pub fn disc_models(config: &DepthConfig) -> [Mat4; 3] {
    let disc = |translation: Vec3, scale: f32| {
        compose(
            &LocalTransform::from_translation(translation).with_scale(Vec3::new(scale, scale, 1.0)),
            None,
        )
    };

    [
        disc(config.pos, 7.0),
        disc(Vec3::new(0.25, 0.25, 0.5), 7.0),
        disc(Vec3::new(-0.25, -0.25, 0.75), 9.0),
    ]
}

fn disc_mvps(config: &DepthConfig, aspect: f32) -> Vec<[[f32; 4]; 4]> {
    let view_projection = depth_camera(aspect).view_projection();
    let mvps: Vec<Mat4> = disc_models(config).iter().map(|&m| view_projection * m).collect();
    pack_matrices(&mvps)
}

pub struct DepthAssets {
    mesh: Mesh,
    mvps: wgpu::Buffer,
}

pub struct DepthPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
}

/// Holds the depth attachment, rebuilt on every asset load and whenever the
/// surface size changes.
#[derive(Default)]
pub struct DepthScene {
    depth: Option<DepthTarget>,
}

impl Scene for DepthScene {
    type Context = Gpu;
    type Config = DepthConfig;
    type Assets = DepthAssets;
    type Pipeline = DepthPipeline;

    fn load_assets(&mut self, gpu: &Gpu, config: &DepthConfig) -> Result<DepthAssets, LifecycleError> {
        let device = gpu.device();
        let size = gpu.size();
        self.depth = Some(DepthTarget::new(device, size.width, size.height));

        Ok(DepthAssets {
            mesh: Mesh::upload(device, &circle(DISC_RADIUS, DISC_SEGMENTS), "disc"),
            mvps: storage_buffer(
                device,
                "disc mvps",
                bytemuck::cast_slice(&disc_mvps(config, gpu.aspect())),
            ),
        })
    }

    fn build_pipeline(
        &mut self,
        gpu: &Gpu,
        assets: &DepthAssets,
        _config: &DepthConfig,
    ) -> Result<DepthPipeline, LifecycleError> {
        let device = gpu.device();
        let module = shader(device, "depth shader", include_str!("shaders/depth.wgsl"));

        let pipeline = build_pipeline(
            device,
            MeshPipeline {
                label: "depth pipeline",
                shader: &module,
                layout: None,
                vertex_layout: assets.mesh.layout(),
                format: gpu.surface_format(),
                cull_mode: None,
                depth_stencil: Some(depth_less()),
            },
        );

        let bind_group = bind_buffers(
            device,
            &pipeline.get_bind_group_layout(0),
            "depth bind group",
            &[&assets.mvps],
        );

        Ok(DepthPipeline { pipeline, bind_group })
    }

    fn render(&mut self, frame: FrameInput<'_, Self>) -> anyhow::Result<FrameControl> {
        let FrameInput {
            context: gpu,
            assets,
            pipeline,
            config,
            ..
        } = frame;

        let Some(mut target) = gpu.acquire_frame()? else {
            return Ok(FrameControl::Continue);
        };

        let size = gpu.size();
        let depth = match self.depth.take() {
            Some(depth) if depth.fits(size.width, size.height) => depth,
            _ => {
                log::debug!("depth target resized to {}x{}", size.width, size.height);
                DepthTarget::new(gpu.device(), size.width, size.height)
            }
        };
        let depth = self.depth.insert(depth);

        let mvps = disc_mvps(config, gpu.aspect());
        gpu.queue().write_buffer(&assets.mvps, 0, bytemuck::cast_slice(&mvps));

        {
            let mut pass = clear_pass(&mut target.encoder, &target.view, Some(depth.view()), "depth pass");
            pass.set_pipeline(&pipeline.pipeline);
            pass.set_bind_group(0, &pipeline.bind_group, &[]);
            assets.mesh.draw(&mut pass, 0..mvps.len() as u32);
        }

        gpu.submit(target);
        Ok(FrameControl::Continue)
    }
}

impl InteractiveScene for DepthScene {
    /// Arrow keys move the red disc in x/y, Q/E move it away from/toward the camera.
    fn on_key(&mut self, key: KeyCode, config: &mut DepthConfig) -> ConfigChange {
        let delta = match key {
            KeyCode::ArrowLeft => Vec3::NEG_X,
            KeyCode::ArrowRight => Vec3::X,
            KeyCode::ArrowUp => Vec3::Y,
            KeyCode::ArrowDown => Vec3::NEG_Y,
            KeyCode::KeyQ => Vec3::NEG_Z,
            KeyCode::KeyE => Vec3::Z,
            _ => return ConfigChange::Unchanged,
        };
        config.nudge(delta * MOVE_STEP);
        log::debug!("red disc at {}", config.pos);
        ConfigChange::Resume
    }
}
