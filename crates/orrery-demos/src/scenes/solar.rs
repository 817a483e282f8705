//! Sun, earth and moon as parent-chained circles, drawn in one instanced call.

use glam::{Mat4, Vec3};
use orrery_engine::device::Gpu;
use orrery_engine::lifecycle::{FrameControl, FrameInput, LifecycleError, Scene};
use orrery_engine::transform::{pack_matrices, LocalTransform, Orbit, SceneGraph};
use orrery_engine::window::{ConfigChange, InteractiveScene};
use winit::keyboard::KeyCode;

use super::common::{bind_buffers, build_pipeline, matrix_uniform, shader, storage_buffer, MeshPipeline};
use crate::mesh::{circle, Mesh};

const BODY_RADIUS: f32 = 0.125;
const BODY_SEGMENTS: u32 = 48;
const MOON_RATE_STEP: f32 = 0.5;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SolarConfig {
    pub earth: Orbit,
    pub moon: Orbit,
    pub sun_scale: f32,
    pub earth_scale: f32,
    pub moon_scale: f32,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            earth: Orbit::new(0.6, 1.0),
            moon: Orbit::new(0.2, 3.0),
            sun_scale: 1.0,
            earth_scale: 0.5,
            moon_scale: 0.25,
        }
    }
}

/// Sun at the origin, earth orbiting the sun, moon orbiting the earth.
pub fn solar_graph(config: &SolarConfig) -> SceneGraph {
    let mut graph = SceneGraph::new();

    let sun = graph.add_root(LocalTransform::IDENTITY);
    let earth = graph.add_child(sun, config.earth);
    let moon = graph.add_child(earth, config.moon);

    graph.set_body_scale(sun, Vec3::splat(config.sun_scale));
    graph.set_body_scale(earth, Vec3::splat(config.earth_scale));
    graph.set_body_scale(moon, Vec3::splat(config.moon_scale));

    graph
}

/// Squeezes the longer axis so circles stay round on a non-square surface.
pub fn aspect_correction(aspect: f32) -> Mat4 {
    if !aspect.is_finite() || aspect <= 0.0 {
        return Mat4::IDENTITY;
    }
    if aspect >= 1.0 {
        Mat4::from_scale(Vec3::new(1.0 / aspect, 1.0, 1.0))
    } else {
        Mat4::from_scale(Vec3::new(1.0, aspect, 1.0))
    }
}

pub struct SolarAssets {
    mesh: Mesh,
    bodies: wgpu::Buffer,
    view: wgpu::Buffer,
    body_count: u32,
}

pub struct SolarPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
}

#[derive(Debug, Default)]
pub struct SolarScene;

impl Scene for SolarScene {
    type Context = Gpu;
    type Config = SolarConfig;
    type Assets = SolarAssets;
    type Pipeline = SolarPipeline;

    fn load_assets(&mut self, gpu: &Gpu, config: &SolarConfig) -> Result<SolarAssets, LifecycleError> {
        let device = gpu.device();
        let matrices = pack_matrices(&solar_graph(config).draw_matrices(0.0));

        Ok(SolarAssets {
            mesh: Mesh::upload(device, &circle(BODY_RADIUS, BODY_SEGMENTS), "body"),
            bodies: storage_buffer(device, "solar bodies", bytemuck::cast_slice(&matrices)),
            view: matrix_uniform(device, "solar view", aspect_correction(gpu.aspect())),
            body_count: matrices.len() as u32,
        })
    }

    fn build_pipeline(
        &mut self,
        gpu: &Gpu,
        assets: &SolarAssets,
        _config: &SolarConfig,
    ) -> Result<SolarPipeline, LifecycleError> {
        let device = gpu.device();
        let module = shader(device, "solar shader", include_str!("shaders/solar.wgsl"));

        let pipeline = build_pipeline(
            device,
            MeshPipeline {
                label: "solar pipeline",
                shader: &module,
                layout: None,
                vertex_layout: assets.mesh.layout(),
                format: gpu.surface_format(),
                cull_mode: None,
                depth_stencil: None,
            },
        );

        let bind_group = bind_buffers(
            device,
            &pipeline.get_bind_group_layout(0),
            "solar bind group",
            &[&assets.bodies, &assets.view],
        );

        Ok(SolarPipeline { pipeline, bind_group })
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

        let matrices = pack_matrices(&solar_graph(config).draw_matrices(time.total));
        let view = aspect_correction(gpu.aspect()).to_cols_array_2d();
        gpu.queue()
            .write_buffer(&assets.bodies, 0, bytemuck::cast_slice(&matrices));
        gpu.queue().write_buffer(&assets.view, 0, bytemuck::bytes_of(&view));

        {
            let mut pass = super::common::clear_pass(&mut target.encoder, &target.view, None, "solar pass");
            pass.set_pipeline(&pipeline.pipeline);
            pass.set_bind_group(0, &pipeline.bind_group, &[]);
            assets.mesh.draw(&mut pass, 0..assets.body_count);
        }

        gpu.submit(target);
        Ok(FrameControl::Continue)
    }
}

impl InteractiveScene for SolarScene {
    fn on_key(&mut self, key: KeyCode, config: &mut SolarConfig) -> ConfigChange {
        match key {
            KeyCode::ArrowUp => config.moon.angular_rate += MOON_RATE_STEP,
            KeyCode::ArrowDown => config.moon.angular_rate -= MOON_RATE_STEP,
            _ => return ConfigChange::Unchanged,
        }
        log::info!("moon angular rate: {}", config.moon.angular_rate);
        ConfigChange::Resume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn position(m: Mat4) -> Vec3 {
        m.transform_point3(Vec3::ZERO)
    }

    #[test]
    fn bodies_line_up_at_time_zero() {
        let world = solar_graph(&SolarConfig::default()).world_matrices(0.0);
        assert_eq!(world.len(), 3);
        assert_relative_eq!(position(world[0]), Vec3::ZERO);
        assert_relative_eq!(position(world[1]), Vec3::new(0.6, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(position(world[2]), Vec3::new(0.8, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn moon_follows_earth_a_quarter_turn_later() {
        let config = SolarConfig {
            moon: Orbit::new(0.2, 0.0),
            ..SolarConfig::default()
        };
        let world = solar_graph(&config).world_matrices(FRAC_PI_2);
        // Earth at +Y; the moon arm turns with it and points along +Y too.
        assert_relative_eq!(position(world[1]), Vec3::new(0.0, 0.6, 0.0), epsilon = 1e-6);
        assert_relative_eq!(position(world[2]), Vec3::new(0.0, 0.8, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn earth_scale_does_not_shrink_moon_orbit() {
        let config = SolarConfig {
            earth_scale: 0.1,
            ..SolarConfig::default()
        };
        let drawn = solar_graph(&config).draw_matrices(0.0);
        assert_relative_eq!(position(drawn[2]), Vec3::new(0.8, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(drawn[2].x_axis.x, 0.25, epsilon = 1e-6);
    }

    #[test]
    fn aspect_correction_keeps_the_short_axis() {
        let wide = aspect_correction(2.0);
        assert_relative_eq!(wide.x_axis.x, 0.5);
        assert_relative_eq!(wide.y_axis.y, 1.0);

        let tall = aspect_correction(0.5);
        assert_relative_eq!(tall.x_axis.x, 1.0);
        assert_relative_eq!(tall.y_axis.y, 0.5);

        assert_eq!(aspect_correction(0.0), Mat4::IDENTITY);
    }

    #[test]
    fn arrow_keys_tune_moon_rate() {
        let mut scene = SolarScene;
        let mut config = SolarConfig::default();

        assert_eq!(scene.on_key(KeyCode::ArrowUp, &mut config), ConfigChange::Resume);
        assert_relative_eq!(config.moon.angular_rate, 3.5);

        assert_eq!(scene.on_key(KeyCode::ArrowDown, &mut config), ConfigChange::Resume);
        assert_eq!(scene.on_key(KeyCode::KeyX, &mut config), ConfigChange::Unchanged);
        assert_relative_eq!(config.moon.angular_rate, 3.0);
    }
}
