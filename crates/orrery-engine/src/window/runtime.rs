use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::device::{Gpu, GpuInit, SurfaceProvider};
use crate::lifecycle::{
    FrameHandle, FrameQueue, FrameScheduler, LifecycleError, RendererLifecycle, Scene,
};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "orrery".to_string(),
            initial_size: LogicalSize::new(720.0, 720.0),
        }
    }
}

/// Window title shown once the renderer cannot run.
pub fn fallback_title(config: &RuntimeConfig, err: &LifecycleError) -> String {
    let reason = if err.is_unsupported() {
        "graphics not supported"
    } else {
        "failed to initialize"
    };
    format!("{} ({reason})", config.title)
}

/// What a key press did to the scene configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ConfigChange {
    Unchanged,
    /// Render-time parameter changed; make sure frames are flowing.
    Resume,
    /// Pipeline-affecting parameter changed; rebuild device state.
    Restart,
}

/// Scene hosted by the window runtime.
///
/// Space (start/stop) and Escape (exit) are handled by the runtime; every
/// other key press is offered to the scene.
pub trait InteractiveScene: Scene<Context = Gpu> {
    fn on_key(&mut self, key: KeyCode, config: &mut Self::Config) -> ConfigChange {
        let _ = (key, config);
        ConfigChange::Unchanged
    }
}

/// Frame scheduler backed by window redraw requests.
pub struct WindowScheduler {
    window: Arc<Window>,
    queue: FrameQueue,
}

impl WindowScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            queue: FrameQueue::new(),
        }
    }

    /// Frame to dispatch on the current redraw, if one is scheduled.
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.queue.take_due()
    }
}

impl FrameScheduler for WindowScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = self.queue.request_frame();
        self.window.request_redraw();
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        // A redraw already requested still arrives; it just finds nothing due.
        self.queue.cancel_frame(handle);
    }
}

type WindowLifecycle<S> = RendererLifecycle<SurfaceProvider, S, WindowScheduler>;

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens a window, initializes the scene and renders until the window closes.
    ///
    /// A platform without graphics support keeps the window open with a
    /// fallback title instead of failing.
    pub fn run<S>(config: RuntimeConfig, gpu_init: GpuInit, scene: S, scene_config: S::Config) -> Result<()>
    where
        S: InteractiveScene + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, scene, scene_config);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

struct AppState<S>
where
    S: InteractiveScene + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,

    /// Scene waiting for the window to exist.
    pending: Option<(S, S::Config)>,
    lifecycle: Option<WindowLifecycle<S>>,

    epoch: Instant,
    exit_requested: bool,
}

impl<S> AppState<S>
where
    S: InteractiveScene + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, scene: S, scene_config: S::Config) -> Self {
        Self {
            config,
            gpu_init,
            pending: Some((scene, scene_config)),
            lifecycle: None,
            epoch: Instant::now(),
            exit_requested: false,
        }
    }

    fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    fn timestamp_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    fn create_lifecycle(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let Some((scene, scene_config)) = self.pending.take() else {
            return Ok(());
        };

        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let provider = SurfaceProvider::new(Arc::clone(&window), self.gpu_init.clone());
        let scheduler = WindowScheduler::new(Arc::clone(&window));
        let mut lifecycle = RendererLifecycle::new(provider, scene, scene_config, scheduler);

        match pollster::block_on(lifecycle.initialize()) {
            Ok(()) => lifecycle.start_rendering(),
            Err(e) => {
                log::error!("renderer unavailable: {e}");
                window.set_title(&fallback_title(&self.config, &e));
            }
        }

        self.lifecycle = Some(lifecycle);
        Ok(())
    }
}

fn handle_key<S>(lifecycle: &mut WindowLifecycle<S>, config: &RuntimeConfig, key: KeyCode)
where
    S: InteractiveScene,
{
    if key == KeyCode::Space {
        if lifecycle.is_scheduled() {
            lifecycle.stop_rendering();
        } else {
            lifecycle.start_rendering();
        }
        return;
    }

    let (scene, scene_config) = lifecycle.scene_and_config_mut();
    match scene.on_key(key, scene_config) {
        ConfigChange::Unchanged => {}
        ConfigChange::Resume => lifecycle.start_rendering(),
        ConfigChange::Restart => {
            match pollster::block_on(lifecycle.restart()) {
                Ok(()) => {}
                // Nothing was torn down; the title already tells why.
                Err(e @ LifecycleError::InvalidState { .. }) => log::warn!("restart ignored: {e}"),
                Err(e) => {
                    log::error!("restart failed: {e}");
                    lifecycle.provider().window().set_title(&fallback_title(config, &e));
                }
            }
        }
    }
}

impl<S> ApplicationHandler for AppState<S>
where
    S: InteractiveScene + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.lifecycle.is_some() {
            return;
        }

        if let Err(e) = self.create_lifecycle(event_loop) {
            log::error!("failed to create window: {e:#}");
            self.request_exit();
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Frames are driven by scheduler redraw requests only.
        event_loop.set_control_flow(ControlFlow::Wait);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let now = self.timestamp_ms();
        let Some(lifecycle) = self.lifecycle.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                lifecycle.stop_rendering();
                self.request_exit();
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = lifecycle.context_mut() {
                    gpu.resize(new_size);
                }
            }

            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Escape) => {
                        lifecycle.stop_rendering();
                        self.request_exit();
                        event_loop.exit();
                    }
                    PhysicalKey::Code(code) => handle_key(lifecycle, &self.config, code),
                    PhysicalKey::Unidentified(_) => {}
                }
            }

            WindowEvent::RedrawRequested => {
                if let Some(handle) = lifecycle.scheduler_mut().take_due() {
                    if let Err(e) = lifecycle.run_frame(handle, now) {
                        log::error!("rendering halted: {e:#}");
                    }
                }
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RuntimeConfig {
        RuntimeConfig {
            title: "orrery: cube".to_string(),
            ..RuntimeConfig::default()
        }
    }

    #[test]
    fn unsupported_platform_gets_graphics_title() {
        let err = LifecycleError::unsupported("no suitable adapter");
        assert_eq!(fallback_title(&config(), &err), "orrery: cube (graphics not supported)");
    }

    #[test]
    fn other_failures_get_generic_title() {
        let err = LifecycleError::asset_load("cube mesh", "missing");
        assert_eq!(fallback_title(&config(), &err), "orrery: cube (failed to initialize)");
    }
}
