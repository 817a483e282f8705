use crate::time::FrameTime;

use super::LifecycleError;

/// Supplies the device context a lifecycle renders with.
///
/// Acquisition is asynchronous under wgpu. Any missing adapter, device or
/// surface must be reported as `LifecycleError::Unsupported`.
#[allow(async_fn_in_trait)]
pub trait DeviceProvider {
    /// Device handle, presentable surface and pixel format, bundled.
    type Context;

    async fn acquire(&mut self) -> Result<Self::Context, LifecycleError>;
}

/// Control directive returned by the render hook.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameControl {
    /// Keep scheduling frames.
    Continue,
    /// Stop scheduling after this frame.
    Stop,
}

/// Everything the render hook may touch for one frame.
pub struct FrameInput<'a, S: Scene + ?Sized> {
    pub context: &'a mut S::Context,
    pub assets: &'a S::Assets,
    pub pipeline: &'a S::Pipeline,
    pub config: &'a S::Config,
    pub time: FrameTime,
}

/// Capability set a demo injects into a lifecycle.
///
/// `Config` holds the tunable parameters of the scene (cull mode, camera
/// position, ...). The lifecycle owns it and hands it out by reference; a
/// change that affects pipeline construction is applied with
/// `RendererLifecycle::restart`.
pub trait Scene {
    type Context;
    type Config;
    /// Meshes and optional textures.
    type Assets;
    type Pipeline;

    /// Called once per `initialize`/`restart`, right after device acquisition.
    fn load_assets(
        &mut self,
        context: &Self::Context,
        config: &Self::Config,
    ) -> Result<Self::Assets, LifecycleError>;

    /// Called once per `initialize`/`restart`, after assets load.
    fn build_pipeline(
        &mut self,
        context: &Self::Context,
        assets: &Self::Assets,
        config: &Self::Config,
    ) -> Result<Self::Pipeline, LifecycleError>;

    /// Called once per dispatched frame. Expected to submit exactly once.
    fn render(&mut self, frame: FrameInput<'_, Self>) -> anyhow::Result<FrameControl>;
}
