use std::sync::Arc;

use winit::window::Window;

use crate::lifecycle::{DeviceProvider, LifecycleError};

use super::{Gpu, GpuInit};

/// Acquires a fresh `Gpu` for a window on every `initialize`/`restart`.
pub struct SurfaceProvider {
    window: Arc<Window>,
    init: GpuInit,
}

impl SurfaceProvider {
    pub fn new(window: Arc<Window>, init: GpuInit) -> Self {
        Self { window, init }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl DeviceProvider for SurfaceProvider {
    type Context = Gpu;

    async fn acquire(&mut self) -> Result<Gpu, LifecycleError> {
        Gpu::new(Arc::clone(&self.window), self.init.clone()).await
    }
}
