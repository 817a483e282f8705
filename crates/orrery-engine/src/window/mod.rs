//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and drives one `RendererLifecycle`
//! from window events.

mod runtime;

pub use runtime::{fallback_title, ConfigChange, InteractiveScene, Runtime, RuntimeConfig, WindowScheduler};
