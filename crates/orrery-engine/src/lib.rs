//! Orrery engine crate.
//!
//! Renderer lifecycle control, frame timing and hierarchical transform
//! composition for small wgpu scenes, plus the winit host that drives them.

pub mod device;
pub mod lifecycle;
pub mod logging;
pub mod time;
pub mod transform;
pub mod window;
