//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Adapter/Device/Queue and the window Surface
//! - reporting missing graphics support as `LifecycleError::Unsupported`
//! - acquiring frames and providing encoders/views for rendering

mod gpu;
mod provider;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
pub use provider::SurfaceProvider;
