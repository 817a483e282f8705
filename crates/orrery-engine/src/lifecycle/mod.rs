//! Renderer lifecycle.
//!
//! One `RendererLifecycle` owns everything a renderable scene needs: the device
//! context from a `DeviceProvider`, the assets and pipeline built by a `Scene`,
//! a `FrameClock`, and the handle of the next scheduled frame.
//!
//! Ordering is fixed:
//! 1. `initialize` acquires the device, loads assets, builds the pipeline
//! 2. `start_rendering` / `stop_rendering` toggle frame scheduling
//! 3. the host calls `run_frame` whenever a scheduled frame fires
//! 4. `restart` stops, rebuilds device-dependent state and resumes
//!
//! Scheduling is single-threaded and cooperative: a frame runs to completion
//! before the next one is requested.

mod controller;
mod error;
mod scene;
mod scheduler;
mod state;

pub use controller::RendererLifecycle;
pub use error::LifecycleError;
pub use scene::{DeviceProvider, FrameControl, FrameInput, Scene};
pub use scheduler::{FrameHandle, FrameQueue, FrameScheduler};
pub use state::LifecycleState;
