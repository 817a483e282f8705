//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the runtime.
//! Intended usage:
//! - one `FrameClock` per renderer lifecycle
//! - call `tick()` once per dispatched frame with the scheduler's timestamp

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
