//! Demo scenes hosted by the window runtime.
//!
//! Every scene recomputes its matrices from accumulated time each frame and
//! writes them into buffers created at asset load.

pub mod common;
pub mod cube;
pub mod depth;
pub mod field;
pub mod lit;
pub mod solar;

pub use cube::{CubeConfig, CubeScene};
pub use depth::{DepthConfig, DepthScene};
pub use field::{FieldConfig, FieldScene};
pub use lit::{LitConfig, LitScene};
pub use solar::{SolarConfig, SolarScene};
