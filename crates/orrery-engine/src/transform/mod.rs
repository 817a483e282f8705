//! Hierarchical transform composition.
//!
//! Conventions:
//! - a node's local matrix is `T · R · S` (scale first, translation last)
//! - a node's world matrix is `parent_world · local`, or `local` for a root
//! - everything is recomputed each frame from current parameters and time
//!
//! Matrices are `glam::Mat4` in column-major order, ready for upload as-is.

mod camera;
mod compose;
mod graph;
mod orbit;

pub use camera::Camera;
pub use compose::{chain, compose, normal_matrix, LocalTransform};
pub use graph::{pack_matrices, NodeId, NodeMotion, SceneGraph};
pub use orbit::Orbit;
