//! WebGPU rendering module
//!
//! Balloons are tessellated into flat-colored triangles on the CPU each
//! frame and drawn with a single pass-through pipeline.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderState, screen_to_ndc};
pub use vertex::Vertex;
