//! wgpu render backend for rigidframe scenes.
//!
//! Tessellates drawables into triangles and debug strokes into a line list,
//! both in pixel space, and maps them to clip space in the vertex shader.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - Debug lines are one device pixel wide (line-list topology).
//! - The viewport uniform always matches the scene's surface size.

mod gpu;
mod mesh;
mod shaders;

pub use gpu::WgpuRenderer;
pub use mesh::{ColorVertex, SceneMesh, tessellate};
