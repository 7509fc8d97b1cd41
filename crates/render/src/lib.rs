//! Rendering Adapter: renderer-agnostic scene and debug geometry.
//!
//! # Invariants
//! - The scene never reads or mutates world state; the frame driver pushes
//!   transforms into it.
//! - All scene coordinates are screen pixels, y-down.
//! - A debug batch is decoded in exactly one place (`decode_debug_batch`).

mod debug;
mod renderer;
mod scene;

pub use debug::{AlphaMode, DebugSegment, DecodeOptions, decode_debug_batch, draw_debug_segments};
pub use renderer::{CommandTextRenderer, Renderer};
pub use scene::{
    DebugLayer, Drawable, PathCommand, PixelRect, Scene, SceneConfig, ShapeId, StrokeStyle,
    StrokedLine,
};

/// Errors raised while building or updating a scene.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(
        "malformed debug batch: {vertices} vertex floats (need a multiple of 4) and {colors} color floats (need {expected_colors})"
    )]
    MalformedDebugBatch {
        vertices: usize,
        colors: usize,
        expected_colors: usize,
    },
    #[error("shape {0:?} is not part of the scene")]
    UnknownShape(ShapeId),
}
