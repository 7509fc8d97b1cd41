//! Shared value types for the rigidframe workspace.
//!
//! # Invariants
//! - Simulation space is meters, y-up. Screen space is pixels, y-down.
//! - `SCALE` is fixed for the lifetime of the program.

mod color;
mod types;

pub use color::Rgba;
pub use types::{Point2, SCALE, ScreenTransform, Viewport};
