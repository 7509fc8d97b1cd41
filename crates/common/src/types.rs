use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A 2D point. Meters in simulation space, pixels in screen space.
pub type Point2 = Vec2;

/// Pixels per simulation meter (5m = 125px).
pub const SCALE: f32 = 25.0;

/// Size of the presentation surface in pixels.
///
/// Read once from the host window at startup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Build a viewport from physical window dimensions.
    pub fn from_physical(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }

    /// Centre of the viewport in pixels.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Fixed linear mapping from simulation meters to screen pixels.
///
/// `(x, y) -> (x * scale + width / 2, -y * scale + height / 2)`: the simulation
/// origin lands in the middle of the viewport and the vertical axis is flipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenTransform {
    viewport: Viewport,
    scale: f32,
}

impl ScreenTransform {
    /// Transform using the fixed program-wide [`SCALE`].
    pub fn new(viewport: Viewport) -> Self {
        Self::with_scale(viewport, SCALE)
    }

    pub fn with_scale(viewport: Viewport, scale: f32) -> Self {
        Self { viewport, scale }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Map a simulation-space point (meters) to screen space (pixels).
    pub fn to_screen(&self, p: Point2) -> Point2 {
        Vec2::new(
            p.x * self.scale + self.viewport.width / 2.0,
            -p.y * self.scale + self.viewport.height / 2.0,
        )
    }

    /// Inverse of [`ScreenTransform::to_screen`].
    pub fn to_world(&self, p: Point2) -> Point2 {
        Vec2::new(
            (p.x - self.viewport.width / 2.0) / self.scale,
            -(p.y - self.viewport.height / 2.0) / self.scale,
        )
    }

    /// Convert a length in meters to pixels.
    pub fn meters_to_pixels(&self, meters: f32) -> f32 {
        meters * self.scale
    }
}
