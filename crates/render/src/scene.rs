use glam::Vec2;
use rigidframe_common::{Rgba, Viewport};
use serde::{Deserialize, Serialize};

use crate::RenderError;

/// Presentation surface configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConfig {
    pub width: u32,
    pub height: u32,
    pub background: Rgba,
}

impl SceneConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::from_physical(self.width, self.height)
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            background: Rgba::from_hex(0xF5F5F7),
        }
    }
}

/// Index of a drawable within its [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(usize);

/// Rectangle in a drawable's local pixel space. `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A filled rectangle placed on the scene.
///
/// Rotation is in radians and follows the screen convention: with y pointing
/// down, positive angles turn clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawable {
    pub rect: PixelRect,
    pub fill: Rgba,
    pub position: Vec2,
    pub rotation: f32,
}

impl Drawable {
    /// Black rectangle at the scene origin.
    pub fn rectangle(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            rect: PixelRect {
                x,
                y,
                width,
                height,
            },
            fill: Rgba::BLACK,
            position: Vec2::ZERO,
            rotation: 0.0,
        }
    }

    pub fn fill(mut self, color: Rgba) -> Self {
        self.fill = color;
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = Vec2::new(x, y);
        self
    }

    /// Corners in screen space, clockwise from the local top-left.
    pub fn corners(&self) -> [Vec2; 4] {
        let r = self.rect;
        let (sin, cos) = self.rotation.sin_cos();
        let place = |x: f32, y: f32| {
            Vec2::new(x * cos - y * sin, x * sin + y * cos) + self.position
        };
        [
            place(r.x, r.y),
            place(r.x + r.width, r.y),
            place(r.x + r.width, r.y + r.height),
            place(r.x, r.y + r.height),
        ]
    }
}

/// How a path is stroked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Rgba,
    /// One device pixel wide regardless of any scaling.
    pub pixel_line: bool,
}

/// A recorded drawing command on a [`DebugLayer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    Stroke(StrokeStyle),
}

/// A line segment resolved from the recorded path commands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokedLine {
    pub a: Vec2,
    pub b: Vec2,
    pub style: StrokeStyle,
}

/// Immediate-style line layer, redrawn from scratch every frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugLayer {
    commands: Vec<PathCommand>,
}

impl DebugLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.commands.push(PathCommand::MoveTo(Vec2::new(x, y)));
        self
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.commands.push(PathCommand::LineTo(Vec2::new(x, y)));
        self
    }

    pub fn stroke(&mut self, style: StrokeStyle) -> &mut Self {
        self.commands.push(PathCommand::Stroke(style));
        self
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Resolve the command list into stroked line segments.
    ///
    /// A stroke consumes the pending path and resets the pen. A `LineTo`
    /// without a current point only moves the pen. Lines that are never
    /// stroked are dropped.
    pub fn strokes(&self) -> Vec<StrokedLine> {
        let mut out = Vec::new();
        let mut pending: Vec<(Vec2, Vec2)> = Vec::new();
        let mut pen: Option<Vec2> = None;
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => pen = Some(p),
                PathCommand::LineTo(p) => {
                    if let Some(from) = pen {
                        pending.push((from, p));
                    }
                    pen = Some(p);
                }
                PathCommand::Stroke(style) => {
                    out.extend(pending.drain(..).map(|(a, b)| StrokedLine { a, b, style }));
                    pen = None;
                }
            }
        }
        out
    }
}

/// Retained scene: filled drawables in insertion order, then the debug layer on top.
#[derive(Debug, Clone)]
pub struct Scene {
    config: SceneConfig,
    drawables: Vec<Drawable>,
    debug: DebugLayer,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        tracing::debug!(
            width = config.width,
            height = config.height,
            "scene created"
        );
        Self {
            config,
            drawables: Vec::new(),
            debug: DebugLayer::new(),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.config.viewport()
    }

    pub fn add_drawable(&mut self, drawable: Drawable) -> ShapeId {
        self.drawables.push(drawable);
        ShapeId(self.drawables.len() - 1)
    }

    pub fn drawable(&self, id: ShapeId) -> Result<&Drawable, RenderError> {
        self.drawables.get(id.0).ok_or(RenderError::UnknownShape(id))
    }

    pub fn drawables(&self) -> impl Iterator<Item = (ShapeId, &Drawable)> {
        self.drawables
            .iter()
            .enumerate()
            .map(|(i, d)| (ShapeId(i), d))
    }

    pub fn drawable_count(&self) -> usize {
        self.drawables.len()
    }

    pub fn set_position(&mut self, id: ShapeId, x: f32, y: f32) -> Result<(), RenderError> {
        self.drawable_mut(id)?.position = Vec2::new(x, y);
        Ok(())
    }

    pub fn set_rotation(&mut self, id: ShapeId, radians: f32) -> Result<(), RenderError> {
        self.drawable_mut(id)?.rotation = radians;
        Ok(())
    }

    pub fn debug_layer(&self) -> &DebugLayer {
        &self.debug
    }

    pub fn debug_layer_mut(&mut self) -> &mut DebugLayer {
        &mut self.debug
    }

    fn drawable_mut(&mut self, id: ShapeId) -> Result<&mut Drawable, RenderError> {
        self.drawables
            .get_mut(id.0)
            .ok_or(RenderError::UnknownShape(id))
    }
}
