use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use rigidframe_render::Scene;

/// Pixel-space vertex with a straight (non-premultiplied) RGBA color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl ColorVertex {
    fn new(p: Vec2, color: [f32; 4]) -> Self {
        Self {
            position: p.to_array(),
            color,
        }
    }
}

/// CPU-side geometry for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMesh {
    /// Triangle list, two triangles per drawable.
    pub triangles: Vec<ColorVertex>,
    /// Line list, two vertices per stroked debug line.
    pub lines: Vec<ColorVertex>,
}

/// Build the frame's vertex lists from the scene.
pub fn tessellate(scene: &Scene) -> SceneMesh {
    let mut mesh = SceneMesh::default();

    for (_, drawable) in scene.drawables() {
        let color = drawable.fill.to_unit();
        let [a, b, c, d] = drawable.corners();
        mesh.triangles.extend([a, b, c, c, d, a].map(|p| ColorVertex::new(p, color)));
    }

    for line in scene.debug_layer().strokes() {
        let color = line.style.color.to_unit();
        mesh.lines.push(ColorVertex::new(line.a, color));
        mesh.lines.push(ColorVertex::new(line.b, color));
    }

    mesh
}
