use crate::scene::Scene;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads a scene and produces output. It never mutates the scene
/// or the world behind it.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of the scene.
    fn render(&self, scene: &Scene) -> Self::Output;
}

/// Text renderer for headless runs.
///
/// Produces a readable listing of the scene: surface, drawables with their
/// screen transforms, and the number of stroked debug lines.
#[derive(Debug, Default)]
pub struct CommandTextRenderer {
    /// Also list every stroked debug line.
    pub verbose: bool,
}

impl CommandTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl Renderer for CommandTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene) -> String {
        let config = scene.config();
        let mut out = String::new();
        out.push_str(&format!(
            "=== Scene {}x{} background={} ===\n",
            config.width, config.height, config.background
        ));
        out.push_str(&format!("Drawables: {}\n", scene.drawable_count()));
        for (id, d) in scene.drawables() {
            out.push_str(&format!(
                "  [{:?}] rect=({:.1}, {:.1}, {:.1}, {:.1}) pos=({:.2}, {:.2}) rot={:.4} fill={}\n",
                id,
                d.rect.x,
                d.rect.y,
                d.rect.width,
                d.rect.height,
                d.position.x,
                d.position.y,
                d.rotation,
                d.fill
            ));
        }

        let lines = scene.debug_layer().strokes();
        out.push_str(&format!("Debug lines: {}\n", lines.len()));
        if self.verbose {
            for line in &lines {
                out.push_str(&format!(
                    "  ({:.1}, {:.1}) -> ({:.1}, {:.1}) {}\n",
                    line.a.x, line.a.y, line.b.x, line.b.y, line.style.color
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Drawable, SceneConfig, StrokeStyle};
    use rigidframe_common::Rgba;

    #[test]
    fn empty_scene() {
        let scene = Scene::new(SceneConfig::new(800, 600));
        let output = CommandTextRenderer::new().render(&scene);
        assert!(output.contains("800x600"));
        assert!(output.contains("Drawables: 0"));
        assert!(output.contains("Debug lines: 0"));
    }

    #[test]
    fn lists_drawables_and_lines() {
        let mut scene = Scene::new(SceneConfig::default());
        let id = scene.add_drawable(Drawable::rectangle(-5.0, -5.0, 10.0, 10.0));
        scene.set_position(id, 12.0, 34.0).unwrap();
        scene
            .debug_layer_mut()
            .move_to(0.0, 0.0)
            .line_to(3.0, 4.0)
            .stroke(StrokeStyle {
                color: Rgba::WHITE,
                pixel_line: true,
            });

        let output = CommandTextRenderer::verbose().render(&scene);
        assert!(output.contains("Drawables: 1"));
        assert!(output.contains("pos=(12.00, 34.00)"));
        assert!(output.contains("Debug lines: 1"));
        assert!(output.contains("(3.0, 4.0)"));
    }

    #[test]
    fn quiet_renderer_omits_line_listing() {
        let mut scene = Scene::new(SceneConfig::default());
        scene
            .debug_layer_mut()
            .move_to(0.0, 0.0)
            .line_to(3.0, 4.0)
            .stroke(StrokeStyle {
                color: Rgba::WHITE,
                pixel_line: true,
            });
        let output = CommandTextRenderer::new().render(&scene);
        assert!(!output.contains("->"));
    }
}
