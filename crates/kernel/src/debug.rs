use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};

/// Flat debug geometry produced by the world each frame.
///
/// `vertices` holds `[ax, ay, bx, by]` per line segment (meters).
/// `colors` holds one normalised RGBA color per endpoint, so 8 floats per segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugBatch {
    pub vertices: Vec<f32>,
    pub colors: Vec<f32>,
}

impl DebugBatch {
    pub fn new(vertices: Vec<f32>, colors: Vec<f32>) -> Self {
        Self { vertices, colors }
    }

    /// Number of complete segments described by the vertex array.
    pub fn segment_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.len() < 4
    }
}

/// Debug render backend that packs rapier's line output into a [`DebugBatch`].
#[derive(Default)]
pub(crate) struct BatchBackend {
    batch: DebugBatch,
}

impl BatchBackend {
    pub(crate) fn finish(self) -> DebugBatch {
        self.batch
    }

    fn push_segment(&mut self, a: [f32; 2], b: [f32; 2], hsla: [f32; 4]) {
        self.batch.vertices.extend_from_slice(&[a[0], a[1], b[0], b[1]]);
        // rapier hands out HSLA; consumers expect RGBA, once per endpoint.
        let [r, g, bl] = hsl_to_rgb(hsla[0], hsla[1], hsla[2]);
        let rgba = [r, g, bl, hsla[3]];
        self.batch.colors.extend_from_slice(&rgba);
        self.batch.colors.extend_from_slice(&rgba);
    }
}

impl DebugRenderBackend for BatchBackend {
    fn draw_line(
        &mut self,
        _: DebugRenderObject,
        a: Point<Real>,
        b: Point<Real>,
        color: [f32; 4],
    ) {
        self.push_segment([a.x, a.y], [b.x, b.y], color);
    }
}

/// Convert HSL (hue in degrees, saturation and lightness in 0..=1) to RGB in 0..=1.
pub(crate) fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let h = h.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    [
        (r + m).clamp(0.0, 1.0),
        (g + m).clamp(0.0, 1.0),
        (b + m).clamp(0.0, 1.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn hsl_primaries() {
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0]));
        assert!(close(hsl_to_rgb(120.0, 1.0, 0.5), [0.0, 1.0, 0.0]));
        assert!(close(hsl_to_rgb(240.0, 1.0, 0.5), [0.0, 0.0, 1.0]));
    }

    #[test]
    fn hsl_greys_ignore_hue() {
        assert!(close(hsl_to_rgb(77.0, 0.0, 1.0), [1.0, 1.0, 1.0]));
        assert!(close(hsl_to_rgb(300.0, 0.0, 0.0), [0.0, 0.0, 0.0]));
        assert!(close(hsl_to_rgb(10.0, 0.0, 0.25), [0.25, 0.25, 0.25]));
    }

    #[test]
    fn hsl_hue_wraps() {
        assert!(close(hsl_to_rgb(360.0, 1.0, 0.5), hsl_to_rgb(0.0, 1.0, 0.5)));
        assert!(close(hsl_to_rgb(-120.0, 1.0, 0.5), hsl_to_rgb(240.0, 1.0, 0.5)));
    }

    #[test]
    fn backend_packs_two_colors_per_segment() {
        let mut backend = BatchBackend::default();
        backend.push_segment([0.0, 1.0], [2.0, 3.0], [0.0, 0.0, 1.0, 0.5]);
        let batch = backend.finish();
        assert_eq!(batch.vertices, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(batch.colors, vec![1.0, 1.0, 1.0, 0.5, 1.0, 1.0, 1.0, 0.5]);
        assert_eq!(batch.segment_count(), 1);
    }

    #[test]
    fn segment_count_truncates() {
        let batch = DebugBatch::new(vec![0.0; 7], vec![0.0; 14]);
        assert_eq!(batch.segment_count(), 1);
        assert!(DebugBatch::new(vec![0.0; 3], vec![]).is_empty());
    }
}
