use glam::Vec2;
use rigidframe_common::{Point2, Rgba, ScreenTransform};
use rigidframe_kernel::DebugBatch;
use serde::{Deserialize, Serialize};

use crate::RenderError;
use crate::scene::{DebugLayer, StrokeStyle};

const VERTEX_STRIDE: usize = 4;
const COLOR_STRIDE: usize = 8;

/// How the alpha channel of a debug color is decoded.
///
/// RGB is always scaled from 0..=1 to 0..=255.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlphaMode {
    /// Alpha is passed through on the 0..=1 scale.
    #[default]
    Unscaled,
    /// Alpha is scaled by 255 like the color channels.
    Scaled,
}

/// Options for [`decode_debug_batch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub alpha: AlphaMode,
    /// Reject batches whose lengths do not line up instead of truncating them.
    pub strict: bool,
}

/// One debug line segment in simulation space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebugSegment {
    pub a: Point2,
    pub b: Point2,
    pub color: Rgba,
}

/// Unpack a flat debug batch into typed segments.
///
/// Segment `i` reads its endpoints from `vertices[4i..4i + 4]` and its color
/// from the first endpoint's entry at `colors[8i..8i + 4]`. In lenient mode a
/// trailing partial segment, and any segment without color data, is skipped.
pub fn decode_debug_batch(
    batch: &DebugBatch,
    options: DecodeOptions,
) -> Result<Vec<DebugSegment>, RenderError> {
    let vertices = &batch.vertices;
    let colors = &batch.colors;
    let count = vertices.len() / VERTEX_STRIDE;
    let complete = vertices.len() % VERTEX_STRIDE == 0 && colors.len() >= count * COLOR_STRIDE;

    if !complete {
        if options.strict {
            return Err(RenderError::MalformedDebugBatch {
                vertices: vertices.len(),
                colors: colors.len(),
                expected_colors: count * COLOR_STRIDE,
            });
        }
        tracing::warn!(
            vertices = vertices.len(),
            colors = colors.len(),
            "debug batch lengths do not line up, truncating"
        );
    }

    let mut segments = Vec::with_capacity(count);
    for i in 0..count {
        let v = i * VERTEX_STRIDE;
        let c = i * COLOR_STRIDE;
        let Some(rgba) = colors.get(c..c + COLOR_STRIDE) else {
            break;
        };
        let alpha = match options.alpha {
            AlphaMode::Unscaled => rgba[3],
            AlphaMode::Scaled => rgba[3] * 255.0,
        };
        segments.push(DebugSegment {
            a: Vec2::new(vertices[v], vertices[v + 1]),
            b: Vec2::new(vertices[v + 2], vertices[v + 3]),
            color: Rgba::new(rgba[0] * 255.0, rgba[1] * 255.0, rgba[2] * 255.0, alpha),
        });
    }
    Ok(segments)
}

/// Clear `layer` and redraw every segment as a pixel-wide stroke in screen space.
pub fn draw_debug_segments(
    layer: &mut DebugLayer,
    segments: &[DebugSegment],
    transform: &ScreenTransform,
) {
    layer.clear();
    for segment in segments {
        let a = transform.to_screen(segment.a);
        let b = transform.to_screen(segment.b);
        layer.move_to(a.x, a.y).line_to(b.x, b.y).stroke(StrokeStyle {
            color: segment.color,
            pixel_line: true,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::PathCommand;
    use rigidframe_common::Viewport;

    fn batch(vertex_floats: usize) -> DebugBatch {
        let vertices = (0..vertex_floats).map(|i| i as f32).collect();
        let colors = vec![0.5; vertex_floats.div_ceil(4) * 8];
        DebugBatch::new(vertices, colors)
    }

    #[test]
    fn segment_count_is_floor_of_quarter() {
        let lenient = DecodeOptions::default();
        for n in 0..=13 {
            let segments = decode_debug_batch(&batch(n), lenient).unwrap();
            assert_eq!(segments.len(), n / 4, "n={n}");
        }
    }

    #[test]
    fn three_floats_render_nothing_four_render_one() {
        let lenient = DecodeOptions::default();
        assert!(decode_debug_batch(&batch(3), lenient).unwrap().is_empty());
        assert_eq!(decode_debug_batch(&batch(4), lenient).unwrap().len(), 1);
    }

    #[test]
    fn endpoints_are_read_in_order() {
        let segments = decode_debug_batch(&batch(8), DecodeOptions::default()).unwrap();
        assert_eq!(segments[1].a, Vec2::new(4.0, 5.0));
        assert_eq!(segments[1].b, Vec2::new(6.0, 7.0));
    }

    #[test]
    fn strict_mode_rejects_partial_segment() {
        let strict = DecodeOptions {
            strict: true,
            ..Default::default()
        };
        let err = decode_debug_batch(&batch(6), strict).unwrap_err();
        assert!(matches!(err, RenderError::MalformedDebugBatch { vertices: 6, .. }));
        assert!(decode_debug_batch(&batch(8), strict).is_ok());
    }

    #[test]
    fn strict_mode_rejects_short_colors() {
        let strict = DecodeOptions {
            strict: true,
            ..Default::default()
        };
        let short = DebugBatch::new(vec![0.0; 8], vec![1.0; 12]);
        assert!(matches!(
            decode_debug_batch(&short, strict).unwrap_err(),
            RenderError::MalformedDebugBatch { colors: 12, expected_colors: 16, .. }
        ));
    }

    #[test]
    fn strict_error_reports_colors_the_check_needs() {
        let strict = DecodeOptions {
            strict: true,
            ..Default::default()
        };
        let partial = DebugBatch::new(vec![0.0; 6], vec![1.0; 8]);
        let err = decode_debug_batch(&partial, strict).unwrap_err();
        assert!(matches!(
            err,
            RenderError::MalformedDebugBatch { vertices: 6, colors: 8, expected_colors: 8 }
        ));
    }

    #[test]
    fn lenient_mode_skips_segments_without_color() {
        let short = DebugBatch::new(vec![0.0; 8], vec![1.0; 12]);
        let segments = decode_debug_batch(&short, DecodeOptions::default()).unwrap();
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn white_segment_keeps_alpha_unscaled() {
        let b = DebugBatch::new(
            vec![0.0, 0.0, 1.0, 1.0],
            vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        );
        let segments = decode_debug_batch(&b, DecodeOptions::default()).unwrap();
        assert_eq!(segments[0].color, Rgba::new(255.0, 255.0, 255.0, 1.0));
    }

    #[test]
    fn scaled_alpha_mode_scales_alpha_too() {
        let b = DebugBatch::new(
            vec![0.0, 0.0, 1.0, 1.0],
            vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        );
        let options = DecodeOptions {
            alpha: AlphaMode::Scaled,
            strict: false,
        };
        let segments = decode_debug_batch(&b, options).unwrap();
        assert_eq!(segments[0].color, Rgba::new(255.0, 255.0, 255.0, 255.0));
    }

    #[test]
    fn draw_maps_endpoints_to_screen() {
        let transform = ScreenTransform::new(Viewport::new(800.0, 600.0));
        let segments = [DebugSegment {
            a: Vec2::new(0.0, 0.0),
            b: Vec2::new(1.0, 1.0),
            color: Rgba::WHITE,
        }];
        let mut layer = DebugLayer::new();
        draw_debug_segments(&mut layer, &segments, &transform);
        assert_eq!(
            layer.commands(),
            &[
                PathCommand::MoveTo(Vec2::new(400.0, 300.0)),
                PathCommand::LineTo(Vec2::new(425.0, 275.0)),
                PathCommand::Stroke(StrokeStyle {
                    color: Rgba::WHITE,
                    pixel_line: true,
                }),
            ]
        );
    }

    #[test]
    fn redraw_is_idempotent() {
        let transform = ScreenTransform::new(Viewport::new(640.0, 480.0));
        let segments = decode_debug_batch(&batch(16), DecodeOptions::default()).unwrap();
        let mut layer = DebugLayer::new();
        draw_debug_segments(&mut layer, &segments, &transform);
        let first = layer.commands().to_vec();
        draw_debug_segments(&mut layer, &segments, &transform);
        assert_eq!(layer.commands(), first.as_slice());
        assert_eq!(first.len(), 4 * 3);
    }
}
