//! Conversion of peak sequences into drawable primitives, and the renderer
//! capability those primitives are painted through.
//!
//! Mapping is pure: the same peaks and layout always yield the same ordered
//! [`Frame`]. Nothing here clamps magnitudes, so difference peaks above one
//! extend past the plot area.

mod svg;

use serde::{Deserialize, Serialize};

use crate::{
    config::{ColorConfig, RenderConfig},
    difference::{DifferencePeaks, Polarity},
    Color, Result,
};

pub use svg::SvgRenderer;

/// Corner radius of the background fill.
pub const BACKGROUND_RADIUS: f32 = 10.0;

/// Colour of the message drawn over a failed surface.
pub const ERROR_COLOR: Color = Color::rgb(0xFF, 0x00, 0x00);

/// Message drawn over a surface whose inputs failed to load.
pub const ERROR_MESSAGE: &str = "Error loading/processing audio";

/// Point in surface pixel coordinates, y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A single drawing instruction understood by every [`Renderer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawPrimitive {
    Clear {
        width: u32,
        height: u32,
    },
    FillRoundedRect {
        width: u32,
        height: u32,
        radius: f32,
        color: Color,
    },
    StrokeSegment {
        from: Point,
        to: Point,
        color: Color,
    },
    Label {
        at: Point,
        text: String,
        color: Color,
    },
}

impl DrawPrimitive {
    pub fn paint(&self, renderer: &mut dyn Renderer) -> Result<()> {
        match self {
            Self::Clear { width, height } => renderer.clear(*width, *height),
            Self::FillRoundedRect {
                width,
                height,
                radius,
                color,
            } => renderer.fill_rounded_rect(*width, *height, *radius, *color),
            Self::StrokeSegment { from, to, color } => renderer.stroke_segment(*from, *to, *color),
            Self::Label { at, text, color } => renderer.draw_label(*at, text, *color),
        }
    }
}

/// Drawing capability of a display surface. Implementations own no audio
/// semantics; they only paint what they are told.
pub trait Renderer {
    /// Resizes the surface and discards anything previously drawn on it.
    fn begin_frame(&mut self, width: u32, height: u32) -> Result<()>;

    fn clear(&mut self, width: u32, height: u32) -> Result<()>;

    fn fill_rounded_rect(&mut self, width: u32, height: u32, radius: f32, color: Color)
        -> Result<()>;

    /// Strokes a one pixel wide line between two points.
    fn stroke_segment(&mut self, from: Point, to: Point, color: Color) -> Result<()>;

    /// Draws `text` horizontally centred on `at`.
    fn draw_label(&mut self, at: Point, text: &str, color: Color) -> Result<()>;
}

/// Complete, ordered output of one mapping run for one surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub primitives: Vec<DrawPrimitive>,
}

impl Frame {
    /// Blank surface carrying the standard error message.
    pub fn error(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            primitives: vec![
                DrawPrimitive::Clear { width, height },
                DrawPrimitive::Label {
                    at: Point::new(width as f32 / 2.0, height as f32 / 2.0),
                    text: ERROR_MESSAGE.to_string(),
                    color: ERROR_COLOR,
                },
            ],
        }
    }

    /// Resizes the renderer and paints every primitive in order.
    pub fn paint(&self, renderer: &mut dyn Renderer) -> Result<()> {
        renderer.begin_frame(self.width, self.height)?;
        for primitive in &self.primitives {
            primitive.paint(renderer)?;
        }
        Ok(())
    }

    /// Stroked segments only, in drawing order.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point, Color)> + '_ {
        self.primitives.iter().filter_map(|primitive| match primitive {
            DrawPrimitive::StrokeSegment { from, to, color } => Some((*from, *to, *color)),
            _ => None,
        })
    }
}

/// Caller-fixed layout parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub margin: u32,
    pub height: u32,
}

impl Default for Layout {
    fn default() -> Self {
        Self::from(&RenderConfig::default())
    }
}

impl From<&RenderConfig> for Layout {
    fn from(config: &RenderConfig) -> Self {
        Self {
            margin: config.margin,
            height: config.canvas_height,
        }
    }
}

/// Plot dimensions derived from a chunk count and a [`Layout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub num_chunks: usize,
    pub margin: u32,
    pub width: u32,
    pub height: u32,
    pub centerline: f32,
    pub scale_factor: f32,
}

impl Geometry {
    pub fn new(num_chunks: usize, layout: Layout) -> Self {
        let chunks = u32::try_from(num_chunks).unwrap_or(u32::MAX);
        Self {
            num_chunks,
            margin: layout.margin,
            width: chunks.saturating_add(layout.margin.saturating_mul(2)),
            height: layout.height,
            centerline: layout.height.div_ceil(2) as f32,
            scale_factor: (layout.height as f32 - 2.0 * layout.margin as f32) / 2.0,
        }
    }

    /// Horizontal position of chunk `index`.
    pub fn column(&self, index: usize) -> f32 {
        self.margin as f32 + index as f32
    }

    fn background(&self, colors: &ColorConfig) -> DrawPrimitive {
        match colors.background {
            Some(color) => DrawPrimitive::FillRoundedRect {
                width: self.width,
                height: self.height,
                radius: BACKGROUND_RADIUS,
                color,
            },
            None => DrawPrimitive::Clear {
                width: self.width,
                height: self.height,
            },
        }
    }
}

/// Peaks ready to be mapped onto a surface.
#[derive(Debug, Clone, Copy)]
pub enum PeakSeries<'a> {
    /// Single-recording envelope. `color` overrides `ColorConfig::single`.
    Waveform {
        peaks: &'a [f32],
        color: Option<Color>,
    },
    Difference(&'a DifferencePeaks),
}

/// Maps either kind of peak series to a frame.
pub fn map(series: PeakSeries<'_>, colors: &ColorConfig, layout: Layout) -> Frame {
    match series {
        PeakSeries::Waveform { peaks, color } => {
            map_waveform(peaks, color.unwrap_or(colors.single), colors, layout)
        }
        PeakSeries::Difference(peaks) => map_difference(peaks, colors, layout),
    }
}

/// One vertical segment per chunk, symmetric about the centreline.
pub fn map_waveform(peaks: &[f32], stroke: Color, colors: &ColorConfig, layout: Layout) -> Frame {
    let geometry = Geometry::new(peaks.len(), layout);
    tracing::debug!(
        chunks = geometry.num_chunks,
        width = geometry.width,
        height = geometry.height,
        "mapping waveform"
    );

    let mut primitives = Vec::with_capacity(peaks.len() + 1);
    primitives.push(geometry.background(colors));
    for (index, peak) in peaks.iter().enumerate() {
        let x = geometry.column(index);
        let offset = peak * geometry.scale_factor;
        primitives.push(DrawPrimitive::StrokeSegment {
            from: Point::new(x, geometry.centerline - offset),
            to: Point::new(x, geometry.centerline + offset),
            color: stroke,
        });
    }

    Frame {
        width: geometry.width,
        height: geometry.height,
        primitives,
    }
}

/// Up to two segments per chunk, each starting at the centreline, coloured
/// by the comparison's [`ColorPolicy`](crate::ColorPolicy).
pub fn map_difference(peaks: &DifferencePeaks, colors: &ColorConfig, layout: Layout) -> Frame {
    let geometry = Geometry::new(peaks.len(), layout);
    tracing::debug!(
        chunks = geometry.num_chunks,
        width = geometry.width,
        policy = ?peaks.policy,
        "mapping difference"
    );

    let positive_color = peaks.policy.segment_color(Polarity::Positive, colors);
    let negative_color = peaks.policy.segment_color(Polarity::Negative, colors);

    let mut primitives = Vec::with_capacity(2 * peaks.len() + 1);
    primitives.push(geometry.background(colors));
    for (index, (&positive, &negative)) in peaks.positive.iter().zip(&peaks.negative).enumerate() {
        let x = geometry.column(index);
        let center = Point::new(x, geometry.centerline);

        if positive > 0.0 {
            primitives.push(DrawPrimitive::StrokeSegment {
                from: center,
                to: Point::new(x, geometry.centerline - positive * geometry.scale_factor),
                color: positive_color,
            });
        }
        // negative <= 0, so this extends below the centreline
        if negative < 0.0 {
            primitives.push(DrawPrimitive::StrokeSegment {
                from: center,
                to: Point::new(x, geometry.centerline - negative * geometry.scale_factor),
                color: negative_color,
            });
        }
    }

    Frame {
        width: geometry.width,
        height: geometry.height,
        primitives,
    }
}

/// Renderer that keeps the painted primitives in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    size: Option<(u32, u32)>,
    painted: Vec<DrawPrimitive>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size of the current frame, if one has been started.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    pub fn painted(&self) -> &[DrawPrimitive] {
        &self.painted
    }
}

impl Renderer for RecordingRenderer {
    fn begin_frame(&mut self, width: u32, height: u32) -> Result<()> {
        self.size = Some((width, height));
        self.painted.clear();
        Ok(())
    }

    fn clear(&mut self, width: u32, height: u32) -> Result<()> {
        self.painted.push(DrawPrimitive::Clear { width, height });
        Ok(())
    }

    fn fill_rounded_rect(
        &mut self,
        width: u32,
        height: u32,
        radius: f32,
        color: Color,
    ) -> Result<()> {
        self.painted.push(DrawPrimitive::FillRoundedRect {
            width,
            height,
            radius,
            color,
        });
        Ok(())
    }

    fn stroke_segment(&mut self, from: Point, to: Point, color: Color) -> Result<()> {
        self.painted.push(DrawPrimitive::StrokeSegment { from, to, color });
        Ok(())
    }

    fn draw_label(&mut self, at: Point, text: &str, color: Color) -> Result<()> {
        self.painted.push(DrawPrimitive::Label {
            at,
            text: text.to_string(),
            color,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difference::diff;

    fn colors() -> ColorConfig {
        ColorConfig {
            single: Color::rgb(0x10, 0x10, 0x10),
            positive: Color::rgb(0, 0xFF, 0),
            negative: Color::rgb(0xFF, 0, 0),
            equal_length_positive: Color::rgb(0, 0, 0xFF),
            equal_length_negative: Color::rgb(0xFF, 0xFF, 0),
            background: None,
            slots: Vec::new(),
        }
    }

    #[test]
    fn geometry_follows_layout() {
        let geometry = Geometry::new(5, Layout::default());
        assert_eq!(geometry.width, 25);
        assert_eq!(geometry.height, 200);
        assert_eq!(geometry.centerline, 100.0);
        assert_eq!(geometry.scale_factor, 90.0);

        let odd = Geometry::new(
            0,
            Layout {
                margin: 2,
                height: 11,
            },
        );
        assert_eq!(odd.width, 4);
        assert_eq!(odd.centerline, 6.0);
        assert_eq!(odd.scale_factor, 3.5);
    }

    #[test]
    fn waveform_segments_are_symmetric() {
        let frame = map_waveform(&[0.5, 1.0], Color::BLACK, &colors(), Layout::default());

        assert_eq!(frame.width, 22);
        assert_eq!(
            frame.primitives[0],
            DrawPrimitive::Clear {
                width: 22,
                height: 200
            }
        );
        let segments: Vec<_> = frame.segments().collect();
        assert_eq!(
            segments,
            vec![
                (Point::new(10.0, 55.0), Point::new(10.0, 145.0), Color::BLACK),
                (Point::new(11.0, 10.0), Point::new(11.0, 190.0), Color::BLACK),
            ]
        );
    }

    #[test]
    fn waveform_uses_single_colour_without_override() {
        let palette = colors();
        let frame = map(
            PeakSeries::Waveform {
                peaks: &[0.2],
                color: None,
            },
            &palette,
            Layout::default(),
        );
        assert!(frame.segments().all(|(_, _, color)| color == palette.single));
    }

    #[test]
    fn background_is_a_rounded_fill_when_configured() {
        let palette = ColorConfig {
            background: Some(Color::rgb(0x44, 0x44, 0x44)),
            ..colors()
        };
        let frame = map_waveform(&[], Color::BLACK, &palette, Layout::default());

        assert_eq!(
            frame.primitives,
            vec![DrawPrimitive::FillRoundedRect {
                width: 20,
                height: 200,
                radius: 10.0,
                color: Color::rgb(0x44, 0x44, 0x44),
            }]
        );
    }

    #[test]
    fn longer_first_recording_draws_unclamped_dominant_segments() {
        let first = vec![1.0_f32; 100];
        let second = vec![-1.0_f32; 50];
        let palette = colors();
        let frame = map_difference(&diff(&first, &second, 50), &palette, Layout::default());

        let segments: Vec<_> = frame.segments().collect();
        assert_eq!(
            segments,
            vec![
                (Point::new(10.0, 100.0), Point::new(10.0, -80.0), palette.negative),
                (Point::new(11.0, 100.0), Point::new(11.0, 10.0), palette.negative),
            ]
        );
    }

    #[test]
    fn shorter_first_recording_paints_both_signs_with_positive_colour() {
        let first = [0.5, -0.5, 0.0, 0.0];
        let second = [0.0; 8];
        let palette = colors();
        let frame = map_difference(&diff(&first, &second, 4), &palette, Layout::default());

        let segments: Vec<_> = frame.segments().collect();
        assert_eq!(segments.len(), 2);
        assert!(segments[1].1.y > 100.0);
        assert!(segments.iter().all(|(_, _, color)| *color == palette.positive));
    }

    #[test]
    fn equal_lengths_colour_by_sign() {
        let first = [0.5, -0.5];
        let second = [0.0, 0.0];
        let palette = colors();
        let frame = map_difference(&diff(&first, &second, 2), &palette, Layout::default());

        let segments: Vec<_> = frame.segments().collect();
        assert_eq!(
            segments,
            vec![
                (Point::new(10.0, 100.0), Point::new(10.0, 55.0), palette.equal_length_positive),
                (Point::new(10.0, 100.0), Point::new(10.0, 145.0), palette.equal_length_negative),
            ]
        );
    }

    #[test]
    fn zero_chunks_emit_no_segments() {
        let samples = [0.3_f32; 120];
        let frame = map_difference(&diff(&samples, &samples, 50), &colors(), Layout::default());
        assert_eq!(frame.width, 23);
        assert_eq!(frame.segments().count(), 0);
        assert_eq!(frame.primitives.len(), 1);
    }

    #[test]
    fn painting_replays_primitives_in_order() {
        let frame = map_waveform(&[0.1, 0.2, 0.3], Color::BLACK, &colors(), Layout::default());
        let mut renderer = RecordingRenderer::new();
        frame.paint(&mut renderer).unwrap();

        assert_eq!(renderer.size(), Some((frame.width, frame.height)));
        assert_eq!(renderer.painted(), frame.primitives.as_slice());
    }

    #[test]
    fn error_frame_clears_then_labels() {
        let frame = Frame::error(300, 200);
        assert_eq!(frame.primitives.len(), 2);
        assert!(matches!(frame.primitives[0], DrawPrimitive::Clear { .. }));
        match &frame.primitives[1] {
            DrawPrimitive::Label { at, text, color } => {
                assert_eq!(*at, Point::new(150.0, 100.0));
                assert_eq!(text, ERROR_MESSAGE);
                assert_eq!(*color, ERROR_COLOR);
            }
            other => panic!("unexpected primitive {other:?}"),
        }
    }
}
