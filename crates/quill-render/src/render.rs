//! The draw trait and its small vocabulary types.

use std::path::Path;

use quill_types::color::Color;
use quill_types::error::Result;

/// Stroke style for lines and curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashes,
    Dots,
    /// Strokes suppressed entirely (markers may still draw).
    None,
}

impl StrokeStyle {
    /// Resolve the canonical names produced by the `line-style` value type.
    pub fn from_name(name: &str) -> Option<StrokeStyle> {
        match name {
            "solid" => Some(StrokeStyle::Solid),
            "dashes" => Some(StrokeStyle::Dashes),
            "dots" => Some(StrokeStyle::Dots),
            "none" => Some(StrokeStyle::None),
            _ => None,
        }
    }
}

/// Marker glyph for data points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerGlyph {
    #[default]
    Bullet,
    Circle,
    Cross,
    Star,
}

impl MarkerGlyph {
    /// Resolve the canonical names produced by the `marker-style` value type.
    pub fn from_name(name: &str) -> Option<MarkerGlyph> {
        match name {
            "bullet" => Some(MarkerGlyph::Bullet),
            "circle" => Some(MarkerGlyph::Circle),
            "cross" => Some(MarkerGlyph::Cross),
            "star" => Some(MarkerGlyph::Star),
            _ => None,
        }
    }
}

/// Abstraction over a figure output backend.
///
/// Coordinates are page points with the origin at the bottom-left corner;
/// backends flip as needed. State setters (color, width, style) apply to
/// subsequent draw calls.
pub trait Renderer {
    /// Start a page of the given size, clearing any previous content.
    fn begin_page(&mut self, width: f64, height: f64);

    /// Set the stroke/fill color for subsequent draws.
    fn set_color(&mut self, color: Color);

    /// Set the stroke width in points.
    fn set_line_width(&mut self, width: f64);

    /// Set the stroke style.
    fn set_line_style(&mut self, style: StrokeStyle);

    /// Stroke an open polyline through the given points.
    fn polyline(&mut self, points: &[(f64, f64)]);

    /// Draw a marker glyph centered on the given point.
    fn marker(&mut self, x: f64, y: f64, glyph: MarkerGlyph, size: f64);

    /// Draw text with its baseline starting at the given point.
    fn text(&mut self, x: f64, y: f64, text: &str);

    /// Flush the page to `path`.
    fn finish(&mut self, path: &Path) -> Result<()>;
}
