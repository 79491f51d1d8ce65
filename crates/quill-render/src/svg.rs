//! Minimal SVG renderer.
//!
//! Enough of SVG 1.1 to stroke polylines, place markers, and set text. The
//! page origin is bottom-left (plot convention), so y coordinates are
//! flipped when emitted.

use std::fmt::Write as _;
use std::path::Path;

use quill_types::color::Color;
use quill_types::error::Result;

use crate::render::{MarkerGlyph, Renderer, StrokeStyle};

pub struct SvgRenderer {
    width: f64,
    height: f64,
    body: String,
    color: Color,
    line_width: f64,
    style: StrokeStyle,
}

impl SvgRenderer {
    pub fn new() -> Self {
        SvgRenderer {
            width: 0.0,
            height: 0.0,
            body: String::new(),
            color: Color::BLACK,
            line_width: 1.0,
            style: StrokeStyle::Solid,
        }
    }

    fn flip(&self, y: f64) -> f64 {
        self.height - y
    }

    fn dash_attr(&self) -> &'static str {
        match self.style {
            StrokeStyle::Solid => "",
            StrokeStyle::Dashes => r#" stroke-dasharray="6 3""#,
            StrokeStyle::Dots => r#" stroke-dasharray="1 3""#,
            StrokeStyle::None => "",
        }
    }

    /// The document assembled so far, for tests.
    pub fn document(&self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" \
             viewBox=\"0 0 {w} {h}\">\n{body}</svg>\n",
            w = self.width,
            h = self.height,
            body = self.body,
        )
    }
}

impl Default for SvgRenderer {
    fn default() -> Self {
        SvgRenderer::new()
    }
}

impl Renderer for SvgRenderer {
    fn begin_page(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.body.clear();
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn set_line_style(&mut self, style: StrokeStyle) {
        self.style = style;
    }

    fn polyline(&mut self, points: &[(f64, f64)]) {
        if points.len() < 2 || self.style == StrokeStyle::None {
            return;
        }
        let coords: Vec<String> = points
            .iter()
            .map(|&(x, y)| format!("{:.2},{:.2}", x, self.flip(y)))
            .collect();
        let _ = writeln!(
            self.body,
            r#"  <polyline points="{}" fill="none" stroke="{}" stroke-width="{}"{}/>"#,
            coords.join(" "),
            self.color,
            self.line_width,
            self.dash_attr(),
        );
    }

    fn marker(&mut self, x: f64, y: f64, glyph: MarkerGlyph, size: f64) {
        let y = self.flip(y);
        let r = size / 2.0;
        match glyph {
            MarkerGlyph::Bullet => {
                let _ = writeln!(
                    self.body,
                    r#"  <circle cx="{x:.2}" cy="{y:.2}" r="{r:.2}" fill="{}"/>"#,
                    self.color,
                );
            },
            MarkerGlyph::Circle => {
                let _ = writeln!(
                    self.body,
                    r#"  <circle cx="{x:.2}" cy="{y:.2}" r="{r:.2}" fill="none" stroke="{}"/>"#,
                    self.color,
                );
            },
            MarkerGlyph::Cross => {
                let _ = writeln!(
                    self.body,
                    r#"  <path d="M {x0:.2} {y0:.2} L {x1:.2} {y1:.2} M {x0:.2} {y1:.2} L {x1:.2} {y0:.2}" stroke="{}"/>"#,
                    self.color,
                    x0 = x - r,
                    x1 = x + r,
                    y0 = y - r,
                    y1 = y + r,
                );
            },
            MarkerGlyph::Star => {
                let _ = writeln!(
                    self.body,
                    r#"  <path d="M {x:.2} {yt:.2} L {x:.2} {yb:.2} M {x0:.2} {y:.2} L {x1:.2} {y:.2} M {x0:.2} {y0:.2} L {x1:.2} {y1:.2} M {x0:.2} {y1:.2} L {x1:.2} {y0:.2}" stroke="{}"/>"#,
                    self.color,
                    yt = y - r,
                    yb = y + r,
                    x0 = x - r,
                    x1 = x + r,
                    y0 = y - r,
                    y1 = y + r,
                );
            },
        }
    }

    fn text(&mut self, x: f64, y: f64, text: &str) {
        let escaped = text
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
        let _ = writeln!(
            self.body,
            r#"  <text x="{x:.2}" y="{:.2}" fill="{}" font-size="12">{escaped}</text>"#,
            self.flip(y),
            self.color,
        );
    }

    fn finish(&mut self, path: &Path) -> Result<()> {
        std::fs::write(path, self.document())?;
        log::info!("wrote {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polyline_is_flipped_and_styled() {
        let mut r = SvgRenderer::new();
        r.begin_page(100.0, 100.0);
        r.set_color(Color::RED);
        r.set_line_style(StrokeStyle::Dashes);
        r.polyline(&[(0.0, 0.0), (10.0, 20.0)]);
        let doc = r.document();
        assert!(doc.contains("0.00,100.00 10.00,80.00"));
        assert!(doc.contains("stroke=\"#ff0000\""));
        assert!(doc.contains("stroke-dasharray"));
    }

    #[test]
    fn style_none_suppresses_strokes() {
        let mut r = SvgRenderer::new();
        r.begin_page(10.0, 10.0);
        r.set_line_style(StrokeStyle::None);
        r.polyline(&[(0.0, 0.0), (1.0, 1.0)]);
        assert!(!r.document().contains("polyline"));
    }

    #[test]
    fn text_is_escaped() {
        let mut r = SvgRenderer::new();
        r.begin_page(10.0, 10.0);
        r.text(1.0, 1.0, "a < b & c");
        assert!(r.document().contains("a &lt; b &amp; c"));
    }

    #[test]
    fn finish_writes_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.svg");
        let mut r = SvgRenderer::new();
        r.begin_page(10.0, 10.0);
        r.polyline(&[(0.0, 0.0), (5.0, 5.0)]);
        r.finish(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<svg"));
    }
}
