//! A renderer that records draw calls instead of producing output.
//!
//! Used by tests to assert on exactly what the interpreter asked the
//! backend to draw. Clones share the same op list, so a test can keep one
//! handle while handing a boxed clone to the code under test.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use quill_types::color::Color;
use quill_types::error::Result;

use crate::render::{MarkerGlyph, Renderer, StrokeStyle};

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    BeginPage { width: f64, height: f64 },
    SetColor(Color),
    SetLineWidth(f64),
    SetLineStyle(StrokeStyle),
    Polyline(Vec<(f64, f64)>),
    Marker {
        x: f64,
        y: f64,
        glyph: MarkerGlyph,
        size: f64,
    },
    Text { x: f64, y: f64, text: String },
    Finish(PathBuf),
}

/// Renderer recording every call into a shared list of [`DrawOp`]s.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    ops: Rc<RefCell<Vec<DrawOp>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        RecordingRenderer::default()
    }

    /// Snapshot of the recorded ops.
    pub fn ops(&self) -> Vec<DrawOp> {
        self.ops.borrow().clone()
    }

    /// Count ops matching a predicate, for terse test assertions.
    pub fn count(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.borrow().iter().filter(|op| pred(op)).count()
    }
}

impl Renderer for RecordingRenderer {
    fn begin_page(&mut self, width: f64, height: f64) {
        self.ops.borrow_mut().push(DrawOp::BeginPage { width, height });
    }

    fn set_color(&mut self, color: Color) {
        self.ops.borrow_mut().push(DrawOp::SetColor(color));
    }

    fn set_line_width(&mut self, width: f64) {
        self.ops.borrow_mut().push(DrawOp::SetLineWidth(width));
    }

    fn set_line_style(&mut self, style: StrokeStyle) {
        self.ops.borrow_mut().push(DrawOp::SetLineStyle(style));
    }

    fn polyline(&mut self, points: &[(f64, f64)]) {
        self.ops.borrow_mut().push(DrawOp::Polyline(points.to_vec()));
    }

    fn marker(&mut self, x: f64, y: f64, glyph: MarkerGlyph, size: f64) {
        self.ops
            .borrow_mut()
            .push(DrawOp::Marker { x, y, glyph, size });
    }

    fn text(&mut self, x: f64, y: f64, text: &str) {
        self.ops.borrow_mut().push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
        });
    }

    fn finish(&mut self, path: &Path) -> Result<()> {
        self.ops.borrow_mut().push(DrawOp::Finish(path.to_path_buf()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let mut r = RecordingRenderer::new();
        r.begin_page(100.0, 50.0);
        r.set_color(Color::RED);
        r.polyline(&[(0.0, 0.0), (10.0, 10.0)]);
        assert_eq!(
            r.ops()[0],
            DrawOp::BeginPage {
                width: 100.0,
                height: 50.0
            }
        );
        assert_eq!(r.count(|op| matches!(op, DrawOp::Polyline(_))), 1);
    }

    #[test]
    fn clones_share_the_op_list() {
        let recorder = RecordingRenderer::new();
        let mut boxed: Box<dyn Renderer> = Box::new(recorder.clone());
        boxed.set_line_width(2.0);
        assert_eq!(recorder.ops(), vec![DrawOp::SetLineWidth(2.0)]);
    }

    #[test]
    fn finish_records_the_path() {
        let mut r = RecordingRenderer::new();
        r.finish(Path::new("out.svg")).unwrap();
        assert_eq!(r.ops()[0], DrawOp::Finish(PathBuf::from("out.svg")));
    }
}
