//! The renderer boundary.
//!
//! The interpreter core calls into an opaque [`Renderer`] only with
//! already-typed, already-validated values (points, colors, widths). The
//! wire format of any particular backend is its own business; quill ships a
//! recording renderer for tests and a minimal SVG renderer so the binary
//! produces an artifact.

mod recording;
mod render;
mod svg;

pub use recording::{DrawOp, RecordingRenderer};
pub use render::{MarkerGlyph, Renderer, StrokeStyle};
pub use svg::SvgRenderer;
