//! The execution target handed to command callbacks.

use std::path::PathBuf;

use quill_data::DataStack;
use quill_render::{MarkerGlyph, Renderer, StrokeStyle};
use quill_types::color::Color;
use quill_types::config::QuillConfig;
use quill_types::error::Result;

/// Figure-wide style and axis state mutated by plot commands.
#[derive(Debug, Clone)]
pub struct FigureState {
    pub title: Option<String>,
    pub xrange: Option<(f64, f64)>,
    pub yrange: Option<(f64, f64)>,
    pub line_style: StrokeStyle,
    pub line_width: f64,
    pub marker: Option<MarkerGlyph>,
    /// Cycled across datasets drawn on the page.
    pub color_map: Vec<Color>,
}

/// Where and how big the output page is.
#[derive(Debug, Clone)]
pub struct OutputSettings {
    pub path: PathBuf,
    pub page_width: f64,
    pub page_height: f64,
}

/// Shared mutable state threaded through every command dispatch: the data
/// stack, the renderer, figure state, and output settings.
pub struct Context {
    pub data: DataStack,
    pub renderer: Box<dyn Renderer>,
    pub figure: FigureState,
    pub output: OutputSettings,
    /// Commands re-run by the interpreter after each data load.
    pub dataset_hook: Option<String>,
    loads_pending_hook: usize,
    page_open: bool,
    captured: Vec<String>,
}

impl Context {
    pub fn new(config: &QuillConfig, renderer: Box<dyn Renderer>) -> Self {
        let marker = MarkerGlyph::from_name(&config.marker);
        Context {
            data: DataStack::new(),
            renderer,
            figure: FigureState {
                title: None,
                xrange: None,
                yrange: None,
                line_style: StrokeStyle::Solid,
                line_width: config.line_width,
                marker,
                color_map: Vec::new(),
            },
            output: OutputSettings {
                path: config.default_output.clone(),
                page_width: config.page_width,
                page_height: config.page_height,
            },
            dataset_hook: None,
            loads_pending_hook: 0,
            page_open: false,
            captured: Vec::new(),
        }
    }

    /// Record a line of user-visible output (the `print`/`echo` path).
    pub fn print(&mut self, line: &str) {
        self.captured.push(line.to_string());
    }

    /// Output recorded so far, in order.
    pub fn captured_output(&self) -> &[String] {
        &self.captured
    }

    /// Drain recorded output (the binary prints and clears).
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.captured)
    }

    /// Called by data-loading commands; the interpreter runs the dataset
    /// hook once per recorded load after the dispatch returns.
    pub fn mark_data_loaded(&mut self) {
        self.loads_pending_hook += 1;
    }

    /// Number of loads since the last hook run; resets the counter.
    pub fn take_pending_loads(&mut self) -> usize {
        std::mem::take(&mut self.loads_pending_hook)
    }

    /// Open the page on first draw.
    pub fn ensure_page(&mut self) {
        if !self.page_open {
            self.renderer
                .begin_page(self.output.page_width, self.output.page_height);
            self.page_open = true;
        }
    }

    pub fn page_is_open(&self) -> bool {
        self.page_open
    }

    /// Flush the page to the configured output path.
    pub fn finish_page(&mut self) -> Result<()> {
        self.ensure_page();
        let path = self.output.path.clone();
        self.renderer.finish(&path)?;
        self.page_open = false;
        Ok(())
    }

    /// The color for the i-th dataset on the page.
    pub fn color_for(&self, index: usize) -> Color {
        if self.figure.color_map.is_empty() {
            Color::BLACK
        } else {
            self.figure.color_map[index % self.figure.color_map.len()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_render::{DrawOp, RecordingRenderer};

    fn ctx() -> Context {
        Context::new(&QuillConfig::default(), Box::new(RecordingRenderer::new()))
    }

    #[test]
    fn print_captures_in_order() {
        let mut c = ctx();
        c.print("one");
        c.print("two");
        assert_eq!(c.captured_output(), ["one", "two"]);
        assert_eq!(c.take_output(), vec!["one", "two"]);
        assert!(c.captured_output().is_empty());
    }

    #[test]
    fn pending_loads_reset_on_take() {
        let mut c = ctx();
        c.mark_data_loaded();
        c.mark_data_loaded();
        assert_eq!(c.take_pending_loads(), 2);
        assert_eq!(c.take_pending_loads(), 0);
    }

    #[test]
    fn color_cycles_through_the_map() {
        let mut c = ctx();
        assert_eq!(c.color_for(7), Color::BLACK);
        c.figure.color_map = vec![Color::RED, Color::BLUE];
        assert_eq!(c.color_for(0), Color::RED);
        assert_eq!(c.color_for(1), Color::BLUE);
        assert_eq!(c.color_for(2), Color::RED);
    }

    #[test]
    fn ensure_page_opens_once() {
        let recorder = RecordingRenderer::new();
        let mut c = Context::new(&QuillConfig::default(), Box::new(recorder.clone()));
        c.ensure_page();
        c.ensure_page();
        assert_eq!(
            recorder.count(|op| matches!(op, DrawOp::BeginPage { .. })),
            1
        );
        assert!(c.page_is_open());
    }

    #[test]
    fn finish_page_flushes_to_the_output_path() {
        let recorder = RecordingRenderer::new();
        let mut c = Context::new(&QuillConfig::default(), Box::new(recorder.clone()));
        c.finish_page().unwrap();
        assert_eq!(
            recorder.count(|op| matches!(op, DrawOp::Finish(_))),
            1
        );
        assert!(!c.page_is_open());
    }
}
