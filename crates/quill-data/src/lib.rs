//! Datasets and data sources for quill.
//!
//! Data enters quill through backends (currently the text-file backend),
//! lands on a stack of named tabular datasets, and is consumed by plot
//! commands. The interpreter core only sees this crate through the
//! [`DataStack`] handed to command callbacks.

mod dataset;
mod stack;
mod text_backend;

pub use dataset::Dataset;
pub use stack::DataStack;
pub use text_backend::{LoadSpec, load_text_file, parse_text};
