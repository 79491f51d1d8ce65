//! Foundation types for quill.
//!
//! This crate contains the platform-agnostic core types shared by all quill
//! crates: the error enum, runtime values, the named value-type (conversion)
//! system used to validate command arguments, colors, and configuration.

pub mod color;
pub mod config;
pub mod error;
pub mod types;
pub mod value;
