//! Program configuration loaded from an optional `quill.toml`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

/// User preferences applied before any script runs.
///
/// Every field has a default so a partial (or absent) file is fine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuillConfig {
    /// Page width in points.
    pub page_width: f64,
    /// Page height in points.
    pub page_height: f64,
    /// Output file written by `render` when no `output` command ran.
    pub default_output: PathBuf,
    /// Default stroke width in points.
    pub line_width: f64,
    /// Default marker glyph name.
    pub marker: String,
}

impl Default for QuillConfig {
    fn default() -> Self {
        QuillConfig {
            page_width: 480.0,
            page_height: 320.0,
            default_output: PathBuf::from("quill-out.svg"),
            line_width: 1.0,
            marker: "bullet".to_string(),
        }
    }
}

impl QuillConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a file, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(QuillConfig::default());
        }
        let text = std::fs::read_to_string(path)?;
        QuillConfig::from_toml(&text)
    }
}
