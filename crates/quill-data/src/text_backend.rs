//! The text-file data backend.
//!
//! Reads whitespace/comma/semicolon separated numeric columns. Blank lines
//! and `#` comment lines are skipped; rows whose fields do not all parse as
//! numbers (e.g. column headers) are skipped with a debug log.

use std::path::Path;

use quill_types::error::{QuillError, Result};

use crate::dataset::Dataset;

/// Options controlling a text load.
#[derive(Debug, Clone)]
pub struct LoadSpec {
    /// Keep every n-th data row (1 = all rows).
    pub every: usize,
    /// Zero-based source column selection; `None` keeps all columns.
    pub columns: Option<Vec<usize>>,
    /// Dataset name override; defaults to the file name.
    pub name: Option<String>,
}

impl Default for LoadSpec {
    fn default() -> Self {
        LoadSpec {
            every: 1,
            columns: None,
            name: None,
        }
    }
}

/// Load a dataset from a text file.
pub fn load_text_file(path: &Path, spec: &LoadSpec) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)?;
    let name = spec
        .name
        .clone()
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    parse_text(&name, &text, spec)
}

/// Parse dataset text (the file-free core of [`load_text_file`]).
pub fn parse_text(name: &str, text: &str, spec: &LoadSpec) -> Result<Dataset> {
    let every = spec.every.max(1);
    let mut columns: Vec<Vec<f64>> = Vec::new();
    let mut data_row = 0usize;

    for (lineno, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = trimmed
            .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
            .filter(|f| !f.is_empty())
            .collect();
        let parsed: Option<Vec<f64>> = fields.iter().map(|f| f.parse().ok()).collect();
        let Some(mut row) = parsed else {
            log::debug!("{name}:{}: skipping non-numeric row", lineno + 1);
            continue;
        };

        if let Some(selection) = &spec.columns {
            let mut selected = Vec::with_capacity(selection.len());
            for &idx in selection {
                let Some(&v) = row.get(idx) else {
                    return Err(QuillError::Data(format!(
                        "{name}:{}: no column {idx} (row has {})",
                        lineno + 1,
                        row.len()
                    )));
                };
                selected.push(v);
            }
            row = selected;
        }

        if columns.is_empty() {
            columns = vec![Vec::new(); row.len()];
        } else if row.len() != columns.len() {
            log::warn!(
                "{name}:{}: expected {} fields, got {}; row skipped",
                lineno + 1,
                columns.len(),
                row.len()
            );
            continue;
        }

        if data_row % every == 0 {
            for (col, v) in columns.iter_mut().zip(row) {
                col.push(v);
            }
        }
        data_row += 1;
    }

    if columns.is_empty() || columns[0].is_empty() {
        return Err(QuillError::Data(format!("no numeric data in '{name}'")));
    }
    Dataset::new(name, columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_whitespace_columns() {
        let ds = parse_text("t", "1 10\n2 20\n3 30\n", &LoadSpec::default()).unwrap();
        assert_eq!(ds.column(0).unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(ds.column(1).unwrap(), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn skips_comments_and_headers() {
        let text = "# produced by a simulation\nx y\n1,10\n2,20\n";
        let ds = parse_text("t", text, &LoadSpec::default()).unwrap();
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn every_subsamples() {
        let spec = LoadSpec {
            every: 2,
            ..LoadSpec::default()
        };
        let ds = parse_text("t", "0\n1\n2\n3\n4\n", &spec).unwrap();
        assert_eq!(ds.column(0).unwrap(), &[0.0, 2.0, 4.0]);
    }

    #[test]
    fn column_selection_reorders() {
        let spec = LoadSpec {
            columns: Some(vec![1, 0]),
            ..LoadSpec::default()
        };
        let ds = parse_text("t", "1 10\n2 20\n", &spec).unwrap();
        assert_eq!(ds.column(0).unwrap(), &[10.0, 20.0]);
        assert_eq!(ds.column(1).unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn out_of_range_column_is_data_error() {
        let spec = LoadSpec {
            columns: Some(vec![5]),
            ..LoadSpec::default()
        };
        assert!(matches!(
            parse_text("t", "1 2\n", &spec),
            Err(QuillError::Data(_))
        ));
    }

    #[test]
    fn all_comments_is_data_error() {
        assert!(matches!(
            parse_text("t", "# nothing\n# here\n", &LoadSpec::default()),
            Err(QuillError::Data(_))
        ));
    }

    #[test]
    fn loads_from_a_real_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "1 1\n2 4\n3 9").unwrap();
        let ds = load_text_file(f.path(), &LoadSpec::default()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.column(1).unwrap(), &[1.0, 4.0, 9.0]);
    }

    #[test]
    fn name_override_applies_on_load() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "1\n2").unwrap();
        let spec = LoadSpec {
            name: Some("mine".into()),
            ..LoadSpec::default()
        };
        let ds = load_text_file(f.path(), &spec).unwrap();
        assert_eq!(ds.name(), "mine");
    }
}
