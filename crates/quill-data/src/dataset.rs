//! A named table of numeric columns.

use quill_types::error::{QuillError, Result};

/// A tabular dataset: one or more equal-length numeric columns.
///
/// Column 0 is the abscissa by convention; a single-column dataset is
/// plotted against its row index.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name: String,
    columns: Vec<Vec<f64>>,
}

impl Dataset {
    pub fn new(name: &str, columns: Vec<Vec<f64>>) -> Result<Self> {
        if columns.is_empty() {
            return Err(QuillError::Data(format!("dataset '{name}' has no columns")));
        }
        let rows = columns[0].len();
        if columns.iter().any(|c| c.len() != rows) {
            return Err(QuillError::Data(format!(
                "dataset '{name}' has ragged columns"
            )));
        }
        Ok(Dataset {
            name: name.to_string(),
            columns,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, idx: usize) -> Option<&[f64]> {
        self.columns.get(idx).map(Vec::as_slice)
    }

    /// (x, y) pairs: columns 0 and 1, or (index, column 0) for a
    /// single-column dataset.
    pub fn points(&self) -> Vec<(f64, f64)> {
        if self.columns.len() >= 2 {
            self.columns[0]
                .iter()
                .zip(&self.columns[1])
                .map(|(&x, &y)| (x, y))
                .collect()
        } else {
            self.columns[0]
                .iter()
                .enumerate()
                .map(|(i, &y)| (i as f64, y))
                .collect()
        }
    }

    /// ((xmin, xmax), (ymin, ymax)) over [`Dataset::points`], or `None` for
    /// an empty dataset.
    pub fn bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let points = self.points();
        let (&(x0, y0), rest) = points.split_first()?;
        let mut bounds = ((x0, x0), (y0, y0));
        for &(x, y) in rest {
            bounds.0.0 = bounds.0.0.min(x);
            bounds.0.1 = bounds.0.1.max(x);
            bounds.1.0 = bounds.1.0.min(y);
            bounds.1.1 = bounds.1.1.max(y);
        }
        Some(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_column_points() {
        let ds = Dataset::new("d", vec![vec![1.0, 2.0], vec![10.0, 20.0]]).unwrap();
        assert_eq!(ds.points(), vec![(1.0, 10.0), (2.0, 20.0)]);
    }

    #[test]
    fn single_column_uses_index() {
        let ds = Dataset::new("d", vec![vec![5.0, 6.0, 7.0]]).unwrap();
        assert_eq!(ds.points(), vec![(0.0, 5.0), (1.0, 6.0), (2.0, 7.0)]);
    }

    #[test]
    fn ragged_columns_rejected() {
        let err = Dataset::new("d", vec![vec![1.0], vec![1.0, 2.0]]).unwrap_err();
        assert!(matches!(err, QuillError::Data(_)));
    }

    #[test]
    fn no_columns_rejected() {
        assert!(Dataset::new("d", vec![]).is_err());
    }

    #[test]
    fn bounds() {
        let ds = Dataset::new("d", vec![vec![1.0, 3.0, 2.0], vec![-1.0, 0.0, 5.0]]).unwrap();
        assert_eq!(ds.bounds(), Some(((1.0, 3.0), (-1.0, 5.0))));
    }

    #[test]
    fn empty_bounds_is_none() {
        let ds = Dataset::new("d", vec![vec![]]).unwrap();
        assert_eq!(ds.bounds(), None);
        assert!(ds.is_empty());
    }
}
