//! Matrix data model: the immutable source grid, windows into it, and labels
//!
//! A `Matrix` is rectangular and read-only once built. Missing samples are
//! stored as `None`; non-finite inputs (NaN, ±inf) and JSON `null` are
//! normalized to missing at construction time so nothing downstream has to
//! re-check them.

use std::fmt;

use serde::Deserialize;

/// Errors raised while building a matrix from upstream data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    #[error("row {row} has {found} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("buffer size mismatch: expected {expected} values ({rows}x{cols}), got {found}")]
    SizeMismatch {
        rows: usize,
        cols: usize,
        expected: usize,
        found: usize,
    },
    #[error("matrix of {rows}x{cols} cells is too large")]
    TooLarge { rows: usize, cols: usize },
}

/// Rectangular grid of scalar samples, row-major.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "Vec<Vec<Option<f64>>>")]
pub struct Matrix {
    values: Vec<Option<f64>>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// A matrix with no cells
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from nested rows. Every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<Option<f64>>>) -> Result<Self, MatrixError> {
        let cols = rows.first().map_or(0, Vec::len);
        let row_count = rows.len();
        let mut values = Vec::with_capacity(row_count * cols);

        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != cols {
                return Err(MatrixError::Ragged {
                    row,
                    expected: cols,
                    found: cells.len(),
                });
            }
            values.extend(cells.into_iter().map(normalize));
        }

        Ok(Self {
            values,
            rows: row_count,
            cols,
        })
    }

    /// Build from a flat row-major buffer where NaN marks a missing sample
    pub fn from_row_major(values: Vec<f64>, rows: usize, cols: usize) -> Result<Self, MatrixError> {
        let expected = rows
            .checked_mul(cols)
            .ok_or(MatrixError::TooLarge { rows, cols })?;
        if values.len() != expected {
            return Err(MatrixError::SizeMismatch {
                rows,
                cols,
                expected,
                found: values.len(),
            });
        }

        Ok(Self {
            values: values.into_iter().map(|v| normalize(Some(v))).collect(),
            rows,
            cols,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// True when there is nothing to paint (zero rows or zero columns)
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Sample at (row, col); `None` when out of bounds or missing
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            self.values[row * self.cols + col]
        } else {
            None
        }
    }

    /// Window covering every cell, or `None` for an empty matrix
    pub fn full_window(&self) -> Option<Window> {
        Window::new(0, self.rows, 0, self.cols)
    }

    /// Whether `window` lies entirely inside this matrix
    pub fn contains_window(&self, window: &Window) -> bool {
        window.row_end <= self.rows && window.col_end <= self.cols
    }
}

impl TryFrom<Vec<Vec<Option<f64>>>> for Matrix {
    type Error = MatrixError;

    fn try_from(rows: Vec<Vec<Option<f64>>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

fn normalize(v: Option<f64>) -> Option<f64> {
    v.filter(|v| v.is_finite())
}

/// Half-open rectangle in matrix-index space.
///
/// Always non-empty: `row_start < row_end` and `col_start < col_end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Window {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl Window {
    /// Create a window, rejecting empty ranges
    pub fn new(row_start: usize, row_end: usize, col_start: usize, col_end: usize) -> Option<Self> {
        (row_start < row_end && col_start < col_end).then_some(Self {
            row_start,
            row_end,
            col_start,
            col_end,
        })
    }

    pub fn rows(&self) -> usize {
        self.row_end - self.row_start
    }

    pub fn cols(&self) -> usize {
        self.col_end - self.col_start
    }

    /// The larger of the two extents; drives the level-of-detail policy
    pub fn span(&self) -> usize {
        self.rows().max(self.cols())
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..{}) x [{}..{})",
            self.row_start, self.row_end, self.col_start, self.col_end
        )
    }
}

/// Axis and unit labels used for tooltips and the zoom label
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatrixLabels {
    /// Name of one matrix index, e.g. "Residue" or "Frame"
    pub axis: String,
    /// Unit suffix appended to values, e.g. "Å"
    pub unit: Option<String>,
}

impl Default for MatrixLabels {
    fn default() -> Self {
        Self {
            axis: "Index".to_string(),
            unit: None,
        }
    }
}

impl MatrixLabels {
    pub fn new(axis: impl Into<String>, unit: Option<&str>) -> Self {
        Self {
            axis: axis.into(),
            unit: unit.map(str::to_string),
        }
    }

    /// Format a value with the configured precision and unit
    pub fn format_value(&self, value: f64, precision: usize) -> String {
        match &self.unit {
            Some(unit) => format!("{:.*} {}", precision, value, unit),
            None => format!("{:.*}", precision, value),
        }
    }
}
