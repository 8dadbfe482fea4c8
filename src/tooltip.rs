//! Pointer-to-value inspection
//!
//! Tooltips always report the raw matrix sample under the pointer, never a
//! bin average, so they stay exact at every zoom level.

use egui::Pos2;

use crate::matrix::{Matrix, MatrixLabels};
use crate::transform::GridGeometry;

/// Value under the pointer; its presence means the tooltip is visible
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tooltip {
    /// Pointer position in surface coordinates
    pub screen_pos: Pos2,
    /// Zero-based matrix row
    pub row: usize,
    /// Zero-based matrix column
    pub col: usize,
    pub value: f64,
}

impl Tooltip {
    /// Human-readable text with one-based indices, e.g. "Residue 3 ↔ 5: 1.234 Å"
    pub fn text(&self, labels: &MatrixLabels, precision: usize) -> String {
        format!(
            "{} {} ↔ {}: {}",
            labels.axis,
            self.row + 1,
            self.col + 1,
            labels.format_value(self.value, precision)
        )
    }
}

/// Resolve the tooltip for `pos`, `None` when out of bounds or missing
pub fn resolve(matrix: &Matrix, geometry: &GridGeometry, pos: Pos2) -> Option<Tooltip> {
    let (row, col) = geometry.screen_to_matrix_index(pos)?;
    let value = matrix.get(row, col)?;
    Some(Tooltip {
        screen_pos: pos,
        row,
        col,
        value,
    })
}
