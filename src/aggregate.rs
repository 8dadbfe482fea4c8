//! Level-of-detail aggregation of a matrix window into a coarser bin grid
//!
//! Tiles are aligned to the window origin, not the matrix origin, and the
//! trailing tile along each axis may be smaller than `bin_size`. A tile with
//! no valid samples yields an empty bin whose value is NaN; callers must look
//! at `valid_count`, never at the value, to decide whether a bin has data.

use crate::matrix::{Matrix, Window};

/// Above this span the view targets `COARSE_TARGET_CELLS` bins per axis
pub const COARSE_SPAN: usize = 100;
/// Target bins per axis for large spans
pub const COARSE_TARGET_CELLS: usize = 50;
/// Above this span (and up to `COARSE_SPAN`) the view targets `FINE_TARGET_CELLS`
pub const FINE_SPAN: usize = 50;
/// Target bins per axis for medium spans
pub const FINE_TARGET_CELLS: usize = 30;

/// Choose a bin size from the larger window extent.
///
/// Keeps the painted grid at roughly 30-50 cells per axis regardless of the
/// matrix size, so per-frame work stays bounded.
pub fn lod_bin_size(span: usize) -> usize {
    if span > COARSE_SPAN {
        span.div_ceil(COARSE_TARGET_CELLS)
    } else if span > FINE_SPAN {
        span.div_ceil(FINE_TARGET_CELLS)
    } else {
        1
    }
}

/// Statistics for one aggregated cell
#[derive(Clone, Copy, Debug)]
pub struct Bin {
    /// Mean of the valid samples, NaN when `valid_count == 0`
    pub value: f64,
    /// Number of non-missing samples that went into `value`
    pub valid_count: usize,
}

impl Bin {
    pub const EMPTY: Bin = Bin {
        value: f64::NAN,
        valid_count: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.valid_count == 0
    }

    /// The mean, or `None` for a bin without samples
    pub fn mean(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.value)
    }
}

/// Downsampled grid produced by [`aggregate`], row-major
#[derive(Clone, Debug)]
pub struct BinGrid {
    bins: Vec<Bin>,
    rows: usize,
    cols: usize,
    bin_size: usize,
}

impl BinGrid {
    fn empty(bin_size: usize) -> Self {
        Self {
            bins: Vec::new(),
            rows: 0,
            cols: 0,
            bin_size,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn bin_size(&self) -> usize {
        self.bin_size
    }

    /// True for the "nothing to paint" grid
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Bin> {
        if row < self.rows && col < self.cols {
            self.bins.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Iterate `(bin_row, bin_col, bin)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Bin)> + '_ {
        let cols = self.cols.max(1);
        self.bins
            .iter()
            .enumerate()
            .map(move |(i, bin)| (i / cols, i % cols, bin))
    }
}

/// Reduce `window` of `matrix` (the full matrix when `None`) to bins of
/// `bin_size` x `bin_size` samples.
///
/// The grid has `ceil(rows / bin_size) x ceil(cols / bin_size)` bins. Samples
/// outside the matrix bounds are skipped like missing ones. A `bin_size` of
/// zero is treated as one.
pub fn aggregate(matrix: &Matrix, bin_size: usize, window: Option<Window>) -> BinGrid {
    let bin_size = bin_size.max(1);

    let window = match window.or_else(|| matrix.full_window()) {
        Some(window) if !matrix.is_empty() => window,
        _ => return BinGrid::empty(bin_size),
    };

    let rows = window.rows().div_ceil(bin_size);
    let cols = window.cols().div_ceil(bin_size);
    let mut bins = Vec::with_capacity(rows * cols);

    for bin_row in 0..rows {
        let r0 = window.row_start + bin_row * bin_size;
        let r1 = (r0 + bin_size).min(window.row_end);

        for bin_col in 0..cols {
            let c0 = window.col_start + bin_col * bin_size;
            let c1 = (c0 + bin_size).min(window.col_end);

            let mut sum = 0.0;
            let mut valid_count = 0;
            for r in r0..r1 {
                for c in c0..c1 {
                    if let Some(v) = matrix.get(r, c) {
                        sum += v;
                        valid_count += 1;
                    }
                }
            }

            bins.push(if valid_count > 0 {
                Bin {
                    value: sum / valid_count as f64,
                    valid_count,
                }
            } else {
                Bin::EMPTY
            });
        }
    }

    BinGrid {
        bins,
        rows,
        cols,
        bin_size,
    }
}
