//! Coordinate mapping between matrix-index, bin and surface space
//!
//! This module contains pure coordinate transformation logic that can be
//! easily unit tested without a UI. All screen positions are relative to the
//! drawing surface's top-left corner.
//!
//! Every mapping derives from one ratio, the surface pixels per matrix cell of
//! the active window. Bins are placed at the true extent of the matrix cells
//! they cover, so a trailing partial bin is narrower than the others and the
//! three spaces always agree.

use egui::{Pos2, Rect, Vec2};

use crate::aggregate::lod_bin_size;
use crate::matrix::Window;

/// Geometry of one redraw: surface size, active window and bin layout
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridGeometry {
    surface: Vec2,
    window: Window,
    bin_size: usize,
}

impl GridGeometry {
    /// Geometry with an explicit bin size (zero is treated as one)
    pub fn new(surface: Vec2, window: Window, bin_size: usize) -> Self {
        Self {
            surface,
            window,
            bin_size: bin_size.max(1),
        }
    }

    /// Geometry with the bin size picked by the level-of-detail policy
    pub fn for_window(surface: Vec2, window: Window) -> Self {
        Self::new(surface, window, lod_bin_size(window.span()))
    }

    pub fn surface(&self) -> Vec2 {
        self.surface
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn bin_size(&self) -> usize {
        self.bin_size
    }

    /// Bin grid dimensions as (rows, cols)
    pub fn bin_dims(&self) -> (usize, usize) {
        (
            self.window.rows().div_ceil(self.bin_size),
            self.window.cols().div_ceil(self.bin_size),
        )
    }

    /// Surface pixels per matrix cell of the active window
    pub fn matrix_cell_size(&self) -> Vec2 {
        Vec2::new(
            self.surface.x / self.window.cols() as f32,
            self.surface.y / self.window.rows() as f32,
        )
    }

    /// Size of a full bin; equals `surface / bin_dims` when the window divides evenly
    pub fn cell_size(&self) -> Vec2 {
        self.matrix_cell_size() * self.bin_size as f32
    }

    fn has_area(&self) -> bool {
        self.surface.x > 0.0 && self.surface.y > 0.0
    }

    /// Surface rect covered by a bin, or `None` outside the grid
    pub fn bin_to_screen(&self, bin_row: usize, bin_col: usize) -> Option<Rect> {
        let (rows, cols) = self.bin_dims();
        if bin_row >= rows || bin_col >= cols {
            return None;
        }

        let cell = self.matrix_cell_size();
        let c0 = bin_col * self.bin_size;
        let c1 = (c0 + self.bin_size).min(self.window.cols());
        let r0 = bin_row * self.bin_size;
        let r1 = (r0 + self.bin_size).min(self.window.rows());

        Some(Rect::from_min_max(
            Pos2::new(c0 as f32 * cell.x, r0 as f32 * cell.y),
            Pos2::new(c1 as f32 * cell.x, r1 as f32 * cell.y),
        ))
    }

    /// Offset of the matrix cell under `pos` relative to the window origin
    fn window_offset(&self, pos: Pos2) -> Option<(usize, usize)> {
        if !self.has_area() || pos.x < 0.0 || pos.y < 0.0 {
            return None;
        }

        let cell = self.matrix_cell_size();
        let col = (pos.x / cell.x).floor() as usize;
        let row = (pos.y / cell.y).floor() as usize;

        (row < self.window.rows() && col < self.window.cols()).then_some((row, col))
    }

    /// Bin under `pos`, or `None` outside `[0, rows) x [0, cols)`
    pub fn screen_to_bin(&self, pos: Pos2) -> Option<(usize, usize)> {
        self.window_offset(pos)
            .map(|(row, col)| (row / self.bin_size, col / self.bin_size))
    }

    /// Exact matrix (row, col) under `pos`, independent of the bin size
    pub fn screen_to_matrix_index(&self, pos: Pos2) -> Option<(usize, usize)> {
        self.window_offset(pos)
            .map(|(row, col)| (self.window.row_start + row, self.window.col_start + col))
    }

    /// Extent of a surface rect measured in matrix cells of the active window
    pub fn extent_in_cells(&self, rect: Rect) -> Vec2 {
        if !self.has_area() {
            return Vec2::ZERO;
        }
        let cell = self.matrix_cell_size();
        Vec2::new(rect.width() / cell.x, rect.height() / cell.y)
    }

    /// Map a surface rect to a window nested inside the active window.
    ///
    /// The rect is clipped to the surface first. Any partially covered cell is
    /// included. Returns `None` when nothing of the window remains.
    pub fn screen_rect_to_window(&self, rect: Rect) -> Option<Window> {
        if !self.has_area() {
            return None;
        }

        let clipped = rect.intersect(Rect::from_min_size(Pos2::ZERO, self.surface));
        if !clipped.is_positive() {
            return None;
        }

        let cell = self.matrix_cell_size();
        let rows = self.window.rows();
        let cols = self.window.cols();

        let c0 = ((clipped.min.x / cell.x).floor() as usize).min(cols);
        let c1 = ((clipped.max.x / cell.x).ceil() as usize).min(cols);
        let r0 = ((clipped.min.y / cell.y).floor() as usize).min(rows);
        let r1 = ((clipped.max.y / cell.y).ceil() as usize).min(rows);

        Window::new(
            self.window.row_start + r0,
            self.window.row_start + r1,
            self.window.col_start + c0,
            self.window.col_start + c1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(r0: usize, r1: usize, c0: usize, c1: usize) -> Window {
        Window::new(r0, r1, c0, c1).unwrap()
    }

    #[test]
    fn test_cell_size_for_even_division() {
        let g = GridGeometry::new(Vec2::new(800.0, 600.0), window(0, 200, 0, 200), 4);
        assert_eq!(g.bin_dims(), (50, 50));
        let cell = g.cell_size();
        assert!((cell.x - 16.0).abs() < 0.001);
        assert!((cell.y - 12.0).abs() < 0.001);
    }

    #[test]
    fn test_lod_geometry() {
        let g = GridGeometry::for_window(Vec2::new(500.0, 500.0), window(0, 60, 0, 20));
        assert_eq!(g.bin_size(), 2);
        assert_eq!(g.bin_dims(), (30, 10));
    }

    #[test]
    fn test_bin_to_screen_tiles_surface() {
        let g = GridGeometry::new(Vec2::new(100.0, 70.0), window(0, 7, 0, 10), 3);
        assert_eq!(g.bin_dims(), (3, 4));

        let first = g.bin_to_screen(0, 0).unwrap();
        assert!((first.min.x).abs() < 0.001 && (first.min.y).abs() < 0.001);
        assert!((first.width() - 30.0).abs() < 0.001);
        assert!((first.height() - 30.0).abs() < 0.001);

        // Trailing partial bin covers one column and one row
        let last = g.bin_to_screen(2, 3).unwrap();
        assert!((last.max.x - 100.0).abs() < 0.001);
        assert!((last.max.y - 70.0).abs() < 0.001);
        assert!((last.width() - 10.0).abs() < 0.001);
        assert!((last.height() - 10.0).abs() < 0.001);

        assert!(g.bin_to_screen(3, 0).is_none());
        assert!(g.bin_to_screen(0, 4).is_none());
    }

    #[test]
    fn test_screen_to_bin_outside_is_none() {
        let g = GridGeometry::new(Vec2::new(100.0, 100.0), window(0, 10, 0, 10), 2);
        assert!(g.screen_to_bin(Pos2::new(-1.0, 5.0)).is_none());
        assert!(g.screen_to_bin(Pos2::new(5.0, 100.0)).is_none());
        assert!(g.screen_to_bin(Pos2::new(100.0, 5.0)).is_none());
        assert_eq!(g.screen_to_bin(Pos2::new(0.0, 0.0)), Some((0, 0)));
        assert_eq!(g.screen_to_bin(Pos2::new(99.9, 99.9)), Some((4, 4)));
    }

    #[test]
    fn test_screen_to_matrix_index_is_exact_when_binned() {
        // 200 columns at bin size 4 on an 800 px surface: 4 px per matrix cell
        let g = GridGeometry::new(Vec2::new(800.0, 800.0), window(0, 200, 0, 200), 4);
        assert_eq!(g.screen_to_matrix_index(Pos2::new(9.0, 13.0)), Some((3, 2)));
        assert_eq!(g.screen_to_bin(Pos2::new(9.0, 13.0)), Some((0, 0)));
    }

    #[test]
    fn test_screen_to_matrix_index_offsets_by_window() {
        let g = GridGeometry::new(Vec2::new(100.0, 100.0), window(40, 50, 20, 30), 1);
        assert_eq!(g.screen_to_matrix_index(Pos2::new(5.0, 5.0)), Some((40, 20)));
        assert_eq!(g.screen_to_matrix_index(Pos2::new(95.0, 15.0)), Some((41, 29)));
    }

    /// Every bin's center maps back into that bin, including trailing partial
    /// bins and strongly non-square windows.
    #[test]
    fn test_bin_center_round_trip() {
        let cases = [
            (Vec2::new(800.0, 600.0), window(0, 200, 0, 200)),
            (Vec2::new(640.0, 480.0), window(0, 101, 0, 101)),
            (Vec2::new(300.0, 700.0), window(3, 203, 7, 12)),
            (Vec2::new(123.0, 77.0), window(0, 55, 10, 65)),
            (Vec2::new(50.0, 50.0), window(0, 7, 0, 9)),
        ];

        for (surface, w) in cases {
            let g = GridGeometry::for_window(surface, w);
            let (rows, cols) = g.bin_dims();
            for r in 0..rows {
                for c in 0..cols {
                    let center = g.bin_to_screen(r, c).unwrap().center();
                    assert_eq!(g.screen_to_bin(center), Some((r, c)), "Bin ({}, {}) in {}", r, c, w);

                    let (mr, mc) = g.screen_to_matrix_index(center).unwrap();
                    assert_eq!((mr - w.row_start) / g.bin_size(), r);
                    assert_eq!((mc - w.col_start) / g.bin_size(), c);
                }
            }
        }
    }

    #[test]
    fn test_screen_rect_to_window_full_matrix() {
        let g = GridGeometry::new(Vec2::new(800.0, 600.0), window(0, 200, 0, 200), 4);
        let rect = Rect::from_two_pos(Pos2::new(10.0, 10.0), Pos2::new(200.0, 200.0));
        let w = g.screen_rect_to_window(rect).unwrap();

        // 4 px per column, 3 px per row
        assert_eq!(w, window(3, 67, 2, 50));
    }

    #[test]
    fn test_screen_rect_to_window_composes_with_active_window() {
        let g = GridGeometry::new(Vec2::new(100.0, 100.0), window(100, 150, 20, 70), 1);
        let rect = Rect::from_two_pos(Pos2::new(20.0, 40.0), Pos2::new(60.0, 80.0));
        let w = g.screen_rect_to_window(rect).unwrap();

        // 2 px per cell; offsets are relative to the active window, not the matrix
        assert_eq!(w, window(120, 140, 30, 50));
    }

    #[test]
    fn test_screen_rect_to_window_clips_to_surface() {
        let g = GridGeometry::new(Vec2::new(100.0, 100.0), window(0, 10, 0, 10), 1);
        let rect = Rect::from_two_pos(Pos2::new(-50.0, 55.0), Pos2::new(35.0, 500.0));
        assert_eq!(g.screen_rect_to_window(rect), Some(window(5, 10, 0, 4)));

        let outside = Rect::from_two_pos(Pos2::new(120.0, 120.0), Pos2::new(150.0, 150.0));
        assert!(g.screen_rect_to_window(outside).is_none());
    }

    #[test]
    fn test_extent_in_cells() {
        let g = GridGeometry::new(Vec2::new(800.0, 600.0), window(0, 200, 0, 200), 4);
        let extent = g.extent_in_cells(Rect::from_min_size(Pos2::ZERO, Vec2::new(8.0, 6.0)));
        assert!((extent.x - 2.0).abs() < 0.001);
        assert!((extent.y - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_zero_surface_maps_nothing() {
        let g = GridGeometry::new(Vec2::ZERO, window(0, 10, 0, 10), 1);
        assert!(g.screen_to_matrix_index(Pos2::ZERO).is_none());
        assert!(g.screen_rect_to_window(Rect::from_min_size(Pos2::ZERO, Vec2::splat(5.0))).is_none());
    }
}
