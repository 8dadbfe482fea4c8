//! Redraw pipeline: window → bin size → aggregate → range → paint
//!
//! Every run recomputes everything from the current matrix, zoom state,
//! selection and surface size; nothing is carried over between runs.

use egui::{Color32, Rect, Stroke};

use crate::aggregate::aggregate;
use crate::colormap::{color_of, ValueRange};
use crate::config::HeatmapOptions;
use crate::interaction::ZoomState;
use crate::matrix::Matrix;
use crate::surface::Surface;
use crate::transform::GridGeometry;

/// Border between cells when the view is unaggregated
pub const CELL_BORDER_COLOR: Color32 = Color32::WHITE;
/// Outline of the live selection
pub const SELECTION_COLOR: Color32 = Color32::from_rgb(0, 102, 204);
/// Cells smaller than this many border widths are drawn without a border
const MIN_BORDERED_CELL_WIDTHS: f32 = 3.0;

/// Snapshot of the state one redraw reads
#[derive(Clone, Copy, Debug)]
pub struct RenderInput<'a> {
    pub matrix: Option<&'a Matrix>,
    pub zoom: ZoomState,
    /// Live selection rectangle in surface coordinates
    pub selection: Option<Rect>,
}

/// What a redraw produced
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSummary {
    /// Layout that was painted, `None` when there was nothing to paint
    pub geometry: Option<GridGeometry>,
    pub range: ValueRange,
    pub bins_painted: usize,
    pub missing_bins: usize,
}

impl RenderSummary {
    fn nothing() -> Self {
        Self {
            geometry: None,
            range: ValueRange::default(),
            bins_painted: 0,
            missing_bins: 0,
        }
    }
}

/// Geometry the view would use for `matrix` at `zoom` on a surface of `size`
pub fn resolve_geometry(matrix: &Matrix, zoom: ZoomState, size: egui::Vec2) -> Option<GridGeometry> {
    zoom.active_window(matrix)
        .map(|window| GridGeometry::for_window(size, window))
}

/// Border for unaggregated views whose cells are large enough to stay readable
fn cell_border(geometry: &GridGeometry, options: &HeatmapOptions) -> Option<Stroke> {
    let width = options.cell_border_width;
    if geometry.bin_size() != 1 || width <= 0.0 {
        return None;
    }
    let min_cell = MIN_BORDERED_CELL_WIDTHS * width.max(1.0);
    (geometry.matrix_cell_size().min_elem() >= min_cell)
        .then(|| Stroke::new(width, CELL_BORDER_COLOR))
}

/// Run one full redraw into `surface`
pub fn render(surface: &mut impl Surface, input: RenderInput<'_>, options: &HeatmapOptions) -> RenderSummary {
    surface.clear();

    let size = surface.size();
    let Some(matrix) = input.matrix else {
        return RenderSummary::nothing();
    };
    let Some(geometry) = resolve_geometry(matrix, input.zoom, size) else {
        return RenderSummary::nothing();
    };

    let grid = aggregate(matrix, geometry.bin_size(), Some(geometry.window()));
    let range = ValueRange::of_bins(&grid);
    let border = cell_border(&geometry, options);

    let mut summary = RenderSummary {
        geometry: Some(geometry),
        range,
        bins_painted: 0,
        missing_bins: 0,
    };

    for (bin_row, bin_col, bin) in grid.iter() {
        let Some(rect) = geometry.bin_to_screen(bin_row, bin_col) else {
            continue;
        };
        surface.fill_rect(rect, color_of(bin.value, bin.valid_count, range));
        if let Some(stroke) = border {
            surface.stroke_rect(rect, stroke);
        }
        summary.bins_painted += 1;
        if bin.is_empty() {
            summary.missing_bins += 1;
        }
    }

    if let Some(selection) = input.selection {
        surface.stroke_dashed_rect(
            selection,
            Stroke::new(options.selection_stroke_width, SELECTION_COLOR),
            options.selection_dash,
            options.selection_gap,
        );
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::{blue_red, MISSING_COLOR};
    use crate::matrix::Window;
    use crate::surface::RasterSurface;
    use egui::Pos2;

    const BG: Color32 = Color32::TRANSPARENT;

    fn input(matrix: &Matrix) -> RenderInput<'_> {
        RenderInput {
            matrix: Some(matrix),
            zoom: ZoomState::Full,
            selection: None,
        }
    }

    #[test]
    fn test_all_missing_paints_only_sentinel() {
        let m = Matrix::from_rows(vec![vec![None; 4]; 4]).unwrap();
        let mut s = RasterSurface::new(40, 40, BG);
        let summary = render(&mut s, input(&m), &HeatmapOptions::default());

        assert_eq!(summary.bins_painted, 16);
        assert_eq!(summary.missing_bins, 16);
        for r in 0..4 {
            for c in 0..4 {
                let center = (c * 10 + 5, r * 10 + 5);
                assert_eq!(s.pixel(center.0, center.1), Some(MISSING_COLOR));
            }
        }
    }

    #[test]
    fn test_uniform_matrix_renders_midpoint() {
        let m = Matrix::from_row_major(vec![5.0; 200 * 200], 200, 200).unwrap();
        let mut s = RasterSurface::new(400, 400, BG);
        let summary = render(&mut s, input(&m), &HeatmapOptions::default());

        let geometry = summary.geometry.unwrap();
        assert_eq!(geometry.bin_size(), 4);
        assert_eq!(summary.range, ValueRange { min: 5.0, max: 5.0 });
        assert_eq!(summary.bins_painted, 2500);

        let midpoint = blue_red(0.5);
        for y in (0..400).step_by(7) {
            for x in (0..400).step_by(7) {
                assert_eq!(s.pixel(x, y), Some(midpoint), "Pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_border_only_when_unaggregated() {
        let small = Matrix::from_row_major((0..100).map(|v| v as f64).collect(), 10, 10).unwrap();
        let mut s = RasterSurface::new(100, 100, BG);
        render(&mut s, input(&small), &HeatmapOptions::default());
        assert_eq!(s.pixel(10, 15), Some(CELL_BORDER_COLOR), "Cell edge should carry a border");
        assert_eq!(s.pixel(0, 0), Some(CELL_BORDER_COLOR));

        let large = Matrix::from_row_major((0..120 * 120).map(|v| v as f64).collect(), 120, 120).unwrap();
        let mut s = RasterSurface::new(120, 120, BG);
        let summary = render(&mut s, input(&large), &HeatmapOptions::default());
        assert!(summary.geometry.unwrap().bin_size() > 1);
        for x in 0..120 {
            assert_ne!(s.pixel(x, 0), Some(CELL_BORDER_COLOR));
        }
    }

    #[test]
    fn test_small_cells_skip_border() {
        // 2 px cells: a border would cover every pixel
        let m = Matrix::from_row_major((0..50 * 50).map(|v| v as f64).collect(), 50, 50).unwrap();
        let mut s = RasterSurface::new(100, 100, BG);
        let summary = render(&mut s, input(&m), &HeatmapOptions::default());
        assert_eq!(summary.geometry.unwrap().bin_size(), 1);

        let border_pixels = (0..100)
            .flat_map(|y| (0..100).map(move |x| (x, y)))
            .filter(|&(x, y)| s.pixel(x, y) == Some(CELL_BORDER_COLOR))
            .count();
        assert_eq!(border_pixels, 0, "Cells this small must show data, not border");
        assert_eq!(s.pixel(99, 99), Some(blue_red(1.0)));

        // 3 px cells are the smallest that still get one
        let m = Matrix::from_row_major((0..10 * 10).map(|v| v as f64).collect(), 10, 10).unwrap();
        let mut s = RasterSurface::new(30, 30, BG);
        render(&mut s, input(&m), &HeatmapOptions::default());
        assert_eq!(s.pixel(0, 0), Some(CELL_BORDER_COLOR));
        assert_ne!(s.pixel(1, 1), Some(CELL_BORDER_COLOR));
    }

    #[test]
    fn test_zero_border_width_disables_border() {
        let m = Matrix::from_row_major((0..100).map(|v| v as f64).collect(), 10, 10).unwrap();
        let mut s = RasterSurface::new(100, 100, BG);
        let options = HeatmapOptions { cell_border_width: 0.0, ..HeatmapOptions::default() };
        render(&mut s, input(&m), &options);
        assert_ne!(s.pixel(0, 0), Some(CELL_BORDER_COLOR));
    }

    #[test]
    fn test_extremes_map_to_ends_of_scale() {
        let m = Matrix::from_rows(vec![vec![Some(0.0), Some(10.0)]]).unwrap();
        let mut s = RasterSurface::new(20, 10, BG);
        render(&mut s, input(&m), &HeatmapOptions::default());

        assert_eq!(s.pixel(5, 5), Some(blue_red(0.0)));
        assert_eq!(s.pixel(15, 5), Some(blue_red(1.0)));
    }

    #[test]
    fn test_zoomed_window_is_painted_full_surface() {
        // Left half is low, right half is high
        let m = Matrix::from_row_major(
            (0..20 * 20).map(|i| if i % 20 < 10 { 0.0 } else { 1.0 }).collect(),
            20,
            20,
        )
        .unwrap();
        let zoom = ZoomState::Zoomed(Window::new(0, 20, 10, 20).unwrap());
        let mut s = RasterSurface::new(100, 100, BG);
        let summary = render(
            &mut s,
            RenderInput { matrix: Some(&m), zoom, selection: None },
            &HeatmapOptions::default(),
        );

        assert_eq!(summary.geometry.unwrap().window(), Window::new(0, 20, 10, 20).unwrap());
        // Only high values are visible, so the range collapses to the midpoint
        assert_eq!(s.pixel(52, 52), Some(blue_red(0.5)));
    }

    #[test]
    fn test_selection_outline_painted() {
        let m = Matrix::from_row_major(vec![1.0; 100 * 100], 100, 100).unwrap();
        let mut s = RasterSurface::new(200, 200, BG);
        let selection = Rect::from_two_pos(Pos2::new(20.0, 20.0), Pos2::new(120.0, 120.0));
        render(
            &mut s,
            RenderInput { matrix: Some(&m), zoom: ZoomState::Full, selection: Some(selection) },
            &HeatmapOptions::default(),
        );

        assert_eq!(s.pixel(22, 20), Some(SELECTION_COLOR));
        assert_ne!(s.pixel(70, 70), Some(SELECTION_COLOR));
    }

    #[test]
    fn test_nothing_to_paint_clears_surface() {
        let mut s = RasterSurface::new(10, 10, BG);
        s.fill_rect(Rect::from_min_max(Pos2::ZERO, Pos2::new(10.0, 10.0)), Color32::RED);

        let summary = render(
            &mut s,
            RenderInput { matrix: None, zoom: ZoomState::Full, selection: None },
            &HeatmapOptions::default(),
        );
        assert!(summary.geometry.is_none());
        assert_eq!(s.pixel(5, 5), Some(BG));

        let empty = Matrix::empty();
        let summary = render(&mut s, input(&empty), &HeatmapOptions::default());
        assert_eq!(summary.bins_painted, 0);
    }
}
