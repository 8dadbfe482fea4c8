//! Diverging blue-to-red color scale and the value range it normalizes against

use egui::Color32;

use crate::aggregate::BinGrid;

/// Neutral gray for bins with no valid samples.
///
/// Value-derived colors always satisfy `r + b` in `255..=256`, so this can
/// never collide with one of them.
pub const MISSING_COLOR: Color32 = Color32::from_rgb(200, 200, 200);

/// Peak of the green channel, reached at the midpoint of the scale
const GREEN_PEAK: f64 = 128.0;

/// Inclusive value range used for normalization
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ValueRange {
    /// Neutral fallback when there is no valid data at all
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl ValueRange {
    /// Min/max over the bins that hold data, or the `0..1` fallback
    pub fn of_bins(grid: &BinGrid) -> Self {
        grid.iter()
            .filter_map(|(_, _, bin)| bin.mean())
            .fold(None, |range: Option<ValueRange>, v| {
                Some(match range {
                    Some(r) => ValueRange {
                        min: r.min.min(v),
                        max: r.max.max(v),
                    },
                    None => ValueRange { min: v, max: v },
                })
            })
            .unwrap_or_default()
    }

    /// True when every value is the same and normalization has no span
    pub fn is_collapsed(&self) -> bool {
        self.max - self.min <= 0.0
    }

    /// Map `value` into `0..=1`; a collapsed range maps to the midpoint
    pub fn normalize(&self, value: f64) -> f64 {
        if self.is_collapsed() {
            0.5
        } else {
            ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        }
    }
}

/// Color for a bin with the given mean and sample count
pub fn color_of(value: f64, valid_count: usize, range: ValueRange) -> Color32 {
    if valid_count == 0 || !value.is_finite() {
        return MISSING_COLOR;
    }
    blue_red(range.normalize(value))
}

/// Map a normalized value (0-1) onto the diverging scale.
///
/// Red rises with `t`, blue falls with `t`, green peaks at `t = 0.5`.
pub fn blue_red(t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let r = (255.0 * t).round() as u8;
    let b = (255.0 * (1.0 - t)).round() as u8;
    let g = (GREEN_PEAK * (1.0 - (t - 0.5).abs() * 2.0)).round() as u8;
    Color32::from_rgb(r, g, b)
}
