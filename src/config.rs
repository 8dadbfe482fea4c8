//! Runtime options for a heatmap instance

use serde::Deserialize;

use crate::interaction::DEFAULT_MIN_SELECTION_CELLS;
use crate::resize::DEFAULT_SETTLE_SECS;

/// Longest accepted resize quiet period
pub const MAX_SETTLE_SECS: f64 = 10.0;
/// Most decimal places a tooltip may show
pub const MAX_VALUE_PRECISION: usize = 12;
/// Upper bound for every length given in pixels or cells
const MAX_LENGTH: f32 = 1000.0;

/// Errors raised while loading options
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("malformed options: {0}")]
    Json(#[from] serde_json::Error),
    #[error("option '{field}' must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
}

/// Tunables that a host may override, usually from a JSON object like
/// `{ "valuePrecision": 2, "resizeSettleSecs": 0.25 }`.
/// Missing fields keep their defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct HeatmapOptions {
    /// A drag must span more than this many matrix cells on both axes to zoom
    pub min_selection_cells: f32,
    /// Quiet period before a container resize triggers a redraw
    pub resize_settle_secs: f64,
    /// Decimal places shown in tooltips
    pub value_precision: usize,
    /// Width of the cell border drawn for unaggregated views
    pub cell_border_width: f32,
    /// Width of the dashed selection outline
    pub selection_stroke_width: f32,
    pub selection_dash: f32,
    pub selection_gap: f32,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            min_selection_cells: DEFAULT_MIN_SELECTION_CELLS,
            resize_settle_secs: DEFAULT_SETTLE_SECS,
            value_precision: 3,
            cell_border_width: 1.0,
            selection_stroke_width: 2.0,
            selection_dash: 5.0,
            selection_gap: 5.0,
        }
    }
}

impl HeatmapOptions {
    /// Parse and validate options from a JSON object
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Reject values the widget cannot honor without panicking or hanging
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("resizeSettleSecs", self.resize_settle_secs, 0.0, MAX_SETTLE_SECS, "between 0 and 10")?;
        check_range(
            "valuePrecision",
            self.value_precision as f64,
            0.0,
            MAX_VALUE_PRECISION as f64,
            "at most 12",
        )?;

        let lengths = [
            ("minSelectionCells", self.min_selection_cells),
            ("cellBorderWidth", self.cell_border_width),
            ("selectionStrokeWidth", self.selection_stroke_width),
            ("selectionDash", self.selection_dash),
            ("selectionGap", self.selection_gap),
        ];
        for (field, value) in lengths {
            check_range(field, value as f64, 0.0, MAX_LENGTH as f64, "between 0 and 1000")?;
        }
        Ok(())
    }

    /// Copy with every pixel length multiplied by `pixels_per_point`
    pub fn scaled(&self, pixels_per_point: f32) -> Self {
        Self {
            cell_border_width: self.cell_border_width * pixels_per_point,
            selection_stroke_width: self.selection_stroke_width * pixels_per_point,
            selection_dash: self.selection_dash * pixels_per_point,
            selection_gap: self.selection_gap * pixels_per_point,
            ..self.clone()
        }
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64, expected: &'static str) -> Result<(), ConfigError> {
    // NaN fails both comparisons
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, expected, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options = HeatmapOptions::from_json(r#"{ "valuePrecision": 1, "selectionDash": 3.0 }"#).unwrap();
        assert_eq!(options.value_precision, 1);
        assert!((options.selection_dash - 3.0).abs() < 0.001);
        assert!((options.min_selection_cells - DEFAULT_MIN_SELECTION_CELLS).abs() < 0.001);
        assert!((options.resize_settle_secs - DEFAULT_SETTLE_SECS).abs() < 1e-9);
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(HeatmapOptions::from_json("{}").unwrap(), HeatmapOptions::default());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(matches!(
            HeatmapOptions::from_json(r#"{ "zoomStep": 2 }"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        for json in [
            r#"{ "resizeSettleSecs": 1e300 }"#,
            r#"{ "resizeSettleSecs": -0.5 }"#,
            r#"{ "minSelectionCells": -1 }"#,
            r#"{ "minSelectionCells": 1e30 }"#,
            r#"{ "valuePrecision": 400 }"#,
            r#"{ "selectionGap": 5000 }"#,
        ] {
            assert!(
                matches!(HeatmapOptions::from_json(json), Err(ConfigError::OutOfRange { .. })),
                "{} should be rejected",
                json
            );
        }

        let err = HeatmapOptions::from_json(r#"{ "resizeSettleSecs": 1e300 }"#).unwrap_err();
        assert!(err.to_string().contains("resizeSettleSecs"));
    }

    #[test]
    fn test_non_finite_values_fail_validation() {
        let options = HeatmapOptions {
            resize_settle_secs: f64::NAN,
            ..HeatmapOptions::default()
        };
        assert!(options.validate().is_err());

        let options = HeatmapOptions {
            selection_dash: f32::INFINITY,
            ..HeatmapOptions::default()
        };
        assert!(options.validate().is_err());
        assert!(HeatmapOptions::default().validate().is_ok());
    }

    #[test]
    fn test_scaled_multiplies_pixel_lengths_only() {
        let scaled = HeatmapOptions::default().scaled(2.0);
        assert!((scaled.cell_border_width - 2.0).abs() < 0.001);
        assert!((scaled.selection_dash - 10.0).abs() < 0.001);
        assert!((scaled.min_selection_cells - DEFAULT_MIN_SELECTION_CELLS).abs() < 0.001);
        assert_eq!(scaled.value_precision, 3);
    }
}
