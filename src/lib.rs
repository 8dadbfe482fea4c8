//! distmap - A browser-based interactive matrix heatmap using Rust, WASM, and egui
//!
//! This library renders a 2D matrix of distances (or any scalar) as a heatmap
//! that can be embedded in web applications. Large matrices are aggregated
//! into bins so the view stays responsive; dragging a rectangle zooms into a
//! sub-window, and hovering shows the exact value under the pointer.
//!
//! ## Architecture
//!
//! - `HeatmapWidget`: Self-contained egui widget with all viewing state
//! - `HeatmapApp`: Thin eframe App shell that hosts the widget
//! - `HeatmapHandle`: WASM interface for JavaScript to control the heatmap
//!
//! The pipeline itself (`aggregate`, `colormap`, `transform`, `render`,
//! `tooltip`, `interaction`) has no dependency on a running egui context.

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use web_sys::HtmlCanvasElement;

pub mod aggregate;
pub mod analysis;
#[cfg(target_arch = "wasm32")]
mod app;
pub mod colormap;
pub mod config;
pub mod interaction;
pub mod matrix;
pub mod render;
pub mod resize;
pub mod surface;
pub mod tooltip;
pub mod transform;
pub mod widget;

#[cfg(target_arch = "wasm32")]
use app::HeatmapApp;
#[cfg(target_arch = "wasm32")]
use widget::HeatmapWidget;

/// Callbacks that can be registered from JavaScript
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
pub struct HeatmapCallbacks {
    /// Called when the zoom window changes (zoom, reset, new matrix)
    pub on_zoom_change: Option<js_sys::Function>,
    /// Called when the value under the pointer changes or the tooltip hides
    pub on_hover: Option<js_sys::Function>,
}

/// Callbacks that can be registered from JavaScript
#[cfg(not(target_arch = "wasm32"))]
#[derive(Default)]
pub struct HeatmapCallbacks {}

/// A handle to a heatmap instance. Each handle manages its own canvas and state.
///
/// This struct is exposed to JavaScript and provides methods to control the heatmap.
/// It holds an Rc to the widget so it can call methods on it, and also stores
/// the eframe runner for the application lifecycle.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub struct HeatmapHandle {
    /// The widget instance (shared with HeatmapApp)
    widget: Rc<RefCell<HeatmapWidget>>,
    /// Callbacks registered from JavaScript
    callbacks: Rc<RefCell<HeatmapCallbacks>>,
    /// The eframe runner (kept alive to maintain the render loop)
    runner: eframe::WebRunner,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl HeatmapHandle {
    /// Create a new heatmap attached to the given canvas element.
    /// Returns a promise that resolves to a HeatmapHandle when initialization completes.
    ///
    /// Use this static factory method instead of a constructor since async constructors
    /// are deprecated in wasm-bindgen.
    #[wasm_bindgen]
    pub async fn create(canvas: HtmlCanvasElement) -> Result<HeatmapHandle, JsValue> {
        // Initialize logging for debug builds
        #[cfg(debug_assertions)]
        {
            eframe::WebLogger::init(log::LevelFilter::Debug).ok();
        }
        #[cfg(not(debug_assertions))]
        {
            eframe::WebLogger::init(log::LevelFilter::Warn).ok();
        }

        // Create the widget that will be shared between the handle and the app
        let widget = Rc::new(RefCell::new(HeatmapWidget::new()));
        let widget_for_app = widget.clone();

        // Create callbacks container
        let callbacks = Rc::new(RefCell::new(HeatmapCallbacks::default()));
        let callbacks_for_app = callbacks.clone();

        let web_options = eframe::WebOptions::default();
        let runner = eframe::WebRunner::new();

        runner
            .start(
                canvas,
                web_options,
                Box::new(move |cc| Ok(Box::new(HeatmapApp::new(cc, widget_for_app.clone(), callbacks_for_app.clone())))),
            )
            .await?;

        Ok(HeatmapHandle { widget, callbacks, runner })
    }

    /// Set the matrix to display.
    ///
    /// # Arguments
    /// * `values` - Row-major matrix values; NaN marks a missing sample
    /// * `rows` - Number of rows
    /// * `cols` - Number of columns
    ///
    /// Zoom is reset to the full view. Axis labels are kept.
    #[wasm_bindgen(js_name = setMatrix)]
    pub fn set_matrix(&self, values: &js_sys::Float64Array, rows: u32, cols: u32) -> Result<(), JsValue> {
        let matrix = matrix::Matrix::from_row_major(values.to_vec(), rows as usize, cols as usize)
            .map_err(to_js_error)?;

        let mut widget = self.widget.borrow_mut();
        let labels = widget.labels().clone();
        widget.set_matrix(matrix, labels);
        Ok(())
    }

    /// Set the matrix from a JSON array of rows, with `null` for missing samples
    #[wasm_bindgen(js_name = setMatrixJson)]
    pub fn set_matrix_json(&self, json: &str) -> Result<(), JsValue> {
        let matrix: matrix::Matrix = serde_json::from_str(json).map_err(to_js_error)?;

        let mut widget = self.widget.borrow_mut();
        let labels = widget.labels().clone();
        widget.set_matrix(matrix, labels);
        Ok(())
    }

    /// Show an analysis payload as returned by the data API.
    ///
    /// Matrix analyses (`dist-perres-mean`, `dist-perres-stdv`, `rmsd-pairwise`,
    /// `rmsd-pairwise-interface`) become a heatmap with matching labels; every
    /// other known analysis shows a not-yet-available placeholder.
    #[wasm_bindgen(js_name = setAnalysis)]
    pub fn set_analysis(&self, tag: &str, json: &str) -> Result<(), JsValue> {
        let kind: analysis::AnalysisKind = tag.parse().map_err(to_js_error)?;
        self.widget
            .borrow_mut()
            .set_analysis(kind, json)
            .map_err(to_js_error)
    }

    /// Set the axis name and value unit used in tooltips and the zoom label
    #[wasm_bindgen(js_name = setLabels)]
    pub fn set_labels(&self, axis: &str, unit: Option<String>) {
        let labels = matrix::MatrixLabels::new(axis, unit.as_deref());
        self.widget.borrow_mut().set_labels(labels);
    }

    /// Replace the display options from a JSON object; omitted keys take defaults.
    /// Out-of-range values are rejected and the current options kept.
    #[wasm_bindgen(js_name = setOptions)]
    pub fn set_options(&self, json: &str) -> Result<(), JsValue> {
        let options = config::HeatmapOptions::from_json(json).map_err(to_js_error)?;
        self.widget.borrow_mut().set_options(options);
        Ok(())
    }

    /// Return to the full view
    #[wasm_bindgen(js_name = resetZoom)]
    pub fn reset_zoom(&self) {
        self.widget.borrow_mut().reset_zoom();
    }

    #[wasm_bindgen(js_name = isZoomed)]
    pub fn is_zoomed(&self) -> bool {
        self.widget.borrow().is_zoomed()
    }

    /// Get the zoom status text, e.g. "Zoomed: Residues 3-50 × 4-67"
    #[wasm_bindgen(js_name = getZoomLabel)]
    pub fn get_zoom_label(&self) -> String {
        self.widget.borrow().zoom_label()
    }

    /// Get the visible matrix window as [rowStart, rowEnd, colStart, colEnd]
    /// (zero-based, end-exclusive), or undefined when no matrix is loaded.
    #[wasm_bindgen(js_name = getWindow)]
    pub fn get_window(&self) -> Option<js_sys::Uint32Array> {
        let window = self.widget.borrow().active_window()?;
        let result = js_sys::Uint32Array::new_with_length(4);
        result.copy_from(&[
            window.row_start as u32,
            window.row_end as u32,
            window.col_start as u32,
            window.col_end as u32,
        ]);
        Some(result)
    }

    /// End event loop and release resources
    #[wasm_bindgen(js_name = destroy)]
    pub fn destroy(&self) {
        self.runner.destroy();
    }

    // =========================================================================
    // Callback registration
    // =========================================================================

    /// Register a callback to be called when the zoom window changes.
    /// The callback receives:
    /// { zoomed, label, window: { rowStart, rowEnd, colStart, colEnd } | null }
    #[wasm_bindgen(js_name = onZoomChange)]
    pub fn on_zoom_change(&self, callback: js_sys::Function) {
        self.callbacks.borrow_mut().on_zoom_change = Some(callback);
    }

    /// Register a callback to be called when the hovered value changes.
    /// The callback receives { row, col, value, text } (zero-based indices),
    /// or null when the tooltip hides.
    #[wasm_bindgen(js_name = onHover)]
    pub fn on_hover(&self, callback: js_sys::Function) {
        self.callbacks.borrow_mut().on_hover = Some(callback);
    }

    /// Clear all registered callbacks.
    #[wasm_bindgen(js_name = clearCallbacks)]
    pub fn clear_callbacks(&self) {
        let mut callbacks = self.callbacks.borrow_mut();
        callbacks.on_zoom_change = None;
        callbacks.on_hover = None;
    }
}

#[cfg(target_arch = "wasm32")]
fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
