//! eframe application shell that hosts a single HeatmapWidget

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsValue;

use crate::widget::HeatmapWidget;
use crate::HeatmapCallbacks;

/// The egui application for one heatmap instance
pub struct HeatmapApp {
    widget: Rc<RefCell<HeatmapWidget>>,
    callbacks: Rc<RefCell<HeatmapCallbacks>>,
}

impl HeatmapApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        widget: Rc<RefCell<HeatmapWidget>>,
        callbacks: Rc<RefCell<HeatmapCallbacks>>,
    ) -> Self {
        Self { widget, callbacks }
    }

    /// Notify JavaScript about zoom and hover changes made during this frame
    fn fire_callbacks(&self) {
        let mut widget = self.widget.borrow_mut();
        let zoom_changed = widget.take_zoom_changed();
        let tooltip_changed = widget.take_tooltip_changed();
        if !zoom_changed && !tooltip_changed {
            return;
        }

        let callbacks = self.callbacks.borrow();
        if zoom_changed {
            if let Some(callback) = &callbacks.on_zoom_change {
                call(callback, &zoom_payload(&widget));
            }
        }
        if tooltip_changed {
            if let Some(callback) = &callbacks.on_hover {
                call(callback, &hover_payload(&widget));
            }
        }
    }
}

impl eframe::App for HeatmapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let size = ui.available_size();
                self.widget.borrow_mut().show(ui, size);
            });

        self.fire_callbacks();
    }
}

fn call(callback: &js_sys::Function, payload: &JsValue) {
    if let Err(err) = callback.call1(&JsValue::NULL, payload) {
        log::warn!("Heatmap callback failed: {:?}", err);
    }
}

fn set(target: &js_sys::Object, key: &str, value: JsValue) {
    // Setting a property on a plain object cannot fail
    let _ = js_sys::Reflect::set(target, &JsValue::from_str(key), &value);
}

/// `{ zoomed, label, window: { rowStart, rowEnd, colStart, colEnd } | null }`
fn zoom_payload(widget: &HeatmapWidget) -> JsValue {
    let payload = js_sys::Object::new();
    set(&payload, "zoomed", JsValue::from_bool(widget.is_zoomed()));
    set(&payload, "label", JsValue::from_str(&widget.zoom_label()));

    let window = match widget.active_window() {
        Some(w) => {
            let bounds = js_sys::Object::new();
            set(&bounds, "rowStart", JsValue::from(w.row_start as u32));
            set(&bounds, "rowEnd", JsValue::from(w.row_end as u32));
            set(&bounds, "colStart", JsValue::from(w.col_start as u32));
            set(&bounds, "colEnd", JsValue::from(w.col_end as u32));
            bounds.into()
        }
        None => JsValue::NULL,
    };
    set(&payload, "window", window);
    payload.into()
}

/// `{ row, col, value, text }` with zero-based indices, or `null` when hidden
fn hover_payload(widget: &HeatmapWidget) -> JsValue {
    let (Some(tip), Some(text)) = (widget.tooltip(), widget.tooltip_text()) else {
        return JsValue::NULL;
    };
    let payload = js_sys::Object::new();
    set(&payload, "row", JsValue::from(tip.row as u32));
    set(&payload, "col", JsValue::from(tip.col as u32));
    set(&payload, "value", JsValue::from_f64(tip.value));
    set(&payload, "text", JsValue::from_str(&text));
    payload.into()
}
