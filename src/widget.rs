//! HeatmapWidget - A self-contained egui widget for exploring a matrix as a heatmap
//!
//! This widget encapsulates the matrix, the interaction controller, the
//! resize debouncer and the raster the render pipeline paints into. Multiple
//! instances can be used side-by-side without sharing state.
//!
//! Pointer and resize handling is split from egui plumbing so the event flow
//! can be driven directly in tests.

use std::time::Duration;

use egui::{Color32, Key, PointerButton, Pos2, Rect, Response, TextureHandle, TextureOptions, Ui, Vec2};

use crate::analysis::{AnalysisError, AnalysisKind, AnalysisView};
use crate::config::HeatmapOptions;
use crate::interaction::{InteractionController, PointerEvent, Transition, ZoomState};
use crate::matrix::{Matrix, MatrixLabels, Window};
use crate::render::{self, RenderInput, RenderSummary};
use crate::resize::ResizeDebouncer;
use crate::surface::{RasterSurface, Surface};
use crate::tooltip::{self, Tooltip};
use crate::transform::GridGeometry;

/// Color of surface pixels not covered by any bin
const SURFACE_BACKGROUND: Color32 = Color32::TRANSPARENT;
/// Overlay margin from the widget edge
const OVERLAY_MARGIN: f32 = 10.0;
/// Tooltip placement relative to the pointer
const TOOLTIP_OFFSET: Vec2 = Vec2::new(10.0, -30.0);

/// Actions returned from the zoom overlay
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ZoomAction {
    None,
    Reset,
}

/// What the widget is currently showing
#[derive(Clone, Debug, Default)]
enum Content {
    #[default]
    Empty,
    Matrix(Matrix),
    /// An analysis without a heatmap view
    Unavailable(AnalysisKind),
}

/// A self-contained widget for viewing a 2D matrix as an interactive heatmap.
pub struct HeatmapWidget {
    // === Data ===
    content: Content,
    labels: MatrixLabels,
    options: HeatmapOptions,

    // === Interaction ===
    /// Owns the zoom state and the in-progress selection
    controller: InteractionController,
    /// Raw value under the pointer
    tooltip: Option<Tooltip>,
    /// Whether the pointer was over the surface last frame
    pointer_inside: bool,

    // === Rendering state ===
    resize: ResizeDebouncer,
    /// Raster sized to the last settled container size, in physical pixels
    surface: Option<RasterSurface>,
    /// Physical pixels per egui point
    pixels_per_point: f32,
    summary: Option<RenderSummary>,
    /// Set by every redraw trigger, cleared by `redraw`
    needs_redraw: bool,
    texture: Option<TextureHandle>,

    // === Change notifications for the host ===
    zoom_changed: bool,
    tooltip_changed: bool,
    /// Context of the last frame, for repaints requested from outside egui
    ctx: Option<egui::Context>,
}

impl Default for HeatmapWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl HeatmapWidget {
    /// Create a new empty widget
    pub fn new() -> Self {
        Self::with_options(HeatmapOptions::default())
    }

    pub fn with_options(options: HeatmapOptions) -> Self {
        Self {
            content: Content::Empty,
            labels: MatrixLabels::default(),
            controller: InteractionController::new(options.min_selection_cells),
            resize: ResizeDebouncer::new(options.resize_settle_secs),
            options,
            tooltip: None,
            pointer_inside: false,
            surface: None,
            pixels_per_point: 1.0,
            summary: None,
            needs_redraw: false,
            texture: None,
            zoom_changed: false,
            tooltip_changed: false,
            ctx: None,
        }
    }

    // =========================================================================
    // Public API (called from outside, e.g., from JS via HeatmapHandle)
    // =========================================================================

    pub fn options(&self) -> &HeatmapOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: HeatmapOptions) {
        self.controller.set_min_selection_cells(options.min_selection_cells);
        self.resize.set_settle_secs(options.resize_settle_secs);
        self.options = options;
        self.needs_redraw = true;
        self.request_repaint();
    }

    /// Replace the matrix. Zoom returns to the full view and any drag is dropped.
    pub fn set_matrix(&mut self, matrix: Matrix, labels: MatrixLabels) {
        log::debug!("Loaded {}x{} matrix", matrix.rows(), matrix.cols());
        self.content = Content::Matrix(matrix);
        self.labels = labels;
        self.reset_view_state();
    }

    /// Show the placeholder for an analysis that has no heatmap view
    pub fn show_unavailable(&mut self, kind: AnalysisKind) {
        self.content = Content::Unavailable(kind);
        self.reset_view_state();
    }

    /// Dispatch an analysis payload to the matching view
    pub fn set_analysis(&mut self, kind: AnalysisKind, json: &str) -> Result<(), AnalysisError> {
        match kind.view() {
            AnalysisView::Heatmap(_) => {
                let (matrix, labels) = crate::analysis::decode_matrix(kind, json)?;
                self.set_matrix(matrix, labels);
            }
            AnalysisView::NotYetImplemented => self.show_unavailable(kind),
        }
        Ok(())
    }

    pub fn set_labels(&mut self, labels: MatrixLabels) {
        self.labels = labels;
        self.tooltip_changed |= self.tooltip.is_some();
    }

    /// Drop the matrix and show nothing
    pub fn clear(&mut self) {
        self.content = Content::Empty;
        self.reset_view_state();
    }

    fn reset_view_state(&mut self) {
        self.controller.reset_for_new_matrix();
        self.set_tooltip(None);
        self.needs_redraw = true;
        self.zoom_changed = true;
        self.request_repaint();
    }

    fn request_repaint(&self) {
        if let Some(ctx) = &self.ctx {
            ctx.request_repaint();
        }
    }

    pub fn matrix(&self) -> Option<&Matrix> {
        match &self.content {
            Content::Matrix(matrix) => Some(matrix),
            _ => None,
        }
    }

    pub fn labels(&self) -> &MatrixLabels {
        &self.labels
    }

    pub fn zoom_state(&self) -> ZoomState {
        self.controller.zoom()
    }

    pub fn is_zoomed(&self) -> bool {
        self.controller.zoom().is_zoomed()
    }

    /// Return to the full view
    pub fn reset_zoom(&mut self) {
        if self.controller.reset_zoom() {
            self.needs_redraw = true;
            self.zoom_changed = true;
            self.request_repaint();
        }
    }

    /// Matrix window currently on screen
    pub fn active_window(&self) -> Option<Window> {
        self.matrix()
            .and_then(|matrix| self.controller.zoom().active_window(matrix))
    }

    /// Current window bounds, columns then rows (one-based, inclusive), or
    /// the full matrix size
    pub fn zoom_label(&self) -> String {
        let Some(matrix) = self.matrix() else {
            return "No data".to_string();
        };
        match self.controller.zoom() {
            ZoomState::Zoomed(w) if matrix.contains_window(&w) => format!(
                "Zoomed: {}s {}-{} × {}-{}",
                self.labels.axis,
                w.col_start + 1,
                w.col_end,
                w.row_start + 1,
                w.row_end
            ),
            _ => format!("Full view ({} × {})", matrix.rows(), matrix.cols()),
        }
    }

    pub fn tooltip(&self) -> Option<Tooltip> {
        self.tooltip
    }

    pub fn tooltip_text(&self) -> Option<String> {
        self.tooltip
            .map(|tip| tip.text(&self.labels, self.options.value_precision))
    }

    /// Check and clear the zoom-changed flag
    pub fn take_zoom_changed(&mut self) -> bool {
        std::mem::take(&mut self.zoom_changed)
    }

    /// Check and clear the tooltip-changed flag
    pub fn take_tooltip_changed(&mut self) -> bool {
        std::mem::take(&mut self.tooltip_changed)
    }

    /// Adopt a settled surface size; the next redraw paints at this resolution
    pub fn resize_surface(&mut self, size: [usize; 2]) {
        if self.surface.as_ref().map(RasterSurface::dimensions) == Some(size) {
            return;
        }
        self.surface = Some(RasterSurface::new(size[0], size[1], SURFACE_BACKGROUND));
        self.needs_redraw = true;
    }

    pub fn surface(&self) -> Option<&RasterSurface> {
        self.surface.as_ref()
    }

    /// Display scale; pixel lengths in the options are multiplied by it
    pub fn set_pixels_per_point(&mut self, pixels_per_point: f32) {
        if pixels_per_point > 0.0 && pixels_per_point != self.pixels_per_point {
            self.pixels_per_point = pixels_per_point;
            self.needs_redraw = true;
        }
    }

    /// Result of the last redraw
    pub fn summary(&self) -> Option<&RenderSummary> {
        self.summary.as_ref()
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Layout for the current matrix, zoom and surface size
    pub fn geometry(&self) -> Option<GridGeometry> {
        let matrix = self.matrix()?;
        let surface = self.surface.as_ref()?;
        render::resolve_geometry(matrix, self.controller.zoom(), surface.size())
    }

    /// Route a pointer event (surface coordinates) to the controller and the
    /// tooltip resolver.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Transition {
        let geometry = self.geometry();
        let transition = self.controller.handle(event, geometry.as_ref());

        match transition {
            Transition::None => {}
            Transition::SelectionChanged => self.needs_redraw = true,
            Transition::Zoomed(_) => {
                self.needs_redraw = true;
                self.zoom_changed = true;
            }
        }

        match event {
            PointerEvent::Move(pos) if !self.controller.is_selecting() => {
                let tip = match (self.matrix(), geometry) {
                    (Some(matrix), Some(geometry)) => tooltip::resolve(matrix, &geometry, pos),
                    _ => None,
                };
                self.set_tooltip(tip);
            }
            PointerEvent::Down(_) | PointerEvent::Leave => self.set_tooltip(None),
            _ => {}
        }

        transition
    }

    fn set_tooltip(&mut self, tooltip: Option<Tooltip>) {
        if self.tooltip != tooltip {
            self.tooltip = tooltip;
            self.tooltip_changed = true;
        }
    }

    /// Run the render pipeline into the surface
    pub fn redraw(&mut self) -> Option<&RenderSummary> {
        let surface = self.surface.as_mut()?;
        let matrix = match &self.content {
            Content::Matrix(matrix) => Some(matrix),
            _ => None,
        };
        let input = RenderInput {
            matrix,
            zoom: self.controller.zoom(),
            selection: self.controller.selection().map(|drag| drag.rect()),
        };

        let options = self.options.scaled(self.pixels_per_point);
        self.summary = Some(render::render(surface, input, &options));
        self.needs_redraw = false;
        self.summary.as_ref()
    }

    // =========================================================================
    // Main rendering
    // =========================================================================

    /// Show the widget, rendering into the given UI with a specified container size.
    ///
    /// The container size is debounced before the surface follows it, so a
    /// burst of resizes produces one redraw at the final size.
    pub fn show(&mut self, ui: &mut Ui, container_size: Vec2) -> Response {
        let ctx = ui.ctx().clone();
        if self.ctx.is_none() {
            self.ctx = Some(ctx.clone());
        }

        // Allocate space for the widget
        let (rect, response) = ui.allocate_exact_size(container_size, egui::Sense::click_and_drag());

        self.set_pixels_per_point(ctx.pixels_per_point());
        let now = ctx.input(|i| i.time);
        self.resize.observe(surface_pixels(rect.size(), self.pixels_per_point), now);
        if let Some(size) = self.resize.poll(now) {
            self.resize_surface(size);
        } else if let Some(wait) = self.resize.remaining(now) {
            if let Ok(wait) = Duration::try_from_secs_f64(wait) {
                ctx.request_repaint_after(wait);
            }
        }

        let message = match &self.content {
            Content::Empty => Some("No matrix loaded".to_string()),
            Content::Unavailable(kind) => Some(kind.placeholder_text()),
            Content::Matrix(_) => None,
        };
        if let Some(message) = message {
            let painter = ui.painter_at(rect);
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                message,
                egui::FontId::default(),
                ui.style().visuals.weak_text_color(),
            );
            return response;
        }

        if response.hovered() {
            self.handle_keyboard_input(&ctx);
        }
        self.handle_pointer_input(ui, &response, rect);

        if self.needs_redraw && self.redraw().is_some() {
            self.upload_texture(&ctx);
        }

        if let (Some(texture), Some(surface)) = (&self.texture, &self.surface) {
            let painter = ui.painter_at(rect);
            painter.image(
                texture.id(),
                Rect::from_min_size(rect.min, surface.size() / self.pixels_per_point),
                Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        let zoom_action = self.render_zoom_controls(&ctx, &response, rect);
        self.render_tooltip(&ctx, &response, rect);
        self.render_build_info(&ctx, &response, rect);

        match zoom_action {
            ZoomAction::None => {}
            ZoomAction::Reset => self.reset_zoom(),
        }

        response
    }

    /// Translate egui pointer state into controller events
    fn handle_pointer_input(&mut self, ui: &Ui, response: &Response, rect: Rect) {
        let ppp = self.pixels_per_point;
        let to_surface = |pos: Pos2| surface_pos(pos, rect.min, ppp);
        let latest = ui.input(|i| i.pointer.latest_pos());

        if response.drag_started_by(PointerButton::Primary) {
            if let Some(origin) = ui.input(|i| i.pointer.press_origin()) {
                self.handle_pointer(PointerEvent::Down(to_surface(origin)));
            }
        }

        let inside = latest.is_some_and(|pos| rect.contains(pos));
        if self.pointer_inside && !inside {
            self.handle_pointer(PointerEvent::Leave);
        }
        self.pointer_inside = inside;

        if let Some(pos) = latest.filter(|_| inside) {
            self.handle_pointer(PointerEvent::Move(to_surface(pos)));
        }

        if response.drag_stopped_by(PointerButton::Primary) {
            self.handle_pointer(PointerEvent::Up);
        }
    }

    /// Handle keyboard shortcuts for zoom
    fn handle_keyboard_input(&mut self, ctx: &egui::Context) {
        let reset = ctx.input(|i| i.key_pressed(Key::Num0) || i.key_pressed(Key::Escape));
        if reset {
            self.reset_zoom();
        }
    }

    fn upload_texture(&mut self, ctx: &egui::Context) {
        let Some(surface) = &self.surface else {
            return;
        };
        let image = surface.to_color_image();
        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::NEAREST),
            None => self.texture = Some(ctx.load_texture("heatmap", image, TextureOptions::NEAREST)),
        }
    }

    /// Render the zoom label and reset control at the top-left of the widget.
    /// Returns an action to be applied after rendering.
    fn render_zoom_controls(&self, ctx: &egui::Context, response: &Response, widget_rect: Rect) -> ZoomAction {
        let mut action = ZoomAction::None;
        let zoomed = self.is_zoomed();

        egui::Area::new(response.id.with("zoom_controls"))
            .fixed_pos(widget_rect.min + Vec2::splat(OVERLAY_MARGIN))
            .show(ctx, |ui| {
                let text_color = get_overlay_text_color(ui);
                overlay_frame(ui).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(self.zoom_label()).color(text_color));
                        if zoomed {
                            let reset_btn = egui::Button::new(
                                egui::RichText::new("Reset Zoom").color(text_color)
                            );
                            if ui.add(reset_btn).clicked() {
                                action = ZoomAction::Reset;
                            }
                        } else {
                            ui.label(
                                egui::RichText::new("Click and drag to select an area to zoom in")
                                    .color(text_color.gamma_multiply(0.6))
                                    .small(),
                            );
                        }
                    });
                });
            });

        action
    }

    /// Render the value under the pointer next to it
    fn render_tooltip(&self, ctx: &egui::Context, response: &Response, widget_rect: Rect) {
        let (Some(tip), Some(text)) = (self.tooltip, self.tooltip_text()) else {
            return;
        };

        egui::Area::new(response.id.with("tooltip"))
            .fixed_pos(widget_rect.min + tip.screen_pos.to_vec2() / self.pixels_per_point + TOOLTIP_OFFSET)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style())
                    .fill(get_overlay_bg(ui))
                    .show(ui, |ui| {
                        ui.style_mut().wrap_mode = Some(egui::TextWrapMode::Extend);
                        ui.label(egui::RichText::new(text).color(get_overlay_text_color(ui)));
                    });
            });
    }

    /// Render build info at bottom-left of widget
    fn render_build_info(&self, ctx: &egui::Context, response: &Response, widget_rect: Rect) {
        egui::Area::new(response.id.with("build_info"))
            .fixed_pos(egui::pos2(
                widget_rect.min.x + OVERLAY_MARGIN,
                widget_rect.max.y - OVERLAY_MARGIN - 20.0,
            ))
            .interactable(false)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(env!("BUILD_TIMESTAMP"))
                        .color(egui::Color32::from_white_alpha(80))
                        .small(),
                );
            });
    }
}

/// Whole physical-pixel surface size for a container size in points
fn surface_pixels(size: Vec2, pixels_per_point: f32) -> [usize; 2] {
    let size = size * pixels_per_point;
    [size.x.max(0.0).floor() as usize, size.y.max(0.0).floor() as usize]
}

/// Screen position in points to surface pixels relative to `origin`
fn surface_pos(pos: Pos2, origin: Pos2, pixels_per_point: f32) -> Pos2 {
    ((pos - origin) * pixels_per_point).to_pos2()
}

/// Get a translucent background color appropriate for light/dark mode
fn get_overlay_bg(ui: &Ui) -> Color32 {
    if ui.visuals().dark_mode {
        Color32::from_black_alpha(180)
    } else {
        Color32::from_white_alpha(220)
    }
}

/// Get text color appropriate for light/dark mode overlays
fn get_overlay_text_color(ui: &Ui) -> Color32 {
    if ui.visuals().dark_mode {
        Color32::WHITE
    } else {
        Color32::from_gray(30)
    }
}

/// Create a frame style for overlay controls that adapts to light/dark mode
fn overlay_frame(ui: &Ui) -> egui::Frame {
    egui::Frame::new()
        .fill(get_overlay_bg(ui))
        .corner_radius(4)
        .inner_margin(egui::Margin::symmetric(6, 4))
}
