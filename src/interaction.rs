//! Drag-to-zoom state machine
//!
//! Pointer state is either idle or selecting; the zoom state is orthogonal to
//! it. Only a completed drag or an explicit reset changes the zoom, and both
//! are owned by one controller per heatmap instance.

use egui::{Pos2, Rect};

use crate::matrix::{Matrix, Window};
use crate::transform::GridGeometry;

/// Default minimum drag extent, in matrix cells of the active window
pub const DEFAULT_MIN_SELECTION_CELLS: f32 = 1.0;

/// Which part of the matrix is visible
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ZoomState {
    #[default]
    Full,
    Zoomed(Window),
}

impl ZoomState {
    pub fn is_zoomed(&self) -> bool {
        matches!(self, ZoomState::Zoomed(_))
    }

    /// The window to draw for `matrix`, `None` when there is nothing to draw
    pub fn active_window(&self, matrix: &Matrix) -> Option<Window> {
        match self {
            ZoomState::Zoomed(window) if matrix.contains_window(window) => Some(*window),
            _ => matrix.full_window(),
        }
    }
}

/// An in-progress drag between pointer-down and pointer-up, surface coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionDrag {
    pub anchor: Pos2,
    pub current: Pos2,
}

impl SelectionDrag {
    /// Normalized rectangle spanned by the drag
    pub fn rect(&self) -> Rect {
        Rect::from_two_pos(self.anchor, self.current)
    }
}

/// Pointer events in surface coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Pos2),
    Move(Pos2),
    Up,
    Leave,
}

/// What a pointer event changed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Nothing visible changed
    None,
    /// The live selection rectangle moved, appeared or disappeared
    SelectionChanged,
    /// A new zoom window was committed
    Zoomed(Window),
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum DragState {
    #[default]
    Idle,
    Selecting(SelectionDrag),
}

/// Owns the selection drag and the zoom state for one heatmap
#[derive(Clone, Debug)]
pub struct InteractionController {
    drag: DragState,
    zoom: ZoomState,
    min_selection_cells: f32,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SELECTION_CELLS)
    }
}

impl InteractionController {
    pub fn new(min_selection_cells: f32) -> Self {
        Self {
            drag: DragState::Idle,
            zoom: ZoomState::Full,
            min_selection_cells,
        }
    }

    pub fn set_min_selection_cells(&mut self, cells: f32) {
        self.min_selection_cells = cells;
    }

    pub fn zoom(&self) -> ZoomState {
        self.zoom
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self.drag, DragState::Selecting(_))
    }

    /// Current drag, if any
    pub fn selection(&self) -> Option<SelectionDrag> {
        match self.drag {
            DragState::Selecting(drag) => Some(drag),
            DragState::Idle => None,
        }
    }

    /// Feed one pointer event. `geometry` is the layout currently on screen and
    /// is only consulted when a drag completes.
    pub fn handle(&mut self, event: PointerEvent, geometry: Option<&GridGeometry>) -> Transition {
        match event {
            PointerEvent::Down(pos) => self.pointer_down(pos),
            PointerEvent::Move(pos) => self.pointer_move(pos),
            PointerEvent::Up => self.pointer_up(geometry),
            PointerEvent::Leave => self.pointer_leave(),
        }
    }

    pub fn pointer_down(&mut self, pos: Pos2) -> Transition {
        self.drag = DragState::Selecting(SelectionDrag {
            anchor: pos,
            current: pos,
        });
        Transition::SelectionChanged
    }

    pub fn pointer_move(&mut self, pos: Pos2) -> Transition {
        match &mut self.drag {
            DragState::Selecting(drag) if drag.current != pos => {
                drag.current = pos;
                Transition::SelectionChanged
            }
            _ => Transition::None,
        }
    }

    /// Finish a drag. Commits a zoom only when the drag spans more than the
    /// minimum number of cells on both axes; always returns to idle.
    pub fn pointer_up(&mut self, geometry: Option<&GridGeometry>) -> Transition {
        let DragState::Selecting(drag) = std::mem::take(&mut self.drag) else {
            return Transition::None;
        };

        let Some(geometry) = geometry else {
            return Transition::SelectionChanged;
        };

        let rect = drag.rect();
        let extent = geometry.extent_in_cells(rect);
        if extent.x <= self.min_selection_cells || extent.y <= self.min_selection_cells {
            log::trace!("Ignoring selection of {:.2} x {:.2} cells", extent.x, extent.y);
            return Transition::SelectionChanged;
        }

        match geometry.screen_rect_to_window(rect) {
            Some(window) => {
                log::debug!("Zooming from {} to {}", geometry.window(), window);
                self.zoom = ZoomState::Zoomed(window);
                Transition::Zoomed(window)
            }
            None => Transition::SelectionChanged,
        }
    }

    /// Pointer left the surface: an in-progress drag is discarded
    pub fn pointer_leave(&mut self) -> Transition {
        match std::mem::take(&mut self.drag) {
            DragState::Selecting(_) => Transition::SelectionChanged,
            DragState::Idle => Transition::None,
        }
    }

    /// Return to the full view. Returns whether the zoom changed.
    pub fn reset_zoom(&mut self) -> bool {
        let was_zoomed = self.zoom.is_zoomed();
        self.zoom = ZoomState::Full;
        was_zoomed
    }

    /// A new matrix replaces the old one: full view, no drag
    pub fn reset_for_new_matrix(&mut self) {
        self.drag = DragState::Idle;
        self.zoom = ZoomState::Full;
    }
}
