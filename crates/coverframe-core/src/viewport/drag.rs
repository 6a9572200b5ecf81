use crate::geometry::{Offset, Point};

/// Pointer drag over the crop box.
///
/// `Idle -> Dragging` on pointer-down, `Dragging -> Dragging` on move,
/// `Dragging -> Idle` on pointer-up.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        /// Pointer position at pointer-down.
        start: Point,
        /// Viewport offset at pointer-down.
        snapshot: Offset,
    },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    /// Start (or restart) a drag from `pointer`.
    pub fn pointer_down(&mut self, pointer: Point, current_offset: Offset) {
        *self = Self::Dragging {
            start: pointer,
            snapshot: current_offset,
        };
    }

    /// Unclamped offset candidate for the current pointer, `None` when idle.
    pub fn pointer_move(&self, pointer: Point) -> Option<Offset> {
        match *self {
            Self::Idle => None,
            Self::Dragging { start, snapshot } => Some(snapshot + (pointer - start)),
        }
    }

    pub fn pointer_up(&mut self) {
        *self = Self::Idle;
    }
}
