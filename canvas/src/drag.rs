//! Drag controller: pointer samples → widget positions.
//!
//! The press offset inside the widget is captured at pointer-down so the
//! widget does not jump to put its corner under the pointer. Every sample
//! snaps (grid mode) and then clamps; the final resting position goes through
//! [`Surface::settle`] so clamping can never leave it off-grid.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use crate::doc::{WidgetId, WidgetStore};
use crate::input::InputState;
use crate::surface::{Point, Rect, Surface};

/// Start dragging `id` from surface-local point `local`.
///
/// Returns `None` (no state transition) for a missing, hidden, or locked widget.
#[must_use]
pub fn begin(store: &WidgetStore, id: WidgetId, local: Point) -> Option<InputState> {
    let widget = store.get(&id)?;
    if widget.is_locked() || widget.is_hidden() {
        tracing::debug!(%id, "drag refused");
        return None;
    }
    let origin = widget.rect();
    let grab = Point::new(local.x - origin.x, local.y - origin.y);
    Some(InputState::Dragging { id, grab, origin })
}

/// Candidate geometry for a pointer sample at surface-local `local`.
///
/// `size` is the widget's current rect; only its extent is used.
#[must_use]
pub fn candidate(size: Rect, grab: Point, local: Point, surface: &Surface) -> Rect {
    let x = surface.snap(local.x - grab.x);
    let y = surface.snap(local.y - grab.y);
    let pos = surface.clamp_position(x, y, size.width, size.height);
    Rect::new(pos.x, pos.y, size.width, size.height)
}

/// Resting geometry at pointer-up: grid-aligned and fully on the surface.
#[must_use]
pub fn settle(rect: Rect, surface: &Surface) -> Rect {
    let pos = surface.settle(rect.x, rect.y, rect.width, rect.height);
    Rect::new(pos.x, pos.y, rect.width, rect.height)
}
