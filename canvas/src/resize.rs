//! Resize controller: eight-handle geometry with anchoring, minimum size,
//! grid rounding and bounds trimming.
//!
//! Each pointer sample recomputes the rectangle from the gesture-start
//! geometry plus the total pointer delta, so intermediate samples never
//! accumulate rounding error. Axes are independent: a handle either leaves an
//! axis alone, moves its leading edge (position and extent change), or moves
//! its trailing edge (only extent changes).

#[cfg(test)]
#[path = "resize_test.rs"]
mod resize_test;

use crate::consts::{CORNER_REDIRECT_ZONE, MIN_WIDGET_SIZE};
use crate::doc::{WidgetId, WidgetStore};
use crate::hit::{AxisEdge, ResizeAnchor};
use crate::input::InputState;
use crate::surface::{Point, Rect, Surface, floor_to, settle_axis, snap_to};

/// Start a resize gesture on `id` from surface-local point `start`.
///
/// Edge handles pressed near either end of their edge become the adjacent
/// corner. Returns `None` for a missing, hidden, or locked widget.
#[must_use]
pub fn begin(store: &WidgetStore, id: WidgetId, anchor: ResizeAnchor, start: Point) -> Option<InputState> {
    let widget = store.get(&id)?;
    if widget.is_locked() || widget.is_hidden() {
        return None;
    }
    let origin = widget.rect();
    let anchor = redirect_to_corner(anchor, origin, start);
    tracing::debug!(%id, ?anchor, "resize begin");
    Some(InputState::Resizing { id, anchor, start, origin })
}

/// Promote an edge handle to a corner when `pt` lies within
/// [`CORNER_REDIRECT_ZONE`] of either end of that edge.
#[must_use]
pub fn redirect_to_corner(anchor: ResizeAnchor, rect: Rect, pt: Point) -> ResizeAnchor {
    let near = |a: f64, b: f64| (a - b).abs() <= CORNER_REDIRECT_ZONE;
    match anchor {
        ResizeAnchor::N | ResizeAnchor::S => {
            let north = anchor == ResizeAnchor::N;
            if near(pt.x, rect.x) {
                if north { ResizeAnchor::Nw } else { ResizeAnchor::Sw }
            } else if near(pt.x, rect.right()) {
                if north { ResizeAnchor::Ne } else { ResizeAnchor::Se }
            } else {
                anchor
            }
        }
        ResizeAnchor::E | ResizeAnchor::W => {
            let west = anchor == ResizeAnchor::W;
            if near(pt.y, rect.y) {
                if west { ResizeAnchor::Nw } else { ResizeAnchor::Ne }
            } else if near(pt.y, rect.bottom()) {
                if west { ResizeAnchor::Sw } else { ResizeAnchor::Se }
            } else {
                anchor
            }
        }
        corner => corner,
    }
}

/// Smallest extent a resize may produce on either axis.
///
/// In grid mode the floor is rounded up to a grid multiple so a minimal
/// widget is still grid-aligned.
#[must_use]
pub fn min_extent(surface: &Surface) -> f64 {
    match surface.grid() {
        Some(g) => (MIN_WIDGET_SIZE / g).ceil() * g,
        None => MIN_WIDGET_SIZE,
    }
}

/// Geometry for `origin` resized by `anchor` with the pointer having moved
/// from `start` to `current`.
#[must_use]
pub fn resize_rect(anchor: ResizeAnchor, origin: Rect, start: Point, current: Point, surface: &Surface) -> Rect {
    let min = min_extent(surface);
    let grid = surface.grid();
    let (x, width) = resize_axis(
        origin.x,
        origin.width,
        current.x - start.x,
        anchor.horizontal(),
        min,
        surface.width,
        grid,
    );
    let (y, height) = resize_axis(
        origin.y,
        origin.height,
        current.y - start.y,
        anchor.vertical(),
        min,
        surface.height,
        grid,
    );
    Rect::new(x, y, width, height)
}

/// Resolve one axis to `(position, extent)`.
///
/// In grid mode both edges land on grid lines, even for a widget placed
/// before the grid was switched on. The result never drops below `min`;
/// when the far edge leaves less than `min` of room, the fixed edge gives
/// way toward the origin instead.
fn resize_axis(pos: f64, len: f64, delta: f64, edge: AxisEdge, min: f64, limit: f64, grid: Option<f64>) -> (f64, f64) {
    let snap = |v: f64| grid.map_or(v, |g| snap_to(v, g));
    let floor = |v: f64| grid.map_or(v, |g| floor_to(v, g));
    let settle = |v: f64, extent: f64| match grid {
        Some(g) => settle_axis(v, extent, limit, g),
        None => v.min(limit - extent).max(0.0),
    };

    match edge {
        AxisEdge::Fixed => match grid {
            Some(g) => (settle_axis(pos, len, limit, g), len),
            None => (pos, len),
        },
        AxisEdge::End => {
            let start = settle(pos, min);
            let extent = (snap(pos + len + delta) - start).max(min);
            let room = floor(limit - start).max(min);
            (start, extent.min(room))
        }
        AxisEdge::Start => {
            let end = snap(pos + len).min(floor(limit)).max(min);
            let start = snap(pos + delta).min(end - min).max(0.0);
            (start, end - start)
        }
    }
}
