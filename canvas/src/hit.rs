//! Hit-testing: surface point → widget body or resize handle.
//!
//! Handles of the handle-bearing widget (a single, unlocked selection) are
//! checked first so a handle overhanging a neighbour still wins. Bodies are
//! then tested top-down through the visible stack of the active page; hidden
//! widgets and other pages never hit.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{EDGE_GRIP, HANDLE_RADIUS};
use crate::doc::{WidgetId, WidgetStore};
use crate::surface::{Point, Rect};

/// Which part of a widget was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
}

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

/// How a handle moves one axis of the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisEdge {
    /// The axis is not affected.
    Fixed,
    /// The leading edge (left / top) moves; position and extent both change.
    Start,
    /// The trailing edge (right / bottom) moves; only the extent changes.
    End,
}

impl ResizeAnchor {
    pub const ALL: [ResizeAnchor; 8] = [
        ResizeAnchor::N,
        ResizeAnchor::Ne,
        ResizeAnchor::E,
        ResizeAnchor::Se,
        ResizeAnchor::S,
        ResizeAnchor::Sw,
        ResizeAnchor::W,
        ResizeAnchor::Nw,
    ];

    /// Effect on the x axis.
    #[must_use]
    pub fn horizontal(self) -> AxisEdge {
        match self {
            Self::W | Self::Nw | Self::Sw => AxisEdge::Start,
            Self::E | Self::Ne | Self::Se => AxisEdge::End,
            Self::N | Self::S => AxisEdge::Fixed,
        }
    }

    /// Effect on the y axis.
    #[must_use]
    pub fn vertical(self) -> AxisEdge {
        match self {
            Self::N | Self::Ne | Self::Nw => AxisEdge::Start,
            Self::S | Self::Se | Self::Sw => AxisEdge::End,
            Self::E | Self::W => AxisEdge::Fixed,
        }
    }

    #[must_use]
    pub fn is_corner(self) -> bool {
        matches!(self, Self::Ne | Self::Se | Self::Sw | Self::Nw)
    }

    /// Centre of this handle on `rect`'s border.
    #[must_use]
    pub fn position(self, rect: Rect) -> Point {
        let cx = rect.x + rect.width / 2.0;
        let cy = rect.y + rect.height / 2.0;
        let x = match self.horizontal() {
            AxisEdge::Start => rect.x,
            AxisEdge::End => rect.right(),
            AxisEdge::Fixed => cx,
        };
        let y = match self.vertical() {
            AxisEdge::Start => rect.y,
            AxisEdge::End => rect.bottom(),
            AxisEdge::Fixed => cy,
        };
        Point::new(x, y)
    }

    /// CSS cursor shown while hovering or dragging this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::N | Self::S => "ns-resize",
            Self::E | Self::W => "ew-resize",
            Self::Ne | Self::Sw => "nesw-resize",
            Self::Nw | Self::Se => "nwse-resize",
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub widget_id: WidgetId,
    pub part: HitPart,
}

/// Find the widget (and part) under a surface-local point on `page`.
///
/// `handles_for` names the widget whose resize handles are live, if any.
#[must_use]
pub fn hit_test(pt: Point, store: &WidgetStore, page: &str, handles_for: Option<WidgetId>) -> Option<Hit> {
    if let Some(id) = handles_for
        && let Some(w) = store.get(&id)
        && w.page_id == page
        && !w.is_hidden()
        && !w.is_locked()
        && let Some(anchor) = handle_at(w.rect(), pt)
    {
        return Some(Hit { widget_id: id, part: HitPart::ResizeHandle(anchor) });
    }

    store
        .visible_stack(page)
        .iter()
        .rev()
        .find(|w| w.rect().contains(pt))
        .map(|w| Hit { widget_id: w.id, part: HitPart::Body })
}

/// Which handle of `rect`, if any, lies under `pt`.
///
/// Corner knobs are tested first; otherwise a point within [`EDGE_GRIP`] of
/// a border (and between its ends) grabs that edge.
#[must_use]
pub fn handle_at(rect: Rect, pt: Point) -> Option<ResizeAnchor> {
    let corner = [ResizeAnchor::Nw, ResizeAnchor::Ne, ResizeAnchor::Se, ResizeAnchor::Sw]
        .into_iter()
        .find(|a| handle_rect(*a, rect).contains(pt));
    if corner.is_some() {
        return corner;
    }

    let along_x = pt.x >= rect.x && pt.x <= rect.right();
    let along_y = pt.y >= rect.y && pt.y <= rect.bottom();
    if along_x && (pt.y - rect.y).abs() <= EDGE_GRIP {
        Some(ResizeAnchor::N)
    } else if along_x && (pt.y - rect.bottom()).abs() <= EDGE_GRIP {
        Some(ResizeAnchor::S)
    } else if along_y && (pt.x - rect.x).abs() <= EDGE_GRIP {
        Some(ResizeAnchor::W)
    } else if along_y && (pt.x - rect.right()).abs() <= EDGE_GRIP {
        Some(ResizeAnchor::E)
    } else {
        None
    }
}

/// Square knob drawn (and hit) for a handle.
#[must_use]
pub fn handle_rect(anchor: ResizeAnchor, rect: Rect) -> Rect {
    let c = anchor.position(rect);
    Rect::new(c.x - HANDLE_RADIUS, c.y - HANDLE_RADIUS, HANDLE_RADIUS * 2.0, HANDLE_RADIUS * 2.0)
}
