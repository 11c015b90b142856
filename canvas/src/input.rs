//! Input model: modifier keys, mouse buttons, and the gesture state machine.
//!
//! `Modifiers` and `Button` capture the user's intent at the time of a pointer
//! event. `InputState` is the only transient state outside the widget store:
//! it is owned by the surface, shared by the drag and resize controllers, and
//! replaced wholesale (never patched field by field) when a gesture starts or
//! ends.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::doc::WidgetId;
use crate::hit::ResizeAnchor;
use crate::surface::{Point, Rect};

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Whether the platform command key (Ctrl or Cmd) is held.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }

    /// Whether this click should toggle multi-selection instead of replacing it.
    #[must_use]
    pub fn toggles_selection(self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    #[default]
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the host (e.g. `"Delete"`, `"d"`, `"ArrowLeft"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// The active pointer gesture.
///
/// Each active variant carries what the controller needs to recompute
/// geometry from scratch on every pointer sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A widget is being moved.
    Dragging {
        /// Id of the widget being dragged.
        id: WidgetId,
        /// Press position relative to the widget's top-left corner.
        grab: Point,
        /// Widget geometry at gesture start.
        origin: Rect,
    },
    /// A widget is being resized by one of its eight handles.
    Resizing {
        /// Id of the widget being resized.
        id: WidgetId,
        /// Which handle drives the gesture (after edge-to-corner redirect).
        anchor: ResizeAnchor,
        /// Surface-local pointer position at gesture start.
        start: Point,
        /// Widget geometry at gesture start.
        origin: Rect,
    },
}

impl InputState {
    /// Whether any gesture is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Id of the widget the active gesture manipulates.
    #[must_use]
    pub fn target(&self) -> Option<WidgetId> {
        match self {
            Self::Idle => None,
            Self::Dragging { id, .. } | Self::Resizing { id, .. } => Some(*id),
        }
    }
}
