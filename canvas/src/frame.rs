//! Frame-coalesced geometry updates.
//!
//! Pointer samples arrive faster than the host redraws. The queue holds at
//! most one pending geometry per gesture; a newer sample overwrites an older
//! one, and the host drains it once per animation frame.

#[cfg(test)]
#[path = "frame_test.rs"]
mod frame_test;

use crate::doc::WidgetId;
use crate::surface::Rect;

/// A geometry waiting for the next frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingUpdate {
    pub id: WidgetId,
    pub rect: Rect,
}

#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    pending: Option<PendingUpdate>,
}

impl FrameQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `rect` for `id`, replacing anything queued earlier.
    ///
    /// Returns `true` when the queue was empty, i.e. the host should request
    /// a new frame. A `false` return means a frame is already on its way.
    pub fn schedule(&mut self, id: WidgetId, rect: Rect) -> bool {
        self.pending.replace(PendingUpdate { id, rect }).is_none()
    }

    /// Drain the pending update.
    pub fn take(&mut self) -> Option<PendingUpdate> {
        self.pending.take()
    }

    /// Drop any pending update without applying it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
