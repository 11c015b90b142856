//! Selection model: a primary widget plus an ordered multi-selection set.
//!
//! The primary is the subject of single-target panels. A multi-selection of
//! more than one member takes precedence for the overlay bounding box.
//! Members keep insertion order so primary promotion is deterministic.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use crate::doc::{WidgetId, WidgetStore};
use crate::surface::Rect;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    primary: Option<WidgetId>,
    members: Vec<WidgetId>,
    /// Set when the surface background itself was clicked, for hosts that
    /// show surface-level properties.
    surface_selected: bool,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn primary(&self) -> Option<WidgetId> {
        self.primary
    }

    #[must_use]
    pub fn members(&self) -> &[WidgetId] {
        &self.members
    }

    #[must_use]
    pub fn contains(&self, id: &WidgetId) -> bool {
        self.members.contains(id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.members.is_empty()
    }

    /// Whether more than one widget is selected.
    #[must_use]
    pub fn is_multi(&self) -> bool {
        self.members.len() > 1
    }

    #[must_use]
    pub fn surface_selected(&self) -> bool {
        self.surface_selected
    }

    /// Make `id` the primary and the only member.
    pub fn select_single(&mut self, id: WidgetId) {
        self.primary = Some(id);
        self.members = vec![id];
        self.surface_selected = false;
    }

    /// Replace the selection with `ids`; the first becomes primary.
    pub fn select_many(&mut self, ids: &[WidgetId]) {
        self.members.clear();
        for id in ids {
            if !self.members.contains(id) {
                self.members.push(*id);
            }
        }
        self.primary = self.members.first().copied();
        self.surface_selected = false;
    }

    /// Add `id` to the multi-selection, or remove it if already present.
    ///
    /// Removing the primary promotes the earliest remaining member; an empty
    /// set clears the primary. Adding to an empty selection makes `id` primary.
    pub fn toggle(&mut self, id: WidgetId) {
        self.surface_selected = false;
        if let Some(pos) = self.members.iter().position(|m| *m == id) {
            self.members.remove(pos);
            if self.primary == Some(id) {
                self.primary = self.members.first().copied();
            }
        } else {
            self.members.push(id);
            if self.primary.is_none() {
                self.primary = Some(id);
            }
        }
    }

    /// Drop `id` wherever it appears, with the same promotion rule as [`toggle`](Self::toggle).
    ///
    /// Returns `true` if anything changed.
    pub fn remove(&mut self, id: &WidgetId) -> bool {
        if !self.members.contains(id) && self.primary.as_ref() != Some(id) {
            return false;
        }
        self.members.retain(|m| m != id);
        if self.primary.as_ref() == Some(id) {
            self.primary = self.members.first().copied();
        }
        true
    }

    /// Drop every id the store no longer holds.
    pub fn retain_existing(&mut self, store: &WidgetStore) -> bool {
        let before = self.members.len();
        self.members.retain(|m| store.contains(m));
        let mut changed = before != self.members.len();
        if let Some(p) = self.primary
            && !store.contains(&p)
        {
            self.primary = self.members.first().copied();
            changed = true;
        }
        changed
    }

    pub fn clear(&mut self) {
        self.primary = None;
        self.members.clear();
        self.surface_selected = false;
    }

    /// Clear the widget selection and mark the surface itself as selected.
    pub fn select_surface(&mut self) {
        self.clear();
        self.surface_selected = true;
    }

    /// The widgets the overlay and bulk commands act on: the multi-selection
    /// when it has members, otherwise the primary.
    #[must_use]
    pub fn targets(&self) -> Vec<WidgetId> {
        if self.members.is_empty() {
            self.primary.into_iter().collect()
        } else {
            self.members.clone()
        }
    }

    /// Bounding rectangle of the selection.
    ///
    /// A multi-selection yields the union of every member still in the store;
    /// otherwise the primary's own rectangle. `None` when nothing resolves.
    #[must_use]
    pub fn bounds(&self, store: &WidgetStore) -> Option<Rect> {
        if self.is_multi() {
            return union_of(store, &self.members);
        }
        self.primary.and_then(|id| store.get(&id)).map(crate::doc::PlacedWidget::rect)
    }
}

/// Union rectangle over `ids`, skipping ids missing from the store.
#[must_use]
pub fn union_of(store: &WidgetStore, ids: &[WidgetId]) -> Option<Rect> {
    ids.iter()
        .filter_map(|id| store.get(id))
        .map(crate::doc::PlacedWidget::rect)
        .reduce(|acc, r| acc.union(&r))
}
