//! Grouping subsystem.
//!
//! A group is an id plus a display name. Membership lives on the widgets
//! themselves (`groupId` / `groupName` properties) and is always derived by
//! scanning the store, so it can never drift from widget state. The registry
//! only remembers which groups exist (including empty ones) and their names.

#[cfg(test)]
#[path = "group_test.rs"]
mod group_test;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::doc::{GroupId, KEY_GROUP_ID, KEY_GROUP_NAME, PartialWidget, WidgetId, WidgetStore};
use crate::selection::union_of;
use crate::surface::Surface;

/// Property updates written by one grouping operation.
pub type GroupChanges = Vec<(WidgetId, PartialWidget)>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    groups: Vec<Group>,
    /// Counter behind default "Group N" names.
    created: usize,
}

impl GroupRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the registry from the memberships recorded on widgets.
    ///
    /// Used after loading a snapshot; the first `groupName` seen for a group
    /// id wins.
    #[must_use]
    pub fn from_store(store: &WidgetStore) -> Self {
        let mut registry = Self::new();
        for widget in store.widgets() {
            if let Some(id) = widget.properties.group_id
                && registry.get(&id).is_none()
            {
                let name = widget.properties.group_name.clone().unwrap_or_default();
                registry.groups.push(Group { id, name });
            }
        }
        registry.created = registry.groups.len();
        registry
    }

    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[must_use]
    pub fn get(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == *id)
    }

    /// Register a new, empty group.
    pub fn create(&mut self, name: impl Into<String>) -> GroupId {
        let id = Uuid::new_v4();
        self.created += 1;
        let name = name.into();
        tracing::debug!(%id, %name, "group created");
        self.groups.push(Group { id, name });
        id
    }

    /// A fresh default name: `Group 1`, `Group 2`, ...
    #[must_use]
    pub fn next_name(&self) -> String {
        format!("Group {}", self.created + 1)
    }

    /// Rename a group and propagate the name to every current member.
    pub fn rename(&mut self, store: &mut WidgetStore, id: &GroupId, name: impl Into<String>) -> GroupChanges {
        let Some(group) = self.groups.iter_mut().find(|g| g.id == *id) else {
            return Vec::new();
        };
        group.name = name.into();
        let patch = json!({ KEY_GROUP_NAME: group.name });
        apply_all(store, &members(store, id), &patch)
    }

    /// Forget a group and strip membership from its members; geometry is untouched.
    pub fn delete(&mut self, store: &mut WidgetStore, id: &GroupId) -> GroupChanges {
        let Some(pos) = self.groups.iter().position(|g| g.id == *id) else {
            return Vec::new();
        };
        self.groups.remove(pos);
        apply_all(store, &members(store, id), &strip_patch())
    }

    /// Put `widget` into group `id`, replacing any previous membership.
    pub fn add_member(
        &self,
        store: &mut WidgetStore,
        id: &GroupId,
        widget: &WidgetId,
    ) -> Option<(WidgetId, PartialWidget)> {
        let group = self.get(id)?;
        let partial = PartialWidget::props(json!({ KEY_GROUP_ID: group.id, KEY_GROUP_NAME: group.name }));
        store.update(widget, &partial).then_some((*widget, partial))
    }

    /// Take `widget` out of whatever group it belongs to.
    pub fn remove_member(store: &mut WidgetStore, widget: &WidgetId) -> Option<(WidgetId, PartialWidget)> {
        if store.get(widget)?.properties.group_id.is_none() {
            return None;
        }
        let partial = PartialWidget::props(strip_patch());
        store.update(widget, &partial).then_some((*widget, partial))
    }
}

/// Widgets whose `groupId` is `id`, in store order.
#[must_use]
pub fn members(store: &WidgetStore, id: &GroupId) -> Vec<WidgetId> {
    store.widgets().iter().filter(|w| w.properties.group_id == Some(*id)).map(|w| w.id).collect()
}

/// Move every unlocked member of a group by `(dx, dy)`.
///
/// The delta is snapped in grid mode and then shrunk so the members' union
/// box stays on the surface, which keeps relative layout intact.
pub fn translate_group(store: &mut WidgetStore, id: &GroupId, dx: f64, dy: f64, surface: &Surface) -> GroupChanges {
    let movable: Vec<WidgetId> = members(store, id)
        .into_iter()
        .filter(|m| store.get(m).is_some_and(|w| !w.is_locked()))
        .collect();
    let Some(bounds) = union_of(store, &movable) else {
        return Vec::new();
    };
    let dx = clamp_delta(surface.snap(dx), bounds.x, bounds.right(), surface.width);
    let dy = clamp_delta(surface.snap(dy), bounds.y, bounds.bottom(), surface.height);
    if dx == 0.0 && dy == 0.0 {
        return Vec::new();
    }
    movable
        .into_iter()
        .filter_map(|m| {
            let w = store.get(&m)?;
            let partial = PartialWidget::position(w.x + dx, w.y + dy);
            store.update(&m, &partial).then_some((m, partial))
        })
        .collect()
}

fn clamp_delta(delta: f64, start: f64, end: f64, limit: f64) -> f64 {
    let lo = -start;
    let hi = limit - end;
    if lo > hi { lo } else { delta.clamp(lo, hi) }
}

fn strip_patch() -> Value {
    json!({ KEY_GROUP_ID: null, KEY_GROUP_NAME: null })
}

fn apply_all(store: &mut WidgetStore, ids: &[WidgetId], patch: &Value) -> GroupChanges {
    ids.iter()
        .filter_map(|id| {
            let partial = PartialWidget::props(patch.clone());
            store.update(id, &partial).then_some((*id, partial))
        })
        .collect()
}
