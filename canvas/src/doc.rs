//! Document model: placed widgets, their property bag, and the widget store.
//!
//! This module defines what sits on a report page (`PlacedWidget`), a sparse
//! update type for incremental edits (`PartialWidget`), the property bag with
//! its handful of reserved keys (`WidgetProps`), and the ordered store that is
//! the single source of truth for geometry and stacking (`WidgetStore`).
//!
//! Every controller reads and writes the store directly. The engine is
//! single-threaded, so each mutation is a plain synchronous transform.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::catalog;
use crate::surface::Rect;

/// Unique identifier for a placed widget.
pub type WidgetId = Uuid;

/// Unique identifier for a widget group.
pub type GroupId = Uuid;

/// Identifier of the logical page a widget belongs to. Opaque to the engine.
pub type PageId = String;

/// Reserved property key: forbids drag, resize and deletion.
pub const KEY_LOCKED: &str = "locked";
/// Reserved property key: removes the widget from hit-testing and the visual stack.
pub const KEY_HIDDEN: &str = "hidden";
/// Reserved property key: integer stacking order within the page.
pub const KEY_Z_INDEX: &str = "zIndex";
/// Reserved property key: id of the group the widget belongs to.
pub const KEY_GROUP_ID: &str = "groupId";
/// Reserved property key: display name of the widget's group.
pub const KEY_GROUP_NAME: &str = "groupName";

/// Per-widget configuration.
///
/// The reserved keys consumed by the controllers are strongly typed; every
/// other key (style attributes, data bindings, type-specific settings) lives
/// in `extra` and round-trips untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetProps {
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub z_index: i64,
    #[serde(default, deserialize_with = "lenient_group_id", skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(v: &bool) -> bool {
    !*v
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(v: &i64) -> bool {
    *v == 0
}

/// A malformed `groupId` loads as ungrouped instead of failing the whole page.
fn lenient_group_id<'de, D: Deserializer<'de>>(de: D) -> Result<Option<GroupId>, D::Error> {
    Ok(Option::<Value>::deserialize(de)?.as_ref().and_then(parse_group_id))
}

fn parse_group_id(value: &Value) -> Option<GroupId> {
    match value {
        Value::Null => None,
        Value::String(s) => match Uuid::parse_str(s) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::debug!(group_id = %s, error = %e, "ignoring malformed group id");
                None
            }
        },
        other => {
            tracing::debug!(group_id = %other, "ignoring non-string group id");
            None
        }
    }
}

impl WidgetProps {
    /// Shallow-merge a JSON object into the bag.
    ///
    /// Keys absent from `patch` are preserved. A `null` value resets a
    /// reserved key to its default and deletes an open key. Reserved keys
    /// with a value of the wrong JSON type are ignored.
    pub fn merge(&mut self, patch: &Map<String, Value>) {
        for (key, value) in patch {
            match key.as_str() {
                KEY_LOCKED => match value {
                    Value::Bool(b) => self.locked = *b,
                    Value::Null => self.locked = false,
                    _ => {}
                },
                KEY_HIDDEN => match value {
                    Value::Bool(b) => self.hidden = *b,
                    Value::Null => self.hidden = false,
                    _ => {}
                },
                KEY_Z_INDEX => {
                    if value.is_null() {
                        self.z_index = 0;
                    } else if let Some(z) = value.as_i64() {
                        self.z_index = z;
                    }
                }
                KEY_GROUP_ID => {
                    if value.is_null() {
                        self.group_id = None;
                    } else if let Some(id) = parse_group_id(value) {
                        self.group_id = Some(id);
                    }
                }
                KEY_GROUP_NAME => match value {
                    Value::String(s) => self.group_name = Some(s.clone()),
                    Value::Null => self.group_name = None,
                    _ => {}
                },
                _ => {
                    if value.is_null() {
                        self.extra.remove(key);
                    } else {
                        self.extra.insert(key.clone(), value.clone());
                    }
                }
            }
        }
    }

    /// Read an open (non-reserved) key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// One widget instance on the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedWidget {
    /// Stable for the instance's lifetime.
    pub id: WidgetId,
    pub page_id: PageId,
    /// Catalog type tag; immutable after creation.
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f64,
    pub y: f64,
    /// Falls back to the catalog footprint when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default)]
    pub properties: WidgetProps,
}

impl PlacedWidget {
    /// Create a widget with a fresh id and no explicit size.
    #[must_use]
    pub fn new(page_id: impl Into<PageId>, kind: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            page_id: page_id.into(),
            kind: kind.into(),
            x,
            y,
            width: None,
            height: None,
            properties: WidgetProps::default(),
        }
    }

    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Effective `(width, height)`, using the type's footprint for missing values.
    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        match (self.width, self.height) {
            (Some(w), Some(h)) => (w, h),
            (w, h) => {
                let (fw, fh) = catalog::footprint(&self.kind);
                (w.unwrap_or(fw), h.unwrap_or(fh))
            }
        }
    }

    /// Bounding rectangle in surface-local units.
    #[must_use]
    pub fn rect(&self) -> Rect {
        let (w, h) = self.size();
        Rect::new(self.x, self.y, w, h)
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.properties.locked
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.properties.hidden
    }

    #[must_use]
    pub fn z_index(&self) -> i64 {
        self.properties.z_index
    }

    /// Copy this widget under a new id, shifted by `(offset, offset)`.
    #[must_use]
    pub fn duplicate(&self, offset: f64) -> Self {
        let mut copy = self.clone();
        copy.id = Uuid::new_v4();
        copy.x += offset;
        copy.y += offset;
        copy
    }
}

/// Sparse update for a widget. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialWidget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Property keys to merge or remove (null values delete keys).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
}

impl PartialWidget {
    /// Position-only update.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Default::default() }
    }

    /// Full geometry update.
    #[must_use]
    pub fn rect(r: Rect) -> Self {
        Self { x: Some(r.x), y: Some(r.y), width: Some(r.width), height: Some(r.height), properties: None }
    }

    /// Property-only update.
    #[must_use]
    pub fn props(properties: Value) -> Self {
        Self { properties: Some(properties), ..Default::default() }
    }

    /// Stacking-order update.
    #[must_use]
    pub fn z_index(z: i64) -> Self {
        Self::props(serde_json::json!({ KEY_Z_INDEX: z }))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.width.is_none() && self.height.is_none() && self.properties.is_none()
    }
}

/// Ordered collection of placed widgets across all pages.
///
/// Store order is creation order; it breaks ties between equal z values.
#[derive(Debug, Clone, Default)]
pub struct WidgetStore {
    widgets: Vec<PlacedWidget>,
}

impl WidgetStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { widgets: Vec::new() }
    }

    /// All widgets in store order.
    #[must_use]
    pub fn widgets(&self) -> &[PlacedWidget] {
        &self.widgets
    }

    #[must_use]
    pub fn get(&self, id: &WidgetId) -> Option<&PlacedWidget> {
        self.widgets.iter().find(|w| w.id == *id)
    }

    #[must_use]
    pub fn contains(&self, id: &WidgetId) -> bool {
        self.get(id).is_some()
    }

    /// Append a widget. A widget whose id is already present replaces the
    /// existing entry in place, so ids stay unique.
    pub fn add(&mut self, widget: PlacedWidget) {
        if let Some(existing) = self.widgets.iter_mut().find(|w| w.id == widget.id) {
            *existing = widget;
        } else {
            self.widgets.push(widget);
        }
    }

    /// Apply a partial update. Geometry fields replace; properties merge
    /// shallowly. Returns `false` if the widget doesn't exist or the
    /// properties patch is not a JSON object.
    pub fn update(&mut self, id: &WidgetId, partial: &PartialWidget) -> bool {
        let Some(widget) = self.widgets.iter_mut().find(|w| w.id == *id) else {
            return false;
        };
        if let Some(ref props) = partial.properties {
            let Some(patch) = props.as_object() else {
                return false;
            };
            widget.properties.merge(patch);
        }
        if let Some(x) = partial.x {
            widget.x = x;
        }
        if let Some(y) = partial.y {
            widget.y = y;
        }
        if let Some(w) = partial.width {
            widget.width = Some(w);
        }
        if let Some(h) = partial.height {
            widget.height = Some(h);
        }
        true
    }

    /// Remove a widget by id, returning it if it was present.
    pub fn remove(&mut self, id: &WidgetId) -> Option<PlacedWidget> {
        let pos = self.widgets.iter().position(|w| w.id == *id)?;
        Some(self.widgets.remove(pos))
    }

    /// Remove every listed widget, returning the ones that were present.
    pub fn remove_many(&mut self, ids: &[WidgetId]) -> Vec<PlacedWidget> {
        let mut removed = Vec::new();
        self.widgets.retain(|w| {
            if ids.contains(&w.id) {
                removed.push(w.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Replace all widgets with a full snapshot.
    pub fn load_snapshot(&mut self, widgets: Vec<PlacedWidget>) {
        self.widgets.clear();
        for widget in widgets {
            self.add(widget);
        }
    }

    /// Widgets on `page`, in store order.
    pub fn page<'a>(&'a self, page: &'a str) -> impl Iterator<Item = &'a PlacedWidget> + 'a {
        self.widgets.iter().filter(move |w| w.page_id == page)
    }

    /// Owned copy of a page's widgets for the host's save action.
    #[must_use]
    pub fn snapshot(&self, page: &str) -> Vec<PlacedWidget> {
        self.page(page).cloned().collect()
    }

    /// Widgets on `page` sorted by `(z_index, store order)`, bottom first.
    #[must_use]
    pub fn sorted_page(&self, page: &str) -> Vec<&PlacedWidget> {
        let mut widgets: Vec<&PlacedWidget> = self.widgets.iter().filter(|w| w.page_id == page).collect();
        // Stable sort keeps store order for equal z.
        widgets.sort_by_key(|w| w.z_index());
        widgets
    }

    /// The visual stack: `sorted_page` without hidden widgets.
    #[must_use]
    pub fn visible_stack(&self, page: &str) -> Vec<&PlacedWidget> {
        let mut stack = self.sorted_page(page);
        stack.retain(|w| !w.is_hidden());
        stack
    }

    /// Highest z value on `page`.
    #[must_use]
    pub fn max_z(&self, page: &str) -> Option<i64> {
        self.page(page).map(PlacedWidget::z_index).max()
    }

    /// Lowest z value on `page`.
    #[must_use]
    pub fn min_z(&self, page: &str) -> Option<i64> {
        self.page(page).map(PlacedWidget::z_index).min()
    }

    /// z value for a new widget on `page`: current maximum + 1.
    #[must_use]
    pub fn next_z(&self, page: &str) -> i64 {
        self.max_z(page).map_or(0, |z| z + 1)
    }

    /// Number of widgets across all pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Returns `true` if the store contains no widgets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}
