//! Surface controller: routes pointer, frame, keyboard and command input
//! through the drag, resize, selection, layering and grouping controllers.
//!
//! Every entry point runs synchronously against the single [`WidgetStore`]
//! and returns the [`Action`]s the host must carry out (broadcast, redraw,
//! request a frame, attach or detach global listeners).

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use crate::catalog;
use crate::command::{self, Command};
use crate::consts::{DEFAULT_PAGE, DUPLICATE_OFFSET, NUDGE_STEP};
use crate::doc::{GroupId, PageId, PartialWidget, PlacedWidget, WidgetId, WidgetStore};
use crate::drag;
use crate::error::EngineError;
use crate::frame::{FrameQueue, PendingUpdate};
use crate::group::{self, GroupRegistry};
use crate::hit::{self, Hit, HitPart};
use crate::input::{Button, InputState, Key, Modifiers};
use crate::layering;
use crate::resize;
use crate::selection::Selection;
use crate::surface::{Point, Rect, Surface};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    WidgetCreated(PlacedWidget),
    WidgetUpdated { id: WidgetId, fields: PartialWidget },
    WidgetDeleted { id: WidgetId },
    SelectionChanged { primary: Option<WidgetId>, members: Vec<WidgetId> },
    /// The surface background was clicked; show surface-level properties.
    SurfaceSelected,
    SetCursor(String),
    /// Call [`EngineCore::on_frame`] on the next animation frame.
    FrameRequested,
    /// A gesture began; route global pointer-move/up to the engine.
    CaptureStarted,
    /// The gesture ended; detach the global listeners.
    CaptureReleased,
    RenderNeeded,
}

/// Engine state. Owns the store, the surface, and all transient interaction state.
#[derive(Debug)]
pub struct EngineCore {
    pub store: WidgetStore,
    pub surface: Surface,
    pub selection: Selection,
    pub input: InputState,
    pub groups: GroupRegistry,
    frames: FrameQueue,
    clipboard: Vec<PlacedWidget>,
    pastes: u32,
    active_page: PageId,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(Surface::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(surface: Surface) -> Self {
        Self {
            store: WidgetStore::new(),
            surface,
            selection: Selection::new(),
            input: InputState::default(),
            groups: GroupRegistry::new(),
            frames: FrameQueue::new(),
            clipboard: Vec::new(),
            pastes: 0,
            active_page: DEFAULT_PAGE.to_string(),
        }
    }

    // --- Pages and snapshots ---

    #[must_use]
    pub fn active_page(&self) -> &str {
        &self.active_page
    }

    /// Switch pages. Any gesture is cancelled and the selection cleared.
    pub fn set_active_page(&mut self, page: impl Into<PageId>) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        self.active_page = page.into();
        self.selection.clear();
        actions.push(self.selection_changed());
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Replace every widget with a snapshot and rebuild the group registry.
    pub fn load_snapshot(&mut self, widgets: Vec<PlacedWidget>) -> Vec<Action> {
        let mut actions = self.cancel_gesture();
        self.store.load_snapshot(widgets);
        self.groups = GroupRegistry::from_store(&self.store);
        if self.selection.retain_existing(&self.store) {
            actions.push(self.selection_changed());
        }
        tracing::debug!(count = self.store.len(), "snapshot loaded");
        actions.push(Action::RenderNeeded);
        actions
    }

    /// [`load_snapshot`](Self::load_snapshot) from a JSON array of widgets.
    ///
    /// # Errors
    ///
    /// Returns `Snapshot` if `json` is not an array of widgets.
    pub fn load_snapshot_json(&mut self, json: &str) -> Result<Vec<Action>, EngineError> {
        let widgets: Vec<PlacedWidget> = serde_json::from_str(json)?;
        Ok(self.load_snapshot(widgets))
    }

    /// Opaque copy of a page's widgets for the host's save action.
    #[must_use]
    pub fn snapshot(&self, page: &str) -> Vec<PlacedWidget> {
        self.store.snapshot(page)
    }

    /// [`snapshot`](Self::snapshot) as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `Snapshot` if serialization fails.
    pub fn snapshot_json(&self, page: &str) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(&self.snapshot(page))?)
    }

    /// Switch grid mode. Existing widgets are not moved.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGridSize` for a non-positive or non-finite size; the
    /// surface is left unchanged.
    pub fn set_grid(&mut self, enabled: bool, size: f64) -> Result<(), EngineError> {
        let mut surface = self.surface;
        surface.grid_enabled = enabled;
        surface.grid_size = size;
        surface.validate()?;
        self.surface = surface;
        Ok(())
    }

    // --- Store contract ---

    /// Add a widget as-is (no clamping or z assignment).
    pub fn add_widget(&mut self, widget: PlacedWidget) -> Vec<Action> {
        self.store.add(widget.clone());
        vec![Action::WidgetCreated(widget), Action::RenderNeeded]
    }

    /// Apply a partial update; a missing id is a silent no-op.
    pub fn update_widget(&mut self, id: &WidgetId, partial: PartialWidget) -> Vec<Action> {
        if !self.store.update(id, &partial) {
            return Vec::new();
        }
        let mut actions = vec![Action::WidgetUpdated { id: *id, fields: partial }];
        if self.store.get(id).is_some_and(PlacedWidget::is_hidden) && self.selection.remove(id) {
            actions.push(self.selection_changed());
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Remove a widget regardless of lock state and drop it from the selection.
    ///
    /// A gesture still targeting the id stops at its next pointer sample.
    pub fn remove_widget(&mut self, id: &WidgetId) -> Vec<Action> {
        self.remove_many(&[*id])
    }

    pub fn remove_many(&mut self, ids: &[WidgetId]) -> Vec<Action> {
        let removed = self.store.remove_many(ids);
        if removed.is_empty() {
            return Vec::new();
        }
        let mut actions: Vec<Action> = removed.iter().map(|w| Action::WidgetDeleted { id: w.id }).collect();
        let mut deselected = false;
        for w in &removed {
            deselected |= self.selection.remove(&w.id);
        }
        if deselected {
            actions.push(self.selection_changed());
        }
        tracing::debug!(count = removed.len(), "widgets removed");
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Create a widget of type `kind` at a viewport drop point.
    ///
    /// The footprint comes from the catalog (rounded up to the grid in grid
    /// mode), the position is clamped so the footprint fits, z is one above
    /// the page maximum, and the new widget becomes the sole selection.
    pub fn drop_widget(&mut self, kind: &str, viewport: Point) -> Vec<Action> {
        let local = self.surface.to_local(viewport);
        let (w, h) = catalog::footprint(kind);
        let (w, h) = (self.surface.snap_up(w), self.surface.snap_up(h));
        let pos = self.surface.settle(local.x, local.y, w, h);

        let mut widget = PlacedWidget::new(self.active_page.clone(), kind, pos.x, pos.y).with_size(w, h);
        widget.properties.z_index = self.store.next_z(&self.active_page);
        let id = widget.id;
        tracing::debug!(%id, kind, x = pos.x, y = pos.y, "widget dropped");

        self.store.add(widget.clone());
        self.selection.select_single(id);
        vec![Action::WidgetCreated(widget), self.selection_changed(), Action::RenderNeeded]
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, viewport: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if self.input.is_active() {
            return Vec::new();
        }
        let local = self.surface.to_local(viewport);
        let hit = hit::hit_test(local, &self.store, &self.active_page, self.handles_for());

        match (button, hit) {
            (Button::Primary, None) => {
                self.selection.select_surface();
                vec![Action::SurfaceSelected, self.selection_changed(), Action::RenderNeeded]
            }
            (Button::Primary, Some(Hit { widget_id, part: HitPart::ResizeHandle(anchor) })) => {
                match resize::begin(&self.store, widget_id, anchor, local) {
                    Some(state) => self.start_gesture(state),
                    None => Vec::new(),
                }
            }
            (Button::Primary, Some(Hit { widget_id, part: HitPart::Body })) => {
                if modifiers.toggles_selection() {
                    self.selection.toggle(widget_id);
                    return vec![self.selection_changed(), Action::RenderNeeded];
                }
                let mut actions = Vec::new();
                if self.selection.members() != [widget_id].as_slice() {
                    self.selection.select_single(widget_id);
                    actions.push(self.selection_changed());
                    actions.push(Action::RenderNeeded);
                }
                if let Some(state) = drag::begin(&self.store, widget_id, local) {
                    actions.extend(self.start_gesture(state));
                }
                actions
            }
            (Button::Secondary, Some(Hit { widget_id, .. })) => {
                // Context menu target: keep an existing multi-selection that includes it.
                if self.selection.contains(&widget_id) {
                    return Vec::new();
                }
                self.selection.select_single(widget_id);
                vec![self.selection_changed(), Action::RenderNeeded]
            }
            _ => Vec::new(),
        }
    }

    pub fn on_pointer_move(&mut self, viewport: Point, _modifiers: Modifiers) -> Vec<Action> {
        let local = self.surface.to_local(viewport);
        let (id, rect) = match self.input.clone() {
            InputState::Idle => return Vec::new(),
            InputState::Dragging { id, grab, .. } => match self.movable_rect(&id) {
                Some(current) => (id, drag::candidate(current, grab, local, &self.surface)),
                None => return self.abort_gesture(id),
            },
            InputState::Resizing { id, anchor, start, origin } => match self.movable_rect(&id) {
                Some(_) => (id, resize::resize_rect(anchor, origin, start, local, &self.surface)),
                None => return self.abort_gesture(id),
            },
        };
        if self.frames.schedule(id, rect) { vec![Action::FrameRequested] } else { Vec::new() }
    }

    pub fn on_pointer_up(&mut self, _viewport: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        let state = std::mem::take(&mut self.input);
        let mut actions = match self.frames.take() {
            Some(update) => self.apply_pending(update),
            None => Vec::new(),
        };
        match state {
            InputState::Idle => return actions,
            InputState::Dragging { id, .. } => {
                if let Some(current) = self.movable_rect(&id) {
                    let settled = drag::settle(current, &self.surface);
                    if settled != current {
                        actions.extend(self.write_rect(id, settled));
                    }
                }
                tracing::debug!(%id, "drag end");
            }
            InputState::Resizing { id, .. } => {
                tracing::debug!(%id, "resize end");
            }
        }
        actions.push(Action::CaptureReleased);
        actions.push(Action::SetCursor("default".into()));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Apply the geometry queued since the last frame.
    pub fn on_frame(&mut self) -> Vec<Action> {
        match self.frames.take() {
            Some(update) => self.apply_pending(update),
            None => Vec::new(),
        }
    }

    // --- Keyboard and commands ---

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        match command::resolve(&key, modifiers) {
            Some(cmd) => self.execute(cmd),
            None => Vec::new(),
        }
    }

    /// Run a command against the current selection.
    pub fn execute(&mut self, cmd: Command) -> Vec<Action> {
        tracing::debug!(?cmd, "execute");
        match cmd {
            Command::Copy => {
                self.copy_selection();
                Vec::new()
            }
            Command::Cut => {
                self.copy_selection();
                self.delete_selection()
            }
            Command::Paste => self.paste(),
            Command::Duplicate => self.duplicate_selection(),
            Command::Delete => self.delete_selection(),
            Command::SelectAll => {
                let ids: Vec<WidgetId> = self.store.visible_stack(&self.active_page).iter().map(|w| w.id).collect();
                self.selection.select_many(&ids);
                vec![self.selection_changed(), Action::RenderNeeded]
            }
            Command::Deselect => {
                self.selection.clear();
                vec![self.selection_changed(), Action::RenderNeeded]
            }
            Command::BringToFront => {
                let mut ids = self.targets();
                ids.sort_by_key(|id| self.z_of(id));
                self.layer_each(&ids, layering::bring_to_front)
            }
            Command::SendToBack => {
                let mut ids = self.targets();
                ids.sort_by_key(|id| std::cmp::Reverse(self.z_of(id)));
                self.layer_each(&ids, layering::send_to_back)
            }
            Command::BringForward => self.layer_primary(layering::bring_forward),
            Command::SendBackward => self.layer_primary(layering::send_backward),
            Command::GroupSelection => self.group_selection(),
            Command::Ungroup => self.ungroup_selection(),
            Command::ToggleLock => self.toggle_flag(crate::doc::KEY_LOCKED),
            Command::ToggleHide => self.toggle_flag(crate::doc::KEY_HIDDEN),
            Command::Nudge { direction, coarse } => {
                let step = if coarse || self.surface.grid_enabled { self.surface.grid_size } else { NUDGE_STEP };
                let (ux, uy) = direction.unit();
                self.nudge(ux * step, uy * step)
            }
        }
    }

    // --- Grouping ---

    /// Create an empty group.
    pub fn create_group(&mut self, name: impl Into<String>) -> GroupId {
        self.groups.create(name)
    }

    pub fn rename_group(&mut self, id: &GroupId, name: impl Into<String>) -> Vec<Action> {
        let changes = self.groups.rename(&mut self.store, id, name);
        updated(changes)
    }

    pub fn delete_group(&mut self, id: &GroupId) -> Vec<Action> {
        let changes = self.groups.delete(&mut self.store, id);
        updated(changes)
    }

    pub fn add_to_group(&mut self, group: &GroupId, widget: &WidgetId) -> Vec<Action> {
        updated(self.groups.add_member(&mut self.store, group, widget).into_iter().collect())
    }

    pub fn remove_from_group(&mut self, widget: &WidgetId) -> Vec<Action> {
        updated(GroupRegistry::remove_member(&mut self.store, widget).into_iter().collect())
    }

    /// Select every member of a group (primary = first in store order).
    pub fn select_group(&mut self, id: &GroupId) -> Vec<Action> {
        let members = group::members(&self.store, id);
        if members.is_empty() {
            return Vec::new();
        }
        self.selection.select_many(&members);
        vec![self.selection_changed(), Action::RenderNeeded]
    }

    pub fn translate_group(&mut self, id: &GroupId, dx: f64, dy: f64) -> Vec<Action> {
        updated(group::translate_group(&mut self.store, id, dx, dy, &self.surface))
    }

    // --- Queries ---

    #[must_use]
    pub fn widget(&self, id: &WidgetId) -> Option<&PlacedWidget> {
        self.store.get(id)
    }

    /// Bounding rectangle of the selection, for the overlay toolbar.
    #[must_use]
    pub fn selection_bounds(&self) -> Option<Rect> {
        self.selection.bounds(&self.store)
    }

    /// The widget whose resize handles are live: a lone primary selection.
    #[must_use]
    pub fn handles_for(&self) -> Option<WidgetId> {
        if self.selection.is_multi() { None } else { self.selection.primary() }
    }

    // --- Gesture plumbing ---

    fn start_gesture(&mut self, state: InputState) -> Vec<Action> {
        let cursor = match &state {
            InputState::Resizing { anchor, .. } => anchor.cursor(),
            _ => "move",
        };
        self.frames.cancel();
        self.input = state;
        vec![Action::CaptureStarted, Action::SetCursor(cursor.into())]
    }

    /// End the gesture without committing anything further.
    fn cancel_gesture(&mut self) -> Vec<Action> {
        self.frames.cancel();
        if std::mem::take(&mut self.input).is_active() {
            vec![Action::CaptureReleased, Action::SetCursor("default".into())]
        } else {
            Vec::new()
        }
    }

    fn abort_gesture(&mut self, id: WidgetId) -> Vec<Action> {
        tracing::debug!(%id, "gesture target gone or locked; cancelling");
        self.cancel_gesture()
    }

    /// Current rect of a widget that may still be moved or resized.
    fn movable_rect(&self, id: &WidgetId) -> Option<Rect> {
        self.store.get(id).filter(|w| !w.is_locked() && !w.is_hidden()).map(PlacedWidget::rect)
    }

    fn apply_pending(&mut self, update: PendingUpdate) -> Vec<Action> {
        let PendingUpdate { id, rect } = update;
        match self.movable_rect(&id) {
            Some(current) if current != rect => {
                tracing::trace!(%id, x = rect.x, y = rect.y, w = rect.width, h = rect.height, "frame");
                let mut actions = self.write_rect(id, rect);
                actions.push(Action::RenderNeeded);
                actions
            }
            _ => Vec::new(),
        }
    }

    /// Write geometry, sending only position when the size is unchanged.
    fn write_rect(&mut self, id: WidgetId, rect: Rect) -> Vec<Action> {
        let same_size = self
            .store
            .get(&id)
            .is_some_and(|w| w.width == Some(rect.width) && w.height == Some(rect.height));
        let partial = if same_size { PartialWidget::position(rect.x, rect.y) } else { PartialWidget::rect(rect) };
        if self.store.update(&id, &partial) { vec![Action::WidgetUpdated { id, fields: partial }] } else { Vec::new() }
    }

    // --- Command helpers ---

    /// Selected widgets that exist on the active page.
    fn targets(&self) -> Vec<WidgetId> {
        self.selection
            .targets()
            .into_iter()
            .filter(|id| self.store.get(id).is_some_and(|w| w.page_id == self.active_page))
            .collect()
    }

    fn z_of(&self, id: &WidgetId) -> i64 {
        self.store.get(id).map_or(0, PlacedWidget::z_index)
    }

    fn selection_changed(&self) -> Action {
        Action::SelectionChanged { primary: self.selection.primary(), members: self.selection.members().to_vec() }
    }

    fn copy_selection(&mut self) {
        let mut widgets: Vec<PlacedWidget> = self.targets().iter().filter_map(|id| self.store.get(id)).cloned().collect();
        widgets.sort_by_key(PlacedWidget::z_index);
        self.clipboard = widgets;
        self.pastes = 0;
    }

    fn delete_selection(&mut self) -> Vec<Action> {
        let ids: Vec<WidgetId> =
            self.targets().into_iter().filter(|id| self.store.get(id).is_some_and(|w| !w.is_locked())).collect();
        if self.input.target().is_some_and(|t| ids.contains(&t)) {
            let mut actions = self.cancel_gesture();
            actions.extend(self.remove_many(&ids));
            return actions;
        }
        self.remove_many(&ids)
    }

    fn paste(&mut self) -> Vec<Action> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        self.pastes += 1;
        let offset = DUPLICATE_OFFSET * f64::from(self.pastes);
        let sources = self.clipboard.clone();
        self.place_copies(&sources, offset)
    }

    fn duplicate_selection(&mut self) -> Vec<Action> {
        let mut sources: Vec<PlacedWidget> = self.targets().iter().filter_map(|id| self.store.get(id)).cloned().collect();
        sources.sort_by_key(PlacedWidget::z_index);
        self.place_copies(&sources, DUPLICATE_OFFSET)
    }

    /// Insert offset copies of `sources` on the active page above everything
    /// else, then select them.
    fn place_copies(&mut self, sources: &[PlacedWidget], offset: f64) -> Vec<Action> {
        if sources.is_empty() {
            return Vec::new();
        }
        let mut actions = Vec::new();
        let mut ids = Vec::new();
        for source in sources {
            let mut copy = source.duplicate(offset);
            copy.page_id.clone_from(&self.active_page);
            copy.properties.group_id = None;
            copy.properties.group_name = None;
            let (w, h) = copy.size();
            let pos = self.surface.settle(copy.x, copy.y, w, h);
            copy.x = pos.x;
            copy.y = pos.y;
            copy.properties.z_index = self.store.next_z(&self.active_page);
            ids.push(copy.id);
            self.store.add(copy.clone());
            actions.push(Action::WidgetCreated(copy));
        }
        self.selection.select_many(&ids);
        actions.push(self.selection_changed());
        actions.push(Action::RenderNeeded);
        actions
    }

    fn layer_each(&mut self, ids: &[WidgetId], op: fn(&mut WidgetStore, &WidgetId) -> layering::ZChanges) -> Vec<Action> {
        let mut changes = Vec::new();
        for id in ids {
            changes.extend(op(&mut self.store, id));
        }
        updated(changes)
    }

    fn layer_primary(&mut self, op: fn(&mut WidgetStore, &WidgetId) -> layering::ZChanges) -> Vec<Action> {
        let primary = self.selection.primary().filter(|id| self.targets().contains(id));
        match primary {
            Some(id) => updated(op(&mut self.store, &id)),
            None => Vec::new(),
        }
    }

    fn group_selection(&mut self) -> Vec<Action> {
        let ids = self.targets();
        if ids.is_empty() {
            return Vec::new();
        }
        let name = self.groups.next_name();
        let gid = self.groups.create(name);
        let changes: Vec<_> = ids.iter().filter_map(|id| self.groups.add_member(&mut self.store, &gid, id)).collect();
        updated(changes)
    }

    fn ungroup_selection(&mut self) -> Vec<Action> {
        let mut gids: Vec<GroupId> = Vec::new();
        for id in self.targets() {
            if let Some(g) = self.store.get(&id).and_then(|w| w.properties.group_id)
                && !gids.contains(&g)
            {
                gids.push(g);
            }
        }
        let mut changes = Vec::new();
        for g in &gids {
            changes.extend(self.groups.delete(&mut self.store, g));
        }
        updated(changes)
    }

    /// Flip a boolean reserved key on the selection: set it on all targets if
    /// any target lacks it, otherwise clear it on all.
    fn toggle_flag(&mut self, key: &str) -> Vec<Action> {
        let ids = self.targets();
        let flag = |w: &PlacedWidget| if key == crate::doc::KEY_LOCKED { w.is_locked() } else { w.is_hidden() };
        let value = ids.iter().any(|id| self.store.get(id).is_some_and(|w| !flag(w)));
        let mut actions = Vec::new();
        for id in &ids {
            let mut patch = serde_json::Map::new();
            patch.insert(key.to_string(), serde_json::Value::Bool(value));
            actions.extend(self.update_widget(id, PartialWidget::props(serde_json::Value::Object(patch))));
        }
        actions.retain(|a| !matches!(a, Action::RenderNeeded));
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    fn nudge(&mut self, dx: f64, dy: f64) -> Vec<Action> {
        let mut changes = Vec::new();
        for id in self.targets() {
            let Some(rect) = self.movable_rect(&id) else {
                continue;
            };
            let pos = self.surface.settle(rect.x + dx, rect.y + dy, rect.width, rect.height);
            if pos == Point::new(rect.x, rect.y) {
                continue;
            }
            let partial = PartialWidget::position(pos.x, pos.y);
            if self.store.update(&id, &partial) {
                changes.push((id, partial));
            }
        }
        updated(changes)
    }
}

/// Turn applied changes into update actions plus one redraw.
fn updated(changes: Vec<(WidgetId, PartialWidget)>) -> Vec<Action> {
    if changes.is_empty() {
        return Vec::new();
    }
    let mut actions: Vec<Action> =
        changes.into_iter().map(|(id, fields)| Action::WidgetUpdated { id, fields }).collect();
    actions.push(Action::RenderNeeded);
    actions
}
