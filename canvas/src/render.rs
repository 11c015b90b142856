//! Scene assembly: what the host draws, bottom first, and the selection overlay.
//!
//! This module never touches widget *content*. A body is produced by the
//! [`WidgetRenderer`] registered for the widget's type tag, or by the
//! registry's fallback. It receives read-only views of engine state and does
//! not mutate anything.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::HashMap;

use crate::consts::TOOLBAR_GAP;
use crate::doc::{PlacedWidget, WidgetId, WidgetStore};
use crate::engine::EngineCore;
use crate::hit::{self, ResizeAnchor};
use crate::selection::Selection;
use crate::surface::{Point, Rect};

/// One visible widget in stacking order.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneItem<'a> {
    pub widget: &'a PlacedWidget,
    pub rect: Rect,
    pub selected: bool,
}

/// A resize knob the overlay draws for a lone selected widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub anchor: ResizeAnchor,
    pub rect: Rect,
    pub cursor: &'static str,
}

/// Selection chrome drawn above every widget.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    /// Bounding box of the selection (union box for a multi-selection).
    pub bounds: Rect,
    /// Bottom-center point of the floating toolbar. Sits above `bounds`, or
    /// below it when there is no room above.
    pub toolbar: Point,
    /// Empty unless exactly one unlocked widget is selected.
    pub handles: Vec<Handle>,
}

/// Everything the host needs for one redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene<'a> {
    /// Visible widgets on the active page, bottom first.
    pub items: Vec<SceneItem<'a>>,
    pub overlay: Option<Overlay>,
    /// The background was clicked; hosts show surface-level properties.
    pub surface_selected: bool,
}

impl Scene<'_> {
    /// Topmost item at `pt`, mirroring what a click there would hit.
    #[must_use]
    pub fn item_at(&self, pt: Point) -> Option<&SceneItem<'_>> {
        self.items.iter().rev().find(|item| item.rect.contains(pt))
    }
}

/// Scene for the engine's active page.
#[must_use]
pub fn build_scene(core: &EngineCore) -> Scene<'_> {
    scene_for(&core.store, &core.selection, core.active_page())
}

/// Scene for `page` given an explicit store and selection.
#[must_use]
pub fn scene_for<'a>(store: &'a WidgetStore, selection: &Selection, page: &str) -> Scene<'a> {
    let items = store
        .visible_stack(page)
        .into_iter()
        .map(|widget| SceneItem { widget, rect: widget.rect(), selected: selection.contains(&widget.id) })
        .collect();
    Scene { items, overlay: overlay(store, selection, page), surface_selected: selection.surface_selected() }
}

fn overlay(store: &WidgetStore, selection: &Selection, page: &str) -> Option<Overlay> {
    let on_page: Vec<WidgetId> = selection
        .members()
        .iter()
        .copied()
        .filter(|id| store.get(id).is_some_and(|w| w.page_id == page && !w.is_hidden()))
        .collect();
    if on_page.is_empty() {
        return None;
    }
    let bounds = selection.bounds(store)?;

    let handles = match on_page.as_slice() {
        [only] if !selection.is_multi() => store
            .get(only)
            .filter(|w| !w.is_locked())
            .map(|w| handles_around(w.rect()))
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    Some(Overlay { bounds, toolbar: toolbar_anchor(bounds), handles })
}

/// The eight knobs around `rect`.
#[must_use]
pub fn handles_around(rect: Rect) -> Vec<Handle> {
    ResizeAnchor::ALL
        .into_iter()
        .map(|anchor| Handle { anchor, rect: hit::handle_rect(anchor, rect), cursor: anchor.cursor() })
        .collect()
}

fn toolbar_anchor(bounds: Rect) -> Point {
    let cx = bounds.x + bounds.width / 2.0;
    let above = bounds.y - TOOLBAR_GAP;
    if above >= 0.0 { Point::new(cx, above) } else { Point::new(cx, bounds.bottom() + TOOLBAR_GAP) }
}

// =============================================================
// Body renderers
// =============================================================

/// Turns a widget into the host's drawable for its body.
///
/// The engine treats `T` as opaque: a DOM node handle, a draw list, a text
/// line. Closures `Fn(&PlacedWidget, Rect) -> T` implement this directly.
pub trait WidgetRenderer<T> {
    fn render(&self, widget: &PlacedWidget, rect: Rect) -> T;
}

impl<T, F> WidgetRenderer<T> for F
where
    F: Fn(&PlacedWidget, Rect) -> T,
{
    fn render(&self, widget: &PlacedWidget, rect: Rect) -> T {
        self(widget, rect)
    }
}

/// Body renderers keyed by type tag, with a fallback for unknown tags.
pub struct RendererRegistry<T> {
    renderers: HashMap<String, Box<dyn WidgetRenderer<T>>>,
    fallback: Box<dyn WidgetRenderer<T>>,
}

impl<T> RendererRegistry<T> {
    /// Registry where every tag uses `fallback` until registered.
    pub fn new(fallback: impl WidgetRenderer<T> + 'static) -> Self {
        Self { renderers: HashMap::new(), fallback: Box::new(fallback) }
    }

    /// Register (or replace) the renderer for `tag`.
    pub fn register(&mut self, tag: impl Into<String>, renderer: impl WidgetRenderer<T> + 'static) {
        let tag = tag.into();
        tracing::debug!(%tag, "body renderer registered");
        self.renderers.insert(tag, Box::new(renderer));
    }

    #[must_use]
    pub fn has(&self, tag: &str) -> bool {
        self.renderers.contains_key(tag)
    }

    /// Renderer for `tag`, falling back when none is registered.
    #[must_use]
    pub fn get(&self, tag: &str) -> &dyn WidgetRenderer<T> {
        match self.renderers.get(tag) {
            Some(renderer) => renderer.as_ref(),
            None => self.fallback.as_ref(),
        }
    }

    #[must_use]
    pub fn render(&self, item: &SceneItem<'_>) -> T {
        self.get(&item.widget.kind).render(item.widget, item.rect)
    }

    /// Bodies for every scene item, bottom first.
    #[must_use]
    pub fn render_scene(&self, scene: &Scene<'_>) -> Vec<T> {
        scene.items.iter().map(|item| self.render(item)).collect()
    }
}

impl<T> std::fmt::Debug for RendererRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<&str> = self.renderers.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("RendererRegistry").field("tags", &tags).finish_non_exhaustive()
    }
}
