//! Plain-text bodies for the engine's render registry, used by `replay --scene`.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use canvas::catalog;
use canvas::doc::PlacedWidget;
use canvas::render::{RendererRegistry, Scene};
use canvas::surface::Rect;

/// Registry with one text renderer per catalog type; unknown tags print the raw tag.
#[must_use]
pub fn text_registry() -> RendererRegistry<String> {
    let mut registry = RendererRegistry::new(|w: &PlacedWidget, r: Rect| body_line(&w.kind, w, r));
    for entry in catalog::entries() {
        let label = entry.label;
        registry.register(entry.tag, move |w: &PlacedWidget, r: Rect| body_line(label, w, r));
    }
    registry
}

fn body_line(label: &str, w: &PlacedWidget, r: Rect) -> String {
    let mut line = format!("{label:<16} {:>7.1},{:<7.1} {:>6.1}x{:<6.1} z={}", r.x, r.y, r.width, r.height, w.z_index());
    if let Some(name) = &w.properties.group_name {
        line.push_str(&format!(" group={name:?}"));
    }
    if w.is_locked() {
        line.push_str(" locked");
    }
    line
}

/// One line per visible widget, bottom first, then the selection overlay or
/// the surface marker.
///
/// Selected widgets are marked with `*`.
#[must_use]
pub fn describe(scene: &Scene<'_>, registry: &RendererRegistry<String>) -> Vec<String> {
    let mut lines: Vec<String> = scene
        .items
        .iter()
        .zip(registry.render_scene(scene))
        .map(|(item, body)| format!("{} {body}", if item.selected { '*' } else { ' ' }))
        .collect();
    if let Some(overlay) = &scene.overlay {
        let b = overlay.bounds;
        lines.push(format!(
            "selection {:.1},{:.1} {:.1}x{:.1} toolbar {:.1},{:.1} handles {}",
            b.x,
            b.y,
            b.width,
            b.height,
            overlay.toolbar.x,
            overlay.toolbar.y,
            overlay.handles.len()
        ));
    }
    if scene.surface_selected {
        lines.push("surface selected".to_string());
    }
    lines
}
