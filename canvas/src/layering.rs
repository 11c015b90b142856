//! Layering manager: z-order operations scoped to a widget's page.
//!
//! Stacking order is `properties.zIndex` (absent = 0). Every operation
//! computes its full set of z changes first and then writes them to the store
//! within the same call, so a swap is never observed half-applied. The
//! returned list holds the `(id, partial)` pairs that were written, for the
//! engine to broadcast.

#[cfg(test)]
#[path = "layering_test.rs"]
mod layering_test;

use crate::doc::{PartialWidget, WidgetId, WidgetStore};

/// Z-order changes applied by one layering operation.
pub type ZChanges = Vec<(WidgetId, PartialWidget)>;

/// Raise `id` above every other widget on its page.
///
/// A widget already strictly on top is left alone, so repeated calls are
/// no-ops.
pub fn bring_to_front(store: &mut WidgetStore, id: &WidgetId) -> ZChanges {
    let Some((page, z)) = locate(store, id) else {
        return Vec::new();
    };
    match sibling_z(store, &page, id).max() {
        Some(top) if top >= z => commit(store, vec![(*id, top + 1)]),
        _ => Vec::new(),
    }
}

/// Lower `id` below every other widget on its page.
pub fn send_to_back(store: &mut WidgetStore, id: &WidgetId) -> ZChanges {
    let Some((page, z)) = locate(store, id) else {
        return Vec::new();
    };
    match sibling_z(store, &page, id).min() {
        Some(bottom) if bottom <= z => commit(store, vec![(*id, bottom - 1)]),
        _ => Vec::new(),
    }
}

/// Swap z with the nearest sibling strictly above.
pub fn bring_forward(store: &mut WidgetStore, id: &WidgetId) -> ZChanges {
    step(store, id, true)
}

/// Swap z with the nearest sibling strictly below.
pub fn send_backward(store: &mut WidgetStore, id: &WidgetId) -> ZChanges {
    step(store, id, false)
}

fn step(store: &mut WidgetStore, id: &WidgetId, forward: bool) -> ZChanges {
    let Some((page, _)) = locate(store, id) else {
        return Vec::new();
    };
    let original = page_ranks(store, &page);
    let Some(me) = original.iter().position(|(w, _)| w == id) else {
        return Vec::new();
    };

    // Colliding z values make "strictly above/below" ambiguous; rank densely
    // first so each widget has a distinct neighbour.
    let my_z = original[me].1;
    let collides = original.iter().enumerate().any(|(i, (_, z))| i != me && *z == my_z);
    let mut ranks = if collides { densify(&original) } else { original.clone() };

    let my_z = ranks[me].1;
    let others = ranks.iter().enumerate().filter(|(i, _)| *i != me);
    let neighbour = if forward {
        others.filter(|(_, (_, z))| *z > my_z).min_by_key(|(_, (_, z))| *z)
    } else {
        others.filter(|(_, (_, z))| *z < my_z).max_by_key(|(_, (_, z))| *z)
    }
    .map(|(i, _)| i);

    let Some(n) = neighbour else {
        return Vec::new();
    };
    let their_z = ranks[n].1;
    ranks[n].1 = my_z;
    ranks[me].1 = their_z;
    tracing::debug!(%id, forward, from = my_z, to = their_z, "layer step");
    commit(store, diff(&original, &ranks))
}

fn locate(store: &WidgetStore, id: &WidgetId) -> Option<(String, i64)> {
    store.get(id).map(|w| (w.page_id.clone(), w.z_index()))
}

fn sibling_z<'a>(store: &'a WidgetStore, page: &'a str, id: &'a WidgetId) -> impl Iterator<Item = i64> + 'a {
    store.page(page).filter(move |w| w.id != *id).map(crate::doc::PlacedWidget::z_index)
}

/// `(id, z)` for every widget on `page`, bottom first.
fn page_ranks(store: &WidgetStore, page: &str) -> Vec<(WidgetId, i64)> {
    store.sorted_page(page).iter().map(|w| (w.id, w.z_index())).collect()
}

fn densify(ranks: &[(WidgetId, i64)]) -> Vec<(WidgetId, i64)> {
    ranks.iter().zip(0_i64..).map(|((id, _), z)| (*id, z)).collect()
}

fn diff(before: &[(WidgetId, i64)], after: &[(WidgetId, i64)]) -> Vec<(WidgetId, i64)> {
    before.iter().zip(after).filter(|(b, a)| b.1 != a.1).map(|(_, a)| *a).collect()
}

fn commit(store: &mut WidgetStore, changes: Vec<(WidgetId, i64)>) -> ZChanges {
    changes
        .into_iter()
        .map(|(id, z)| {
            let partial = PartialWidget::z_index(z);
            store.update(&id, &partial);
            (id, partial)
        })
        .collect()
}
