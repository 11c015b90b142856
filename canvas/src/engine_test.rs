#![allow(clippy::float_cmp)]

use serde_json::json;
use uuid::Uuid;

use super::*;
use crate::hit::ResizeAnchor;

// =============================================================
// Helpers
// =============================================================

fn engine() -> EngineCore {
    EngineCore::new(Surface::new(1000.0, 800.0).unwrap())
}

fn grid_engine(width: f64, height: f64) -> EngineCore {
    EngineCore::new(Surface::new(width, height).unwrap().with_grid(20.0).unwrap())
}

fn place(core: &mut EngineCore, x: f64, y: f64, w: f64, h: f64) -> WidgetId {
    let mut widget = PlacedWidget::new(core.active_page(), "rectangle", x, y).with_size(w, h);
    widget.properties.z_index = core.store.next_z(core.active_page());
    let id = widget.id;
    core.add_widget(widget);
    id
}

fn lock(core: &mut EngineCore, id: &WidgetId) {
    core.update_widget(id, PartialWidget::props(json!({ "locked": true })));
}

fn no_modifiers() -> Modifiers {
    Modifiers::default()
}

fn shift_modifier() -> Modifiers {
    Modifiers { shift: true, ..Default::default() }
}

fn ctrl_modifier() -> Modifiers {
    Modifiers { ctrl: true, ..Default::default() }
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn rect_of(core: &EngineCore, id: &WidgetId) -> Rect {
    core.widget(id).unwrap().rect()
}

/// Full gesture: down at `from`, one move to `to`, one frame, up.
fn gesture(core: &mut EngineCore, from: Point, to: Point) -> Vec<Action> {
    let mut all = core.on_pointer_down(from, Button::Primary, no_modifiers());
    all.extend(core.on_pointer_move(to, no_modifiers()));
    all.extend(core.on_frame());
    all.extend(core.on_pointer_up(to, Button::Primary, no_modifiers()));
    all
}

fn click(core: &mut EngineCore, at: Point) -> Vec<Action> {
    let mut all = core.on_pointer_down(at, Button::Primary, no_modifiers());
    all.extend(core.on_pointer_up(at, Button::Primary, no_modifiers()));
    all
}

fn has_action<F>(actions: &[Action], pred: F) -> bool
where
    F: Fn(&Action) -> bool,
{
    actions.iter().any(pred)
}

fn has_widget_created(actions: &[Action]) -> bool {
    has_action(actions, |a| matches!(a, Action::WidgetCreated(_)))
}

fn has_widget_updated(actions: &[Action]) -> bool {
    has_action(actions, |a| matches!(a, Action::WidgetUpdated { .. }))
}

fn has_capture_released(actions: &[Action]) -> bool {
    has_action(actions, |a| matches!(a, Action::CaptureReleased))
}

fn assert_in_bounds(core: &EngineCore, id: &WidgetId) {
    let r = rect_of(core, id);
    assert!(r.x >= 0.0 && r.y >= 0.0, "{r:?}");
    assert!(r.right() <= core.surface.width && r.bottom() <= core.surface.height, "{r:?}");
}

// =============================================================
// EngineCore: construction and defaults
// =============================================================

#[test]
fn core_default_is_idle_and_empty() {
    let core = EngineCore::default();
    assert!(core.store.is_empty());
    assert!(core.selection.is_empty());
    assert_eq!(core.input, InputState::Idle);
    assert_eq!(core.active_page(), DEFAULT_PAGE);
}

#[test]
fn set_grid_rejects_bad_size_and_keeps_surface() {
    let mut core = engine();
    assert!(core.set_grid(true, 0.0).is_err());
    assert!(!core.surface.grid_enabled);
    core.set_grid(true, 25.0).unwrap();
    assert_eq!(core.surface.grid(), Some(25.0));
}

// =============================================================
// Drop
// =============================================================

#[test]
fn drop_uses_catalog_footprint_and_selects() {
    let mut core = engine();
    let actions = core.drop_widget("bar-chart", pt(100.0, 100.0));
    assert!(has_widget_created(&actions));
    let id = core.selection.primary().unwrap();
    assert_eq!(rect_of(&core, &id), Rect::new(100.0, 100.0, 400.0, 300.0));
    assert_eq!(core.selection.members(), &[id]);
}

#[test]
fn drop_chart_is_larger_than_text() {
    let mut core = engine();
    core.drop_widget("line-chart", pt(0.0, 0.0));
    let chart = rect_of(&core, &core.selection.primary().unwrap());
    core.drop_widget("text", pt(0.0, 0.0));
    let text = rect_of(&core, &core.selection.primary().unwrap());
    assert!(chart.width * chart.height > text.width * text.height);
}

#[test]
fn drop_unknown_type_uses_fallback() {
    let mut core = engine();
    core.drop_widget("sparkline-3d", pt(10.0, 10.0));
    let r = rect_of(&core, &core.selection.primary().unwrap());
    assert_eq!((r.width, r.height), (200.0, 150.0));
}

#[test]
fn drop_in_grid_mode_rounds_footprint_up_and_snaps() {
    let mut core = grid_engine(1000.0, 800.0);
    core.drop_widget("rectangle", pt(33.0, 47.0));
    let r = rect_of(&core, &core.selection.primary().unwrap());
    assert_eq!(r, Rect::new(40.0, 40.0, 160.0, 160.0));
}

#[test]
fn drop_clamps_footprint_inside_surface() {
    let mut core = engine();
    core.drop_widget("bar-chart", pt(900.0, 700.0));
    let id = core.selection.primary().unwrap();
    assert_eq!(rect_of(&core, &id), Rect::new(600.0, 500.0, 400.0, 300.0));
}

#[test]
fn drop_converts_viewport_to_surface_coordinates() {
    let surface = Surface::new(1000.0, 800.0).unwrap().with_origin(50.0, 100.0);
    let mut core = EngineCore::new(surface);
    core.drop_widget("text", pt(150.0, 200.0));
    let r = rect_of(&core, &core.selection.primary().unwrap());
    assert_eq!((r.x, r.y), (100.0, 100.0));
}

#[test]
fn drop_assigns_max_z_plus_one() {
    let mut core = engine();
    core.drop_widget("text", pt(0.0, 0.0));
    core.drop_widget("text", pt(0.0, 0.0));
    let top = core.selection.primary().unwrap();
    assert_eq!(core.widget(&top).unwrap().z_index(), 1);
}

#[test]
fn drop_clears_prior_multi_selection() {
    let mut core = engine();
    let a = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    let b = place(&mut core, 200.0, 0.0, 100.0, 100.0);
    core.selection.select_many(&[a, b]);
    core.drop_widget("text", pt(500.0, 500.0));
    assert_eq!(core.selection.members().len(), 1);
    assert!(!core.selection.contains(&a));
}

// =============================================================
// Pointer down: selection
// =============================================================

#[test]
fn background_click_clears_and_selects_surface() {
    let mut core = engine();
    let a = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    core.selection.select_single(a);
    let actions = click(&mut core, pt(500.0, 500.0));
    assert!(core.selection.is_empty());
    assert!(core.selection.surface_selected());
    assert!(has_action(&actions, |a| matches!(a, Action::SurfaceSelected)));
}

#[test]
fn body_click_selects_and_starts_drag() {
    let mut core = engine();
    let a = place(&mut core, 100.0, 100.0, 100.0, 100.0);
    let actions = core.on_pointer_down(pt(150.0, 150.0), Button::Primary, no_modifiers());
    assert_eq!(core.selection.primary(), Some(a));
    assert_eq!(core.input.target(), Some(a));
    assert!(has_action(&actions, |a| matches!(a, Action::CaptureStarted)));
}

#[test]
fn modifier_click_toggles_multi_selection_without_drag() {
    let mut core = engine();
    let a = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    let b = place(&mut core, 200.0, 0.0, 100.0, 100.0);
    click(&mut core, pt(50.0, 50.0));
    core.on_pointer_down(pt(250.0, 50.0), Button::Primary, shift_modifier());
    assert!(!core.input.is_active());
    assert_eq!(core.selection.members(), &[a, b]);
    assert_eq!(core.selection.primary(), Some(a));
    assert!(core.handles_for().is_none());
}

#[test]
fn multi_selection_bounds_are_the_union() {
    let mut core = engine();
    let a = place(&mut core, 10.0, 10.0, 100.0, 50.0);
    let b = place(&mut core, 150.0, 40.0, 80.0, 60.0);
    core.selection.select_single(a);
    core.selection.toggle(b);
    let r = core.selection_bounds().unwrap();
    assert_eq!((r.x, r.y, r.right(), r.bottom()), (10.0, 10.0, 230.0, 100.0));
}

#[test]
fn secondary_click_keeps_multi_selection_containing_target() {
    let mut core = engine();
    let a = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    let b = place(&mut core, 200.0, 0.0, 100.0, 100.0);
    core.selection.select_many(&[a, b]);
    let actions = core.on_pointer_down(pt(250.0, 50.0), Button::Secondary, no_modifiers());
    assert!(actions.is_empty());
    assert!(core.selection.is_multi());
    assert!(!core.input.is_active());
}

#[test]
fn hidden_widget_is_not_hit() {
    let mut core = engine();
    let a = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    core.update_widget(&a, PartialWidget::props(json!({ "hidden": true })));
    click(&mut core, pt(50.0, 50.0));
    assert!(core.selection.is_empty());
    assert!(core.store.contains(&a));
}

// =============================================================
// Drag
// =============================================================

#[test]
fn drag_preserves_grab_offset() {
    let mut core = engine();
    let a = place(&mut core, 100.0, 100.0, 100.0, 100.0);
    let actions = gesture(&mut core, pt(150.0, 150.0), pt(350.0, 250.0));
    assert!(has_widget_updated(&actions));
    assert!(has_capture_released(&actions));
    assert_eq!(rect_of(&core, &a), Rect::new(300.0, 200.0, 100.0, 100.0));
    assert_eq!(core.input, InputState::Idle);
}

#[test]
fn drag_moves_are_coalesced_per_frame() {
    let mut core = engine();
    let a = place(&mut core, 100.0, 100.0, 100.0, 100.0);
    core.on_pointer_down(pt(150.0, 150.0), Button::Primary, no_modifiers());
    let first = core.on_pointer_move(pt(160.0, 160.0), no_modifiers());
    assert_eq!(first, vec![Action::FrameRequested]);
    assert!(core.on_pointer_move(pt(170.0, 170.0), no_modifiers()).is_empty());
    assert!(core.on_pointer_move(pt(180.0, 180.0), no_modifiers()).is_empty());
    assert_eq!(rect_of(&core, &a).x, 100.0);

    let applied = core.on_frame();
    let updates = applied.iter().filter(|a| matches!(a, Action::WidgetUpdated { .. })).count();
    assert_eq!(updates, 1);
    assert_eq!((rect_of(&core, &a).x, rect_of(&core, &a).y), (130.0, 130.0));
    assert!(core.on_frame().is_empty());
}

#[test]
fn pointer_up_flushes_pending_frame() {
    let mut core = engine();
    let a = place(&mut core, 100.0, 100.0, 100.0, 100.0);
    core.on_pointer_down(pt(150.0, 150.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(250.0, 150.0), no_modifiers());
    core.on_pointer_up(pt(250.0, 150.0), Button::Primary, no_modifiers());
    assert_eq!(rect_of(&core, &a).x, 200.0);
}

#[test]
fn drag_is_clamped_to_surface() {
    let mut core = engine();
    let a = place(&mut core, 100.0, 100.0, 100.0, 100.0);
    gesture(&mut core, pt(150.0, 150.0), pt(5000.0, -300.0));
    assert_eq!(rect_of(&core, &a), Rect::new(900.0, 0.0, 100.0, 100.0));
    assert_in_bounds(&core, &a);
}

#[test]
fn grid_drag_ends_aligned_and_in_bounds() {
    let mut core = grid_engine(990.0, 790.0);
    let a = place(&mut core, 100.0, 100.0, 100.0, 100.0);
    gesture(&mut core, pt(150.0, 150.0), pt(2000.0, 2000.0));
    let r = rect_of(&core, &a);
    assert_eq!((r.x, r.y), (880.0, 680.0));
    assert_eq!(r.x % 20.0, 0.0);
    assert_eq!(r.y % 20.0, 0.0);
    assert_in_bounds(&core, &a);
}

#[test]
fn grid_drag_snaps_intermediate_positions() {
    let mut core = grid_engine(1000.0, 800.0);
    let a = place(&mut core, 100.0, 100.0, 100.0, 100.0);
    core.on_pointer_down(pt(110.0, 110.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(143.0, 127.0), no_modifiers());
    core.on_frame();
    assert_eq!((rect_of(&core, &a).x, rect_of(&core, &a).y), (140.0, 120.0));
}

#[test]
fn locked_widget_never_moves() {
    let mut core = engine();
    let a = place(&mut core, 100.0, 100.0, 100.0, 100.0);
    lock(&mut core, &a);
    let before = rect_of(&core, &a);
    for i in 0..5 {
        let offset = f64::from(i) * 37.0;
        let actions = gesture(&mut core, pt(150.0, 150.0), pt(400.0 + offset, 300.0 - offset));
        assert!(!has_widget_updated(&actions));
    }
    assert_eq!(rect_of(&core, &a), before);
    assert_eq!(core.selection.primary(), Some(a));
    assert!(!core.input.is_active());
}

#[test]
fn pointer_down_during_gesture_is_ignored() {
    let mut core = engine();
    let a = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    place(&mut core, 300.0, 300.0, 100.0, 100.0);
    core.on_pointer_down(pt(50.0, 50.0), Button::Primary, no_modifiers());
    let actions = core.on_pointer_down(pt(350.0, 350.0), Button::Primary, no_modifiers());
    assert!(actions.is_empty());
    assert_eq!(core.input.target(), Some(a));
    assert_eq!(core.selection.primary(), Some(a));
}

#[test]
fn deleting_target_mid_drag_cancels_cleanly() {
    let mut core = engine();
    let a = place(&mut core, 100.0, 100.0, 100.0, 100.0);
    core.on_pointer_down(pt(150.0, 150.0), Button::Primary, no_modifiers());
    core.remove_widget(&a);
    let actions = core.on_pointer_move(pt(300.0, 300.0), no_modifiers());
    assert!(has_capture_released(&actions));
    assert_eq!(core.input, InputState::Idle);
    assert!(core.on_frame().is_empty());
    assert!(core.on_pointer_up(pt(300.0, 300.0), Button::Primary, no_modifiers()).is_empty());
    assert!(!core.store.contains(&a));
    assert!(!core.selection.contains(&a));
    assert!(core.selection.primary().is_none());
}

#[test]
fn deleting_target_with_frame_pending_applies_nothing() {
    let mut core = engine();
    let a = place(&mut core, 100.0, 100.0, 100.0, 100.0);
    let b = place(&mut core, 500.0, 500.0, 50.0, 50.0);
    core.on_pointer_down(pt(150.0, 150.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(300.0, 300.0), no_modifiers());
    core.remove_widget(&a);
    assert!(core.on_frame().is_empty());
    core.on_pointer_up(pt(300.0, 300.0), Button::Primary, no_modifiers());
    assert_eq!(core.store.len(), 1);
    assert!(core.store.contains(&b));
}

#[test]
fn locking_target_mid_drag_stops_updates() {
    let mut core = engine();
    let a = place(&mut core, 100.0, 100.0, 100.0, 100.0);
    core.on_pointer_down(pt(150.0, 150.0), Button::Primary, no_modifiers());
    core.on_pointer_move(pt(200.0, 150.0), no_modifiers());
    core.on_frame();
    assert_eq!(rect_of(&core, &a).x, 150.0);
    lock(&mut core, &a);
    let actions = core.on_pointer_move(pt(400.0, 150.0), no_modifiers());
    assert!(has_capture_released(&actions));
    core.on_frame();
    core.on_pointer_up(pt(400.0, 150.0), Button::Primary, no_modifiers());
    assert_eq!(rect_of(&core, &a).x, 150.0);
}

// =============================================================
// Resize
// =============================================================

fn selected_widget(core: &mut EngineCore) -> WidgetId {
    let a = place(core, 100.0, 100.0, 200.0, 100.0);
    click(core, pt(200.0, 150.0));
    assert_eq!(core.selection.primary(), Some(a));
    a
}

#[test]
fn handle_press_starts_resize() {
    let mut core = engine();
    let a = selected_widget(&mut core);
    let actions = core.on_pointer_down(pt(300.0, 200.0), Button::Primary, no_modifiers());
    assert!(matches!(core.input, InputState::Resizing { id, anchor: ResizeAnchor::Se, .. } if id == a));
    assert!(has_action(&actions, |a| *a == Action::SetCursor("nwse-resize".into())));
}

#[test]
fn resize_se_grows_width_and_height() {
    let mut core = engine();
    let a = selected_widget(&mut core);
    gesture(&mut core, pt(300.0, 200.0), pt(350.0, 260.0));
    assert_eq!(rect_of(&core, &a), Rect::new(100.0, 100.0, 250.0, 160.0));
}

#[test]
fn resize_nw_moves_origin() {
    let mut core = engine();
    let a = selected_widget(&mut core);
    gesture(&mut core, pt(100.0, 100.0), pt(80.0, 70.0));
    assert_eq!(rect_of(&core, &a), Rect::new(80.0, 70.0, 220.0, 130.0));
}

#[test]
fn resize_never_goes_below_minimum() {
    let mut core = engine();
    let a = selected_widget(&mut core);
    gesture(&mut core, pt(300.0, 200.0), pt(0.0, 0.0));
    let r = rect_of(&core, &a);
    assert_eq!((r.width, r.height), (50.0, 50.0));
    assert_eq!((r.x, r.y), (100.0, 100.0));
}

#[test]
fn resize_never_leaves_surface() {
    let mut core = engine();
    let a = selected_widget(&mut core);
    gesture(&mut core, pt(300.0, 200.0), pt(5000.0, 5000.0));
    assert_in_bounds(&core, &a);
    assert_eq!(rect_of(&core, &a), Rect::new(100.0, 100.0, 900.0, 700.0));
}

#[test]
fn grid_resize_is_aligned() {
    let mut core = grid_engine(1000.0, 800.0);
    let a = selected_widget(&mut core);
    gesture(&mut core, pt(300.0, 200.0), pt(327.0, 233.0));
    let r = rect_of(&core, &a);
    assert_eq!(r, Rect::new(100.0, 100.0, 220.0, 140.0));
    for v in [r.x, r.y, r.width, r.height] {
        assert_eq!(v % 20.0, 0.0);
    }
}

#[test]
fn resize_after_enabling_grid_aligns_off_grid_widget() {
    let mut core = engine();
    let a = place(&mut core, 15.0, 15.0, 100.0, 100.0);
    click(&mut core, pt(65.0, 65.0));
    core.set_grid(true, 20.0).unwrap();
    gesture(&mut core, pt(115.0, 115.0), pt(160.0, 115.0));
    let r = rect_of(&core, &a);
    assert_eq!(r, Rect::new(20.0, 20.0, 140.0, 100.0));
    for v in [r.x, r.y, r.width, r.height] {
        assert_eq!(v % 20.0, 0.0);
    }
}

#[test]
fn resize_grows_undersized_widget_at_far_edge() {
    let mut core = engine();
    let a = place(&mut core, 970.0, 100.0, 30.0, 30.0);
    click(&mut core, pt(985.0, 115.0));
    gesture(&mut core, pt(1000.0, 130.0), pt(1010.0, 140.0));
    assert_eq!(rect_of(&core, &a), Rect::new(950.0, 100.0, 50.0, 50.0));
    assert_in_bounds(&core, &a);
}

#[test]
fn edge_press_near_corner_redirects() {
    let mut core = engine();
    selected_widget(&mut core);
    core.on_pointer_down(pt(107.0, 100.0), Button::Primary, no_modifiers());
    assert!(matches!(core.input, InputState::Resizing { anchor: ResizeAnchor::Nw, .. }));
}

#[test]
fn locked_widget_cannot_be_resized() {
    let mut core = engine();
    let a = selected_widget(&mut core);
    lock(&mut core, &a);
    let before = rect_of(&core, &a);
    gesture(&mut core, pt(300.0, 200.0), pt(400.0, 300.0));
    assert_eq!(rect_of(&core, &a), before);
}

// =============================================================
// Commands: duplicate / delete / clipboard
// =============================================================

#[test]
fn duplicate_offsets_copy_and_selects_it() {
    let mut core = engine();
    let a = place(&mut core, 100.0, 100.0, 100.0, 100.0);
    core.selection.select_single(a);
    let actions = core.execute(Command::Duplicate);
    assert!(has_widget_created(&actions));
    let copy = core.selection.primary().unwrap();
    assert_ne!(copy, a);
    assert_eq!(rect_of(&core, &copy), Rect::new(120.0, 120.0, 100.0, 100.0));
    assert_eq!(core.widget(&copy).unwrap().z_index(), 1);
}

#[test]
fn duplicate_shortcut_matches_command() {
    let mut by_menu = engine();
    let a = place(&mut by_menu, 100.0, 100.0, 100.0, 100.0);
    by_menu.selection.select_single(a);
    by_menu.execute(Command::Duplicate);

    let mut by_key = engine();
    let b = place(&mut by_key, 100.0, 100.0, 100.0, 100.0);
    by_key.selection.select_single(b);
    by_key.on_key_down(Key::new("d"), ctrl_modifier());

    let menu_copy = rect_of(&by_menu, &by_menu.selection.primary().unwrap());
    let key_copy = rect_of(&by_key, &by_key.selection.primary().unwrap());
    assert_eq!(menu_copy, key_copy);
    assert_eq!(by_menu.store.len(), by_key.store.len());
}

#[test]
fn duplicate_is_clamped_inside_surface() {
    let mut core = engine();
    let a = place(&mut core, 900.0, 700.0, 100.0, 100.0);
    core.selection.select_single(a);
    core.execute(Command::Duplicate);
    let copy = core.selection.primary().unwrap();
    assert_eq!((rect_of(&core, &copy).x, rect_of(&core, &copy).y), (900.0, 700.0));
}

#[test]
fn duplicate_with_empty_selection_is_noop() {
    let mut core = engine();
    place(&mut core, 0.0, 0.0, 100.0, 100.0);
    assert!(core.execute(Command::Duplicate).is_empty());
    assert_eq!(core.store.len(), 1);
}

#[test]
fn delete_removes_selection_but_skips_locked() {
    let mut core = engine();
    let a = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    let b = place(&mut core, 200.0, 0.0, 100.0, 100.0);
    lock(&mut core, &b);
    core.selection.select_many(&[a, b]);
    let actions = core.on_key_down(Key::new("Delete"), no_modifiers());
    assert!(has_action(&actions, |x| *x == Action::WidgetDeleted { id: a }));
    assert!(!core.store.contains(&a));
    assert!(core.store.contains(&b));
    assert_eq!(core.selection.members(), &[b]);
}

#[test]
fn copy_paste_cascades() {
    let mut core = engine();
    let a = place(&mut core, 100.0, 100.0, 100.0, 100.0);
    core.selection.select_single(a);
    assert!(core.execute(Command::Copy).is_empty());
    core.execute(Command::Paste);
    let first = core.selection.primary().unwrap();
    core.execute(Command::Paste);
    let second = core.selection.primary().unwrap();
    assert_eq!(rect_of(&core, &first).x, 120.0);
    assert_eq!(rect_of(&core, &second).x, 140.0);
    assert_eq!(core.store.len(), 3);
}

#[test]
fn paste_with_empty_clipboard_is_noop() {
    let mut core = engine();
    assert!(core.execute(Command::Paste).is_empty());
}

#[test]
fn cut_removes_unlocked_and_paste_restores_copy() {
    let mut core = engine();
    let a = place(&mut core, 100.0, 100.0, 100.0, 100.0);
    core.selection.select_single(a);
    core.on_key_down(Key::new("x"), ctrl_modifier());
    assert!(!core.store.contains(&a));
    core.on_key_down(Key::new("v"), ctrl_modifier());
    assert_eq!(core.store.len(), 1);
    let pasted = core.selection.primary().unwrap();
    assert_ne!(pasted, a);
}

#[test]
fn pasted_copies_leave_their_group() {
    let mut core = engine();
    let a = place(&mut core, 100.0, 100.0, 100.0, 100.0);
    core.selection.select_single(a);
    core.execute(Command::GroupSelection);
    core.execute(Command::Duplicate);
    let copy = core.selection.primary().unwrap();
    assert!(core.widget(&copy).unwrap().properties.group_id.is_none());
}

// =============================================================
// Commands: selection
// =============================================================

#[test]
fn select_all_takes_visible_widgets_of_active_page() {
    let mut core = engine();
    let a = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    let b = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    core.update_widget(&b, PartialWidget::props(json!({ "hidden": true })));
    core.add_widget(PlacedWidget::new("page-2", "text", 0.0, 0.0));
    core.on_key_down(Key::new("a"), ctrl_modifier());
    assert_eq!(core.selection.members(), &[a]);
}

#[test]
fn escape_deselects_without_cancelling_gesture() {
    let mut core = engine();
    let a = place(&mut core, 100.0, 100.0, 100.0, 100.0);
    core.on_pointer_down(pt(150.0, 150.0), Button::Primary, no_modifiers());
    core.on_key_down(Key::new("Escape"), no_modifiers());
    assert!(core.selection.is_empty());
    assert_eq!(core.input.target(), Some(a));
    core.on_pointer_move(pt(250.0, 150.0), no_modifiers());
    core.on_pointer_up(pt(250.0, 150.0), Button::Primary, no_modifiers());
    assert_eq!(rect_of(&core, &a).x, 200.0);
}

// =============================================================
// Commands: layering
// =============================================================

#[test]
fn bring_to_front_command_twice_keeps_order() {
    let mut core = engine();
    let a = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    place(&mut core, 0.0, 0.0, 100.0, 100.0);
    place(&mut core, 0.0, 0.0, 100.0, 100.0);
    core.selection.select_single(a);
    core.execute(Command::BringToFront);
    let once: Vec<WidgetId> = core.store.sorted_page(core.active_page()).iter().map(|w| w.id).collect();
    assert!(core.execute(Command::BringToFront).is_empty());
    let twice: Vec<WidgetId> = core.store.sorted_page(core.active_page()).iter().map(|w| w.id).collect();
    assert_eq!(once, twice);
    assert_eq!(once.last(), Some(&a));
}

#[test]
fn bring_forward_shortcut_swaps_both_sides() {
    let mut core = engine();
    let a = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    let b = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    core.selection.select_single(a);
    let actions = core.on_key_down(Key::new("]"), ctrl_modifier());
    let updates = actions.iter().filter(|x| matches!(x, Action::WidgetUpdated { .. })).count();
    assert_eq!(updates, 2);
    assert_eq!(core.widget(&a).unwrap().z_index(), 1);
    assert_eq!(core.widget(&b).unwrap().z_index(), 0);
}

#[test]
fn send_to_back_multi_preserves_relative_order() {
    let mut core = engine();
    let a = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    let b = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    let c = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    core.selection.select_many(&[c, b]);
    core.execute(Command::SendToBack);
    let order: Vec<WidgetId> = core.store.sorted_page(core.active_page()).iter().map(|w| w.id).collect();
    assert_eq!(order, vec![b, c, a]);
}

// =============================================================
// Commands: grouping, lock, hide, nudge
// =============================================================

#[test]
fn group_selection_then_ungroup() {
    let mut core = engine();
    let a = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    let b = place(&mut core, 200.0, 0.0, 100.0, 100.0);
    core.selection.select_many(&[a, b]);
    core.on_key_down(Key::new("g"), ctrl_modifier());
    let gid = core.widget(&a).unwrap().properties.group_id.unwrap();
    assert_eq!(core.widget(&b).unwrap().properties.group_id, Some(gid));
    assert_eq!(core.groups.get(&gid).unwrap().name, "Group 1");

    core.on_key_down(Key::new("G"), Modifiers { ctrl: true, shift: true, ..Default::default() });
    assert!(core.widget(&a).unwrap().properties.group_id.is_none());
    assert!(core.widget(&b).unwrap().properties.group_name.is_none());
    assert!(core.groups.get(&gid).is_none());
}

#[test]
fn rename_group_reaches_exactly_its_members() {
    let mut core = engine();
    let gid = core.create_group("Before");
    let members: Vec<WidgetId> = (0..3).map(|_| place(&mut core, 0.0, 0.0, 100.0, 100.0)).collect();
    for m in &members {
        core.add_to_group(&gid, m);
    }
    let outsider = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    let actions = core.rename_group(&gid, "After");
    let updates = actions.iter().filter(|x| matches!(x, Action::WidgetUpdated { .. })).count();
    assert_eq!(updates, 3);
    for m in &members {
        assert_eq!(core.widget(m).unwrap().properties.group_name.as_deref(), Some("After"));
    }
    assert!(core.widget(&outsider).unwrap().properties.group_name.is_none());
}

#[test]
fn select_group_selects_all_members() {
    let mut core = engine();
    let gid = core.create_group("G");
    let a = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    let b = place(&mut core, 200.0, 0.0, 100.0, 100.0);
    core.add_to_group(&gid, &a);
    core.add_to_group(&gid, &b);
    core.select_group(&gid);
    assert_eq!(core.selection.members(), &[a, b]);
    assert!(core.select_group(&Uuid::new_v4()).is_empty());
}

#[test]
fn translate_group_through_engine() {
    let mut core = engine();
    let gid = core.create_group("G");
    let a = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    core.add_to_group(&gid, &a);
    core.translate_group(&gid, 30.0, 40.0);
    assert_eq!((rect_of(&core, &a).x, rect_of(&core, &a).y), (30.0, 40.0));
    core.remove_from_group(&a);
    assert!(core.translate_group(&gid, 30.0, 40.0).is_empty());
}

#[test]
fn toggle_lock_flips_selection() {
    let mut core = engine();
    let a = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    core.selection.select_single(a);
    core.execute(Command::ToggleLock);
    assert!(core.widget(&a).unwrap().is_locked());
    core.execute(Command::ToggleLock);
    assert!(!core.widget(&a).unwrap().is_locked());
}

#[test]
fn toggle_hide_removes_from_selection() {
    let mut core = engine();
    let a = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    core.selection.select_single(a);
    let actions = core.execute(Command::ToggleHide);
    assert!(core.widget(&a).unwrap().is_hidden());
    assert!(core.selection.is_empty());
    assert!(has_action(&actions, |x| matches!(x, Action::SelectionChanged { .. })));
}

#[test]
fn nudge_moves_by_one_or_grid_step() {
    let mut core = engine();
    let a = place(&mut core, 100.0, 100.0, 100.0, 100.0);
    core.selection.select_single(a);
    core.on_key_down(Key::new("ArrowRight"), no_modifiers());
    assert_eq!(rect_of(&core, &a).x, 101.0);
    core.on_key_down(Key::new("ArrowUp"), shift_modifier());
    assert_eq!(rect_of(&core, &a).y, 80.0);
}

#[test]
fn nudge_in_grid_mode_uses_grid_step() {
    let mut core = grid_engine(1000.0, 800.0);
    let a = place(&mut core, 100.0, 100.0, 100.0, 100.0);
    core.selection.select_single(a);
    core.on_key_down(Key::new("ArrowLeft"), no_modifiers());
    assert_eq!(rect_of(&core, &a).x, 80.0);
}

#[test]
fn nudge_at_edge_is_noop_and_skips_locked() {
    let mut core = engine();
    let a = place(&mut core, 900.0, 0.0, 100.0, 100.0);
    core.selection.select_single(a);
    assert!(core.on_key_down(Key::new("ArrowRight"), no_modifiers()).is_empty());
    lock(&mut core, &a);
    assert!(core.on_key_down(Key::new("ArrowLeft"), no_modifiers()).is_empty());
    assert_eq!(rect_of(&core, &a).x, 900.0);
}

// =============================================================
// Pages and snapshots
// =============================================================

#[test]
fn switching_page_cancels_gesture_and_selection() {
    let mut core = engine();
    place(&mut core, 0.0, 0.0, 100.0, 100.0);
    core.on_pointer_down(pt(50.0, 50.0), Button::Primary, no_modifiers());
    let actions = core.set_active_page("page-2");
    assert!(has_capture_released(&actions));
    assert!(!core.input.is_active());
    assert!(core.selection.is_empty());
    click(&mut core, pt(50.0, 50.0));
    assert!(core.selection.surface_selected());
}

#[test]
fn snapshot_json_round_trips_into_fresh_engine() {
    let mut core = engine();
    let gid = core.create_group("Sales");
    core.drop_widget("kpi-card", pt(40.0, 40.0));
    let id = core.selection.primary().unwrap();
    core.add_to_group(&gid, &id);
    core.update_widget(&id, PartialWidget::props(json!({ "title": "Revenue" })));
    let json = core.snapshot_json(DEFAULT_PAGE).unwrap();

    let mut other = engine();
    other.load_snapshot_json(&json).unwrap();
    assert_eq!(other.snapshot(DEFAULT_PAGE), core.snapshot(DEFAULT_PAGE));
    assert_eq!(other.groups.get(&gid).unwrap().name, "Sales");
}

#[test]
fn load_snapshot_json_rejects_garbage() {
    let mut core = engine();
    let err = core.load_snapshot_json("{ not json").unwrap_err();
    assert!(matches!(err, EngineError::Snapshot(_)));
}

#[test]
fn load_snapshot_json_keeps_page_with_malformed_group_id() {
    let mut core = engine();
    let json = json!([
        { "id": Uuid::new_v4(), "pageId": DEFAULT_PAGE, "type": "text", "x": 0, "y": 0,
          "properties": { "groupId": "g-1", "groupName": "Old" } },
        { "id": Uuid::new_v4(), "pageId": DEFAULT_PAGE, "type": "table", "x": 200, "y": 0 }
    ])
    .to_string();
    core.load_snapshot_json(&json).unwrap();
    assert_eq!(core.snapshot(DEFAULT_PAGE).len(), 2);
    assert!(core.groups.groups().is_empty());
}

#[test]
fn load_snapshot_drops_stale_selection() {
    let mut core = engine();
    let a = place(&mut core, 0.0, 0.0, 100.0, 100.0);
    core.selection.select_single(a);
    core.load_snapshot(Vec::new());
    assert!(core.selection.is_empty());
}

#[test]
fn update_widget_missing_id_is_silent() {
    let mut core = engine();
    assert!(core.update_widget(&Uuid::new_v4(), PartialWidget::position(1.0, 1.0)).is_empty());
    assert!(core.remove_widget(&Uuid::new_v4()).is_empty());
}
