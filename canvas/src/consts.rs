//! Shared numeric constants for the canvas crate.

// ── Geometry ────────────────────────────────────────────────────

/// Smallest width or height a resize gesture may produce, in surface units.
pub const MIN_WIDGET_SIZE: f64 = 50.0;

/// Footprint used when a widget has no size and its type is not in the catalog.
pub const FALLBACK_WIDTH: f64 = 200.0;

/// See [`FALLBACK_WIDTH`].
pub const FALLBACK_HEIGHT: f64 = 150.0;

/// Additive `(x, y)` offset applied to duplicated and pasted widgets.
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// Default grid unit when grid mode is switched on without an explicit size.
pub const DEFAULT_GRID_SIZE: f64 = 20.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Half-size of the square hit zone around each corner handle.
pub const HANDLE_RADIUS: f64 = 6.0;

/// Distance from a border within which the pointer grabs an edge handle.
pub const EDGE_GRIP: f64 = 4.0;

/// Distance from either end of an edge within which an edge handle becomes
/// the adjacent corner handle.
pub const CORNER_REDIRECT_ZONE: f64 = 8.0;

// ── Overlay ─────────────────────────────────────────────────────

/// Vertical gap between the selection box and the floating toolbar anchor.
pub const TOOLBAR_GAP: f64 = 8.0;

// ── Keyboard ────────────────────────────────────────────────────

/// Arrow-key nudge step when grid mode is off and Shift is not held.
pub const NUDGE_STEP: f64 = 1.0;

// ── Pages ───────────────────────────────────────────────────────

/// Page the engine starts on before the host switches pages.
pub const DEFAULT_PAGE: &str = "page-1";
