//! Canvas layout engine for the report builder.
//!
//! This crate owns the collection of widgets placed on a report page and every
//! interaction that changes their geometry or stacking: drop-to-create,
//! drag-translation, eight-handle resize, single and multi selection, z-order
//! layering and grouping. It never draws widget *content*; each widget body is
//! delegated to an opaque renderer keyed by its type tag. The host is
//! responsible for wiring pointer/keyboard events into [`engine::EngineCore`],
//! scheduling [`engine::EngineCore::on_frame`] when asked to, and persisting
//! the snapshots the engine hands back.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Surface controller: wires input to the controllers below |
//! | [`doc`] | Placed widgets, the typed property bag, and the widget store |
//! | [`catalog`] | Static widget catalog: labels, icons, default footprints |
//! | [`surface`] | Surface geometry, grid snap, and bounds clamping |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Hit-testing widget bodies and resize handles |
//! | [`drag`] | Drag controller |
//! | [`resize`] | Resize controller |
//! | [`selection`] | Primary/multi selection and its bounding rectangle |
//! | [`layering`] | Bring-to-front/back and step forward/backward |
//! | [`group`] | Named widget groups with scan-derived membership |
//! | [`frame`] | Once-per-frame coalescing of gesture geometry |
//! | [`command`] | Command set shared by menus and keyboard shortcuts |
//! | [`render`] | Z-ordered scene list, selection overlay, body renderers |
//! | [`consts`] | Shared numeric constants (minimum size, handle slop, etc.) |
//! | [`error`] | Construction and snapshot errors |

pub mod catalog;
pub mod command;
pub mod consts;
pub mod doc;
pub mod drag;
pub mod engine;
pub mod error;
pub mod frame;
pub mod group;
pub mod hit;
pub mod input;
pub mod layering;
pub mod render;
pub mod resize;
pub mod selection;
pub mod surface;
