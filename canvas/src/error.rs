//! Errors raised at the engine's construction and snapshot boundaries.
//!
//! Interactive operations never fail: a missing widget id is a silent no-op
//! and an unknown type tag falls back to a default footprint. Only building a
//! [`crate::surface::Surface`] and moving snapshots across the JSON boundary
//! can produce an [`EngineError`].

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid surface dimensions: {width}x{height}")]
    InvalidSurface { width: f64, height: f64 },
    #[error("invalid grid size: {0}")]
    InvalidGridSize(f64),
    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}
