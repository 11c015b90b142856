//! Surface geometry: points, rectangles, grid snapping and bounds clamping.
//!
//! All widget geometry lives in surface-local units with the origin at the
//! surface's top-left corner. Pointer events arrive in viewport coordinates
//! and are converted with [`Surface::to_local`] before any controller sees
//! them.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_GRID_SIZE;
use crate::error::EngineError;

/// A point in either viewport or surface-local space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in surface-local units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.right() && pt.y >= self.y && pt.y <= self.bottom()
    }

    /// Smallest rectangle covering both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = self.right().max(other.right());
        let max_y = self.bottom().max(other.bottom());
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// The 2D area widgets are placed on.
///
/// `origin_x` / `origin_y` locate the surface's top-left corner in viewport
/// coordinates. Grid mode rounds positions and sizes to multiples of
/// `grid_size` while `grid_enabled` is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub origin_x: f64,
    #[serde(default)]
    pub origin_y: f64,
    #[serde(default = "default_grid_size")]
    pub grid_size: f64,
    #[serde(default)]
    pub grid_enabled: bool,
}

fn default_grid_size() -> f64 {
    DEFAULT_GRID_SIZE
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            origin_x: 0.0,
            origin_y: 0.0,
            grid_size: DEFAULT_GRID_SIZE,
            grid_enabled: false,
        }
    }
}

impl Surface {
    /// Build a surface of the given size with grid mode off.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSurface` if either dimension is not a positive finite number.
    pub fn new(width: f64, height: f64) -> Result<Self, EngineError> {
        let surface = Self { width, height, ..Self::default() };
        surface.validate()?;
        Ok(surface)
    }

    /// Move the surface's top-left corner to `(x, y)` in viewport coordinates.
    #[must_use]
    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }

    /// Enable grid mode with the given unit.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGridSize` if `size` is not a positive finite number.
    pub fn with_grid(mut self, size: f64) -> Result<Self, EngineError> {
        self.grid_size = size;
        self.grid_enabled = true;
        self.validate()?;
        Ok(self)
    }

    /// Check dimensions and grid size; used after deserializing a surface.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSurface` or `InvalidGridSize` for non-positive or non-finite values.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0) {
            return Err(EngineError::InvalidSurface { width: self.width, height: self.height });
        }
        if !(self.grid_size.is_finite() && self.grid_size > 0.0) {
            return Err(EngineError::InvalidGridSize(self.grid_size));
        }
        Ok(())
    }

    /// The active grid unit, or `None` when grid mode is off.
    #[must_use]
    pub fn grid(&self) -> Option<f64> {
        (self.grid_enabled && self.grid_size > 0.0).then_some(self.grid_size)
    }

    /// The surface as a rectangle in its own coordinate space.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Convert a viewport point to surface-local coordinates.
    #[must_use]
    pub fn to_local(&self, viewport: Point) -> Point {
        Point::new(viewport.x - self.origin_x, viewport.y - self.origin_y)
    }

    /// Whether a surface-local point lies on the surface.
    #[must_use]
    pub fn contains(&self, local: Point) -> bool {
        self.bounds().contains(local)
    }

    /// Round to the nearest grid multiple; identity when grid mode is off.
    #[must_use]
    pub fn snap(&self, v: f64) -> f64 {
        match self.grid() {
            Some(g) => snap_to(v, g),
            None => v,
        }
    }

    /// Round up to the next grid multiple; identity when grid mode is off.
    #[must_use]
    pub fn snap_up(&self, v: f64) -> f64 {
        match self.grid() {
            Some(g) => (v / g).ceil() * g,
            None => v,
        }
    }

    /// Clamp a top-left position so a `width x height` footprint stays on the surface.
    ///
    /// A footprint larger than the surface is pinned to the origin on that axis.
    #[must_use]
    pub fn clamp_position(&self, x: f64, y: f64, width: f64, height: f64) -> Point {
        Point::new(clamp_axis(x, width, self.width), clamp_axis(y, height, self.height))
    }

    /// Snap a position to the grid, then keep it on the surface.
    ///
    /// When snapping to the nearest multiple would overflow the far edge, the
    /// position steps down to the largest multiple that still fits, so the
    /// result is both grid-aligned and in bounds whenever that is possible.
    #[must_use]
    pub fn settle(&self, x: f64, y: f64, width: f64, height: f64) -> Point {
        match self.grid() {
            Some(g) => Point::new(settle_axis(x, width, self.width, g), settle_axis(y, height, self.height, g)),
            None => self.clamp_position(x, y, width, height),
        }
    }
}

/// Round `v` to the nearest multiple of `g`.
#[must_use]
pub fn snap_to(v: f64, g: f64) -> f64 {
    (v / g).round() * g
}

/// Round `v` down to a multiple of `g`.
#[must_use]
pub fn floor_to(v: f64, g: f64) -> f64 {
    (v / g).floor() * g
}

fn clamp_axis(pos: f64, extent: f64, limit: f64) -> f64 {
    let max = (limit - extent).max(0.0);
    pos.min(max).max(0.0)
}

/// Snap `pos` to the grid, stepping down a multiple when `extent` would overflow `limit`.
pub(crate) fn settle_axis(pos: f64, extent: f64, limit: f64, g: f64) -> f64 {
    let max = (limit - extent).max(0.0);
    let snapped = snap_to(pos, g);
    if snapped > max {
        floor_to(max, g).max(0.0)
    } else {
        snapped.max(0.0)
    }
}
