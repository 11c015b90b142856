//! Surface settings loaded from `REPORTBOARD_*` environment variables.
//!
//! Command-line flags are applied on top with [`SurfaceConfig::with_overrides`].
//! A variable that is set but malformed is a [`HostError::Config`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;

use canvas::consts::DEFAULT_GRID_SIZE;
use canvas::surface::Surface;

use crate::error::HostError;

pub const DEFAULT_SURFACE_WIDTH: f64 = 1280.0;
pub const DEFAULT_SURFACE_HEIGHT: f64 = 720.0;

pub const ENV_SURFACE_WIDTH: &str = "REPORTBOARD_SURFACE_WIDTH";
pub const ENV_SURFACE_HEIGHT: &str = "REPORTBOARD_SURFACE_HEIGHT";
pub const ENV_GRID_SIZE: &str = "REPORTBOARD_GRID_SIZE";
pub const ENV_GRID: &str = "REPORTBOARD_GRID";

/// Surface dimensions and grid mode for the engine the host builds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceConfig {
    pub width: f64,
    pub height: f64,
    pub grid_size: f64,
    pub grid_enabled: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_SURFACE_WIDTH,
            height: DEFAULT_SURFACE_HEIGHT,
            grid_size: DEFAULT_GRID_SIZE,
            grid_enabled: false,
        }
    }
}

impl SurfaceConfig {
    /// Read every variable from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `Config` naming the first variable that is set but malformed.
    pub fn from_env() -> Result<Self, HostError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read every variable through `lookup`; unset variables take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Config` naming the first variable that is set but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, HostError> {
        let defaults = Self::default();
        Ok(Self {
            width: parse_var(&lookup, ENV_SURFACE_WIDTH, defaults.width)?,
            height: parse_var(&lookup, ENV_SURFACE_HEIGHT, defaults.height)?,
            grid_size: parse_var(&lookup, ENV_GRID_SIZE, defaults.grid_size)?,
            grid_enabled: match lookup(ENV_GRID) {
                Some(raw) => parse_switch(ENV_GRID, &raw)?,
                None => defaults.grid_enabled,
            },
        })
    }

    /// Apply command-line flags; `None` keeps the environment's value.
    #[must_use]
    pub fn with_overrides(mut self, grid: Option<bool>, grid_size: Option<f64>) -> Self {
        if let Some(enabled) = grid {
            self.grid_enabled = enabled;
        }
        if let Some(size) = grid_size {
            self.grid_size = size;
        }
        self
    }

    /// Build and validate the engine surface.
    ///
    /// # Errors
    ///
    /// Returns `Engine` if a dimension or the grid size is not positive and finite.
    pub fn surface(&self) -> Result<Surface, HostError> {
        let mut surface = Surface::new(self.width, self.height)?;
        surface.grid_size = self.grid_size;
        surface.grid_enabled = self.grid_enabled;
        surface.validate()?;
        Ok(surface)
    }
}

/// Parse the variable `key`, falling back to `default` when unset.
fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, HostError> {
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| HostError::Config { var: key, value: raw }),
        None => Ok(default),
    }
}

fn parse_switch(key: &'static str, raw: &str) -> Result<bool, HostError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        _ => Err(HostError::Config { var: key, value: raw.to_string() }),
    }
}
