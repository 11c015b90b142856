//! Interaction scripts: host events recorded as JSON and replayed against an
//! [`EngineCore`], the way a browser host would feed them in.
//!
//! ```json
//! {
//!   "events": [
//!     { "op": "drop", "kind": "bar-chart", "x": 40, "y": 40 },
//!     { "op": "down", "x": 100, "y": 100 },
//!     { "op": "move", "x": 220, "y": 160 },
//!     { "op": "frame" },
//!     { "op": "up", "x": 220, "y": 160 },
//!     { "op": "key", "key": "d", "modifiers": { "ctrl": true } },
//!     { "op": "command", "command": "bring_to_front" }
//!   ]
//! }
//! ```

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

use canvas::command::Command;
use canvas::consts::DEFAULT_GRID_SIZE;
use canvas::doc::PlacedWidget;
use canvas::engine::{Action, EngineCore};
use canvas::input::{Button, Key, Modifiers};
use canvas::surface::Point;
use serde::Deserialize;

use crate::error::HostError;

/// A replayable session: an optional starting snapshot, page, and events.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Widgets loaded before the first event.
    #[serde(default)]
    pub snapshot: Vec<PlacedWidget>,
    /// Page to activate before the first event.
    #[serde(default)]
    pub page: Option<String>,
    pub events: Vec<Event>,
}

/// One host event. Coordinates are viewport coordinates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Event {
    Drop {
        kind: String,
        x: f64,
        y: f64,
    },
    Down {
        x: f64,
        y: f64,
        #[serde(default)]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Move {
        x: f64,
        y: f64,
    },
    /// The animation frame the engine asked for.
    Frame,
    Up {
        x: f64,
        y: f64,
        #[serde(default)]
        button: Button,
    },
    /// Pointer down and up at the same spot.
    Click {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Command {
        command: Command,
    },
    Page {
        id: String,
    },
    Grid {
        enabled: bool,
        #[serde(default = "default_grid_size")]
        size: f64,
    },
}

fn default_grid_size() -> f64 {
    DEFAULT_GRID_SIZE
}

/// Tally of what a replay did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub events: usize,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub frames_requested: usize,
    pub captures: usize,
}

impl ReplayReport {
    fn record(&mut self, actions: &[Action]) {
        for action in actions {
            match action {
                Action::WidgetCreated(_) => self.created += 1,
                Action::WidgetUpdated { .. } => self.updated += 1,
                Action::WidgetDeleted { .. } => self.deleted += 1,
                Action::FrameRequested => self.frames_requested += 1,
                Action::CaptureStarted => self.captures += 1,
                _ => {}
            }
        }
    }
}

impl Script {
    /// Parse a script document.
    ///
    /// # Errors
    ///
    /// Returns `Json` if the document is malformed or names an unknown event.
    pub fn from_json(json: &str) -> Result<Self, HostError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load the starting state into `core`, then feed every event in order.
    ///
    /// # Errors
    ///
    /// Returns `Script` with the event index when an event cannot be applied
    /// (an empty key name, or a grid size the engine rejects).
    pub fn run(&self, core: &mut EngineCore) -> Result<ReplayReport, HostError> {
        let mut report = ReplayReport::default();
        if !self.snapshot.is_empty() {
            report.record(&core.load_snapshot(self.snapshot.clone()));
        }
        if let Some(page) = &self.page {
            report.record(&core.set_active_page(page.clone()));
        }
        for (index, event) in self.events.iter().enumerate() {
            let actions = apply(core, event).map_err(|message| HostError::Script { index, message })?;
            tracing::debug!(index, ?event, actions = actions.len(), "event replayed");
            report.record(&actions);
            report.events += 1;
        }
        Ok(report)
    }
}

/// Feed one event to the engine.
///
/// # Errors
///
/// Returns a message describing why the event was rejected.
pub fn apply(core: &mut EngineCore, event: &Event) -> Result<Vec<Action>, String> {
    let actions = match event {
        Event::Drop { kind, x, y } => core.drop_widget(kind, Point::new(*x, *y)),
        Event::Down { x, y, button, modifiers } => core.on_pointer_down(Point::new(*x, *y), *button, *modifiers),
        Event::Move { x, y } => core.on_pointer_move(Point::new(*x, *y), Modifiers::default()),
        Event::Frame => core.on_frame(),
        Event::Up { x, y, button } => core.on_pointer_up(Point::new(*x, *y), *button, Modifiers::default()),
        Event::Click { x, y, modifiers } => {
            let at = Point::new(*x, *y);
            let mut actions = core.on_pointer_down(at, Button::Primary, *modifiers);
            actions.extend(core.on_pointer_up(at, Button::Primary, *modifiers));
            actions
        }
        Event::Key { key, modifiers } => {
            if key.is_empty() {
                return Err("empty key name".into());
            }
            core.on_key_down(Key::new(key.as_str()), *modifiers)
        }
        Event::Command { command } => core.execute(*command),
        Event::Page { id } => core.set_active_page(id.as_str()),
        Event::Grid { enabled, size } => {
            core.set_grid(*enabled, *size).map_err(|e| e.to_string())?;
            vec![Action::RenderNeeded]
        }
    };
    Ok(actions)
}
