//! Command set shared by the context menu and keyboard shortcuts.
//!
//! Both invocation paths produce a [`Command`] and hand it to
//! [`EngineCore::execute`](crate::engine::EngineCore::execute); there is no
//! synthetic key event in between, so a menu "Duplicate" and Ctrl+D behave
//! identically against the current selection.

#[cfg(test)]
#[path = "command_test.rs"]
mod command_test;

use serde::{Deserialize, Serialize};

use crate::input::{Key, Modifiers};

/// Arrow-key direction for nudging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Unit vector on the surface (y grows downward).
    #[must_use]
    pub fn unit(self) -> (f64, f64) {
        match self {
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
            Self::Up => (0.0, -1.0),
            Self::Down => (0.0, 1.0),
        }
    }
}

/// Operations that act on the current selection.
///
/// Serialized in `snake_case` so hosts can name commands in menus and scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Copy,
    Cut,
    Paste,
    Duplicate,
    Delete,
    SelectAll,
    Deselect,
    BringToFront,
    SendToBack,
    BringForward,
    SendBackward,
    GroupSelection,
    Ungroup,
    ToggleLock,
    ToggleHide,
    /// Move the selection one step; `coarse` steps by the grid size.
    Nudge { direction: Direction, coarse: bool },
}

/// Map a key press to a command. `None` if the combination is unbound.
///
/// `key` is the host's key name (`"d"`, `"Delete"`, `"ArrowLeft"`, ...).
#[must_use]
pub fn resolve(key: &Key, modifiers: Modifiers) -> Option<Command> {
    let key = key.0.as_str();
    let cmd = modifiers.command();

    if let Some(direction) = arrow(key) {
        return Some(Command::Nudge { direction, coarse: modifiers.shift });
    }

    if cmd && modifiers.shift {
        return match key {
            "g" | "G" => Some(Command::Ungroup),
            "l" | "L" => Some(Command::ToggleLock),
            "h" | "H" => Some(Command::ToggleHide),
            "[" | "{" => Some(Command::SendToBack),
            "]" | "}" => Some(Command::BringToFront),
            _ => None,
        };
    }

    if cmd {
        return match key {
            "c" | "C" => Some(Command::Copy),
            "x" | "X" => Some(Command::Cut),
            "v" | "V" => Some(Command::Paste),
            "d" | "D" => Some(Command::Duplicate),
            "a" | "A" => Some(Command::SelectAll),
            "g" | "G" => Some(Command::GroupSelection),
            "[" => Some(Command::SendBackward),
            "]" => Some(Command::BringForward),
            _ => None,
        };
    }

    match key {
        "Delete" | "Backspace" => Some(Command::Delete),
        "Escape" => Some(Command::Deselect),
        _ => None,
    }
}

fn arrow(key: &str) -> Option<Direction> {
    match key {
        "ArrowLeft" => Some(Direction::Left),
        "ArrowRight" => Some(Direction::Right),
        "ArrowUp" => Some(Direction::Up),
        "ArrowDown" => Some(Direction::Down),
        _ => None,
    }
}
