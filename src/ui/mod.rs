//! Terminal presentation: tile layout, key bindings and the crossterm renderer.

pub mod layout;
pub mod render;

use crossterm::event::KeyCode;

use crate::maze::Dir;
use crate::round::{GameEvent, LossReason};

/// Arrow keys, vi keys and WASD.
pub fn dir_for_key(code: KeyCode) -> Option<Dir> {
    match code {
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => Some(Dir::Up),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => Some(Dir::Down),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') => Some(Dir::Left),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') => Some(Dir::Right),
        _ => None,
    }
}

/// Status-line text for an event.
pub fn event_message(event: &GameEvent) -> String {
    match *event {
        GameEvent::CollectibleCollected { collected, total, .. } => {
            format!("Collected {collected} of {total}")
        }
        GameEvent::LevelWon { level } => {
            format!("Level {level} cleared! Enter for the next level")
        }
        GameEvent::LevelLost { reason: LossReason::Caught, .. } => {
            "The hunter caught you. Enter or r to retry".to_string()
        }
        GameEvent::LevelLost { reason: LossReason::GoalReached, .. } => {
            "The hunter reached the core. Enter or r to retry".to_string()
        }
        GameEvent::ProximityWarning { distance } => format!("Hunter {distance} cells away!"),
    }
}
