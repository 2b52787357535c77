use thiserror::Error;

use crate::round::Status;

/// Errors raised while setting up or driving a round.
///
/// Per-tick conditions (a wall-blocked move, a pursuer with nowhere to go)
/// are not errors and never show up here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("maze of {rows}x{cols} is too small, need at least {min}x{min}")]
    InvalidDimensions { rows: usize, cols: usize, min: usize },

    #[error("cannot place {requested} collectibles, only {available} eligible cells")]
    InsufficientSpace { requested: usize, available: usize },

    #[error("cannot {command} while round is {from}")]
    InvalidTransition { from: Status, command: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

pub type GameResult<T> = Result<T, GameError>;

/// Returned when an input token is not one of `up`, `down`, `left`, `right`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown direction `{0}`")]
pub struct ParseDirError(pub String);
