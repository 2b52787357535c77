//! A maze-chase game core.
//!
//! A player walks a randomly generated perfect maze collecting items while a
//! hunter roams the corridors trying to catch them or reach the maze centre.
//! [`round::RoundController`] owns one game and is driven tick by tick; the
//! terminal front end in [`ui`] only reads its state and the events it emits.
//!
//! ```
//! use std::time::Duration;
//! use maze_hunt::{Dir, GameConfig, RoundController, Status};
//!
//! let config = GameConfig { seed: Some(7), ..GameConfig::default() };
//! let mut round = RoundController::new(config).unwrap();
//! round.start().unwrap();
//! round.queue_input(Dir::Right);
//! let _events = round.tick(Duration::from_millis(70));
//! assert_eq!(round.status(), Status::Active);
//! ```

pub mod config;
pub mod error;
pub mod items;
pub mod maze;
pub mod player;
pub mod pursuer;
pub mod round;
pub mod ui;

pub use config::{CollectibleRule, GameConfig};
pub use error::{GameError, GameResult};
pub use maze::{Dir, Maze, Pos};
pub use round::{GameEvent, RoundController, RoundSnapshot, Status};
