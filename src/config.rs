use std::time::Duration;

use crate::error::{GameError, GameResult};

/// Smallest maze a round is played on: start corners and goal must differ.
pub const MIN_ROUND_DIM: usize = 5;

const DEFAULT_ROWS: usize = 11;
const DEFAULT_COLS: usize = 11;
const DEFAULT_GROWTH: usize = 1;
const DEFAULT_PURSUER_INTERVAL: u32 = 4;
const DEFAULT_PROXIMITY_RADIUS: usize = 3;
const DEFAULT_TICK_MS: u64 = 70;
const DEFAULT_RENDER_FPS: u64 = 60;

/// How many collectibles a level gets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectibleRule {
    /// One on every dead end.
    DeadEnds,
    /// `base + per_level * (level - 1)` cells, dead ends first.
    Scaled { base: usize, per_level: usize },
}

impl CollectibleRule {
    /// `None` means "no fixed count".
    pub fn count_for(&self, level: u32) -> Option<usize> {
        match *self {
            CollectibleRule::DeadEnds => None,
            CollectibleRule::Scaled { base, per_level } => {
                Some(base + per_level * level.saturating_sub(1) as usize)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    /// Maze rows on level 1.
    pub rows: usize,
    /// Maze columns on level 1.
    pub cols: usize,
    /// Rows and columns added per level.
    pub growth: usize,
    /// The pursuer decides once every this many ticks.
    pub pursuer_move_interval: u32,
    pub collectibles: CollectibleRule,
    /// Lose the round when the pursuer reaches the maze centre.
    pub goal_loss: bool,
    /// Manhattan distance at which proximity warnings start.
    pub proximity_radius: usize,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            growth: DEFAULT_GROWTH,
            pursuer_move_interval: DEFAULT_PURSUER_INTERVAL,
            collectibles: CollectibleRule::Scaled {
                base: 4,
                per_level: 1,
            },
            goal_loss: false,
            proximity_radius: DEFAULT_PROXIMITY_RADIUS,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> GameResult<()> {
        if self.rows < MIN_ROUND_DIM || self.cols < MIN_ROUND_DIM {
            return Err(GameError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
                min: MIN_ROUND_DIM,
            });
        }
        if self.pursuer_move_interval == 0 {
            return Err(GameError::InvalidConfig("pursuer move interval must be positive"));
        }
        Ok(())
    }

    /// Maze size for a 1-based level.
    pub fn dimensions_for(&self, level: u32) -> (usize, usize) {
        let extra = self.growth * level.saturating_sub(1) as usize;
        (self.rows + extra, self.cols + extra)
    }
}

/// Tick and render pacing for the terminal front end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    pub tick: Duration,
    pub frame: Duration,
}

/// Read `MAZE_HUNT_TICK_MS` and `MAZE_HUNT_FPS`, falling back to defaults
/// for missing, unparsable or zero values.
pub fn read_timing() -> Timing {
    let tick_ms = env_positive("MAZE_HUNT_TICK_MS").unwrap_or(DEFAULT_TICK_MS);
    let render_fps = env_positive("MAZE_HUNT_FPS").unwrap_or(DEFAULT_RENDER_FPS);
    Timing {
        tick: Duration::from_millis(tick_ms),
        frame: Duration::from_micros(1_000_000 / render_fps),
    }
}

fn env_positive(key: &str) -> Option<u64> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
}
