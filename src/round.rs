//! Level lifecycle: setup, per-tick updates and win/loss evaluation.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace, warn};

use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::items::{self, Collectibles};
use crate::maze::{manhattan, Dir, Maze, Pos};
use crate::player::Player;
use crate::pursuer::Pursuer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Ready,
    Active,
    Won,
    Lost,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Ready => "ready",
            Status::Active => "active",
            Status::Won => "won",
            Status::Lost => "lost",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LossReason {
    Caught,
    GoalReached,
}

/// Things that happened during a tick, for sound and UI layers to react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    CollectibleCollected {
        pos: Pos,
        collected: usize,
        total: usize,
    },
    LevelWon {
        level: u32,
    },
    LevelLost {
        level: u32,
        reason: LossReason,
    },
    ProximityWarning {
        distance: usize,
    },
}

/// Status line data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundSnapshot {
    pub level: u32,
    pub collected: usize,
    pub total: usize,
    pub status: Status,
    pub elapsed: Duration,
}

impl RoundSnapshot {
    /// `mm:ss`
    pub fn elapsed_label(&self) -> String {
        let secs = self.elapsed.as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

/// Everything that belongs to one level.
#[derive(Clone, Debug)]
struct Board {
    maze: Maze,
    player: Player,
    pursuer: Pursuer,
    items: Collectibles,
}

/// Owns the whole game state and advances it one tick at a time.
pub struct RoundController {
    config: GameConfig,
    rng: StdRng,
    status: Status,
    level: u32,
    board: Option<Board>,
    inputs: VecDeque<Dir>,
    elapsed: Duration,
    paused: bool,
    last_distance: Option<usize>,
}

impl RoundController {
    /// Validate `config` and prepare a round in [`Status::Ready`].
    ///
    /// A configured seed makes every maze, placement and pursuer decision
    /// reproducible.
    pub fn new(config: GameConfig) -> GameResult<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            rng,
            status: Status::Ready,
            level: 1,
            board: None,
            inputs: VecDeque::new(),
            elapsed: Duration::ZERO,
            paused: false,
            last_distance: None,
        })
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn maze(&self) -> Option<&Maze> {
        self.board.as_ref().map(|b| &b.maze)
    }

    pub fn player_pos(&self) -> Option<Pos> {
        self.board.as_ref().map(|b| b.player.pos())
    }

    pub fn pursuer(&self) -> Option<&Pursuer> {
        self.board.as_ref().map(|b| &b.pursuer)
    }

    pub fn collectibles(&self) -> Option<&Collectibles> {
        self.board.as_ref().map(|b| &b.items)
    }

    /// Ready → Active.
    pub fn start(&mut self) -> GameResult<()> {
        self.expect_status(Status::Ready, "start")?;
        let board = self.build_board(1)?;
        self.begin(1, board);
        Ok(())
    }

    /// Won → Active on a larger maze.
    pub fn next_level(&mut self) -> GameResult<()> {
        self.expect_status(Status::Won, "advance")?;
        let level = self.level + 1;
        let board = self.build_board(level)?;
        self.begin(level, board);
        Ok(())
    }

    /// Back to level 1 from any state.
    pub fn restart(&mut self) -> GameResult<()> {
        let board = self.build_board(1)?;
        self.begin(1, board);
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.status == Status::Active {
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Queue a move; one is consumed per tick. Ignored outside active play.
    pub fn queue_input(&mut self, dir: Dir) {
        if self.status == Status::Active && !self.paused {
            self.inputs.push_back(dir);
        } else {
            trace!(?dir, status = %self.status, "input dropped");
        }
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        let (collected, total) = self
            .board
            .as_ref()
            .map_or((0, 0), |b| (b.items.collected_count(), b.items.total()));
        RoundSnapshot {
            level: self.level,
            collected,
            total,
            status: self.status,
            elapsed: self.elapsed,
        }
    }

    /// Advance the round by one tick of length `dt`.
    ///
    /// Order: one queued player move and collection, the throttled pursuer,
    /// then loss (capture, then the goal rule) before win. Stepping onto the
    /// pursuer, or trading cells with it, counts as capture.
    pub fn tick(&mut self, dt: Duration) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.status != Status::Active || self.paused {
            return events;
        }
        let Some(board) = self.board.as_mut() else {
            return events;
        };
        self.elapsed += dt;

        let pursuer_from = board.pursuer.pos();
        if let Some(dir) = self.inputs.pop_front() {
            if board.player.try_move(&board.maze, dir) {
                let pos = board.player.pos();
                if board.items.collect_at(pos) {
                    debug!(%pos, "collectible picked up");
                    events.push(GameEvent::CollectibleCollected {
                        pos,
                        collected: board.items.collected_count(),
                        total: board.items.total(),
                    });
                }
            }
        }

        // Walking into the pursuer ends the round before it gets to move, which
        // also covers the two trading cells.
        let caught = board.player.pos() == pursuer_from || {
            board
                .pursuer
                .tick(&board.maze, &board.items, board.player.pos(), &mut self.rng);
            board.pursuer.pos() == board.player.pos()
        };

        let distance = manhattan(board.player.pos(), board.pursuer.pos());
        if !caught
            && distance > 0
            && distance <= self.config.proximity_radius
            && self.last_distance != Some(distance)
        {
            events.push(GameEvent::ProximityWarning { distance });
        }
        self.last_distance = Some(distance);

        let outcome = if caught {
            Some(Err(LossReason::Caught))
        } else if self.config.goal_loss && board.pursuer.pos() == board.maze.center() {
            Some(Err(LossReason::GoalReached))
        } else if board.items.all_collected() {
            Some(Ok(()))
        } else {
            None
        };

        match outcome {
            Some(Err(reason)) => {
                self.status = Status::Lost;
                self.inputs.clear();
                info!(level = self.level, ?reason, "level lost");
                events.push(GameEvent::LevelLost {
                    level: self.level,
                    reason,
                });
            }
            Some(Ok(())) => {
                self.status = Status::Won;
                self.inputs.clear();
                info!(level = self.level, elapsed = ?self.elapsed, "level won");
                events.push(GameEvent::LevelWon { level: self.level });
            }
            None => {}
        }
        events
    }

    fn expect_status(&self, expected: Status, command: &'static str) -> GameResult<()> {
        if self.status == expected {
            Ok(())
        } else {
            warn!(command, status = %self.status, "rejected command");
            Err(GameError::InvalidTransition {
                from: self.status,
                command,
            })
        }
    }

    /// Build a complete level off to the side so a failure exposes nothing.
    fn build_board(&mut self, level: u32) -> GameResult<Board> {
        let (rows, cols) = self.config.dimensions_for(level);
        let maze = Maze::generate(rows, cols, &mut self.rng)?;

        let player_start = Maze::START;
        let pursuer_start = Pos::new(rows - 2, cols - 2);
        let excluded = [player_start, pursuer_start, maze.center()];
        let count = self.config.collectibles.count_for(level);
        let sites = items::place(&maze, &excluded, count, &mut self.rng)?;
        if sites.is_empty() {
            return Err(GameError::InsufficientSpace {
                requested: 1,
                available: 0,
            });
        }

        let pursuer = Pursuer::new(&maze, pursuer_start, self.config.pursuer_move_interval);
        Ok(Board {
            maze,
            player: Player::new(player_start),
            pursuer,
            items: Collectibles::new(sites),
        })
    }

    fn begin(&mut self, level: u32, board: Board) {
        info!(
            level,
            rows = board.maze.rows(),
            cols = board.maze.cols(),
            collectibles = board.items.total(),
            "level started"
        );
        self.level = level;
        self.board = Some(board);
        self.status = Status::Active;
        self.inputs.clear();
        self.elapsed = Duration::ZERO;
        self.paused = false;
        self.last_distance = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollectibleRule;

    const TICK: Duration = Duration::from_millis(100);

    fn seeded() -> GameConfig {
        GameConfig {
            rows: 7,
            cols: 7,
            seed: Some(42),
            ..GameConfig::default()
        }
    }

    /// Swap in a hand-built level on an already started controller.
    fn with_board(
        config: GameConfig,
        maze: Maze,
        player: Pos,
        pursuer: Pos,
        items: &[Pos],
    ) -> RoundController {
        let mut round = RoundController::new(config).unwrap();
        round.start().unwrap();
        let pursuer = Pursuer::new(&maze, pursuer, 1);
        round.board = Some(Board {
            maze,
            player: Player::new(player),
            pursuer,
            items: Collectibles::new(items.iter().copied()),
        });
        round.last_distance = None;
        round
    }

    #[test]
    fn starts_ready_and_activates() {
        let mut round = RoundController::new(seeded()).unwrap();
        assert_eq!(round.status(), Status::Ready);
        assert!(round.maze().is_none());
        assert!(round.tick(TICK).is_empty());

        round.start().unwrap();
        assert_eq!(round.status(), Status::Active);
        let maze = round.maze().unwrap();
        assert_eq!((maze.rows(), maze.cols()), (7, 7));
        assert_eq!(round.player_pos(), Some(Pos::new(1, 1)));
        assert_eq!(round.pursuer().map(Pursuer::pos), Some(Pos::new(5, 5)));

        let snapshot = round.snapshot();
        assert_eq!(snapshot.level, 1);
        assert_eq!(snapshot.total, 4);
        assert_eq!(snapshot.collected, 0);

        let items = round.collectibles().unwrap();
        for excluded in [Pos::new(1, 1), Pos::new(5, 5), Pos::new(3, 3)] {
            assert!(!items.is_uncollected_at(excluded));
        }
    }

    #[test]
    fn rejects_out_of_order_commands() {
        let mut round = RoundController::new(seeded()).unwrap();
        assert_eq!(
            round.next_level(),
            Err(GameError::InvalidTransition {
                from: Status::Ready,
                command: "advance"
            })
        );
        round.start().unwrap();
        assert!(matches!(round.start(), Err(GameError::InvalidTransition { .. })));
    }

    #[test]
    fn failed_setup_exposes_nothing() {
        let config = GameConfig {
            collectibles: CollectibleRule::Scaled {
                base: 1000,
                per_level: 0,
            },
            ..seeded()
        };
        let mut round = RoundController::new(config).unwrap();
        assert!(matches!(round.start(), Err(GameError::InsufficientSpace { .. })));
        assert_eq!(round.status(), Status::Ready);
        assert!(round.maze().is_none());
    }

    #[test]
    fn collecting_everything_wins_and_next_level_grows() {
        let maze = Maze::with_passages(
            5,
            5,
            &[(Pos::new(1, 1), Dir::Right), (Pos::new(1, 2), Dir::Right)],
        )
        .unwrap();
        // The pursuer is walled in at (3, 3).
        let quiet = GameConfig {
            proximity_radius: 0,
            ..seeded()
        };
        let mut round = with_board(
            quiet,
            maze,
            Pos::new(1, 1),
            Pos::new(3, 3),
            &[Pos::new(1, 2), Pos::new(1, 3)],
        );
        round.queue_input(Dir::Right);
        round.queue_input(Dir::Right);

        let first = round.tick(TICK);
        assert!(matches!(
            first.as_slice(),
            [GameEvent::CollectibleCollected { collected: 1, total: 2, .. }]
        ));
        assert_eq!(round.status(), Status::Active);

        let second = round.tick(TICK);
        assert!(second.contains(&GameEvent::LevelWon { level: 1 }));
        assert_eq!(round.status(), Status::Won);
        assert_eq!(round.snapshot().elapsed, TICK * 2);

        round.next_level().unwrap();
        assert_eq!(round.level(), 2);
        assert_eq!(round.status(), Status::Active);
        let maze = round.maze().unwrap();
        assert_eq!((maze.rows(), maze.cols()), (8, 8));
        assert_eq!(round.snapshot().total, 5);
        assert_eq!(round.snapshot().elapsed, Duration::ZERO);
    }

    #[test]
    fn capture_beats_simultaneous_win() {
        let maze = Maze::with_passages(
            5,
            5,
            &[(Pos::new(1, 1), Dir::Right), (Pos::new(1, 2), Dir::Right)],
        )
        .unwrap();
        let mut round = with_board(
            seeded(),
            maze,
            Pos::new(1, 1),
            Pos::new(1, 3),
            &[Pos::new(1, 2)],
        );
        round.queue_input(Dir::Right);
        let events = round.tick(TICK);

        assert_eq!(round.status(), Status::Lost);
        assert!(events.contains(&GameEvent::LevelLost {
            level: 1,
            reason: LossReason::Caught
        }));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::LevelWon { .. })));
        assert_eq!(round.snapshot().collected, 1);
    }

    #[test]
    fn walking_into_the_pursuer_is_a_capture() {
        let maze = Maze::with_passages(
            5,
            5,
            &[(Pos::new(1, 1), Dir::Right), (Pos::new(1, 2), Dir::Right)],
        )
        .unwrap();
        for seed in 0..20 {
            let config = GameConfig {
                seed: Some(seed),
                ..seeded()
            };
            let mut round = with_board(
                config,
                maze.clone(),
                Pos::new(1, 1),
                Pos::new(1, 2),
                &[Pos::new(4, 4)],
            );
            round.queue_input(Dir::Right);
            let events = round.tick(TICK);

            assert_eq!(round.status(), Status::Lost, "seed {seed}");
            assert_eq!(
                events,
                vec![GameEvent::LevelLost {
                    level: 1,
                    reason: LossReason::Caught
                }]
            );
            assert_eq!(round.pursuer().map(Pursuer::pos), Some(Pos::new(1, 2)));
        }
    }

    #[test]
    fn trading_cells_is_a_capture() {
        // The pursuer's only exit is the player's cell and vice versa.
        let maze = Maze::with_passages(5, 5, &[(Pos::new(2, 1), Dir::Right)]).unwrap();
        let mut round = with_board(seeded(), maze, Pos::new(2, 1), Pos::new(2, 2), &[Pos::new(4, 4)]);
        round.queue_input(Dir::Right);
        round.tick(TICK);

        assert_eq!(round.status(), Status::Lost);
        assert_eq!(round.player_pos(), Some(Pos::new(2, 2)));
        assert_eq!(round.pursuer().map(Pursuer::pos), Some(Pos::new(2, 2)));
    }

    #[test]
    fn goal_rule_is_optional() {
        let maze = Maze::with_passages(5, 5, &[(Pos::new(2, 3), Dir::Left)]).unwrap();
        let items = [Pos::new(4, 0)];

        let mut lenient = with_board(seeded(), maze.clone(), Pos::new(0, 0), Pos::new(2, 3), &items);
        lenient.tick(TICK);
        assert_eq!(lenient.pursuer().map(Pursuer::pos), Some(Pos::new(2, 2)));
        assert_eq!(lenient.status(), Status::Active);

        let strict = GameConfig {
            goal_loss: true,
            ..seeded()
        };
        let mut round = with_board(strict, maze, Pos::new(0, 0), Pos::new(2, 3), &items);
        let events = round.tick(TICK);
        assert_eq!(round.status(), Status::Lost);
        assert!(events.contains(&GameEvent::LevelLost {
            level: 1,
            reason: LossReason::GoalReached
        }));
    }

    #[test]
    fn one_input_per_tick() {
        let maze = Maze::with_passages(
            5,
            5,
            &[(Pos::new(0, 0), Dir::Right), (Pos::new(0, 1), Dir::Right)],
        )
        .unwrap();
        let mut round = with_board(seeded(), maze, Pos::new(0, 0), Pos::new(4, 4), &[Pos::new(2, 2)]);
        round.queue_input(Dir::Right);
        round.queue_input(Dir::Right);
        round.tick(TICK);
        assert_eq!(round.player_pos(), Some(Pos::new(0, 1)));
        round.tick(TICK);
        assert_eq!(round.player_pos(), Some(Pos::new(0, 2)));
        round.tick(TICK);
        assert_eq!(round.player_pos(), Some(Pos::new(0, 2)));
    }

    #[test]
    fn proximity_warning_on_change_only() {
        let maze = Maze::with_passages(5, 5, &[(Pos::new(0, 0), Dir::Right)]).unwrap();
        let mut round = with_board(seeded(), maze, Pos::new(0, 0), Pos::new(2, 0), &[Pos::new(4, 4)]);
        assert_eq!(round.tick(TICK), vec![GameEvent::ProximityWarning { distance: 2 }]);
        assert!(round.tick(TICK).is_empty());
        round.queue_input(Dir::Right);
        assert_eq!(round.tick(TICK), vec![GameEvent::ProximityWarning { distance: 3 }]);
    }

    #[test]
    fn pause_freezes_time_and_input() {
        let mut round = RoundController::new(seeded()).unwrap();
        round.start().unwrap();
        round.pause();
        round.queue_input(Dir::Down);
        assert!(round.tick(TICK).is_empty());
        assert_eq!(round.snapshot().elapsed, Duration::ZERO);
        round.resume();
        round.tick(TICK);
        assert_eq!(round.snapshot().elapsed, TICK);
    }

    #[test]
    fn restart_returns_to_level_one() {
        let maze = Maze::with_passages(5, 5, &[(Pos::new(1, 1), Dir::Right)]).unwrap();
        let mut round = with_board(seeded(), maze, Pos::new(1, 1), Pos::new(1, 2), &[Pos::new(4, 4)]);
        round.tick(TICK);
        assert_eq!(round.status(), Status::Lost);
        assert!(matches!(round.next_level(), Err(GameError::InvalidTransition { .. })));

        round.restart().unwrap();
        assert_eq!(round.status(), Status::Active);
        assert_eq!(round.level(), 1);
        assert_eq!(round.player_pos(), Some(Pos::new(1, 1)));
    }

    #[test]
    fn restart_mid_level() {
        let mut round = RoundController::new(seeded()).unwrap();
        round.start().unwrap();
        round.tick(TICK);
        assert_eq!(round.status(), Status::Active);

        round.restart().unwrap();
        assert_eq!(round.status(), Status::Active);
        assert_eq!(round.snapshot().elapsed, Duration::ZERO);
        assert_eq!(round.player_pos(), Some(Pos::new(1, 1)));
    }

    #[test]
    fn elapsed_label_is_minutes_and_seconds() {
        let snapshot = RoundSnapshot {
            level: 1,
            collected: 0,
            total: 0,
            status: Status::Active,
            elapsed: Duration::from_secs(75),
        };
        assert_eq!(snapshot.elapsed_label(), "01:15");
    }
}
