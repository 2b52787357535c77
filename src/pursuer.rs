//! The hunter: a pursuer that blends chasing, exploring and objective-seeking.
//!
//! Each decision picks a target (random cell, the player, or the maze centre,
//! or the least-visited region when it notices it is going in circles), then
//! scores the open neighbouring cells by distance to that target plus a
//! visit-history penalty. A second draw decides between the best cell, one of
//! the better half, or any cell, so the hunter stays readable without being
//! trivially dodged.

use std::collections::{HashSet, VecDeque};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;

use crate::items::Collectibles;
use crate::maze::{manhattan, Maze, Pos};

/// Length of the recent-move window.
pub const HISTORY_LEN: usize = 15;
/// A full window with at most this many distinct cells counts as circling.
pub const STUCK_UNIQUE_CELLS: usize = 3;
/// Consecutive circling windows before targeting is overridden.
pub const STUCK_THRESHOLD: u32 = 3;

const LEAST_VISITED_SAMPLES: usize = 10;
const CONGESTION_RADIUS: isize = 2;

const VISIT_WEIGHT: u32 = 3;
const RECENCY_WEIGHT: u32 = 2;

// Cumulative thresholds for the target draw.
const RANDOM_TARGET_CHANCE: f64 = 0.4;
const PLAYER_TARGET_CHANCE: f64 = 0.7;

// Cumulative thresholds for the move draw.
const GREEDY_MOVE_CHANCE: f64 = 0.4;
const TOP_HALF_MOVE_CHANCE: f64 = 0.8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetKind {
    LeastVisited,
    Random,
    Player,
    Goal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Target {
    pub kind: TargetKind,
    pub cell: Pos,
}

/// Where the pursuer has been. Owned by a single [`Pursuer`].
#[derive(Clone, Debug)]
pub struct PursuerMemory {
    rows: usize,
    cols: usize,
    visits: Vec<u32>,
    recent: VecDeque<Pos>,
    stuck_counter: u32,
}

impl PursuerMemory {
    pub fn new(maze: &Maze) -> Self {
        Self {
            rows: maze.rows(),
            cols: maze.cols(),
            visits: vec![0; maze.cell_count()],
            recent: VecDeque::with_capacity(HISTORY_LEN),
            stuck_counter: 0,
        }
    }

    fn id(&self, pos: Pos) -> Option<usize> {
        (pos.row < self.rows && pos.col < self.cols).then_some(pos.row * self.cols + pos.col)
    }

    pub fn visit_count(&self, pos: Pos) -> u32 {
        self.id(pos).map_or(0, |id| self.visits[id])
    }

    /// Oldest to newest.
    pub fn recent_moves(&self) -> impl Iterator<Item = Pos> + '_ {
        self.recent.iter().copied()
    }

    pub fn stuck_counter(&self) -> u32 {
        self.stuck_counter
    }

    pub fn is_stuck(&self) -> bool {
        self.stuck_counter >= STUCK_THRESHOLD
    }

    /// Note a visit to `pos` and re-evaluate the stuck counter.
    pub fn record(&mut self, pos: Pos) {
        if let Some(id) = self.id(pos) {
            self.visits[id] += 1;
        }
        if self.recent.len() == HISTORY_LEN {
            self.recent.pop_front();
        }
        self.recent.push_back(pos);

        if self.recent.len() == HISTORY_LEN {
            let unique: HashSet<Pos> = self.recent.iter().copied().collect();
            if unique.len() <= STUCK_UNIQUE_CELLS {
                self.stuck_counter += 1;
            } else {
                self.stuck_counter = 0;
            }
        }
    }

    /// Sum over the move window of `position + 1` for each occurrence of `pos`,
    /// so the newest entry weighs the most: a cell just left is the least
    /// attractive, not the one left longest ago.
    pub fn recency_penalty(&self, pos: Pos) -> u32 {
        self.recent
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == pos)
            .map(|(i, _)| i as u32 + 1)
            .sum()
    }

    /// Visits within Manhattan distance 2 of `pos`, `pos` included.
    pub fn congestion(&self, pos: Pos) -> u32 {
        let mut total = 0;
        for dr in -CONGESTION_RADIUS..=CONGESTION_RADIUS {
            let span = CONGESTION_RADIUS - dr.abs();
            for dc in -span..=span {
                let cell = pos
                    .row
                    .checked_add_signed(dr)
                    .zip(pos.col.checked_add_signed(dc))
                    .map(|(row, col)| Pos::new(row, col));
                if let Some(cell) = cell {
                    total += self.visit_count(cell);
                }
            }
        }
        total
    }

    /// Lower is more attractive.
    pub fn score(&self, pos: Pos) -> u32 {
        self.visit_count(pos) * VISIT_WEIGHT
            + self.recency_penalty(pos) * RECENCY_WEIGHT
            + self.congestion(pos)
    }
}

#[derive(Clone, Debug)]
pub struct Pursuer {
    pos: Pos,
    memory: PursuerMemory,
    move_interval: u32,
    tick_counter: u32,
}

impl Pursuer {
    /// Place a pursuer with fresh memory at `start`. It decides once every
    /// `move_interval` ticks (at least every tick).
    pub fn new(maze: &Maze, start: Pos, move_interval: u32) -> Self {
        let mut memory = PursuerMemory::new(maze);
        memory.record(start);
        Self {
            pos: start,
            memory,
            move_interval: move_interval.max(1),
            tick_counter: 0,
        }
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn memory(&self) -> &PursuerMemory {
        &self.memory
    }

    /// Throttled entry point, called once per game tick.
    pub fn tick(
        &mut self,
        maze: &Maze,
        items: &Collectibles,
        player: Pos,
        rng: &mut impl Rng,
    ) -> Option<Pos> {
        self.tick_counter += 1;
        if self.tick_counter < self.move_interval {
            return None;
        }
        self.tick_counter = 0;
        self.step(maze, items, player, rng)
    }

    pub fn choose_target(&self, maze: &Maze, player: Pos, rng: &mut impl Rng) -> Target {
        let roll: f64 = rng.gen();

        if self.memory.is_stuck() {
            Target {
                kind: TargetKind::LeastVisited,
                cell: self.least_visited(maze, rng),
            }
        } else if roll < RANDOM_TARGET_CHANCE {
            Target {
                kind: TargetKind::Random,
                cell: random_cell(maze, rng),
            }
        } else if roll < PLAYER_TARGET_CHANCE {
            Target {
                kind: TargetKind::Player,
                cell: player,
            }
        } else {
            Target {
                kind: TargetKind::Goal,
                cell: maze.center(),
            }
        }
    }

    fn least_visited(&self, maze: &Maze, rng: &mut impl Rng) -> Pos {
        let mut best = self.pos;
        let mut best_score = u32::MAX;
        for _ in 0..LEAST_VISITED_SAMPLES {
            let cell = random_cell(maze, rng);
            let score = self.memory.score(cell);
            if score < best_score {
                best = cell;
                best_score = score;
            }
        }
        best
    }

    /// Make one decision and move at most one cell.
    ///
    /// Cells holding an uncollected item are never entered. Returns the new
    /// position, or `None` when every exit is blocked.
    pub fn step(
        &mut self,
        maze: &Maze,
        items: &Collectibles,
        player: Pos,
        rng: &mut impl Rng,
    ) -> Option<Pos> {
        let target = self.choose_target(maze, player, rng);

        let mut candidates: Vec<(Pos, u32)> = maze
            .open_dirs(self.pos)
            .filter_map(|dir| maze.neighbor(self.pos, dir))
            .filter(|next| !items.is_uncollected_at(*next))
            .map(|next| (next, manhattan(next, target.cell) as u32 + self.memory.score(next)))
            .collect();

        if candidates.is_empty() {
            trace!(pos = %self.pos, "pursuer has no open move");
            return None;
        }

        let roll: f64 = rng.gen();
        let chosen = if self.memory.is_stuck() || roll < GREEDY_MOVE_CHANCE {
            candidates
                .iter()
                .copied()
                .reduce(|best, c| if c.1 < best.1 { c } else { best })
        } else if roll < TOP_HALF_MOVE_CHANCE {
            candidates.sort_by_key(|c| c.1);
            let top = candidates.len().div_ceil(2);
            candidates[..top].choose(rng).copied()
        } else {
            candidates.choose(rng).copied()
        };
        let (next, cost) = chosen?;

        self.pos = next;
        self.memory.record(next);
        trace!(
            target = ?target.kind,
            goal = %target.cell,
            to = %next,
            cost,
            stuck = self.memory.stuck_counter(),
            "pursuer moved"
        );
        Some(next)
    }
}

fn random_cell(maze: &Maze, rng: &mut impl Rng) -> Pos {
    Pos::new(rng.gen_range(0..maze.rows()), rng.gen_range(0..maze.cols()))
}
