//! Maze grid, wall queries and the depth-first maze generator.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::{GameError, GameResult, ParseDirError};

/// Smallest row/column count the generator accepts.
pub const MIN_GENERATED_DIM: usize = 2;

/// Cell coordinate, 0-indexed from the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Grid distance ignoring walls.
pub fn manhattan(a: Pos, b: Pos) -> usize {
    a.row.abs_diff(b.row) + a.col.abs_diff(b.col)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Right,
    Down,
    Left,
}

impl Dir {
    /// Clockwise from north, matching the wall index order.
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Right, Dir::Down, Dir::Left];

    fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (-1, 0),
            Dir::Right => (0, 1),
            Dir::Down => (1, 0),
            Dir::Left => (0, -1),
        }
    }

    /// Index into a cell's `[north, east, south, west]` wall array.
    pub const fn wall_index(self) -> usize {
        match self {
            Dir::Up => 0,
            Dir::Right => 1,
            Dir::Down => 2,
            Dir::Left => 3,
        }
    }

    pub const fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Right => Dir::Left,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
        }
    }

    /// Cell one step away, or `None` when that would go below row/col zero.
    pub fn step(self, pos: Pos) -> Option<Pos> {
        let (dr, dc) = self.delta();
        Some(Pos {
            row: pos.row.checked_add_signed(dr)?,
            col: pos.col.checked_add_signed(dc)?,
        })
    }
}

impl FromStr for Dir {
    type Err = ParseDirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Dir::Up),
            "right" => Ok(Dir::Right),
            "down" => Ok(Dir::Down),
            "left" => Ok(Dir::Left),
            other => Err(ParseDirError(other.to_string())),
        }
    }
}

/// Rectangular maze with four walls per cell.
///
/// Walls are stored once per cell side, so an open passage is cleared on both
/// cells it joins. Mazes produced by [`Maze::generate`] are spanning trees:
/// exactly one path joins any two cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze {
    rows: usize,
    cols: usize,
    walls: Vec<[bool; 4]>,
}

impl Maze {
    /// Where generation starts and where the player spawns.
    pub const START: Pos = Pos { row: 1, col: 1 };

    fn closed(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            walls: vec![[true; 4]; rows * cols],
        }
    }

    /// Build a perfect maze with a randomized depth-first backtracker.
    ///
    /// The walk starts at [`Maze::START`]; at each step the top of the stack
    /// carves into a uniformly chosen unvisited neighbour, or is popped when
    /// none is left. Every cell ends up visited exactly once, so the result is
    /// connected and acyclic.
    ///
    /// Returns [`GameError::InvalidDimensions`] when either side is below
    /// [`MIN_GENERATED_DIM`].
    pub fn generate(rows: usize, cols: usize, rng: &mut impl Rng) -> GameResult<Self> {
        if rows < MIN_GENERATED_DIM || cols < MIN_GENERATED_DIM {
            return Err(GameError::InvalidDimensions {
                rows,
                cols,
                min: MIN_GENERATED_DIM,
            });
        }

        let mut maze = Self::closed(rows, cols);
        let mut visited = vec![false; rows * cols];
        let mut stack = vec![Self::START];
        visited[maze.cell_id(Self::START)] = true;
        let mut unvisited = Vec::with_capacity(4);

        while let Some(&current) = stack.last() {
            unvisited.clear();
            for dir in Dir::ALL {
                if let Some(next) = maze.step_within(current, dir) {
                    if !visited[maze.cell_id(next)] {
                        unvisited.push((dir, next));
                    }
                }
            }

            match unvisited.choose(rng) {
                Some(&(dir, next)) => {
                    maze.carve(current, dir);
                    visited[maze.cell_id(next)] = true;
                    stack.push(next);
                }
                None => {
                    stack.pop();
                }
            }
        }

        debug!(rows, cols, passages = maze.passage_count(), "generated maze");
        Ok(maze)
    }

    /// Hand-built layout: all walls closed except the listed passages.
    ///
    /// Passages pointing out of the grid are ignored, so the boundary stays
    /// closed. No spanning-tree guarantee is made; this is meant for fixed
    /// layouts and fixtures.
    pub fn with_passages(rows: usize, cols: usize, passages: &[(Pos, Dir)]) -> GameResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(GameError::InvalidDimensions { rows, cols, min: 1 });
        }
        let mut maze = Self::closed(rows, cols);
        for &(pos, dir) in passages {
            if maze.contains(pos) && maze.step_within(pos, dir).is_some() {
                maze.carve(pos, dir);
            }
        }
        Ok(maze)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Canonical id `row * cols + col`. Only meaningful for cells in the grid.
    pub fn cell_id(&self, pos: Pos) -> usize {
        pos.row * self.cols + pos.col
    }

    /// Centre cell, the pursuer's objective.
    pub fn center(&self) -> Pos {
        Pos::new(self.rows / 2, self.cols / 2)
    }

    pub fn is_boundary(&self, pos: Pos) -> bool {
        pos.row == 0 || pos.col == 0 || pos.row + 1 == self.rows || pos.col + 1 == self.cols
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Pos { row, col }))
    }

    /// `[north, east, south, west]` walls of a cell.
    pub fn walls_at(&self, pos: Pos) -> Option<[bool; 4]> {
        self.contains(pos).then(|| self.walls[self.cell_id(pos)])
    }

    /// Whether moving from `pos` towards `dir` is blocked.
    ///
    /// Cells outside the grid count as fully walled.
    pub fn has_wall(&self, pos: Pos, dir: Dir) -> bool {
        match self.walls_at(pos) {
            Some(walls) => walls[dir.wall_index()],
            None => true,
        }
    }

    /// Destination of an open step from `pos`, if there is one.
    pub fn neighbor(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        if self.has_wall(pos, dir) {
            return None;
        }
        self.step_within(pos, dir)
    }

    pub fn open_dirs(&self, pos: Pos) -> impl Iterator<Item = Dir> + '_ {
        Dir::ALL.into_iter().filter(move |dir| !self.has_wall(pos, *dir))
    }

    pub fn wall_count(&self, pos: Pos) -> usize {
        self.walls_at(pos)
            .map_or(4, |walls| walls.iter().filter(|w| **w).count())
    }

    pub fn is_dead_end(&self, pos: Pos) -> bool {
        self.contains(pos) && self.wall_count(pos) == 3
    }

    /// Number of open passages between cells.
    ///
    /// Each passage is counted once, through its east or south side.
    pub fn passage_count(&self) -> usize {
        self.walls.iter().map(|w| usize::from(!w[1]) + usize::from(!w[2])).sum()
    }

    fn step_within(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        dir.step(pos).filter(|next| self.contains(*next))
    }

    fn carve(&mut self, pos: Pos, dir: Dir) {
        if let Some(next) = self.step_within(pos, dir) {
            let here = self.cell_id(pos);
            let there = self.cell_id(next);
            self.walls[here][dir.wall_index()] = false;
            self.walls[there][dir.opposite().wall_index()] = false;
        }
    }
}

/// Cells that [`find_dead_ends`] must skip.
#[derive(Clone, Debug, Default)]
pub struct DeadEndFilter {
    excluded: Vec<Pos>,
}

impl DeadEndFilter {
    /// Keep every dead end.
    pub fn none() -> Self {
        Self::default()
    }

    /// The usual policy: skip the start cell and the centre.
    pub fn standard(maze: &Maze) -> Self {
        Self::excluding([Maze::START, maze.center()])
    }

    pub fn excluding(cells: impl IntoIterator<Item = Pos>) -> Self {
        Self {
            excluded: cells.into_iter().collect(),
        }
    }

    fn allows(&self, pos: Pos) -> bool {
        !self.excluded.contains(&pos)
    }
}

/// Cells with exactly one opening, in row-major order.
pub fn find_dead_ends(maze: &Maze, filter: &DeadEndFilter) -> Vec<Pos> {
    maze.cells()
        .filter(|pos| maze.is_dead_end(*pos) && filter.allows(*pos))
        .collect()
}
