//! Collectible placement and bookkeeping.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::{GameError, GameResult};
use crate::maze::{find_dead_ends, DeadEndFilter, Maze, Pos};

/// Choose collectible cells in `maze`.
///
/// With `count == None` every dead end that is not `excluded` becomes a site.
/// With `Some(n)`, `n` cells are sampled without replacement: dead ends first,
/// then any other interior (non-boundary) cell that is not excluded.
///
/// Returns [`GameError::InsufficientSpace`] when fewer than `n` cells qualify.
pub fn place(
    maze: &Maze,
    excluded: &[Pos],
    count: Option<usize>,
    rng: &mut impl Rng,
) -> GameResult<Vec<Pos>> {
    let filter = DeadEndFilter::excluding(excluded.iter().copied());
    let mut dead_ends = find_dead_ends(maze, &filter);

    let Some(requested) = count else {
        debug!(sites = dead_ends.len(), "placing collectibles on every dead end");
        return Ok(dead_ends);
    };

    let mut interior: Vec<Pos> = maze
        .cells()
        .filter(|pos| !maze.is_boundary(*pos) && !maze.is_dead_end(*pos) && !excluded.contains(pos))
        .collect();

    let available = dead_ends.len() + interior.len();
    if available < requested {
        return Err(GameError::InsufficientSpace { requested, available });
    }

    dead_ends.shuffle(rng);
    interior.shuffle(rng);
    let sites: Vec<Pos> = dead_ends.into_iter().chain(interior).take(requested).collect();
    debug!(requested, available, "placed collectibles");
    Ok(sites)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Collectible {
    pub pos: Pos,
    pub collected: bool,
}

/// The items of one level. Cells are unique.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Collectibles {
    items: Vec<Collectible>,
}

impl Collectibles {
    pub fn new(sites: impl IntoIterator<Item = Pos>) -> Self {
        let mut items: Vec<Collectible> = Vec::new();
        for pos in sites {
            if !items.iter().any(|c| c.pos == pos) {
                items.push(Collectible { pos, collected: false });
            }
        }
        Self { items }
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn collected_count(&self) -> usize {
        self.items.iter().filter(|c| c.collected).count()
    }

    pub fn all_collected(&self) -> bool {
        self.items.iter().all(|c| c.collected)
    }

    pub fn is_uncollected_at(&self, pos: Pos) -> bool {
        self.items.iter().any(|c| c.pos == pos && !c.collected)
    }

    /// Mark the item at `pos` collected. Returns whether anything was picked up.
    pub fn collect_at(&mut self, pos: Pos) -> bool {
        match self.items.iter_mut().find(|c| c.pos == pos && !c.collected) {
            Some(item) => {
                item.collected = true;
                true
            }
            None => false,
        }
    }

    pub fn remaining(&self) -> impl Iterator<Item = Pos> + '_ {
        self.items.iter().filter(|c| !c.collected).map(|c| c.pos)
    }
}
