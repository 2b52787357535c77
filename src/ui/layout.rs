//! Maps a level onto a grid of terminal tiles.
//!
//! Cells sit on odd tile coordinates; the tiles between them show whether
//! the shared wall is present, so a maze of `rows x cols` cells becomes
//! `(2 * rows + 1) x (2 * cols + 1)` tiles.

use crate::items::Collectibles;
use crate::maze::{Dir, Maze, Pos};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Glyph {
    Player,
    Pursuer,
    Wall,
    Empty,
    Collectible,
    Goal,
}

/// What the renderer needs from a level.
#[derive(Clone, Copy)]
pub struct Scene<'a> {
    pub maze: &'a Maze,
    pub player: Pos,
    pub pursuer: Pos,
    pub items: &'a Collectibles,
}

impl Scene<'_> {
    /// Width and height in tiles.
    pub fn tile_size(&self) -> (usize, usize) {
        (self.maze.cols() * 2 + 1, self.maze.rows() * 2 + 1)
    }

    pub fn glyph_at(&self, x: usize, y: usize) -> Glyph {
        match (y % 2, x % 2) {
            (1, 1) => self.cell_glyph(Pos::new(y / 2, x / 2)),
            (1, 0) => {
                let row = y / 2;
                let blocked = if x == 0 {
                    self.maze.has_wall(Pos::new(row, 0), Dir::Left)
                } else {
                    self.maze.has_wall(Pos::new(row, x / 2 - 1), Dir::Right)
                };
                wall_or_empty(blocked)
            }
            (0, 1) => {
                let col = x / 2;
                let blocked = if y == 0 {
                    self.maze.has_wall(Pos::new(0, col), Dir::Up)
                } else {
                    self.maze.has_wall(Pos::new(y / 2 - 1, col), Dir::Down)
                };
                wall_or_empty(blocked)
            }
            _ => Glyph::Wall,
        }
    }

    fn cell_glyph(&self, pos: Pos) -> Glyph {
        if pos == self.pursuer {
            Glyph::Pursuer
        } else if pos == self.player {
            Glyph::Player
        } else if self.items.is_uncollected_at(pos) {
            Glyph::Collectible
        } else if pos == self.maze.center() {
            Glyph::Goal
        } else {
            Glyph::Empty
        }
    }
}

fn wall_or_empty(blocked: bool) -> Glyph {
    if blocked {
        Glyph::Wall
    } else {
        Glyph::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_follow_walls() {
        let maze = Maze::with_passages(2, 3, &[(Pos::new(0, 0), Dir::Right), (Pos::new(0, 1), Dir::Down)])
            .unwrap();
        let items = Collectibles::new([Pos::new(1, 1)]);
        let scene = Scene {
            maze: &maze,
            player: Pos::new(0, 0),
            pursuer: Pos::new(1, 2),
            items: &items,
        };
        assert_eq!(scene.tile_size(), (7, 5));

        // Border.
        assert_eq!(scene.glyph_at(1, 0), Glyph::Wall);
        assert_eq!(scene.glyph_at(0, 1), Glyph::Wall);
        assert_eq!(scene.glyph_at(6, 3), Glyph::Wall);
        // Passage (0,0) -> (0,1) and (0,1) -> (1,1).
        assert_eq!(scene.glyph_at(2, 1), Glyph::Empty);
        assert_eq!(scene.glyph_at(3, 2), Glyph::Empty);
        // Closed wall (0,1) | (0,2).
        assert_eq!(scene.glyph_at(4, 1), Glyph::Wall);
        // Posts.
        assert_eq!(scene.glyph_at(2, 2), Glyph::Wall);

        assert_eq!(scene.glyph_at(1, 1), Glyph::Player);
        assert_eq!(scene.glyph_at(3, 3), Glyph::Collectible);
        assert_eq!(scene.glyph_at(5, 3), Glyph::Pursuer);
        assert_eq!(scene.glyph_at(3, 1), Glyph::Empty);
    }

    #[test]
    fn goal_shows_when_free() {
        let maze = Maze::with_passages(3, 3, &[]).unwrap();
        let items = Collectibles::default();
        let scene = Scene {
            maze: &maze,
            player: Pos::new(0, 0),
            pursuer: Pos::new(2, 2),
            items: &items,
        };
        assert_eq!(scene.glyph_at(3, 3), Glyph::Goal);
    }
}
