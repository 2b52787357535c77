use crate::maze::{Dir, Maze, Pos};

/// The player-controlled agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Player {
    pos: Pos,
}

impl Player {
    pub fn new(pos: Pos) -> Self {
        Self { pos }
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Step one cell towards `dir`.
    ///
    /// Returns `false` and stays put when a wall or the grid edge is in the way.
    pub fn try_move(&mut self, maze: &Maze, dir: Dir) -> bool {
        match maze.neighbor(self.pos, dir) {
            Some(next) => {
                self.pos = next;
                true
            }
            None => false,
        }
    }
}
