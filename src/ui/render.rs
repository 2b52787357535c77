use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use super::layout::{Glyph, Scene};
use crate::round::{RoundController, RoundSnapshot};

const CELL_W: usize = 2;

/// Diffing terminal renderer: only tiles that changed since the last frame
/// are redrawn.
pub struct Renderer {
    last: Vec<Glyph>,
    size: (usize, usize),
    last_hud: String,
    last_message: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            last: Vec::new(),
            size: (0, 0),
            last_hud: String::new(),
            last_message: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    /// Draw the current level, or just the message before the first level.
    pub fn render(
        &mut self,
        out: &mut impl Write,
        round: &RoundController,
        message: &str,
    ) -> io::Result<()> {
        let scene = match (round.maze(), round.player_pos(), round.pursuer(), round.collectibles()) {
            (Some(maze), Some(player), Some(pursuer), Some(items)) => Scene {
                maze,
                player,
                pursuer: pursuer.pos(),
                items,
            },
            _ => return self.render_title(out, message),
        };

        let (width, height) = scene.tile_size();
        if self.size != (width, height) {
            self.size = (width, height);
            self.last = vec![Glyph::Empty; width * height];
            self.needs_full = true;
        }

        let needed_h = (height + 2) as u16;
        let needed_w = (width * CELL_W) as u16;
        out.queue(MoveTo(0, 0))?;

        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            out.queue(Clear(ClearType::All))?;
            let msg = format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            );
            out.queue(Print(msg))?;
            out.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.needs_full {
            out.queue(Clear(ClearType::All))?;
        }

        let hud = hud_line(&round.snapshot(), round.is_paused());
        if self.needs_full || hud != self.last_hud {
            out.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            out.queue(SetForegroundColor(Color::White))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            out.queue(Print(&hud))?;
            out.queue(ResetColor)?;
            self.last_hud = hud;
        }

        for y in 0..height {
            for x in 0..width {
                let glyph = scene.glyph_at(x, y);
                let idx = y * width + x;
                if self.needs_full || glyph != self.last[idx] {
                    self.last[idx] = glyph;
                    self.draw_tile(out, x, y, glyph)?;
                }
            }
        }

        if self.needs_full || message != self.last_message {
            out.queue(MoveTo(self.origin_x, self.origin_y + height as u16))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            out.queue(Print(message))?;
            self.last_message = message.to_string();
        }
        self.needs_full = false;

        out.flush()
    }

    fn render_title(&mut self, out: &mut impl Write, message: &str) -> io::Result<()> {
        if self.needs_full || message != self.last_message {
            out.queue(Clear(ClearType::All))?;
            out.queue(MoveTo(0, 0))?;
            out.queue(SetForegroundColor(Color::Green))?;
            out.queue(Print("MAZE HUNT"))?;
            out.queue(ResetColor)?;
            out.queue(MoveTo(0, 2))?;
            out.queue(Print(message))?;
            self.last_message = message.to_string();
            out.flush()?;
        }
        // The first level frame must repaint everything.
        self.needs_full = true;
        Ok(())
    }

    fn draw_tile(&self, out: &mut impl Write, x: usize, y: usize, glyph: Glyph) -> io::Result<()> {
        let (text, color) = match glyph {
            Glyph::Player => ("@ ", Color::Yellow),
            Glyph::Pursuer => ("X ", Color::Red),
            Glyph::Wall => ("██", Color::Green),
            Glyph::Empty => ("  ", Color::Reset),
            Glyph::Collectible => ("◆ ", Color::Cyan),
            Glyph::Goal => ("◎ ", Color::Magenta),
        };
        let x_pos = self.origin_x + (x * CELL_W) as u16;
        let y_pos = self.origin_y + y as u16;
        out.queue(MoveTo(x_pos, y_pos))?;
        out.queue(SetForegroundColor(color))?;
        out.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        if w < CELL_W {
            for _ in 0..(CELL_W - w) {
                out.queue(Print(' '))?;
            }
        }
        out.queue(ResetColor)?;
        Ok(())
    }
}

pub fn hud_line(snapshot: &RoundSnapshot, paused: bool) -> String {
    let status = if paused {
        "paused".to_string()
    } else {
        snapshot.status.to_string()
    };
    format!(
        "Level: {}  Items: {}/{}  Time: {}  Status: {}  (q to quit)",
        snapshot.level,
        snapshot.collected,
        snapshot.total,
        snapshot.elapsed_label(),
        status
    )
}
