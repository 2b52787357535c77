//! Terminal front end for the maze hunt.

use std::fs::File;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::Print;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use maze_hunt::config::{read_timing, Timing};
use maze_hunt::ui::render::Renderer;
use maze_hunt::ui::{dir_for_key, event_message};
use maze_hunt::{CollectibleRule, GameConfig, GameEvent, RoundController, Status};

/// Collect every item before the hunter catches you
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Maze rows on the first level
    #[arg(long)]
    rows: Option<usize>,

    /// Maze columns on the first level
    #[arg(long)]
    cols: Option<usize>,

    /// Rows and columns added per level
    #[arg(long)]
    growth: Option<usize>,

    /// The hunter moves once every this many ticks
    #[arg(long)]
    hunter_interval: Option<u32>,

    /// Items on the first level; one more each level
    #[arg(long, conflicts_with = "dead_ends")]
    items: Option<usize>,

    /// Put an item on every dead end instead
    #[arg(long)]
    dead_ends: bool,

    /// Also lose when the hunter reaches the maze centre
    #[arg(long)]
    goal_loss: bool,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs here; filter with MAZE_HUNT_LOG (default `info`)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> GameConfig {
        let defaults = GameConfig::default();
        let collectibles = if self.dead_ends {
            CollectibleRule::DeadEnds
        } else if let Some(base) = self.items {
            CollectibleRule::Scaled { base, per_level: 1 }
        } else {
            defaults.collectibles
        };
        GameConfig {
            rows: self.rows.unwrap_or(defaults.rows),
            cols: self.cols.unwrap_or(defaults.cols),
            growth: self.growth.unwrap_or(defaults.growth),
            pursuer_move_interval: self.hunter_interval.unwrap_or(defaults.pursuer_move_interval),
            collectibles,
            goal_loss: self.goal_loss,
            proximity_radius: defaults.proximity_radius,
            seed: self.seed,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let mut round = RoundController::new(args.config())?;
    let timing = read_timing();

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &mut round, timing);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    if let Err(err) = &result {
        error!("{err:#}");
    }
    result
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_env("MAZE_HUNT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(stdout: &mut Stdout, round: &mut RoundController, timing: Timing) -> anyhow::Result<()> {
    let mut renderer = Renderer::new();
    let mut last_tick = Instant::now();
    let mut message = String::from("Enter to start, arrows/hjkl/wasd to move, p to pause, q to quit");
    info!(?timing, "front end started");

    loop {
        let frame_start = Instant::now();
        while event::poll(std::time::Duration::from_millis(0))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    match round.status() {
                        Status::Ready => round.start()?,
                        Status::Won => round.next_level()?,
                        Status::Lost => round.restart()?,
                        Status::Active => continue,
                    }
                    message = format!("Level {}: find every item", round.level());
                    last_tick = Instant::now();
                }
                KeyCode::Char('r') if round.status() != Status::Ready => {
                    round.restart()?;
                    message = String::from("Restarted from level 1");
                }
                KeyCode::Char('p') if round.status() == Status::Active => {
                    if round.is_paused() {
                        round.resume();
                        message.clear();
                    } else {
                        round.pause();
                        message = String::from("Paused, p to resume");
                    }
                }
                code => {
                    if let Some(dir) = dir_for_key(code) {
                        round.queue_input(dir);
                    }
                }
            }
        }

        let since_tick = last_tick.elapsed();
        if since_tick >= timing.tick {
            last_tick = Instant::now();
            for event in round.tick(since_tick) {
                if matches!(event, GameEvent::LevelLost { .. }) {
                    stdout.queue(Print('\x07'))?;
                }
                message = event_message(&event);
            }
        }
        renderer.render(stdout, round, &message)?;

        let elapsed = frame_start.elapsed();
        if elapsed < timing.frame {
            thread::sleep(timing.frame - elapsed);
        }
    }
}
