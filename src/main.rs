//! Terminal maze walker (default binary).
//!
//! Plays one session locally. The view is rendered at the terminal's pixel
//! resolution and drawn with half-block glyphs; it is only redrawn after a key
//! press or a resize.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};

use mazewalk::adapter::{load_color_scheme, HostConfig};
use mazewalk::core::{MazeSession, SimpleRng};
use mazewalk::engine::{FrameRenderer, Raster};
use mazewalk::input::{handle_key_event, InputCommand};
use mazewalk::term::{FrameBuffer, MazeView, TerminalRenderer, Viewport};
use mazewalk::types::{ColorScheme, DEFAULT_MAZE_SIZE, MAX_MAZE_SIZE, MIN_MAZE_SIZE};

#[derive(Parser, Debug)]
#[command(author, version, about = "Walk a maze in first person", long_about = None)]
struct Args {
    /// Maze size; odd sizes are rounded down
    #[arg(short, long, default_value_t = DEFAULT_MAZE_SIZE)]
    size: usize,

    /// Generator seed (random when omitted)
    #[arg(long)]
    seed: Option<u32>,

    /// JSON colour scheme file; overrides MAZEWALK_COLORS
    #[arg(long)]
    colors: Option<PathBuf>,

    /// Write logs here (the terminal is busy drawing the maze)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;
    ensure!(
        (MIN_MAZE_SIZE..=MAX_MAZE_SIZE).contains(&args.size),
        "maze size must be within {}..={}",
        MIN_MAZE_SIZE,
        MAX_MAZE_SIZE
    );

    let scheme = match args.colors.as_ref() {
        Some(path) => load_color_scheme(path)?,
        None => HostConfig::from_env().color_scheme()?,
    };

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &args, scheme);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn init_logging(path: Option<&PathBuf>) -> Result<()> {
    let env = env_logger::Env::default().default_filter_or("info");
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            env_logger::Builder::from_env(env)
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        None => {
            // Nothing may write to the screen while the maze is drawn.
            env_logger::Builder::new()
                .filter_level(log::LevelFilter::Off)
                .init();
        }
    }
    Ok(())
}

fn new_session(size: usize, seed: Option<u32>) -> Result<MazeSession> {
    let seed = seed.unwrap_or_else(SimpleRng::seed_from_time);
    MazeSession::new(size, seed).with_context(|| format!("generating {}x{} maze", size, size))
}

fn run(term: &mut TerminalRenderer, args: &Args, scheme: ColorScheme) -> Result<()> {
    let mut size = args.size;
    let mut session = new_session(size, args.seed)?;

    let view = MazeView::new();
    let mut fb = FrameBuffer::new(0, 0);
    let mut raster = Raster::new(0, 0, scheme.background);
    let mut notice: Option<&str> = None;
    let mut dirty = true;

    loop {
        if dirty {
            let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
            let viewport = Viewport::new(w, h);
            let side = view.picture_side(viewport).max(2) as u32;
            FrameRenderer::new(side, scheme).render_into(session.grid(), session.nav(), &mut raster);
            view.render_into(&raster, &session.snapshot(), notice, viewport, &mut fb);
            term.draw_swap(&mut fb)?;
            dirty = false;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let Some(command) = handle_key_event(key) else {
                    continue;
                };
                notice = None;
                match command {
                    InputCommand::Quit => return Ok(()),
                    InputCommand::Action(action) => {
                        if !session.apply(action).changed {
                            notice = Some("blocked");
                        }
                    }
                    InputCommand::NewMaze(new_size) => {
                        size = new_size;
                        session = new_session(size, None)?;
                    }
                    InputCommand::Regenerate => {
                        session = new_session(size, None)?;
                    }
                }
                dirty = true;
            }
            Event::Resize(..) => {
                term.invalidate();
                dirty = true;
            }
            _ => {}
        }
    }
}
