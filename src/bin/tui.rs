use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_subscriber::EnvFilter;

use giv::tui::{self, Direction, Step, ViewEvent, Viewer, ViewerAction};

#[derive(Parser)]
#[command(name = "tui", about = "Interactive half-block image viewer")]
#[command(version)]
struct TuiArgs {
    /// Image to view
    path: PathBuf,

    /// Log at debug level to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = match TuiArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("error")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let viewer = Viewer::open(&args.path);

    enable_raw_mode().context("enable raw mode")?;
    std::io::stdout()
        .execute(EnterAlternateScreen)
        .context("enter alternate screen")?;

    let result = run_app(viewer);

    std::io::stdout()
        .execute(LeaveAlternateScreen)
        .context("leave alternate screen")?;
    disable_raw_mode().context("disable raw mode")?;

    result
}

fn run_app(mut viewer: Viewer) -> anyhow::Result<()> {
    let backend = CrosstermBackend::new(std::io::stdout());
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let (width, height) = crossterm::terminal::size().context("query terminal size")?;
    viewer.handle_event(ViewEvent::Resize { width, height });

    loop {
        terminal.draw(|frame| tui::view(frame, &viewer))?;

        let input = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => map_key(key),
            Event::Resize(width, height) => Some(ViewEvent::Resize { width, height }),
            _ => None,
        };

        if let Some(input) = input {
            if viewer.handle_event(input) == Some(ViewerAction::Quit) {
                break;
            }
        }
    }

    Ok(())
}

fn map_key(key: KeyEvent) -> Option<ViewEvent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(ViewEvent::Quit);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(ViewEvent::Quit),
        KeyCode::Char('+') => Some(ViewEvent::ZoomIn(Step::Fine)),
        KeyCode::Char('=') => Some(ViewEvent::ZoomIn(Step::Coarse)),
        KeyCode::Char('-') => Some(ViewEvent::ZoomOut(Step::Fine)),
        KeyCode::Char('_') => Some(ViewEvent::ZoomOut(Step::Coarse)),
        KeyCode::Up => Some(ViewEvent::Pan(Direction::Up)),
        KeyCode::Down => Some(ViewEvent::Pan(Direction::Down)),
        KeyCode::Left => Some(ViewEvent::Pan(Direction::Left)),
        KeyCode::Right => Some(ViewEvent::Pan(Direction::Right)),
        _ => None,
    }
}
