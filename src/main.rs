mod app;
mod board;
mod error;
mod session;
mod storage;
mod task;
mod ui;
mod validate;

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::board::Board;
use crate::session::Session;
use crate::storage::Storage;

/// Kanban-style task board in the terminal.
#[derive(Debug, Parser)]
#[command(name = "taskboard", version)]
struct Cli {
    /// Directory holding the JSON slots (defaults to the platform data dir).
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Seed a small demo board when no tasks exist yet.
    #[arg(long)]
    seed_demo: bool,
    /// Log file (defaults to taskboard.log inside the data dir).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => Storage::default_dir()?,
    };
    let storage = Storage::open(&data_dir)?;
    let log_file = cli
        .log_file
        .unwrap_or_else(|| storage.root().join("taskboard.log"));
    init_logging(&log_file)?;
    tracing::info!(data_dir = %data_dir.display(), "starting");

    let board = Board::load(storage.clone(), cli.seed_demo)?;
    let session = Session::load(storage);
    let mut app = App::new(board, session);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(%err, "exited with an error");
        return Err(err.into());
    }
    Ok(())
}

// The TUI owns stdout/stderr, so logs go to a file. RUST_LOG still wins
// over the default level.
fn init_logging(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
