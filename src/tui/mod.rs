//! Terminal User Interface for blocknotes.
//!
//! Provides a four-panel TUI (search input, tag sidebar, note list, detail
//! view) using ratatui for rendering and crossterm for terminal management.
//! Notes and tags are loaded once; every filter change is answered from
//! memory by the search engine.

use std::io;
use std::panic;

use anyhow::{Context, Result};
use crossterm::{
    event::{self as crossterm_event, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::config::Config;
use crate::service::NoteService;

mod app;
pub mod event;
mod ui;

pub use app::{App, Focus};

/// Initializes the terminal for TUI rendering.
///
/// Enables raw mode and enters the alternate screen.
fn init_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// This should always be called before exiting the TUI,
/// even in error cases, to prevent terminal corruption.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

/// Minimal terminal restoration for the panic hook.
///
/// Ignores errors since we're likely already in a bad state.
fn restore_terminal_panic() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Installs a panic hook that restores the terminal before the original hook runs.
fn init_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal_panic();
        original_hook(panic_info);
    }));
}

/// Runs the main event loop for the TUI.
///
/// Terminal state is always restored, even on error.
pub fn run_event_loop(app: &mut App, service: &NoteService) -> Result<()> {
    let mut terminal = init_terminal()?;

    let result = run_event_loop_internal(app, service, &mut terminal);

    if let Err(e) = restore_terminal(&mut terminal) {
        eprintln!("Error restoring terminal: {e}");
    }

    result
}

fn run_event_loop_internal(
    app: &mut App,
    service: &NoteService,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            ui::draw(frame, app);
        })?;

        if crossterm_event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = crossterm_event::read()?
            && key.kind == KeyEventKind::Press
        {
            if event::handle_key_event(app, key) {
                break;
            }
            if let Some(sort) = app.take_sort_change() {
                service
                    .set_tag_sort(sort)
                    .context("Failed to save tag sort")?;
            }
        }
    }

    Ok(())
}

/// Loads every note, every tag and the stored tag sort into the App.
fn load_collection(app: &mut App, service: &NoteService) -> Result<()> {
    let notes = service.list_notes().context("Failed to load notes")?;
    let tags = service.list_tags().context("Failed to load tags")?;
    let sort = service.tag_sort().context("Failed to load tag sort")?;

    tracing::debug!(notes = notes.len(), tags = tags.len(), "loaded collection");
    app.set_collection(notes, tags, sort);
    Ok(())
}

/// Entry point for the TUI application.
///
/// Opens the configured database, loads the collection and starts the
/// event loop.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or read, or the
/// terminal cannot be driven.
pub fn run(config: &Config) -> Result<()> {
    init_panic_hook();

    let db_path = config
        .database_path()
        .context("Failed to get database path")?;
    crate::utils::ensure_database_directory(&db_path)
        .context("Failed to ensure database directory")?;
    let db = crate::Database::open(&db_path).context("Failed to open database")?;
    let service = NoteService::new(db);

    let mut app = App::with_options(config.search);
    load_collection(&mut app, &service).context("Failed to load notes from database")?;

    run_event_loop(&mut app, &service).context("TUI event loop failed")?;

    Ok(())
}
