//! Keyboard event handling for the TUI.
//!
//! Maps crossterm keyboard events to application state changes.
//! Key behavior depends on the focused panel.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Focus};

/// Handles a keyboard event and updates the app state accordingly.
///
/// Returns `true` if the application should quit, `false` otherwise.
///
/// # Event Handling
///
/// - `Ctrl+C`: Quit from anywhere; `q` quits outside the search input
/// - `Tab` / `Shift+Tab`: Cycle focus between panels
/// - `Esc`: Return to search input focus
/// - `SearchInput`: characters edit the query, `Enter`/`Down` move to the note list
/// - `TagList`: j/k move, `Space`/`Enter` toggle a filter, `c` clears filters
/// - `NoteList`: j/k navigation, `Enter` opens the detail view
/// - `DetailView`: j/k scrolling
/// - `s` (outside the search input): toggle tag ordering
///
/// # Examples
///
/// ```
/// use blocknotes::tui::{App, Focus, event::handle_key_event};
/// use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
///
/// let mut app = App::new();
/// app.set_focus(Focus::NoteList);
/// let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
/// assert!(handle_key_event(&mut app, key));
/// ```
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if key.code == KeyCode::Tab {
        app.next_focus();
        return false;
    }
    if key.code == KeyCode::BackTab {
        app.prev_focus();
        return false;
    }

    if key.code == KeyCode::Esc {
        app.reset_focus();
        app.clear_selection();
        return false;
    }

    if app.focus() == Focus::SearchInput {
        handle_search_input(app, key);
        return false;
    }

    // Plain-letter shortcuts shared by every list panel
    if key.modifiers.is_empty() {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('s') => {
                app.toggle_sort();
                return false;
            }
            _ => {}
        }
    }

    match app.focus() {
        Focus::TagList => handle_tag_list(app, key),
        Focus::NoteList => handle_note_list(app, key),
        Focus::DetailView => handle_detail_view(app, key),
        Focus::SearchInput => {}
    }

    false
}

/// Accepts character input and backspace for editing the query.
fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            app.push_search_char(c);
        }
        KeyCode::Backspace => app.pop_search_char(),
        KeyCode::Enter | KeyCode::Down => app.set_focus(Focus::NoteList),
        _ => {}
    }
}

fn handle_tag_list(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.tag_cursor_next(),
        KeyCode::Char('k') | KeyCode::Up => app.tag_cursor_previous(),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_tag_under_cursor(),
        KeyCode::Char('c') => app.clear_active_tags(),
        _ => {}
    }
}

fn handle_note_list(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Enter if app.selected_note().is_some() => app.set_focus(Focus::DetailView),
        _ => {}
    }
}

fn handle_detail_view(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.scroll_detail_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_detail_up(1),
        _ => {}
    }
}
