//! UI rendering functions for the TUI.
//!
//! Lays out the search input on top, then the tag sidebar, note list and
//! detail view side by side, with a shortcut bar at the bottom.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use super::app::{App, Focus};
use crate::models::TagSort;
use crate::search::extract_text;
use crate::utils::{format_timestamp, truncate};

const TITLE_WIDTH: usize = 40;

/// Main rendering function for the TUI.
pub fn draw(frame: &mut Frame, app: &App) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search input
            Constraint::Min(0),    // Content area
            Constraint::Length(1), // Shortcut bar
        ])
        .split(frame.area());

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20), // Tags
            Constraint::Percentage(30), // Notes
            Constraint::Percentage(50), // Detail
        ])
        .split(main_chunks[1]);

    render_search_input(frame, app, main_chunks[0]);
    render_tag_list(frame, app, content_chunks[0]);
    render_note_list(frame, app, content_chunks[1]);
    render_detail_view(frame, app, content_chunks[2]);
    render_shortcut_bar(frame, app, main_chunks[2]);
}

fn panel(title: String, focused: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style)
}

fn render_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus() == Focus::SearchInput;

    let mut content = app.search_input().to_string();
    if is_focused {
        content.push('█');
    }

    let paragraph = Paragraph::new(content).block(panel("Search".to_string(), is_focused));
    frame.render_widget(paragraph, area);
}

/// Renders tag facets: active filters are marked, counts follow the name.
fn render_tag_list(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus() == Focus::TagList;
    let order = match app.sort() {
        TagSort::Count => "by count",
        TagSort::Name => "by name",
    };

    let items: Vec<ListItem> = app
        .facets()
        .iter()
        .map(|facet| {
            let active = app.is_active(facet.tag.id());
            let marker = if active { "[x] " } else { "[ ] " };
            let name_style = if active {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::raw(marker),
                Span::styled(facet.tag.name().to_string(), name_style),
                Span::styled(
                    format!(" ({})", facet.count),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(panel(format!("Tags ({order})"), is_focused))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if is_focused {
        state.select(app.tag_cursor());
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_note_list(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus() == Focus::NoteList;

    let items: Vec<ListItem> = app
        .notes()
        .iter()
        .map(|note| {
            let date = format_timestamp(note.created_at());
            let line = Line::from(vec![
                Span::raw(truncate(note.title(), TITLE_WIDTH)),
                Span::raw(" "),
                Span::styled(
                    format!("[{} | {} tags]", &date[..10.min(date.len())], note.tags().len()),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    let title = format!("Notes ({}/{})", app.notes().len(), app.all_notes().len());
    let list = List::new(items).block(panel(title, is_focused)).highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::REVERSED),
    );

    let mut list_state = ListState::default();
    list_state.select(app.selected_index());
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_detail_view(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus() == Focus::DetailView;
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);

    let content = if let Some(note) = app.selected_note() {
        let mut text = Text::default();

        text.lines.push(Line::from(Span::styled(note.title().to_string(), bold)));

        if !note.tags().is_empty() {
            let mut spans = vec![Span::styled("Tags: ", bold)];
            for tag in note.tags() {
                spans.push(Span::styled(
                    format!("#{} ", tag.name()),
                    Style::default().fg(Color::Cyan),
                ));
            }
            text.lines.push(Line::from(spans));
        }

        text.lines.push(Line::from(vec![
            Span::styled("Created: ", bold),
            Span::styled(format_timestamp(note.created_at()), dim),
            Span::styled("  Updated: ", bold),
            Span::styled(format_timestamp(note.updated_at()), dim),
        ]));
        text.lines.push(Line::from(""));

        let body = extract_text(note.content());
        for line in body.lines() {
            text.lines.push(Line::from(line.to_string()));
        }

        text
    } else if app.notes().is_empty() && !app.search_input().trim().is_empty() {
        Text::from("No notes match the search")
    } else {
        Text::from("No note selected")
    };

    let paragraph = Paragraph::new(content)
        .block(panel("Detail".to_string(), is_focused))
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll(), 0));

    frame.render_widget(paragraph, area);
}

/// Shows context-aware keyboard shortcuts based on current focus state.
fn render_shortcut_bar(frame: &mut Frame, app: &App, area: Rect) {
    let key_style = Style::default().fg(Color::Cyan);
    let sep_style = Style::default().fg(Color::DarkGray);

    let mut shortcuts: Vec<(&str, &str)> = vec![("Ctrl+C", "quit"), ("Tab", "next panel"), ("Esc", "reset")];
    match app.focus() {
        Focus::SearchInput => shortcuts.push(("Enter", "to notes")),
        Focus::TagList => {
            shortcuts.push(("j/k", "move"));
            shortcuts.push(("Space", "toggle filter"));
            shortcuts.push(("c", "clear filters"));
            shortcuts.push(("s", "sort"));
        }
        Focus::NoteList => {
            shortcuts.push(("j/k", "navigate"));
            shortcuts.push(("s", "sort"));
        }
        Focus::DetailView => shortcuts.push(("j/k", "scroll")),
    }

    let mut spans = Vec::new();
    for (i, (key, action)) in shortcuts.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", sep_style));
        }
        spans.push(Span::styled(key, key_style));
        spans.push(Span::raw(format!(": {action}")));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
