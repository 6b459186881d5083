//! Shared helpers for the CLI and TUI.
//!
//! These functions are reused across both interfaces.

use std::path::Path;

use anyhow::{Context, Result};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::Note;
use crate::search::extract_text;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// Ensures the parent directory of the database file exists.
///
/// Creates the directory structure if it doesn't exist using `create_dir_all`.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn ensure_database_directory(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create database directory: {}", parent.display())
        })?;
    }
    Ok(())
}

/// Parses comma-separated tags from a string.
///
/// Splits on commas, trims whitespace from each tag, and filters out empty strings.
///
/// # Examples
///
/// ```
/// use blocknotes::utils::parse_tags;
///
/// let tags = parse_tags("rust, learning, ");
/// assert_eq!(tags, vec!["rust", "learning"]);
/// ```
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Formats a timestamp as `YYYY-MM-DD HH:MM` (UTC).
pub fn format_timestamp(at: OffsetDateTime) -> String {
    at.format(DATE_FORMAT)
        .unwrap_or_else(|_| at.unix_timestamp().to_string())
}

/// Returns the first `max_chars` characters of a note's plain text on one line.
///
/// Newlines collapse to spaces; an ellipsis marks truncation.
pub fn preview(note: &Note, max_chars: usize) -> String {
    let text = extract_text(note.content());
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&flat, max_chars)
}

/// Shortens `s` to at most `max_chars` characters, ending in `…` when cut.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Joins a note's tag names for display, e.g. `#rust #cli`.
pub fn format_tag_list(note: &Note) -> String {
    note.tags()
        .iter()
        .map(|t| format!("#{}", t.name()))
        .collect::<Vec<_>>()
        .join(" ")
}
