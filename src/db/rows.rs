//! Flat join rows and their folding into nested notes.
//!
//! A `notes LEFT JOIN note_tags LEFT JOIN tags` query yields one row per
//! (note, tag) pair and a single row with NULL tag columns for untagged
//! notes. [`collect_notes`] turns that into one [`Note`] per id.

use std::collections::HashMap;

use rusqlite::types::{Type, ValueRef};
use rusqlite::{Connection, Row};
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::error::Result;
use crate::models::{Note, NoteBuilder, NoteId, Tag, TagId};

const NOTE_TAG_ROWS: &str = "SELECT n.id, n.title, n.content, n.created_at, n.updated_at,
        t.id, t.name, t.color
 FROM notes n
 LEFT JOIN note_tags nt ON nt.note_id = n.id
 LEFT JOIN tags t ON t.id = nt.tag_id";

// Timestamps are unix seconds, or `datetime` text in databases the web app created.
const NOTE_ORDER: &str = "ORDER BY
    CASE typeof(n.created_at)
        WHEN 'text' THEN CAST(strftime('%s', n.created_at) AS INTEGER)
        ELSE n.created_at
    END DESC,
    n.id DESC, t.name COLLATE NOCASE, t.id";

/// Format SQLite's `datetime()` and `CURRENT_TIMESTAMP` produce (UTC).
const SQLITE_DATETIME: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// One row of the note/tag join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteTagRow {
    pub note_id: i64,
    pub title: String,
    pub content: Option<String>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub tag_id: Option<i64>,
    pub tag_name: Option<String>,
    pub tag_color: Option<String>,
}

impl NoteTagRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            note_id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            created_at: unix_seconds(row, 3)?,
            updated_at: unix_seconds(row, 4)?,
            tag_id: row.get(5)?,
            tag_name: row.get(6)?,
            tag_color: row.get(7)?,
        })
    }

    fn tag(&self) -> Option<Tag> {
        match (self.tag_id, &self.tag_name) {
            (Some(id), Some(name)) => Some(Tag::with_color(
                TagId::new(id),
                name.clone(),
                self.tag_color.clone(),
            )),
            _ => None,
        }
    }
}

/// Reads a timestamp column as unix seconds.
///
/// Accepts integers and SQLite datetime text; NULL stays `None`.
fn unix_seconds(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<i64>> {
    let conversion = |ty: Type, err: Box<dyn std::error::Error + Send + Sync>| {
        rusqlite::Error::FromSqlConversionFailure(idx, ty, err)
    };

    match row.get_ref(idx)? {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(secs) => Ok(Some(secs)),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes).map_err(|e| conversion(Type::Text, Box::new(e)))?;
            parse_datetime_text(text)
                .map(Some)
                .map_err(|e| conversion(Type::Text, Box::new(e)))
        }
        other => Err(conversion(
            other.data_type(),
            "timestamp must be an integer or datetime text".into(),
        )),
    }
}

/// Parses `YYYY-MM-DD HH:MM:SS` (UTC) or RFC 3339 text into unix seconds.
fn parse_datetime_text(text: &str) -> std::result::Result<i64, time::error::Parse> {
    let text = text.trim();
    match PrimitiveDateTime::parse(text, SQLITE_DATETIME) {
        Ok(at) => Ok(at.assume_utc().unix_timestamp()),
        Err(err) => OffsetDateTime::parse(text, &Rfc3339)
            .map(|at| at.unix_timestamp())
            .map_err(|_| err),
    }
}

struct PendingNote {
    first: NoteTagRow,
    tags: Vec<Tag>,
}

/// Folds flat join rows into notes.
///
/// Notes keep the order in which their id first appears; tags keep row
/// order within each note. Rows whose tag side is NULL contribute no tag.
pub fn collect_notes(rows: impl IntoIterator<Item = NoteTagRow>) -> Result<Vec<Note>> {
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut pending: Vec<PendingNote> = Vec::new();

    for row in rows {
        let tag = row.tag();
        let slot = match index.get(&row.note_id) {
            Some(&i) => i,
            None => {
                index.insert(row.note_id, pending.len());
                pending.push(PendingNote {
                    first: row,
                    tags: Vec::new(),
                });
                pending.len() - 1
            }
        };
        if let Some(tag) = tag
            && !pending[slot].tags.iter().any(|t| t.id() == tag.id())
        {
            pending[slot].tags.push(tag);
        }
    }

    pending
        .into_iter()
        .map(|p| {
            let row = p.first;
            Ok(NoteBuilder::new()
                .id(NoteId::new(row.note_id))
                .title(row.title)
                .content(row.content.unwrap_or_default())
                .created_at(timestamp(row.created_at)?)
                .updated_at(timestamp(row.updated_at.or(row.created_at))?)
                .tags(p.tags)
                .build())
        })
        .collect()
}

/// Rows written before timestamps existed carry NULL; they sort as the epoch.
fn timestamp(value: Option<i64>) -> Result<OffsetDateTime> {
    match value {
        Some(secs) => Ok(OffsetDateTime::from_unix_timestamp(secs)?),
        None => Ok(OffsetDateTime::UNIX_EPOCH),
    }
}

/// Loads every note with its tags, newest first.
pub fn all_notes(conn: &Connection) -> Result<Vec<Note>> {
    let mut stmt = conn.prepare(&format!("{NOTE_TAG_ROWS} {NOTE_ORDER}"))?;
    let rows = stmt
        .query_map([], NoteTagRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    collect_notes(rows)
}

/// Loads one note with its tags.
pub fn note_by_id(conn: &Connection, id: NoteId) -> Result<Option<Note>> {
    let mut stmt = conn.prepare(&format!("{NOTE_TAG_ROWS} WHERE n.id = ?1 {NOTE_ORDER}"))?;
    let rows = stmt
        .query_map([id.get()], NoteTagRow::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(collect_notes(rows)?.into_iter().next())
}
