//! Row-level operations on `tags` and `note_tags`.
//!
//! Every function takes a plain `&Connection` so it can run either directly
//! or inside a caller-owned transaction (which derefs to a connection).

use rusqlite::{Connection, OptionalExtension};

use crate::error::{Error, Result, is_unique_violation};
use crate::models::{Facet, NoteId, Tag, TagId};

/// Trims a tag name and rejects names that are empty afterwards.
pub fn normalize_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("name", "tag name cannot be empty"));
    }
    Ok(trimmed)
}

/// Inserts a tag, or resolves to the existing tag with the same name.
///
/// Returns the tag id and whether a new row was written. A name clash is
/// the expected outcome when several callers create the same tag; it is
/// resolved here and never surfaces as an error. The existing tag's color
/// is left untouched.
pub fn insert_tag(conn: &Connection, name: &str, color: Option<&str>) -> Result<(TagId, bool)> {
    let name = normalize_name(name)?;

    // Older databases declare `UNIQUE (name)` without NOCASE.
    if let Some(existing) = find_tag_by_name(conn, name)? {
        tracing::debug!(tag_id = %existing.id(), name, "tag name exists, reusing");
        return Ok((existing.id(), false));
    }

    match conn.execute(
        "INSERT INTO tags (name, color) VALUES (?1, ?2)",
        rusqlite::params![name, color],
    ) {
        Ok(_) => {
            let id = TagId::new(conn.last_insert_rowid());
            tracing::debug!(tag_id = %id, name, "created tag");
            Ok((id, true))
        }
        Err(err) if is_unique_violation(&err) => {
            let existing = find_tag_by_name(conn, name)?.ok_or(err)?;
            tracing::debug!(tag_id = %existing.id(), name, "tag name exists, reusing");
            Ok((existing.id(), false))
        }
        Err(err) => Err(err.into()),
    }
}

/// Links a tag to a note; linking an already-linked pair is a no-op.
///
/// Returns true if a new link row was written.
pub fn link_note_tag(conn: &Connection, note_id: NoteId, tag_id: TagId) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO note_tags (note_id, tag_id) VALUES (?1, ?2)",
        [note_id.get(), tag_id.get()],
    )?;
    Ok(changed == 1)
}

/// Removes a note/tag link. The tag row itself is kept.
///
/// Returns true if a link row was deleted.
pub fn unlink_note_tag(conn: &Connection, note_id: NoteId, tag_id: TagId) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM note_tags WHERE note_id = ?1 AND tag_id = ?2",
        [note_id.get(), tag_id.get()],
    )?;
    Ok(changed == 1)
}

/// Returns the tags currently linked to a note, ordered by name.
pub fn tags_for_note(conn: &Connection, note_id: NoteId) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name, t.color
         FROM tags t
         JOIN note_tags nt ON nt.tag_id = t.id
         WHERE nt.note_id = ?1
         ORDER BY t.name COLLATE NOCASE, t.id",
    )?;
    let tags = stmt
        .query_map([note_id.get()], tag_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tags)
}

/// Returns every tag, ordered by name.
pub fn all_tags(conn: &Connection) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, color FROM tags ORDER BY name COLLATE NOCASE, id",
    )?;
    let tags = stmt
        .query_map([], tag_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tags)
}

/// Returns every tag with the number of notes linked to it.
///
/// Unused tags are included with a count of zero. Rows come back in name
/// order; callers apply the configured facet ordering.
pub fn tag_counts(conn: &Connection) -> Result<Vec<Facet>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name, t.color, COUNT(nt.tag_id)
         FROM tags t
         LEFT JOIN note_tags nt ON nt.tag_id = t.id
         GROUP BY t.id
         ORDER BY t.name COLLATE NOCASE, t.id",
    )?;
    let facets = stmt
        .query_map([], |row| {
            let count: i64 = row.get(3)?;
            Ok(Facet::new(
                tag_from_row(row)?,
                usize::try_from(count).unwrap_or(0),
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(facets)
}

/// Looks a tag up by name (case-insensitive, surrounding whitespace ignored).
pub fn find_tag_by_name(conn: &Connection, name: &str) -> Result<Option<Tag>> {
    let tag = conn
        .query_row(
            "SELECT id, name, color FROM tags WHERE name = ?1 COLLATE NOCASE ORDER BY id LIMIT 1",
            [name.trim()],
            tag_from_row,
        )
        .optional()?;
    Ok(tag)
}

/// Looks a tag up by id.
pub fn find_tag(conn: &Connection, id: TagId) -> Result<Option<Tag>> {
    let tag = conn
        .query_row(
            "SELECT id, name, color FROM tags WHERE id = ?1",
            [id.get()],
            tag_from_row,
        )
        .optional()?;
    Ok(tag)
}

pub fn tag_exists(conn: &Connection, id: TagId) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM tags WHERE id = ?1)",
        [id.get()],
        |row| row.get(0),
    )?;
    Ok(exists)
}

pub fn note_exists(conn: &Connection, id: NoteId) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM notes WHERE id = ?1)",
        [id.get()],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn tag_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag::with_color(
        TagId::new(row.get(0)?),
        row.get::<_, String>(1)?,
        row.get(2)?,
    ))
}
