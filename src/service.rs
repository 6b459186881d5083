use rusqlite::OptionalExtension;
use time::OffsetDateTime;

use crate::db::{self, tags};
use crate::error::{Error, Result, is_unique_violation};
use crate::models::{DEFAULT_CONTENT, DEFAULT_TITLE, DesiredTag, Facet, Note, NoteId, Tag, TagId, TagSort};
use crate::reconciler::{ReconcileReport, TagReconciler};
use crate::search::sort_facets;

/// Service layer providing note management operations.
///
/// NoteService owns a Database instance and provides the application-facing
/// API for notes, tags and settings. This service is UI-independent and is
/// shared by the CLI and the TUI. Tag links are only ever changed through
/// [`NoteService::save_tags`], which delegates to the [`TagReconciler`].
///
/// # Examples
///
/// ```
/// use blocknotes::{Database, NoteService};
///
/// # fn main() -> blocknotes::Result<()> {
/// let db = Database::in_memory()?;
/// let service = NoteService::new(db);
/// # Ok(())
/// # }
/// ```
pub struct NoteService {
    db: db::Database,
}

impl NoteService {
    /// Creates a new NoteService with the given database.
    pub fn new(db: db::Database) -> Self {
        Self { db }
    }

    /// Returns a reference to the underlying database.
    ///
    /// Useful for testing or advanced operations that need direct database access.
    pub fn database(&self) -> &db::Database {
        &self.db
    }

    /// Creates a new note.
    ///
    /// A blank title is stored as [`DEFAULT_TITLE`]; missing content becomes
    /// an empty rich-text document. Both timestamps are set to now.
    ///
    /// # Examples
    ///
    /// ```
    /// use blocknotes::{Database, NoteService};
    ///
    /// # fn main() -> blocknotes::Result<()> {
    /// let service = NoteService::new(Database::in_memory()?);
    ///
    /// let note = service.create_note("  ", None)?;
    /// assert!(note.id().get() > 0);
    /// assert_eq!(note.title(), "New note");
    /// assert!(note.tags().is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn create_note(&self, title: &str, content: Option<&str>) -> Result<Note> {
        let conn = self.db.connection();
        let now = OffsetDateTime::now_utc().unix_timestamp();

        conn.execute(
            "INSERT INTO notes (title, content, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            rusqlite::params![
                normalize_title(title),
                content.unwrap_or(DEFAULT_CONTENT),
                now
            ],
        )?;
        let id = NoteId::new(conn.last_insert_rowid());
        tracing::debug!(note_id = %id, "created note");

        self.require_note(id)
    }

    /// Retrieves a note by its ID, with its tags read from the join table.
    ///
    /// Returns `None` if no note exists with the given ID. This is not
    /// considered an error condition.
    pub fn get_note(&self, id: NoteId) -> Result<Option<Note>> {
        db::note_by_id(self.db.connection(), id)
    }

    /// Lists every note, newest first, each with its tags ordered by name.
    pub fn list_notes(&self) -> Result<Vec<Note>> {
        db::all_notes(self.db.connection())
    }

    /// Replaces a note's title and content and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the note does not exist.
    pub fn update_note(&self, id: NoteId, title: &str, content: &str) -> Result<Note> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let changed = self.db.connection().execute(
            "UPDATE notes SET title = ?1, content = ?2, updated_at = ?3 WHERE id = ?4",
            rusqlite::params![normalize_title(title), content, now, id.get()],
        )?;
        if changed == 0 {
            return Err(missing_note(id));
        }
        tracing::debug!(note_id = %id, "updated note");

        self.require_note(id)
    }

    /// Deletes a note by ID. Its tag links are removed by cascade.
    ///
    /// This operation is idempotent - deleting a non-existent note succeeds.
    pub fn delete_note(&self, id: NoteId) -> Result<()> {
        let changed = self
            .db
            .connection()
            .execute("DELETE FROM notes WHERE id = ?1", [id.get()])?;
        if changed > 0 {
            tracing::debug!(note_id = %id, "deleted note");
        }
        Ok(())
    }

    /// Lists every tag, ordered by name.
    pub fn list_tags(&self) -> Result<Vec<Tag>> {
        tags::all_tags(self.db.connection())
    }

    /// Returns every tag with its global note count.
    ///
    /// Tags without notes are included with a count of zero. The order
    /// follows the persisted tag sort.
    pub fn tag_counts(&self) -> Result<Vec<Facet>> {
        let mut facets = tags::tag_counts(self.db.connection())?;
        sort_facets(&mut facets, self.tag_sort()?);
        Ok(facets)
    }

    /// Retrieves a tag by ID, or `None` if it doesn't exist.
    pub fn get_tag(&self, id: TagId) -> Result<Option<Tag>> {
        tags::find_tag(self.db.connection(), id)
    }

    /// Looks a tag up by name, ignoring case and surrounding whitespace.
    pub fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
        tags::find_tag_by_name(self.db.connection(), name)
    }

    /// Renames and recolors a tag.
    ///
    /// This is the only operation that edits an existing tag row; the
    /// reconciler never does.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the tag does not exist, the name is
    /// blank, or another tag already has that name.
    pub fn update_tag(&self, id: TagId, name: &str, color: Option<&str>) -> Result<Tag> {
        let conn = self.db.connection();
        let name = tags::normalize_name(name)?;

        if let Some(other) = tags::find_tag_by_name(conn, name)?
            && other.id() != id
        {
            return Err(Error::validation(
                "name",
                format!("a tag named '{name}' already exists"),
            ));
        }

        let changed = conn
            .execute(
                "UPDATE tags SET name = ?1, color = ?2 WHERE id = ?3",
                rusqlite::params![name, color, id.get()],
            )
            .map_err(|err| {
                if is_unique_violation(&err) {
                    Error::validation("name", format!("a tag named '{name}' already exists"))
                } else {
                    err.into()
                }
            })?;
        if changed == 0 {
            return Err(missing_tag(id));
        }
        tracing::debug!(tag_id = %id, name, "updated tag");

        tags::find_tag(conn, id)?.ok_or_else(|| missing_tag(id))
    }

    /// Deletes a tag by ID. Its note links are removed by cascade.
    ///
    /// This operation is idempotent - deleting a non-existent tag succeeds.
    pub fn delete_tag(&self, id: TagId) -> Result<()> {
        let changed = self
            .db
            .connection()
            .execute("DELETE FROM tags WHERE id = ?1", [id.get()])?;
        if changed > 0 {
            tracing::debug!(tag_id = %id, "deleted tag");
        }
        Ok(())
    }

    /// Makes a note's tags equal to `desired`, creating new tags on the way.
    ///
    /// # Examples
    ///
    /// ```
    /// use blocknotes::{Database, DesiredTag, NoteService};
    ///
    /// # fn main() -> blocknotes::Result<()> {
    /// let service = NoteService::new(Database::in_memory()?);
    /// let note = service.create_note("Project plan", None)?;
    ///
    /// service.save_tags(note.id(), &[DesiredTag::new("work")])?;
    ///
    /// let tags = service.tags_for_note(note.id())?;
    /// assert_eq!(tags.len(), 1);
    /// assert_eq!(tags[0].name(), "work");
    /// # Ok(())
    /// # }
    /// ```
    pub fn save_tags(&self, note_id: NoteId, desired: &[DesiredTag]) -> Result<ReconcileReport> {
        TagReconciler::new(&self.db).reconcile(note_id, desired)
    }

    /// Returns the tags currently linked to a note, ordered by name.
    pub fn tags_for_note(&self, note_id: NoteId) -> Result<Vec<Tag>> {
        tags::tags_for_note(self.db.connection(), note_id)
    }

    /// Reads the persisted facet ordering.
    ///
    /// A missing row or an unknown stored value falls back to
    /// [`TagSort::Count`].
    pub fn tag_sort(&self) -> Result<TagSort> {
        let stored: Option<i64> = self
            .db
            .connection()
            .query_row(
                "SELECT value FROM settings WHERE name = 'tag_sort'",
                [],
                |row| row.get::<_, Option<i64>>(0),
            )
            .optional()?
            .flatten();

        match stored.map(TagSort::try_from) {
            None => Ok(TagSort::default()),
            Some(Ok(sort)) => Ok(sort),
            Some(Err(value)) => {
                tracing::warn!(value, "unknown tag sort setting, using count");
                Ok(TagSort::default())
            }
        }
    }

    /// Persists the facet ordering.
    pub fn set_tag_sort(&self, sort: TagSort) -> Result<()> {
        self.db.connection().execute(
            "INSERT INTO settings (name, value) VALUES ('tag_sort', ?1)
             ON CONFLICT(name) DO UPDATE SET value = excluded.value",
            [sort.as_i64()],
        )?;
        tracing::debug!(%sort, "stored tag sort");
        Ok(())
    }

    /// Maps user-typed tag names to desired tags.
    ///
    /// Names of existing tags become [`DesiredTag::Existing`]; anything else
    /// becomes [`DesiredTag::New`]. Blank names are skipped and repeated
    /// names (ignoring case) are kept once.
    ///
    /// # Examples
    ///
    /// ```
    /// use blocknotes::{Database, DesiredTag, NoteService};
    ///
    /// # fn main() -> blocknotes::Result<()> {
    /// let service = NoteService::new(Database::in_memory()?);
    /// let note = service.create_note("Plan", None)?;
    /// service.save_tags(note.id(), &[DesiredTag::new("work")])?;
    ///
    /// let desired = service.resolve_tag_names(&["Work".to_string(), "idea".to_string()])?;
    /// assert!(desired[0].existing_id().is_some());
    /// assert_eq!(desired[1], DesiredTag::new("idea"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn resolve_tag_names(&self, names: &[String]) -> Result<Vec<DesiredTag>> {
        let mut seen = std::collections::HashSet::new();
        let mut desired = Vec::new();

        for name in names {
            let trimmed = name.trim();
            if trimmed.is_empty() || !seen.insert(trimmed.to_lowercase()) {
                continue;
            }
            desired.push(match self.find_tag_by_name(trimmed)? {
                Some(tag) => DesiredTag::from(&tag),
                None => DesiredTag::new(trimmed),
            });
        }

        Ok(desired)
    }

    fn require_note(&self, id: NoteId) -> Result<Note> {
        self.get_note(id)?.ok_or_else(|| missing_note(id))
    }
}

fn normalize_title(title: &str) -> &str {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        DEFAULT_TITLE
    } else {
        trimmed
    }
}

fn missing_note(id: NoteId) -> Error {
    Error::validation("note_id", format!("note {id} does not exist"))
}

fn missing_tag(id: TagId) -> Error {
    Error::validation("tag_id", format!("tag {id} does not exist"))
}

#[cfg(test)]
#[path = "service/tests.rs"]
mod tests;
