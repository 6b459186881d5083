use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{NoteId, Tag};

/// Title stored when a note is saved with a blank title.
pub const DEFAULT_TITLE: &str = "New note";

/// Content stored for a freshly created note: an empty rich-text document.
pub const DEFAULT_CONTENT: &str = r#"{"type":"doc","content":[{"type":"paragraph","content":[]}]}"#;

/// A note with its content and the tags currently linked to it.
///
/// `content` is an opaque payload (markdown or a serialized rich-text
/// document). `tags` is always derived from the join table at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    id: NoteId,
    title: String,
    content: String,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
    tags: Vec<Tag>,
}

impl Note {
    /// Returns the note's unique identifier.
    pub fn id(&self) -> NoteId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }

    /// Returns the tags linked to this note.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Returns true if a tag with the given id is linked to this note.
    pub fn has_tag(&self, id: super::TagId) -> bool {
        self.tags.iter().any(|t| t.id() == id)
    }
}

/// Builder for constructing `Note` instances with optional fields.
///
/// # Examples
///
/// ```
/// use blocknotes::{NoteBuilder, NoteId};
///
/// let note = NoteBuilder::new()
///     .id(NoteId::new(1))
///     .title("Grocery list")
///     .build();
///
/// assert_eq!(note.id(), NoteId::new(1));
/// assert_eq!(note.title(), "Grocery list");
/// assert!(note.tags().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct NoteBuilder {
    id: Option<NoteId>,
    title: Option<String>,
    content: Option<String>,
    created_at: Option<OffsetDateTime>,
    updated_at: Option<OffsetDateTime>,
    tags: Option<Vec<Tag>>,
}

impl NoteBuilder {
    /// Creates a new `NoteBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the note ID.
    pub fn id(mut self, id: NoteId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the note title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the note content payload.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Sets the created timestamp.
    pub fn created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sets the updated timestamp.
    pub fn updated_at(mut self, updated_at: OffsetDateTime) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Sets the linked tags.
    pub fn tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Builds the `Note`, using defaults for optional fields.
    ///
    /// A missing or blank title becomes [`DEFAULT_TITLE`], missing content
    /// becomes an empty string and missing timestamps become "now".
    ///
    /// # Panics
    ///
    /// Panics if `id` has not been set.
    pub fn build(self) -> Note {
        let now = OffsetDateTime::now_utc();
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        Note {
            id: self.id.expect("id is required"),
            title,
            content: self.content.unwrap_or_default(),
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
            tags: self.tags.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TagId;

    #[test]
    fn builder_creates_note_with_default_empty_tags() {
        let note = NoteBuilder::new()
            .id(NoteId::new(1))
            .title("Test")
            .content("body")
            .build();

        assert_eq!(note.id(), NoteId::new(1));
        assert_eq!(note.content(), "body");
        assert!(note.tags().is_empty());
    }

    #[test]
    fn blank_title_falls_back_to_default() {
        let note = NoteBuilder::new().id(NoteId::new(1)).title("   ").build();
        assert_eq!(note.title(), DEFAULT_TITLE);

        let untitled = NoteBuilder::new().id(NoteId::new(2)).build();
        assert_eq!(untitled.title(), DEFAULT_TITLE);
    }

    #[test]
    fn has_tag_checks_by_id() {
        let note = NoteBuilder::new()
            .id(NoteId::new(2))
            .title("Project plan")
            .tags(vec![Tag::new(TagId::new(5), "work")])
            .build();

        assert!(note.has_tag(TagId::new(5)));
        assert!(!note.has_tag(TagId::new(6)));
    }

    #[test]
    fn note_serialization_roundtrip() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let note = NoteBuilder::new()
            .id(NoteId::new(1))
            .title("Roundtrip")
            .content("Test content")
            .created_at(now)
            .updated_at(now)
            .tags(vec![Tag::new(TagId::new(3), "misc")])
            .build();

        let json = serde_json::to_string(&note).unwrap();
        let deserialized: Note = serde_json::from_str(&json).unwrap();

        assert_eq!(note, deserialized);
    }

    #[test]
    fn default_content_is_valid_json_document() {
        let value: serde_json::Value = serde_json::from_str(DEFAULT_CONTENT).unwrap();
        assert_eq!(value["type"], "doc");
    }
}
