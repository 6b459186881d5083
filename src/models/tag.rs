use serde::{Deserialize, Serialize};

use super::TagId;

/// A persisted tag.
///
/// Tag names are unique (case-insensitively) across the whole collection.
/// `color` is a display hint only and carries no meaning for filtering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    id: TagId,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
}

impl Tag {
    /// Creates a tag without a color.
    ///
    /// # Examples
    ///
    /// ```
    /// use blocknotes::{Tag, TagId};
    ///
    /// let tag = Tag::new(TagId::new(1), "work");
    /// assert_eq!(tag.id(), TagId::new(1));
    /// assert_eq!(tag.name(), "work");
    /// assert_eq!(tag.color(), None);
    /// ```
    pub fn new(id: TagId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: None,
        }
    }

    /// Creates a tag with an optional display color.
    pub fn with_color(id: TagId, name: impl Into<String>, color: Option<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color,
        }
    }

    /// Returns the tag's unique identifier.
    pub fn id(&self) -> TagId {
        self.id
    }

    /// Returns the tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the display color, if any.
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }
}

/// A tag annotated with the number of notes carrying it within one view.
///
/// A count only means something for the note set it was computed from;
/// facets are rebuilt from scratch whenever that set changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    #[serde(flatten)]
    pub tag: Tag,
    pub count: usize,
}

impl Facet {
    pub fn new(tag: Tag, count: usize) -> Self {
        Self { tag, count }
    }
}
