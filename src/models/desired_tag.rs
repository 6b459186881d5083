use serde::{Deserialize, Serialize};

use super::{Tag, TagId};

/// Id the presentation layer uses for a tag that has not been persisted yet.
pub const NEW_TAG_ID: i64 = -1;

/// One entry of the tag set a note should end up with.
///
/// Either an already-persisted tag referenced by id, or a tag that has to be
/// created (or found) by name first. On the wire this is the familiar
/// `{ "id": ..., "name": ..., "color": ... }` shape where an id of `-1`
/// marks the new-tag case.
///
/// # Examples
///
/// ```
/// use blocknotes::{DesiredTag, TagId};
///
/// let tags: Vec<DesiredTag> =
///     serde_json::from_str(r#"[{"id":-1,"name":"urgent"},{"id":5,"name":"work"}]"#).unwrap();
///
/// assert_eq!(tags[0], DesiredTag::new("urgent"));
/// assert_eq!(tags[1], DesiredTag::Existing(TagId::new(5)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTagRef", into = "RawTagRef")]
pub enum DesiredTag {
    /// A tag that already exists.
    Existing(TagId),
    /// A tag identified by name only; created if no tag has that name.
    New { name: String, color: Option<String> },
}

impl DesiredTag {
    /// Shorthand for a new tag without a color.
    pub fn new(name: impl Into<String>) -> Self {
        Self::New {
            name: name.into(),
            color: None,
        }
    }

    /// Returns the existing tag id, if this entry references one.
    pub fn existing_id(&self) -> Option<TagId> {
        match self {
            Self::Existing(id) => Some(*id),
            Self::New { .. } => None,
        }
    }
}

impl From<&Tag> for DesiredTag {
    fn from(tag: &Tag) -> Self {
        Self::Existing(tag.id())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawTagRef {
    id: i64,
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
}

impl TryFrom<RawTagRef> for DesiredTag {
    type Error = String;

    fn try_from(raw: RawTagRef) -> Result<Self, Self::Error> {
        match raw.id {
            NEW_TAG_ID => Ok(Self::New {
                name: raw.name,
                color: raw.color,
            }),
            id if id > 0 => Ok(Self::Existing(TagId::new(id))),
            id => Err(format!("invalid tag id {id}")),
        }
    }
}

impl From<DesiredTag> for RawTagRef {
    fn from(tag: DesiredTag) -> Self {
        match tag {
            DesiredTag::Existing(id) => Self {
                id: id.get(),
                name: String::new(),
                color: None,
            },
            DesiredTag::New { name, color } => Self {
                id: NEW_TAG_ID,
                name,
                color,
            },
        }
    }
}
