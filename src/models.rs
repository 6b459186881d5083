mod desired_tag;
mod ids;
mod note;
mod tag;
mod tag_sort;

pub use desired_tag::{DesiredTag, NEW_TAG_ID};
pub use ids::{NoteId, TagId};
pub use note::{DEFAULT_CONTENT, DEFAULT_TITLE, Note, NoteBuilder};
pub use tag::{Facet, Tag};
pub use tag_sort::TagSort;
