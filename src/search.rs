//! In-memory search over a loaded note collection.
//!
//! Every call recomputes the visible notes and their tag facets from the
//! full collection: tag filters first (a note must carry every active tag),
//! then the fuzzy text query over title and extracted content. Facets are
//! counted over the notes that survive both stages.

mod facets;
mod fuzzy;
mod text;

use std::str::FromStr;

use serde::Serialize;

use crate::models::{Facet, Note, Tag, TagId, TagSort};

pub use facets::{compute_facets, sort_facets};
pub use fuzzy::{Haystack, Matcher, bounded_levenshtein, typo_budget};
pub use text::extract_text;

/// What a non-blank query that matches nothing should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyMatch {
    /// Show no notes.
    #[default]
    KeepEmpty,
    /// Show every note that passes the tag filters.
    AllNotes,
}

impl FromStr for EmptyMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "empty" => Ok(Self::KeepEmpty),
            "all" => Ok(Self::AllNotes),
            other => Err(format!("unknown empty-match mode '{other}' (expected 'empty' or 'all')")),
        }
    }
}

/// Tuning knobs for [`search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Upper bound on typos tolerated per query term.
    pub max_typos: usize,
    pub on_empty_match: EmptyMatch,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_typos: 2,
            on_empty_match: EmptyMatch::KeepEmpty,
        }
    }
}

/// The notes to show and the tag facets for the current filter state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub notes: Vec<Note>,
    pub facets: Vec<Facet>,
}

/// Filters `notes` by active tags and `query`, and computes tag facets.
///
/// Result notes keep their order in `notes`. A blank query matches every
/// tag-filtered note. Facets cover the tags in `tags` that occur on at least
/// one returned note, ordered by `sort`. Pure function: nothing is read
/// from or written to storage.
///
/// # Examples
///
/// ```
/// use blocknotes::{NoteBuilder, NoteId, Tag, TagId, TagSort};
/// use blocknotes::search::{search, SearchOptions};
///
/// let work = Tag::new(TagId::new(5), "work");
/// let notes = vec![
///     NoteBuilder::new().id(NoteId::new(1)).title("Grocery list").build(),
///     NoteBuilder::new().id(NoteId::new(2)).title("Project plan").tags(vec![work.clone()]).build(),
/// ];
///
/// let result = search(&notes, &[work.clone()], "", &[work.id()], TagSort::Count, &SearchOptions::default());
///
/// assert_eq!(result.notes.len(), 1);
/// assert_eq!(result.notes[0].id(), NoteId::new(2));
/// assert_eq!(result.facets[0].count, 1);
/// ```
pub fn search(
    notes: &[Note],
    tags: &[Tag],
    query: &str,
    active: &[TagId],
    sort: TagSort,
    options: &SearchOptions,
) -> SearchResult {
    let tag_filtered: Vec<&Note> = notes
        .iter()
        .filter(|note| active.iter().all(|&id| note.has_tag(id)))
        .collect();

    let visible: Vec<Note> = match Matcher::new(query, options.max_typos) {
        None => tag_filtered.iter().map(|&note| note.clone()).collect(),
        Some(matcher) => {
            let matched: Vec<Note> = tag_filtered
                .iter()
                .filter(|note| note_matches(&matcher, note))
                .map(|&note| note.clone())
                .collect();
            if matched.is_empty() && options.on_empty_match == EmptyMatch::AllNotes {
                tracing::debug!(query, "no matches, falling back to tag-filtered notes");
                tag_filtered.iter().map(|&note| note.clone()).collect()
            } else {
                matched
            }
        }
    };

    let mut facets = compute_facets(&visible, tags);
    sort_facets(&mut facets, sort);

    SearchResult {
        notes: visible,
        facets,
    }
}

fn note_matches(matcher: &Matcher, note: &Note) -> bool {
    let title = Haystack::new(note.title());
    let body = Haystack::new(&extract_text(note.content()));
    matcher.matches(&[&title, &body])
}
