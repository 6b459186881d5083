//! Tag facets over a set of notes.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use crate::models::{Facet, Note, Tag, TagId, TagSort};

/// Counts, for every tag in `tags`, how many of `notes` carry it.
///
/// Tags no note carries are left out. A note that lists the same tag twice
/// is counted once. The result follows `tags` order.
pub fn compute_facets<'a>(notes: impl IntoIterator<Item = &'a Note>, tags: &[Tag]) -> Vec<Facet> {
    let mut counts: HashMap<TagId, usize> = HashMap::new();
    for note in notes {
        let distinct: HashSet<TagId> = note.tags().iter().map(Tag::id).collect();
        for id in distinct {
            *counts.entry(id).or_default() += 1;
        }
    }

    let mut seen = HashSet::new();
    tags.iter()
        .filter(|tag| seen.insert(tag.id()))
        .filter_map(|tag| {
            counts
                .get(&tag.id())
                .map(|&count| Facet::new(tag.clone(), count))
        })
        .collect()
}

/// Orders facets in place.
///
/// `Count` puts the most used tags first; ties, and `Name` ordering, compare
/// names case-insensitively. The tag id breaks any remaining tie so the
/// order is total.
pub fn sort_facets(facets: &mut [Facet], sort: TagSort) {
    match sort {
        TagSort::Count => facets.sort_by_cached_key(|f| {
            (Reverse(f.count), f.tag.name().to_lowercase(), f.tag.id())
        }),
        TagSort::Name => facets.sort_by_cached_key(|f| (f.tag.name().to_lowercase(), f.tag.id())),
    }
}
