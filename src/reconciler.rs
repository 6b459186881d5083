//! Tag reconciliation: turning a note's desired tag set into link changes.
//!
//! Given the tags a note should carry, the reconciler creates tags that do
//! not exist yet, links everything that is missing and unlinks whatever is
//! no longer wanted. All writes of one call share a transaction.

use std::collections::HashSet;

use rusqlite::Connection;
use serde::Serialize;

use crate::db::{Database, tags};
use crate::error::{Error, Result};
use crate::models::{DesiredTag, NoteId, TagId};

/// Desired tags split by whether they still need to be created.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagPlan<'a> {
    /// Tags identified by name only, with their optional color.
    pub to_create: Vec<(&'a str, Option<&'a str>)>,
    /// Ids of tags that already exist.
    pub to_link: Vec<TagId>,
}

impl<'a> TagPlan<'a> {
    /// Partitions desired tags into creations and plain links.
    ///
    /// # Examples
    ///
    /// ```
    /// use blocknotes::{DesiredTag, TagId};
    /// use blocknotes::reconciler::TagPlan;
    ///
    /// let desired = vec![DesiredTag::new("urgent"), DesiredTag::Existing(TagId::new(5))];
    /// let plan = TagPlan::new(&desired);
    ///
    /// assert_eq!(plan.to_create, vec![("urgent", None)]);
    /// assert_eq!(plan.to_link, vec![TagId::new(5)]);
    /// ```
    pub fn new(desired: &'a [DesiredTag]) -> Self {
        let mut plan = Self::default();
        for tag in desired {
            match tag {
                DesiredTag::Existing(id) => plan.to_link.push(*id),
                DesiredTag::New { name, color } => {
                    plan.to_create.push((name.as_str(), color.as_deref()))
                }
            }
        }
        plan
    }
}

/// Returns the ids in `current` that are not in `keep`, in `current` order.
pub fn links_to_remove(current: &[TagId], keep: &HashSet<TagId>) -> Vec<TagId> {
    current
        .iter()
        .copied()
        .filter(|id| !keep.contains(id))
        .collect()
}

/// What one reconcile call actually changed.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Tags inserted into the tag table.
    pub created: Vec<TagId>,
    /// Links that did not exist before.
    pub linked: Vec<TagId>,
    /// Links removed from the note.
    pub unlinked: Vec<TagId>,
}

impl ReconcileReport {
    /// Returns true if the call wrote nothing.
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.linked.is_empty() && self.unlinked.is_empty()
    }
}

/// Applies desired tag sets to notes.
///
/// The reconciler is the only writer of the note/tag join table.
pub struct TagReconciler<'d> {
    db: &'d Database,
}

impl<'d> TagReconciler<'d> {
    pub fn new(db: &'d Database) -> Self {
        Self { db }
    }

    /// Makes the note's linked tags equal to `desired`.
    ///
    /// New tags are created (or resolved to an existing tag with the same
    /// name) before linking. Links to tags outside the resolved set are
    /// removed; the tags themselves are kept. Runs in one transaction, so a
    /// failure leaves the note's links as they were.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the note, or a referenced existing tag,
    /// does not exist, or a new tag has a blank name. Store failures are
    /// returned as persistence errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use blocknotes::{Database, DesiredTag, NoteService};
    /// use blocknotes::reconciler::TagReconciler;
    ///
    /// # fn main() -> blocknotes::Result<()> {
    /// let service = NoteService::new(Database::in_memory()?);
    /// let note = service.create_note("Project plan", None)?;
    ///
    /// let report = TagReconciler::new(service.database())
    ///     .reconcile(note.id(), &[DesiredTag::new("work")])?;
    /// assert_eq!(report.created.len(), 1);
    /// assert_eq!(report.linked, report.created);
    /// # Ok(())
    /// # }
    /// ```
    pub fn reconcile(&self, note_id: NoteId, desired: &[DesiredTag]) -> Result<ReconcileReport> {
        let tx = self.db.transaction()?;
        let report = apply(&tx, note_id, desired)?;
        tx.commit()?;

        tracing::debug!(
            note_id = %note_id,
            created = report.created.len(),
            linked = report.linked.len(),
            unlinked = report.unlinked.len(),
            "reconciled note tags"
        );
        Ok(report)
    }
}

fn apply(conn: &Connection, note_id: NoteId, desired: &[DesiredTag]) -> Result<ReconcileReport> {
    if !tags::note_exists(conn, note_id)? {
        return Err(Error::validation(
            "note_id",
            format!("note {note_id} does not exist"),
        ));
    }

    let plan = TagPlan::new(desired);
    let current: Vec<TagId> = tags::tags_for_note(conn, note_id)?
        .iter()
        .map(|t| t.id())
        .collect();

    let mut report = ReconcileReport::default();
    let mut keep: HashSet<TagId> = HashSet::new();

    for (name, color) in &plan.to_create {
        let (tag_id, created) = tags::insert_tag(conn, name, *color)?;
        if created {
            report.created.push(tag_id);
        }
        if keep.insert(tag_id) && tags::link_note_tag(conn, note_id, tag_id)? {
            report.linked.push(tag_id);
        }
    }

    for &tag_id in &plan.to_link {
        if !keep.insert(tag_id) {
            continue;
        }
        if !tags::tag_exists(conn, tag_id)? {
            return Err(Error::validation(
                "tag_id",
                format!("tag {tag_id} does not exist"),
            ));
        }
        if tags::link_note_tag(conn, note_id, tag_id)? {
            report.linked.push(tag_id);
        }
    }

    for tag_id in links_to_remove(&current, &keep) {
        if tags::unlink_note_tag(conn, note_id, tag_id)? {
            report.unlinked.push(tag_id);
        }
    }

    Ok(report)
}
