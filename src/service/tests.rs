use super::*;
use crate::Database;

fn setup() -> NoteService {
    let db = Database::in_memory().expect("failed to create in-memory database");
    NoteService::new(db)
}

fn tag_names(tags: &[Tag]) -> Vec<&str> {
    tags.iter().map(|t| t.name()).collect()
}

#[test]
fn note_service_construction_with_in_memory_database() {
    let service = setup();

    let count: i64 = service
        .database()
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('notes','tags','note_tags','settings')",
            [],
            |row| row.get(0),
        )
        .expect("failed to query schema");

    assert_eq!(count, 4, "expected notes, tags, note_tags and settings");
}

// --- Notes ---

#[test]
fn create_note_returns_persisted_note() {
    let service = setup();

    let note = service
        .create_note("Grocery list", Some("milk, eggs"))
        .expect("failed to create note");

    assert!(note.id().get() > 0, "note ID should be positive");
    assert_eq!(note.title(), "Grocery list");
    assert_eq!(note.content(), "milk, eggs");
    assert!(note.tags().is_empty(), "note should have no tags");
    assert_eq!(note.created_at(), note.updated_at());
}

#[test]
fn create_note_defaults_title_and_content() {
    let service = setup();

    let note = service.create_note("   ", None).unwrap();

    assert_eq!(note.title(), DEFAULT_TITLE);
    assert_eq!(note.content(), DEFAULT_CONTENT);
}

#[test]
fn create_note_trims_title() {
    let service = setup();

    let note = service.create_note("  Project plan \n", None).unwrap();

    assert_eq!(note.title(), "Project plan");
}

#[test]
fn get_note_returns_none_for_non_existent_id() {
    let service = setup();

    let result = service
        .get_note(NoteId::new(999))
        .expect("get_note should not error for non-existent ID");

    assert_eq!(result, None, "should return None for non-existent note");
}

#[test]
fn get_note_reads_tags_from_join() {
    let service = setup();
    let note = service.create_note("Plan", None).unwrap();
    service
        .save_tags(note.id(), &[DesiredTag::new("work"), DesiredTag::new("idea")])
        .unwrap();

    let fetched = service.get_note(note.id()).unwrap().unwrap();

    assert_eq!(tag_names(fetched.tags()), vec!["idea", "work"]);
}

#[test]
fn list_notes_is_newest_first() {
    let service = setup();
    let first = service.create_note("First", None).unwrap();
    let second = service.create_note("Second", None).unwrap();
    let third = service.create_note("Third", None).unwrap();

    let ids: Vec<NoteId> = service.list_notes().unwrap().iter().map(|n| n.id()).collect();

    assert_eq!(ids, vec![third.id(), second.id(), first.id()]);
}

#[test]
fn list_notes_respects_created_at_over_id() {
    let service = setup();
    let conn = service.database().connection();
    conn.execute_batch(
        "INSERT INTO notes (id, title, created_at, updated_at) VALUES (1, 'recent', 500, 500);
         INSERT INTO notes (id, title, created_at, updated_at) VALUES (2, 'older', 100, 100);",
    )
    .unwrap();

    let titles: Vec<String> = service
        .list_notes()
        .unwrap()
        .iter()
        .map(|n| n.title().to_string())
        .collect();

    assert_eq!(titles, vec!["recent", "older"]);
}

#[test]
fn list_notes_on_empty_database() {
    let service = setup();
    assert!(service.list_notes().unwrap().is_empty());
}

#[test]
fn update_note_replaces_title_and_content() {
    let service = setup();
    let note = service.create_note("Draft", None).unwrap();

    let updated = service
        .update_note(note.id(), "Final", "# Done")
        .expect("failed to update note");

    assert_eq!(updated.id(), note.id());
    assert_eq!(updated.title(), "Final");
    assert_eq!(updated.content(), "# Done");
    assert!(updated.updated_at() >= note.updated_at());
    assert_eq!(updated.created_at(), note.created_at());
}

#[test]
fn update_note_with_blank_title_uses_default() {
    let service = setup();
    let note = service.create_note("Draft", None).unwrap();

    let updated = service.update_note(note.id(), "", "body").unwrap();

    assert_eq!(updated.title(), DEFAULT_TITLE);
}

#[test]
fn update_note_keeps_tags() {
    let service = setup();
    let note = service.create_note("Draft", None).unwrap();
    service.save_tags(note.id(), &[DesiredTag::new("work")]).unwrap();

    let updated = service.update_note(note.id(), "Draft 2", "").unwrap();

    assert_eq!(tag_names(updated.tags()), vec!["work"]);
}

#[test]
fn update_unknown_note_is_validation_error() {
    let service = setup();

    let err = service
        .update_note(NoteId::new(404), "t", "c")
        .unwrap_err();

    assert!(err.is_validation());
}

#[test]
fn delete_note_removes_note_and_links_but_keeps_tags() {
    let service = setup();
    let note = service.create_note("Doomed", None).unwrap();
    service.save_tags(note.id(), &[DesiredTag::new("work")]).unwrap();

    service.delete_note(note.id()).expect("failed to delete note");

    assert!(service.get_note(note.id()).unwrap().is_none());
    let links: i64 = service
        .database()
        .connection()
        .query_row("SELECT COUNT(*) FROM note_tags", [], |row| row.get(0))
        .unwrap();
    assert_eq!(links, 0);
    assert!(service.find_tag_by_name("work").unwrap().is_some());
}

#[test]
fn delete_note_is_idempotent() {
    let service = setup();
    let note = service.create_note("Once", None).unwrap();

    service.delete_note(note.id()).unwrap();
    service
        .delete_note(note.id())
        .expect("second delete should succeed");
    service
        .delete_note(NoteId::new(12345))
        .expect("deleting a missing note should succeed");
}

// --- Tags ---

#[test]
fn list_tags_is_sorted_by_name() {
    let service = setup();
    let note = service.create_note("n", None).unwrap();
    service
        .save_tags(
            note.id(),
            &[
                DesiredTag::new("zeta"),
                DesiredTag::new("Alpha"),
                DesiredTag::new("mid"),
            ],
        )
        .unwrap();

    assert_eq!(tag_names(&service.list_tags().unwrap()), vec!["Alpha", "mid", "zeta"]);
}

#[test]
fn tag_counts_are_global_and_follow_stored_sort() {
    let service = setup();
    let a = service.create_note("a", None).unwrap();
    let b = service.create_note("b", None).unwrap();
    service
        .save_tags(a.id(), &[DesiredTag::new("work"), DesiredTag::new("beta")])
        .unwrap();
    service.save_tags(b.id(), &[DesiredTag::new("work")]).unwrap();
    let unused = service.create_note("c", None).unwrap();
    service.save_tags(unused.id(), &[DesiredTag::new("alpha")]).unwrap();
    service.save_tags(unused.id(), &[]).unwrap();

    let summary = |facets: Vec<Facet>| -> Vec<(String, usize)> {
        facets
            .into_iter()
            .map(|f| (f.tag.name().to_string(), f.count))
            .collect()
    };

    assert_eq!(
        summary(service.tag_counts().unwrap()),
        vec![
            ("work".to_string(), 2),
            ("beta".to_string(), 1),
            ("alpha".to_string(), 0)
        ]
    );

    service.set_tag_sort(TagSort::Name).unwrap();
    assert_eq!(
        summary(service.tag_counts().unwrap()),
        vec![
            ("alpha".to_string(), 0),
            ("beta".to_string(), 1),
            ("work".to_string(), 2)
        ]
    );
}

#[test]
fn find_tag_by_name_ignores_case() {
    let service = setup();
    let note = service.create_note("n", None).unwrap();
    service.save_tags(note.id(), &[DesiredTag::new("Rust")]).unwrap();

    let found = service.find_tag_by_name(" rust ").unwrap();

    assert_eq!(found.map(|t| t.name().to_string()), Some("Rust".to_string()));
    assert!(service.find_tag_by_name("python").unwrap().is_none());
}

#[test]
fn get_tag_by_id() {
    let service = setup();
    let note = service.create_note("n", None).unwrap();
    let report = service
        .save_tags(
            note.id(),
            &[DesiredTag::New {
                name: "work".to_string(),
                color: Some("#00f".to_string()),
            }],
        )
        .unwrap();

    let tag = service.get_tag(report.created[0]).unwrap().unwrap();

    assert_eq!(tag.name(), "work");
    assert_eq!(tag.color(), Some("#00f"));
    assert!(service.get_tag(TagId::new(999)).unwrap().is_none());
}

#[test]
fn update_tag_renames_and_recolors() {
    let service = setup();
    let note = service.create_note("n", None).unwrap();
    service.save_tags(note.id(), &[DesiredTag::new("wrk")]).unwrap();
    let tag = service.find_tag_by_name("wrk").unwrap().unwrap();

    let updated = service
        .update_tag(tag.id(), " work ", Some("#00f"))
        .expect("failed to update tag");

    assert_eq!(updated.id(), tag.id());
    assert_eq!(updated.name(), "work");
    assert_eq!(updated.color(), Some("#00f"));
    assert_eq!(tag_names(&service.tags_for_note(note.id()).unwrap()), vec!["work"]);
}

#[test]
fn update_tag_can_change_case_of_its_own_name() {
    let service = setup();
    let note = service.create_note("n", None).unwrap();
    service.save_tags(note.id(), &[DesiredTag::new("rust")]).unwrap();
    let tag = service.find_tag_by_name("rust").unwrap().unwrap();

    let updated = service.update_tag(tag.id(), "Rust", None).unwrap();

    assert_eq!(updated.name(), "Rust");
}

#[test]
fn update_tag_to_taken_name_is_validation_error() {
    let service = setup();
    let note = service.create_note("n", None).unwrap();
    service
        .save_tags(note.id(), &[DesiredTag::new("work"), DesiredTag::new("home")])
        .unwrap();
    let home = service.find_tag_by_name("home").unwrap().unwrap();

    let err = service.update_tag(home.id(), "WORK", None).unwrap_err();

    assert!(matches!(err, Error::Validation { ref field, .. } if field == "name"));
    assert_eq!(service.list_tags().unwrap().len(), 2);
}

#[test]
fn update_unknown_tag_is_validation_error() {
    let service = setup();

    let err = service.update_tag(TagId::new(77), "x", None).unwrap_err();

    assert!(matches!(err, Error::Validation { ref field, .. } if field == "tag_id"));
}

#[test]
fn update_tag_rejects_blank_name() {
    let service = setup();
    let note = service.create_note("n", None).unwrap();
    service.save_tags(note.id(), &[DesiredTag::new("work")]).unwrap();
    let tag = service.find_tag_by_name("work").unwrap().unwrap();

    assert!(service.update_tag(tag.id(), "  ", None).unwrap_err().is_validation());
}

#[test]
fn delete_tag_unlinks_from_notes_and_is_idempotent() {
    let service = setup();
    let note = service.create_note("n", None).unwrap();
    service
        .save_tags(note.id(), &[DesiredTag::new("work"), DesiredTag::new("home")])
        .unwrap();
    let work = service.find_tag_by_name("work").unwrap().unwrap();

    service.delete_tag(work.id()).unwrap();
    service.delete_tag(work.id()).unwrap();

    assert_eq!(tag_names(&service.tags_for_note(note.id()).unwrap()), vec!["home"]);
    assert!(service.find_tag_by_name("work").unwrap().is_none());
}

// --- Reconcile through the service ---

#[test]
fn save_tags_reports_minimal_changes() {
    let service = setup();
    let note = service.create_note("n", None).unwrap();

    let first = service
        .save_tags(note.id(), &[DesiredTag::new("work"), DesiredTag::new("idea")])
        .unwrap();
    let work = service.find_tag_by_name("work").unwrap().unwrap();
    let second = service
        .save_tags(note.id(), &[DesiredTag::Existing(work.id())])
        .unwrap();

    assert_eq!(first.created.len(), 2);
    assert_eq!(first.linked.len(), 2);
    assert!(second.created.is_empty());
    assert!(second.linked.is_empty());
    assert_eq!(second.unlinked.len(), 1);
}

#[test]
fn save_tags_on_missing_note_is_validation_error() {
    let service = setup();

    let err = service
        .save_tags(NoteId::new(5), &[DesiredTag::new("x")])
        .unwrap_err();

    assert!(err.is_validation());
}

#[test]
fn resolve_tag_names_maps_known_and_new_names() {
    let service = setup();
    let note = service.create_note("n", None).unwrap();
    service.save_tags(note.id(), &[DesiredTag::new("work")]).unwrap();
    let work = service.find_tag_by_name("work").unwrap().unwrap();

    let desired = service
        .resolve_tag_names(&[
            "WORK".to_string(),
            "urgent".to_string(),
            "  ".to_string(),
            "Urgent".to_string(),
        ])
        .unwrap();

    assert_eq!(
        desired,
        vec![DesiredTag::Existing(work.id()), DesiredTag::new("urgent")]
    );
}

#[test]
fn resolved_names_round_trip_through_save_tags() {
    let service = setup();
    let note = service.create_note("n", None).unwrap();
    let names = vec!["rust".to_string(), "cli".to_string()];

    let desired = service.resolve_tag_names(&names).unwrap();
    service.save_tags(note.id(), &desired).unwrap();
    let again = service.resolve_tag_names(&names).unwrap();
    let report = service.save_tags(note.id(), &again).unwrap();

    assert!(again.iter().all(|d| d.existing_id().is_some()));
    assert!(report.is_noop());
}

// --- Settings ---

#[test]
fn tag_sort_defaults_to_count() {
    let service = setup();
    assert_eq!(service.tag_sort().unwrap(), TagSort::Count);
}

#[test]
fn set_tag_sort_persists() {
    let service = setup();

    service.set_tag_sort(TagSort::Name).unwrap();
    assert_eq!(service.tag_sort().unwrap(), TagSort::Name);

    service.set_tag_sort(TagSort::Count).unwrap();
    assert_eq!(service.tag_sort().unwrap(), TagSort::Count);
}

#[test]
fn unknown_stored_tag_sort_falls_back_to_count() {
    let service = setup();
    service
        .database()
        .connection()
        .execute("UPDATE settings SET value = 9 WHERE name = 'tag_sort'", [])
        .unwrap();

    assert_eq!(service.tag_sort().unwrap(), TagSort::Count);
}

#[test]
fn missing_tag_sort_row_is_recreated_on_set() {
    let service = setup();
    service
        .database()
        .connection()
        .execute("DELETE FROM settings", [])
        .unwrap();

    assert_eq!(service.tag_sort().unwrap(), TagSort::Count);
    service.set_tag_sort(TagSort::Name).unwrap();
    assert_eq!(service.tag_sort().unwrap(), TagSort::Name);
}
