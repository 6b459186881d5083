/// Base schema for the notes application.
///
/// Uses CREATE TABLE/INDEX IF NOT EXISTS for idempotent execution.
/// Columns added after the first release live in [`MIGRATIONS`].
pub const INITIAL_SCHEMA: &str = r#"
-- Notes table: title plus an opaque content payload
CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    title TEXT NOT NULL,
    content TEXT
);

-- Tags table: names are unique regardless of case
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    name TEXT NOT NULL UNIQUE COLLATE NOCASE
);

-- Junction table: links notes to tags (many-to-many)
CREATE TABLE IF NOT EXISTS note_tags (
    note_id INTEGER NOT NULL,
    tag_id INTEGER NOT NULL,
    PRIMARY KEY (note_id, tag_id),
    FOREIGN KEY (note_id) REFERENCES notes(id) ON DELETE CASCADE,
    FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
);

-- Global application settings
CREATE TABLE IF NOT EXISTS settings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE,
    value INTEGER DEFAULT 0
);

INSERT INTO settings (name, value)
VALUES ('tag_sort', 0)
ON CONFLICT(name) DO NOTHING;

-- Indexes for efficient junction table lookups
CREATE INDEX IF NOT EXISTS idx_note_tags_note ON note_tags(note_id);
CREATE INDEX IF NOT EXISTS idx_note_tags_tag ON note_tags(tag_id);
"#;

/// Column additions, one statement per line.
///
/// Each line is executed on every open; "duplicate column" failures mean the
/// column is already there and are ignored.
pub const MIGRATIONS: &str = r#"
-- Timestamps, written as unix seconds by the service layer
ALTER TABLE notes ADD COLUMN created_at INTEGER
ALTER TABLE notes ADD COLUMN updated_at INTEGER
-- Display color for tags
ALTER TABLE tags ADD COLUMN color TEXT
"#;

/// Indexes that depend on migrated columns.
pub const POST_MIGRATION_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_notes_created ON notes(created_at);
"#;
