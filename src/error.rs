//! Error types for the note store and tag reconciler.
//!
//! Duplicate tag names are not an error here: the tag store resolves them to
//! the existing row before anything reaches the caller.

use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input or a reference to a row that does not exist.
    #[error("Validation error in {field}: {message}")]
    Validation { field: String, message: String },

    /// The store is unreachable or rejected a write for an unexpected reason.
    #[error("Persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// A stored timestamp is outside the representable range.
    #[error("Invalid stored timestamp: {0}")]
    Timestamp(#[from] time::error::ComponentRange),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a validation error for the given field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true for errors caused by caller input rather than the store.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Returns true if `err` is a UNIQUE constraint violation.
///
/// Foreign key and NOT NULL violations share the primary constraint code, so
/// the extended code is what tells a name clash apart.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let err = Error::validation("note_id", "note 3 does not exist");
        assert_eq!(
            err.to_string(),
            "Validation error in note_id: note 3 does not exist"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn rusqlite_errors_become_persistence_errors() {
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, Error::Persistence(_)));
        assert!(!err.is_validation());
    }

    #[test]
    fn unique_violation_is_recognised() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .unwrap();

        let err = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .unwrap_err();
        assert!(is_unique_violation(&err));

        let other = rusqlite::Error::QueryReturnedNoRows;
        assert!(!is_unique_violation(&other));
    }

    #[test]
    fn not_null_violation_is_not_a_unique_violation() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT NOT NULL);")
            .unwrap();

        let err = conn
            .execute("INSERT INTO t VALUES (NULL)", [])
            .unwrap_err();
        assert!(!is_unique_violation(&err));
    }
}
