//! Runtime configuration read from the environment.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::search::{EmptyMatch, SearchOptions};

pub const DB_VAR: &str = "BLOCKNOTES_DB";
pub const TEST_DB_VAR: &str = "BLOCKNOTES_USE_TEST_DB";
pub const EMPTY_SEARCH_VAR: &str = "BLOCKNOTES_EMPTY_SEARCH";
pub const MAX_TYPOS_VAR: &str = "BLOCKNOTES_MAX_TYPOS";
pub const LOG_VAR: &str = "BLOCKNOTES_LOG";

const APP_DIR: &str = "blocknotes";
const DB_FILE: &str = "notes.db";
const TEST_DB_FILE: &str = "notes_test.db";

/// Application configuration.
///
/// # Environment Variables
///
/// - `BLOCKNOTES_DB` (path): database file, default `{data_dir}/blocknotes/notes.db`
/// - `BLOCKNOTES_USE_TEST_DB` (any value): default file becomes `notes_test.db`
/// - `BLOCKNOTES_EMPTY_SEARCH` (`empty` | `all`, default `empty`): what a query
///   matching nothing shows
/// - `BLOCKNOTES_MAX_TYPOS` (usize, default 2): typo cap per query term
/// - `BLOCKNOTES_LOG` (tracing filter): read by the binary's log setup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Explicit database path, if configured.
    pub database_path: Option<PathBuf>,
    pub use_test_db: bool,
    pub search: SearchOptions,
}

/// Loads a `.env` file from the working directory or one of its parents.
///
/// Variables already set in the environment win over the file. Returns the
/// path of the loaded file, or `None` when there is none.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// Call [`load_dotenv`] first for `.env` support.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// Unset and empty variables take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the variable when a value cannot be
    /// parsed.
    ///
    /// # Examples
    ///
    /// ```
    /// use blocknotes::Config;
    /// use blocknotes::search::EmptyMatch;
    ///
    /// let config = Config::from_lookup(|key| match key {
    ///     "BLOCKNOTES_EMPTY_SEARCH" => Some("all".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(config.search.on_empty_match, EmptyMatch::AllNotes);
    /// assert_eq!(config.search.max_typos, 2);
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = SearchOptions::default();

        let on_empty_match = match get(EMPTY_SEARCH_VAR) {
            Some(raw) => raw
                .parse::<EmptyMatch>()
                .map_err(|message| Error::validation(EMPTY_SEARCH_VAR, message))?,
            None => defaults.on_empty_match,
        };

        let max_typos = match get(MAX_TYPOS_VAR) {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                Error::validation(
                    MAX_TYPOS_VAR,
                    format!("expected a non-negative integer, got '{raw}'"),
                )
            })?,
            None => defaults.max_typos,
        };

        Ok(Self {
            database_path: get(DB_VAR).map(PathBuf::from),
            use_test_db: get(TEST_DB_VAR).is_some(),
            search: SearchOptions {
                max_typos,
                on_empty_match,
            },
        })
    }

    /// Resolves the database file to open.
    ///
    /// An explicit `BLOCKNOTES_DB` wins; otherwise the file lives in the
    /// platform data directory:
    /// - Linux: `~/.local/share/blocknotes`
    /// - macOS: `~/Library/Application Support/blocknotes`
    /// - Windows: `C:\Users\<user>\AppData\Roaming\blocknotes`
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the data directory cannot be determined.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "failed to determine data directory",
            )
        })?;
        let file = if self.use_test_db { TEST_DB_FILE } else { DB_FILE };

        Ok(data_dir.join(APP_DIR).join(file))
    }
}
