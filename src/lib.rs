pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod reconciler;
pub mod search;
pub mod service;
pub mod tui;
pub mod utils;

pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use models::{
    DEFAULT_CONTENT, DEFAULT_TITLE, DesiredTag, Facet, NEW_TAG_ID, Note, NoteBuilder, NoteId, Tag,
    TagId, TagSort,
};
pub use reconciler::{ReconcileReport, TagReconciler};
pub use search::{EmptyMatch, SearchOptions, SearchResult, search};
pub use service::NoteService;
