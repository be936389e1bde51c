//! SQLite document index with FTS5 full-text search.
//!
//! This module provides:
//! - Entry storage in SQLite, keyed by position in the search index
//! - FTS5 full-text search over titles and docstrings
//! - Query building and search execution

mod doc_index;
mod fts5;
mod query;

pub use doc_index::{DocIndex, SearchHit, SearchQuery, SearchResult};
pub use fts5::{FTS5Config, FTS5Manager, FTS5Stats};
pub use query::{build_fts5_query, escape_fts5_term};
