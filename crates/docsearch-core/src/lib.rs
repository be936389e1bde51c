//! Docsearch Core - Headless library for documentation search indexes.
//!
//! Reads the `search_index.js` payload a documentation generator writes for
//! client-side search, checks it, and answers full-text queries against it
//! without a browser.
//!
//! # Example
//!
//! ```rust,ignore
//! use docsearch_core::{codec, DocIndex, SearchQuery};
//!
//! fn main() -> docsearch_core::Result<()> {
//!     let parsed = codec::read_file("build/search_index.js".as_ref())?;
//!
//!     let index = DocIndex::from_search_index(&parsed.index)?;
//!     let result = index.search(&SearchQuery::new("rad2sec"))?;
//!     for hit in result.hits {
//!         println!("{}  {}", hit.entry.location, hit.entry.title);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod stats;
pub mod validate;

pub use codec::{Framing, ParsedIndex, RoundTrip};
pub use error::{DocSearchError, Result};
pub use index::{DocIndex, SearchHit, SearchQuery, SearchResult};
pub use models::{Category, DocEntry, SearchIndex};
pub use stats::{IndexStats, PageCount};
pub use validate::{validate, Issue, Rule, Severity, ValidationOptions, ValidationReport};
