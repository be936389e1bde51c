//! Data models for documentation search indexes.
//!
//! These types mirror the records the documentation generator emits, in the
//! field order the client-side search widget expects.

mod category;
mod entry;
mod search_index;

pub use category::*;
pub use entry::*;
pub use search_index::*;
