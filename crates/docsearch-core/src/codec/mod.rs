//! Reading and writing the `search_index.js` file format.
//!
//! The generator writes the payload as a JavaScript assignment:
//!
//! ```text
//! var documenterSearchIndex = {"docs":
//! [{"location":"...","page":"...","title":"...","text":"...","category":"..."}]
//! }
//! ```
//!
//! The reader also accepts a bare JSON object. Whatever wrapper it finds is
//! recorded as a [`Framing`] so that writing the index back reproduces the
//! original bytes.

mod atomic;
mod framing;
mod reader;
mod writer;

pub use atomic::{atomic_write_text, backup_path, read_text};
pub use framing::Framing;
pub use reader::{parse_str, read_file, ParsedIndex};
pub use writer::{check_roundtrip, to_string, write_file, RoundTrip};
