//! Serialization of search indexes back to their file form.

use super::atomic::atomic_write_text;
use super::reader::parse_str;
use super::Framing;
use crate::config::IndexFileConfig;
use crate::models::SearchIndex;
use crate::Result;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Outcome of re-emitting a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundTrip {
    /// Re-emitting with the observed framing reproduced the input exactly.
    pub identical: bool,
    /// The input is byte-for-byte what the generator would write.
    pub canonical: bool,
    /// Byte offset of the first difference, if any.
    pub first_difference: Option<usize>,
}

/// Render an index inside `framing`.
///
/// Entries are written as compact JSON with non-ASCII text left unescaped,
/// which is how the generator lays them out.
pub fn to_string(index: &SearchIndex, framing: &Framing) -> Result<String> {
    let array = serde_json::to_string(&index.docs)?;

    let mut out = String::with_capacity(
        framing.prefix.len() + array.len() + framing.suffix.len() + 16,
    );
    out.push_str(&framing.prefix);
    out.push_str("{\"");
    out.push_str(IndexFileConfig::DOCS_KEY);
    out.push_str("\":");
    out.push_str(&framing.open_gap);
    out.push_str(&array);
    out.push_str(&framing.close_gap);
    out.push('}');
    out.push_str(&framing.suffix);
    Ok(out)
}

/// Write an index file atomically.
pub fn write_file(
    path: &Path,
    index: &SearchIndex,
    framing: &Framing,
    keep_backup: bool,
) -> Result<()> {
    let contents = to_string(index, framing)?;
    atomic_write_text(path, &contents, keep_backup)?;
    debug!("Wrote {} entries to {}", index.len(), path.display());
    Ok(())
}

/// Parse `raw` and check whether writing it back reproduces it.
pub fn check_roundtrip(raw: &str) -> Result<RoundTrip> {
    let parsed = parse_str(raw)?;

    let same_framing = to_string(&parsed.index, &parsed.framing)?;
    let canonical = to_string(&parsed.index, &Framing::documenter())?;

    Ok(RoundTrip {
        identical: same_framing == raw,
        canonical: canonical == raw,
        first_difference: first_difference(raw, &same_framing),
    })
}

fn first_difference(a: &str, b: &str) -> Option<usize> {
    let common = a
        .bytes()
        .zip(b.bytes())
        .position(|(x, y)| x != y);
    match common {
        Some(offset) => Some(offset),
        None if a.len() != b.len() => Some(a.len().min(b.len())),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, DocEntry};

    fn sample() -> SearchIndex {
        SearchIndex::new(vec![
            DocEntry::new(
                "modules/two_body.html#AstroBase.TwoBody.transform-NTuple{4,Any}",
                "Two-Body Problem",
                "AstroBase.TwoBody.transform",
                "transform(from, to, a, ecc)\n\n\"Robust resolution of Kepler’s equation\"",
                Category::Method,
            ),
            DocEntry::new("index.html#AstroBase.jl-1", "Home", "AstroBase.jl", "", Category::Section),
        ])
    }

    #[test]
    fn test_documenter_layout() {
        let text = to_string(&sample(), &Framing::documenter()).unwrap();
        assert!(text.starts_with("var documenterSearchIndex = {\"docs\":\n[{\"location\":"));
        assert!(text.ends_with("\"category\":\"section\"}]\n}"));
        // Non-ASCII stays raw, quotes and newlines are escaped.
        assert!(text.contains("Kepler’s"));
        assert!(text.contains("\\n\\n\\\"Robust"));
    }

    #[test]
    fn test_bare_json_layout() {
        let index = SearchIndex::default();
        assert_eq!(to_string(&index, &Framing::bare_json()).unwrap(), "{\"docs\":[]}");
    }

    #[test]
    fn test_roundtrip_generated_text() {
        let text = to_string(&sample(), &Framing::documenter()).unwrap();
        let report = check_roundtrip(&text).unwrap();
        assert!(report.identical);
        assert!(report.canonical);
        assert_eq!(report.first_difference, None);
    }

    #[test]
    fn test_roundtrip_reports_noncanonical_spacing() {
        let raw = "{ \"docs\": [ ] }";
        let report = check_roundtrip(raw).unwrap();
        assert!(!report.identical);
        assert!(!report.canonical);
        assert_eq!(report.first_difference, Some(1));
    }

    #[test]
    fn test_roundtrip_keeps_semicolon_and_newline() {
        let raw = "var idx = {\"docs\":[]};\n";
        let report = check_roundtrip(raw).unwrap();
        assert!(report.identical);
        assert!(!report.canonical);
    }

    #[test]
    fn test_write_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("search_index.js");

        write_file(&path, &sample(), &Framing::documenter(), false).unwrap();
        let parsed = crate::codec::read_file(&path).unwrap();
        assert_eq!(parsed.index, sample());
        assert!(parsed.framing.is_canonical());
    }

    #[test]
    fn test_first_difference() {
        assert_eq!(first_difference("abc", "abc"), None);
        assert_eq!(first_difference("abc", "abd"), Some(2));
        assert_eq!(first_difference("abc", "ab"), Some(2));
    }
}
