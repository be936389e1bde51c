//! FTS5 query building utilities.

use regex::Regex;
use std::sync::LazyLock;

/// Anything that is not a letter or digit must be quoted in an FTS5 query.
///
/// Symbol names are full of these: `rad2sec-Tuple{Any}`, `Base.:+`, `sec2rad(sec)`.
static FTS5_SPECIAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]").expect("special char pattern is valid"));

/// Escape a term for FTS5 queries.
///
/// Terms containing special characters are wrapped in quotes, which makes
/// FTS5 tokenize them as a phrase.
pub fn escape_fts5_term(term: &str) -> String {
    if FTS5_SPECIAL_CHARS.is_match(term) {
        // Double any existing quotes and wrap in quotes
        let escaped = term.replace('"', "\"\"");
        format!("\"{}\"", escaped)
    } else {
        term.to_string()
    }
}

/// Build an FTS5 query string from a search term.
///
/// The query uses OR matching with prefix support:
/// - "rad2sec obliquity" → `rad2sec* OR obliquity*`
/// - "AstroBase.Util" → `"astrobase.util"*`
/// - "spherical_to_cartesian" → `"spherical_to_cartesian"*`
///
/// Terms without any letter or digit would produce an empty phrase, which
/// FTS5 rejects, so they are dropped.
pub fn build_fts5_query(search_term: &str) -> String {
    let search_term = search_term.to_lowercase();

    search_term
        .split_whitespace()
        .filter(|term| term.chars().any(char::is_alphanumeric))
        .map(|term| format!("{}*", escape_fts5_term(term)))
        .collect::<Vec<_>>()
        .join(" OR ")
}
