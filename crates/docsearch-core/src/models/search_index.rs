//! The top-level `{"docs": [...]}` container.

use super::{Category, DocEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered list of document entries, as consumed by the search widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchIndex {
    pub docs: Vec<DocEntry>,
}

impl SearchIndex {
    pub fn new(docs: Vec<DocEntry>) -> Self {
        Self { docs }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DocEntry> {
        self.docs.iter()
    }

    /// Distinct page titles in the order they first appear.
    pub fn pages(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.docs
            .iter()
            .map(|entry| entry.page.as_str())
            .filter(|page| seen.insert(*page))
            .collect()
    }

    pub fn entries_for_page<'a>(&'a self, page: &'a str) -> impl Iterator<Item = &'a DocEntry> {
        self.docs.iter().filter(move |entry| entry.page == page)
    }

    /// All entries sharing `location`. Locations are not unique in practice.
    pub fn find_by_location(&self, location: &str) -> Vec<&DocEntry> {
        self.docs
            .iter()
            .filter(|entry| entry.location == location)
            .collect()
    }

    pub fn filter_category<'a>(
        &'a self,
        category: &'a Category,
    ) -> impl Iterator<Item = &'a DocEntry> {
        self.docs.iter().filter(move |entry| &entry.category == category)
    }
}

impl FromIterator<DocEntry> for SearchIndex {
    fn from_iter<I: IntoIterator<Item = DocEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a SearchIndex {
    type Item = &'a DocEntry;
    type IntoIter = std::slice::Iter<'a, DocEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SearchIndex {
        SearchIndex::new(vec![
            DocEntry::new("modules/util.html#Utilities-1", "Utilities", "Utilities", "", Category::Section),
            DocEntry::new("modules/util.html#", "Utilities", "Utilities", "DocTestSetup = nothing", Category::Page),
            DocEntry::new("index.html#AstroBase.jl-1", "Home", "AstroBase.jl", "", Category::Section),
            DocEntry::new("modules/util.html#", "Utilities", "Utilities", "Private = false", Category::Page),
            DocEntry::new(
                "modules/util.html#AstroBase.Util.sec2rad-Tuple{Any}",
                "Utilities",
                "AstroBase.Util.sec2rad",
                "sec2rad(sec)",
                Category::Method,
            ),
        ])
    }

    #[test]
    fn test_deserialize_agrees_with_codec_on_null_text() {
        let raw = r#"{"docs":[{"location":"a.html","page":"A","title":"A","text":null,"category":"page"}]}"#;

        let direct: SearchIndex = serde_json::from_str(raw).unwrap();
        let parsed = crate::codec::parse_str(raw).unwrap();
        assert_eq!(direct, parsed.index);
        assert_eq!(direct.docs[0].text, "");
    }

    #[test]
    fn test_pages_keep_first_seen_order() {
        assert_eq!(sample().pages(), vec!["Utilities", "Home"]);
    }

    #[test]
    fn test_entries_for_page() {
        let index = sample();
        assert_eq!(index.entries_for_page("Utilities").count(), 4);
        assert_eq!(index.entries_for_page("Home").count(), 1);
        assert_eq!(index.entries_for_page("Missing").count(), 0);
    }

    #[test]
    fn test_find_by_location_returns_all_duplicates() {
        let index = sample();
        assert_eq!(index.find_by_location("modules/util.html#").len(), 2);
        assert!(index.find_by_location("nowhere.html").is_empty());
    }

    #[test]
    fn test_filter_category() {
        let index = sample();
        let methods: Vec<_> = index.filter_category(&Category::Method).collect();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].title, "AstroBase.Util.sec2rad");
    }

    #[test]
    fn test_container_rejects_extra_keys() {
        let result: Result<SearchIndex, _> = serde_json::from_str(r#"{"docs":[],"version":1}"#);
        assert!(result.is_err());
    }
}
