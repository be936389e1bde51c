//! Summary statistics for a search index.

use crate::models::SearchIndex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Entry count for one page, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCount {
    pub page: String,
    pub entries: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub total_entries: usize,
    pub distinct_locations: usize,
    pub distinct_pages: usize,
    /// Keyed by category tag, sorted.
    pub by_category: BTreeMap<String, usize>,
    pub by_page: Vec<PageCount>,
    pub empty_text_entries: usize,
    pub total_text_bytes: usize,
}

impl IndexStats {
    pub fn compute(index: &SearchIndex) -> Self {
        let mut locations = HashSet::new();
        let mut by_category: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_page: Vec<PageCount> = Vec::new();
        let mut empty_text_entries = 0;
        let mut total_text_bytes = 0;

        for entry in index {
            locations.insert(entry.location.as_str());
            *by_category
                .entry(entry.category.as_str().to_string())
                .or_default() += 1;

            match by_page.iter_mut().find(|count| count.page == entry.page) {
                Some(count) => count.entries += 1,
                None => by_page.push(PageCount {
                    page: entry.page.clone(),
                    entries: 1,
                }),
            }

            if entry.text.is_empty() {
                empty_text_entries += 1;
            }
            total_text_bytes += entry.text.len();
        }

        Self {
            total_entries: index.len(),
            distinct_locations: locations.len(),
            distinct_pages: by_page.len(),
            by_category,
            by_page,
            empty_text_entries,
            total_text_bytes,
        }
    }

    pub fn category_count(&self, tag: &str) -> usize {
        self.by_category.get(tag).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, DocEntry};

    #[test]
    fn test_compute() {
        let index = SearchIndex::new(vec![
            DocEntry::new("c.html#Constants-1", "Constants", "Constants", "", Category::Section),
            DocEntry::new("c.html#", "Constants", "Constants", "Private = false", Category::Page),
            DocEntry::new("c.html#", "Constants", "Constants", "DocTestSetup = nothing", Category::Page),
            DocEntry::new("index.html#Home-1", "Home", "Home", "", Category::Section),
        ]);

        let stats = IndexStats::compute(&index);
        assert_eq!(stats.total_entries, 4);
        assert_eq!(stats.distinct_locations, 3);
        assert_eq!(stats.distinct_pages, 2);
        assert_eq!(stats.category_count("page"), 2);
        assert_eq!(stats.category_count("section"), 2);
        assert_eq!(stats.category_count("method"), 0);
        assert_eq!(stats.empty_text_entries, 2);
        assert_eq!(stats.total_text_bytes, "Private = false".len() + "DocTestSetup = nothing".len());
        assert_eq!(
            stats.by_page,
            vec![
                PageCount { page: "Constants".into(), entries: 3 },
                PageCount { page: "Home".into(), entries: 1 },
            ]
        );
    }

    #[test]
    fn test_empty_index() {
        let stats = IndexStats::compute(&SearchIndex::default());
        assert_eq!(stats, IndexStats::default());
    }
}
