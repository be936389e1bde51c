//! Entry category tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a document entry within its page.
///
/// The set is open: tags this crate does not know about are kept verbatim in
/// [`Category::Other`] so they survive a read/write cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Section,
    Page,
    Method,
    Function,
    Constant,
    Type,
    Macro,
    Module,
    Other(String),
}

impl Category {
    /// Every tag with a dedicated variant.
    pub const KNOWN: [Category; 8] = [
        Category::Section,
        Category::Page,
        Category::Method,
        Category::Function,
        Category::Constant,
        Category::Type,
        Category::Macro,
        Category::Module,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Category::Section => "section",
            Category::Page => "page",
            Category::Method => "method",
            Category::Function => "function",
            Category::Constant => "constant",
            Category::Type => "type",
            Category::Macro => "macro",
            Category::Module => "module",
            Category::Other(tag) => tag,
        }
    }

    /// Whether entries of this category document a code symbol.
    pub fn is_api(&self) -> bool {
        matches!(
            self,
            Category::Method
                | Category::Function
                | Category::Constant
                | Category::Type
                | Category::Macro
                | Category::Module
        )
    }

    /// Whether entries of this category must carry a docstring.
    pub fn requires_text(&self) -> bool {
        matches!(self, Category::Method | Category::Function)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Category::Other(_))
    }
}

impl From<&str> for Category {
    fn from(tag: &str) -> Self {
        match tag {
            "section" => Category::Section,
            "page" => Category::Page,
            "method" => Category::Method,
            "function" => Category::Function,
            "constant" => Category::Constant,
            "type" => Category::Type,
            "macro" => Category::Macro,
            "module" => Category::Module,
            other => Category::Other(other.to_string()),
        }
    }
}

impl From<String> for Category {
    fn from(tag: String) -> Self {
        match Category::from(tag.as_str()) {
            Category::Other(_) => Category::Other(tag),
            known => known,
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags_parse() {
        for category in Category::KNOWN {
            assert_eq!(Category::from(category.as_str()), category);
            assert!(category.is_known());
        }
    }

    #[test]
    fn test_unknown_tag_is_preserved() {
        let category = Category::from("keyword".to_string());
        assert_eq!(category, Category::Other("keyword".into()));
        assert!(!category.is_known());
        assert_eq!(String::from(category), "keyword");
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        assert_eq!(Category::from("Method"), Category::Other("Method".into()));
    }

    #[test]
    fn test_serde_uses_plain_strings() {
        let json = serde_json::to_string(&Category::Method).unwrap();
        assert_eq!(json, "\"method\"");

        let parsed: Category = serde_json::from_str("\"constant\"").unwrap();
        assert_eq!(parsed, Category::Constant);
    }

    #[test]
    fn test_api_and_required_text() {
        assert!(Category::Method.is_api());
        assert!(Category::Constant.is_api());
        assert!(!Category::Section.is_api());

        assert!(Category::Function.requires_text());
        assert!(!Category::Constant.requires_text());
        assert!(!Category::Page.requires_text());
    }
}
