//! A single indexed page fragment.

use super::Category;
use serde::{Deserialize, Deserializer, Serialize};

/// One entry of a documentation search index.
///
/// Field order is significant: it is the order the fields are written back
/// out, and the generator's output has to be reproduced byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocEntry {
    /// Relative URL with an optional `#fragment`.
    pub location: String,
    /// Human-readable title of the page the fragment belongs to.
    pub page: String,
    /// Heading text or fully qualified symbol name.
    pub title: String,
    /// Prose or docstring. Empty for bare section headings; a missing or
    /// `null` text reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    pub category: Category,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl DocEntry {
    pub fn new(
        location: impl Into<String>,
        page: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            location: location.into(),
            page: page.into(),
            title: title.into(),
            text: text.into(),
            category,
        }
    }

    /// Location without its fragment.
    pub fn path(&self) -> &str {
        match self.location.split_once('#') {
            Some((path, _)) => path,
            None => &self.location,
        }
    }

    /// Fragment identifier, if the location has a `#`.
    pub fn anchor(&self) -> Option<&str> {
        self.location.split_once('#').map(|(_, anchor)| anchor)
    }

    /// Unqualified symbol name for API entries.
    ///
    /// `AstroBase.Util.rad2sec` yields `rad2sec`. Non-API entries have none.
    pub fn symbol_name(&self) -> Option<&str> {
        if !self.category.is_api() {
            return None;
        }
        let title = self.title.trim();
        if title.is_empty() {
            return None;
        }
        // Operators like `Base.:+` keep everything after the last module dot.
        let name = title.rsplit_once('.').map_or(title, |(_, name)| name);
        if name.is_empty() {
            Some(title)
        } else {
            Some(name.trim_start_matches(':'))
        }
    }

    pub fn is_api(&self) -> bool {
        self.category.is_api()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(location: &str, title: &str) -> DocEntry {
        DocEntry::new(location, "Utilities", title, "rad2sec(rad)", Category::Method)
    }

    #[test]
    fn test_path_and_anchor() {
        let entry = method(
            "modules/util.html#AstroBase.Util.rad2sec-Tuple{Any}",
            "AstroBase.Util.rad2sec",
        );
        assert_eq!(entry.path(), "modules/util.html");
        assert_eq!(entry.anchor(), Some("AstroBase.Util.rad2sec-Tuple{Any}"));
    }

    #[test]
    fn test_null_or_missing_text_deserializes_empty() {
        let entry: DocEntry = serde_json::from_str(
            r#"{"location":"index.html","page":"Home","title":"Home","text":null,"category":"page"}"#,
        )
        .unwrap();
        assert_eq!(entry.text, "");

        let entry: DocEntry = serde_json::from_str(
            r#"{"location":"index.html","page":"Home","title":"Home","category":"page"}"#,
        )
        .unwrap();
        assert_eq!(entry.text, "");

        assert!(serde_json::from_str::<DocEntry>(
            r#"{"location":"index.html","page":"Home","title":"Home","text":3,"category":"page"}"#,
        )
        .is_err());
    }

    #[test]
    fn test_trailing_hash_has_empty_anchor() {
        let entry = DocEntry::new("modules/util.html#", "Utilities", "Utilities", "", Category::Page);
        assert_eq!(entry.path(), "modules/util.html");
        assert_eq!(entry.anchor(), Some(""));

        let entry = DocEntry::new("index.html", "Home", "Home", "", Category::Page);
        assert_eq!(entry.anchor(), None);
    }

    #[test]
    fn test_symbol_name() {
        let entry = method("x", "AstroBase.Util.rad2sec");
        assert_eq!(entry.symbol_name(), Some("rad2sec"));

        let entry = method("x", "rad2sec");
        assert_eq!(entry.symbol_name(), Some("rad2sec"));

        let section = DocEntry::new("x", "Utilities", "Utilities", "", Category::Section);
        assert_eq!(section.symbol_name(), None);
    }

    #[test]
    fn test_serializes_in_generator_field_order() {
        let entry = DocEntry::new("a.html#b", "A", "B", "", Category::Section);
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"location":"a.html#b","page":"A","title":"B","text":"","category":"section"}"#
        );
    }

    #[test]
    fn test_missing_text_defaults_to_empty() {
        let entry: DocEntry = serde_json::from_str(
            r#"{"location":"a.html","page":"A","title":"A","category":"page"}"#,
        )
        .unwrap();
        assert_eq!(entry.text, "");
    }
}
