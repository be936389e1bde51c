//! Textual wrapper around the JSON payload.

use crate::config::IndexFileConfig;
use serde::{Deserialize, Serialize};

/// Everything in the file that is not the entry array itself.
///
/// A file is reassembled as
/// `prefix + {"docs": + open_gap + <array> + close_gap + } + suffix`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Framing {
    /// Name of the assigned variable; `None` for a bare JSON object.
    pub variable: Option<String>,
    /// Text before the opening brace, e.g. `var documenterSearchIndex = `.
    pub prefix: String,
    /// Whitespace between `"docs":` and the opening bracket.
    pub open_gap: String,
    /// Whitespace between the closing bracket and the closing brace.
    pub close_gap: String,
    /// Text after the closing brace: an optional `;` and trailing whitespace.
    pub suffix: String,
}

impl Framing {
    /// The framing the documentation generator emits.
    pub fn documenter() -> Self {
        Self::assignment(IndexFileConfig::VARIABLE_NAME)
    }

    /// `var <name> = {"docs":\n[...]\n}` with no trailing newline.
    pub fn assignment(variable: &str) -> Self {
        Self {
            variable: Some(variable.to_string()),
            prefix: format!("var {} = ", variable),
            open_gap: "\n".to_string(),
            close_gap: "\n".to_string(),
            suffix: String::new(),
        }
    }

    /// Compact bare JSON, `{"docs":[...]}`.
    pub fn bare_json() -> Self {
        Self {
            variable: None,
            prefix: String::new(),
            open_gap: String::new(),
            close_gap: String::new(),
            suffix: String::new(),
        }
    }

    pub fn is_assignment(&self) -> bool {
        self.variable.is_some()
    }

    /// Whether this framing is exactly what the generator would write.
    pub fn is_canonical(&self) -> bool {
        *self == Self::documenter()
    }
}

impl Default for Framing {
    fn default() -> Self {
        Self::documenter()
    }
}
