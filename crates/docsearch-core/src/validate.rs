//! Structural checks over a search index.
//!
//! Errors mark an index the search widget cannot use correctly; warnings mark
//! entries that are valid but probably not what the documentation author
//! intended.

use crate::models::{DocEntry, SearchIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Identifier of a validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    EmptyLocation,
    EmptyPage,
    EmptyTitle,
    EmptyCategory,
    ApiTextEmpty,
    ApiTextMissingSymbol,
    DuplicateLocation,
    UnknownCategory,
    AbsoluteLocation,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::EmptyLocation => "empty-location",
            Rule::EmptyPage => "empty-page",
            Rule::EmptyTitle => "empty-title",
            Rule::EmptyCategory => "empty-category",
            Rule::ApiTextEmpty => "api-text-empty",
            Rule::ApiTextMissingSymbol => "api-text-missing-symbol",
            Rule::DuplicateLocation => "duplicate-location",
            Rule::UnknownCategory => "unknown-category",
            Rule::AbsoluteLocation => "absolute-location",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Rule::EmptyLocation
            | Rule::EmptyPage
            | Rule::EmptyTitle
            | Rule::EmptyCategory
            | Rule::ApiTextEmpty => Severity::Error,
            Rule::ApiTextMissingSymbol
            | Rule::DuplicateLocation
            | Rule::UnknownCategory
            | Rule::AbsoluteLocation => Severity::Warning,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub severity: Severity,
    pub rule: Rule,
    /// Position of the entry in `docs`.
    pub entry: usize,
    pub location: String,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] entry {} ({}): {}",
            self.severity, self.rule, self.entry, self.location, self.message
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    /// Treat warnings as failures in [`ValidationReport::passes`].
    pub strict: bool,
    /// Do not report categories outside the known set.
    pub allow_unknown_categories: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub entries_checked: usize,
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    /// No errors. Warnings are allowed.
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    /// Whether the index passes under the given strictness.
    pub fn passes(&self, strict: bool) -> bool {
        if strict {
            self.issues.is_empty()
        } else {
            self.is_valid()
        }
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn issues_for(&self, rule: Rule) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |issue| issue.rule == rule)
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .count()
    }
}

/// Run every check over `index`.
///
/// Issues are ordered by entry position, then by rule order within an entry.
pub fn validate(index: &SearchIndex, options: &ValidationOptions) -> ValidationReport {
    let mut issues = Vec::new();

    let mut anchors: HashMap<&str, usize> = HashMap::new();
    for entry in index.iter() {
        if entry.anchor().is_some_and(|anchor| !anchor.is_empty()) {
            *anchors.entry(entry.location.as_str()).or_default() += 1;
        }
    }

    for (position, entry) in index.iter().enumerate() {
        let mut report = |rule: Rule, message: String| {
            issues.push(Issue {
                severity: rule.severity(),
                rule,
                entry: position,
                location: entry.location.clone(),
                message,
            });
        };

        check_required(entry, &mut report);
        check_api_text(entry, &mut report);

        if let Some(&count) = anchors.get(entry.location.as_str()) {
            if count > 1 {
                report(
                    Rule::DuplicateLocation,
                    format!("location is shared by {} entries", count),
                );
            }
        }

        if !options.allow_unknown_categories
            && !entry.category.is_known()
            && !entry.category.as_str().trim().is_empty()
        {
            report(
                Rule::UnknownCategory,
                format!("unrecognised category `{}`", entry.category),
            );
        }

        if is_absolute(&entry.location) {
            report(
                Rule::AbsoluteLocation,
                "location is not relative to the documentation root".to_string(),
            );
        }
    }

    ValidationReport {
        entries_checked: index.len(),
        issues,
    }
}

fn check_required(entry: &DocEntry, report: &mut impl FnMut(Rule, String)) {
    let required = [
        (Rule::EmptyLocation, "location", entry.location.as_str()),
        (Rule::EmptyPage, "page", entry.page.as_str()),
        (Rule::EmptyTitle, "title", entry.title.as_str()),
        (Rule::EmptyCategory, "category", entry.category.as_str()),
    ];
    for (rule, field, value) in required {
        if value.trim().is_empty() {
            report(rule, format!("`{}` is empty", field));
        }
    }
}

fn check_api_text(entry: &DocEntry, report: &mut impl FnMut(Rule, String)) {
    if !entry.category.requires_text() {
        return;
    }
    if entry.text.trim().is_empty() {
        report(
            Rule::ApiTextEmpty,
            format!("{} entry has no docstring text", entry.category),
        );
        return;
    }
    if let Some(symbol) = entry.symbol_name() {
        if !entry.text.contains(symbol) {
            report(
                Rule::ApiTextMissingSymbol,
                format!("docstring does not mention `{}`", symbol),
            );
        }
    }
}

fn is_absolute(location: &str) -> bool {
    if location.starts_with('/') {
        return true;
    }
    // scheme ":" with an alphabetic first char, e.g. `https:`
    match location.split_once(':') {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && !scheme.contains(['/', '#'])
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
