//! Parsing of search index files.

use super::atomic::read_text;
use super::Framing;
use crate::config::IndexFileConfig;
use crate::models::{Category, DocEntry, SearchIndex};
use crate::{DocSearchError, Result};
use regex::Regex;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// `var name = ` (or `let`/`const`) in front of the payload object.
static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\x{FEFF}?\s*(?:var|let|const)\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*=\s*")
        .expect("assignment pattern is valid")
});

/// Whitespace (and an optional BOM) in front of a bare JSON object.
static BARE_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\x{FEFF}?\s*\{").expect("bare object pattern is valid"));

/// A parsed index together with the wrapper it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedIndex {
    pub index: SearchIndex,
    pub framing: Framing,
}

/// Read and parse a search index file.
pub fn read_file(path: &Path) -> Result<ParsedIndex> {
    let contents = read_text(path)?;
    let parsed = parse_str(&contents).map_err(|e| match e {
        DocSearchError::Format { message } => {
            DocSearchError::format(format!("{}: {}", path.display(), message))
        }
        other => other,
    })?;
    debug!(
        "Read {} entries from {}",
        parsed.index.len(),
        path.display()
    );
    Ok(parsed)
}

/// Parse the contents of a search index file.
///
/// Accepts `var <name> = {"docs": [...]}` as well as a bare `{"docs": [...]}`.
pub fn parse_str(input: &str) -> Result<ParsedIndex> {
    let (variable, body_start) = if let Some(captures) = ASSIGNMENT.captures(input) {
        let whole = captures
            .get(0)
            .ok_or_else(|| DocSearchError::format("unreadable assignment"))?;
        let name = captures.get(1).map(|m| m.as_str().to_string());
        (name, whole.end())
    } else if let Some(found) = BARE_OBJECT.find(input) {
        // Leave the brace in the body.
        (None, found.end() - 1)
    } else {
        return Err(DocSearchError::format(
            "expected `var <name> = {...}` or a JSON object",
        ));
    };

    let prefix = &input[..body_start];
    let body = &input[body_start..];

    let mut stream = serde_json::Deserializer::from_str(body).into_iter::<UniqueKeys>();
    let value = match stream.next() {
        Some(Ok(UniqueKeys(value))) => value,
        // Well-formed JSON with the wrong shape, such as a repeated key.
        Some(Err(e)) if e.is_data() => return Err(DocSearchError::format(e.to_string())),
        Some(Err(e)) => return Err(e.into()),
        None => return Err(DocSearchError::format("empty payload")),
    };
    let end = stream.byte_offset();
    let object_text = &body[..end];
    let suffix = &body[end..];

    let after_semicolon = suffix.trim_start();
    let after_semicolon = after_semicolon
        .strip_prefix(';')
        .unwrap_or(after_semicolon);
    if !after_semicolon.trim().is_empty() {
        return Err(DocSearchError::format(format!(
            "unexpected trailing content after the index object: {:?}",
            truncate(after_semicolon.trim(), 40)
        )));
    }

    let docs = extract_docs(value)?;
    let (open_gap, close_gap) = scan_gaps(object_text);

    Ok(ParsedIndex {
        index: SearchIndex::new(docs),
        framing: Framing {
            variable,
            prefix: prefix.to_string(),
            open_gap,
            close_gap,
            suffix: suffix.to_string(),
        },
    })
}

/// A JSON value whose objects never repeat a key.
///
/// `serde_json::Value` keeps only the last of repeated keys, which would hide
/// entries behind a second `docs` or a second `location`.
struct UniqueKeys(Value);

impl<'de> Deserialize<'de> for UniqueKeys {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(UniqueKeysVisitor).map(UniqueKeys)
    }
}

struct UniqueKeysVisitor;

impl<'de> Visitor<'de> for UniqueKeysVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Number::from_f64(v).map_or(Value::Null, Value::Number))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Value, A::Error> {
        let mut items = Vec::new();
        while let Some(UniqueKeys(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Value, A::Error> {
        let mut map = Map::new();
        while let Some(key) = access.next_key::<String>()? {
            if map.contains_key(&key) {
                return Err(de::Error::custom(format!("duplicate key `{}`", key)));
            }
            let UniqueKeys(value) = access.next_value()?;
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }
}

fn extract_docs(value: Value) -> Result<Vec<DocEntry>> {
    let mut map = match value {
        Value::Object(map) => map,
        other => {
            return Err(DocSearchError::format(format!(
                "top-level value must be an object, found {}",
                kind(&other)
            )))
        }
    };

    let docs_key = IndexFileConfig::DOCS_KEY;
    if map.len() != 1 || !map.contains_key(docs_key) {
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        return Err(DocSearchError::format(format!(
            "expected exactly one top-level key `{}`, found {:?}",
            docs_key, keys
        )));
    }

    let items = match map.remove(docs_key) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(DocSearchError::format(format!(
                "`{}` must be an array, found {}",
                docs_key,
                kind(&other)
            )))
        }
        None => return Err(DocSearchError::format(format!("missing `{}`", docs_key))),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(position, item)| entry_from_value(position, item))
        .collect()
}

fn entry_from_value(position: usize, value: Value) -> Result<DocEntry> {
    let mut fields = match value {
        Value::Object(fields) => fields,
        other => {
            return Err(DocSearchError::format(format!(
                "entry {} must be an object, found {}",
                position,
                kind(&other)
            )))
        }
    };

    let location = take_string(&mut fields, position, "location")?;
    let page = take_string(&mut fields, position, "page")?;
    let title = take_string(&mut fields, position, "title")?;
    let category = take_string(&mut fields, position, "category")?;
    let text = match fields.remove("text") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(other) => {
            return Err(DocSearchError::format(format!(
                "entry {}: field `text` must be a string, found {}",
                position,
                kind(&other)
            )))
        }
    };

    if !fields.is_empty() {
        let extra: Vec<&str> = fields.keys().map(String::as_str).collect();
        warn!("Entry {} has unrecognised fields {:?}; dropping them", position, extra);
    }

    Ok(DocEntry {
        location,
        page,
        title,
        text,
        category: Category::from(category),
    })
}

fn take_string(fields: &mut Map<String, Value>, position: usize, field: &str) -> Result<String> {
    match fields.remove(field) {
        Some(Value::String(value)) => Ok(value),
        Some(other) => Err(DocSearchError::format(format!(
            "entry {}: field `{}` must be a string, found {}",
            position,
            field,
            kind(&other)
        ))),
        None => Err(DocSearchError::format(format!(
            "entry {}: missing field `{}`",
            position, field
        ))),
    }
}

/// Whitespace around the entry array inside `{"docs": ... }`.
///
/// Falls back to no whitespace when the object is laid out in some other way
/// (other key spacing, comments); such files simply won't round-trip exactly.
fn scan_gaps(object_text: &str) -> (String, String) {
    let open_gap = object_text
        .strip_prefix('{')
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix("\"docs\""))
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix(':'))
        .map(|rest| {
            let trimmed = rest.trim_start();
            rest[..rest.len() - trimmed.len()].to_string()
        })
        .unwrap_or_default();

    let close_gap = object_text
        .strip_suffix('}')
        .map(|rest| {
            let trimmed = rest.trim_end();
            rest[trimmed.len()..].to_string()
        })
        .unwrap_or_default();

    (open_gap, close_gap)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
