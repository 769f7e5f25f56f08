//! Search result formatting
//!
//! Maps raw upstream records onto the fixed response schema. Every field is
//! optional upstream, so the mapping never fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::zlib::Record;

/// A search result as returned to API clients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResultRecord {
    pub id: Option<String>,
    pub name: String,
    pub authors: Vec<String>,
    pub cover: Option<String>,
    pub url: Option<String>,
    pub year: Option<String>,
    pub language: Option<String>,
    pub extension: Option<String>,
    pub size: Option<String>,
    pub rating: Option<String>,
    pub publisher: Option<String>,
}

/// Format a raw record
pub fn format_record(record: &Record) -> SearchResultRecord {
    SearchResultRecord {
        id: record.id(),
        name: first_scalar(record, &["name", "title"]).unwrap_or_default(),
        authors: authors(record),
        cover: record.scalar("cover"),
        url: first_scalar(record, &["url", "href"]),
        year: record.scalar("year"),
        language: record.scalar("language"),
        extension: record.scalar("extension"),
        size: first_scalar(record, &["size", "filesizeString"]),
        rating: first_scalar(record, &["rating", "qualityScore"]),
        publisher: record.scalar("publisher"),
    }
}

fn first_scalar(record: &Record, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| record.scalar(key))
}

fn authors(record: &Record) -> Vec<String> {
    ["authors", "author"]
        .iter()
        .filter_map(|key| record.get(key))
        .map(author_names)
        .find(|names| !names.is_empty())
        .unwrap_or_default()
}

/// Author names from any of the shapes the upstream uses
fn author_names(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name.trim().to_string()),
                Value::Object(fields) => fields
                    .get("author")
                    .or_else(|| fields.get("name"))
                    .and_then(Value::as_str)
                    .map(|name| name.trim().to_string()),
                _ => None,
            })
            .filter(|name| !name.is_empty())
            .collect(),
        Value::String(joined) => joined
            .split([',', ';'])
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
