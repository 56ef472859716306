// Article values and their parsing from Pocket's JSON.
//
// `/get` entries and the items returned by `/add` or a batched `add` action
// have different shapes. Both go through `Article::from_added` or
// `Article::from_listing` so callers always see the same value.

use crate::error::PocketError;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Shown when an item has neither a resolved nor a given title.
pub const UNTITLED: &str = "(untitled)";

/// A saved Pocket item.
///
/// The `item_id` is not stable across a rename: renaming deletes this item
/// and saves a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub item_id: String,
    pub given_url: String,
    pub resolved_url: String,
    pub given_title: Option<String>,
    pub resolved_title: Option<String>,
    pub tags: Vec<String>,
    pub time_added: Option<String>,
}

/// What the caller asked `add` to save. Fills the gaps in add responses.
#[derive(Debug, Clone, Default)]
pub struct NewArticle {
    pub url: String,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub time_added: Option<String>,
}

impl Article {
    /// Compact JSON of every field, for log output.
    pub fn dump(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("<article {}: {e}>", self.item_id))
    }

    /// Resolved title, then given title, then a placeholder.
    pub fn display_title(&self) -> &str {
        self.resolved_title
            .as_deref()
            .or(self.given_title.as_deref())
            .unwrap_or(UNTITLED)
    }

    /// The URL a rename re-saves: the resolved one unless `clean_url` is off.
    pub fn canonical_url(&self, clean_url: bool) -> &str {
        if clean_url && !self.resolved_url.is_empty() {
            &self.resolved_url
        } else {
            &self.given_url
        }
    }

    /// Parse one entry of the `/get` list mapping.
    pub fn from_listing(item_id: &str, data: &Value) -> Result<Self, PocketError> {
        let given_url = text(data, "given_url")
            .ok_or_else(|| PocketError::unexpected(format!("item {item_id} has no given_url")))?;
        let resolved_url = text(data, "resolved_url").unwrap_or_else(|| given_url.clone());
        Ok(Article {
            item_id: item_id.to_string(),
            given_url,
            resolved_url,
            given_title: text(data, "given_title"),
            resolved_title: text(data, "resolved_title").or_else(|| text(data, "title")),
            tags: tags(data.get("tags")),
            time_added: text(data, "time_added"),
        })
    }

    /// Parse the item returned by `/add` or by a batched `add` action.
    ///
    /// These responses describe the saved page, not the request, so
    /// anything they leave out comes from `request`.
    pub fn from_added(data: &Value, request: &NewArticle) -> Result<Self, PocketError> {
        let item_id = text(data, "item_id").ok_or_else(|| PocketError::unexpected("added item has no item_id"))?;
        let given_url = text(data, "given_url").unwrap_or_else(|| request.url.clone());
        let resolved_url = text(data, "resolved_url")
            .or_else(|| text(data, "normal_url"))
            .unwrap_or_else(|| given_url.clone());
        let tags = match data.get("tags") {
            Some(raw) if !raw.is_null() => tags(Some(raw)),
            _ => request.tags.clone(),
        };
        Ok(Article {
            item_id,
            given_url,
            resolved_url,
            given_title: text(data, "given_title").or_else(|| request.title.clone()),
            resolved_title: text(data, "resolved_title").or_else(|| text(data, "title")),
            tags,
            time_added: text(data, "time_added").or_else(|| request.time_added.clone()),
        })
    }
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.display_title(), self.canonical_url(true))
    }
}

/// A non-empty string field. Pocket sends ids and timestamps as either
/// strings or numbers, and missing titles as `""`.
fn text(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Tags arrive keyed by name (`{"rust": {"tag": "rust", ..}}`) from `/get`
/// and as a list elsewhere. Order is kept, duplicates dropped.
fn tags(raw: Option<&Value>) -> Vec<String> {
    let names: Vec<String> = match raw {
        Some(Value::Object(map)) => map.keys().cloned().collect(),
        Some(Value::Array(list)) => list
            .iter()
            .filter_map(|entry| match entry {
                Value::String(s) => Some(s.clone()),
                other => text(other, "tag"),
            })
            .collect(),
        Some(Value::String(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect(),
        _ => Vec::new(),
    };

    let mut unique = Vec::with_capacity(names.len());
    for name in names {
        if !unique.contains(&name) {
            unique.push(name);
        }
    }
    unique
}
