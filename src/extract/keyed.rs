//! Extraction over JSON listings.

use super::{DocumentAdapter, FieldKind};
use crate::error::ScrapeError;
use crate::utils::{absolute_image_url, absolute_url, truncate_for_log};
use scraper::Html;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field keys for a JSON site. Keys may be dotted paths (`category.name`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyedLayout {
    /// Path to the item array when the response wraps it in an object.
    pub items: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub thumbnail: String,
    pub image: String,
    pub timestamp: String,
    /// String or array of strings.
    pub tags: String,
}

/// Follow a dotted path. An empty path returns the value itself.
fn lookup<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |v, key| v.get(key))
}

fn scalar(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// [`DocumentAdapter`] for JSON listings.
#[derive(Debug, Clone, Copy)]
pub struct KeyedAdapter<'p> {
    layout: &'p KeyedLayout,
    base_url: &'p str,
}

impl<'p> KeyedAdapter<'p> {
    pub fn new(layout: &'p KeyedLayout, base_url: &'p str) -> Self {
        Self { layout, base_url }
    }

    fn get(&self, item: &Value, key: &str) -> String {
        if key.is_empty() {
            return String::new();
        }
        scalar(lookup(item, key))
    }
}

impl<'p> DocumentAdapter for KeyedAdapter<'p> {
    type Document = Value;
    type Node<'d> = &'d Value;

    fn parse(&self, body: &[u8]) -> Result<Value, ScrapeError> {
        serde_json::from_slice(body).map_err(|e| ScrapeError::Parse {
            what: format!(
                "JSON listing ({})",
                truncate_for_log(&String::from_utf8_lossy(body), 120)
            ),
            reason: e.to_string(),
        })
    }

    /// The item sequence, wrapped as the single container.
    fn list_containers<'d>(&self, page: &'d Value) -> Result<Vec<&'d Value>, ScrapeError> {
        match lookup(page, &self.layout.items) {
            Some(list @ Value::Array(_)) => Ok(vec![list]),
            _ => Err(ScrapeError::structure(format!(
                "no item array at '{}' in JSON listing",
                self.layout.items
            ))),
        }
    }

    // Early-bound `'d`, as in the trait.
    fn item_containers<'d>(&self, list: &'d Value) -> Result<Vec<&'d Value>, ScrapeError>
    where
        'd: 'd,
    {
        match list {
            Value::Array(items) => Ok(items.iter().collect()),
            _ => Err(ScrapeError::structure("JSON list container is not an array")),
        }
    }

    fn field(&self, item: &Value, _detail: Option<&Html>, kind: FieldKind) -> Result<String, ScrapeError> {
        let l = self.layout;
        Ok(match kind {
            FieldKind::Title => self.get(item, &l.title),
            FieldKind::Url => {
                let raw = self.get(item, &l.url);
                if raw.is_empty() {
                    return Err(ScrapeError::structure(format!("item has no '{}' value", l.url)));
                }
                absolute_url(self.base_url, &raw)?
            }
            FieldKind::Description => self.get(item, &l.description),
            FieldKind::Thumbnail => absolute_image_url(self.base_url, &self.get(item, &l.thumbnail)).unwrap_or_default(),
            FieldKind::Image => absolute_image_url(self.base_url, &self.get(item, &l.image)).unwrap_or_default(),
            FieldKind::Timestamp => self.get(item, &l.timestamp),
        })
    }

    fn tag_names(&self, item: &Value, _detail: Option<&Html>) -> Vec<String> {
        if self.layout.tags.is_empty() {
            return Vec::new();
        }
        match lookup(item, &self.layout.tags) {
            Some(Value::Array(values)) => values.iter().map(|v| scalar(Some(v))).collect(),
            other => vec![scalar(other)],
        }
    }
}
