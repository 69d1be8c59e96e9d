//! Data models produced by the scraping engine.
//!
//! - [`Source`]: one news site, identified by its title
//! - [`Category`]: a section name shared across sources
//! - [`Tag`]: a normalized keyword attached to posts
//! - [`PostCandidate`]: one scraped article, ready to be handed to a store
//!
//! The engine only constructs these values; storage, slugs and any further
//! bookkeeping belong to the [`PostStore`](crate::store::PostStore).

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A news site. Identity is the title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub base_url: String,
}

/// A section such as "Politics". Identity is the title, shared across sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
}

/// A keyword attached to a post. Identity is the normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag {
    pub text: String,
}

impl Tag {
    /// Trim and collapse inner whitespace. Returns `None` for blank input.
    pub fn normalize(raw: &str) -> Option<String> {
        let text = raw.split_whitespace().join(" ");
        (!text.is_empty()).then_some(text)
    }
}

/// One scraped article.
///
/// Built once per listing item and never mutated afterwards; it is either
/// saved or dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostCandidate {
    pub source: Source,
    pub category: Category,
    /// Never empty.
    pub title: String,
    /// Absolute URL of the article page. Part of the identity key.
    pub detail_url: String,
    pub description: String,
    /// Listing thumbnail, upgraded to https.
    pub thumbnail: Option<String>,
    /// Detail-page image, falling back to the thumbnail.
    pub image: Option<String>,
    /// Sanitized standalone HTML, or an empty string when the page had no body.
    pub body: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Deduplicated, order-insensitive tag names for one post.
pub fn distinct_tag_names<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|t| Tag::normalize(t.as_ref()))
        .unique()
        .collect()
}
