//! Persistence collaborator.
//!
//! The engine only needs five operations from storage, captured by
//! [`PostStore`]. Two implementations ship with the crate:
//!
//! - [`MemoryStore`]: in-process, used by tests and embedders
//! - [`JsonFileStore`]: a pretty-printed JSON snapshot on disk, rewritten
//!   atomically on every saved post
//!
//! Post identity is `(source title, category title, detail_url)`.

pub mod json;

pub use json::JsonFileStore;

use crate::error::ScrapeError;
use crate::models::{Category, PostCandidate, Source, Tag};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What the orchestrator needs from storage.
///
/// Get-or-create operations are idempotent. `save_post` is called once per
/// new post, immediately after extraction, and must be durable on return.
#[allow(async_fn_in_trait, reason = "store calls are awaited in place, never spawned, so no Send bound is needed")]
pub trait PostStore {
    async fn get_or_create_source(&mut self, title: &str, base_url: &str) -> Result<Source, ScrapeError>;

    async fn get_or_create_category(&mut self, title: &str) -> Result<Category, ScrapeError>;

    async fn get_or_create_tag(&mut self, text: &str) -> Result<Tag, ScrapeError>;

    async fn exists_post(&self, source: &Source, category: &Category, detail_url: &str) -> Result<bool, ScrapeError>;

    async fn save_post(&mut self, post: PostCandidate, tags: Vec<Tag>) -> Result<(), ScrapeError>;
}

/// A persisted post with its tag texts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPost {
    #[serde(flatten)]
    pub post: PostCandidate,
    pub tags: Vec<String>,
}

/// Full store content, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub sources: Vec<Source>,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
    pub posts: Vec<StoredPost>,
}

type PostKey = (String, String, String);

fn key_of(post: &PostCandidate) -> PostKey {
    (
        post.source.title.clone(),
        post.category.title.clone(),
        post.detail_url.clone(),
    )
}

/// In-memory [`PostStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Snapshot,
    known: HashSet<PostKey>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let known = snapshot.posts.iter().map(|p| key_of(&p.post)).collect();
        Self { snapshot, known }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn posts(&self) -> &[StoredPost] {
        &self.snapshot.posts
    }

    /// Record a post as known without going through the engine.
    pub fn seed_post(&mut self, post: PostCandidate) {
        self.known.insert(key_of(&post));
        self.snapshot.posts.push(StoredPost { post, tags: Vec::new() });
    }

    fn insert_post(&mut self, post: PostCandidate, tags: Vec<Tag>) -> Result<(), ScrapeError> {
        let key = key_of(&post);
        if self.known.contains(&key) {
            return Err(ScrapeError::Store(format!("post {} already stored", post.detail_url)));
        }
        self.known.insert(key);
        self.snapshot.posts.push(StoredPost {
            post,
            tags: tags.into_iter().map(|t| t.text).collect(),
        });
        Ok(())
    }
}

impl PostStore for MemoryStore {
    async fn get_or_create_source(&mut self, title: &str, base_url: &str) -> Result<Source, ScrapeError> {
        if let Some(found) = self.snapshot.sources.iter().find(|s| s.title == title) {
            return Ok(found.clone());
        }
        let source = Source {
            title: title.to_string(),
            base_url: base_url.to_string(),
        };
        self.snapshot.sources.push(source.clone());
        Ok(source)
    }

    async fn get_or_create_category(&mut self, title: &str) -> Result<Category, ScrapeError> {
        if let Some(found) = self.snapshot.categories.iter().find(|c| c.title == title) {
            return Ok(found.clone());
        }
        let category = Category {
            title: title.to_string(),
        };
        self.snapshot.categories.push(category.clone());
        Ok(category)
    }

    async fn get_or_create_tag(&mut self, text: &str) -> Result<Tag, ScrapeError> {
        let text = Tag::normalize(text).ok_or_else(|| ScrapeError::Store("blank tag".to_string()))?;
        if let Some(found) = self.snapshot.tags.iter().find(|t| t.text == text) {
            return Ok(found.clone());
        }
        let tag = Tag { text };
        self.snapshot.tags.push(tag.clone());
        Ok(tag)
    }

    async fn exists_post(&self, source: &Source, category: &Category, detail_url: &str) -> Result<bool, ScrapeError> {
        let key = (
            source.title.clone(),
            category.title.clone(),
            detail_url.to_string(),
        );
        Ok(self.known.contains(&key))
    }

    async fn save_post(&mut self, post: PostCandidate, tags: Vec<Tag>) -> Result<(), ScrapeError> {
        self.insert_post(post, tags)
    }
}
