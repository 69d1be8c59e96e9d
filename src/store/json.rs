//! JSON snapshot store.
//!
//! The whole store lives in one pretty-printed JSON file:
//!
//! ```text
//! {
//!   "sources":    [ { "title": "اليوم السابع", "base_url": "https://www.youm7.com" } ],
//!   "categories": [ { "title": "Politics" } ],
//!   "tags":       [ { "text": "Egypt" } ],
//!   "posts":      [ { "source": {..}, "category": {..}, "title": "..", "tags": [..], .. } ]
//! }
//! ```
//!
//! Every change is written through: the snapshot is serialized to a sibling
//! temp file which is then renamed over the store file, so a crash leaves
//! either the previous or the new snapshot, never a torn one.

use super::{MemoryStore, PostStore, Snapshot};
use crate::error::ScrapeError;
use crate::models::{Category, PostCandidate, Source, Tag};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty when the file does not exist.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ScrapeError> {
        let path = path.as_ref().to_path_buf();
        let snapshot = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Snapshot>(&bytes).map_err(|e| ScrapeError::Parse {
                what: path.display().to_string(),
                reason: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(e) => return Err(e.into()),
        };
        info!(
            sources = snapshot.sources.len(),
            posts = snapshot.posts.len(),
            "Opened post store"
        );
        Ok(Self {
            path,
            inner: MemoryStore::from_snapshot(snapshot),
        })
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.inner.snapshot()
    }

    async fn flush(&self) -> Result<(), ScrapeError> {
        let json = serde_json::to_vec_pretty(self.inner.snapshot())
            .map_err(|e| ScrapeError::Store(format!("cannot serialize snapshot: {e}")))?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), "Wrote store snapshot");
        Ok(())
    }
}

impl PostStore for JsonFileStore {
    async fn get_or_create_source(&mut self, title: &str, base_url: &str) -> Result<Source, ScrapeError> {
        let before = self.inner.snapshot().sources.len();
        let source = self.inner.get_or_create_source(title, base_url).await?;
        if self.inner.snapshot().sources.len() != before {
            self.flush().await?;
        }
        Ok(source)
    }

    async fn get_or_create_category(&mut self, title: &str) -> Result<Category, ScrapeError> {
        let before = self.inner.snapshot().categories.len();
        let category = self.inner.get_or_create_category(title).await?;
        if self.inner.snapshot().categories.len() != before {
            self.flush().await?;
        }
        Ok(category)
    }

    async fn get_or_create_tag(&mut self, text: &str) -> Result<Tag, ScrapeError> {
        let before = self.inner.snapshot().tags.len();
        let tag = self.inner.get_or_create_tag(text).await?;
        if self.inner.snapshot().tags.len() != before {
            self.flush().await?;
        }
        Ok(tag)
    }

    async fn exists_post(&self, source: &Source, category: &Category, detail_url: &str) -> Result<bool, ScrapeError> {
        self.inner.exists_post(source, category, detail_url).await
    }

    #[instrument(level = "debug", skip_all, fields(url = %post.detail_url))]
    async fn save_post(&mut self, post: PostCandidate, tags: Vec<Tag>) -> Result<(), ScrapeError> {
        self.inner.save_post(post, tags).await?;
        self.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::post;

    #[tokio::test]
    async fn test_missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("posts.json")).await.unwrap();
        assert_eq!(store.snapshot(), &Snapshot::default());
    }

    #[tokio::test]
    async fn test_save_is_written_through_and_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");

        let mut store = JsonFileStore::open(&path).await.unwrap();
        let source = store.get_or_create_source("Youm7", "https://www.youm7.com").await.unwrap();
        let category = store.get_or_create_category("Politics").await.unwrap();
        let tag = store.get_or_create_tag("Egypt").await.unwrap();
        let mut p = post("Youm7", "Politics", "https://www.youm7.com/1");
        p.source = source.clone();
        store.save_post(p, vec![tag]).await.unwrap();

        // no reopen needed: the file already holds the post
        let on_disk: Snapshot = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(on_disk.posts.len(), 1);
        assert_eq!(on_disk.posts[0].tags, vec!["Egypt"]);
        assert!(!dir.path().join("posts.json.tmp").exists());

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.snapshot().sources, vec![source.clone()]);
        assert!(reopened
            .exists_post(&source, &category, "https://www.youm7.com/1")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = JsonFileStore::open(&path).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Parse);
    }
}
