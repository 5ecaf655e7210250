//! Content sources the feed is fetched from on a cache miss.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::models::Post;

/// Upstream collaborator returning the full post collection.
///
/// The cache never calls this; the feed service does, after a miss.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Post>>;
}

/// Top-level shape of a posts document.
#[derive(Debug, Deserialize)]
struct PostsDocument {
    posts: Vec<Post>,
}

/// Reads posts from a local `{"posts": [...]}` JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ContentSource for JsonFileSource {
    async fn fetch_all(&self) -> Result<Vec<Post>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            CacheError::Upstream(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        let document: PostsDocument = serde_json::from_slice(&bytes)?;
        debug!(
            path = %self.path.display(),
            count = document.posts.len(),
            "Loaded posts document"
        );
        Ok(document.posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::post::fixtures::post;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_json_file_source_reads_posts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("posts-config.json");
        let body = serde_json::json!({ "posts": [post("luna", 1), post("sol", 2)] });
        std::fs::write(&path, serde_json::to_vec(&body).unwrap()).unwrap();

        let posts = JsonFileSource::new(&path).fetch_all().await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].profile_id, "luna");
    }

    #[tokio::test]
    async fn test_json_file_source_missing_file() {
        let dir = TempDir::new().unwrap();
        let source = JsonFileSource::new(dir.path().join("absent.json"));

        assert!(matches!(source.fetch_all().await, Err(CacheError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_json_file_source_requires_posts_root() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("posts-config.json");
        std::fs::write(&path, b"[]").unwrap();

        assert!(matches!(
            JsonFileSource::new(&path).fetch_all().await,
            Err(CacheError::Codec(_))
        ));
    }
}
