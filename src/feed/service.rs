//! Feed Service
//!
//! Cache-aside loading of the post feed with a single-flight guard around
//! the content source.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::ContentCache;
use crate::error::Result;
use crate::feed::ContentSource;
use crate::models::Post;

/// Cache key the feed is stored under.
pub const FEED_KEY: &str = "feed_posts";

/// Where a feed was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedOrigin {
    Cache,
    Source,
}

/// A loaded feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Feed {
    pub posts: Vec<Post>,
    pub origin: FeedOrigin,
}

// == Feed Service ==
pub struct FeedService {
    cache: Arc<ContentCache>,
    source: Arc<dyn ContentSource>,
    /// Held for the duration of a fetch from the content source
    load_guard: Mutex<()>,
}

impl FeedService {
    pub fn new(cache: Arc<ContentCache>, source: Arc<dyn ContentSource>) -> Self {
        Self {
            cache,
            source,
            load_guard: Mutex::new(()),
        }
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    // == Load ==
    /// Returns the feed, from the cache when possible.
    ///
    /// Only one fetch from the content source runs at a time. A caller that
    /// finds a fetch in flight waits for it and then serves what it cached,
    /// even when it asked for a refresh.
    pub async fn load(&self, force_refresh: bool) -> Result<Feed> {
        if !force_refresh {
            if let Some(posts) = self.cache.get::<Vec<Post>>(FEED_KEY).await {
                return Ok(Feed {
                    posts,
                    origin: FeedOrigin::Cache,
                });
            }
        }

        let _guard = match self.load_guard.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("Feed load already in progress, waiting");
                let guard = self.load_guard.lock().await;
                if let Some(posts) = self.cache.get::<Vec<Post>>(FEED_KEY).await {
                    return Ok(Feed {
                        posts,
                        origin: FeedOrigin::Cache,
                    });
                }
                guard
            }
        };

        let posts = self.source.fetch_all().await?;
        if posts.is_empty() {
            warn!("Content source returned no posts");
        }

        self.cache.put(FEED_KEY, &posts).await?;
        info!(count = posts.len(), force_refresh, "Feed loaded from content source");

        Ok(Feed {
            posts,
            origin: FeedOrigin::Source,
        })
    }

    /// Drops the cached feed from both tiers.
    pub async fn invalidate(&self) {
        self.cache.invalidate(FEED_KEY).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheSettings, ManualClock};
    use crate::error::CacheError;
    use crate::models::post::fixtures::post;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Counts fetches and sleeps to widen the race window.
    struct CountingSource {
        posts: Vec<Post>,
        calls: AtomicUsize,
        delay: Duration,
        fail: bool,
    }

    impl CountingSource {
        fn new(posts: Vec<Post>) -> Self {
            Self {
                posts,
                calls: AtomicUsize::new(0),
                delay: Duration::from_millis(0),
                fail: false,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ContentSource for CountingSource {
        async fn fetch_all(&self) -> Result<Vec<Post>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(CacheError::Upstream("network down".to_string()));
            }
            Ok(self.posts.clone())
        }
    }

    fn cache_in(dir: &TempDir) -> (Arc<ContentCache>, ManualClock) {
        let clock = ManualClock::starting_now();
        let settings = CacheSettings {
            memory_budget_bytes: 1024 * 1024,
            disk_budget_bytes: 1024 * 1024,
            ttl_seconds: 3600,
            directory: dir.path().join("cache"),
        };
        (
            Arc::new(ContentCache::new(settings, Arc::new(clock.clone()))),
            clock,
        )
    }

    #[tokio::test]
    async fn test_miss_fetches_then_hit_serves_cache() {
        let dir = TempDir::new().unwrap();
        let (cache, _) = cache_in(&dir);
        let source = Arc::new(CountingSource::new(vec![post("luna", 1), post("sol", 2)]));
        let service = FeedService::new(cache, source.clone());

        let first = service.load(false).await.unwrap();
        assert_eq!(first.origin, FeedOrigin::Source);
        assert_eq!(first.posts.len(), 2);

        let second = service.load(false).await.unwrap();
        assert_eq!(second.origin, FeedOrigin::Cache);
        assert_eq!(second.posts, first.posts);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_cache() {
        let dir = TempDir::new().unwrap();
        let (cache, _) = cache_in(&dir);
        let source = Arc::new(CountingSource::new(vec![post("luna", 1)]));
        let service = FeedService::new(cache, source.clone());

        service.load(false).await.unwrap();
        let refreshed = service.load(true).await.unwrap();

        assert_eq!(refreshed.origin, FeedOrigin::Source);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_expired_feed_refetches() {
        let dir = TempDir::new().unwrap();
        let (cache, clock) = cache_in(&dir);
        let source = Arc::new(CountingSource::new(vec![post("luna", 1)]));
        let service = FeedService::new(cache, source.clone());

        service.load(false).await.unwrap();
        clock.advance(chrono::Duration::seconds(3601));

        assert_eq!(service.load(false).await.unwrap().origin, FeedOrigin::Source);
        assert_eq!(source.calls(), 2);

        // The refetched feed is fresh on disk even with the clock ahead
        service.cache().handle_memory_warning().await;
        assert_eq!(service.load(false).await.unwrap().origin, FeedOrigin::Cache);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_loads_fetch_once() {
        let dir = TempDir::new().unwrap();
        let (cache, _) = cache_in(&dir);
        let mut source = CountingSource::new(vec![post("luna", 1)]);
        source.delay = Duration::from_millis(100);
        let source = Arc::new(source);
        let service = Arc::new(FeedService::new(cache, source.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.load(false).await })
            })
            .collect();

        for handle in handles {
            let feed = handle.await.unwrap().unwrap();
            assert_eq!(feed.posts.len(), 1);
        }
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_source_failure_propagates_and_caches_nothing() {
        let dir = TempDir::new().unwrap();
        let (cache, _) = cache_in(&dir);
        let mut source = CountingSource::new(vec![]);
        source.fail = true;
        let service = FeedService::new(cache.clone(), Arc::new(source));

        assert!(matches!(service.load(false).await, Err(CacheError::Upstream(_))));
        assert!(cache.lookup(FEED_KEY).await.is_none());
    }

    #[tokio::test]
    async fn test_empty_feed_is_cached() {
        let dir = TempDir::new().unwrap();
        let (cache, _) = cache_in(&dir);
        let source = Arc::new(CountingSource::new(vec![]));
        let service = FeedService::new(cache, source.clone());

        assert!(service.load(false).await.unwrap().posts.is_empty());
        let again = service.load(false).await.unwrap();
        assert_eq!(again.origin, FeedOrigin::Cache);
        assert!(again.posts.is_empty());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let dir = TempDir::new().unwrap();
        let (cache, _) = cache_in(&dir);
        let source = Arc::new(CountingSource::new(vec![post("luna", 1)]));
        let service = FeedService::new(cache, source.clone());

        service.load(false).await.unwrap();
        service.invalidate().await;
        service.load(false).await.unwrap();

        assert_eq!(source.calls(), 2);
    }
}
