//! API Handlers
//!
//! HTTP request handlers for each feed cache endpoint.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use tracing::warn;

use crate::cache::{CacheKey, ContentCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::feed::{ContentSource, FeedService, JsonFileSource};
use crate::models::{
    group_by_profile, posts_by_profile, EntryResponse, FeedQuery, FeedResponse, GroupedFeedResponse,
    HealthResponse, MemoryWarningResponse, MessageResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// Holds the single cache instance of the process and the feed service in
/// front of it.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ContentCache>,
    pub feed: Arc<FeedService>,
}

impl AppState {
    /// Wires a feed service around an existing cache.
    pub fn new(cache: Arc<ContentCache>, source: Arc<dyn ContentSource>) -> Self {
        let feed = Arc::new(FeedService::new(Arc::clone(&cache), source));
        Self { cache, feed }
    }

    /// Builds the cache and the file-backed content source from configuration.
    pub fn from_config(config: &Config) -> Self {
        let cache = Arc::new(ContentCache::from_settings(config.cache_settings()));
        let source = Arc::new(JsonFileSource::new(config.posts_file.clone()));
        Self::new(cache, source)
    }
}

/// Handler for GET /feed
///
/// Serves the feed from the cache, fetching from the content source on a
/// miss or when `refresh=true`. With `profile=<id>` only that profile's
/// posts are returned, filtered from the same cached feed.
pub async fn feed_handler(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<FeedResponse>> {
    let feed = state.feed.load(query.refresh).await?;
    let posts = match query.profile.as_deref() {
        Some(profile_id) => posts_by_profile(&feed.posts, profile_id),
        None => feed.posts,
    };
    Ok(Json(FeedResponse::new(posts, feed.origin)))
}

/// Handler for GET /feed/grouped
pub async fn grouped_feed_handler(
    State(state): State<AppState>,
) -> Result<Json<GroupedFeedResponse>> {
    let feed = state.feed.load(false).await?;
    Ok(Json(GroupedFeedResponse::new(group_by_profile(&feed.posts))))
}

/// Handler for GET /cache/:key
pub async fn get_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<EntryResponse>> {
    let hit = state
        .cache
        .lookup(&key)
        .await
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;
    let value = serde_json::from_slice(&hit.payload)?;

    Ok(Json(EntryResponse {
        key,
        tier: hit.tier,
        value,
    }))
}

/// Handler for PUT /cache/:key
///
/// Stores the request body, which must be a JSON document, in both tiers.
pub async fn put_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<Json<MessageResponse>> {
    state
        .cache
        .put_raw(&key, &body)
        .await
        .map_err(|e| match e {
            CacheError::Codec(e) => CacheError::InvalidPayload(e.to_string()),
            other => other,
        })?;
    Ok(Json(MessageResponse::stored(&key)))
}

/// Handler for DELETE /cache/:key
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<MessageResponse>> {
    CacheKey::new(key.as_str())?;
    state.cache.invalidate(&key).await;
    Ok(Json(MessageResponse::invalidated(&key)))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.cache.clear().await;
    Json(MessageResponse::cleared())
}

/// Handler for POST /cache/memory-warning
///
/// Lets the host report memory pressure; only the memory tier is dropped.
pub async fn memory_warning_handler(State(state): State<AppState>) -> Json<MemoryWarningResponse> {
    let dropped = state.cache.handle_memory_warning().await;
    Json(MemoryWarningResponse { dropped })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;
    let disk_bytes = state.cache.disk_usage().await.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to measure disk cache");
        0
    });
    let settings = state.cache.settings();

    Json(StatsResponse::new(
        &stats,
        settings.memory_budget_bytes,
        disk_bytes,
        settings.disk_budget_bytes,
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
