//! Response DTOs for the feed cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{format_size, CacheStats, Tier};
use crate::feed::FeedOrigin;
use crate::models::Post;

/// Response body for `GET /feed`
#[derive(Debug, Clone, Serialize)]
pub struct FeedResponse {
    pub posts: Vec<Post>,
    pub count: usize,
    /// Whether the posts came from the cache or the content source
    pub origin: FeedOrigin,
}

impl FeedResponse {
    pub fn new(posts: Vec<Post>, origin: FeedOrigin) -> Self {
        Self {
            count: posts.len(),
            posts,
            origin,
        }
    }
}

/// Response body for `GET /feed/grouped`
#[derive(Debug, Clone, Serialize)]
pub struct GroupedFeedResponse {
    pub groups: Vec<Vec<Post>>,
    /// Number of groups (profiles)
    pub count: usize,
}

impl GroupedFeedResponse {
    pub fn new(groups: Vec<Vec<Post>>) -> Self {
        Self {
            count: groups.len(),
            groups,
        }
    }
}

/// Response body for `GET /cache/:key`
#[derive(Debug, Clone, Serialize)]
pub struct EntryResponse {
    pub key: String,
    /// Tier that answered the lookup
    pub tier: Tier,
    /// The cached payload as JSON
    pub value: Value,
}

/// Response body for writes, invalidation and clearing
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn invalidated(key: &str) -> Self {
        Self {
            message: format!("Key '{}' invalidated", key),
        }
    }

    pub fn stored(key: &str) -> Self {
        Self {
            message: format!("Key '{}' stored", key),
        }
    }

    pub fn cleared() -> Self {
        Self {
            message: "All cache cleared".to_string(),
        }
    }
}

/// Response body for `POST /cache/memory-warning`
#[derive(Debug, Clone, Serialize)]
pub struct MemoryWarningResponse {
    /// Entries dropped from the memory tier
    pub dropped: usize,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub memory_hits: u64,
    pub disk_hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub total_entries: usize,
    pub memory_bytes: usize,
    pub memory_budget_bytes: usize,
    pub disk_bytes: u64,
    pub disk_budget_bytes: u64,
    /// Human-readable disk usage
    pub disk_size: String,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn new(
        stats: &CacheStats,
        memory_budget_bytes: usize,
        disk_bytes: u64,
        disk_budget_bytes: u64,
    ) -> Self {
        Self {
            memory_hits: stats.memory_hits,
            disk_hits: stats.disk_hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            memory_bytes: stats.memory_bytes,
            memory_budget_bytes,
            disk_bytes,
            disk_budget_bytes,
            disk_size: format_size(disk_bytes),
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
