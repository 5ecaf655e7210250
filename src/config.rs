//! Configuration Module
//!
//! Handles loading and managing cache and server configuration from
//! environment variables.

use std::env;
use std::path::PathBuf;

use crate::cache::CacheSettings;

/// Default memory tier budget (50 MiB)
pub const DEFAULT_MEMORY_BUDGET_BYTES: usize = 50 * 1024 * 1024;
/// Default advisory disk budget (200 MiB)
pub const DEFAULT_DISK_BUDGET_BYTES: u64 = 200 * 1024 * 1024;
/// Default time-to-live for both tiers
pub const DEFAULT_TTL_SECONDS: u64 = 3600;
/// Default cache subdirectory name
pub const DEFAULT_NAMESPACE: &str = "cache";

/// Process configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Byte budget of the memory tier
    pub memory_budget_bytes: usize,
    /// Advisory disk budget, reported but not enforced by eviction
    pub disk_budget_bytes: u64,
    /// Time-to-live in seconds, applied uniformly to both tiers
    pub ttl_seconds: u64,
    /// Subdirectory of `cache_root` owned by the disk tier
    pub cache_namespace: String,
    /// Parent directory for the disk tier
    pub cache_root: PathBuf,
    /// JSON document the content source reads posts from
    pub posts_file: PathBuf,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMORY_BUDGET_BYTES` - Memory tier budget (default: 50 MiB)
    /// - `DISK_BUDGET_BYTES` - Advisory disk budget (default: 200 MiB)
    /// - `CACHE_TTL_SECONDS` - TTL in seconds (default: 3600)
    /// - `CACHE_NAMESPACE` - Cache subdirectory (default: "cache")
    /// - `CACHE_ROOT` - Parent directory (default: platform cache dir)
    /// - `POSTS_FILE` - Posts document (default: "posts-config.json")
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            memory_budget_bytes: parse_var("MEMORY_BUDGET_BYTES")
                .unwrap_or(defaults.memory_budget_bytes),
            disk_budget_bytes: parse_var("DISK_BUDGET_BYTES")
                .unwrap_or(defaults.disk_budget_bytes),
            ttl_seconds: parse_var("CACHE_TTL_SECONDS").unwrap_or(defaults.ttl_seconds),
            cache_namespace: env::var("CACHE_NAMESPACE")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.cache_namespace),
            cache_root: env::var("CACHE_ROOT")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_root),
            posts_file: env::var("POSTS_FILE")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.posts_file),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    /// Builds the settings the cache is constructed from.
    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            memory_budget_bytes: self.memory_budget_bytes,
            disk_budget_bytes: self.disk_budget_bytes,
            ttl_seconds: self.ttl_seconds,
            directory: self.cache_root.join(&self.cache_namespace),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory_budget_bytes: DEFAULT_MEMORY_BUDGET_BYTES,
            disk_budget_bytes: DEFAULT_DISK_BUDGET_BYTES,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            cache_namespace: DEFAULT_NAMESPACE.to_string(),
            cache_root: default_cache_root(),
            posts_file: PathBuf::from("posts-config.json"),
            server_port: 3000,
        }
    }
}

/// Platform cache directory, or the temp dir where the platform has none.
fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("feed_cache"))
        .unwrap_or_else(|| env::temp_dir().join("feed_cache"))
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
