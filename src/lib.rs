//! Feed Cache - two-tier content cache for a social feed
//!
//! Memory → disk → miss lookups with a single TTL, lazy expiration,
//! write-through puts and promotion, plus the feed service and HTTP API
//! built on top.

pub mod api;
pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::ContentCache;
pub use config::Config;
pub use tasks::spawn_memory_pressure_task;
