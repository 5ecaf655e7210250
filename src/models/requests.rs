//! Request DTOs for the feed cache API
//!
//! Defines query parameters accepted by the HTTP endpoints.

use serde::Deserialize;

/// Query string for `GET /feed`
///
/// # Fields
/// - `refresh`: bypass the cache and refetch from the content source
/// - `profile`: only return posts of this profile, newest first
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub refresh: bool,
    #[serde(default)]
    pub profile: Option<String>,
}
