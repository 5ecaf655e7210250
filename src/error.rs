//! Error types for the feed cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache, the content source and the HTTP layer.
///
/// Only `InvalidKey` and `Codec` ever reach a cache caller; `Io` and
/// `Decode` are recovered inside the tiers and degrade to a miss.
/// `InvalidPayload` is raised by the HTTP layer for rejected request bodies.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Filesystem failure on a disk tier operation
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored bytes could not be decoded (corrupt or schema mismatch)
    #[error("Decode error: {0}")]
    Decode(String),

    /// Value could not be serialized or deserialized
    #[error("Codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Key is empty or too long
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Request body is not a JSON document
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Key not present in either tier
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Content source failed to deliver posts
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal error (e.g. a blocking task panicked)
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidKey(_) | CacheError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            CacheError::Upstream(_) => StatusCode::BAD_GATEWAY,
            CacheError::Io(_)
            | CacheError::Decode(_)
            | CacheError::Codec(_)
            | CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the feed cache.
pub type Result<T> = std::result::Result<T, CacheError>;
