//! API Routes
//!
//! Configures the Axum router with all feed cache endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, feed_handler, get_entry_handler, grouped_feed_handler, health_handler,
    invalidate_handler, memory_warning_handler, put_entry_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /feed` - Feed, cache first (`?refresh=true` to refetch,
///   `?profile=<id>` for one profile's posts)
/// - `GET /feed/grouped` - Feed grouped by profile
/// - `GET /cache/:key` - Inspect a cached entry
/// - `PUT /cache/:key` - Store a JSON body in both tiers
/// - `DELETE /cache/:key` - Invalidate a key in both tiers
/// - `DELETE /cache` - Clear both tiers
/// - `POST /cache/memory-warning` - Drop the memory tier
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/feed", get(feed_handler))
        .route("/feed/grouped", get(grouped_feed_handler))
        .route("/cache", delete(clear_handler))
        .route("/cache/memory-warning", post(memory_warning_handler))
        .route(
            "/cache/:key",
            get(get_entry_handler)
                .put(put_entry_handler)
                .delete(invalidate_handler),
        )
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheSettings, ContentCache};
    use crate::feed::JsonFileSource;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    fn create_test_app(dir: &TempDir) -> Router {
        let settings = CacheSettings {
            memory_budget_bytes: 1024 * 1024,
            disk_budget_bytes: 1024 * 1024,
            ttl_seconds: 3600,
            directory: dir.path().join("cache"),
        };
        let cache = Arc::new(ContentCache::from_settings(settings));
        let source = Arc::new(JsonFileSource::new(dir.path().join("missing.json")));
        create_router(AppState::new(cache, source))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_feed_upstream_failure_is_bad_gateway() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/feed")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_get_entry_not_found() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/cache/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_put_entry_rejects_non_json_body() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/cache/greeting")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_memory_warning_endpoint() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/cache/memory-warning")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
