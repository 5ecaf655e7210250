//! API Module
//!
//! HTTP handlers and routing for the feed cache.
//!
//! # Endpoints
//! - `GET /feed` - Feed, cache first, optionally for one profile
//! - `GET /feed/grouped` - Feed grouped by profile
//! - `GET /cache/:key` - Inspect a cached entry
//! - `PUT /cache/:key` - Store a JSON body
//! - `DELETE /cache/:key` - Invalidate a key
//! - `DELETE /cache` - Clear all cache
//! - `POST /cache/memory-warning` - Drop the memory tier
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
