//! Feed Module
//!
//! The content source the feed comes from and the service that puts the
//! cache in front of it.

mod service;
mod source;

pub use service::{Feed, FeedOrigin, FeedService, FEED_KEY};
pub use source::{ContentSource, JsonFileSource};
