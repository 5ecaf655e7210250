//! Feed data model and HTTP DTOs
//!
//! Posts and profiles as delivered by the content source, plus the
//! request/response bodies of the HTTP API.

pub mod post;
pub mod profile;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use post::{group_by_profile, posts_by_profile, Post, PremiumDetails};
pub use profile::{format_count, Profile};
pub use requests::FeedQuery;
pub use responses::{
    EntryResponse, FeedResponse, GroupedFeedResponse, HealthResponse, MemoryWarningResponse,
    MessageResponse, StatsResponse,
};
