//! Cache Module
//!
//! Two-tier content cache: a byte-budgeted memory tier in front of a
//! file-per-key disk tier, both expiring entries after a single TTL.

mod clock;
mod disk;
mod entry;
mod memory;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use disk::DiskTier;
pub use entry::{CacheEntry, CacheKey};
pub use memory::MemoryTier;
pub use stats::{format_size, CacheStats};
pub use store::{CacheHit, CacheSettings, ContentCache, Tier};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
