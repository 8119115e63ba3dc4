//! Cache Module
//!
//! In-memory key/value caching with per-entry expiry, lazy eviction and an
//! optional LRU capacity bound.

mod entry;
mod lru;
mod stats;
mod ttl_cache;


pub(crate) use entry::CacheEntry;
pub(crate) use lru::LruTracker;

// Re-export public types
pub use stats::CacheStats;
pub use ttl_cache::{CacheOptions, TtlCache};
