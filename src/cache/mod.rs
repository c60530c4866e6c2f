//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and tag-based bulk
//! operations, layered as a primitive store ([`TagStore`]) and a tag-aware
//! facade ([`TaggedCache`]).

mod entry;
mod events;
mod stats;
mod store;
mod tagged;

pub mod tags;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry, Envelope};
pub use events::{CacheEvent, EVENT_CHANNEL_CAPACITY};
pub use stats::CacheStats;
pub use store::TagStore;
pub use tagged::TaggedCache;
