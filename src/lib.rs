//! Tagcache - an embeddable in-memory cache with tags
//!
//! Provides key-value caching with TTL expiration, a derived tag index for
//! bulk lookup and deletion, and lifecycle event subscriptions.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheEvent, CacheStats, Envelope, TagStore, TaggedCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_sweep_task;
