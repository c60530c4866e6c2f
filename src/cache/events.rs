//! Cache Events Module
//!
//! Named lifecycle events delivered over a broadcast channel.
//!
//! Delivery is fire-and-forget: events are dropped when nobody subscribes,
//! and a slow subscriber can lag without affecting the store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Broadcast channel capacity per cache instance.
pub const EVENT_CHANNEL_CAPACITY: usize = 128;

// == Cache Event ==
/// A lifecycle event emitted by the cache.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CacheEvent {
    /// An entry was stored or overwritten
    Set {
        /// The key that was written
        key: String,
        /// When the write happened
        at: DateTime<Utc>,
    },
    /// An entry was explicitly removed (delete or delete-by-tags)
    #[serde(rename = "del")]
    Deleted {
        /// The removed key
        key: String,
        /// The payload that was stored under the key
        value: Value,
        /// When the removal happened
        at: DateTime<Utc>,
    },
    /// An entry's TTL elapsed and it was evicted
    ///
    /// Fires exactly once per expired entry, from whichever path removes
    /// it first (lazy purge on access or the background sweeper). Never
    /// fires for entries that were deleted or replaced before their TTL.
    Expired {
        /// The evicted key
        key: String,
        /// The payload that was stored under the key
        value: Value,
        /// When the eviction happened
        at: DateTime<Utc>,
    },
    /// The whole store was cleared
    #[serde(rename = "flush")]
    Flushed {
        /// When the flush happened
        at: DateTime<Utc>,
    },
}

impl CacheEvent {
    /// The key this event concerns, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            CacheEvent::Set { key, .. }
            | CacheEvent::Deleted { key, .. }
            | CacheEvent::Expired { key, .. } => Some(key),
            CacheEvent::Flushed { .. } => None,
        }
    }
}
