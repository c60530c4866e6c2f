//! Tag Store Module
//!
//! The primitive storage layer: key→envelope map with TTL expiry, eviction
//! events, and statistics. Tag semantics live one layer up in
//! [`TaggedCache`](crate::cache::TaggedCache); this layer treats envelopes
//! as opaque.

use std::collections::HashMap;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use crate::cache::{CacheEntry, CacheEvent, CacheStats, Envelope, EVENT_CHANNEL_CAPACITY};
use crate::error::{CacheError, Result};

// == Tag Store ==
/// Primitive key→envelope storage with TTL expiry and eviction events.
///
/// An entry is visible if and only if it has not expired and has not been
/// deleted; expired entries are purged lazily on access and in bulk by
/// [`sweep_expired`](TagStore::sweep_expired), and are invisible to every
/// operation regardless of purge timing.
#[derive(Debug)]
pub struct TagStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// Lifecycle event channel (fire-and-forget)
    events: broadcast::Sender<CacheEvent>,
    /// Default TTL in seconds applied when a set omits one (0 = no expiry)
    default_ttl: u64,
    /// Maximum number of live keys (None = unlimited)
    max_keys: Option<usize>,
}

impl TagStore {
    // == Constructor ==
    /// Creates a new TagStore.
    ///
    /// # Arguments
    /// * `default_ttl` - Default TTL in seconds for entries without explicit TTL (0 = none)
    /// * `max_keys` - Optional cap on the number of live keys
    pub fn new(default_ttl: u64, max_keys: Option<usize>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            events,
            default_ttl,
            max_keys,
        }
    }

    // == Set ==
    /// Stores an envelope under a key with a dynamically-typed TTL argument.
    ///
    /// TTL validation happens before any mutation: a non-integer ttl fails
    /// with [`CacheError::TtlType`], a negative one with
    /// [`CacheError::TtlNegative`], and in both cases the store is left
    /// untouched. An omitted ttl falls back to the configured default; an
    /// explicit `0` always means "no expiry".
    ///
    /// Overwriting an existing key fully replaces the prior entry, including
    /// its tags and any pending expiry.
    pub fn set(&mut self, key: String, envelope: Envelope, ttl: Option<&Value>) -> Result<bool> {
        let ttl_seconds = self.resolve_ttl(ttl)?;

        if let Some(limit) = self.max_keys {
            if !self.entries.contains_key(&key) && self.len() >= limit {
                return Err(CacheError::CacheFull { limit });
            }
        }

        let entry = CacheEntry::new(envelope, ttl_seconds);
        self.entries.insert(key.clone(), entry);
        self.stats.set_total_entries(self.len());

        let _ = self.events.send(CacheEvent::Set {
            key,
            at: Utc::now(),
        });

        Ok(true)
    }

    // == Get ==
    /// Retrieves the envelope stored under a key.
    ///
    /// Expired entries are purged on access, counted as misses, and emit the
    /// `expired` event.
    pub fn get(&mut self, key: &str) -> Option<Envelope> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            if let Some(entry) = self.entries.remove(key) {
                self.emit_expired(key, &entry);
            }
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        self.entries.get(key).map(|entry| entry.envelope.clone())
    }

    // == Peek ==
    /// Returns the envelope without touching statistics or purging.
    ///
    /// Expired entries are invisible here too. Used by tag scans, which
    /// must observe a consistent snapshot without perturbing hit/miss
    /// accounting.
    pub fn peek(&self, key: &str) -> Option<&Envelope> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| &entry.envelope)
    }

    // == Delete ==
    /// Removes the entry under a key.
    ///
    /// Returns the number of live entries removed (0 or 1). Deleting a key
    /// whose entry has already expired purges it, emits `expired` rather
    /// than `del`, and returns 0: an expired entry is not visible, so
    /// nothing live was deleted.
    pub fn delete(&mut self, key: &str) -> usize {
        let Some(entry) = self.entries.remove(key) else {
            return 0;
        };

        if entry.is_expired() {
            self.emit_expired(key, &entry);
            return 0;
        }

        self.stats.set_total_entries(self.len());
        let _ = self.events.send(CacheEvent::Deleted {
            key: key.to_string(),
            value: (*entry.envelope.value).clone(),
            at: Utc::now(),
        });

        1
    }

    // == Iter Live ==
    /// Iterates over live entries as (key, envelope) pairs.
    ///
    /// Tag scans are built on this; it never purges or touches statistics.
    pub fn iter_live(&self) -> impl Iterator<Item = (&str, &Envelope)> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(key, entry)| (key.as_str(), &entry.envelope))
    }

    // == Keys ==
    /// Returns all live keys.
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == Flush All ==
    /// Clears the entire store. Pending expirations die with their entries.
    pub fn flush_all(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.stats.set_total_entries(0);

        let _ = self.events.send(CacheEvent::Flushed { at: Utc::now() });
        debug!("store flushed, {} entries dropped", dropped);
    }

    // == Sweep Expired ==
    /// Removes all expired entries, emitting one `expired` event each.
    ///
    /// Returns the number of entries removed. Driven by the background
    /// sweeper; safe to call directly.
    pub fn sweep_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            if let Some(entry) = self.entries.remove(&key) {
                self.emit_expired(&key, &entry);
            }
        }

        count
    }

    // == Set TTL ==
    /// Re-arms the expiry of a live entry from now.
    ///
    /// A ttl of 0 clears the expiry. Returns false when the key holds no
    /// live entry; an expired entry is purged on the way out.
    pub fn set_ttl(&mut self, key: &str, ttl_seconds: u64) -> bool {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return false,
        };

        if expired {
            if let Some(entry) = self.entries.remove(key) {
                self.emit_expired(key, &entry);
            }
            return false;
        }

        if let Some(entry) = self.entries.get_mut(key) {
            entry.set_ttl(if ttl_seconds > 0 { Some(ttl_seconds) } else { None });
            return true;
        }
        false
    }

    // == TTL Remaining ==
    /// Remaining TTL in seconds of a live entry, or None without expiry.
    ///
    /// The outer Option is the lookup: `None` when the key holds no live
    /// entry, `Some(None)` for a live entry that never expires.
    pub fn ttl_remaining(&self, key: &str) -> Option<Option<u64>> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.ttl_remaining())
    }

    // == Events ==
    /// Subscribes to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.len());
        stats
    }

    /// Resets the hit/miss/expiration counters.
    pub fn flush_stats(&mut self) {
        self.stats.reset();
    }

    // == Length ==
    /// Returns the current number of live entries.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| !entry.is_expired())
            .count()
    }

    // == Is Empty ==
    /// Returns true if the store holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Internal ==
    /// Records and broadcasts the eviction of an already-removed entry.
    fn emit_expired(&mut self, key: &str, entry: &CacheEntry) {
        self.stats.record_expiration();
        self.stats.set_total_entries(self.len());

        let _ = self.events.send(CacheEvent::Expired {
            key: key.to_string(),
            value: (*entry.envelope.value).clone(),
            at: Utc::now(),
        });
        debug!("entry expired: {}", key);
    }

    /// Validates the dynamic ttl argument and resolves the effective TTL.
    fn resolve_ttl(&self, ttl: Option<&Value>) -> Result<Option<u64>> {
        let ttl = match ttl {
            // Omitted: the configured default applies
            None => {
                return Ok(if self.default_ttl > 0 {
                    Some(self.default_ttl)
                } else {
                    None
                });
            }
            Some(value) => value,
        };

        match ttl {
            Value::Number(n) => {
                // Negativity takes precedence over the integer check
                if n.as_f64().is_some_and(|f| f < 0.0) {
                    Err(CacheError::TtlNegative)
                } else if let Some(seconds) = n.as_u64() {
                    Ok(if seconds > 0 { Some(seconds) } else { None })
                } else {
                    Err(CacheError::TtlType {
                        found: "float".to_string(),
                    })
                }
            }
            other => Err(CacheError::TtlType {
                found: json_type_name(other).to_string(),
            }),
        }
    }
}

/// The JSON type name of a value, for error context.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
