//! Tagged Cache Module
//!
//! The public facade: a cloneable handle over the primitive store that adds
//! argument validation, envelope construction and unwrapping, tag-based bulk
//! operations, and the error-channel adapters.
//!
//! All operations on one instance execute under a single lock, so tag scans
//! observe a consistent snapshot of the store. Cloning the handle shares the
//! same store; independent instances share nothing.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

use crate::cache::{tags, CacheEvent, CacheStats, Envelope, TagStore};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::spawn_sweep_task;

// == Tagged Cache ==
/// Tag-aware in-memory cache with TTL expiration.
///
/// Values are JSON payloads, opaque to the cache. An entry set with tags
/// reads back as a `{"value": ..., "tags": [...]}` object; an entry set
/// without tags reads back as the bare payload. This asymmetry is the
/// external contract, not an implementation detail.
#[derive(Clone)]
pub struct TaggedCache {
    /// Thread-safe primitive store
    store: Arc<RwLock<TagStore>>,
    /// Background sweeper handle, aborted by `close`
    sweeper: Arc<Mutex<Option<JoinHandle<()>>>>,
    /// Whether reads hand out deep copies of payloads
    clone_on_get: bool,
}

impl TaggedCache {
    // == Constructor ==
    /// Creates a new cache from configuration.
    ///
    /// Spawns the background expiry sweeper unless `check_interval` is 0;
    /// construction therefore requires a running tokio runtime.
    pub fn new(config: &Config) -> Self {
        let store = Arc::new(RwLock::new(TagStore::new(
            config.default_ttl,
            config.max_keys,
        )));

        let sweeper = if config.check_interval > 0 {
            Some(spawn_sweep_task(store.clone(), config.check_interval))
        } else {
            None
        };

        Self {
            store,
            sweeper: Arc::new(Mutex::new(sweeper)),
            clone_on_get: config.clone_on_get,
        }
    }

    // == Set ==
    /// Stores a value under a key, optionally tagged, with an optional TTL.
    ///
    /// `tags` must be a JSON array when present; anything else fails with
    /// [`CacheError::TagsType`] before any store mutation. `ttl` is a
    /// dynamic JSON value: an omitted ttl uses the configured default, `0`
    /// means no expiry, a non-integer fails with [`CacheError::TtlType`]
    /// and a negative number with [`CacheError::TtlNegative`]. In every
    /// failure case the store is left untouched.
    ///
    /// Overwriting an existing key replaces its value, tags, and expiry
    /// wholesale; tag sets are never merged.
    pub async fn set(
        &self,
        key: impl Into<String>,
        value: Value,
        tags: Option<Value>,
        ttl: Option<Value>,
    ) -> Result<bool> {
        let envelope = match tags {
            None => Envelope::bare(value),
            Some(Value::Array(tag_list)) => Envelope::tagged(value, tag_list),
            Some(_) => return Err(CacheError::TagsType),
        };

        let mut store = self.store.write().await;
        store.set(key.into(), envelope, ttl.as_ref())
    }

    /// Callback adapter for [`set`](Self::set): reports the outcome through
    /// the completion closure as well as the return value.
    pub async fn set_with<F>(
        &self,
        key: impl Into<String>,
        value: Value,
        tags: Option<Value>,
        ttl: Option<Value>,
        cb: F,
    ) -> Result<bool>
    where
        F: FnOnce(&Result<bool>),
    {
        let result = self.set(key, value, tags, ttl).await;
        cb(&result);
        result
    }

    // == Get ==
    /// Retrieves the value stored under a key.
    ///
    /// A tagged entry returns the whole `{"value": ..., "tags": [...]}`
    /// envelope; a bare entry returns the raw payload. Missing and expired
    /// keys return None.
    pub async fn get(&self, key: &str) -> Option<Arc<Value>> {
        let mut store = self.store.write().await;
        store.get(key).map(|env| env.read_value(self.clone_on_get))
    }

    /// As [`get`](Self::get), but a miss is an error.
    pub async fn try_get(&self, key: &str) -> Result<Arc<Value>> {
        self.get(key).await.ok_or_else(|| CacheError::NotFound {
            key: key.to_string(),
        })
    }

    /// Callback adapter for [`get`](Self::get): the closure receives the
    /// hit as Ok and a miss as [`CacheError::NotFound`].
    pub async fn get_with<F>(&self, key: &str, cb: F) -> Result<Arc<Value>>
    where
        F: FnOnce(&Result<Arc<Value>>),
    {
        let result = self.try_get(key).await;
        cb(&result);
        result
    }

    // == Get By Tags ==
    /// Returns the inner values of all live entries matching the query.
    ///
    /// The query is a single tag or an array of tags. Scalar tags match by
    /// exact equality; record tags match by field-subset containment
    /// against any of an entry's tags. Matches are unioned across queried
    /// tags with duplicates preserved: an entry matching two queried tags
    /// appears twice. Untagged entries never match.
    pub async fn get_by_tags(&self, query: &Value) -> Vec<Arc<Value>> {
        let store = self.store.read().await;
        let mut values = Vec::new();

        for tag in tags::as_tag_list(query) {
            for (_, envelope) in store.iter_live() {
                if let Some(entry_tags) = &envelope.tags {
                    if tags::matches(entry_tags, tag) {
                        values.push(envelope.payload(self.clone_on_get));
                    }
                }
            }
        }

        values
    }

    /// As [`get_by_tags`](Self::get_by_tags), but an empty result is an
    /// error.
    pub async fn try_get_by_tags(&self, query: &Value) -> Result<Vec<Arc<Value>>> {
        let values = self.get_by_tags(query).await;
        if values.is_empty() {
            Err(CacheError::TagsNotFound)
        } else {
            Ok(values)
        }
    }

    /// Callback adapter for [`get_by_tags`](Self::get_by_tags): the closure
    /// sees an empty result as [`CacheError::TagsNotFound`]; the return
    /// value is the (possibly empty) match list either way.
    pub async fn get_by_tags_with<F>(&self, query: &Value, cb: F) -> Vec<Arc<Value>>
    where
        F: FnOnce(&Result<Vec<Arc<Value>>>),
    {
        let result = self.try_get_by_tags(query).await;
        cb(&result);
        result.unwrap_or_default()
    }

    // == Delete By Tags ==
    /// Deletes every live entry matching the query.
    ///
    /// Same normalization and matching rules as
    /// [`get_by_tags`](Self::get_by_tags). Each entry is removed exactly
    /// once per call even when it matches several queried tags; the return
    /// value counts entries actually removed, so a repeat call with the
    /// same query returns 0.
    pub async fn delete_by_tags(&self, query: &Value) -> usize {
        let mut store = self.store.write().await;
        let mut deleted = 0;

        for tag in tags::as_tag_list(query) {
            let matched: Vec<String> = store
                .iter_live()
                .filter(|(_, envelope)| {
                    envelope
                        .tags
                        .as_deref()
                        .is_some_and(|entry_tags| tags::matches(entry_tags, tag))
                })
                .map(|(key, _)| key.to_string())
                .collect();

            for key in matched {
                deleted += store.delete(&key);
            }
        }

        deleted
    }

    /// Callback adapter for [`delete_by_tags`](Self::delete_by_tags).
    pub async fn delete_by_tags_with<F>(&self, query: &Value, cb: F) -> usize
    where
        F: FnOnce(&Result<usize>),
    {
        let deleted = self.delete_by_tags(query).await;
        cb(&Ok(deleted));
        deleted
    }

    // == Delete ==
    /// Removes the entry under a key; returns the number removed (0 or 1).
    pub async fn delete(&self, key: &str) -> usize {
        let mut store = self.store.write().await;
        store.delete(key)
    }

    // == Keys ==
    /// Returns all live keys.
    pub async fn keys(&self) -> Vec<String> {
        let store = self.store.read().await;
        store.keys()
    }

    // == Flush All ==
    /// Clears the entire cache.
    pub async fn flush_all(&self) {
        let mut store = self.store.write().await;
        store.flush_all();
    }

    // == TTL ==
    /// Re-arms the expiry of a live entry from now; 0 clears the expiry.
    ///
    /// Returns false when the key holds no live entry.
    pub async fn set_ttl(&self, key: &str, ttl_seconds: u64) -> bool {
        let mut store = self.store.write().await;
        store.set_ttl(key, ttl_seconds)
    }

    /// Remaining TTL in seconds of a live entry (`Some(None)` = no expiry).
    pub async fn ttl_remaining(&self, key: &str) -> Option<Option<u64>> {
        let store = self.store.read().await;
        store.ttl_remaining(key)
    }

    // == Events ==
    /// Subscribes to lifecycle events (`set`, `del`, `expired`, `flush`).
    pub async fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        let store = self.store.read().await;
        store.subscribe()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;
        store.stats()
    }

    /// Resets the hit/miss/expiration counters.
    pub async fn flush_stats(&self) {
        let mut store = self.store.write().await;
        store.flush_stats();
    }

    // == Length ==
    /// Returns the current number of live entries.
    pub async fn len(&self) -> usize {
        let store = self.store.read().await;
        store.len()
    }

    /// Returns true if the cache holds no live entries.
    pub async fn is_empty(&self) -> bool {
        let store = self.store.read().await;
        store.is_empty()
    }

    // == Close ==
    /// Stops the background sweeper.
    ///
    /// The cache remains usable afterwards; expiry is still enforced lazily
    /// on access.
    pub fn close(&self) {
        if let Ok(mut guard) = self.sweeper.lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
    }
}
