//! Cache Entry Module
//!
//! Defines the stored envelope shape and per-entry TTL metadata.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};

// == Envelope ==
/// The stored representation of a value: bare, or wrapped with its tags.
///
/// The two shapes are distinguished structurally: `tags: None` is a bare
/// entry, `tags: Some(_)` is a tagged entry even when the tag list is empty.
/// Reads expose this asymmetry on purpose: a tagged entry reads back as a
/// `{"value": ..., "tags": [...]}` object while a bare entry reads back as
/// the raw payload. Callers distinguish the two purely by shape.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// The caller-supplied payload, opaque to the cache
    pub value: Arc<Value>,
    /// Tag descriptors attached at set time, in caller order
    pub tags: Option<Vec<Value>>,
}

impl Envelope {
    /// Creates a bare (untagged) envelope.
    pub fn bare(value: Value) -> Self {
        Self {
            value: Arc::new(value),
            tags: None,
        }
    }

    /// Creates a tagged envelope, preserving tag order.
    pub fn tagged(value: Value, tags: Vec<Value>) -> Self {
        Self {
            value: Arc::new(value),
            tags: Some(tags),
        }
    }

    /// Returns true if this envelope carries a tag list.
    pub fn is_tagged(&self) -> bool {
        self.tags.is_some()
    }

    /// Hands out the inner payload: a deep copy when `clone_on_get` is set,
    /// otherwise a shared handle to the stored allocation.
    pub fn payload(&self, clone_on_get: bool) -> Arc<Value> {
        if clone_on_get {
            Arc::new((*self.value).clone())
        } else {
            Arc::clone(&self.value)
        }
    }

    /// Builds the externally visible read shape.
    ///
    /// Tagged entries produce a fresh `{"value": ..., "tags": [...]}` object.
    /// Bare entries hand out the payload itself via [`payload`](Self::payload).
    pub fn read_value(&self, clone_on_get: bool) -> Arc<Value> {
        match &self.tags {
            Some(tags) => Arc::new(json!({
                "value": (*self.value).clone(),
                "tags": tags.clone(),
            })),
            None => self.payload(clone_on_get),
        }
    }
}

// == Cache Entry ==
/// A stored envelope together with its lifecycle metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored envelope
    pub envelope: Envelope,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl CacheEntry {
    /// Creates a new cache entry with optional TTL.
    ///
    /// # Arguments
    /// * `envelope` - The envelope to store
    /// * `ttl_seconds` - Optional TTL in seconds (None = no expiry)
    pub fn new(envelope: Envelope, ttl_seconds: Option<u64>) -> Self {
        let now = current_timestamp_ms();
        let expires_at = ttl_seconds.map(|ttl| now + (ttl * 1000));

        Self {
            envelope,
            created_at: now,
            expires_at,
        }
    }

    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired when the current time is
    /// greater than or equal to the expiration time, so the instant the TTL
    /// has fully elapsed the entry is already invisible.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    /// Re-arms the expiry from now, or clears it when `ttl_seconds` is None.
    pub fn set_ttl(&mut self, ttl_seconds: Option<u64>) {
        self.expires_at = ttl_seconds.map(|ttl| current_timestamp_ms() + (ttl * 1000));
    }

    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired (TTL elapsed)
    /// - `Some(remaining_ms)` if the entry has TTL and hasn't expired
    /// - `None` if the entry has no TTL (never expires)
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at.map(|expires| {
            let now = current_timestamp_ms();
            expires.saturating_sub(now)
        })
    }

    /// Returns remaining TTL in seconds, or None if no expiration is set.
    pub fn ttl_remaining(&self) -> Option<u64> {
        self.ttl_remaining_ms().map(|ms| ms / 1000)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = CacheEntry::new(Envelope::bare(json!("test_value")), None);

        assert_eq!(*entry.envelope.value, json!("test_value"));
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = CacheEntry::new(Envelope::bare(json!("test_value")), Some(60));

        assert!(entry.expires_at.is_some());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(Envelope::bare(json!("test_value")), Some(1));

        assert!(!entry.is_expired());

        sleep(Duration::from_millis(1100));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_set_ttl_rearms_expiry() {
        let mut entry = CacheEntry::new(Envelope::bare(json!(1)), Some(1));
        entry.set_ttl(Some(60));

        let remaining = entry.ttl_remaining().unwrap();
        assert!(remaining > 1);
    }

    #[test]
    fn test_set_ttl_clears_expiry() {
        let mut entry = CacheEntry::new(Envelope::bare(json!(1)), Some(1));
        entry.set_ttl(None);

        assert!(entry.expires_at.is_none());
        assert!(entry.ttl_remaining().is_none());
    }

    #[test]
    fn test_ttl_remaining_seconds() {
        let entry = CacheEntry::new(Envelope::bare(json!(1)), Some(10));

        let remaining = entry.ttl_remaining().unwrap();
        assert!(remaining <= 10);
        assert!(remaining >= 9);
    }

    #[test]
    fn test_ttl_remaining_no_expiration() {
        let entry = CacheEntry::new(Envelope::bare(json!(1)), None);

        assert!(entry.ttl_remaining().is_none());
        assert!(entry.ttl_remaining_ms().is_none());
    }

    #[test]
    fn test_ttl_remaining_expired() {
        let entry = CacheEntry::new(Envelope::bare(json!(1)), Some(1));

        sleep(Duration::from_millis(1100));

        assert_eq!(entry.ttl_remaining().unwrap(), 0);
        assert_eq!(entry.ttl_remaining_ms().unwrap(), 0);
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = current_timestamp_ms();
        let entry = CacheEntry {
            envelope: Envelope::bare(json!("test")),
            created_at: now,
            expires_at: Some(now), // Expires exactly at creation time
        };

        assert!(entry.is_expired(), "Entry should be expired at boundary");
    }

    #[test]
    fn test_bare_read_value_is_raw_payload() {
        let envelope = Envelope::bare(json!({"a": 1}));

        assert_eq!(*envelope.read_value(true), json!({"a": 1}));
    }

    #[test]
    fn test_tagged_read_value_is_envelope_object() {
        let envelope = Envelope::tagged(json!("v"), vec![json!("t1"), json!("t2")]);
        let shape = envelope.read_value(true);

        assert_eq!(shape["value"], json!("v"));
        assert_eq!(shape["tags"], json!(["t1", "t2"]));
    }

    #[test]
    fn test_empty_tag_list_still_reads_as_envelope() {
        let envelope = Envelope::tagged(json!("v"), vec![]);
        let shape = envelope.read_value(true);

        assert_eq!(shape["value"], json!("v"));
        assert_eq!(shape["tags"], json!([]));
    }

    #[test]
    fn test_read_value_shared_when_clone_disabled() {
        let envelope = Envelope::bare(json!("payload"));
        let shared = envelope.read_value(false);

        assert!(Arc::ptr_eq(&shared, &envelope.value));
    }

    #[test]
    fn test_read_value_copied_when_clone_enabled() {
        let envelope = Envelope::bare(json!("payload"));
        let copied = envelope.read_value(true);

        assert!(!Arc::ptr_eq(&copied, &envelope.value));
        assert_eq!(*copied, *envelope.value);
    }
}
