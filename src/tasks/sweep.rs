//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries and
//! broadcasts their `expired` events.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::TagStore;

/// Spawns a background task that periodically sweeps expired entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. It acquires a write lock on the store to remove expired
/// entries; each removal emits an `expired` event. Expired entries are also
/// hidden (and purged) lazily on access, so the sweep only bounds how long
/// dead entries occupy memory.
///
/// # Arguments
/// * `store` - Shared reference to the tag store
/// * `check_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, used by `TaggedCache::close` to stop
/// the sweeper.
pub fn spawn_sweep_task(
    store: Arc<RwLock<TagStore>>,
    check_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(check_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            check_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut store_guard = store.write().await;
                store_guard.sweep_expired()
            };

            if removed > 0 {
                info!("expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("expiry sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Envelope;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_sweep_task_removes_expired_entries() {
        let store = Arc::new(RwLock::new(TagStore::new(0, None)));

        {
            let mut store_guard = store.write().await;
            store_guard
                .set(
                    "expire_soon".to_string(),
                    Envelope::bare(json!("value")),
                    Some(&json!(1)),
                )
                .unwrap();
        }

        let handle = spawn_sweep_task(store.clone(), 1);

        // Wait for entry to expire and the sweep to run
        tokio::time::sleep(Duration::from_millis(2500)).await;

        {
            let store_guard = store.read().await;
            assert!(
                store_guard.peek("expire_soon").is_none(),
                "Expired entry should have been swept"
            );
            assert_eq!(store_guard.stats().expirations, 1);
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_preserves_valid_entries() {
        let store = Arc::new(RwLock::new(TagStore::new(0, None)));

        {
            let mut store_guard = store.write().await;
            store_guard
                .set(
                    "long_lived".to_string(),
                    Envelope::bare(json!("value")),
                    Some(&json!(3600)),
                )
                .unwrap();
        }

        let handle = spawn_sweep_task(store.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        {
            let mut store_guard = store.write().await;
            let envelope = store_guard.get("long_lived");
            assert!(envelope.is_some(), "Valid entry should not be removed");
            assert_eq!(*envelope.unwrap().value, json!("value"));
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let store = Arc::new(RwLock::new(TagStore::new(0, None)));

        let handle = spawn_sweep_task(store, 1);

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
