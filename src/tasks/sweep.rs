//! Cache Sweep Task
//!
//! Optional background task that periodically runs the cache's full sweep.
//! Reads still evict lazily; this only bounds how long expired entries that
//! nobody reads stay in memory.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::TtlCache;
use crate::clock::Clock;

/// Spawns a task that sweeps expired entries from `cache` every `interval`.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(TtlCache::<String>::new(Duration::from_secs(300))));
/// let sweep_handle = spawn_sweep_task(cache.clone(), Duration::from_secs(30));
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<V, C>(
    cache: Arc<RwLock<TtlCache<V, C>>>,
    interval: Duration,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
    C: Clock + 'static,
{
    tokio::spawn(async move {
        info!(?interval, "Starting cache sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.sweep();

            if removed > 0 {
                info!("Cache sweep: removed {} expired entries", removed);
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn shared_cache() -> (Arc<RwLock<TtlCache<String, ManualClock>>>, ManualClock) {
        let clock = ManualClock::new(0);
        let cache = TtlCache::with_clock(Duration::from_secs(300), clock.clone());
        (Arc::new(RwLock::new(cache)), clock)
    }

    #[tokio::test]
    async fn test_sweep_task_removes_expired_entries() {
        let (cache, clock) = shared_cache();

        cache
            .write()
            .await
            .set("expire_soon", "value".to_string(), Some(Duration::from_millis(10)));
        clock.set(20);

        let handle = spawn_sweep_task(cache.clone(), Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(250)).await;

        // Physically removed without any read touching the key
        assert!(!cache.write().await.delete("expire_soon"));

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_preserves_valid_entries() {
        let (cache, _clock) = shared_cache();

        cache
            .write()
            .await
            .set("long_lived", "value".to_string(), Some(Duration::from_secs(3600)));

        let handle = spawn_sweep_task(cache.clone(), Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(
            cache.write().await.get("long_lived").cloned(),
            Some("value".to_string())
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let (cache, _clock) = shared_cache();

        let handle = spawn_sweep_task(cache, Duration::from_secs(1));
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
