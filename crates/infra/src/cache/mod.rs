use crate::system::ISys;
use std::{
    any::Any,
    convert::TryFrom,
    collections::{HashMap, HashSet},
    future::Future,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::task::JoinHandle;
use tracing::debug;

struct CacheEntry {
    payload: Arc<dyn Any + Send + Sync>,
    /// Timestamp in millis after which the entry is stale
    expires_at: i64,
    tags: HashSet<String>,
}

impl CacheEntry {
    fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

/// In-process key value store where every entry expires after its ttl and can
/// be tagged so that related entries are invalidated together, e.g. every
/// snapshot derived from the notifications table once a new notification is
/// created.
///
/// Reading through the cache never fails. A missing, expired or differently
/// typed entry is a miss.
pub struct Cache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    sys: Arc<dyn ISys>,
}

impl Cache {
    pub fn new(sys: Arc<dyn ISys>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            sys,
        }
    }

    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let now = self.sys.get_timestamp_millis();
        let entries = self.entries.lock().unwrap();
        let entry = entries.get(key)?;
        if entry.is_expired(now) {
            return None;
        }
        entry.payload.downcast_ref::<T>().cloned()
    }

    pub fn set<T>(&self, key: &str, value: T, ttl: Duration, tags: &[&str])
    where
        T: Send + Sync + 'static,
    {
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = self.sys.get_timestamp_millis().saturating_add(ttl_millis);
        let entry = CacheEntry {
            payload: Arc::new(value),
            expires_at,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
        };
        self.entries.lock().unwrap().insert(key.to_string(), entry);
    }

    pub fn delete(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// Returns the cached value for `key` if it is still fresh, otherwise
    /// awaits `fetch` and caches its result.
    ///
    /// Concurrent callers missing on the same key each run their own `fetch`.
    /// A failed `fetch` is returned as is and leaves the cache untouched.
    pub async fn get_or_set<T, E, F, Fut>(
        &self,
        key: &str,
        fetch: F,
        ttl: Duration,
        tags: &[&str],
    ) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get::<T>(key) {
            return Ok(value);
        }
        let value = fetch().await?;
        self.set(key, value.clone(), ttl, tags);
        Ok(value)
    }

    /// Removes every entry tagged with `tag`
    pub fn invalidate_by_tag(&self, tag: &str) {
        self.entries
            .lock()
            .unwrap()
            .retain(|_, entry| !entry.tags.contains(tag));
    }

    /// Removes all expired entries and returns how many were removed
    pub fn sweep_expired(&self) -> usize {
        let now = self.sys.get_timestamp_millis();
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Periodically removes expired entries so that values written once and
    /// never read again do not pile up. The task ends when the cache is
    /// dropped or the returned handle is aborted.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let cache = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let cache = match cache.upgrade() {
                    Some(cache) => cache,
                    None => break,
                };
                let removed = cache.sweep_expired();
                if removed > 0 {
                    debug!("Swept {} expired cache entries", removed);
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
