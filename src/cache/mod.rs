use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use crate::dto::NotesQuery;

/// Identifies a cached server payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "params", rename_all = "camelCase")]
pub enum QueryKey {
    /// A notes list page. `None` only appears as an invalidation prefix.
    Notes(Option<NotesQuery>),
    Note(i64),
}

impl QueryKey {
    /// Prefix matching every notes list page.
    #[must_use]
    pub const fn notes() -> Self {
        Self::Notes(None)
    }

    #[must_use]
    pub fn notes_page(query: NotesQuery) -> Self {
        Self::Notes(Some(query))
    }

    /// Whether invalidating `self` affects the entry stored under `key`.
    #[must_use]
    pub fn matches(&self, key: &Self) -> bool {
        match (self, key) {
            (Self::Notes(None), Self::Notes(_)) => true,
            _ => self == key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub value: Value,
    pub updated_at: DateTime<Utc>,
    pub invalidated: bool,
}

impl CacheEntry {
    fn new(value: Value) -> Self {
        Self {
            value,
            updated_at: Utc::now(),
            invalidated: false,
        }
    }
}

/// Keyed store of server data.
pub trait QueryCache {
    fn get(&self, key: &QueryKey) -> Option<CacheEntry>;

    fn set(&self, key: QueryKey, value: Value);

    /// Marks every entry matched by `key` stale and returns how many were hit.
    fn invalidate(&self, key: &QueryKey) -> usize;
}

/// Serializable snapshot of a cache, handed from the prefetching side to
/// the rendering side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DehydratedState {
    pub queries: Vec<DehydratedQuery>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DehydratedQuery {
    pub query_key: QueryKey,
    pub state: CacheEntry,
}

/// Shared in-memory query cache. Clones share the same entries.
#[derive(Debug, Clone)]
pub struct QueryClient {
    entries: Arc<Mutex<HashMap<QueryKey, CacheEntry>>>,
    stale_time: Duration,
}

impl QueryClient {
    #[must_use]
    pub fn new(stale_time: Duration) -> Self {
        Self {
            entries: Arc::default(),
            stale_time,
        }
    }

    #[must_use]
    pub const fn stale_time(&self) -> Duration {
        self.stale_time
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        if entry.invalidated {
            return false;
        }
        let stale_time = TimeDelta::from_std(self.stale_time).unwrap_or(TimeDelta::MAX);
        Utc::now() - entry.updated_at < stale_time
    }

    /// Whether the next fetch for `key` goes to the network.
    #[must_use]
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.get(key).is_none_or(|entry| !self.is_fresh(&entry))
    }

    /// Cached payload for `key`, fresh or stale.
    #[must_use]
    pub fn get_query_data<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entry = self.get(key)?;
        serde_json::from_value(entry.value).ok()
    }

    /// # Errors
    ///
    /// Fails when `data` cannot be represented as JSON.
    pub fn set_query_data<T: Serialize>(
        &self,
        key: QueryKey,
        data: &T,
    ) -> Result<(), serde_json::Error> {
        self.set(key, serde_json::to_value(data)?);
        Ok(())
    }

    /// Returns the cached payload while it is fresh, otherwise runs `fetch`
    /// and caches its result. Failed fetches leave the cache untouched.
    ///
    /// # Errors
    ///
    /// Propagates the fetch error, or a serialization error of the payload.
    pub async fn fetch_query<T, E, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<serde_json::Error>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(entry) = self.get(&key)
            && self.is_fresh(&entry)
        {
            match serde_json::from_value(entry.value) {
                Ok(data) => {
                    tracing::debug!(?key, "Query cache hit");
                    return Ok(data);
                }
                Err(e) => tracing::warn!(?key, "Discarding undecodable cache entry: {e}"),
            }
        }

        tracing::debug!(?key, "Query cache miss, fetching");
        let data = fetch().await?;
        self.set(key, serde_json::to_value(&data)?);
        Ok(data)
    }

    /// Like [`QueryClient::fetch_query`] but never fails; errors are logged
    /// and leave the key uncached.
    pub async fn prefetch_query<T, E, F, Fut>(&self, key: QueryKey, fetch: F)
    where
        T: Serialize + DeserializeOwned,
        E: From<serde_json::Error> + std::fmt::Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let log_key = key.clone();
        if let Err(e) = self.fetch_query(key, fetch).await {
            tracing::warn!(key = ?log_key, "Prefetch failed: {e}");
        }
    }

    #[must_use]
    pub fn dehydrate(&self) -> DehydratedState {
        let queries = self
            .lock()
            .iter()
            .map(|(key, entry)| DehydratedQuery {
                query_key: key.clone(),
                state: entry.clone(),
            })
            .collect();
        DehydratedState { queries }
    }

    /// Merges a snapshot into this cache. Entries already holding newer data
    /// are kept.
    pub fn hydrate(&self, state: DehydratedState) {
        let mut entries = self.lock();
        for query in state.queries {
            let newer = entries
                .get(&query.query_key)
                .is_none_or(|existing| existing.updated_at < query.state.updated_at);
            if newer {
                entries.insert(query.query_key, query.state);
            }
        }
    }
}

impl QueryCache for QueryClient {
    fn get(&self, key: &QueryKey) -> Option<CacheEntry> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: QueryKey, value: Value) {
        self.lock().insert(key, CacheEntry::new(value));
    }

    fn invalidate(&self, key: &QueryKey) -> usize {
        let mut count = 0;
        for (stored, entry) in self.lock().iter_mut() {
            if key.matches(stored) {
                entry.invalidated = true;
                count += 1;
            }
        }
        tracing::debug!(?key, count, "Invalidated queries");
        count
    }
}
