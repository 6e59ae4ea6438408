//! Memoization of listing and commit-history fetches.
//!
//! A [`FetchCache`] maps each [`FetchKey`] to one shared fetch. Callers that
//! ask for a key while its request is in flight await the same request;
//! callers that arrive after it completed get the stored result without
//! touching the backend. Failed results are dropped so the next request for
//! that key retries.
//!
//! The cache holds at most `capacity` completed keys and evicts the oldest
//! completed insertion first. Fetches still in flight are never evicted.

use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::FetchError;
use crate::navigation::FetchKey;

pub type FetchFuture<V> = BoxFuture<'static, Result<V, FetchError>>;

type SharedFetch<V> = Shared<FetchFuture<V>>;

struct Entries<V> {
    by_key: HashMap<FetchKey, SharedFetch<V>>,
    /// Insertion order, oldest first.
    order: VecDeque<FetchKey>,
}

pub struct FetchCache<V> {
    entries: Mutex<Entries<V>>,
    capacity: usize,
}

impl<V> FetchCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Entries {
                by_key: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity: capacity.max(1),
        }
    }

    /// Result for `key`, starting the request with `start` only if no
    /// shared fetch exists for it yet.
    pub async fn fetch<F>(&self, key: &FetchKey, start: F) -> Result<V, FetchError>
    where
        F: FnOnce() -> FetchFuture<V>,
    {
        let shared = self.lookup_or_start(key, start);
        let result = shared.clone().await;
        if result.is_err() {
            self.forget_failed(key, &shared);
        }
        result
    }

    fn lookup_or_start<F>(&self, key: &FetchKey, start: F) -> SharedFetch<V>
    where
        F: FnOnce() -> FetchFuture<V>,
    {
        let mut entries = self.lock();
        if let Some(existing) = entries.by_key.get(key) {
            log::trace!("memo: sharing fetch for {}", key);
            return existing.clone();
        }

        // Only completed entries are evicted; in-flight ones may push the
        // cache over capacity until they finish.
        while entries.by_key.len() >= self.capacity {
            let Some(position) = entries.order.iter().position(|k| {
                entries.by_key.get(k).is_some_and(|shared| shared.peek().is_some())
            }) else {
                log::trace!("memo: all {} entries in flight, not evicting", entries.by_key.len());
                break;
            };
            if let Some(oldest) = entries.order.remove(position) {
                log::debug!("memo: evicting {}", oldest);
                entries.by_key.remove(&oldest);
            }
        }

        log::debug!("memo: starting fetch for {}", key);
        let shared = start().shared();
        entries.by_key.insert(key.clone(), shared.clone());
        entries.order.push_back(key.clone());
        shared
    }

    fn forget_failed(&self, key: &FetchKey, failed: &SharedFetch<V>) {
        let mut entries = self.lock();
        // A newer fetch may already have replaced the failed one.
        let is_same = entries
            .by_key
            .get(key)
            .is_some_and(|current| current.ptr_eq(failed));
        if is_same {
            log::debug!("memo: dropping failed result for {}", key);
            entries.by_key.remove(key);
            entries.order.retain(|k| k != key);
        }
    }

    pub fn contains(&self, key: &FetchKey) -> bool {
        self.lock().by_key.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Entries<V>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
