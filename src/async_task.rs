use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;
use crate::graphql::QueryService;
use crate::memo::FetchCache;
use crate::model::{CommitLogEntry, DirectoryListing};
use crate::navigation::FetchKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchField {
    Listing,
    Commits,
}

/// Outcome of one fetch task, tagged with the navigation generation that
/// issued it.
#[derive(Debug, Clone)]
pub enum TaskResult {
    TreeLoaded {
        generation: u64,
        result: Result<DirectoryListing, FetchError>,
    },
    CommitsLoaded {
        generation: u64,
        result: Result<Vec<CommitLogEntry>, FetchError>,
    },
}

impl TaskResult {
    pub fn generation(&self) -> u64 {
        match self {
            TaskResult::TreeLoaded { generation, .. } | TaskResult::CommitsLoaded { generation, .. } => {
                *generation
            }
        }
    }

    pub fn field(&self) -> FetchField {
        match self {
            TaskResult::TreeLoaded { .. } => FetchField::Listing,
            TaskResult::CommitsLoaded { .. } => FetchField::Commits,
        }
    }
}

/// The query service together with its memoization caches. Cheap to clone;
/// clones share the caches.
#[derive(Clone)]
pub struct Fetchers {
    service: Arc<dyn QueryService>,
    trees: Arc<FetchCache<DirectoryListing>>,
    commits: Arc<FetchCache<Vec<CommitLogEntry>>>,
}

impl Fetchers {
    pub fn new(service: Arc<dyn QueryService>, cache_capacity: usize) -> Self {
        Self {
            service,
            trees: Arc::new(FetchCache::new(cache_capacity)),
            commits: Arc::new(FetchCache::new(cache_capacity)),
        }
    }

    pub fn tree_cache(&self) -> &FetchCache<DirectoryListing> {
        &self.trees
    }

    pub async fn fetch_tree(&self, key: &FetchKey) -> Result<DirectoryListing, FetchError> {
        self.trees.fetch(key, || self.service.fetch_tree(key)).await
    }

    pub async fn fetch_commit_history(&self, key: &FetchKey) -> Result<Vec<CommitLogEntry>, FetchError> {
        self.commits.fetch(key, || self.service.fetch_commit_history(key)).await
    }
}

/// Spawn the listing and commit-history fetches for `key`.
///
/// Each task stops as soon as `cancellation_token` fires and otherwise sends
/// exactly one [`TaskResult`] on `result_sender`. The two tasks are
/// independent; neither waits on the other.
pub fn spawn_fetches(
    fetchers: &Fetchers,
    key: FetchKey,
    generation: u64,
    cancellation_token: CancellationToken,
    result_sender: mpsc::UnboundedSender<TaskResult>,
) -> [JoinHandle<()>; 2] {
    let tree_task = {
        let fetchers = fetchers.clone();
        let key = key.clone();
        let token = cancellation_token.clone();
        let sender = result_sender.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    log::debug!("🛑 async_task: tree fetch for {} cancelled", key);
                }
                result = fetchers.fetch_tree(&key) => {
                    if sender.send(TaskResult::TreeLoaded { generation, result }).is_err() {
                        log::debug!("async_task: tree result for {} dropped, controller gone", key);
                    }
                }
            }
        })
    };

    let commits_task = {
        let fetchers = fetchers.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancellation_token.cancelled() => {
                    log::debug!("🛑 async_task: commit fetch for {} cancelled", key);
                }
                result = fetchers.fetch_commit_history(&key) => {
                    if result_sender.send(TaskResult::CommitsLoaded { generation, result }).is_err() {
                        log::debug!("async_task: commit result for {} dropped, controller gone", key);
                    }
                }
            }
        })
    };

    [tree_task, commits_task]
}
