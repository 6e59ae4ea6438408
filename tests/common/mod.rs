#![allow(dead_code)]

use dirview::error::FetchError;
use dirview::graphql::QueryService;
use dirview::model::{CommitLogEntry, DirectoryListing, Person, Signature, TreeEntry};
use dirview::navigation::{FetchKey, NavigationParameters};
use dirview::query::SearchScope;
use dirview::search::SearchSubmitter;
use futures_util::future::BoxFuture;
use mockall::mock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

mock! {
    pub Service {}

    impl QueryService for Service {
        fn fetch_tree(&self, key: &FetchKey) -> BoxFuture<'static, Result<DirectoryListing, FetchError>>;
        fn fetch_commit_history(&self, key: &FetchKey) -> BoxFuture<'static, Result<Vec<CommitLogEntry>, FetchError>>;
    }
}

mock! {
    pub Submitter {}

    impl SearchSubmitter for Submitter {
        fn submit(&self, context: &NavigationParameters, query: &str, scope: SearchScope);
    }
}

pub fn params(path: &str) -> NavigationParameters {
    NavigationParameters::new("github.com/gorilla/mux", "abc123", path)
}

/// A listing whose single file is named after the directory it came from.
pub fn listing_for(path: &str) -> DirectoryListing {
    DirectoryListing {
        directories: vec![TreeEntry { name: "sub".to_string() }],
        files: vec![TreeEntry { name: format!("{}.go", if path.is_empty() { "root" } else { path }) }],
    }
}

pub fn commits_for(path: &str) -> Vec<CommitLogEntry> {
    vec![CommitLogEntry {
        oid: "a1b2c3d4e5f60718".to_string(),
        abbreviated_oid: "a1b2c3d".to_string(),
        subject: format!("Touch {}", path),
        message: None,
        author: Signature {
            person: Person {
                name: "Dev".to_string(),
                email: "dev@example.com".to_string(),
            },
            date: "2023-01-01T00:00:00Z".to_string(),
        },
    }]
}

type TreeGate = oneshot::Receiver<Result<DirectoryListing, FetchError>>;
type CommitGate = oneshot::Receiver<Result<Vec<CommitLogEntry>, FetchError>>;

/// Query service whose responses resolve only when the test says so.
///
/// Paths without a registered gate answer immediately with
/// [`listing_for`] / [`commits_for`].
#[derive(Default)]
pub struct GatedService {
    tree_gates: Mutex<HashMap<String, TreeGate>>,
    commit_gates: Mutex<HashMap<String, CommitGate>>,
    pub tree_calls: AtomicUsize,
    pub commit_calls: AtomicUsize,
}

impl GatedService {
    pub fn gate_tree(&self, path: &str) -> oneshot::Sender<Result<DirectoryListing, FetchError>> {
        let (tx, rx) = oneshot::channel();
        self.tree_gates.lock().unwrap().insert(path.to_string(), rx);
        tx
    }

    pub fn gate_commits(&self, path: &str) -> oneshot::Sender<Result<Vec<CommitLogEntry>, FetchError>> {
        let (tx, rx) = oneshot::channel();
        self.commit_gates.lock().unwrap().insert(path.to_string(), rx);
        tx
    }
}

impl QueryService for GatedService {
    fn fetch_tree(&self, key: &FetchKey) -> BoxFuture<'static, Result<DirectoryListing, FetchError>> {
        self.tree_calls.fetch_add(1, Ordering::SeqCst);
        let path = key.file_path.clone();
        match self.tree_gates.lock().unwrap().remove(&path) {
            Some(gate) => Box::pin(async move {
                gate.await
                    .unwrap_or_else(|_| Err(FetchError::Network("gate dropped".to_string())))
            }),
            None => Box::pin(async move { Ok(listing_for(&path)) }),
        }
    }

    fn fetch_commit_history(&self, key: &FetchKey) -> BoxFuture<'static, Result<Vec<CommitLogEntry>, FetchError>> {
        self.commit_calls.fetch_add(1, Ordering::SeqCst);
        let path = key.file_path.clone();
        match self.commit_gates.lock().unwrap().remove(&path) {
            Some(gate) => Box::pin(async move {
                gate.await
                    .unwrap_or_else(|_| Err(FetchError::Network("gate dropped".to_string())))
            }),
            None => Box::pin(async move { Ok(commits_for(&path)) }),
        }
    }
}

/// Let spawned fetch tasks run on the current-thread test runtime.
pub async fn let_tasks_run() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
