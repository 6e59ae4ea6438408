//! Fakes shared by the unit tests.

use futures_util::future::BoxFuture;
use std::sync::Arc;

use crate::app::App;
use crate::async_task::Fetchers;
use crate::config::ColorConfig;
use crate::controller::DirectoryViewController;
use crate::error::FetchError;
use crate::graphql::QueryService;
use crate::model::{CommitLogEntry, DirectoryListing, TreeEntry};
use crate::navigation::{FetchKey, NavigationParameters};
use crate::query::SearchScope;
use crate::search::SearchSubmitter;

/// Answers every key with the same listing and no commits.
pub struct StaticQueryService {
    pub listing: DirectoryListing,
}

impl QueryService for StaticQueryService {
    fn fetch_tree(&self, _key: &FetchKey) -> BoxFuture<'static, Result<DirectoryListing, FetchError>> {
        let listing = self.listing.clone();
        Box::pin(async move { Ok(listing) })
    }

    fn fetch_commit_history(&self, _key: &FetchKey) -> BoxFuture<'static, Result<Vec<CommitLogEntry>, FetchError>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

pub struct NullSubmitter;

impl SearchSubmitter for NullSubmitter {
    fn submit(&self, _context: &NavigationParameters, _query: &str, _scope: SearchScope) {}
}

pub fn listing(directories: &[&str], files: &[&str]) -> DirectoryListing {
    let entries = |names: &[&str]| {
        names
            .iter()
            .map(|name| TreeEntry { name: name.to_string() })
            .collect()
    };
    DirectoryListing {
        directories: entries(directories),
        files: entries(files),
    }
}

pub fn mount_static(file_path: &str, listing: DirectoryListing) -> App {
    let fetchers = Fetchers::new(Arc::new(StaticQueryService { listing }), 16);
    let params = NavigationParameters::new("github.com/a/b", "abc", file_path);
    let controller = DirectoryViewController::mount(fetchers, Arc::new(NullSubmitter), params);
    App::new(controller, "https://code.example.com", ColorConfig::default())
}
