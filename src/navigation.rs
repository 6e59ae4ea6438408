use serde::{Deserialize, Serialize};
use std::fmt;

/// What directory, at what commit, the page shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavigationParameters {
    pub repo_path: String,
    pub commit_id: String,
    /// Directory path inside the repository; empty at the root.
    pub file_path: String,
    /// Revision as the user spelled it (branch, tag), if any.
    pub rev: Option<String>,
}

/// The part of [`NavigationParameters`] that decides whether data must be
/// fetched again. Also the memoization key for both fetches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub repo_path: String,
    pub commit_id: String,
    pub file_path: String,
}

impl NavigationParameters {
    pub fn new(
        repo_path: impl Into<String>,
        commit_id: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            repo_path: repo_path.into(),
            commit_id: commit_id.into(),
            file_path: file_path.into(),
            rev: None,
        }
    }

    pub fn with_rev(mut self, rev: impl Into<String>) -> Self {
        self.rev = Some(rev.into());
        self
    }

    pub fn fetch_key(&self) -> FetchKey {
        FetchKey {
            repo_path: self.repo_path.clone(),
            commit_id: self.commit_id.clone(),
            file_path: self.file_path.clone(),
        }
    }

    /// True when both point at the same repository, commit and path.
    pub fn same_location(&self, other: &NavigationParameters) -> bool {
        self.repo_path == other.repo_path
            && self.commit_id == other.commit_id
            && self.file_path == other.file_path
    }

    /// Same repository and commit, different directory.
    pub fn at_path(&self, file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            ..self.clone()
        }
    }

    pub fn is_root(&self) -> bool {
        self.file_path.is_empty()
    }
}

impl fmt::Display for FetchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "git://{}?{}#{}", self.repo_path, self.commit_id, self.file_path)
    }
}

pub fn entry_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

pub fn parent_path(path: &str) -> String {
    match path.trim_end_matches('/').rsplit_once('/') {
        Some((parent, _)) => parent.to_string(),
        None => String::new(),
    }
}

/// Repository path without its hostname, e.g. `github.com/a/b` -> `a/b`.
pub fn display_repo_path(repo_path: &str) -> String {
    let parts: Vec<&str> = repo_path.split('/').collect();
    if parts.len() >= 3 && parts[0].contains('.') {
        parts[1..].join("/")
    } else {
        repo_path.to_string()
    }
}

pub fn page_title(params: &NavigationParameters) -> String {
    let parts: Vec<&str> = params.repo_path.split('/').collect();
    let repo = if parts.len() > 2 {
        parts[1..].join("/")
    } else {
        params.repo_path.clone()
    };

    if params.is_root() {
        return repo;
    }

    let dir = params.file_path.rsplit('/').next().unwrap_or(&params.file_path);
    format!("{} - {}", dir, repo)
}

fn repo_rev_url(repo_path: &str, rev: Option<&str>) -> String {
    match rev {
        Some(rev) => format!("/{}@{}", repo_path, rev),
        None => format!("/{}", repo_path),
    }
}

pub fn tree_url(repo_path: &str, rev: Option<&str>, file_path: &str) -> String {
    let base = repo_rev_url(repo_path, rev);
    if file_path.is_empty() {
        base
    } else {
        format!("{}/-/tree/{}", base, file_path)
    }
}

pub fn blob_url(repo_path: &str, rev: Option<&str>, file_path: &str) -> String {
    format!("{}/-/blob/{}", repo_rev_url(repo_path, rev), file_path)
}
