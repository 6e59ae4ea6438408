use serde::{Deserialize, Serialize};

use crate::navigation::NavigationParameters;

/// Where a search was started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    Tree,
    Repo,
}

impl SearchScope {
    pub fn for_parameters(params: &NavigationParameters) -> Self {
        if params.is_root() {
            SearchScope::Repo
        } else {
            SearchScope::Tree
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SearchScope::Tree => "tree",
            SearchScope::Repo => "repo",
        }
    }
}

pub fn search_query_for_repo_rev(repo_path: &str, rev: Option<&str>) -> String {
    match rev {
        Some(rev) => format!("repo:{}@{} ", repo_path, rev),
        None => format!("repo:{} ", repo_path),
    }
}

/// Query terms that restrict a search to the viewed repository and, below
/// the root, to files under the viewed directory.
pub fn query_scope_prefix(params: &NavigationParameters) -> String {
    let mut prefix = search_query_for_repo_rev(&params.repo_path, params.rev.as_deref());
    if !params.file_path.is_empty() {
        prefix.push_str(&format!("file:^{}/ ", regex::escape(&params.file_path)));
    }
    prefix
}

pub fn full_query(params: &NavigationParameters, query_text: &str) -> String {
    format!("{}{}", query_scope_prefix(params), query_text)
}
