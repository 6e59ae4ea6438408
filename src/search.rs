use std::sync::{Mutex, PoisonError};

use crate::navigation::NavigationParameters;
use crate::query::SearchScope;

/// Takes a fully scoped query and navigates the host to its results.
pub trait SearchSubmitter: Send + Sync {
    fn submit(&self, context: &NavigationParameters, query: &str, scope: SearchScope);
}

pub fn build_search_url(endpoint: &str, query: &str, scope: SearchScope) -> String {
    format!(
        "{}/search?q={}&source={}",
        endpoint.trim_end_matches('/'),
        urlencoding::encode(query),
        scope.as_str()
    )
}

/// Turns submissions into search result URLs on `endpoint`.
pub struct UrlSubmitter {
    endpoint: String,
    open_in_browser: bool,
    last_url: Mutex<Option<String>>,
}

impl UrlSubmitter {
    pub fn new(endpoint: impl Into<String>, open_in_browser: bool) -> Self {
        Self {
            endpoint: endpoint.into(),
            open_in_browser,
            last_url: Mutex::new(None),
        }
    }

    pub fn last_url(&self) -> Option<String> {
        self.last_url
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SearchSubmitter for UrlSubmitter {
    fn submit(&self, context: &NavigationParameters, query: &str, scope: SearchScope) {
        let url = build_search_url(&self.endpoint, query, scope);
        log::info!("🔎 search: {} from {}", url, context.fetch_key());

        if self.open_in_browser {
            if let Err(e) = open::that(&url) {
                log::error!("search: failed to open browser for {}: {}", url, e);
            }
        }

        *self.last_url.lock().unwrap_or_else(PoisonError::into_inner) = Some(url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_search_url_encodes_query() {
        let url = build_search_url("https://sourcegraph.com/", r"repo:a/b file:^src/a\+b/ x", SearchScope::Tree);
        assert_eq!(
            url,
            "https://sourcegraph.com/search?q=repo%3Aa%2Fb%20file%3A%5Esrc%2Fa%5C%2Bb%2F%20x&source=tree"
        );
    }

    #[test]
    fn test_url_submitter_remembers_last_url() {
        let submitter = UrlSubmitter::new("https://code.example.com", false);
        assert!(submitter.last_url().is_none());

        let params = NavigationParameters::new("github.com/a/b", "abc", "");
        submitter.submit(&params, "repo:github.com/a/b foo", SearchScope::Repo);

        let url = submitter.last_url().unwrap();
        assert!(url.starts_with("https://code.example.com/search?q="));
        assert!(url.ends_with("&source=repo"));
    }
}
