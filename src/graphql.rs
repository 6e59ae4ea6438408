//! Query service: the two backend reads the directory page needs.
//!
//! [`HttpQueryService`] talks to a Sourcegraph-style GraphQL endpoint at
//! `<endpoint>/.api/graphql`. Response envelopes are decoded by the pure
//! `decode_*` functions so the error mapping can be tested without a server.

use futures_util::future::BoxFuture;
use reqwest::header::AUTHORIZATION;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Config;
use crate::error::{DirViewError, FetchError};
use crate::model::{CommitLogEntry, DirectoryListing};
use crate::navigation::FetchKey;

/// Backend reads keyed by repository, commit, and path. Both are idempotent
/// and safe to memoize by their key.
pub trait QueryService: Send + Sync {
    fn fetch_tree(&self, key: &FetchKey) -> BoxFuture<'static, Result<DirectoryListing, FetchError>>;

    fn fetch_commit_history(
        &self,
        key: &FetchKey,
    ) -> BoxFuture<'static, Result<Vec<CommitLogEntry>, FetchError>>;
}

const TREE_QUERY: &str = r#"
query Tree($repoPath: String!, $commitID: String!, $filePath: String!) {
    repository(uri: $repoPath) {
        commit(rev: $commitID) {
            tree(path: $filePath) {
                directories {
                    name
                }
                files {
                    name
                }
            }
        }
    }
}
"#;

const TREE_COMMITS_QUERY: &str = r#"
query TreeCommits($repoPath: String!, $commitID: String!, $filePath: String!) {
    repository(uri: $repoPath) {
        commit(rev: $commitID) {
            file(path: $filePath) {
                commits {
                    ...GitCommitFields
                }
            }
        }
    }
}

fragment GitCommitFields on GitCommit {
    oid
    abbreviatedOID
    subject
    message
    author {
        person {
            name
            email
        }
        date
    }
}
"#;

#[derive(Debug, Serialize)]
struct Variables<'a> {
    #[serde(rename = "repoPath")]
    repo_path: &'a str,
    #[serde(rename = "commitID")]
    commit_id: &'a str,
    #[serde(rename = "filePath")]
    file_path: &'a str,
}

impl<'a> From<&'a FetchKey> for Variables<'a> {
    fn from(key: &'a FetchKey) -> Self {
        Self {
            repo_path: &key.repo_path,
            commit_id: &key.commit_id,
            file_path: &key.file_path,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryData<C> {
    repository: Option<CommitHolder<C>>,
}

#[derive(Debug, Deserialize)]
struct CommitHolder<C> {
    commit: Option<C>,
}

#[derive(Debug, Deserialize)]
pub struct TreeCommit {
    tree: Option<DirectoryListing>,
}

#[derive(Debug, Deserialize)]
pub struct FileCommit {
    file: Option<FileCommits>,
}

#[derive(Debug, Deserialize)]
struct FileCommits {
    commits: Option<Vec<CommitLogEntry>>,
}

fn aggregate_errors(errors: &[GraphQLError]) -> FetchError {
    let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
    FetchError::Backend(messages.join("\n"))
}

fn unwrap_commit<C>(response: GraphQLResponse<RepositoryData<C>>, key: &FetchKey) -> Result<C, FetchError> {
    if !response.errors.is_empty() {
        return Err(aggregate_errors(&response.errors));
    }
    let data = response
        .data
        .ok_or_else(|| FetchError::MalformedResponse("response has neither data nor errors".to_string()))?;
    let repository = data
        .repository
        .ok_or_else(|| FetchError::EntityMissing(format!("Repository not found: {}", key.repo_path)))?;
    repository
        .commit
        .ok_or_else(|| FetchError::EntityMissing(format!("Revision not found: {}", key.commit_id)))
}

pub fn decode_tree(
    response: GraphQLResponse<RepositoryData<TreeCommit>>,
    key: &FetchKey,
) -> Result<DirectoryListing, FetchError> {
    unwrap_commit(response, key)?
        .tree
        .ok_or_else(|| FetchError::EntityMissing(format!("Directory not found: {}", key.file_path)))
}

pub fn decode_commits(
    response: GraphQLResponse<RepositoryData<FileCommit>>,
    key: &FetchKey,
) -> Result<Vec<CommitLogEntry>, FetchError> {
    unwrap_commit(response, key)?
        .file
        .and_then(|file| file.commits)
        .ok_or_else(|| FetchError::EntityMissing(format!("Path not found: {}", key.file_path)))
}

pub fn parse_response<T: DeserializeOwned>(body: &str) -> Result<GraphQLResponse<T>, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::MalformedResponse(e.to_string()))
}

#[derive(Clone)]
pub struct HttpQueryService {
    client: reqwest::Client,
    graphql_url: Url,
    access_token: Option<String>,
}

impl HttpQueryService {
    pub fn new(config: &Config) -> Result<Self, DirViewError> {
        let mut base = Url::parse(&config.endpoint)
            .map_err(|e| DirViewError::Config(format!("Invalid endpoint {}: {}", config.endpoint, e)))?;
        // Keep any path prefix of the endpoint when joining.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let graphql_url = base
            .join(".api/graphql")
            .map_err(|e| DirViewError::Config(format!("Invalid endpoint {}: {}", config.endpoint, e)))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("dirview/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DirViewError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            graphql_url,
            access_token: config.access_token.clone(),
        })
    }

    pub fn graphql_url(&self) -> &Url {
        &self.graphql_url
    }

    fn post<T>(
        &self,
        name: &'static str,
        query: &'static str,
        key: &FetchKey,
    ) -> BoxFuture<'static, Result<GraphQLResponse<T>, FetchError>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let mut url = self.graphql_url.clone();
        url.set_query(Some(name));

        let body = serde_json::json!({
            "query": query,
            "variables": Variables::from(key),
        });
        let mut request = self.client.post(url).json(&body);
        if let Some(token) = &self.access_token {
            request = request.header(AUTHORIZATION, format!("token {}", token));
        }

        Box::pin(async move {
            log::debug!("📤 graphql: {} request", name);
            let response = request.send().await?;
            let status = response.status();
            let text = response.text().await?;
            if !status.is_success() {
                log::warn!("graphql: {} failed with HTTP {}", name, status);
                let detail: String = text.chars().take(200).collect();
                return Err(FetchError::Network(format!("HTTP {}: {}", status, detail.trim())));
            }
            parse_response(&text)
        })
    }
}

impl QueryService for HttpQueryService {
    fn fetch_tree(&self, key: &FetchKey) -> BoxFuture<'static, Result<DirectoryListing, FetchError>> {
        let request = self.post::<RepositoryData<TreeCommit>>("Tree", TREE_QUERY, key);
        let key = key.clone();
        Box::pin(async move { decode_tree(request.await?, &key) })
    }

    fn fetch_commit_history(
        &self,
        key: &FetchKey,
    ) -> BoxFuture<'static, Result<Vec<CommitLogEntry>, FetchError>> {
        let request = self.post::<RepositoryData<FileCommit>>("TreeCommits", TREE_COMMITS_QUERY, key);
        let key = key.clone();
        Box::pin(async move { decode_commits(request.await?, &key) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn key() -> FetchKey {
        FetchKey {
            repo_path: "github.com/gorilla/mux".to_string(),
            commit_id: "abc123".to_string(),
            file_path: "internal".to_string(),
        }
    }

    #[test]
    fn test_decode_tree() {
        let body = r#"{"data": {"repository": {"commit": {"tree": {
            "directories": [{"name": "routes"}],
            "files": [{"name": "mux.go"}, {"name": "doc.go"}]
        }}}}}"#;
        let listing = decode_tree(parse_response(body).unwrap(), &key()).unwrap();
        assert_eq!(listing.directories.len(), 1);
        assert_eq!(listing.files[1].name, "doc.go");
    }

    #[test]
    fn test_missing_repository_is_entity_missing() {
        let body = r#"{"data": {"repository": null}}"#;
        let result = decode_tree(parse_response(body).unwrap(), &key());
        assert_matches!(result, Err(FetchError::EntityMissing(message)) if message.contains("github.com/gorilla/mux"));
    }

    #[test]
    fn test_missing_commit_and_tree() {
        let no_commit = r#"{"data": {"repository": {"commit": null}}}"#;
        assert_matches!(
            decode_tree(parse_response(no_commit).unwrap(), &key()),
            Err(FetchError::EntityMissing(message)) if message.contains("abc123")
        );

        let no_tree = r#"{"data": {"repository": {"commit": {"tree": null}}}}"#;
        assert_matches!(
            decode_tree(parse_response(no_tree).unwrap(), &key()),
            Err(FetchError::EntityMissing(message)) if message.contains("internal")
        );
    }

    #[test]
    fn test_graphql_errors_are_aggregated() {
        let body = r#"{"data": null, "errors": [{"message": "first"}, {"message": "second"}]}"#;
        let result = decode_commits(parse_response(body).unwrap(), &key());
        assert_eq!(result, Err(FetchError::Backend("first\nsecond".to_string())));
    }

    #[test]
    fn test_empty_envelope_is_malformed() {
        let body = r#"{"data": null}"#;
        assert_matches!(
            decode_tree(parse_response(body).unwrap(), &key()),
            Err(FetchError::MalformedResponse(_))
        );
    }

    #[test]
    fn test_unparseable_body_is_malformed() {
        let result = parse_response::<RepositoryData<TreeCommit>>("<html>bad gateway</html>");
        assert_matches!(result, Err(FetchError::MalformedResponse(_)));
    }

    #[test]
    fn test_decode_commits() {
        let body = r#"{"data": {"repository": {"commit": {"file": {"commits": [{
            "oid": "a1b2c3d4", "abbreviatedOID": "a1b2c3d", "subject": "Add routes",
            "author": {"person": {"name": "Dev", "email": "dev@example.com"}, "date": "2023-01-01T00:00:00Z"}
        }]}}}}}"#;
        let commits = decode_commits(parse_response(body).unwrap(), &key()).unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].subject, "Add routes");
    }

    #[test]
    fn test_variables_use_backend_names() {
        let key = key();
        let json = serde_json::to_value(Variables::from(&key)).unwrap();
        assert_eq!(json["repoPath"], "github.com/gorilla/mux");
        assert_eq!(json["commitID"], "abc123");
        assert_eq!(json["filePath"], "internal");
    }

    #[test]
    fn test_graphql_url_is_derived_from_endpoint() {
        let config = Config {
            endpoint: "https://code.example.com/".to_string(),
            ..Config::default()
        };
        let service = HttpQueryService::new(&config).unwrap();
        assert_eq!(service.graphql_url().as_str(), "https://code.example.com/.api/graphql");

        for endpoint in ["https://code.example.com/sg", "https://code.example.com/sg/"] {
            let config = Config {
                endpoint: endpoint.to_string(),
                ..Config::default()
            };
            let service = HttpQueryService::new(&config).unwrap();
            assert_eq!(service.graphql_url().as_str(), "https://code.example.com/sg/.api/graphql");
        }
    }

    #[test]
    fn test_invalid_endpoint_is_config_error() {
        let config = Config {
            endpoint: "not a url".to_string(),
            ..Config::default()
        };
        assert_matches!(HttpQueryService::new(&config).err(), Some(DirViewError::Config(_)));
    }
}
