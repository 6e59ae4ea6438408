use thiserror::Error;

pub type Result<T> = std::result::Result<T, DirViewError>;

/// Longest error excerpt the page shows for a failed fetch.
pub const ERROR_EXCERPT_CHARS: usize = 100;

#[derive(Debug, Error)]
pub enum DirViewError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a single listing or commit-history fetch.
///
/// Cloneable so one failed request can be handed to every caller that was
/// sharing it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("{0}")]
    EntityMissing(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("{0}")]
    Backend(String),
}

impl FetchError {
    /// The first [`ERROR_EXCERPT_CHARS`] characters of the message.
    pub fn excerpt(&self) -> String {
        self.to_string().chars().take(ERROR_EXCERPT_CHARS).collect()
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            FetchError::MalformedResponse(error.to_string())
        } else {
            FetchError::Network(error.to_string())
        }
    }
}
