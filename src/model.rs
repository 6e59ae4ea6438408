use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub name: String,
}

/// Contents of one directory at one commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryListing {
    pub directories: Vec<TreeEntry>,
    pub files: Vec<TreeEntry>,
}

impl DirectoryListing {
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.directories.len() + self.files.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub person: Person,
    /// RFC 3339 timestamp as sent by the backend.
    pub date: String,
}

/// One entry of a path's commit log, passed through from the query service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitLogEntry {
    pub oid: String,
    #[serde(rename = "abbreviatedOID")]
    pub abbreviated_oid: String,
    pub subject: String,
    #[serde(default)]
    pub message: Option<String>,
    pub author: Signature,
}

impl CommitLogEntry {
    pub fn authored_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.author.date)
            .ok()
            .map(|date| date.with_timezone(&Utc))
    }

    /// Author date relative to `now`, or the raw date if it does not parse.
    pub fn relative_date(&self, now: DateTime<Utc>) -> String {
        match self.authored_at() {
            Some(date) => format_relative_time(now.timestamp() - date.timestamp()),
            None => self.author.date.clone(),
        }
    }
}

pub fn format_relative_time(seconds_ago: i64) -> String {
    let plural = |n: i64| if n == 1 { "" } else { "s" };

    if seconds_ago < 60 {
        "just now".to_string()
    } else if seconds_ago < 3600 {
        let mins = seconds_ago / 60;
        format!("{} minute{} ago", mins, plural(mins))
    } else if seconds_ago < 86400 {
        let hours = seconds_ago / 3600;
        format!("{} hour{} ago", hours, plural(hours))
    } else if seconds_ago < 2_592_000 {
        let days = seconds_ago / 86400;
        format!("{} day{} ago", days, plural(days))
    } else if seconds_ago < 31_536_000 {
        let months = seconds_ago / 2_592_000;
        format!("{} month{} ago", months, plural(months))
    } else {
        let years = seconds_ago / 31_536_000;
        format!("{} year{} ago", years, plural(years))
    }
}

/// Progress of one asynchronously fetched field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchState<T> {
    #[default]
    Unloaded,
    Loading,
    Loaded(T),
    Failed(FetchError),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    /// Neither unloaded nor loading.
    pub fn is_settled(&self) -> bool {
        matches!(self, FetchState::Loaded(_) | FetchState::Failed(_))
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            FetchState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            FetchState::Failed(error) => Some(error),
            _ => None,
        }
    }
}

impl<T> From<Result<T, FetchError>> for FetchState<T> {
    fn from(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(value) => FetchState::Loaded(value),
            Err(error) => FetchState::Failed(error),
        }
    }
}

/// Everything the presentation layer needs to draw the directory page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub listing: FetchState<DirectoryListing>,
    pub commits: FetchState<Vec<CommitLogEntry>>,
    /// Owned by the user; fetch results never touch it.
    pub search_query: String,
}

impl ViewState {
    pub fn is_settled(&self) -> bool {
        !self.listing.is_loading() && !self.commits.is_loading()
    }
}
