use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DirViewError, Result};

pub const CONFIG_ENV: &str = "DIRVIEW_CONFIG";
pub const ENDPOINT_ENV: &str = "DIRVIEW_ENDPOINT";
pub const ACCESS_TOKEN_ENV: &str = "DIRVIEW_ACCESS_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the code-search instance.
    pub endpoint: String,
    pub access_token: Option<String>,
    pub request_timeout_secs: u64,
    /// Entries kept per fetch cache (listings, commit histories).
    pub cache_capacity: usize,
    pub open_search_in_browser: bool,
    #[serde(skip)]
    pub colors: ColorConfig,
}

#[derive(Debug, Clone)]
pub struct ColorConfig {
    pub active_border: Color,
    pub inactive_border: Color,
    pub directory: Color,
    pub selected_fg: Color,
    pub selected_bg: Color,
    pub error: Color,
    pub muted: Color,
    pub commit_hash: Color,
    pub commit_author: Color,
    pub commit_date: Color,
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "https://sourcegraph.com".to_string(),
            access_token: None,
            request_timeout_secs: 30,
            cache_capacity: 64,
            open_search_in_browser: false,
            colors: ColorConfig::default(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            active_border: Color::Yellow,
            inactive_border: Color::White,
            directory: Color::Blue,
            selected_fg: Color::Black,
            selected_bg: Color::White,
            error: Color::Red,
            muted: Color::DarkGray,
            commit_hash: Color::Yellow,
            commit_author: Color::Green,
            commit_date: Color::Blue,
            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
        }
    }
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DirViewError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = serde_json::from_str(&content).map_err(|e| {
            DirViewError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    /// `path`, else `$DIRVIEW_CONFIG`, else defaults; then environment
    /// overrides.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let from_env = std::env::var(CONFIG_ENV).ok();
        let mut config = match path.or(from_env.as_deref()) {
            Some(path) => {
                log::info!("config: loading {}", path);
                Self::load_from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            self.endpoint = endpoint;
        }
        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
            if !token.is_empty() {
                self.access_token = Some(token);
            }
        }
    }
}
