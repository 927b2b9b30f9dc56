//! Configuration for the GitHub finder CLI.
//!
//! The configuration is stored in TOML format and loaded from an explicit
//! path or from `github_finder.toml` in the current directory. Every section
//! and field is optional; a missing default file yields the defaults.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use finder_core::SuggestionSettings;
use serde::Deserialize;
use tracing::debug;

use crate::errors::Error;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "github_finder.toml";

/// Default environment variable holding the GitHub token
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Default directory for recent searches
pub const DEFAULT_RECENTS_DIR: &str = ".github_finder";

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Main configuration structure for the GitHub finder CLI.
///
/// # Example TOML Configuration
///
/// ```toml
/// [api]
/// base_url = "https://ghe.example.com/api/v3"
/// token_env = "GITHUB_TOKEN"
///
/// [search]
/// debounce_ms = 300
/// blur_grace_ms = 100
/// min_query_chars = 2
/// suggestion_limit = 5
///
/// [storage]
/// recents_dir = ".github_finder"
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Loads configuration from a TOML file at the specified path.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The specified file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML or does not match the schema
    /// - A value is out of range (see [`AppConfig::validate`])
    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!("Loading configuration from {:?}", path);

        if !path.exists() {
            return Err(Error::Config(format!(
                "Configuration file not found: {:?}",
                path
            )));
        }

        let content = fs::read_to_string(path).map_err(Error::LoadFile)?;
        let config: AppConfig = toml::from_str(&content).map_err(Error::ParseTomlFile)?;
        config.validate()?;

        Ok(config)
    }

    /// Loads the configuration for a CLI run.
    ///
    /// An explicitly requested file must exist. Without one, the default file
    /// is used when present and the built-in defaults otherwise.
    pub fn load_or_default(config_path: Option<&str>) -> Result<Self, Error> {
        let path = get_config_path(config_path);
        if config_path.is_none() && !path.exists() {
            debug!("No configuration file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        Self::load(&path)
    }

    /// Checks that the search settings are usable.
    pub fn validate(&self) -> Result<(), Error> {
        if self.search.min_query_chars == 0 {
            return Err(Error::Config(
                "search.min_query_chars must be at least 1".to_string(),
            ));
        }

        if self.search.suggestion_limit == 0
            || self.search.suggestion_limit > github_client::SEARCH_RESULT_LIMIT
        {
            return Err(Error::Config(format!(
                "search.suggestion_limit must be between 1 and {}",
                github_client::SEARCH_RESULT_LIMIT
            )));
        }

        Ok(())
    }
}

/// Connection settings for the GitHub API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    /// API root, for GitHub Enterprise. Defaults to the public API.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Environment variable that holds the access token.
    #[serde(default = "ApiConfig::default_token_env")]
    pub token_env: String,
}

impl ApiConfig {
    fn default_token_env() -> String {
        DEFAULT_TOKEN_ENV.to_string()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token_env: Self::default_token_env(),
        }
    }
}

/// Timing and size of the suggestion dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "SearchConfig::default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "SearchConfig::default_blur_grace_ms")]
    pub blur_grace_ms: u64,

    #[serde(default = "SearchConfig::default_min_query_chars")]
    pub min_query_chars: usize,

    #[serde(default = "SearchConfig::default_suggestion_limit")]
    pub suggestion_limit: usize,
}

impl SearchConfig {
    fn default_debounce_ms() -> u64 {
        300
    }

    fn default_blur_grace_ms() -> u64 {
        100
    }

    fn default_min_query_chars() -> usize {
        2
    }

    fn default_suggestion_limit() -> usize {
        github_client::SEARCH_RESULT_LIMIT
    }

    /// Converts the configured values into coordinator settings.
    pub fn to_settings(&self) -> SuggestionSettings {
        SuggestionSettings {
            debounce: Duration::from_millis(self.debounce_ms),
            blur_grace: Duration::from_millis(self.blur_grace_ms),
            min_query_chars: self.min_query_chars,
            limit: self.suggestion_limit,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: Self::default_debounce_ms(),
            blur_grace_ms: Self::default_blur_grace_ms(),
            min_query_chars: Self::default_min_query_chars(),
            suggestion_limit: Self::default_suggestion_limit(),
        }
    }
}

/// Where recent searches are kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "StorageConfig::default_recents_dir")]
    pub recents_dir: PathBuf,
}

impl StorageConfig {
    fn default_recents_dir() -> PathBuf {
        PathBuf::from(DEFAULT_RECENTS_DIR)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            recents_dir: Self::default_recents_dir(),
        }
    }
}

/// Resolves the path to the configuration file.
///
/// - If `config_path` is `Some(path)`, returns that path as a `PathBuf`
/// - If `config_path` is `None`, returns `./github_finder.toml` in the current directory
pub fn get_config_path(config_path: Option<&str>) -> PathBuf {
    if let Some(path) = config_path {
        PathBuf::from(path)
    } else {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        current_dir.join(DEFAULT_CONFIG_FILENAME)
    }
}
