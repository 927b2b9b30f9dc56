//! Wiring of a search session from the configuration: credentials, API
//! client and recents storage.

use std::sync::Arc;

use finder_core::{JsonFileStorage, Notifier, RecentsStorage, SearchOrchestrator};
use github_client::{create_anonymous_client, create_token_client, GitHubClient, UserDirectory};
use keyring::Entry;
use tracing::{debug, info, instrument};

use crate::{
    config::{ApiConfig, AppConfig},
    errors::Error,
};

pub const KEY_RING_SERVICE_NAME: &str = "github_finder";
pub const KEY_RING_USER_TOKEN: &str = "github_token";

#[cfg(test)]
#[path = "setup_tests.rs"]
mod tests;

/// Looks up the GitHub token in the configured environment variable, then in
/// the system keyring.
pub fn resolve_token(token_env: &str) -> Option<String> {
    resolve_token_with(token_env, |name| std::env::var(name).ok(), keyring_token)
}

/// Token lookup with injectable sources. Blank values count as absent.
pub fn resolve_token_with<E, K>(token_env: &str, env: E, keyring: K) -> Option<String>
where
    E: Fn(&str) -> Option<String>,
    K: Fn() -> Option<String>,
{
    let non_blank = |value: String| {
        let trimmed = value.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    };

    if let Some(token) = env(token_env).and_then(non_blank) {
        debug!(source = token_env, "Using GitHub token from the environment");
        return Some(token);
    }

    if let Some(token) = keyring().and_then(non_blank) {
        debug!("Using GitHub token from the keyring");
        return Some(token);
    }

    None
}

fn keyring_token() -> Option<String> {
    let entry = match Entry::new(KEY_RING_SERVICE_NAME, KEY_RING_USER_TOKEN) {
        Ok(entry) => entry,
        Err(e) => {
            debug!(error = %e, "Failed to open the keyring entry");
            return None;
        }
    };

    match entry.get_password() {
        Ok(token) => Some(token),
        Err(e) => {
            debug!(error = %e, "No GitHub token in the keyring");
            None
        }
    }
}

/// Creates the GitHub API client, authenticated when `token` is present.
#[instrument(skip(token))]
pub fn build_directory(
    api: &ApiConfig,
    token: Option<String>,
) -> Result<Arc<dyn UserDirectory>, Error> {
    let base_uri = api.base_url.as_deref();

    let octocrab = match token {
        Some(token) => create_token_client(&token, base_uri)?,
        None => {
            info!("Running without a GitHub token, follow actions will fail");
            create_anonymous_client(base_uri)?
        }
    };

    let client = match base_uri {
        Some(uri) => GitHubClient::with_base_uri(octocrab, uri)?,
        None => GitHubClient::new(octocrab),
    };

    Ok(Arc::new(client))
}

/// Creates the recents storage under the configured directory.
pub fn build_storage(config: &AppConfig) -> Arc<dyn RecentsStorage> {
    Arc::new(JsonFileStorage::new(config.storage.recents_dir.clone()))
}

/// Creates a search session for the configuration.
pub fn build_orchestrator(
    config: &AppConfig,
    notifier: Arc<dyn Notifier>,
) -> Result<SearchOrchestrator, Error> {
    let token = resolve_token(&config.api.token_env);
    let directory = build_directory(&config.api, token)?;

    Ok(SearchOrchestrator::new(
        directory,
        notifier,
        build_storage(config),
        config.search.to_settings(),
    ))
}
