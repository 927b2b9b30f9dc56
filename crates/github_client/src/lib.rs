//! Crate for interacting with the GitHub REST API.
//!
//! This crate provides a client for the handful of user-centric endpoints the
//! finder needs: fetching a profile, searching users by partial name, and
//! checking or changing whether the authenticated account follows someone.
//!
//! The operations are exposed through the [`UserDirectory`] trait so callers can
//! substitute their own implementation in tests.

use async_trait::async_trait;
use http::StatusCode;
use octocrab::{Octocrab, Result as OctocrabResult};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

pub mod errors;
pub use errors::Error;

pub mod user;
pub use user::{GitHubUser, SearchUsersResponse};

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// The public GitHub REST API endpoint.
pub const DEFAULT_BASE_URI: &str = "https://api.github.com";

/// The maximum number of users a suggestion search returns.
pub const SEARCH_RESULT_LIMIT: usize = 5;

/// Operations on GitHub user accounts.
///
/// Every method is a single remote call. Implementations never retry.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetches the profile of a single user.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when the account does not exist and
    /// `Error::Network` when the request could not be completed.
    async fn fetch_profile(&self, username: &str) -> Result<GitHubUser, Error>;

    /// Searches users whose login or name matches a partial query.
    ///
    /// Returns at most [`SEARCH_RESULT_LIMIT`] users, ordered by the relevance
    /// GitHub assigns to them.
    ///
    /// # Errors
    ///
    /// Returns `Error::Network` when the request could not be completed.
    async fn search_users(&self, query: &str) -> Result<Vec<GitHubUser>, Error>;

    /// Checks whether the authenticated account follows `username`.
    ///
    /// # Errors
    ///
    /// Returns `Error::AuthError` when the credential is missing or rejected and
    /// `Error::Network` when the request could not be completed.
    async fn check_following(&self, username: &str) -> Result<bool, Error>;

    /// Makes the authenticated account follow `username`.
    ///
    /// # Errors
    ///
    /// Returns `Error::AuthError` when the credential is missing or rejected and
    /// `Error::Network` when the request could not be completed.
    async fn follow(&self, username: &str) -> Result<(), Error>;

    /// Makes the authenticated account stop following `username`.
    ///
    /// # Errors
    ///
    /// Returns `Error::AuthError` when the credential is missing or rejected and
    /// `Error::Network` when the request could not be completed.
    async fn unfollow(&self, username: &str) -> Result<(), Error>;
}

/// Query parameters of the user search endpoint.
#[derive(Debug, Serialize)]
struct SearchUsersParams<'a> {
    q: &'a str,
    per_page: usize,
}

/// A client for the GitHub user endpoints.
#[derive(Debug)]
pub struct GitHubClient {
    client: Octocrab,
    base_uri: Url,
}

impl GitHubClient {
    /// Creates a new `GitHubClient` talking to the public GitHub API.
    ///
    /// # Arguments
    ///
    /// * `client` - An `Octocrab` instance, usually built by [`create_token_client`]
    ///   or [`create_anonymous_client`].
    pub fn new(client: Octocrab) -> Self {
        Self {
            client,
            base_uri: Url::parse(DEFAULT_BASE_URI).expect("Valid GitHub API URL"),
        }
    }

    /// Creates a new `GitHubClient` for a custom API endpoint, such as a GitHub
    /// Enterprise server or a local mock server.
    ///
    /// The `Octocrab` instance should have been built with the same base URI.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRequest` if `base_uri` is not an absolute URL.
    pub fn with_base_uri(client: Octocrab, base_uri: &str) -> Result<Self, Error> {
        let base_uri = Url::parse(base_uri).map_err(|e| {
            error!(base_uri = base_uri, error = %e, "Failed to parse GitHub API base URI");
            Error::InvalidRequest(format!("Invalid base URI '{}': {}", base_uri, e))
        })?;

        if base_uri.cannot_be_a_base() {
            return Err(Error::InvalidRequest(format!(
                "Base URI '{}' cannot be used as a base",
                base_uri
            )));
        }

        Ok(Self { client, base_uri })
    }

    /// Builds an absolute endpoint URL, percent-encoding each path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<String, Error> {
        let mut url = self.base_uri.clone();
        url.path_segments_mut()
            .map_err(|_| {
                Error::InvalidRequest(format!("Base URI '{}' cannot be a base", self.base_uri))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url.to_string())
    }
}

#[async_trait]
impl UserDirectory for GitHubClient {
    #[instrument(skip(self), fields(username = %username))]
    async fn fetch_profile(&self, username: &str) -> Result<GitHubUser, Error> {
        let url = self.endpoint(&["users", username])?;

        debug!("Making API call to: {}", url);
        let result: OctocrabResult<GitHubUser> = self.client.get(url, None::<&()>).await;

        match result {
            Ok(user) => {
                info!(login = user.login, "Fetched user profile");
                Ok(user)
            }
            Err(e) => Err(map_octocrab_error("Failed to fetch user profile", username, e)),
        }
    }

    #[instrument(skip(self), fields(query = %query))]
    async fn search_users(&self, query: &str) -> Result<Vec<GitHubUser>, Error> {
        let url = self.endpoint(&["search", "users"])?;
        let params = SearchUsersParams {
            q: query,
            per_page: SEARCH_RESULT_LIMIT,
        };

        let result: OctocrabResult<SearchUsersResponse> =
            self.client.get(url, Some(&params)).await;

        match result {
            Ok(response) => {
                let mut users = response.items;
                users.truncate(SEARCH_RESULT_LIMIT);

                debug!(
                    count = users.len(),
                    total_count = response.total_count,
                    "Search returned users"
                );
                Ok(users)
            }
            Err(e) => Err(map_octocrab_error("Failed to search users", query, e)),
        }
    }

    #[instrument(skip(self), fields(username = %username))]
    async fn check_following(&self, username: &str) -> Result<bool, Error> {
        let url = self.endpoint(&["user", "following", username])?;

        let response = self
            .client
            ._get(url)
            .await
            .map_err(|e| map_octocrab_error("Failed to check follow status", username, e))?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(map_status_error(status, username)),
        }
    }

    #[instrument(skip(self), fields(username = %username))]
    async fn follow(&self, username: &str) -> Result<(), Error> {
        let url = self.endpoint(&["user", "following", username])?;

        let response = self
            .client
            ._put(url, None::<&()>)
            .await
            .map_err(|e| map_octocrab_error("Failed to follow user", username, e))?;

        let status = response.status();
        if status.is_success() {
            info!(username = username, "Now following user");
            Ok(())
        } else {
            Err(map_status_error(status, username))
        }
    }

    #[instrument(skip(self), fields(username = %username))]
    async fn unfollow(&self, username: &str) -> Result<(), Error> {
        let url = self.endpoint(&["user", "following", username])?;

        let response = self
            .client
            ._delete(url, None::<&()>)
            .await
            .map_err(|e| map_octocrab_error("Failed to unfollow user", username, e))?;

        let status = response.status();
        if status.is_success() {
            info!(username = username, "No longer following user");
            Ok(())
        } else {
            Err(map_status_error(status, username))
        }
    }
}

/// Creates an `Octocrab` client authenticated with a personal access token.
///
/// # Arguments
///
/// * `token` - The personal access token. It needs the `user:follow` scope for
///   the follow operations.
/// * `base_uri` - Optional API endpoint override.
///
/// # Errors
///
/// Returns `Error::AuthError` if the client cannot be built and
/// `Error::InvalidRequest` if the base URI is malformed.
///
/// # Example
///
/// ```rust,no_run
/// use github_client::{create_token_client, GitHubClient, UserDirectory};
///
/// #[tokio::main]
/// async fn main() -> Result<(), github_client::Error> {
///     let octocrab = create_token_client("ghp_example", None)?;
///     let client = GitHubClient::new(octocrab);
///
///     let user = client.fetch_profile("octocat").await?;
///     println!("{}", user.display_name());
///     Ok(())
/// }
/// ```
#[instrument(skip(token))]
pub fn create_token_client(token: &str, base_uri: Option<&str>) -> Result<Octocrab, Error> {
    let mut builder = Octocrab::builder().personal_token(token.to_string());

    if let Some(uri) = base_uri {
        builder = builder.base_uri(uri).map_err(|e| {
            error!(base_uri = uri, error = %e, "Failed to apply GitHub API base URI");
            Error::InvalidRequest(format!("Invalid base URI '{}': {}", uri, e))
        })?;
    }

    builder.build().map_err(|e| {
        error!(error = ?e, "Failed to build Octocrab client with personal token");
        Error::AuthError("Failed to build a client for the personal token.".to_string())
    })
}

/// Creates an unauthenticated `Octocrab` client.
///
/// Profile lookups and searches work without a token. Follow operations will
/// fail with `Error::AuthError`.
///
/// # Errors
///
/// Returns `Error::AuthError` if the client cannot be built and
/// `Error::InvalidRequest` if the base URI is malformed.
#[instrument]
pub fn create_anonymous_client(base_uri: Option<&str>) -> Result<Octocrab, Error> {
    let mut builder = Octocrab::builder();

    if let Some(uri) = base_uri {
        builder = builder.base_uri(uri).map_err(|e| {
            error!(base_uri = uri, error = %e, "Failed to apply GitHub API base URI");
            Error::InvalidRequest(format!("Invalid base URI '{}': {}", uri, e))
        })?;
    }

    warn!("No GitHub token available, follow operations will be rejected");

    builder.build().map_err(|e| {
        error!(error = ?e, "Failed to build anonymous Octocrab client");
        Error::AuthError("Failed to build an anonymous client.".to_string())
    })
}

/// Maps an HTTP status that was not expected for a call to a client error.
fn map_status_error(status: StatusCode, subject: &str) -> Error {
    let message = status
        .canonical_reason()
        .unwrap_or("Unexpected status")
        .to_string();

    error!(
        status = status.as_u16(),
        subject = subject,
        "Received an unexpected status from GitHub"
    );

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::AuthError(message),
        StatusCode::NOT_FOUND => Error::NotFound(subject.to_string()),
        _ => Error::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Logs an octocrab failure and converts it to a client error.
fn map_octocrab_error(message: &str, subject: &str, e: octocrab::Error) -> Error {
    match e {
        octocrab::Error::GitHub { source, backtrace } => {
            error!(
                error_message = source.message,
                status = source.status_code.as_u16(),
                backtrace = backtrace.to_string(),
                "{}. Received an error from GitHub",
                message
            );

            match source.status_code {
                StatusCode::NOT_FOUND => Error::NotFound(subject.to_string()),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    Error::AuthError(source.message)
                }
                status => Error::Api {
                    status: status.as_u16(),
                    message: source.message,
                },
            }
        }
        octocrab::Error::Serde { source, backtrace } => {
            error!(
                error_message = source.to_string(),
                backtrace = backtrace.to_string(),
                "{}. Failed to parse the response.",
                message
            );
            Error::Deserialization(source)
        }
        octocrab::Error::Json { source, backtrace } => {
            error!(
                error_message = source.to_string(),
                backtrace = backtrace.to_string(),
                "{}. The response did not match the expected shape.",
                message
            );
            Error::InvalidResponse
        }
        octocrab::Error::UriParse { source, backtrace } => {
            error!(
                error_message = source.to_string(),
                backtrace = backtrace.to_string(),
                "{}. Failed to parse URI.",
                message
            );
            Error::InvalidRequest(source.to_string())
        }
        _ => {
            error!(error_message = e.to_string(), "{}", message);
            Error::Network(e.to_string())
        }
    }
}
