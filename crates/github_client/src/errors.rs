//! Error types for GitHub client operations.
//!
//! This module defines the errors that can occur when talking to the GitHub API
//! through the github_client crate. The variants line up with the failure
//! classes the finder reacts to: a missing account, a rejected credential, and
//! a transport failure.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during GitHub client operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use github_client::{Error, UserDirectory};
///
/// match client.fetch_profile("octocat").await {
///     Ok(user) => println!("Found {}", user.login),
///     Err(Error::NotFound(login)) => eprintln!("No account named {}", login),
///     Err(err) => eprintln!("Lookup failed: {}", err),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// GitHub answered with a status the client does not expect for the call.
    #[error("GitHub API request failed with status {status}: {message}")]
    Api {
        /// The HTTP status code
        status: u16,
        /// The message returned by GitHub, if any
        message: String,
    },

    /// The credential was missing, invalid, or lacks the required scope.
    ///
    /// Returned for 401 and 403 responses and when a client cannot be built
    /// from the provided token.
    #[error("Failed to authenticate with GitHub: {0}")]
    AuthError(String),

    /// The response body could not be parsed into the expected record.
    #[error("Failed to deserialize GitHub response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The request could not be built, usually because of a malformed base URI.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The response did not have the expected shape.
    #[error("Invalid response format")]
    InvalidResponse,

    /// The requested account does not exist.
    #[error("User not found: {0}")]
    NotFound(String),

    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(String),
}
