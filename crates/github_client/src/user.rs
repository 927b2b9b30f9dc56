//! User domain types.
//!
//! This module contains the types representing GitHub user accounts as they are
//! returned by the users and user-search endpoints.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "user_tests.rs"]
mod tests;

/// A snapshot of a GitHub user profile.
///
/// The same record is produced by `GET /users/{username}` and by the items of
/// `GET /search/users`. Search items only carry the login, avatar and profile
/// link, so every other field is optional.
///
/// # Examples
///
/// ```rust
/// use github_client::GitHubUser;
///
/// let user = GitHubUser {
///     login: "octocat".to_string(),
///     name: Some("The Octocat".to_string()),
///     ..Default::default()
/// };
///
/// assert_eq!(user.display_name(), "The Octocat");
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct GitHubUser {
    /// The unique login handle of the user
    pub login: String,

    /// The display name chosen by the user
    #[serde(default)]
    pub name: Option<String>,

    /// URL of the avatar image
    #[serde(default)]
    pub avatar_url: String,

    /// The free-form biography
    #[serde(default)]
    pub bio: Option<String>,

    /// URL of the public profile page
    #[serde(default)]
    pub html_url: String,

    /// Number of public repositories, absent in search results
    #[serde(default)]
    pub public_repos: Option<u32>,

    /// Number of followers, absent in search results
    #[serde(default)]
    pub followers: Option<u32>,

    /// Number of accounts this user follows, absent in search results
    #[serde(default)]
    pub following: Option<u32>,
}

impl GitHubUser {
    /// Returns the display name, falling back to the login when the user has
    /// not set one.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.login,
        }
    }
}

/// Response body of the user search endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SearchUsersResponse {
    /// Total number of matches known to GitHub
    #[serde(default)]
    pub total_count: u64,

    /// The matching users, best match first
    #[serde(default)]
    pub items: Vec<GitHubUser>,
}
