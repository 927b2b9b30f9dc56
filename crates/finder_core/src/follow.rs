//! Follow state of the displayed user.
//!
//! The status of each login is a cached query. Toggling starts a follow or
//! unfollow depending on the cached status; while that mutation is in flight
//! the toggle is disabled for the login. After an unfollow every cached status
//! is invalidated, after a follow only the followed login is re-checked.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, info, warn};

use crate::notifier::Notifier;
use crate::query_cache::{FetchTicket, QueryCache, QueryError, QueryKey, QueryKind};

#[cfg(test)]
#[path = "follow_tests.rs"]
mod tests;

/// Whether the authenticated account follows a login.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowStatus {
    /// The status has not been determined yet.
    Unknown,
    Following,
    NotFollowing,
}

impl FollowStatus {
    /// Label for the toggle control.
    pub fn toggle_label(&self) -> &'static str {
        match self {
            FollowStatus::Following => "Following",
            FollowStatus::NotFollowing | FollowStatus::Unknown => "Follow User",
        }
    }
}

/// The mutation a toggle performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowAction {
    Follow,
    Unfollow,
}

impl fmt::Display for FollowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FollowAction::Follow => f.write_str("follow"),
            FollowAction::Unfollow => f.write_str("unfollow"),
        }
    }
}

/// Handle for one in-flight follow or unfollow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationTicket {
    login: String,
    action: FollowAction,
}

impl MutationTicket {
    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn action(&self) -> FollowAction {
        self.action
    }
}

/// Result of a toggle request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Nothing was sent: another mutation is pending or no user is displayed.
    Ignored,
    Followed,
    Unfollowed,
    /// The mutation failed; the status is unchanged.
    Failed(String),
}

/// The outcome of a finished mutation and the status checks it requires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToggleResolution {
    pub outcome: ToggleOutcome,
    pub refresh: Option<FetchTicket>,
}

/// Caches follow status per login and coordinates follow/unfollow.
#[derive(Debug, Default)]
pub struct FollowCoordinator {
    statuses: QueryCache<bool>,
    pending: HashSet<String>,
    displayed: Option<String>,
}

impl FollowCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the login whose profile is on screen.
    pub fn set_displayed(&mut self, login: Option<&str>) {
        let login = login.filter(|l| !l.is_empty()).map(str::to_string);
        if self.displayed != login {
            debug!(displayed = ?login, "Displayed user changed");
            self.displayed = login;
        }
    }

    pub fn displayed(&self) -> Option<&str> {
        self.displayed.as_deref()
    }

    pub fn status(&self, login: &str) -> FollowStatus {
        match self.statuses.data(&QueryKey::follow_status(login)) {
            Some(true) => FollowStatus::Following,
            Some(false) => FollowStatus::NotFollowing,
            None => FollowStatus::Unknown,
        }
    }

    /// Status of the displayed user, `Unknown` when nobody is displayed.
    pub fn displayed_status(&self) -> FollowStatus {
        self.displayed
            .as_deref()
            .map_or(FollowStatus::Unknown, |login| self.status(login))
    }

    pub fn is_pending(&self, login: &str) -> bool {
        self.pending.contains(login)
    }

    /// Returns `true` when the toggle for `login` is enabled.
    pub fn can_toggle(&self, login: &str) -> bool {
        !login.is_empty() && !self.is_pending(login)
    }

    /// Returns `true` when the status of `login` has been invalidated or never
    /// fetched.
    pub fn needs_check(&self, login: &str) -> bool {
        self.statuses.needs_fetch(&QueryKey::follow_status(login))
    }

    /// Starts a status check for `login` unless one is cached or in flight.
    pub fn begin_check(&mut self, login: &str) -> Option<FetchTicket> {
        if login.is_empty() {
            return None;
        }
        self.statuses.begin_if_needed(QueryKey::follow_status(login))
    }

    /// Marks the status of `login` for another check when the last one
    /// failed.
    pub fn retry_failed_check(&mut self, login: &str) -> bool {
        self.statuses.invalidate_failed(&QueryKey::follow_status(login))
    }

    /// Applies a status check response.
    pub fn complete_check(
        &mut self,
        ticket: &FetchTicket,
        result: Result<bool, QueryError>,
    ) -> bool {
        if let Err(e) = &result {
            warn!(login = ticket.key().key(), error = %e, "Follow status check failed");
        }
        self.statuses.complete(ticket, result)
    }

    /// Starts a follow or unfollow for `login`.
    ///
    /// Returns `None` when a mutation for `login` is already in flight. An
    /// `Unknown` status is treated as not following.
    pub fn begin_toggle(&mut self, login: &str) -> Option<MutationTicket> {
        if !self.can_toggle(login) {
            debug!(login = login, "Ignoring toggle while a request is pending");
            return None;
        }

        let action = match self.status(login) {
            FollowStatus::Following => FollowAction::Unfollow,
            FollowStatus::NotFollowing | FollowStatus::Unknown => FollowAction::Follow,
        };

        self.pending.insert(login.to_string());
        debug!(login = login, action = %action, "Toggle started");

        Some(MutationTicket {
            login: login.to_string(),
            action,
        })
    }

    /// Finishes a mutation started by [`Self::begin_toggle`].
    ///
    /// Reports the result through `notifier` and returns the status check
    /// that should run next, if any.
    pub fn finish_toggle(
        &mut self,
        ticket: MutationTicket,
        result: Result<(), github_client::Error>,
        notifier: &dyn Notifier,
    ) -> ToggleResolution {
        self.pending.remove(&ticket.login);

        match (ticket.action, result) {
            (FollowAction::Unfollow, Ok(())) => {
                self.statuses.invalidate_kind(QueryKind::FollowStatus);
                notifier.notify_success(&format!("you are no longer following {}", ticket.login));
                info!(login = ticket.login, "Unfollowed user");

                let refresh = self
                    .displayed
                    .clone()
                    .and_then(|login| self.begin_check(&login));
                ToggleResolution {
                    outcome: ToggleOutcome::Unfollowed,
                    refresh,
                }
            }
            (FollowAction::Follow, Ok(())) => {
                notifier.notify_success(&format!("you are now following {}", ticket.login));
                info!(login = ticket.login, "Followed user");

                let refresh = Some(
                    self.statuses
                        .begin(QueryKey::follow_status(ticket.login.as_str())),
                );
                ToggleResolution {
                    outcome: ToggleOutcome::Followed,
                    refresh,
                }
            }
            (action, Err(e)) => {
                let message = e.to_string();
                notifier.notify_error(&message);
                warn!(login = ticket.login, action = %action, error = %e, "Toggle failed");

                ToggleResolution {
                    outcome: ToggleOutcome::Failed(message),
                    refresh: None,
                }
            }
        }
    }
}
