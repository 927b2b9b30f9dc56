//! The search session.
//!
//! [`SearchOrchestrator`] owns everything a single search box needs: the
//! input and submission state, the recent searches, the suggestion dropdown,
//! the cached profiles and the follow state of the displayed user.
//!
//! State changes are synchronous. Methods that require remote data return
//! [`FetchTicket`]s; [`SearchOrchestrator::execute`] runs them against the
//! injected [`UserDirectory`] and applies the responses, including the checks
//! a response triggers in turn. Front ends that want to run requests
//! concurrently can call the `complete_*` methods themselves.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use github_client::{GitHubUser, UserDirectory};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::follow::{FollowAction, FollowCoordinator, FollowStatus, MutationTicket, ToggleOutcome};
use crate::notifier::Notifier;
use crate::query_cache::{FetchTicket, QueryCache, QueryError, QueryErrorKind, QueryKey, QueryKind};
use crate::recents::{PersistentRecents, RecentSearchList, RecentsStorage};
use crate::suggestions::{SuggestionCoordinator, SuggestionSettings};

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;

/// A committed, non-empty GitHub login.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Trims `raw` and rejects it when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Accepts a login picked from a list as-is. Only an empty login is
    /// rejected.
    pub fn from_selection(login: &str) -> Option<Self> {
        if login.is_empty() {
            None
        } else {
            Some(Self(login.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Coarse phase of the search box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Suggesting,
    Submitted,
}

/// State of the search box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchState {
    /// Nothing worth querying has been typed.
    Idle { input: String },
    /// The input is long enough for suggestions; no username is committed.
    Suggesting { input: String },
    /// A username has been committed and keys the profile fetch.
    Submitted { input: String, username: Username },
}

impl Default for SearchState {
    fn default() -> Self {
        SearchState::Idle {
            input: String::new(),
        }
    }
}

impl SearchState {
    pub fn input(&self) -> &str {
        match self {
            SearchState::Idle { input }
            | SearchState::Suggesting { input }
            | SearchState::Submitted { input, .. } => input,
        }
    }

    pub fn submitted_username(&self) -> Option<&Username> {
        match self {
            SearchState::Submitted { username, .. } => Some(username),
            _ => None,
        }
    }

    pub fn phase(&self) -> SearchPhase {
        match self {
            SearchState::Idle { .. } => SearchPhase::Idle,
            SearchState::Suggesting { .. } => SearchPhase::Suggesting,
            SearchState::Submitted { .. } => SearchPhase::Submitted,
        }
    }

    /// The state after the input text changed. A committed username survives
    /// typing.
    fn with_input(self, input: String, long_enough: bool) -> Self {
        match self {
            SearchState::Submitted { username, .. } => SearchState::Submitted { input, username },
            _ if long_enough => SearchState::Suggesting { input },
            _ => SearchState::Idle { input },
        }
    }
}

/// What the profile area shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProfileView<'a> {
    /// Nothing has been submitted.
    Empty,
    Loading,
    Loaded(&'a GitHubUser),
    NotFound(String),
    Failed(String),
}

/// A single search session.
pub struct SearchOrchestrator {
    directory: Arc<dyn UserDirectory>,
    notifier: Arc<dyn Notifier>,
    state: SearchState,
    recents: PersistentRecents,
    suggestions: SuggestionCoordinator,
    follow: FollowCoordinator,
    profiles: QueryCache<GitHubUser>,
}

impl SearchOrchestrator {
    /// Creates a session, loading recent searches from `storage`.
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        notifier: Arc<dyn Notifier>,
        storage: Arc<dyn RecentsStorage>,
        settings: SuggestionSettings,
    ) -> Self {
        Self {
            directory,
            notifier,
            state: SearchState::default(),
            recents: PersistentRecents::load(storage),
            suggestions: SuggestionCoordinator::new(settings),
            follow: FollowCoordinator::new(),
            profiles: QueryCache::new(),
        }
    }

    // --- Read access ---

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn input(&self) -> &str {
        self.state.input()
    }

    pub fn submitted_username(&self) -> Option<&Username> {
        self.state.submitted_username()
    }

    pub fn recents(&self) -> &RecentSearchList {
        self.recents.list()
    }

    pub fn suggestions(&self) -> &SuggestionCoordinator {
        &self.suggestions
    }

    pub fn follow(&self) -> &FollowCoordinator {
        &self.follow
    }

    /// The suggestions the dropdown shows right now.
    pub fn visible_suggestions(&self) -> &[GitHubUser] {
        self.suggestions.visible_suggestions()
    }

    /// The profile area for the submitted username.
    pub fn profile(&self) -> ProfileView<'_> {
        let Some(username) = self.state.submitted_username() else {
            return ProfileView::Empty;
        };

        let Some(state) = self.profiles.get(&QueryKey::profile(username.as_str())) else {
            return ProfileView::Loading;
        };

        if state.is_fetching() && state.data().is_none() {
            return ProfileView::Loading;
        }

        if let Some(error) = state.error() {
            return match error.kind() {
                QueryErrorKind::NotFound => ProfileView::NotFound(error.message().to_string()),
                _ => ProfileView::Failed(error.message().to_string()),
            };
        }

        match state.data() {
            Some(user) => ProfileView::Loaded(user),
            None => ProfileView::Loading,
        }
    }

    /// Follow status of the displayed profile.
    pub fn follow_status(&self) -> FollowStatus {
        self.follow.displayed_status()
    }

    /// Returns `true` when the follow toggle of the displayed profile is
    /// enabled.
    pub fn can_toggle_follow(&self) -> bool {
        self.follow
            .displayed()
            .is_some_and(|login| self.follow.can_toggle(login))
    }

    /// The earliest instant at which [`Self::poll_timers`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.suggestions.next_deadline()
    }

    // --- Input events ---

    /// Records a keystroke in the search box.
    pub fn input_changed(&mut self, text: &str, now: Instant) {
        let long_enough = self.suggestions.is_query_candidate(text);
        let state = std::mem::take(&mut self.state);
        self.state = state.with_input(text.to_string(), long_enough);
        self.suggestions.on_input(text, now);
    }

    /// The search box lost focus.
    pub fn blur(&mut self, now: Instant) {
        self.suggestions.on_blur(now);
    }

    /// The search box regained focus.
    pub fn focus(&mut self) {
        self.suggestions.on_focus();
    }

    /// Advances the debounce and blur timers to `now`.
    pub fn poll_timers(&mut self, now: Instant) -> Vec<FetchTicket> {
        self.suggestions.poll(now).into_iter().collect()
    }

    /// Submits the search form.
    ///
    /// Blank input is ignored without any state change. Otherwise the trimmed
    /// username is committed, the input is cleared and the username moves to
    /// the front of the recent searches.
    pub fn submit(&mut self) -> Vec<FetchTicket> {
        let Some(username) = Username::parse(self.state.input()) else {
            debug!("Ignoring blank submission");
            return Vec::new();
        };

        info!(username = %username, "Search submitted");
        self.recents.record(username.as_str());
        self.commit(username, String::new())
    }

    /// Picks a suggestion from the dropdown.
    ///
    /// Behaves like a submission of `login`, keeping it in the input. Picking
    /// the username that is already displayed refetches its profile instead.
    pub fn select_suggestion(&mut self, login: &str) -> Vec<FetchTicket> {
        let Some(username) = Username::from_selection(login) else {
            return Vec::new();
        };

        if self.state.submitted_username() == Some(&username) {
            debug!(username = %username, "Refetching displayed profile");
            self.suggestions.hide();
            self.state = SearchState::Submitted {
                input: login.to_string(),
                username: username.clone(),
            };
            return vec![self.profiles.begin(QueryKey::profile(username.as_str()))];
        }

        info!(username = %username, "Suggestion picked");
        self.recents.record(username.as_str());
        self.commit(username, login.to_string())
    }

    /// Picks an entry of the recent searches.
    pub fn select_recent(&mut self, login: &str) -> Vec<FetchTicket> {
        let Some(username) = Username::from_selection(login) else {
            return Vec::new();
        };

        info!(username = %username, "Recent search picked");
        self.commit(username, login.to_string())
    }

    /// Forgets every recent search.
    pub fn clear_recents(&mut self) {
        self.recents.clear();
    }

    fn commit(&mut self, username: Username, input: String) -> Vec<FetchTicket> {
        self.suggestions.hide();

        let key = QueryKey::profile(username.as_str());

        // A failed lookup is retried when the user submits it again.
        self.profiles.invalidate_failed(&key);

        self.state = SearchState::Submitted { input, username };

        let mut tickets: Vec<FetchTicket> =
            self.profiles.begin_if_needed(key).into_iter().collect();
        tickets.extend(self.sync_displayed());
        tickets
    }

    /// Points the follow state at the profile currently shown and returns the
    /// status check it needs.
    fn sync_displayed(&mut self) -> Option<FetchTicket> {
        let login = match self.profile() {
            ProfileView::Loaded(user) => Some(user.login.clone()),
            _ => None,
        };

        self.follow.set_displayed(login.as_deref());
        let login = login?;

        // A failed status check is retried whenever the profile is shown anew.
        self.follow.retry_failed_check(&login);
        self.follow.begin_check(&login)
    }

    // --- Responses ---

    /// Applies a profile response and returns the follow check it requires.
    pub fn complete_profile(
        &mut self,
        ticket: &FetchTicket,
        result: Result<GitHubUser, github_client::Error>,
    ) -> Vec<FetchTicket> {
        let applied = self.profiles.complete(ticket, result.map_err(QueryError::from));
        let current = self
            .state
            .submitted_username()
            .is_some_and(|u| u.as_str() == ticket.key().key());

        if !(applied && current) {
            debug!(key = %ticket.key(), "Profile response not displayed");
            return Vec::new();
        }

        self.sync_displayed().into_iter().collect()
    }

    /// Applies a suggestion search response.
    pub fn complete_suggestions(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<GitHubUser>, github_client::Error>,
    ) -> bool {
        self.suggestions.complete(ticket, result.map_err(QueryError::from))
    }

    /// Applies a follow status response.
    pub fn complete_follow_check(
        &mut self,
        ticket: &FetchTicket,
        result: Result<bool, github_client::Error>,
    ) -> bool {
        self.follow.complete_check(ticket, result.map_err(QueryError::from))
    }

    // --- Follow toggle ---

    /// Starts following or unfollowing the displayed profile.
    ///
    /// Returns `None` while a toggle for the same login is in flight or when
    /// no profile is displayed.
    pub fn begin_toggle_follow(&mut self) -> Option<MutationTicket> {
        let login = self.follow.displayed()?.to_string();
        self.follow.begin_toggle(&login)
    }

    /// Finishes a toggle started with [`Self::begin_toggle_follow`].
    pub fn finish_toggle_follow(
        &mut self,
        ticket: MutationTicket,
        result: Result<(), github_client::Error>,
    ) -> (ToggleOutcome, Vec<FetchTicket>) {
        let notifier = Arc::clone(&self.notifier);
        let resolution = self.follow.finish_toggle(ticket, result, notifier.as_ref());
        (resolution.outcome, resolution.refresh.into_iter().collect())
    }

    // --- Async drivers ---

    /// Runs `tickets` against the directory, applying each response and the
    /// requests it triggers, until nothing is left.
    pub async fn execute(&mut self, tickets: Vec<FetchTicket>) {
        let directory = Arc::clone(&self.directory);
        let mut queue: VecDeque<FetchTicket> = tickets.into();

        while let Some(ticket) = queue.pop_front() {
            let subject = ticket.key().key().to_string();
            match ticket.kind() {
                QueryKind::Profile => {
                    let result = directory.fetch_profile(&subject).await;
                    queue.extend(self.complete_profile(&ticket, result));
                }
                QueryKind::Suggestions => {
                    let result = directory.search_users(&subject).await;
                    self.complete_suggestions(&ticket, result);
                }
                QueryKind::FollowStatus => {
                    let result = directory.check_following(&subject).await;
                    self.complete_follow_check(&ticket, result);
                }
            }
        }
    }

    /// Advances the timers to `now` and runs any suggestion query they
    /// commit.
    pub async fn tick(&mut self, now: Instant) {
        let tickets = self.poll_timers(now);
        self.execute(tickets).await;
    }

    /// Submits the form and loads the resulting profile.
    pub async fn submit_and_load(&mut self) {
        let tickets = self.submit();
        self.execute(tickets).await;
    }

    /// Toggles the follow state of the displayed profile and refreshes the
    /// status afterwards.
    pub async fn toggle_follow(&mut self) -> ToggleOutcome {
        let Some(ticket) = self.begin_toggle_follow() else {
            return ToggleOutcome::Ignored;
        };

        let directory = Arc::clone(&self.directory);
        let result = match ticket.action() {
            FollowAction::Follow => directory.follow(ticket.login()).await,
            FollowAction::Unfollow => directory.unfollow(ticket.login()).await,
        };

        let (outcome, refresh) = self.finish_toggle_follow(ticket, result);
        self.execute(refresh).await;
        outcome
    }
}

impl fmt::Debug for SearchOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchOrchestrator")
            .field("state", &self.state)
            .field("recents", &self.recents)
            .field("suggestions", &self.suggestions)
            .field("follow", &self.follow)
            .finish()
    }
}
