//! Autocompletion suggestions for the search input.
//!
//! Keystrokes are debounced; once the input has been quiet for the debounce
//! window and is long enough, it becomes the active suggestion query. Results
//! are cached per query text, so returning to an earlier text reuses its
//! results and a late response for an abandoned text is stored but never
//! shown. A text whose search failed is searched again when it is committed
//! anew.

use std::time::Duration;

use github_client::GitHubUser;
use tokio::time::Instant;
use tracing::debug;

use crate::debounce::Debouncer;
use crate::query_cache::{FetchTicket, QueryCache, QueryError, QueryKey, QueryKind};

#[cfg(test)]
#[path = "suggestions_tests.rs"]
mod tests;

/// Default quiet period before typed text becomes a query.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Default delay between losing focus and hiding the dropdown.
pub const DEFAULT_BLUR_GRACE: Duration = Duration::from_millis(100);

/// Number of settled suggestion queries kept for reuse.
pub const SUGGESTION_CACHE_CAPACITY: usize = 32;

/// Tuning for the suggestion dropdown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuggestionSettings {
    /// Quiet period before typed text becomes a query.
    pub debounce: Duration,
    /// Delay between losing focus and hiding the dropdown, so a selection made
    /// just before the blur still registers.
    pub blur_grace: Duration,
    /// Minimum number of characters, after trimming, for a query.
    pub min_query_chars: usize,
    /// Maximum number of suggestions shown.
    pub limit: usize,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            blur_grace: DEFAULT_BLUR_GRACE,
            min_query_chars: 2,
            limit: github_client::SEARCH_RESULT_LIMIT,
        }
    }
}

/// Turns keystrokes into suggestion queries and tracks dropdown visibility.
#[derive(Debug)]
pub struct SuggestionCoordinator {
    settings: SuggestionSettings,
    debouncer: Debouncer,
    cache: QueryCache<Vec<GitHubUser>>,
    active_query: Option<String>,
    visible: bool,
    hide_at: Option<Instant>,
}

impl SuggestionCoordinator {
    pub fn new(settings: SuggestionSettings) -> Self {
        Self {
            debouncer: Debouncer::new(settings.debounce),
            settings,
            cache: QueryCache::new(),
            active_query: None,
            visible: false,
            hide_at: None,
        }
    }

    pub fn settings(&self) -> &SuggestionSettings {
        &self.settings
    }

    /// Returns `true` when `text` is long enough to be queried.
    pub fn is_query_candidate(&self, text: &str) -> bool {
        text.trim().chars().count() >= self.settings.min_query_chars
    }

    /// Records a keystroke. The text becomes a query only after the debounce
    /// window; short text hides the dropdown right away.
    pub fn on_input(&mut self, text: &str, now: Instant) {
        let candidate = text.trim();
        self.debouncer.push(candidate, now);
        self.visible = self.is_query_candidate(candidate);
        if !self.visible {
            self.hide_at = None;
        }

        debug!(
            candidate = candidate,
            visible = self.visible,
            "Suggestion input changed"
        );
    }

    /// Advances the timers to `now`.
    ///
    /// Returns a ticket when the debounced text needs to be fetched.
    pub fn poll(&mut self, now: Instant) -> Option<FetchTicket> {
        if self.hide_at.is_some_and(|hide_at| now >= hide_at) {
            self.visible = false;
            self.hide_at = None;
            debug!("Hid suggestions after losing focus");
        }

        let candidate = self.debouncer.poll(now)?;

        if !self.is_query_candidate(&candidate) {
            self.active_query = None;
            self.visible = false;
            return None;
        }

        if self.active_query.as_deref() == Some(candidate.as_str()) {
            return None;
        }

        debug!(query = candidate, "Suggestion query committed");
        let key = QueryKey::suggestions(candidate.as_str());
        self.active_query = Some(candidate);
        self.cache.invalidate_failed(&key);
        self.cache.evict(QueryKind::Suggestions, SUGGESTION_CACHE_CAPACITY, &key);
        self.cache.begin_if_needed(key)
    }

    /// Applies a search response.
    ///
    /// Returns `true` when the response belongs to the active query and is
    /// therefore what the dropdown now shows.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<GitHubUser>, QueryError>,
    ) -> bool {
        let limit = self.settings.limit;
        let result = result.map(|mut users| {
            users.truncate(limit);
            users
        });

        let applied = self.cache.complete(ticket, result);
        applied && self.active_query.as_deref() == Some(ticket.key().key())
    }

    /// Hides the dropdown `blur_grace` after `now`.
    pub fn on_blur(&mut self, now: Instant) {
        if self.visible {
            self.hide_at = Some(now + self.settings.blur_grace);
        }
    }

    /// Cancels a pending hide scheduled by [`Self::on_blur`].
    pub fn on_focus(&mut self) {
        self.hide_at = None;
    }

    /// Hides the dropdown immediately and forgets any text waiting for the
    /// debounce window.
    pub fn hide(&mut self) {
        self.visible = false;
        self.hide_at = None;
        self.debouncer.cancel();
    }

    /// The earliest instant at which [`Self::poll`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.debouncer.deadline(), self.hide_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn active_query(&self) -> Option<&str> {
        self.active_query.as_deref()
    }

    /// The visibility flag, independent of whether there is anything to show.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns `true` when the active query is waiting for its response.
    pub fn is_loading(&self) -> bool {
        self.active_key().is_some_and(|key| self.cache.is_fetching(&key))
    }

    /// The failure of the active query, if its last request failed.
    pub fn error(&self) -> Option<&QueryError> {
        let key = self.active_key()?;
        self.cache.get(&key).and_then(|state| state.error())
    }

    /// Results of the active query.
    pub fn suggestions(&self) -> &[GitHubUser] {
        self.active_key()
            .and_then(|key| self.cache.data(&key))
            .map(|users| users.as_slice())
            .unwrap_or(&[])
    }

    /// What the dropdown shows: the active results while it is visible.
    pub fn visible_suggestions(&self) -> &[GitHubUser] {
        if self.visible {
            self.suggestions()
        } else {
            &[]
        }
    }

    /// Returns `true` when the dropdown is both visible and non-empty.
    pub fn should_render(&self) -> bool {
        !self.visible_suggestions().is_empty()
    }

    fn active_key(&self) -> Option<QueryKey> {
        self.active_query.as_deref().map(QueryKey::suggestions)
    }
}
