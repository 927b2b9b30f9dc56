//! Cache of remote query results.
//!
//! Every remote read the finder performs (profile, suggestions, follow status)
//! goes through a [`QueryCache`]. An entry remembers the last result for its
//! [`QueryKey`] together with whether a request is in flight and whether the
//! result has been invalidated.
//!
//! Requests are started with [`QueryCache::begin`], which hands out a
//! [`FetchTicket`]. Each ticket carries a generation number; when a response
//! arrives, [`QueryCache::complete`] only applies it if no newer request for
//! the same key was started in the meantime. This is how out-of-order
//! responses are kept from overwriting newer state without cancelling
//! anything.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

#[cfg(test)]
#[path = "query_cache_tests.rs"]
mod tests;

/// The remote operation a query belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Profile,
    Suggestions,
    FollowStatus,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryKind::Profile => "profile",
            QueryKind::Suggestions => "suggestions",
            QueryKind::FollowStatus => "follow-status",
        };
        f.write_str(name)
    }
}

/// Identifies a cached query by operation and argument.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey {
    kind: QueryKind,
    key: String,
}

impl QueryKey {
    pub fn new(kind: QueryKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
        }
    }

    pub fn profile(login: impl Into<String>) -> Self {
        Self::new(QueryKind::Profile, login)
    }

    pub fn suggestions(query: impl Into<String>) -> Self {
        Self::new(QueryKind::Suggestions, query)
    }

    pub fn follow_status(login: impl Into<String>) -> Self {
        Self::new(QueryKind::FollowStatus, login)
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.key)
    }
}

/// Broad classes of query failures, used to decide how a failure is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryErrorKind {
    NotFound,
    Auth,
    Network,
    Other,
}

/// A failed query result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryError {
    kind: QueryErrorKind,
    message: String,
}

impl QueryError {
    pub fn new(kind: QueryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> QueryErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<&github_client::Error> for QueryError {
    fn from(error: &github_client::Error) -> Self {
        let kind = match error {
            github_client::Error::NotFound(_) => QueryErrorKind::NotFound,
            github_client::Error::AuthError(_) => QueryErrorKind::Auth,
            github_client::Error::Network(_) => QueryErrorKind::Network,
            _ => QueryErrorKind::Other,
        };
        Self::new(kind, error.to_string())
    }
}

impl From<github_client::Error> for QueryError {
    fn from(error: github_client::Error) -> Self {
        Self::from(&error)
    }
}

/// Handle for one in-flight request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    key: QueryKey,
    generation: u64,
}

impl FetchTicket {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn kind(&self) -> QueryKind {
        self.key.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// The cached state of a single query.
#[derive(Clone, Debug)]
pub struct QueryState<T> {
    data: Option<T>,
    error: Option<QueryError>,
    fetching: bool,
    stale: bool,
    generation: u64,
}

impl<T> QueryState<T> {
    fn new() -> Self {
        Self {
            data: None,
            error: None,
            fetching: false,
            stale: false,
            generation: 0,
        }
    }

    /// The last successful result, kept across later failures.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// The failure of the most recent completed request, if it failed.
    pub fn error(&self) -> Option<&QueryError> {
        self.error.as_ref()
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    fn is_settled(&self) -> bool {
        self.data.is_some() || self.error.is_some()
    }
}

/// Query results keyed by [`QueryKey`].
#[derive(Debug)]
pub struct QueryCache<T> {
    entries: HashMap<QueryKey, QueryState<T>>,
    next_generation: u64,
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            next_generation: 1,
        }
    }
}

impl<T> QueryCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when `key` has no usable result and nothing is in
    /// flight for it.
    ///
    /// A failed entry is not refetched on its own; it has to be invalidated
    /// first.
    pub fn needs_fetch(&self, key: &QueryKey) -> bool {
        match self.entries.get(key) {
            None => true,
            Some(state) => !state.fetching && (state.stale || !state.is_settled()),
        }
    }

    /// Starts a request for `key`, superseding any request already in flight.
    pub fn begin(&mut self, key: QueryKey) -> FetchTicket {
        let generation = self.next_generation;
        self.next_generation += 1;

        let state = self.entries.entry(key.clone()).or_insert_with(QueryState::new);
        state.fetching = true;
        state.generation = generation;

        debug!(key = %key, generation, "Query started");
        FetchTicket { key, generation }
    }

    /// Starts a request for `key` unless a usable result or an in-flight
    /// request already exists.
    pub fn begin_if_needed(&mut self, key: QueryKey) -> Option<FetchTicket> {
        if self.needs_fetch(&key) {
            Some(self.begin(key))
        } else {
            None
        }
    }

    /// Applies the response for `ticket`.
    ///
    /// Returns `false`, leaving the entry untouched, when a newer request for
    /// the same key has been started since the ticket was issued.
    pub fn complete(&mut self, ticket: &FetchTicket, result: Result<T, QueryError>) -> bool {
        let Some(state) = self.entries.get_mut(&ticket.key) else {
            debug!(key = %ticket.key, "Dropping response for evicted query");
            return false;
        };

        if state.generation != ticket.generation {
            debug!(
                key = %ticket.key,
                generation = ticket.generation,
                latest = state.generation,
                "Dropping stale response"
            );
            return false;
        }

        state.fetching = false;
        state.stale = false;
        match result {
            Ok(data) => {
                state.data = Some(data);
                state.error = None;
            }
            Err(error) => {
                state.error = Some(error);
            }
        }

        debug!(key = %ticket.key, generation = ticket.generation, "Query completed");
        true
    }

    /// Marks `key` stale so the next read refetches it. The last result stays
    /// available until then.
    pub fn invalidate(&mut self, key: &QueryKey) -> bool {
        match self.entries.get_mut(key) {
            Some(state) => {
                state.stale = true;
                true
            }
            None => false,
        }
    }

    /// Marks `key` stale when its last request failed and nothing is in flight
    /// for it, so the next read retries.
    pub fn invalidate_failed(&mut self, key: &QueryKey) -> bool {
        match self.entries.get_mut(key) {
            Some(state) if state.error.is_some() && !state.fetching => {
                debug!(key = %key, "Retrying failed query");
                state.stale = true;
                true
            }
            _ => false,
        }
    }

    /// Drops settled entries of `kind`, oldest request first, until at most
    /// `capacity` of them remain. Entries in flight and `keep` are never
    /// dropped.
    pub fn evict(&mut self, kind: QueryKind, capacity: usize, keep: &QueryKey) -> usize {
        let mut candidates: Vec<(u64, QueryKey)> = self
            .entries
            .iter()
            .filter(|(key, state)| key.kind == kind && !state.fetching && *key != keep)
            .map(|(key, state)| (state.generation, key.clone()))
            .collect();

        let total = self.entries.keys().filter(|key| key.kind == kind).count();
        let excess = total.saturating_sub(capacity).min(candidates.len());
        if excess == 0 {
            return 0;
        }

        candidates.sort_unstable_by_key(|(generation, _)| *generation);
        for (_, key) in candidates.into_iter().take(excess) {
            self.entries.remove(&key);
        }

        debug!(kind = %kind, evicted = excess, "Evicted cached queries");
        excess
    }

    /// Marks every entry of `kind` stale and returns how many were affected.
    pub fn invalidate_kind(&mut self, kind: QueryKind) -> usize {
        let mut count = 0;
        for (key, state) in self.entries.iter_mut() {
            if key.kind == kind {
                state.stale = true;
                count += 1;
            }
        }

        debug!(kind = %kind, count, "Invalidated queries");
        count
    }

    pub fn get(&self, key: &QueryKey) -> Option<&QueryState<T>> {
        self.entries.get(key)
    }

    pub fn data(&self, key: &QueryKey) -> Option<&T> {
        self.entries.get(key).and_then(QueryState::data)
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.entries.get(key).is_some_and(QueryState::is_fetching)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
