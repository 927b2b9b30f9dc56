//! Core state of the GitHub user finder.
//!
//! This crate holds everything between the GitHub API client and a front end:
//! the search session, debounced suggestions, follow state, recent searches
//! and user notifications. Remote calls go through
//! [`github_client::UserDirectory`], so every component can be driven in tests
//! without a network.

pub mod debounce;
pub mod errors;
pub mod follow;
pub mod notifier;
pub mod query_cache;
pub mod recents;
pub mod search;
pub mod suggestions;

pub use errors::Error;
pub use follow::{FollowAction, FollowCoordinator, FollowStatus, MutationTicket, ToggleOutcome};
pub use notifier::{Notification, Notifier, RecordingNotifier, TracingNotifier};
pub use query_cache::{FetchTicket, QueryCache, QueryError, QueryErrorKind, QueryKey, QueryKind};
pub use recents::{
    JsonFileStorage, MemoryStorage, PersistentRecents, RecentSearchList, RecentsStorage,
    RECENTS_KEY, RECENTS_LIMIT,
};
pub use search::{ProfileView, SearchOrchestrator, SearchPhase, SearchState, Username};
pub use suggestions::{SuggestionCoordinator, SuggestionSettings};

#[cfg(test)]
mod test_support;
