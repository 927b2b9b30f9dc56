//! Command modules for the GitHub finder CLI.
//!
//! - `lookup_cmd`: one-shot profile lookup
//! - `recents_cmd`: listing and clearing recent searches
//! - `search_cmd`: the interactive search session

pub mod lookup_cmd;
pub mod recents_cmd;
pub mod search_cmd;
