//! GitHub finder CLI library exports for integration testing.

pub mod commands;
pub mod config;
pub mod errors;
pub mod notifier;
pub mod render;
pub mod setup;
