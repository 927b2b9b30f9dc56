use std::io;

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the GitHub finder CLI.
///
/// Only startup problems (configuration, client construction) end the
/// process. Failures inside a search session are rendered inline instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error occurred while loading or parsing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to load a file from the filesystem.
    #[error("Failed to load file.")]
    LoadFile(io::Error),

    /// Failed to parse a TOML configuration file.
    #[error("Failed to parse TOML configuration file.")]
    ParseTomlFile(toml::de::Error),

    /// The GitHub client could not be created.
    #[error("GitHub client error: {0}")]
    Client(#[from] github_client::Error),

    /// Failed to flush the standard output buffer.
    ///
    /// This error occurs when the CLI cannot write output to the terminal,
    /// typically due to broken pipes or terminal issues.
    #[error("Failed to flush the std out buffer.")]
    StdOutFlushFailed,

    /// Reading the terminal or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
