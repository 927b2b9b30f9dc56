use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors raised by the durable parts of the finder.
///
/// Network failures are not represented here. They are carried by
/// [`github_client::Error`] and converted into [`crate::QueryError`] values
/// stored next to the query that produced them.
#[derive(Error, Debug)]
pub enum Error {
    /// The storage backend rejected a read or write.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The persisted list could not be encoded or decoded.
    #[error("Failed to serialize recent searches: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The file system reported a failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
