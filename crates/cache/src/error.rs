//! Cache Error Types

use derive_more::{Display, Error};

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not check the cache for {_0}")]
    Lookup(#[error(not(source))] String),
    #[display("could not read {_0} from the cache")]
    Read(#[error(not(source))] String),
    #[display("could not write {_0} to the cache")]
    Write(#[error(not(source))] String),
    /// The cached object is not valid UTF-8.
    #[display("cached object {_0} is corrupt")]
    Corrupt(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Corrupt(_))
    }
}
