//! Extraction Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Payloads are either decodable or they are not, so
//! nothing in this crate is worth retrying.

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The JSON payload does not match the expected shape.
    #[display("malformed {_0} JSON")]
    MalformedJson(#[error(not(source))] &'static str),
    /// The XML document is not well-formed.
    #[display("malformed {_0} XML")]
    MalformedXml(#[error(not(source))] &'static str),
    /// A required field could not be found in the payload.
    #[display("missing required field: {_0}")]
    MissingField(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
