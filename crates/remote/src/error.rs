//! Remote Error Types

use derive_more::{Display, Error};

/// A remote service error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for remote service calls.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The upstream did not answer before the request timeout.
    #[display("{_0} timed out")]
    Timeout(#[error(not(source))] String),
    /// Nothing is listening at the upstream address.
    #[display("{_0} refused connection")]
    Refused(#[error(not(source))] String),
    /// Any other failure to complete the request.
    #[display("request to {_0} failed")]
    Transport(#[error(not(source))] String),
    /// The upstream answered with something other than 200 or 201. The body
    /// text is the upstream's own explanation.
    #[display("{url} returned {status}: {body}")]
    Status { url: String, status: u16, body: String },
    /// The upstream answered successfully but the body could not be read.
    #[display("unreadable response from {_0}")]
    Malformed(#[error(not(source))] String),
    #[display("could not build HTTP client")]
    Client,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Refused(_) | Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Malformed(_) | Self::Client => false,
        }
    }

    /// Whether the upstream is unreachable, rather than misbehaving.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Refused(_))
    }
}
