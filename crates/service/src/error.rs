//! Service Error Types
//!
//! The kinds here are what a request can fail with, and each maps onto one
//! HTTP status. Errors from the crates below are re-raised as one of these
//! so the full error tree is kept for logging.

use derive_more::{Display, Error};
use iiifman_remote::error::{Error as RemoteError, ErrorKind as RemoteErrorKind};

/// A service error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The PID is not known to any source.
    #[display("PID {_0} not found")]
    NotFound(#[error(not(source))] String),
    #[display("{_0}")]
    BadRequest(#[error(not(source))] String),
    /// A primary source could not be reached in time.
    #[display("{_0}")]
    Unavailable(#[error(not(source))] String),
    /// A primary source answered with an error.
    #[display("{_0}")]
    BadGateway(#[error(not(source))] String),
    /// A primary source answered with something that could not be decoded.
    #[display("{_0}")]
    Malformed(#[error(not(source))] String),
    #[display("unable to render manifest for {_0}")]
    Render(#[error(not(source))] String),
    #[display("unable to read {_0} from the cache")]
    CacheRead(#[error(not(source))] String),
    #[display("unable to write {_0} to the cache")]
    CacheWrite(#[error(not(source))] String),
    #[display("record store unavailable")]
    Database,
}

impl ErrorKind {
    /// HTTP status code reported to the client.
    pub fn status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::BadRequest(_) => 400,
            Self::Unavailable(_) | Self::Database => 503,
            Self::BadGateway(_) => 502,
            Self::Malformed(_) => 422,
            Self::Render(_) | Self::CacheRead(_) | Self::CacheWrite(_) => 500,
        }
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::BadGateway(_) | Self::Database)
    }
}

/// Re-raise a failed call to a primary remote source.
///
/// Unreachable upstreams are `Unavailable`, upstreams answering with an error
/// are `BadGateway` carrying the upstream's own message, and undecodable
/// payloads are `Malformed`.
pub(crate) fn upstream(context: &str, err: RemoteError) -> Error {
    let kind = match &*err {
        RemoteErrorKind::Timeout(_) | RemoteErrorKind::Refused(_) => ErrorKind::Unavailable(format!("{context}: {}", &*err)),
        RemoteErrorKind::Status { body, .. } => ErrorKind::BadGateway(format!("{context}: {body}")),
        RemoteErrorKind::Malformed(_) => ErrorKind::Malformed(format!("{context}: {}", &*err)),
        RemoteErrorKind::Transport(_) | RemoteErrorKind::Client => ErrorKind::BadGateway(format!("{context}: {}", &*err)),
    };
    err.raise(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RemoteErrorKind::Timeout("http://ts/api".to_string()), 503, "unable to retrieve manifest: http://ts/api timed out")]
    #[case(RemoteErrorKind::Refused("http://ts/api".to_string()), 503, "unable to retrieve manifest: http://ts/api refused connection")]
    #[case(
        RemoteErrorKind::Status { url: "http://ts/api".to_string(), status: 404, body: "no such pid".to_string() },
        502,
        "unable to retrieve manifest: no such pid"
    )]
    #[case(RemoteErrorKind::Transport("http://ts/api".to_string()), 502, "unable to retrieve manifest: request to http://ts/api failed")]
    #[case(RemoteErrorKind::Malformed("http://ts/api".to_string()), 422, "unable to retrieve manifest: unreadable response from http://ts/api")]
    fn test_upstream_mapping(#[case] remote: RemoteErrorKind, #[case] status: u16, #[case] message: &str) {
        let err = upstream("unable to retrieve manifest", RemoteError::from(remote));
        assert_eq!(err.status(), status);
        assert_eq!((*err).to_string(), message);
    }

    #[test]
    fn test_not_found_echoes_pid() {
        assert_eq!(ErrorKind::NotFound("uva-lib:1".to_string()).to_string(), "PID uva-lib:1 not found");
    }
}
