//! Manifest Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A manifest error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for manifest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The template file could not be read.
    #[display("could not read template {}", _0.display())]
    TemplateNotFound(#[error(not(source))] PathBuf),
    /// The template does not compile.
    #[display("invalid manifest template")]
    Template,
    /// Binding a record into the template failed.
    #[display("could not render manifest for {_0}")]
    Render(#[error(not(source))] String),
    /// A record type name outside the known vocabulary.
    #[display("unknown record kind: {_0}")]
    UnknownKind(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
