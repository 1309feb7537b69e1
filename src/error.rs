//! Startup Error Types

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    /// A component could not be built from the configuration.
    #[display("unable to start {_0}")]
    Startup(#[error(not(source))] &'static str),
    #[display("server stopped unexpectedly")]
    Serve,
}
