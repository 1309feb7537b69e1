//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, which provides a unified
//! interface for object storage across different backends (local filesystem,
//! S3-compatible services, in-memory for tests).

mod local;
#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "s3")]
mod s3;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
#[cfg(feature = "s3")]
pub use self::s3::S3Backend;
use crate::error::Result;
use async_trait::async_trait;

/// Unified interface for object storage backends.
///
/// All operations are asynchronous to efficiently handle network operations
/// and concurrent access.
///
/// # Key Handling
/// All keys are relative to the storage root and must be validated using
/// [`validate_key`](crate::validate_key) before use. Implementations should
/// enforce this validation.
///
/// # Examples
///
/// ```
/// use iiifman_storage::{backend::StorageBackend, error::Result};
///
/// async fn cached_size(backend: &dyn StorageBackend) -> Result<u64> {
///     let key = "pid-uva-lib-2528443";
///     if backend.exists(key).await? {
///         let data = backend.read(key).await?;
///         Ok(data.len() as u64)
///     } else {
///         Ok(0)
///     }
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend (used for logging only).
    fn name(&self) -> &str;

    /// Check if an object exists.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Read object contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the object
    /// does not exist.
    async fn read(&self, key: &str) -> Result<Vec<u8>>;

    /// Write object contents.
    ///
    /// Creates a new object or overwrites an existing object. Readers never
    /// observe a partially written object: either the previous contents or
    /// the complete new contents are visible.
    async fn write(&self, key: &str, data: &[u8], content_type: Option<&str>) -> Result<()>;
}
