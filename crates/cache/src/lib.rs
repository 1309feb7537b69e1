//! Cache-aside proxy for rendered manifests.
//!
//! Rendered manifests are stored verbatim in object storage under a key
//! derived from the route, the PID and (optionally) a unit. Entries are
//! created lazily on a miss, never expire, and are replaced only by an
//! explicit refresh. Whether a given request may read or write the cache
//! is decided by [`CachePolicy`].

pub mod error;
mod key;
mod policy;
mod proxy;

pub use crate::key::key;
pub use crate::policy::{CachePolicy, RequestFlags, WriteMode};
pub use crate::proxy::CacheProxy;

/// Content type stored alongside cached manifests.
pub const MANIFEST_CONTENT_TYPE: &str = "application/json; charset=utf-8";
