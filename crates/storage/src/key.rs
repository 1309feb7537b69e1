//! Object key validation.
//!
//! Keys are flat strings on object stores but become paths on the local
//! filesystem backend, so the same rules apply to both: no traversal out of
//! the root and nothing that a C-based syscall would truncate.

use crate::error::{ErrorKind, Result};

/// Validates and normalizes an object key.
///
/// Empty segments and `.` segments are dropped, `..` segments pop the
/// previous segment and are rejected if they would leave the root.
///
/// # Examples
///
/// ```
/// use iiifman_storage::validate_key;
/// assert_eq!(validate_key("pid-uva-lib-123").unwrap(), "pid-uva-lib-123");
/// assert_eq!(validate_key("manifests//./pid-1").unwrap(), "manifests/pid-1");
/// assert!(validate_key("../etc/passwd").is_err());
/// assert!(validate_key("a\0b").is_err());
/// assert!(validate_key("").is_err());
/// ```
pub fn validate(key: impl AsRef<str>) -> Result<String> {
    let key = key.as_ref();
    if key.contains('\0') {
        exn::bail!(ErrorKind::InvalidKey(key.to_string()));
    }
    let mut segments: Vec<&str> = Vec::new();
    for segment in key.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                if segments.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidKey(key.to_string()));
                }
            },
            s => segments.push(s),
        }
    }
    match segments.is_empty() {
        true => exn::bail!(ErrorKind::InvalidKey(key.to_string())),
        false => Ok(segments.join("/")),
    }
}
