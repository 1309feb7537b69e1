//! In-memory storage backend for testing.

use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::validate_key;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// In-memory storage backend for testing.
///
/// Objects are stored in a `HashMap` behind a [`RwLock`], so all trait
/// methods can operate on `&self` without external synchronisation. The
/// backend also counts reads and writes, and can be switched into a failing
/// mode, so that cache behaviour can be asserted without a network.
///
/// # Examples
///
/// ```
/// use iiifman_storage::backend::{MockBackend, StorageBackend};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_objects([("pid-1", "{}")]);
/// assert!(backend.exists("pid-1").await?);
///
/// backend.write("pid-2", b"{}", None).await?;
/// assert!(backend.exists("pid-2").await?);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    storage: RwLock<HashMap<String, (Option<String>, Vec<u8>)>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    failing: AtomicBool,
}

impl MockBackend {
    /// Create a mock backend pre-populated with objects.
    ///
    /// Panics if any key fails validation. If test setup is wrong, then the
    /// test should not pass.
    pub fn with_objects(objects: impl IntoIterator<Item = (impl Into<String>, impl Into<Vec<u8>>)>) -> Self {
        let mut map = HashMap::new();
        for (key, data) in objects {
            let key = key.into();
            let Ok(validated) = validate_key(&key) else {
                // The panic here is DELIBERATE. MockBackend is intended to be
                // used in tests; panics are expected. There is no error result.
                panic!("MockBackend::with_objects: invalid key {key:?}");
            };
            map.insert(validated, (None, data.into()));
        }
        Self {
            name: "mock".to_string(),
            storage: RwLock::new(map),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Change the name of the mock backend.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Make every subsequent operation fail with a network error.
    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful reads served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of successful writes accepted so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Content type recorded with the last write of `key`, if any.
    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.storage.read().await.get(key).and_then(|(content_type, _)| content_type.clone())
    }

    fn check(&self) -> Result<()> {
        match self.failing.load(Ordering::SeqCst) {
            true => exn::bail!(ErrorKind::Network(format!("{} is unreachable", self.name))),
            false => Ok(()),
        }
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let objects: [(&str, &str); 0] = [];
        Self::with_objects(objects)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.check()?;
        let key = validate_key(key)?;
        Ok(self.storage.read().await.contains_key(&key))
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        self.check()?;
        let key = validate_key(key)?;
        let (_content_type, data) =
            self.storage.read().await.get(&key).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(key)))?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(data)
    }

    async fn write(&self, key: &str, data: &[u8], content_type: Option<&str>) -> Result<()> {
        self.check()?;
        let key = validate_key(key)?;
        self.storage.write().await.insert(key, (content_type.map(str::to_string), data.to_vec()));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_and_read() {
        let backend = MockBackend::default();
        backend.write("pid-1", b"hello", Some("application/json")).await.unwrap();
        assert_eq!(backend.read("pid-1").await.unwrap(), b"hello");
        assert_eq!(backend.content_type("pid-1").await.as_deref(), Some("application/json"));
        assert_eq!(backend.reads(), 1);
        assert_eq!(backend.writes(), 1);
    }

    #[tokio::test]
    async fn test_with_objects() {
        let backend = MockBackend::with_objects([("pid-a", "a"), ("pid-b", "b")]);
        assert!(backend.exists("pid-a").await.unwrap());
        assert!(backend.exists("pid-b").await.unwrap());
        assert!(!backend.exists("pid-c").await.unwrap());
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let backend = MockBackend::default();
        let err = backend.read("missing").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
        assert_eq!(backend.reads(), 0);
    }

    #[tokio::test]
    async fn test_failing_mode() {
        let backend = MockBackend::with_objects([("pid-a", "a")]);
        backend.fail(true);
        let err = backend.exists("pid-a").await.unwrap_err();
        assert!(err.is_retryable());
        assert!(backend.write("pid-b", b"b", None).await.is_err());
        backend.fail(false);
        assert!(!backend.exists("pid-b").await.unwrap());
    }

    #[tokio::test]
    async fn test_key_traversal_rejected() {
        let backend = MockBackend::default();
        assert!(backend.read("../etc/passwd").await.is_err());
        assert!(backend.write("../escape", b"bad", None).await.is_err());
    }

    #[test]
    #[should_panic(expected = "invalid key")]
    fn test_with_objects_panics_on_bad_key() {
        MockBackend::with_objects([("../escape", "bad")]);
    }
}
