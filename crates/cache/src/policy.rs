/// Per-request controls that affect caching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestFlags {
    /// Restrict the manifest to the pages of a single unit.
    pub unit: Option<u32>,
    /// Bypass the cache: don't serve from it and don't populate it.
    pub nocache: bool,
    /// Regenerate and overwrite whatever is cached.
    pub refresh: bool,
}

/// When a freshly generated manifest is written to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Never,
    /// Write on a miss. A failed write is logged; the manifest is still served.
    IfAbsent,
    /// Always write. A failed write is reported to the caller.
    Overwrite,
}

/// What a single request may do with the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub read: bool,
    pub write: WriteMode,
}

impl CachePolicy {
    /// Unit-restricted manifests are partial views and `nocache` requests
    /// bypass the cache entirely; neither reads nor writes. `refresh`
    /// regenerates and overwrites.
    pub fn for_request(flags: &RequestFlags) -> Self {
        if flags.unit.is_some() || flags.nocache {
            return Self::disabled();
        }
        if flags.refresh {
            return Self { read: false, write: WriteMode::Overwrite };
        }
        Self { read: true, write: WriteMode::IfAbsent }
    }

    pub fn disabled() -> Self {
        Self { read: false, write: WriteMode::Never }
    }

    /// Whether the request touches the cache at all.
    pub fn is_cacheable(&self) -> bool {
        self.read || self.write != WriteMode::Never
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain(None, false, false, true, WriteMode::IfAbsent)]
    #[case::nocache(None, true, false, false, WriteMode::Never)]
    #[case::refresh(None, false, true, false, WriteMode::Overwrite)]
    #[case::refresh_nocache(None, true, true, false, WriteMode::Never)]
    #[case::unit(Some(3), false, false, false, WriteMode::Never)]
    #[case::unit_refresh(Some(3), false, true, false, WriteMode::Never)]
    #[case::unit_nocache(Some(3), true, false, false, WriteMode::Never)]
    fn test_policy(
        #[case] unit: Option<u32>,
        #[case] nocache: bool,
        #[case] refresh: bool,
        #[case] read: bool,
        #[case] write: WriteMode,
    ) {
        let policy = CachePolicy::for_request(&RequestFlags { unit, nocache, refresh });
        assert_eq!(policy, CachePolicy { read, write });
    }

    #[test]
    fn test_unit_requests_are_not_cacheable() {
        let policy = CachePolicy::for_request(&RequestFlags { unit: Some(1), ..RequestFlags::default() });
        assert!(!policy.is_cacheable());
        assert!(CachePolicy::for_request(&RequestFlags::default()).is_cacheable());
        assert!(!CachePolicy::disabled().is_cacheable());
    }
}
