/// Build the cache key for a route, PID and optional unit.
///
/// The key is deterministic and flat: `/` and `:` (both common in PIDs)
/// are replaced with `-` so that keys never create pseudo-directories.
///
/// ```
/// assert_eq!(iiifman_cache::key("pid", "uva-lib:2528443", None), "pid-uva-lib-2528443");
/// assert_eq!(iiifman_cache::key("pid", "uva-lib:2528443", Some(3)), "pid-uva-lib-2528443-3");
/// ```
pub fn key(route: &str, pid: &str, unit: Option<u32>) -> String {
    let key = match unit {
        Some(unit) => format!("{route}-{pid}-{unit}"),
        None => format!("{route}-{pid}"),
    };
    key.replace(['/', ':'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pid", "uva-lib:1234", None, "pid-uva-lib-1234")]
    #[case("pid", "uva-lib:1234", Some(7), "pid-uva-lib-1234-7")]
    #[case("pid", "ark:/12345/x9", None, "pid-ark--12345-x9")]
    #[case("api/aries", "tsb:1", None, "api-aries-tsb-1")]
    fn test_key(#[case] route: &str, #[case] pid: &str, #[case] unit: Option<u32>, #[case] expected: &str) {
        assert_eq!(key(route, pid, unit), expected);
    }

    #[test]
    fn test_key_is_deterministic() {
        assert_eq!(key("pid", "uva-lib:1", Some(2)), key("pid", "uva-lib:1", Some(2)));
        assert_ne!(key("pid", "uva-lib:1", Some(2)), key("pid", "uva-lib:1", None));
    }
}
