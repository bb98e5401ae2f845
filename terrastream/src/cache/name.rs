//! Resource name → on-disk cache path mapping.
//!
//! A network name `scheme://host/dir/leaf?query` is stored at
//! `cache/host/dir/leaf_query`, with every byte outside `[a-zA-Z0-9-.]`
//! replaced by `_`. The layout is shared with existing caches, so the
//! mapping must stay byte-for-byte stable.

/// Top-level directory every cached file lives under.
pub const CACHE_DIR: &str = "cache";

/// Names containing `://` are fetched over the network; anything else is a
/// local path read directly.
pub fn is_network_name(name: &str) -> bool {
    name.contains("://")
}

/// Map a resource name to its relative cache path.
///
/// The scheme prefix is dropped, `.` and empty segments are skipped and `..`
/// pops the previous segment (never above the root), so the result always
/// stays inside [`CACHE_DIR`].
///
/// ```
/// use terrastream::cache::to_cache_path;
///
/// assert_eq!(
///     to_cache_path("https://cdn.example.com/tiles/12-3-4.meta?v=2"),
///     "cache/cdn.example.com/tiles/12-3-4.meta_v_2"
/// );
/// ```
pub fn to_cache_path(name: &str) -> String {
    let rest = match name.find("://") {
        Some(i) => &name[i + 3..],
        None => name,
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split(|c| c == '/' || c == '\\') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut path = String::with_capacity(CACHE_DIR.len() + rest.len() + 2);
    path.push_str(CACHE_DIR);
    match segments.split_last() {
        Some((leaf, dirs)) => {
            if !dirs.is_empty() {
                path.push('/');
                push_sanitized(&mut path, &dirs.join("/"), true);
            }
            path.push('/');
            push_sanitized(&mut path, leaf, false);
        }
        None => path.push_str("/_"),
    }
    path
}

fn push_sanitized(out: &mut String, component: &str, keep_slashes: bool) {
    for b in component.bytes() {
        let c = match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'.' => b as char,
            b'/' | b'\\' if keep_slashes => '/',
            _ => '_',
        };
        out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_detection() {
        assert!(is_network_name("https://a.example.com/x"));
        assert!(is_network_name("file://tmp/x"));
        assert!(!is_network_name("data/helper.jpg"));
        assert!(!is_network_name("C:\\maps\\config.json"));
    }

    #[test]
    fn test_deterministic() {
        let name = "https://tiles.example.org/surface/15-17000-11000.bin";
        assert_eq!(to_cache_path(name), to_cache_path(name));
    }

    #[test]
    fn test_leaf_sanitized_and_directory_kept() {
        assert_eq!(
            to_cache_path("http://maps.example.com:8070/store/mapConfig.json"),
            "cache/maps.example.com_8070/store/mapConfig.json"
        );
    }

    #[test]
    fn test_non_ascii_bytes_each_become_underscore() {
        // 'é' is two bytes in UTF-8
        assert_eq!(to_cache_path("https://h/caf\u{e9}"), "cache/h/caf__");
    }

    #[test]
    fn test_dot_dot_cannot_escape_root() {
        for name in [
            "https://host/../../../etc/passwd",
            "../../secret",
            "https://host/a/../../..",
            "https://..\\..\\x",
        ] {
            let path = to_cache_path(name);
            assert!(path.starts_with("cache/"), "{} -> {}", name, path);
            assert!(
                !path.split('/').any(|seg| seg == ".."),
                "{} -> {}",
                name,
                path
            );
        }
        assert_eq!(to_cache_path("https://host/../../../etc/passwd"), "cache/etc/passwd");
    }

    #[test]
    fn test_dot_dot_pops_within_path() {
        assert_eq!(
            to_cache_path("https://host/a/b/../c.bin"),
            "cache/host/a/c.bin"
        );
    }

    #[test]
    fn test_backslashes_become_separators() {
        assert_eq!(to_cache_path("https://host\\dir\\leaf"), "cache/host/dir/leaf");
    }

    #[test]
    fn test_single_segment_has_no_directory() {
        assert_eq!(to_cache_path("https://host"), "cache/host");
        assert_eq!(to_cache_path("https://"), "cache/_");
    }
}
