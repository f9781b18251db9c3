//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate a plain path segment (never empty, `.` or `..`)
    pub fn path_segment() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_-][a-zA-Z0-9._-]{0,15}"
    }

    /// Generate one to six plain path segments
    pub fn path_segments() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec(path_segment(), 1..6)
    }

    /// Generate an arbitrary request URI, including dot segments,
    /// doubled slashes and query strings
    pub fn request_uri() -> impl Strategy<Value = String> {
        let segment = prop_oneof![
            4 => path_segment(),
            1 => Just(String::new()),
            1 => Just(".".to_string()),
            1 => Just("..".to_string()),
        ];
        (
            proptest::collection::vec(segment, 0..8),
            proptest::option::of("[a-z]{1,5}=[a-z0-9./]{0,8}"),
        )
            .prop_map(|(segments, query)| {
                let mut uri = format!("/{}", segments.join("/"));
                if let Some(query) = query {
                    uri.push('?');
                    uri.push_str(&query);
                }
                uri
            })
    }

    /// Generate a response body
    pub fn body_bytes() -> impl Strategy<Value = Vec<u8>> {
        proptest::collection::vec(any::<u8>(), 0..4096)
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_request_uri_starts_with_slash(uri in request_uri()) {
            prop_assert!(uri.starts_with('/'));
        }

        #[test]
        fn prop_path_segment_is_plain(segment in path_segment()) {
            prop_assert!(!segment.is_empty());
            prop_assert!(segment != "." && segment != "..");
            prop_assert!(!segment.contains('/'));
        }
    }
}
