//! Property-based tests for address composition
//!
//! Navigation must be associative: walking one segment at a time lands on
//! the same address as joining every segment at once.

mod test_support;

use burrow_core::{url_join, Query, Resource};
use proptest::prelude::*;
use test_support::{api_with, MockTransport};
use url::Url;

/// Strategy for a single path segment
fn segment_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,12}".prop_filter("leading underscore is reserved", |s| {
        !s.starts_with('_')
    })
}

/// Strategy for base URLs with and without trailing slashes
fn base_url_strategy() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("http"), Just("https")],
        "[a-z]{1,10}",
        proptest::collection::vec("[a-z0-9]{1,8}", 0..3),
        any::<bool>(),
    )
        .prop_map(|(scheme, host, path, trailing)| {
            let mut url = format!("{}://{}.example.com", scheme, host);
            for part in path {
                url.push('/');
                url.push_str(&part);
            }
            if trailing {
                url.push('/');
            }
            url
        })
}

proptest! {
    /// Property: successive joins equal a single multi-segment join
    #[test]
    fn prop_successive_joins_match_bulk_join(
        base in base_url_strategy(),
        segments in proptest::collection::vec(segment_strategy(), 1..6),
    ) {
        let base = Url::parse(&base).unwrap();

        let stepwise = segments
            .iter()
            .fold(base.clone(), |url, segment| url_join(&url, [segment]));
        let bulk = url_join(&base, &segments);

        prop_assert_eq!(stepwise, bulk);
    }

    /// Property: separators are never duplicated
    #[test]
    fn prop_no_duplicate_separators(
        base in base_url_strategy(),
        segments in proptest::collection::vec(segment_strategy(), 0..6),
    ) {
        let base = Url::parse(&base).unwrap();
        let joined = url_join(&base, &segments);

        prop_assert!(!joined.path().contains("//"));
        prop_assert_eq!(joined.host_str(), base.host_str());
        prop_assert_eq!(joined.scheme(), base.scheme());
    }

    /// Property: child navigation agrees with `path` and with `url_join`
    #[test]
    fn prop_navigation_matches_url_join(
        segments in proptest::collection::vec(segment_strategy(), 1..6),
        id in any::<u32>(),
    ) {
        let transport = MockTransport::new();
        let api = api_with(&transport);

        let stepwise = segments
            .iter()
            .try_fold(api.root().clone(), |node: Resource, segment| node.child(segment))
            .unwrap()
            .id(id)
            .unwrap();
        let bulk = api.path(&segments).unwrap().id(id).unwrap();

        let mut all = segments.clone();
        all.push(id.to_string());
        let expected = url_join(api.base_url(), &all);

        prop_assert_eq!(stepwise.url(), expected.as_str());
        prop_assert_eq!(&stepwise, &bulk);
    }

    /// Property: query encoding never drops or reorders pairs
    #[test]
    fn prop_query_preserves_pairs(
        pairs in proptest::collection::vec(("[a-z]{1,6}", "[ -~]{0,10}"), 0..5),
    ) {
        let query: Query = pairs.iter().cloned().collect();
        let encoded = query.encode().unwrap();
        let decoded: Vec<(String, String)> = serde_urlencoded::from_str(&encoded).unwrap();

        prop_assert_eq!(decoded, pairs);
    }
}
