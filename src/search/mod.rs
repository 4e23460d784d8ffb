//! Catalog search

use crate::catalog::PostDescriptor;

/// Filter posts by a free-text query
///
/// The query is trimmed and lowercased. A post matches when its title or
/// one of its tags contains the query (ignoring case), or when its raw date
/// string contains it. An empty query returns every post in input order.
pub fn filter(entries: &[PostDescriptor], query: &str) -> Vec<PostDescriptor> {
    let query = normalize_query(query);
    if query.is_empty() {
        return entries.to_vec();
    }

    entries
        .iter()
        .filter(|post| matches(post, &query))
        .cloned()
        .collect()
}

/// Whether a post matches an already normalized query
pub fn matches(post: &PostDescriptor, query: &str) -> bool {
    post.title.to_lowercase().contains(query)
        || post.tags.iter().any(|t| t.to_lowercase().contains(query))
        || post.date.contains(query)
}

/// Trim and lowercase a raw query
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<PostDescriptor> {
        vec![
            PostDescriptor::new("filters.md", "Ideal frequency filters", "2026-01-01")
                .with_tags(["Electronics", "Signal processing"]),
            PostDescriptor::new("rc.md", "First-order RC low-pass", "2026-02-01")
                .with_tags(["Electronics", "Filters", "RC"]),
            PostDescriptor::new("fft.md", "FFT by hand", "2025-11-15")
                .with_tags(["Signal processing", "Math"]),
        ]
    }

    fn sources(posts: &[PostDescriptor]) -> Vec<&str> {
        posts.iter().map(|p| p.source_ref.as_str()).collect()
    }

    #[test]
    fn test_empty_query_is_identity() {
        let all = catalog();
        assert_eq!(filter(&all, ""), all);
        assert_eq!(filter(&all, "   "), all);
    }

    #[test]
    fn test_title_match_ignores_case() {
        assert_eq!(sources(&filter(&catalog(), "FFT")), vec!["fft.md"]);
        assert_eq!(sources(&filter(&catalog(), "  low-PASS ")), vec!["rc.md"]);
    }

    #[test]
    fn test_tag_match() {
        assert_eq!(
            sources(&filter(&catalog(), "signal")),
            vec!["filters.md", "fft.md"]
        );
        assert_eq!(
            sources(&filter(&catalog(), "electronics")),
            vec!["filters.md", "rc.md"]
        );
    }

    #[test]
    fn test_title_or_tag_match() {
        // "filters" is a title word in one post and a tag in another
        assert_eq!(
            sources(&filter(&catalog(), "filters")),
            vec!["filters.md", "rc.md"]
        );
    }

    #[test]
    fn test_date_match() {
        assert_eq!(
            sources(&filter(&catalog(), "2026-0")),
            vec!["filters.md", "rc.md"]
        );
        assert_eq!(sources(&filter(&catalog(), "11-15")), vec!["fft.md"]);
    }

    #[test]
    fn test_no_match() {
        assert!(filter(&catalog(), "quantum").is_empty());
    }

    #[test]
    fn test_matches_agrees_with_filter() {
        let all = catalog();
        for query in ["rc", "math", "2025", "order", "x"] {
            let expected: Vec<_> = all
                .iter()
                .filter(|p| {
                    p.title.to_lowercase().contains(query)
                        || p.tags.iter().any(|t| t.to_lowercase().contains(query))
                        || p.date.contains(query)
                })
                .cloned()
                .collect();
            assert_eq!(filter(&all, query), expected, "query {:?}", query);
        }
    }
}
