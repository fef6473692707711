use std::collections::HashMap;

use serde::Serialize;
use strsim::generic_damerau_levenshtein;

use crate::domain::post::Post;

pub const DEFAULT_KEYWORD_THRESHOLD: f64 = 0.8;

/// Character offsets of a keyword match inside a post message, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

impl MatchSpan {
    fn len(&self) -> usize {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeywordMatch {
    pub span: MatchSpan,
    pub similarity: f64,
}

/// Post id to match span. A post without an entry did not match.
pub type SearchResult = HashMap<String, MatchSpan>;

/// Approximate substring search over post messages.
///
/// Similarity is `1 - edits / query_chars`, where `edits` is the
/// Damerau-Levenshtein distance between the query and the best-aligned
/// substring of the message. `1.0` is an exact occurrence; matches below the
/// threshold are dropped. Comparison is case-insensitive.
#[derive(Debug, Clone, Copy)]
pub struct KeywordMatcher {
    threshold: f64,
}

impl KeywordMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Most edits a match of a `query_len`-char query may carry.
    fn max_edits(&self, query_len: usize) -> usize {
        (query_len as f64 * (1.0 - self.threshold) + 1e-9).floor() as usize
    }

    pub fn find(&self, query: &str, text: &str) -> Option<KeywordMatch> {
        let needle = fold(query.trim());
        if needle.is_empty() {
            return None;
        }
        let haystack = fold(text);
        let max_edits = self.max_edits(needle.len());
        let shortest = needle.len().saturating_sub(max_edits).max(1);
        let longest = needle.len() + max_edits;

        let mut best: Option<(usize, MatchSpan)> = None;
        for start in 0..haystack.len() {
            for len in shortest..=longest {
                let end = start + len;
                if end > haystack.len() {
                    break;
                }
                let edits = generic_damerau_levenshtein(&needle, &haystack[start..end]);
                if edits > max_edits {
                    continue;
                }
                let span = MatchSpan { start, end };
                if is_better(needle.len(), (edits, span), best) {
                    best = Some((edits, span));
                }
            }
            if matches!(best, Some((0, _))) {
                break;
            }
        }

        let (edits, span) = best?;
        let similarity = 1.0 - edits as f64 / needle.len() as f64;
        if similarity < self.threshold {
            return None;
        }
        Some(KeywordMatch { span, similarity })
    }

    pub fn search<'a, I>(&self, query: &str, posts: I) -> SearchResult
    where
        I: IntoIterator<Item = &'a Post>,
    {
        if query.trim().is_empty() {
            return SearchResult::new();
        }
        posts
            .into_iter()
            .filter_map(|post| {
                self.find(query, &post.message)
                    .map(|found| (post.id.clone(), found.span))
            })
            .collect()
    }
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORD_THRESHOLD)
    }
}

/// Lowercases char by char so indices into the folded text line up with the
/// original message.
fn fold(text: &str) -> Vec<char> {
    text.chars()
        .map(|ch| ch.to_lowercase().next().unwrap_or(ch))
        .collect()
}

/// Fewer edits win. At equal edits the earliest start is kept, and at the same
/// start the length closest to the query wins.
fn is_better(
    query_len: usize,
    candidate: (usize, MatchSpan),
    best: Option<(usize, MatchSpan)>,
) -> bool {
    let Some((best_edits, best_span)) = best else {
        return true;
    };
    let (edits, span) = candidate;
    edits < best_edits
        || (edits == best_edits
            && span.start == best_span.start
            && span.len().abs_diff(query_len) < best_span.len().abs_diff(query_len))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::domain::post::{Author, PostType};

    fn post(id: &str, message: &str) -> Post {
        Post {
            id: id.to_string(),
            message: message.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            author: Author::default(),
            post_type: PostType::OfferingLease,
            duration: None,
            price_range: None,
            amenities: Vec::new(),
            desired_gender: None,
        }
    }

    fn slice(text: &str, span: MatchSpan) -> String {
        text.chars().skip(span.start).take(span.end - span.start).collect()
    }

    #[test]
    fn exact_word_inside_message() {
        let matcher = KeywordMatcher::default();
        let text = "fully furnished apartment";
        let found = matcher.find("furnished", text).unwrap();
        assert_eq!(found.span, MatchSpan { start: 6, end: 15 });
        assert_eq!(slice(text, found.span), "furnished");
        assert_eq!(found.similarity, 1.0);
    }

    #[test]
    fn partial_word_matches_exactly() {
        let matcher = KeywordMatcher::default();
        let text = "fully furnished apartment";
        let found = matcher.find("furnish", text).unwrap();
        assert_eq!(slice(text, found.span), "furnish");
        assert_eq!(found.similarity, 1.0);
    }

    #[test]
    fn transposed_letters_still_match() {
        let matcher = KeywordMatcher::default();
        let text = "fully furnished apartment";
        for typo in ["furnsihed", "funrished"] {
            let found = matcher.find(typo, text).unwrap();
            assert_eq!(found.span, MatchSpan { start: 6, end: 15 }, "{typo}");
            assert!((found.similarity - 8.0 / 9.0).abs() < 1e-9, "{typo}");
        }
    }

    #[test]
    fn substituted_letter_still_matches() {
        let matcher = KeywordMatcher::default();
        let text = "two bedroom apartment";
        let found = matcher.find("bedroon", text).unwrap();
        assert_eq!(slice(text, found.span), "bedroom");
    }

    #[test]
    fn scattered_letters_do_not_match() {
        let matcher = KeywordMatcher::default();
        assert!(
            matcher
                .find("parking", "private apartment, working kitchen, garage")
                .is_none()
        );
        assert!(matcher.find("furnished", "fun in the sun, relished").is_none());
    }

    #[test]
    fn threshold_bounds_the_edit_budget() {
        let strict = KeywordMatcher::new(1.0);
        assert!(strict.find("furnsihed", "fully furnished apartment").is_none());
        assert!(strict.find("furnished", "fully furnished apartment").is_some());

        let loose = KeywordMatcher::new(0.7);
        let text = "private apartment, working kitchen, garage";
        let found = loose.find("parking", text).unwrap();
        assert_eq!(slice(text, found.span), "working");
    }

    #[test]
    fn matching_ignores_case() {
        let matcher = KeywordMatcher::default();
        let text = "Fully Furnished apartment";
        let found = matcher.find("FURNISHED", text).unwrap();
        assert_eq!(slice(text, found.span), "Furnished");
    }

    #[test]
    fn spans_count_characters_not_bytes() {
        let matcher = KeywordMatcher::default();
        let text = "Café près du parc, furnished";
        let found = matcher.find("furnished", text).unwrap();
        assert_eq!(slice(text, found.span), "furnished");
        assert_eq!(found.span.start, 19);
    }

    #[test]
    fn search_keeps_only_matching_posts() {
        let matcher = KeywordMatcher::default();
        let posts = vec![
            post("a", "fully furnished apartment"),
            post("b", "room near the park"),
            post("c", "Furnished studio"),
        ];
        let result = matcher.search("furnished", &posts);
        assert_eq!(result.len(), 2);
        assert!(result.contains_key("a"));
        assert!(result.contains_key("c"));
        assert!(!result.contains_key("b"));
    }

    #[test]
    fn no_approximate_match_gives_empty_result() {
        let matcher = KeywordMatcher::default();
        let posts = vec![
            post("a", "fully furnished apartment"),
            post("b", "room near the park"),
        ];
        assert!(matcher.search("garage", &posts).is_empty());
    }

    #[test]
    fn blank_query_matches_nothing() {
        let matcher = KeywordMatcher::default();
        let posts = vec![post("a", "anything at all")];
        assert!(matcher.search("   ", &posts).is_empty());
        assert!(matcher.find("", "anything").is_none());
    }
}
