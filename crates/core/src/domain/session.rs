use std::collections::HashSet;

use crate::domain::filter::FilterCriteria;
use crate::domain::keyword::{KeywordMatcher, MatchSpan, SearchResult};
use crate::domain::pagination::{PageCursor, PageRequest, PageResponse};
use crate::domain::post::Post;
use crate::domain::predicates::satisfies_criteria;
use crate::error::CoreError;
use crate::types::move_date::DateWindow;

/// Client-side state for one browsing session.
///
/// Held posts are always a prefix of the source order, because every page
/// carries all scanned documents. Any criteria can therefore be re-applied
/// locally without fetching again.
#[derive(Debug)]
pub struct FeedSession {
    criteria: FilterCriteria,
    window: DateWindow,
    matcher: KeywordMatcher,
    posts: Vec<Post>,
    seen: HashSet<String>,
    keyword_matches: SearchResult,
    cursor: PageCursor,
    exhausted: bool,
    loading: bool,
}

impl FeedSession {
    pub fn new(criteria: FilterCriteria, window: DateWindow, matcher: KeywordMatcher) -> Self {
        Self {
            criteria,
            window,
            matcher,
            posts: Vec::new(),
            seen: HashSet::new(),
            keyword_matches: SearchResult::new(),
            cursor: PageCursor::START,
            exhausted: false,
            loading: false,
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn keyword_matches(&self) -> &SearchResult {
        &self.keyword_matches
    }

    /// Claims the in-flight slot. Returns `None` while another load is pending
    /// or once the source is exhausted; callers drop the attempt, they do not
    /// queue it.
    pub fn begin_load(&mut self) -> Option<PageRequest> {
        if self.loading || self.exhausted {
            return None;
        }
        self.loading = true;
        Some(PageRequest {
            cursor: self.cursor,
            criteria: self.criteria.clone(),
        })
    }

    /// Merges a fetched page and releases the in-flight slot. Returns how many
    /// posts were new to the session.
    pub fn complete_load(&mut self, page: PageResponse) -> Result<usize, CoreError> {
        self.loading = false;
        let next = PageCursor::from_page_num(page.next_page_num)?;
        let start = self.posts.len();
        for post in page.results {
            if self.seen.insert(post.id.clone()) {
                self.posts.push(post);
            }
        }
        if let Some(keyword) = self.criteria.keyword() {
            let fresh = self.matcher.search(keyword, &self.posts[start..]);
            self.keyword_matches.extend(fresh);
        }
        self.cursor = self.cursor.max(next);
        self.exhausted = page.exhausted;
        Ok(self.posts.len() - start)
    }

    /// Releases the in-flight slot after a failed fetch. Nothing is retried.
    pub fn abort_load(&mut self) {
        self.loading = false;
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        let keyword_changed = criteria.keyword() != self.criteria.keyword();
        self.criteria = criteria;
        if keyword_changed {
            self.keyword_matches = match self.criteria.keyword() {
                Some(keyword) => self.matcher.search(keyword, &self.posts),
                None => SearchResult::new(),
            };
        }
    }

    /// Held posts that pass the current criteria, in source order.
    pub fn visible(&self) -> Vec<&Post> {
        let keyword_active = self.criteria.keyword().is_some();
        self.posts
            .iter()
            .filter(|post| satisfies_criteria(&self.criteria, post, self.window))
            .filter(|post| !keyword_active || self.keyword_matches.contains_key(&post.id))
            .collect()
    }

    pub fn match_span(&self, post_id: &str) -> Option<MatchSpan> {
        self.keyword_matches.get(post_id).copied()
    }
}
