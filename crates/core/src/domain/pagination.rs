//! Page bookkeeping for the filtered cursor scan.
//!
//! A page holds every document scanned, matching or not. The scan stops once
//! `PAGE_SIZE` matches have been seen and the scanned count sits on a
//! `PAGE_SIZE` boundary, or when the source runs out. Positions are absolute
//! document offsets; clients see them as page numbers in units of
//! `PAGE_SIZE`, fractional when the source ended mid-batch.

use serde::{Deserialize, Serialize};

use crate::domain::filter::FilterCriteria;
use crate::domain::post::Post;
use crate::error::CoreError;

pub const PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct PageCursor {
    offset: u64,
}

impl PageCursor {
    pub const START: PageCursor = PageCursor { offset: 0 };

    pub fn from_offset(offset: u64) -> Self {
        Self { offset }
    }

    pub fn from_page_num(page_num: f64) -> Result<Self, CoreError> {
        if !page_num.is_finite() || page_num < 0.0 {
            return Err(CoreError::InvalidPage(page_num.to_string()));
        }
        let offset = (page_num * PAGE_SIZE as f64).round();
        if offset > u64::MAX as f64 {
            return Err(CoreError::InvalidPage(page_num.to_string()));
        }
        Ok(Self {
            offset: offset as u64,
        })
    }

    /// Parses the `page` query parameter. Missing or blank means the first page.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self::START);
        }
        let page_num: f64 = trimmed
            .parse()
            .map_err(|_| CoreError::InvalidPage(trimmed.to_string()))?;
        Self::from_page_num(page_num)
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn page_num(&self) -> f64 {
        self.offset as f64 / PAGE_SIZE as f64
    }

    pub fn advance(self, scanned: usize) -> Self {
        Self {
            offset: self.offset.saturating_add(scanned as u64),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub cursor: PageCursor,
    pub criteria: FilterCriteria,
}

impl PageRequest {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.cursor.page_num().to_string())];
        pairs.extend(self.criteria.to_query_pairs());
        pairs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStep {
    Continue,
    Full,
}

/// Accumulates one page while the caller walks the ordered source.
#[derive(Debug)]
pub struct PageScan {
    start: PageCursor,
    posts: Vec<Post>,
    matched: usize,
}

impl PageScan {
    pub fn new(start: PageCursor) -> Self {
        Self {
            start,
            posts: Vec::with_capacity(PAGE_SIZE),
            matched: 0,
        }
    }

    pub fn push(&mut self, post: Post, matched: bool) -> ScanStep {
        if matched {
            self.matched += 1;
        }
        self.posts.push(post);
        if self.matched >= PAGE_SIZE && self.posts.len() % PAGE_SIZE == 0 {
            ScanStep::Full
        } else {
            ScanStep::Continue
        }
    }

    pub fn scanned(&self) -> usize {
        self.posts.len()
    }

    pub fn matched(&self) -> usize {
        self.matched
    }

    pub fn finish(self, exhausted: bool) -> Page {
        let next = self.start.advance(self.posts.len());
        Page {
            start: self.start,
            next,
            matched: self.matched,
            exhausted,
            results: self.posts,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub start: PageCursor,
    pub next: PageCursor,
    pub matched: usize,
    pub exhausted: bool,
    pub results: Vec<Post>,
}

/// Wire shape of `GET /posts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub results: Vec<Post>,
    pub next_page_num: f64,
    pub exhausted: bool,
    pub match_count: usize,
}

impl From<Page> for PageResponse {
    fn from(page: Page) -> Self {
        Self {
            next_page_num: page.next.page_num(),
            exhausted: page.exhausted,
            match_count: page.matched,
            results: page.results,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::domain::post::{Author, PostType};

    fn post(index: usize) -> Post {
        Post {
            id: format!("p{index}"),
            message: String::new(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            author: Author::default(),
            post_type: PostType::OfferingLease,
            duration: None,
            price_range: None,
            amenities: Vec::new(),
            desired_gender: None,
        }
    }

    #[test]
    fn parse_page_numbers() {
        assert_eq!(PageCursor::parse("").unwrap(), PageCursor::START);
        assert_eq!(PageCursor::parse("2").unwrap().offset(), 40);
        assert_eq!(PageCursor::parse("1.35").unwrap().offset(), 27);
        assert!(matches!(PageCursor::parse("abc"), Err(CoreError::InvalidPage(_))));
        assert!(PageCursor::parse("-1").is_err());
        assert!(PageCursor::parse("NaN").is_err());
        assert!(PageCursor::parse("inf").is_err());
    }

    #[test]
    fn page_numbers_round_trip_through_offsets() {
        for offset in [0_u64, 1, 7, 19, 20, 27, 133, 4001] {
            let cursor = PageCursor::from_offset(offset);
            let parsed = PageCursor::parse(&cursor.page_num().to_string()).unwrap();
            assert_eq!(parsed, cursor);
        }
    }

    #[test]
    fn scan_stops_on_aligned_full_batch() {
        let mut scan = PageScan::new(PageCursor::START);
        for index in 0..(PAGE_SIZE - 1) {
            assert_eq!(scan.push(post(index), true), ScanStep::Continue);
        }
        assert_eq!(scan.push(post(PAGE_SIZE - 1), true), ScanStep::Full);
        let page = scan.finish(false);
        assert_eq!(page.results.len(), PAGE_SIZE);
        assert_eq!(page.next.page_num(), 1.0);
    }

    #[test]
    fn scan_runs_past_threshold_to_batch_boundary() {
        let mut scan = PageScan::new(PageCursor::START);
        // No matches in the first 5, then everything matches: the 20th match
        // lands on document 25, and the scan continues to document 40.
        let mut steps = Vec::new();
        for index in 0..40 {
            steps.push(scan.push(post(index), index >= 5));
        }
        assert!(steps[..39].iter().all(|step| *step == ScanStep::Continue));
        assert_eq!(steps[39], ScanStep::Full);
        assert_eq!(scan.matched(), 35);
        assert_eq!(scan.scanned(), 40);
    }

    #[test]
    fn exhausted_scan_reports_fractional_next_page() {
        let mut scan = PageScan::new(PageCursor::from_offset(40));
        for index in 0..7 {
            scan.push(post(index), index % 2 == 0);
        }
        let response = PageResponse::from(scan.finish(true));
        assert_eq!(response.results.len(), 7);
        assert_eq!(response.match_count, 4);
        assert!(response.exhausted);
        assert!((response.next_page_num - 2.35).abs() < 1e-9);
    }

    #[test]
    fn request_query_includes_page_and_set_filters() {
        let request = PageRequest {
            cursor: PageCursor::from_offset(30),
            criteria: FilterCriteria {
                keyword: Some("quiet".to_string()),
                ..FilterCriteria::default()
            },
        };
        assert_eq!(
            request.to_query_pairs(),
            vec![("page", "1.5".to_string()), ("keyword", "quiet".to_string())]
        );
    }
}
