//! One predicate per filterable attribute. An unset criterion never excludes
//! a post.

use chrono::NaiveDate;

use crate::domain::chips::FilterKind;
use crate::domain::filter::{FilterCriteria, SearchTypeFilter};
use crate::domain::keyword::KeywordMatcher;
use crate::domain::post::{Gender, Post, PostType};
use crate::types::move_date::{parse_post_date, DateWindow, MonthAnchor};

pub fn satisfies_search_type(desired: SearchTypeFilter, post_type: PostType) -> bool {
    desired.post_type().is_none_or(|wanted| wanted == post_type)
}

/// Both of the post's bounds must reach the minimum. A missing bound does not
/// count against the post.
pub fn satisfies_low_price(min: Option<u32>, post_low: Option<u32>, post_high: Option<u32>) -> bool {
    let Some(min) = min else {
        return true;
    };
    post_low.is_none_or(|low| min <= low) && post_high.is_none_or(|high| min <= high)
}

/// Both of the post's bounds must stay within the maximum.
pub fn satisfies_high_price(max: Option<u32>, post_low: Option<u32>, post_high: Option<u32>) -> bool {
    let Some(max) = max else {
        return true;
    };
    post_low.unwrap_or(0) <= max && post_high.unwrap_or(0) <= max
}

pub fn satisfies_move_in_date(
    desired: Option<NaiveDate>,
    post_move_in: Option<&str>,
    window: DateWindow,
) -> bool {
    satisfies_date(desired, post_move_in, MonthAnchor::Start, window)
}

pub fn satisfies_move_out_date(
    desired: Option<NaiveDate>,
    post_move_out: Option<&str>,
    window: DateWindow,
) -> bool {
    satisfies_date(desired, post_move_out, MonthAnchor::End, window)
}

pub fn satisfies_gender(desired: Option<Gender>, post_gender: Option<Gender>) -> bool {
    match (desired, post_gender) {
        (Some(desired), Some(post_gender)) => desired == post_gender,
        _ => true,
    }
}

/// Conjunction of every attribute predicate. The keyword condition is kept
/// separate because the server and the client resolve it differently.
pub fn satisfies_criteria(criteria: &FilterCriteria, post: &Post, window: DateWindow) -> bool {
    FilterKind::ALL
        .iter()
        .all(|kind| kind.is_satisfied(criteria, post, window))
}

/// The full per-document condition the paginator applies: every attribute
/// predicate plus an approximate keyword match against the message.
#[derive(Debug, Clone, Copy)]
pub struct PostFilter<'a> {
    criteria: &'a FilterCriteria,
    window: DateWindow,
    matcher: &'a KeywordMatcher,
}

impl<'a> PostFilter<'a> {
    pub fn new(criteria: &'a FilterCriteria, window: DateWindow, matcher: &'a KeywordMatcher) -> Self {
        Self {
            criteria,
            window,
            matcher,
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        satisfies_criteria(self.criteria, post, self.window)
            && self
                .criteria
                .keyword()
                .is_none_or(|keyword| self.matcher.find(keyword, &post.message).is_some())
    }
}

// An unparseable post date fails the filter once the user has picked a date.
fn satisfies_date(
    desired: Option<NaiveDate>,
    post_date: Option<&str>,
    anchor: MonthAnchor,
    window: DateWindow,
) -> bool {
    let post_date = post_date.map(str::trim).filter(|value| !value.is_empty());
    let (Some(desired), Some(raw)) = (desired, post_date) else {
        return true;
    };
    parse_post_date(raw, anchor).is_some_and(|date| window.contains(desired, date))
}
