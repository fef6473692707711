use chrono::{Datelike, NaiveDate};

use crate::error::CoreError;

/// Which day a month-only date (`M/YYYY`, `M/YY`) resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthAnchor {
    Start,
    End,
}

/// Inclusive ± day window around a user-chosen date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    days: u32,
}

impl DateWindow {
    pub const fn new(days: u32) -> Self {
        Self { days }
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn contains(&self, center: NaiveDate, date: NaiveDate) -> bool {
        (date - center).num_days().abs() <= i64::from(self.days)
    }
}

impl Default for DateWindow {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Parses a lease date as written on a post: `M/D/YYYY`, `M/D/YY`, `M/YYYY`
/// or `M/YY`. Returns `None` for anything else.
pub fn parse_post_date(input: &str, anchor: MonthAnchor) -> Option<NaiveDate> {
    let parts: Vec<&str> = input.trim().split('/').collect();
    match parts.as_slice() {
        [month, day, year] => {
            let month = parse_component(month, 1, 2)?;
            let day = parse_component(day, 1, 2)?;
            let year = parse_year(year)?;
            NaiveDate::from_ymd_opt(year, month, day)
        }
        [month, year] => {
            let month = parse_component(month, 1, 2)?;
            let year = parse_year(year)?;
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            match anchor {
                MonthAnchor::Start => Some(first),
                MonthAnchor::End => last_day_of_month(first),
            }
        }
        _ => None,
    }
}

/// Parses the `YYYY-MM-DD` date a user picks for move-in or move-out. Empty
/// input means the filter is unset.
pub fn parse_user_date(input: &str) -> Result<Option<NaiveDate>, CoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| CoreError::InvalidDate(trimmed.to_string()))
}

/// Accepts zero-padded fields (`06/05/2024`) as well as bare ones; posts in
/// the wild mix both.
fn parse_component(value: &str, min_len: usize, max_len: usize) -> Option<u32> {
    if value.len() < min_len || value.len() > max_len || !value.chars().all(|ch| ch.is_ascii_digit())
    {
        return None;
    }
    value.parse().ok()
}

fn parse_year(value: &str) -> Option<i32> {
    match value.len() {
        4 => parse_component(value, 4, 4).map(|year| year as i32),
        // Two-digit years above 68 land in the 1900s.
        2 => parse_component(value, 2, 2).map(|year| {
            let year = year as i32;
            if year > 68 { 1900 + year } else { 2000 + year }
        }),
        _ => None,
    }
}

fn last_day_of_month(first: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
}
