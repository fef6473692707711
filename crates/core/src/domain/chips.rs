use serde::Serialize;

use crate::domain::filter::{FilterCriteria, SearchTypeFilter};
use crate::domain::post::Post;
use crate::domain::predicates;
use crate::types::move_date::DateWindow;

/// Every filterable attribute, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    SearchType,
    LowPrice,
    HighPrice,
    MoveInDate,
    MoveOutDate,
    Gender,
}

/// A set filter rendered as a removable chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterChip {
    pub kind: FilterKind,
    pub label: &'static str,
    pub value: String,
    pub clearable: bool,
}

impl FilterKind {
    pub const ALL: [FilterKind; 6] = [
        FilterKind::SearchType,
        FilterKind::LowPrice,
        FilterKind::HighPrice,
        FilterKind::MoveInDate,
        FilterKind::MoveOutDate,
        FilterKind::Gender,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            FilterKind::SearchType => "search-type",
            FilterKind::LowPrice => "low-price",
            FilterKind::HighPrice => "high-price",
            FilterKind::MoveInDate => "move-in-date",
            FilterKind::MoveOutDate => "move-out-date",
            FilterKind::Gender => "gender",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterKind::SearchType => "Search Type",
            FilterKind::LowPrice => "Low Price",
            FilterKind::HighPrice => "High Price",
            FilterKind::MoveInDate => "Move-in Date",
            FilterKind::MoveOutDate => "Move-out Date",
            FilterKind::Gender => "Gender",
        }
    }

    /// The search type always has a value and can only be switched, not removed.
    pub fn is_clearable(&self) -> bool {
        !matches!(self, FilterKind::SearchType)
    }

    pub fn value(&self, criteria: &FilterCriteria) -> Option<String> {
        match self {
            FilterKind::SearchType => Some(criteria.search_type.as_str().to_string()),
            FilterKind::LowPrice => criteria.low_price.map(|price| price.to_string()),
            FilterKind::HighPrice => criteria.high_price.map(|price| price.to_string()),
            FilterKind::MoveInDate => criteria
                .move_in_date
                .map(|date| date.format("%m/%d").to_string()),
            FilterKind::MoveOutDate => criteria
                .move_out_date
                .map(|date| date.format("%m/%d").to_string()),
            FilterKind::Gender => criteria.gender.map(|gender| gender.to_string()),
        }
    }

    pub fn clear(&self, criteria: &mut FilterCriteria) {
        match self {
            FilterKind::SearchType => criteria.search_type = SearchTypeFilter::All,
            FilterKind::LowPrice => criteria.low_price = None,
            FilterKind::HighPrice => criteria.high_price = None,
            FilterKind::MoveInDate => criteria.move_in_date = None,
            FilterKind::MoveOutDate => criteria.move_out_date = None,
            FilterKind::Gender => criteria.gender = None,
        }
    }

    pub fn is_satisfied(&self, criteria: &FilterCriteria, post: &Post, window: DateWindow) -> bool {
        match self {
            FilterKind::SearchType => {
                predicates::satisfies_search_type(criteria.search_type, post.post_type)
            }
            FilterKind::LowPrice => {
                predicates::satisfies_low_price(criteria.low_price, post.price_low(), post.price_high())
            }
            FilterKind::HighPrice => predicates::satisfies_high_price(
                criteria.high_price,
                post.price_low(),
                post.price_high(),
            ),
            FilterKind::MoveInDate => {
                predicates::satisfies_move_in_date(criteria.move_in_date, post.move_in(), window)
            }
            FilterKind::MoveOutDate => {
                predicates::satisfies_move_out_date(criteria.move_out_date, post.move_out(), window)
            }
            FilterKind::Gender => predicates::satisfies_gender(criteria.gender, post.desired_gender),
        }
    }
}

pub fn active_chips(criteria: &FilterCriteria) -> Vec<FilterChip> {
    FilterKind::ALL
        .iter()
        .filter_map(|kind| {
            kind.value(criteria).map(|value| FilterChip {
                kind: *kind,
                label: kind.label(),
                value,
                clearable: kind.is_clearable(),
            })
        })
        .collect()
}
