use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::post::{Gender, PostType};
use crate::error::CoreError;
use crate::types::move_date::parse_user_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchTypeFilter {
    #[default]
    All,
    SearchingFor,
    Offering,
}

impl SearchTypeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchTypeFilter::All => "all",
            SearchTypeFilter::SearchingFor => "searching_for",
            SearchTypeFilter::Offering => "offering",
        }
    }

    /// The post type this filter selects, or `None` for `all`.
    pub fn post_type(&self) -> Option<PostType> {
        match self {
            SearchTypeFilter::All => None,
            SearchTypeFilter::SearchingFor => Some(PostType::SearchingForLease),
            SearchTypeFilter::Offering => Some(PostType::OfferingLease),
        }
    }
}

impl FromStr for SearchTypeFilter {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" | "all" => Ok(SearchTypeFilter::All),
            "searching_for" => Ok(SearchTypeFilter::SearchingFor),
            "offering" => Ok(SearchTypeFilter::Offering),
            other => Err(CoreError::InvalidSearchType(other.to_string())),
        }
    }
}

/// The user's filter state. Every field is optional and an unset field never
/// excludes a post.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub search_type: SearchTypeFilter,
    pub low_price: Option<u32>,
    pub high_price: Option<u32>,
    pub move_in_date: Option<NaiveDate>,
    pub move_out_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub keyword: Option<String>,
}

impl FilterCriteria {
    /// Trimmed keyword, `None` when blank.
    pub fn keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Query-string pairs for the non-empty fields only.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.search_type != SearchTypeFilter::All {
            pairs.push(("searchType", self.search_type.as_str().to_string()));
        }
        if let Some(low) = self.low_price {
            pairs.push(("lowPrice", low.to_string()));
        }
        if let Some(high) = self.high_price {
            pairs.push(("highPrice", high.to_string()));
        }
        if let Some(date) = self.move_in_date {
            pairs.push(("moveInDate", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = self.move_out_date {
            pairs.push(("moveOutDate", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(gender) = self.gender {
            pairs.push(("gender", gender.as_str().to_string()));
        }
        if let Some(keyword) = self.keyword() {
            pairs.push(("keyword", keyword.to_string()));
        }
        pairs
    }
}

/// Filter fields as they arrive on the wire, all string-encoded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    pub search_type: Option<String>,
    pub low_price: Option<String>,
    pub high_price: Option<String>,
    pub move_in_date: Option<String>,
    pub move_out_date: Option<String>,
    pub gender: Option<String>,
    pub keyword: Option<String>,
}

impl TryFrom<&FilterParams> for FilterCriteria {
    type Error = CoreError;

    fn try_from(params: &FilterParams) -> Result<Self, Self::Error> {
        let search_type = params
            .search_type
            .as_deref()
            .map(SearchTypeFilter::from_str)
            .transpose()?
            .unwrap_or_default();
        let gender = match params.gender.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(value.parse()?),
        };
        Ok(FilterCriteria {
            search_type,
            low_price: parse_price(params.low_price.as_deref().unwrap_or_default())?,
            high_price: parse_price(params.high_price.as_deref().unwrap_or_default())?,
            move_in_date: parse_user_date(params.move_in_date.as_deref().unwrap_or_default())?,
            move_out_date: parse_user_date(params.move_out_date.as_deref().unwrap_or_default())?,
            gender,
            keyword: params
                .keyword
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
        })
    }
}

/// Parses a string-encoded price bound. Empty and zero both mean "unset".
pub fn parse_price(input: &str) -> Result<Option<u32>, CoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: u32 = trimmed
        .parse()
        .map_err(|_| CoreError::InvalidPrice(trimmed.to_string()))?;
    Ok((value > 0).then_some(value))
}
