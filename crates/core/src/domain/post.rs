use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A scraped listing. Posts are append-only: once stored they never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(rename = "msg")]
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub author: Author,
    pub post_type: PostType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<LeaseDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub amenities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_gender: Option<Gender>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "profileImgUrl", default)]
    pub profile_img_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    SearchingForLease,
    OfferingLease,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::SearchingForLease => "searching_for_lease",
            PostType::OfferingLease => "offering_lease",
        }
    }
}

impl FromStr for PostType {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "searching_for_lease" => Ok(PostType::SearchingForLease),
            "offering_lease" => Ok(PostType::OfferingLease),
            other => Err(CoreError::InvalidPostType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(CoreError::InvalidGender(other.to_string())),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monthly rent bounds as extracted from the post. Either side may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<u32>,
}

/// Move-in (`start`) and move-out (`end`) as free-form date strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LeaseDuration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl Post {
    pub fn price_low(&self) -> Option<u32> {
        self.price_range.and_then(|range| range.low)
    }

    pub fn price_high(&self) -> Option<u32> {
        self.price_range.and_then(|range| range.high)
    }

    pub fn move_in(&self) -> Option<&str> {
        self.duration.as_ref()?.start.as_deref()
    }

    pub fn move_out(&self) -> Option<&str> {
        self.duration.as_ref()?.end.as_deref()
    }
}
