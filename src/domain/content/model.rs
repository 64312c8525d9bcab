use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Resolved post content, the part that ends up spoken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPayload {
    pub title: String,
    #[serde(default, alias = "selftext")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subreddit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// A post as returned by a subreddit listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub score: i64,
    pub over_18: bool,
    #[serde(flatten)]
    pub content: ContentPayload,
}

/// Listing order supported by the content source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortType {
    #[default]
    Hot,
    New,
    Top,
    Rising,
}

impl SortType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortType::Hot => "hot",
            SortType::New => "new",
            SortType::Top => "top",
            SortType::Rising => "rising",
        }
    }
}

impl std::fmt::Display for SortType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hot" => Ok(SortType::Hot),
            "new" => Ok(SortType::New),
            "top" => Ok(SortType::Top),
            "rising" => Ok(SortType::Rising),
            other => Err(format!(
                "unknown sort type '{}', expected one of hot, new, top, rising",
                other
            )),
        }
    }
}
