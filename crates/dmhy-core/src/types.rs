//! Core data types for the dmhy search library
//!
//! Contains the records produced by a search and the query that drives it.

use serde::{Deserialize, Serialize};

/// One row of a dmhy listing
///
/// Field order matches the columns written by [`crate::CsvLayout::Full`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Release time, already in the session's configured format
    pub time: String,

    /// Torrent title as shown in the listing
    pub title: String,

    /// Raw size label (e.g., "1.5GB")
    pub size: String,

    /// Magnet URI taken from the download link
    pub magnet: String,
}

/// Search parameters sent as the listing query string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    /// Free-text keyword
    pub keyword: String,

    /// Category id, must be one of [`crate::AVAILABLE_SORT_IDS`]
    pub sort_id: u32,

    /// Release group id, 0 for any
    pub team_id: u32,

    /// Listing order (e.g., "date-desc")
    pub order: String,
}

impl SearchQuery {
    /// Create a query for `keyword` with default category, team and order
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Self::default()
        }
    }

    pub fn sort_id(mut self, sort_id: u32) -> Self {
        self.sort_id = sort_id;
        self
    }

    pub fn team_id(mut self, team_id: u32) -> Self {
        self.team_id = team_id;
        self
    }

    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = order.into();
        self
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            sort_id: 0,
            team_id: 0,
            order: "date-desc".to_string(),
        }
    }
}

/// Why a search stopped requesting pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// A page came back without a listing
    Exhausted,
    /// The configured page ceiling was reached while pages still had rows
    PageLimit,
}

/// Outcome of a completed search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSummary {
    /// Number of rows collected
    pub results: usize,
    /// Number of pages requested, including the empty terminating one
    pub pages_fetched: u32,
    pub stop: StopReason,
}
