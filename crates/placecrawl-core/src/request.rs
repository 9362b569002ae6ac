//! Crawl input: the free-text query and the declarative filter specification.
//!
//! Wire names follow the JSON the search form has always sent
//! (`searchString`, `minimum_amount_of_ratings`, `rating_range`,
//! `opening_hours`), so existing callers keep working unchanged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Input to a single crawl. Read-only once the crawl starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(rename = "searchString")]
    pub query: String,
    #[serde(default)]
    pub filters: FilterSpec,
}

/// Filter predicates to apply to resolved places. Every field is optional;
/// an absent field means "no constraint of this kind".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(
        rename = "minimum_amount_of_ratings",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub min_rating_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_range: Option<RatingRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<OpeningHoursFilter>,
}

/// Inclusive rating bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingRange {
    pub from: f64,
    pub to: f64,
}

/// Requested visiting window on one weekday (0 = Sunday .. 6 = Saturday).
///
/// `from` and `to` are `"HHMM"` strings. Either may be missing or empty, in
/// which case only the presence of a period for `day` is checked for that
/// bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHoursFilter {
    pub day: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

/// Reasons a [`SearchRequest`] is refused before any upstream call is made.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("search string must not be empty")]
    EmptyQuery,

    #[error("rating range is inverted or not a number: from {from} to {to}")]
    InvertedRatingRange { from: f64, to: f64 },

    #[error("opening hours day must be between 0 (Sunday) and 6 (Saturday), got {0}")]
    InvalidWeekday(u8),

    #[error("opening hours {field} must be a 24-hour HHMM time, got \"{value}\"")]
    InvalidTime { field: &'static str, value: String },
}

impl SearchRequest {
    #[must_use]
    pub fn new(query: impl Into<String>, filters: FilterSpec) -> Self {
        Self {
            query: query.into(),
            filters,
        }
    }

    /// Checks the request before a crawl is started.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found: an empty query, an
    /// inverted rating range, an out-of-range weekday, or a non-empty time
    /// bound that is not a valid `HHMM` string.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }

        if let Some(range) = self.filters.rating_range {
            if range.from.is_nan() || range.to.is_nan() || range.from > range.to {
                return Err(ValidationError::InvertedRatingRange {
                    from: range.from,
                    to: range.to,
                });
            }
        }

        if let Some(window) = &self.filters.opening_hours {
            if window.day > 6 {
                return Err(ValidationError::InvalidWeekday(window.day));
            }
            for (field, value) in [("from", &window.from), ("to", &window.to)] {
                match value.as_deref() {
                    None | Some("") => {}
                    Some(v) if is_hhmm(v) => {}
                    Some(v) => {
                        return Err(ValidationError::InvalidTime {
                            field,
                            value: v.to_owned(),
                        })
                    }
                }
            }
        }

        Ok(())
    }
}

fn is_hhmm(value: &str) -> bool {
    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let hour: u32 = value[..2].parse().unwrap_or(u32::MAX);
    let minute: u32 = value[2..].parse().unwrap_or(u32::MAX);
    hour < 24 && minute < 60
}
