//! Filter engine: keeps the places that pass every configured predicate.
//!
//! Predicates are ANDed. A record missing the data a predicate needs fails
//! that predicate; nothing here returns an error.

use std::cmp::Ordering;

use crate::places::PlaceRecord;
use crate::request::{FilterSpec, OpeningHoursFilter, RatingRange};

/// Returns the subset of `places` that no active predicate in `spec`
/// rejects, preserving input order.
#[must_use]
pub fn apply(places: Vec<PlaceRecord>, spec: &FilterSpec) -> Vec<PlaceRecord> {
    places
        .into_iter()
        .filter(|place| !is_rejected(place, spec))
        .collect()
}

/// `true` if any predicate configured in `spec` rejects `place`.
#[must_use]
pub fn is_rejected(place: &PlaceRecord, spec: &FilterSpec) -> bool {
    spec.min_rating_count
        .is_some_and(|min| rejects_by_rating_count(place, min))
        || spec
            .rating_range
            .is_some_and(|range| rejects_by_rating_range(place, range))
        || spec
            .opening_hours
            .as_ref()
            .is_some_and(|window| rejects_by_opening_hours(place, window))
}

fn rejects_by_rating_count(place: &PlaceRecord, min: u32) -> bool {
    place.rating_count.is_none_or(|count| count < min)
}

fn rejects_by_rating_range(place: &PlaceRecord, range: RatingRange) -> bool {
    place
        .rating
        .is_none_or(|rating| rating < range.from || rating > range.to)
}

/// Rejects when the place has no period for the requested day, opens after
/// the requested start, or closes before the requested end on the same day.
///
/// The "closes too early" check only applies when `close.day` equals the
/// requested day. A close on another day is an overnight window; an absent
/// `close.day` skips the check as well.
fn rejects_by_opening_hours(place: &PlaceRecord, window: &OpeningHoursFilter) -> bool {
    let Some(period) = place
        .opening_hours
        .as_ref()
        .and_then(|hours| hours.period(window.day))
    else {
        return true;
    };

    let opening_time = period.open.as_ref().and_then(|p| p.time.as_deref());
    let closing_time = period.close.as_ref().and_then(|p| p.time.as_deref());
    let closing_day = period.close.as_ref().and_then(|p| p.day);

    let opens_too_late = time_compare(window.from.as_deref(), opening_time) == Ordering::Less;
    let closes_too_early = time_compare(window.to.as_deref(), closing_time) == Ordering::Greater
        && closing_day == Some(window.day);

    opens_too_late || closes_too_early
}

/// Compares two `"HHMM"` strings, hour first, then minute.
///
/// An absent or empty string on either side compares as `Equal`. Hour and
/// minute are read from characters 0–1 and 2–3 of the trimmed string as
/// leading-digit integers; a field that does not parse on either side is
/// treated as equal for that field.
#[must_use]
pub fn time_compare(a: Option<&str>, b: Option<&str>) -> Ordering {
    let (Some(a), Some(b)) = (a.filter(|s| !s.is_empty()), b.filter(|s| !s.is_empty())) else {
        return Ordering::Equal;
    };
    let (a, b) = (a.trim(), b.trim());

    compare_field(time_field(a, 0), time_field(b, 0))
        .then_with(|| compare_field(time_field(a, 2), time_field(b, 2)))
}

fn compare_field(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => Ordering::Equal,
    }
}

/// Two-character field starting at `start`, parsed from its leading digits.
fn time_field(time: &str, start: usize) -> Option<u32> {
    let end = (start + 2).min(time.len());
    let field = time.get(start.min(end)..end)?;
    let digits = field
        .find(|c: char| !c.is_ascii_digit())
        .map_or(field, |idx| &field[..idx]);
    digits.parse().ok()
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
