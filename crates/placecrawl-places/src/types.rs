//! Google Places API response types.
//!
//! Both endpoints wrap their payload in a `{"status": "OK", ...}` envelope.
//! The status is checked on the raw JSON before these types are parsed, so
//! they only model the success shape.

use placecrawl_core::{LatLng, OpeningHours, PlaceRecord};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// place/textsearch
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct TextSearchResponse {
    #[serde(default)]
    pub results: Vec<TextSearchResult>,
    /// Present only when another page exists. Becomes valid a short time
    /// after it is issued.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A single text-search hit. Only the identifier is used; detail fields are
/// fetched separately.
#[derive(Debug, Deserialize)]
pub struct TextSearchResult {
    pub place_id: String,
}

// ---------------------------------------------------------------------------
// place/details
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DetailsResponse {
    pub result: PlaceDetail,
}

#[derive(Debug, Deserialize)]
pub struct PlaceDetail {
    pub name: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    /// Google Maps page for the place.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub location: Option<LatLng>,
}

impl PlaceDetail {
    /// Maps the raw detail payload onto a [`PlaceRecord`] for `place_id`.
    #[must_use]
    pub fn into_record(self, place_id: &str) -> PlaceRecord {
        PlaceRecord {
            place_id: place_id.to_owned(),
            name: self.name,
            rating: self.rating,
            rating_count: self.user_ratings_total,
            address: self.formatted_address,
            phone: self.formatted_phone_number,
            maps_url: self.url,
            website_url: self.website,
            opening_hours: self.opening_hours,
            location: self.geometry.and_then(|g| g.location),
        }
    }
}
