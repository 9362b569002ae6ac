//! Resolved place data and the crawl result envelope.
//!
//! Every field the upstream provider may omit is an `Option`. Missing data is
//! never replaced with a numeric or string fallback: the filter engine relies
//! on `None` meaning "unavailable".

use serde::{Deserialize, Serialize};

use crate::request::SearchRequest;

/// A place identifier discovered by a text search, pending detail resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRef {
    pub place_id: String,
}

impl CandidateRef {
    #[must_use]
    pub fn new(place_id: impl Into<String>) -> Self {
        Self {
            place_id: place_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Full detail for one place, created exactly once per [`CandidateRef`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub place_id: String,
    pub name: String,
    pub rating: Option<f64>,
    #[serde(rename = "amount_of_ratings")]
    pub rating_count: Option<u32>,
    pub address: Option<String>,
    #[serde(rename = "phone_number")]
    pub phone: Option<String>,
    pub maps_url: Option<String>,
    pub website_url: Option<String>,
    pub opening_hours: Option<OpeningHours>,
    /// Serialized as `[lat, lng]`, or `[]` when the provider sent no geometry.
    #[serde(default, with = "location_pair")]
    pub location: Option<LatLng>,
}

impl PlaceRecord {
    /// A record carrying only the identifier and name; every optional field
    /// is unavailable.
    #[must_use]
    pub fn bare(place_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            place_id: place_id.into(),
            name: name.into(),
            rating: None,
            rating_count: None,
            address: None,
            phone: None,
            maps_url: None,
            website_url: None,
            opening_hours: None,
            location: None,
        }
    }
}

/// Weekly opening hours as reported upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_now: Option<bool>,
    #[serde(default)]
    pub periods: Vec<Period>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weekday_text: Vec<String>,
}

impl OpeningHours {
    /// The period stored at position `day` (0 = Sunday .. 6 = Saturday).
    ///
    /// A missing slot means the place is closed that day or the provider has
    /// no data; the two cases are indistinguishable.
    #[must_use]
    pub fn period(&self, day: u8) -> Option<&Period> {
        self.periods.get(usize::from(day))
    }
}

/// One opening window. Places open around the clock report no `close`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<PeriodPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<PeriodPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u8>,
    /// `"HHMM"` in 24-hour time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl PeriodPoint {
    #[must_use]
    pub fn new(day: u8, time: impl Into<String>) -> Self {
        Self {
            day: Some(day),
            time: Some(time.into()),
        }
    }
}

/// Outcome of one crawl. `count` is always derived from `places`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlResult {
    request: SearchRequest,
    count: usize,
    places: Vec<PlaceRecord>,
}

impl CrawlResult {
    #[must_use]
    pub fn new(request: SearchRequest, places: Vec<PlaceRecord>) -> Self {
        Self {
            request,
            count: places.len(),
            places,
        }
    }

    #[must_use]
    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn places(&self) -> &[PlaceRecord] {
        &self.places
    }
}

mod location_pair {
    use serde::de::Error as _;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::LatLng;

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        location: &Option<LatLng>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match location {
            Some(LatLng { lat, lng }) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(lat)?;
                seq.serialize_element(lng)?;
                seq.end()
            }
            None => serializer.serialize_seq(Some(0))?.end(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<LatLng>, D::Error> {
        let pair = Option::<Vec<f64>>::deserialize(deserializer)?.unwrap_or_default();
        match pair.as_slice() {
            [] => Ok(None),
            [lat, lng] => Ok(Some(LatLng {
                lat: *lat,
                lng: *lng,
            })),
            other => Err(D::Error::invalid_length(
                other.len(),
                &"an empty list or a [lat, lng] pair",
            )),
        }
    }
}
