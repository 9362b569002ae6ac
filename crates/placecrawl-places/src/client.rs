//! HTTP client for the Google Places text-search and details endpoints.
//!
//! Each call issues exactly one GET and checks the `"status"` field of the
//! JSON envelope; anything other than `"OK"` surfaces as
//! [`PlacesError::UpstreamRejected`]. The client never retries. Retry policy
//! belongs to the caller (see [`crate::retry`]).

use std::future::Future;
use std::time::Duration;

use placecrawl_core::{AppConfig, CandidateRef, PlaceRecord};
use reqwest::{Client, Url};

use crate::error::PlacesError;
use crate::types::{DetailsResponse, TextSearchResponse};

const DEFAULT_BASE_URL: &str = placecrawl_core::config::DEFAULT_PLACES_BASE_URL;
const TEXT_SEARCH_PATH: &str = "place/textsearch/json";
const DETAILS_PATH: &str = "place/details/json";

/// One page of text-search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    pub candidates: Vec<CandidateRef>,
    pub next_page_token: Option<String>,
}

/// The two upstream operations a crawl needs.
///
/// [`PlacesClient`] is the production implementation; the pagination driver,
/// detail fetcher and [`crate::Crawler`] are generic over this trait.
pub trait PlacesApi {
    /// Fetches one page of text-search results. With `page_token` set, the
    /// continuation page is requested instead of a fresh search.
    fn search(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> impl Future<Output = Result<SearchPage, PlacesError>> + Send;

    /// Fetches the full detail record for one place.
    fn fetch_detail(
        &self,
        place_id: &str,
    ) -> impl Future<Output = Result<PlaceRecord, PlacesError>> + Send;
}

/// Client for the Google Places web service.
///
/// Use [`PlacesClient::new`] for production or
/// [`PlacesClient::with_base_url`] to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    text_search_url: Url,
    details_url: Url,
}

impl PlacesClient {
    /// Creates a client pointed at the production Places API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client from the loaded application configuration.
    ///
    /// # Errors
    ///
    /// Same as [`PlacesClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, PlacesError> {
        Self::with_base_url(
            &config.places_api_key,
            config.request_timeout_secs,
            &config.user_agent,
            &config.places_base_url,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `join` appends below the base path
        // instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base = Url::parse(&normalised).map_err(|e| invalid_base_url(base_url, e))?;
        let text_search_url = base
            .join(TEXT_SEARCH_PATH)
            .map_err(|e| invalid_base_url(base_url, e))?;
        let details_url = base
            .join(DETAILS_PATH)
            .map_err(|e| invalid_base_url(base_url, e))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            text_search_url,
            details_url,
        })
    }

    /// Runs a text search, or fetches a continuation page when `page_token`
    /// is set (the query is omitted in that case, as the provider expects).
    ///
    /// # Errors
    ///
    /// - [`PlacesError::UpstreamRejected`] if the envelope status is not `OK`.
    /// - [`PlacesError::HttpStatus`] on a non-2xx response.
    /// - [`PlacesError::Http`] on network failure.
    /// - [`PlacesError::Deserialize`] if the body does not match the expected shape.
    pub async fn text_search(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<SearchPage, PlacesError> {
        let url = match page_token {
            Some(token) => self.build_url(&self.text_search_url, &[("pagetoken", token)]),
            None => self.build_url(&self.text_search_url, &[("query", query)]),
        };
        let body = self.request_json("textsearch", &url).await?;
        Self::check_status("textsearch", &body)?;

        let page: TextSearchResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("textsearch(query={query})"),
                source: e,
            })?;

        Ok(SearchPage {
            candidates: page
                .results
                .into_iter()
                .map(|r| CandidateRef::new(r.place_id))
                .collect(),
            next_page_token: page.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    /// Fetches the detail record for `place_id`.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::UpstreamRejected`] if the envelope status is not `OK`.
    /// - [`PlacesError::HttpStatus`] on a non-2xx response.
    /// - [`PlacesError::Http`] on network failure.
    /// - [`PlacesError::Deserialize`] if the body does not match the expected shape.
    pub async fn place_details(&self, place_id: &str) -> Result<PlaceRecord, PlacesError> {
        let url = self.build_url(&self.details_url, &[("place_id", place_id)]);
        let body = self.request_json("details", &url).await?;
        Self::check_status("details", &body)?;

        let envelope: DetailsResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("details(place_id={place_id})"),
                source: e,
            })?;

        Ok(envelope.result.into_record(place_id))
    }

    /// Appends the endpoint parameters followed by the API key, with every
    /// value percent-encoded by [`Url::query_pairs_mut`].
    fn build_url(&self, endpoint: &Url, params: &[(&str, &str)]) -> Url {
        let mut url = endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        url
    }

    /// Sends a GET request, requires a 2xx HTTP status, and parses the body
    /// as JSON.
    async fn request_json(
        &self,
        operation: &str,
        url: &Url,
    ) -> Result<serde_json::Value, PlacesError> {
        // Strip the URL from transport errors: it carries the API key.
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlacesError::HttpStatus {
                operation: operation.to_owned(),
                status: status.as_u16(),
            });
        }
        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: format!("{operation} response body"),
            source: e,
        })
    }

    /// Requires the envelope `"status"` to be `"OK"`.
    fn check_status(operation: &str, body: &serde_json::Value) -> Result<(), PlacesError> {
        let status = body.get("status").and_then(serde_json::Value::as_str);
        if status == Some("OK") {
            return Ok(());
        }
        let message = body
            .get("error_message")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned);
        Err(PlacesError::UpstreamRejected {
            operation: operation.to_owned(),
            status: status.unwrap_or("MISSING_STATUS").to_owned(),
            message,
        })
    }
}

fn invalid_base_url(base_url: &str, reason: impl std::fmt::Display) -> PlacesError {
    PlacesError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason: reason.to_string(),
    }
}

impl PlacesApi for PlacesClient {
    async fn search(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<SearchPage, PlacesError> {
        self.text_search(query, page_token).await
    }

    async fn fetch_detail(&self, place_id: &str) -> Result<PlaceRecord, PlacesError> {
        self.place_details(place_id).await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
