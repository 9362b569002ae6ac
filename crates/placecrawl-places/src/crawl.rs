//! Crawl orchestration: validate, paginate, resolve details, filter.

use placecrawl_core::{filter, CrawlResult, SearchRequest};
use tokio_util::sync::CancellationToken;

use crate::client::PlacesApi;
use crate::details::resolve_details;
use crate::error::PlacesError;
use crate::pagination::collect_all_candidates;
use crate::retry::RetryPolicy;

/// Runs complete crawls against one [`PlacesApi`].
///
/// A `Crawler` holds no per-crawl state, so a single instance can serve any
/// number of concurrent crawls.
pub struct Crawler<A> {
    api: A,
    retry: RetryPolicy,
}

impl<A: PlacesApi> Crawler<A> {
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            api,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Runs one crawl for `request` and returns the filtered result.
    ///
    /// Nothing is sent upstream if the request fails validation. Any failure
    /// after that is terminal; no partial result is ever produced.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Validation`] if `request` is malformed.
    /// - Any error from [`collect_all_candidates`] or [`resolve_details`].
    pub async fn run(
        &self,
        request: SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<CrawlResult, PlacesError> {
        request.validate()?;
        tracing::info!(query = %request.query, "crawl started");

        let candidates =
            collect_all_candidates(&self.api, &request.query, self.retry, cancel).await?;
        tracing::info!(
            query = %request.query,
            candidates = candidates.len(),
            "candidates collected, resolving details"
        );

        let records = resolve_details(&self.api, &candidates, self.retry, cancel).await?;
        let fetched = records.len();
        let places = filter::apply(records, &request.filters);
        tracing::info!(
            query = %request.query,
            fetched,
            kept = places.len(),
            "crawl complete"
        );

        Ok(CrawlResult::new(request, places))
    }
}
