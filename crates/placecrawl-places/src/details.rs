//! Sequential detail resolution for collected candidates.

use placecrawl_core::{CandidateRef, PlaceRecord};
use tokio_util::sync::CancellationToken;

use crate::client::PlacesApi;
use crate::error::PlacesError;
use crate::retry::{retry_with_backoff, RetryPolicy};

/// Fetches the detail record of every candidate, one request at a time, and
/// returns the records in candidate order.
///
/// The first failure aborts the whole resolution: later candidates are never
/// requested and no partial list is returned.
///
/// # Errors
///
/// Propagates any error from [`PlacesApi::fetch_detail`], or
/// [`PlacesError::Cancelled`] if `cancel` fires between requests.
pub async fn resolve_details<A: PlacesApi>(
    api: &A,
    candidates: &[CandidateRef],
    retry: RetryPolicy,
    cancel: &CancellationToken,
) -> Result<Vec<PlaceRecord>, PlacesError> {
    let mut records = Vec::with_capacity(candidates.len());
    for (index, candidate) in candidates.iter().enumerate() {
        let place_id = candidate.place_id.as_str();
        let record = retry_with_backoff(retry, cancel, move || api.fetch_detail(place_id))
            .await
            .inspect_err(|e| {
                tracing::warn!(place_id, index, error = %e, "detail fetch failed, aborting crawl");
            })?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubApi;

    fn candidates(ids: &[&str]) -> Vec<CandidateRef> {
        ids.iter().map(|id| CandidateRef::new(*id)).collect()
    }

    #[tokio::test]
    async fn records_follow_candidate_order() {
        let api = StubApi::with_pages(&[&["a", "b", "c"]]);

        let records = resolve_details(
            &api,
            &candidates(&["c", "a", "b"]),
            RetryPolicy::default(),
            &CancellationToken::new(),
        )
        .await
        .expect("resolve");

        let ids: Vec<&str> = records.iter().map(|r| r.place_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(api.detail_ids(), vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn no_candidates_means_no_requests() {
        let api = StubApi::default();
        let records =
            resolve_details(&api, &[], RetryPolicy::default(), &CancellationToken::new())
                .await
                .expect("resolve");
        assert!(records.is_empty());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn failure_stops_before_the_next_candidate() {
        let api = StubApi::with_pages(&[&["a", "b", "c"]]).failing_detail("b");

        let err = resolve_details(
            &api,
            &candidates(&["a", "b", "c"]),
            RetryPolicy::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            PlacesError::UpstreamRejected { ref status, .. } if status == "NOT_FOUND"
        ));
        assert_eq!(api.detail_ids(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn cancelled_token_stops_resolution() {
        let api = StubApi::with_pages(&[&["a"]]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = resolve_details(&api, &candidates(&["a"]), RetryPolicy::default(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PlacesError::Cancelled));
        assert!(api.detail_ids().is_empty());
    }
}
