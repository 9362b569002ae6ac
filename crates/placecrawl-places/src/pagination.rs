//! Continuation-token driven collection of text-search candidates.

use std::time::Duration;

use placecrawl_core::CandidateRef;
use tokio_util::sync::CancellationToken;

use crate::client::PlacesApi;
use crate::error::PlacesError;
use crate::retry::{ensure_active, retry_with_backoff, sleep_or_cancel, RetryPolicy};

/// Continuation tokens only become valid a short while after they are
/// issued. Every follow-up page request waits this long first.
pub const PAGE_TOKEN_DELAY: Duration = Duration::from_millis(2000);

/// Upper bound on pages fetched for a single query. The provider caps a text
/// search at three pages, so reaching this means the token chain is cycling.
pub const MAX_PAGES: usize = 10;

/// Follows the continuation-token chain for `query` and returns every
/// candidate in the order the provider served them.
///
/// Page requests are strictly sequential and each one after the first is
/// preceded by [`PAGE_TOKEN_DELAY`]. No deduplication happens here.
///
/// **All-or-nothing semantics**: any page failure discards the candidates
/// collected so far and is returned as-is.
///
/// # Errors
///
/// Propagates any error from [`PlacesApi::search`].
/// Returns [`PlacesError::PaginationLimit`] if the chain exceeds
/// [`MAX_PAGES`], or [`PlacesError::Cancelled`] if `cancel` fires before a
/// wait or a page request completes.
pub async fn collect_all_candidates<A: PlacesApi>(
    api: &A,
    query: &str,
    retry: RetryPolicy,
    cancel: &CancellationToken,
) -> Result<Vec<CandidateRef>, PlacesError> {
    let mut candidates: Vec<CandidateRef> = Vec::new();
    let mut page_token: Option<String> = None;
    let mut page_count = 0usize;

    loop {
        page_count += 1;
        if page_count > MAX_PAGES {
            return Err(PlacesError::PaginationLimit {
                query: query.to_owned(),
                max_pages: MAX_PAGES,
            });
        }

        if page_token.is_some() {
            sleep_or_cancel(PAGE_TOKEN_DELAY, cancel).await?;
        }
        ensure_active(cancel)?;

        let token = page_token.as_deref();
        let page = retry_with_backoff(retry, cancel, move || api.search(query, token)).await?;
        tracing::debug!(
            query,
            page = page_count,
            candidates = page.candidates.len(),
            has_next = page.next_page_token.is_some(),
            "text search page fetched"
        );

        candidates.extend(page.candidates);

        page_token = page.next_page_token;
        if page_token.is_none() {
            break;
        }
    }

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Call, StubApi};

    fn ids(candidates: &[CandidateRef]) -> Vec<&str> {
        candidates.iter().map(|c| c.place_id.as_str()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn single_page_needs_no_wait() {
        let api = StubApi::with_pages(&[&["a", "b"]]);
        let started = tokio::time::Instant::now();

        let candidates =
            collect_all_candidates(&api, "pizza", RetryPolicy::default(), &CancellationToken::new())
                .await
                .expect("collect");

        assert_eq!(ids(&candidates), vec!["a", "b"]);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(api.calls(), vec![Call::Search { page_token: None }]);
    }

    #[tokio::test(start_paused = true)]
    async fn two_pages_wait_exactly_once_and_keep_order() {
        let api = StubApi::with_pages(&[&["a", "b"], &["c"]]);
        let started = tokio::time::Instant::now();

        let candidates =
            collect_all_candidates(&api, "pizza", RetryPolicy::default(), &CancellationToken::new())
                .await
                .expect("collect");

        assert_eq!(ids(&candidates), vec!["a", "b", "c"]);
        assert_eq!(started.elapsed(), PAGE_TOKEN_DELAY);
        assert_eq!(
            api.calls(),
            vec![
                Call::Search { page_token: None },
                Call::Search {
                    page_token: Some("token-1".to_owned())
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn every_follow_up_page_is_delayed() {
        let api = StubApi::with_pages(&[&["a"], &["b"], &["c"]]);

        collect_all_candidates(&api, "pizza", RetryPolicy::default(), &CancellationToken::new())
            .await
            .expect("collect");

        let instants = api.search_instants();
        assert_eq!(instants.len(), 3);
        for pair in instants.windows(2) {
            assert!(pair[1] - pair[0] >= PAGE_TOKEN_DELAY);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_candidates_are_kept() {
        let api = StubApi::with_pages(&[&["a", "b"], &["b", "c"]]);

        let candidates =
            collect_all_candidates(&api, "pizza", RetryPolicy::default(), &CancellationToken::new())
                .await
                .expect("collect");

        assert_eq!(ids(&candidates), vec!["a", "b", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_first_page_is_not_an_error() {
        let api = StubApi::with_pages(&[&[]]);
        let candidates =
            collect_all_candidates(&api, "nothing", RetryPolicy::default(), &CancellationToken::new())
                .await
                .expect("collect");
        assert!(candidates.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failing_second_page_discards_everything() {
        let api = StubApi::with_pages(&[&["a"], &["b"]]).failing_search_page(1);

        let err =
            collect_all_candidates(&api, "pizza", RetryPolicy::default(), &CancellationToken::new())
                .await
                .unwrap_err();

        assert!(matches!(err, PlacesError::UpstreamRejected { .. }));
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cycling_tokens_hit_the_page_limit() {
        let api = StubApi::default().endless();

        let err =
            collect_all_candidates(&api, "loop", RetryPolicy::default(), &CancellationToken::new())
                .await
                .unwrap_err();

        assert!(matches!(
            err,
            PlacesError::PaginationLimit { max_pages, .. } if max_pages == MAX_PAGES
        ));
        assert_eq!(api.calls().len(), MAX_PAGES);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_start_sends_nothing() {
        let api = StubApi::with_pages(&[&["a"]]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = collect_all_candidates(&api, "pizza", RetryPolicy::default(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PlacesError::Cancelled));
        assert!(api.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_token_wait_skips_the_next_page() {
        let api = StubApi::with_pages(&[&["a"], &["b"]]);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            trigger.cancel();
        });

        let err = collect_all_candidates(&api, "pizza", RetryPolicy::default(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PlacesError::Cancelled));
        assert_eq!(api.calls(), vec![Call::Search { page_token: None }]);
    }
}
