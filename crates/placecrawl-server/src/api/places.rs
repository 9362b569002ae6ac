use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use placecrawl_core::{CrawlResult, SearchRequest};
use placecrawl_places::{ErrorKind, PlacesError};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct PlacesQuery {
    /// URL-encoded `SearchRequest` JSON.
    pub search: Option<String>,
}

pub(super) async fn search_places_get(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<PlacesQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<CrawlResult>>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            rejection.body_text(),
        )
    })?;
    let raw = query.search.ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            "missing `search` query parameter",
        )
    })?;
    let request = parse_request(&req_id, raw.as_bytes())?;
    run_crawl(&state, req_id, request).await
}

pub(super) async fn search_places_post(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<ApiResponse<CrawlResult>>, ApiError> {
    let request = parse_request(&req_id, &body)?;
    run_crawl(&state, req_id, request).await
}

fn parse_request(req_id: &RequestId, raw: &[u8]) -> Result<SearchRequest, ApiError> {
    serde_json::from_slice(raw).map_err(|e| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            format!("invalid search request: {e}"),
        )
    })
}

async fn run_crawl(
    state: &AppState,
    req_id: RequestId,
    request: SearchRequest,
) -> Result<Json<ApiResponse<CrawlResult>>, ApiError> {
    // Shutdown cancels every in-flight crawl; a dropped connection drops
    // this future and stops the crawl with it.
    let cancel = state.shutdown.child_token();
    let result = state
        .crawler
        .run(request, &cancel)
        .await
        .map_err(|e| map_places_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: result,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) fn map_places_error(request_id: String, error: &PlacesError) -> ApiError {
    let code = match error.kind() {
        ErrorKind::ValidationFailure => "validation_error",
        ErrorKind::UpstreamRejected => "upstream_rejected",
        ErrorKind::NetworkFailure => "upstream_unavailable",
        ErrorKind::MalformedResponse => "malformed_upstream_response",
        ErrorKind::Cancelled => "cancelled",
    };
    if matches!(error.kind(), ErrorKind::ValidationFailure) {
        tracing::debug!(request_id = %request_id, error = %error, "rejected search request");
    } else {
        tracing::warn!(request_id = %request_id, code, error = %error, "crawl failed");
    }
    ApiError::new(request_id, code, error.to_string())
}
