//! In-memory [`PlacesApi`] used by the crawl unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use placecrawl_core::{CandidateRef, PlaceRecord};
use tokio::time::Instant;

use crate::client::{PlacesApi, SearchPage};
use crate::error::PlacesError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Search { page_token: Option<String> },
    Detail { place_id: String },
}

/// Serves a fixed list of pages chained by `token-N` continuation tokens,
/// plus one detail record per known place id.
#[derive(Default)]
pub(crate) struct StubApi {
    pages: Vec<Vec<String>>,
    endless: bool,
    details: HashMap<String, PlaceRecord>,
    failing_search_page: Option<usize>,
    failing_detail: Option<String>,
    calls: Mutex<Vec<(Call, Instant)>>,
}

pub(crate) fn rejected(operation: &str, status: &str) -> PlacesError {
    PlacesError::UpstreamRejected {
        operation: operation.to_owned(),
        status: status.to_owned(),
        message: None,
    }
}

impl StubApi {
    pub(crate) fn with_pages(pages: &[&[&str]]) -> Self {
        let pages: Vec<Vec<String>> = pages
            .iter()
            .map(|ids| ids.iter().map(|id| (*id).to_owned()).collect())
            .collect();
        let details = pages
            .iter()
            .flatten()
            .map(|id| (id.clone(), PlaceRecord::bare(id, &format!("Place {id}"))))
            .collect();
        Self {
            pages,
            details,
            ..Self::default()
        }
    }

    /// Every page carries a continuation token.
    pub(crate) fn endless(mut self) -> Self {
        self.endless = true;
        self
    }

    pub(crate) fn with_detail(mut self, record: PlaceRecord) -> Self {
        self.details.insert(record.place_id.clone(), record);
        self
    }

    pub(crate) fn failing_search_page(mut self, index: usize) -> Self {
        self.failing_search_page = Some(index);
        self
    }

    pub(crate) fn failing_detail(mut self, place_id: &str) -> Self {
        self.failing_detail = Some(place_id.to_owned());
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.log().iter().map(|(call, _)| call.clone()).collect()
    }

    pub(crate) fn search_instants(&self) -> Vec<Instant> {
        self.log()
            .iter()
            .filter(|(call, _)| matches!(call, Call::Search { .. }))
            .map(|(_, at)| *at)
            .collect()
    }

    pub(crate) fn detail_ids(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Detail { place_id } => Some(place_id),
                Call::Search { .. } => None,
            })
            .collect()
    }

    fn log(&self) -> std::sync::MutexGuard<'_, Vec<(Call, Instant)>> {
        self.calls.lock().expect("stub call log poisoned")
    }

    fn record(&self, call: Call) {
        self.log().push((call, Instant::now()));
    }

    fn page_index(page_token: Option<&str>) -> Result<usize, PlacesError> {
        match page_token {
            None => Ok(0),
            Some(token) => token
                .strip_prefix("token-")
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| rejected("textsearch", "INVALID_REQUEST")),
        }
    }
}

impl PlacesApi for StubApi {
    async fn search(
        &self,
        _query: &str,
        page_token: Option<&str>,
    ) -> Result<SearchPage, PlacesError> {
        self.record(Call::Search {
            page_token: page_token.map(str::to_owned),
        });
        let index = Self::page_index(page_token)?;
        if self.failing_search_page == Some(index) {
            return Err(rejected("textsearch", "INVALID_REQUEST"));
        }
        let ids = if self.endless {
            vec![format!("endless-{index}")]
        } else {
            self.pages.get(index).cloned().unwrap_or_default()
        };
        let has_next = self.endless || index + 1 < self.pages.len();
        Ok(SearchPage {
            candidates: ids.into_iter().map(CandidateRef::new).collect(),
            next_page_token: has_next.then(|| format!("token-{}", index + 1)),
        })
    }

    async fn fetch_detail(&self, place_id: &str) -> Result<PlaceRecord, PlacesError> {
        self.record(Call::Detail {
            place_id: place_id.to_owned(),
        });
        if self.failing_detail.as_deref() == Some(place_id) {
            return Err(rejected("details", "NOT_FOUND"));
        }
        self.details
            .get(place_id)
            .cloned()
            .ok_or_else(|| rejected("details", "NOT_FOUND"))
    }
}
