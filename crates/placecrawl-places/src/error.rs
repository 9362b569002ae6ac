use placecrawl_core::ValidationError;
use thiserror::Error;

/// Errors returned by the Places client and the crawl built on top of it.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-2xx HTTP status.
    #[error("Places API {operation} returned HTTP {status}")]
    HttpStatus { operation: String, status: u16 },

    /// The provider's JSON envelope carried a status other than `"OK"`.
    #[error(
        "Places API {operation} rejected the request with status {status}: {}",
        .message.as_deref().unwrap_or("no error message")
    )]
    UpstreamRejected {
        operation: String,
        status: String,
        message: Option<String>,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Continuation tokens kept coming past the page cap.
    #[error("pagination limit reached for \"{query}\": exceeded {max_pages} pages")]
    PaginationLimit { query: String, max_pages: usize },

    #[error("invalid search request: {0}")]
    Validation(#[from] ValidationError),

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    /// The caller cancelled the crawl.
    #[error("crawl cancelled")]
    Cancelled,
}

/// Caller-facing classification of a [`PlacesError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The provider refused the call (non-OK status or non-2xx response).
    UpstreamRejected,
    /// Transport-level failure: connection refused, timeout, TLS.
    NetworkFailure,
    /// The provider's answer could not be understood.
    MalformedResponse,
    /// The input was refused before anything was sent.
    ValidationFailure,
    Cancelled,
}

impl PlacesError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(e) if e.is_decode() => ErrorKind::MalformedResponse,
            Self::Http(e) if e.status().is_some() => ErrorKind::UpstreamRejected,
            Self::Http(_) => ErrorKind::NetworkFailure,
            Self::HttpStatus { .. } | Self::UpstreamRejected { .. } => ErrorKind::UpstreamRejected,
            Self::Deserialize { .. } | Self::PaginationLimit { .. } => {
                ErrorKind::MalformedResponse
            }
            Self::Validation(_) | Self::InvalidBaseUrl { .. } => ErrorKind::ValidationFailure,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_rejection_message_includes_status_and_message() {
        let err = PlacesError::UpstreamRejected {
            operation: "textsearch".to_owned(),
            status: "REQUEST_DENIED".to_owned(),
            message: Some("The provided API key is invalid.".to_owned()),
        };
        let msg = err.to_string();
        assert!(msg.contains("REQUEST_DENIED"), "got: {msg}");
        assert!(msg.contains("API key is invalid"), "got: {msg}");
        assert_eq!(err.kind(), ErrorKind::UpstreamRejected);
    }

    #[test]
    fn upstream_rejection_without_message() {
        let err = PlacesError::UpstreamRejected {
            operation: "details".to_owned(),
            status: "NOT_FOUND".to_owned(),
            message: None,
        };
        assert!(err.to_string().contains("no error message"));
    }

    #[test]
    fn kinds_cover_each_failure_class() {
        let malformed = PlacesError::Deserialize {
            context: "test".to_owned(),
            source: serde_json::from_str::<()>("nope").unwrap_err(),
        };
        assert_eq!(malformed.kind(), ErrorKind::MalformedResponse);
        assert_eq!(
            PlacesError::HttpStatus {
                operation: "textsearch".to_owned(),
                status: 503
            }
            .kind(),
            ErrorKind::UpstreamRejected
        );
        assert_eq!(
            PlacesError::Validation(ValidationError::EmptyQuery).kind(),
            ErrorKind::ValidationFailure
        );
        assert_eq!(PlacesError::Cancelled.kind(), ErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn connection_failure_is_a_network_failure() {
        let err = reqwest::Client::new()
            .get("http://0.0.0.0:1")
            .send()
            .await
            .unwrap_err();
        assert_eq!(PlacesError::Http(err).kind(), ErrorKind::NetworkFailure);
    }
}
