//! Local and transport failures of a single forwarding attempt.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Everything that can stop a request from reaching (or coming back from)
/// the upstream. Upstream 4xx/5xx are *not* errors here; they are relayed.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Inbound body could not be read (client aborted, size limit hit).
    #[error("failed to read request body: {0}")]
    InboundBody(#[source] axum::Error),

    /// Inbound body was labelled JSON but did not parse.
    #[error("request body is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    /// Base URL and path did not combine into a valid URL.
    #[error("invalid upstream URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Trailing path contained `.` or `..` segments.
    #[error("path {path:?} contains dot segments")]
    PathTraversal { path: String },

    /// A header value (token or content type) could not be encoded.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] axum::http::header::InvalidHeaderValue),

    /// Connect, DNS, TLS, timeout, or upstream body read failure.
    #[error("{}", with_causes(.0))]
    Transport(#[from] reqwest::Error),
}

/// reqwest's own message omits the cause ("operation timed out",
/// "Connection refused"), which is the useful part for callers.
fn with_causes(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl ProxyError {
    /// Short label used for the `kind` metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::InboundBody(_) => "inbound_body",
            ProxyError::MalformedJson(_) => "malformed_json",
            ProxyError::InvalidUrl { .. } => "invalid_url",
            ProxyError::PathTraversal { .. } => "path_traversal",
            ProxyError::InvalidHeader(_) => "invalid_header",
            ProxyError::Transport(e) if e.is_timeout() => "timeout",
            ProxyError::Transport(_) => "transport",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
