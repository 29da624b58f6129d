use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by [`crate::MarketplaceClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("authenticated fetch requested but no access token is configured")]
    MissingToken,
}
