//! Request identification.
//!
//! Every inbound request gets an `x-request-id` (kept if the caller already
//! sent one). The id is echoed on the response and forwarded upstream so a
//! single exchange can be followed through both services' logs.

use axum::http::{HeaderMap, HeaderName};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Header carrying the request id.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Layer that assigns a UUID v4 to requests lacking an id.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Layer that copies the id onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// The request id as a loggable string.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::{ServiceBuilder, ServiceExt};
    use uuid::Uuid;

    fn router() -> Router {
        Router::new()
            .route("/", get(|headers: HeaderMap| async move { request_id(&headers).to_string() }))
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(propagate_request_id_layer()),
            )
    }

    #[tokio::test]
    async fn generated_ids_are_uuids_seen_by_handler_and_caller() {
        let response = router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let echoed = response.headers()[X_REQUEST_ID].to_str().unwrap().to_string();
        assert!(Uuid::parse_str(&echoed).is_ok(), "{echoed}");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes, echoed.as_bytes());
    }

    #[tokio::test]
    async fn caller_supplied_id_is_kept() {
        let request = Request::get("/").header(X_REQUEST_ID, "abc-123").body(Body::empty()).unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "abc-123");
    }

    #[test]
    fn missing_id_logs_as_unknown() {
        assert_eq!(request_id(&HeaderMap::new()), "unknown");
    }
}
