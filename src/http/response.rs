//! Relaying the upstream response back to the caller.
//!
//! # Design Decisions
//! - Success (< 400) is streamed: status, headers and body untouched
//! - Errors (>= 400) are buffered once so the body can be logged, then
//!   relayed with the same status, headers and bytes
//! - Hop-by-hop headers stripped, they describe the upstream connection only

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, Method},
    response::Response,
};

use crate::http::error::ProxyError;

/// Connection-scoped headers (RFC 9110 §7.6.1) never relayed across hops.
static HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
];

/// Remove hop-by-hop headers, including any the `Connection` header names.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
    headers.remove(header::UPGRADE);
}

/// Turn the upstream response into the caller's response.
pub async fn relay(method: &Method, path: &str, upstream: reqwest::Response) -> Result<Response, ProxyError> {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    strip_hop_by_hop(&mut headers);

    let body = if status.as_u16() < 400 {
        Body::from_stream(upstream.bytes_stream())
    } else {
        let bytes = upstream.bytes().await?;
        tracing::warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            body = %String::from_utf8_lossy(&bytes),
            "Upstream returned error status"
        );
        Body::from(bytes)
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
