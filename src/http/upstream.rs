//! Building the outbound request: URL, headers and body.
//!
//! Pure helpers kept apart from the handler so every rule of the
//! forwarding contract can be checked without a network.

use std::borrow::Cow;
use axum::body::{Body, Bytes};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderMap, HeaderValue, Method,
};
use url::Url;

use crate::http::error::ProxyError;
use crate::http::request::X_REQUEST_ID;

const APPLICATION_JSON: &str = "application/json";

/// Split the raw request path into the segments that follow `mount_path`.
///
/// The raw (still percent-encoded) path is used so encoded characters reach
/// the upstream exactly as the caller sent them.
pub fn trailing_segments<'a>(path: &'a str, mount_path: &str) -> Vec<&'a str> {
    path.strip_prefix(mount_path)
        .unwrap_or(path)
        .trim_start_matches('/')
        .split('/')
        .collect()
}

/// `<base>/<segments joined by '/'>` followed by the untouched query string.
///
/// Dot segments are refused: the URL parser would resolve them and the
/// request could leave the base path with the caller's token attached.
pub fn upstream_url(base: &str, segments: &[&str], query: Option<&str>) -> Result<Url, ProxyError> {
    if segments.iter().any(|segment| is_dot_segment(segment)) {
        return Err(ProxyError::PathTraversal {
            path: segments.join("/"),
        });
    }

    let mut target = format!("{}/{}", base.trim_end_matches('/'), segments.join("/"));
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        target.push('?');
        target.push_str(query);
    }
    Url::parse(&target).map_err(|source| ProxyError::InvalidUrl { url: target, source })
}

/// `.` or `..`, raw or percent-encoded. Backslashes count as separators
/// because the URL parser treats them as `/` for http(s).
fn is_dot_segment(segment: &str) -> bool {
    let decoded = urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment));
    decoded.split('\\').any(|part| part == "." || part == "..")
}

/// True for `application/json` with or without parameters such as `charset`.
pub fn is_json_content_type(value: Option<&HeaderValue>) -> bool {
    value
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().contains(APPLICATION_JSON))
        .unwrap_or(false)
}

/// Headers for the upstream request. Inbound headers are not copied.
pub fn outbound_headers(
    token: Option<&str>,
    content_type: Option<&HeaderValue>,
    request_id: Option<&HeaderValue>,
) -> Result<HeaderMap, ProxyError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));

    if let Some(token) = token {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
    }

    if is_json_content_type(content_type) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    } else if let Some(content_type) = content_type {
        headers.insert(CONTENT_TYPE, content_type.clone());
    }

    if let Some(id) = request_id {
        headers.insert(X_REQUEST_ID, id.clone());
    }

    Ok(headers)
}

/// Read the inbound body and turn it into what the upstream receives.
///
/// GET and HEAD never carry a body. JSON is parsed and re-serialized (key
/// order kept); anything else is passed through byte for byte.
pub async fn outbound_body(
    method: &Method,
    content_type: Option<&HeaderValue>,
    body: Body,
) -> Result<Option<Bytes>, ProxyError> {
    if method == Method::GET || method == Method::HEAD {
        return Ok(None);
    }

    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(ProxyError::InboundBody)?;

    if !is_json_content_type(content_type) {
        return Ok(Some(bytes));
    }

    // Bodiless DELETEs often still claim JSON.
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value: serde_json::Value = serde_json::from_slice(&bytes)?;
    Ok(Some(Bytes::from(serde_json::to_vec(&value)?)))
}
