//! The proxy forwarder.
//!
//! One handler per verb, all sharing [`Forwarder::forward`]:
//!
//! ```text
//! receive → read token cookie → build upstream URL/headers/body
//!         → single upstream attempt → relay (stream | log+relay | 500)
//! ```
//!
//! Each handler converts its own failures into a response, so nothing
//! escapes to the connection task and verbs never affect one another.

use std::time::{Duration, Instant};
use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, Method, Request},
    response::{IntoResponse, Response},
};

use crate::config::GatewayConfig;
use crate::http::cookies::read_cookie;
use crate::http::error::ProxyError;
use crate::http::request::{request_id, X_REQUEST_ID};
use crate::http::response::relay;
use crate::http::server::AppState;
use crate::http::upstream::{outbound_body, outbound_headers, trailing_segments, upstream_url};
use crate::observability::metrics;

/// Everything a request needs from the configuration, built once per
/// (re)load and shared by all in-flight requests.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    base_url: String,
    mount_path: String,
    token_cookie: String,
}

impl Forwarder {
    /// Build the upstream client and capture routing settings.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream.timeout_secs))
            .connect_timeout(Duration::from_secs(config.upstream.connect_timeout_secs))
            // 3xx goes back to the caller as-is.
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            base_url: config.upstream.base_url.clone(),
            mount_path: config.proxy.mount_path.clone(),
            token_cookie: config.proxy.token_cookie.clone(),
        })
    }

    /// Upstream base URL requests are forwarded to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forward one inbound request and produce the caller's response.
    pub async fn forward(&self, request: Request<Body>) -> Result<Response, ProxyError> {
        let (parts, body) = request.into_parts();

        let token = read_cookie(&parts.headers, &self.token_cookie);
        let segments = trailing_segments(parts.uri.path(), &self.mount_path);
        let url = upstream_url(&self.base_url, &segments, parts.uri.query())?;

        let content_type = parts.headers.get(CONTENT_TYPE);
        let body = outbound_body(&parts.method, content_type, body).await?;
        // No body, no Content-Type.
        let content_type = content_type.filter(|_| body.is_some());
        let headers = outbound_headers(token.as_deref(), content_type, parts.headers.get(X_REQUEST_ID))?;

        tracing::debug!(
            request_id = %request_id(&parts.headers),
            method = %parts.method,
            upstream = %url,
            authenticated = token.is_some(),
            "Forwarding request"
        );

        let mut outbound = self.client.request(parts.method.clone(), url).headers(headers);
        if let Some(body) = body {
            outbound = outbound.body(body);
        }

        let upstream = outbound.send().await?;
        relay(&parts.method, parts.uri.path(), upstream).await
    }
}

pub async fn forward_get(State(state): State<AppState>, request: Request<Body>) -> Response {
    handle(state, request).await
}

pub async fn forward_post(State(state): State<AppState>, request: Request<Body>) -> Response {
    handle(state, request).await
}

pub async fn forward_put(State(state): State<AppState>, request: Request<Body>) -> Response {
    handle(state, request).await
}

pub async fn forward_delete(State(state): State<AppState>, request: Request<Body>) -> Response {
    handle(state, request).await
}

async fn handle(state: AppState, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method: Method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request_id(request.headers()).to_string();

    let forwarder = state.forwarder();
    match forwarder.forward(request).await {
        Ok(response) => {
            metrics::record_request(&method, response.status().as_u16(), start);
            response
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                kind = e.kind(),
                error = %e,
                "Proxy request failed"
            );
            metrics::record_upstream_error(e.kind());
            metrics::record_request(&method, 500, start);
            e.into_response()
        }
    }
}
