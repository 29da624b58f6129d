//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router (proxy route family + liveness)
//! - Wire up middleware (request id, tracing, body limit)
//! - Hold the hot-swappable forwarder
//! - Apply config reloads and stop on shutdown

use axum::{
    routing::get,
    Json, Router,
};
use arc_swap::ArcSwap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::GatewayConfig;
use crate::http::forward::{forward_delete, forward_get, forward_post, forward_put, Forwarder};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    forwarder: Arc<ArcSwap<Forwarder>>,
}

impl AppState {
    pub fn new(forwarder: Forwarder) -> Self {
        Self {
            forwarder: Arc::new(ArcSwap::from_pointee(forwarder)),
        }
    }

    /// Forwarder for the current configuration.
    pub fn forwarder(&self) -> Arc<Forwarder> {
        self.forwarder.load_full()
    }

    /// Swap in a forwarder; in-flight requests keep the one they loaded.
    pub fn replace(&self, forwarder: Forwarder) {
        self.forwarder.store(Arc::new(forwarder));
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server from a validated configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let state = AppState::new(Forwarder::from_config(&config)?);
        let router = Self::build_router(&config, state.clone());
        Ok(Self { router, config, state })
    }

    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let proxy_route = format!("{}/{{*path}}", config.proxy.mount_path);

        Router::new()
            .route(
                &proxy_route,
                get(forward_get)
                    .post(forward_post)
                    .put(forward_put)
                    .delete(forward_delete),
            )
            .route("/healthz", get(healthz))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(
                        TraceLayer::new_for_http()
                            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                            .on_response(DefaultOnResponse::new().level(Level::INFO)),
                    )
                    .layer(propagate_request_id_layer())
                    .layer(RequestBodyLimitLayer::new(config.proxy.max_body_size)),
            )
    }

    /// Serve until `shutdown` fires, applying any configs received on
    /// `config_updates` along the way.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mount_path = %self.config.proxy.mount_path,
            upstream = %self.state.forwarder().base_url(),
            "HTTP server starting"
        );

        let state = self.state.clone();
        let startup = self.config.clone();
        let reloader = tokio::spawn(async move {
            while let Some(next) = config_updates.recv().await {
                reload_forwarder(&state, &startup, next);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the startup config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Apply a reloaded config. Settings baked into the router or listener
/// keep their startup values until restart.
fn reload_forwarder(state: &AppState, startup: &GatewayConfig, mut next: GatewayConfig) {
    if next.proxy.mount_path != startup.proxy.mount_path {
        tracing::warn!(
            current = %startup.proxy.mount_path,
            requested = %next.proxy.mount_path,
            "proxy.mount_path changes require a restart, keeping current value"
        );
        next.proxy.mount_path = startup.proxy.mount_path.clone();
    }
    if next.listener.bind_address != startup.listener.bind_address
        || next.proxy.max_body_size != startup.proxy.max_body_size
    {
        tracing::warn!("listener.bind_address and proxy.max_body_size changes require a restart");
    }

    match Forwarder::from_config(&next) {
        Ok(forwarder) => {
            tracing::info!(upstream = %forwarder.base_url(), "Configuration reloaded");
            state.replace(forwarder);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to build upstream client, keeping current configuration");
        }
    }
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
