//! Shared helpers for gateway integration tests.

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use marketplace_gateway::config::GatewayConfig;
use marketplace_gateway::http::HttpServer;
use marketplace_gateway::lifecycle::Shutdown;

/// A gateway running on an ephemeral port.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    #[allow(dead_code)]
    pub config_updates: mpsc::UnboundedSender<GatewayConfig>,
}

impl TestGateway {
    /// URL of a path on the gateway, e.g. `url("/api/proxy/cars")`.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Default config pointing at `upstream_base`.
pub fn config_for(upstream_base: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.base_url = upstream_base.into();
    config
}

/// Start a gateway. The listener is bound before returning, so requests
/// can be sent immediately.
pub async fn spawn_gateway(config: GatewayConfig) -> TestGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (config_updates, updates_rx) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, updates_rx, server_shutdown).await;
    });

    TestGateway { addr, shutdown, config_updates }
}

/// Client that ignores system proxy settings.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
