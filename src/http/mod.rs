//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → server.rs (router, request id, tracing, body limit)
//!     → forward.rs (per-verb handler → Forwarder::forward)
//!         → cookies.rs (access token)
//!         → upstream.rs (URL, headers, body)
//!         → reqwest → upstream API
//!     → response.rs (stream | log + relay)
//!     → error.rs (500 JSON on local/transport failure)
//! ```

pub mod cookies;
pub mod error;
pub mod forward;
pub mod request;
pub mod response;
pub mod server;
pub mod upstream;

pub use error::ProxyError;
pub use forward::Forwarder;
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
