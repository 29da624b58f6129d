//! Same-origin gateway for the car marketplace frontend.
//!
//! Relays browser requests under a fixed mount path to the backend API,
//! injecting the bearer token held in an http-only cookie.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

#[cfg(test)]
mod test_support;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
