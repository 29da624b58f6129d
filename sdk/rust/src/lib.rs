//! Typed client for the marketplace backend API.
//!
//! Works against the backend directly or through the gateway's
//! `/api/proxy` mount, whichever base URL it is given.

pub mod client;
pub mod error;
pub mod lookup;
pub mod response;

pub use client::MarketplaceClient;
pub use error::ClientError;
pub use lookup::{FetchOptions, LookupResource};
pub use response::{unwrap_item, unwrap_list, ListResponse, PageMeta};
