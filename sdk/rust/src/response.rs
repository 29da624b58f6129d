//! Normalizing backend list and item payloads.
//!
//! The backend answers list endpoints with a bare array, a `{ "data": [...] }`
//! resource collection, or a paginator (`data` plus `current_page`,
//! `last_page`, `per_page`, `total`, flat or under `meta`). Callers get one
//! shape back no matter which.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pagination details from a paginator envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: u64,
    pub last_page: u64,
    pub per_page: u64,
    pub total: u64,
}

/// A list payload, tagged by whether pagination info came with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListResponse<T> {
    List { items: Vec<T> },
    Page { items: Vec<T>, meta: PageMeta },
}

impl<T> ListResponse<T> {
    pub fn items(&self) -> &[T] {
        match self {
            ListResponse::List { items } | ListResponse::Page { items, .. } => items,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            ListResponse::List { items } | ListResponse::Page { items, .. } => items,
        }
    }

    pub fn meta(&self) -> Option<&PageMeta> {
        match self {
            ListResponse::Page { meta, .. } => Some(meta),
            ListResponse::List { .. } => None,
        }
    }
}

/// Unwrap any list-shaped payload. Shapes that carry no list at all
/// (null, an error object, a scalar) become an empty list.
pub fn unwrap_list<T: DeserializeOwned>(value: Value) -> Result<ListResponse<T>, serde_json::Error> {
    match value {
        Value::Array(_) => Ok(ListResponse::List {
            items: serde_json::from_value(value)?,
        }),
        Value::Object(mut map) => {
            let data = match map.remove("data") {
                Some(data @ Value::Array(_)) => data,
                _ => return Ok(ListResponse::List { items: Vec::new() }),
            };
            let items = serde_json::from_value(data)?;

            let meta_source = match map.remove("meta") {
                Some(meta @ Value::Object(_)) => meta,
                _ => Value::Object(map),
            };
            Ok(match serde_json::from_value::<PageMeta>(meta_source) {
                Ok(meta) => ListResponse::Page { items, meta },
                Err(_) => ListResponse::List { items },
            })
        }
        _ => Ok(ListResponse::List { items: Vec::new() }),
    }
}

/// Unwrap a single resource, accepting `{ "data": {...} }` or the bare object.
pub fn unwrap_item<T: DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    match value {
        Value::Object(mut map) if matches!(map.get("data"), Some(Value::Object(_))) => {
            serde_json::from_value(map.remove("data").unwrap_or(Value::Null))
        }
        other => serde_json::from_value(other),
    }
}
