//! Envelope shapes on both sides of the proxy.
//!
//! Backends emit an [`UpstreamEnvelope`] whose `data` is a flat list of
//! strings. Callers receive a [`CallerEnvelope`] whose `data` is arbitrary
//! JSON, produced by [`CallerData::reinterpret`]:
//!
//! | upstream `data`   | caller `data`                                  |
//! |-------------------|------------------------------------------------|
//! | absent / empty    | absent                                         |
//! | one element       | the element parsed as JSON, else the raw string |
//! | two or more       | `{"key": "value"}` from `key:value` elements    |

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Message returned when no route is configured for the request.
pub const NOT_ALLOWED_MESSAGE: &str = "Path or Method not allowed";

/// Envelope as emitted by backends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpstreamEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The reinterpreted `data` of a caller envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CallerData {
    /// Built from two or more `key:value` elements.
    Fields(BTreeMap<String, String>),
    /// The single element, decoded as JSON when possible.
    Value(Value),
}

impl CallerData {
    /// Reinterpret upstream `data` by its length. `None` means "omit".
    pub fn reinterpret(items: Vec<String>) -> Option<Self> {
        match items.len() {
            0 => None,
            1 => items.into_iter().next().and_then(Self::from_single),
            _ => Some(Self::from_pairs(items)),
        }
    }

    fn from_single(item: String) -> Option<Self> {
        match serde_json::from_str::<Value>(&item) {
            Ok(Value::Null) => None,
            Ok(value) => Some(CallerData::Value(value)),
            Err(e) => {
                tracing::debug!(error = %e, "Single data element is not JSON, keeping raw string");
                Some(CallerData::Value(Value::String(item)))
            }
        }
    }

    /// Splits each element on its first `:`, so values may contain colons
    /// (`"url:http://x:80"` becomes `{"url": "http://x:80"}`).
    fn from_pairs(items: Vec<String>) -> Self {
        let mut fields = BTreeMap::new();
        for item in items {
            match item.split_once(':') {
                Some((key, value)) => {
                    fields.insert(key.to_string(), value.to_string());
                }
                None => tracing::debug!(element = %item, "Dropping data element without ':'"),
            }
        }
        CallerData::Fields(fields)
    }
}

/// Envelope as emitted to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallerEnvelope {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<CallerData>,
}

impl CallerEnvelope {
    /// An unsuccessful envelope carrying only a message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    /// Fixed answer for requests without a route.
    pub fn not_allowed() -> Self {
        Self::failure(NOT_ALLOWED_MESSAGE)
    }

    /// Render with the given status and `Content-Type: application/json`.
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl From<UpstreamEnvelope> for CallerEnvelope {
    fn from(upstream: UpstreamEnvelope) -> Self {
        Self {
            success: upstream.success,
            message: upstream.message,
            data: CallerData::reinterpret(upstream.data),
        }
    }
}
