//! Domain record model
//!
//! A record wraps one decoded JSON object together with the response headers
//! it arrived with and a handle to the issuing client. Each record type
//! declares a serde field struct; decoding that struct is the record's
//! projection, and a value of the wrong type fails construction.
//!
//! Hierarchical records (catalogue → catalog → collection → item) carry a
//! read-only [`Parent`] captured at construction. It is an upward link used
//! for context such as conformance lookups on the root service, never for
//! ownership.

mod state;

pub use state::RecordState;
pub(crate) use state::link_href;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::types::{Headers, JsonValue};
use serde::de::DeserializeOwned;

/// A typed wrapper around one decoded JSON object
pub trait Record: Clone + Send + Sync + 'static {
    /// Human-readable record kind used in error messages
    const KIND: &'static str;

    /// Build the record from a decoded JSON value
    fn from_json(ctx: RecordContext, value: JsonValue) -> Result<Self>;
}

/// Everything a record needs besides its JSON
#[derive(Debug, Clone)]
pub struct RecordContext {
    pub client: Client,
    pub headers: Headers,
    pub parent: Option<Parent>,
}

impl RecordContext {
    pub fn new(client: Client, headers: Headers, parent: Option<Parent>) -> Self {
        Self {
            client,
            headers,
            parent,
        }
    }

    /// Context for a record derived from the same response
    pub fn child(&self, parent: Option<Parent>) -> Self {
        Self {
            client: self.client.clone(),
            headers: self.headers.clone(),
            parent,
        }
    }
}

/// Upward link from a record to the record that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parent {
    /// Kind of the parent record
    pub kind: &'static str,
    /// Id of the parent record
    pub id: Option<String>,
    /// Canonical URL of the parent record
    pub url: Option<String>,
    /// Canonical URL of the root service of the hierarchy
    pub root_url: Option<String>,
}

/// Decode `value` into the field struct of a record kind
pub fn project<F: DeserializeOwned>(kind: &str, value: JsonValue) -> Result<F> {
    if !value.is_object() {
        return Err(Error::projection(
            kind,
            format!("expected a JSON object, received {}", json_type_name(&value)),
        ));
    }
    serde_json::from_value(value).map_err(|e| Error::projection(kind, e.to_string()))
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
