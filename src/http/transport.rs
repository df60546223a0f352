//! Transport abstraction
//!
//! The record model and the paged sequences only ever talk to a `Transport`.
//! `HttpTransport` is the production implementation; tests substitute stubs.

use crate::error::{Error, Result};
use crate::types::{Headers, JsonValue, Method, StringMap};
use async_trait::async_trait;
use bytes::Bytes;

/// Request body and the way it is encoded on the wire
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// `application/json`
    Json(JsonValue),
    /// CWL workflow document (`application/cwl+yaml`)
    CwlYaml(String),
    /// Opaque bytes with an explicit content type
    Raw { content_type: String, data: Bytes },
}

impl Body {
    /// Encode into `(content_type, bytes)`
    pub fn encode(&self) -> Result<(String, Bytes)> {
        match self {
            Body::Json(value) => Ok((
                "application/json".to_string(),
                Bytes::from(serde_json::to_vec(value)?),
            )),
            Body::CwlYaml(doc) => Ok((
                "application/cwl+yaml".to_string(),
                Bytes::from(doc.clone().into_bytes()),
            )),
            Body::Raw { content_type, data } => Ok((content_type.clone(), data.clone())),
        }
    }

    /// JSON payload, if this is a JSON body
    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl From<JsonValue> for Body {
    fn from(value: JsonValue) -> Self {
        Body::Json(value)
    }
}

/// A single request handed to the transport
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Absolute, or relative to the configured base URL
    pub url: String,
    pub headers: StringMap,
    pub query: StringMap,
    pub body: Option<Body>,
}

impl Request {
    /// Create a request with no headers, parameters or body
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: StringMap::new(),
            query: StringMap::new(),
            body: None,
        }
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Set a JSON body
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(Body::Json(body));
        self
    }

    /// Set any body
    #[must_use]
    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }
}

/// A successful (2xx) response
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl Response {
    /// Whether the server sent no content
    pub fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// Decode the body as JSON. An empty body is `None`, never a parse error.
    pub fn json(&self) -> Result<Option<JsonValue>> {
        if self.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&self.body)?))
    }

    /// Header value as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Performs HTTP requests on behalf of the client.
///
/// Implementations must fail with `Error::HttpStatus` on non-2xx statuses.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response>;
}

/// Fail with `HttpStatus` unless `status` is 2xx
pub(crate) fn ensure_success(status: u16, body: &[u8]) -> Result<()> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(Error::http_status(
            status,
            String::from_utf8_lossy(body).into_owned(),
        ))
    }
}
