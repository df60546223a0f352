//! Pagination types and traits
//!
//! Defines the page descriptor and the continuation abstraction used by
//! every paged endpoint.

use crate::http::{Body, Request};
use crate::types::{JsonValue, Method, StringMap};
use std::fmt;

/// How to fetch one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageDescriptor {
    pub method: Method,
    pub url: String,
    pub headers: StringMap,
    pub params: StringMap,
    pub body: Option<JsonValue>,
}

impl PageDescriptor {
    /// Create a descriptor with no headers, parameters or body
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: StringMap::new(),
            params: StringMap::new(),
            body: None,
        }
    }

    /// Set query parameters
    #[must_use]
    pub fn with_params(mut self, params: StringMap) -> Self {
        self.params = params;
        self
    }

    /// Set request headers
    #[must_use]
    pub fn with_headers(mut self, headers: StringMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set the JSON request body
    #[must_use]
    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Page size requested by this descriptor under `key`, body first
    pub fn page_size(&self, key: &str) -> Option<usize> {
        let from_body = self
            .body
            .as_ref()
            .and_then(|b| b.get(key))
            .and_then(JsonValue::as_u64)
            .map(|n| n as usize);

        from_body.or_else(|| self.params.get(key).and_then(|v| v.parse().ok()))
    }

    /// Copy of this descriptor requesting `size` records per page.
    ///
    /// The size goes into the JSON body when the descriptor has one,
    /// otherwise into the query parameters.
    #[must_use]
    pub fn with_page_size(&self, key: &str, size: usize) -> Self {
        let mut descriptor = self.clone();
        match descriptor.body.as_mut().and_then(JsonValue::as_object_mut) {
            Some(body) => {
                body.insert(key.to_string(), JsonValue::from(size));
            }
            None => {
                descriptor.params.insert(key.to_string(), size.to_string());
            }
        }
        descriptor
    }

    /// Build the transport request for this page
    pub fn to_request(&self) -> Request {
        Request {
            method: self.method,
            url: self.url.clone(),
            headers: self.headers.clone(),
            query: self.params.clone(),
            body: self.body.clone().map(Body::Json),
        }
    }
}

/// Where an API reports the total number of matching records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountField {
    /// `context.matched` (STAC item search)
    #[default]
    ContextMatched,
    /// `numMatched` (OGC-style listings)
    NumMatched,
}

impl CountField {
    /// Read the count from a response envelope
    pub fn read(self, envelope: &JsonValue) -> Option<u64> {
        match self {
            CountField::ContextMatched => envelope.get("context")?.get("matched")?.as_u64(),
            CountField::NumMatched => envelope.get("numMatched")?.as_u64(),
        }
    }
}

/// Derives the descriptor of the following page from a response.
///
/// Implemented per endpoint, so non-standard cursor schemes stay out of the
/// generic fetch path.
pub trait ContinuationStrategy: Send + Sync + fmt::Debug {
    /// Descriptor for the page after `current`, or `None` when exhausted
    fn next_page(&self, current: &PageDescriptor, envelope: &JsonValue) -> Option<PageDescriptor>;
}
