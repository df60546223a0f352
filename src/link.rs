//! Hypermedia links
//!
//! Every hub response carries a `links` array; endpoints are discovered by
//! relation instead of being hardcoded.

use crate::types::{JsonValue, Method};
use serde::{Deserialize, Serialize};

/// Well-known link relations
pub mod rel {
    pub const SELF: &str = "self";
    pub const NEXT: &str = "next";
    pub const ITEMS: &str = "items";
    pub const DATA: &str = "data";
    pub const CHILD: &str = "child";
    pub const RESULTS: &str = "http://www.opengis.net/def/rel/ogc/1.0/results";
    pub const PROCESSES: &str = "http://www.opengis.net/def/rel/ogc/1.0/processes";
    pub const JOBS: &str = "http://www.opengis.net/def/rel/ogc/1.0/job-list";
}

/// A hypermedia link as returned by STAC and OGC APIs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Relation (`self`, `next`, `items`, ...)
    pub rel: String,

    /// Target URL
    pub href: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Media type of the target
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    /// Request body to send when following the link (POST pagination)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<JsonValue>,

    /// HTTP method to use when following the link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl Link {
    /// Create a link with only relation and target
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            title: None,
            media_type: None,
            body: None,
            method: None,
        }
    }

    /// Method declared on the link, if it is one the hub understands
    pub fn http_method(&self) -> Option<Method> {
        self.method.as_deref().and_then(Method::from_link)
    }
}

/// Find the first link with relation `rel`
pub fn find_link<'a>(links: &'a [Link], rel: &str) -> Option<&'a Link> {
    links.iter().find(|l| l.rel == rel)
}

/// Find the first link with relation `rel` in a raw `links` JSON array.
///
/// Entries that are not well-formed links are skipped.
pub fn find_link_in(links: Option<&JsonValue>, rel: &str) -> Option<Link> {
    links?
        .as_array()?
        .iter()
        .filter(|v| v.get("rel").and_then(JsonValue::as_str) == Some(rel))
        .find_map(|v| serde_json::from_value(v.clone()).ok())
}
