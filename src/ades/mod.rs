//! ADES workflow execution service
//!
//! OGC API Processes endpoints of a user's workspace:
//!
//! - [`Ades`]: landing page; lists, deploys and fetches processes and jobs
//! - [`Process`]: a deployed CWL workflow; can be executed
//! - [`Job`]: one execution of a process
//!
//! Endpoints are discovered from the landing page's OGC link relations.

mod job;
mod process;
mod service;
mod types;

pub use job::{Job, JobFields};
pub use process::{Process, ProcessFields};
pub use service::{Ades, AdesFields};
pub use types::{AdditionalParameters, JobStatus, Metadata, Parameter};

use crate::error::{Error, Result};
use crate::http::Body;
use crate::types::JsonValue;
use serde_json::json;

/// Request body for deploying or replacing a workflow.
///
/// Exactly one of `cwl_url` and `cwl_yaml` must be given.
pub(crate) fn workflow_body(cwl_url: Option<&str>, cwl_yaml: Option<&str>) -> Result<Body> {
    match (cwl_url, cwl_yaml) {
        (Some(_), Some(_)) => Err(Error::validation(
            "cwl_url",
            "cwl_url and cwl_yaml arguments are mutually exclusive",
        )),
        (None, None) => Err(Error::validation(
            "cwl_url",
            "provide either a cwl_url or a cwl_yaml argument",
        )),
        (Some(url), None) => Ok(Body::Json(json!({
            "executionUnit": {
                "href": url,
                "type": "application/cwl"
            }
        }))),
        (None, Some(yaml)) => Ok(Body::CwlYaml(yaml.to_string())),
    }
}

/// Ensure a JSON body is present
pub(crate) fn require_body(body: Option<JsonValue>, url: &str) -> Result<JsonValue> {
    body.ok_or_else(|| Error::EmptyResponse {
        url: url.to_string(),
    })
}
