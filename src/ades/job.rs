//! Process executions

use super::types::JobStatus;
use crate::error::{Error, Result};
use crate::http::Request;
use crate::link::{rel, Link};
use crate::record::{link_href, Record, RecordContext, RecordState};
use crate::types::{Headers, JsonValue, Method};
use crate::utils::join_url;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
pub struct JobFields {
    #[serde(rename = "jobID")]
    pub id: String,
    #[serde(rename = "processID", default)]
    pub process_id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub progress: Option<u32>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// One execution of a process.
///
/// Poll with [`refresh`](Self::refresh) until [`is_finished`](Self::is_finished).
#[derive(Debug, Clone)]
pub struct Job {
    state: RecordState<JobFields>,
}

impl Record for Job {
    const KIND: &'static str = "Job";

    fn from_json(ctx: RecordContext, value: JsonValue) -> Result<Self> {
        Ok(Self {
            state: RecordState::new(Self::KIND, ctx, value)?,
        })
    }
}

impl Job {
    pub fn fields(&self) -> &JobFields {
        self.state.fields()
    }

    pub fn id(&self) -> &str {
        &self.fields().id
    }

    pub fn process_id(&self) -> Option<&str> {
        self.fields().process_id.as_deref()
    }

    pub fn status(&self) -> JobStatus {
        self.fields().status
    }

    pub fn message(&self) -> Option<&str> {
        self.fields().message.as_deref()
    }

    pub fn progress(&self) -> Option<u32> {
        self.fields().progress
    }

    pub fn links(&self) -> &[Link] {
        &self.fields().links
    }

    pub fn raw(&self) -> &JsonValue {
        self.state.raw()
    }

    pub fn headers(&self) -> &Headers {
        self.state.headers()
    }

    /// Whether the job reached a terminal state
    pub fn is_finished(&self) -> bool {
        self.status().is_terminal()
    }

    /// Canonical URL: the `self` link, else the `Location` the job was
    /// created with
    pub fn self_url(&self) -> Result<&str> {
        self.state.cached_url(|| {
            link_href(self.links(), rel::SELF)
                .or_else(|| {
                    self.headers()
                        .get("Location")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string)
                })
                .ok_or_else(|| Error::missing_link(Self::KIND, rel::SELF))
        })
    }

    /// Re-fetch the job status
    pub async fn refresh(&mut self) -> Result<()> {
        let url = self.self_url()?.to_string();
        let (_, body) = self
            .state
            .client()
            .request_json(Request::new(Method::GET, url))
            .await?;
        self.state.apply_response(Self::KIND, body)?;
        debug!(job = %self.id(), status = %self.status(), "job refreshed");
        Ok(())
    }

    /// Dismiss the job; the returned status document replaces the fields
    pub async fn delete(&mut self) -> Result<()> {
        let url = self.self_url()?.to_string();
        let (_, body) = self
            .state
            .client()
            .request_json(Request::new(Method::DELETE, url))
            .await?;
        self.state.apply_response(Self::KIND, body)?;
        debug!(job = %self.id(), status = %self.status(), "job dismissed");
        Ok(())
    }

    /// Outputs of a finished job
    pub async fn results(&self) -> Result<JsonValue> {
        let url = match link_href(self.links(), rel::RESULTS) {
            Some(url) => url,
            None => join_url(&[self.self_url()?, "results"])?,
        };
        let (_, body) = self.state.client().get_json(&url).await?;
        Ok(body)
    }
}
