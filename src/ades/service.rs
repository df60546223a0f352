//! ADES landing page

use super::{workflow_body, Job, Process};
use crate::error::{Error, Result};
use crate::http::Request;
use crate::link::{rel, Link};
use crate::pagination::{CountField, PagedList};
use crate::record::{link_href, Record, RecordContext, RecordState};
use crate::types::{Headers, JsonValue, Method};
use crate::utils::join_url;
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Deserialize)]
pub struct AdesFields {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Landing page of a user's ADES
#[derive(Debug, Clone)]
pub struct Ades {
    state: RecordState<AdesFields>,
}

impl Record for Ades {
    const KIND: &'static str = "Ades";

    fn from_json(ctx: RecordContext, value: JsonValue) -> Result<Self> {
        Ok(Self {
            state: RecordState::new(Self::KIND, ctx, value)?,
        })
    }
}

impl Ades {
    pub fn fields(&self) -> &AdesFields {
        self.state.fields()
    }

    pub fn title(&self) -> Option<&str> {
        self.fields().title.as_deref()
    }

    pub fn links(&self) -> &[Link] {
        &self.fields().links
    }

    pub fn headers(&self) -> &Headers {
        self.state.headers()
    }

    pub fn self_url(&self) -> Result<&str> {
        self.state.cached_url(|| self.href(rel::SELF))
    }

    /// Process list endpoint
    pub fn processes_href(&self) -> Result<String> {
        self.href(rel::PROCESSES)
    }

    /// Job list endpoint
    pub fn jobs_href(&self) -> Result<String> {
        self.href(rel::JOBS)
    }

    fn href(&self, relation: &str) -> Result<String> {
        link_href(self.links(), relation).ok_or_else(|| Error::missing_link(Self::KIND, relation))
    }

    /// Deployed processes
    pub fn get_processes(&self) -> Result<PagedList<Process>> {
        Ok(PagedList::new(
            self.state.client().clone(),
            Method::GET,
            self.processes_href()?,
            "processes",
        )
        .with_count_field(CountField::NumMatched))
    }

    pub async fn get_process(&self, process_id: &str) -> Result<Process> {
        let url = join_url(&[&self.processes_href()?, process_id])?;
        self.state.client().get_record(&url, None).await
    }

    /// Deploy a CWL workflow given by URL or inline YAML, then fetch the
    /// new process from the `Location` the server returns.
    pub async fn deploy_process(
        &self,
        cwl_url: Option<&str>,
        cwl_yaml: Option<&str>,
    ) -> Result<Process> {
        let body = workflow_body(cwl_url, cwl_yaml)?;
        let url = self.processes_href()?;
        let client = self.state.client();

        let response = client
            .send(Request::new(Method::POST, &url).body(body))
            .await?;
        let location = response
            .header("Location")
            .map(str::to_string)
            .ok_or_else(|| Error::MissingHeader {
                header: "Location".to_string(),
                url: url.clone(),
            })?;

        info!(location = %location, "process deployed");
        client.get_record(&location, None).await
    }

    /// Jobs of the user
    pub fn get_jobs(&self) -> Result<PagedList<Job>> {
        Ok(PagedList::new(
            self.state.client().clone(),
            Method::GET,
            self.jobs_href()?,
            "jobs",
        )
        .with_count_field(CountField::NumMatched))
    }

    pub async fn get_job(&self, job_id: &str) -> Result<Job> {
        let url = join_url(&[&self.jobs_href()?, job_id])?;
        debug!(url = %url, "fetching job");
        self.state.client().get_record(&url, None).await
    }
}
