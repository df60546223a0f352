//! Deployed processes

use super::types::{AdditionalParameters, Metadata};
use super::{require_body, workflow_body, Job};
use crate::error::{Error, Result};
use crate::http::Request;
use crate::link::{rel, Link};
use crate::record::{link_href, Record, RecordContext, RecordState};
use crate::types::{Headers, JsonObject, JsonValue, Method};
use crate::utils::join_url;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessFields {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub mutable: Option<bool>,
    #[serde(default)]
    pub job_control_options: Vec<String>,
    #[serde(default)]
    pub output_transmission: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub metadata: Vec<Metadata>,
    #[serde(default)]
    pub additional_parameters: Option<AdditionalParameters>,
    /// Input schema
    #[serde(default)]
    pub inputs: JsonObject,
    /// Output schema
    #[serde(default)]
    pub outputs: JsonObject,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// A workflow deployed to the ADES
#[derive(Debug, Clone)]
pub struct Process {
    state: RecordState<ProcessFields>,
}

impl Record for Process {
    const KIND: &'static str = "Process";

    fn from_json(ctx: RecordContext, value: JsonValue) -> Result<Self> {
        Ok(Self {
            state: RecordState::new(Self::KIND, ctx, value)?,
        })
    }
}

impl Process {
    pub fn fields(&self) -> &ProcessFields {
        self.state.fields()
    }

    pub fn id(&self) -> &str {
        &self.fields().id
    }

    pub fn title(&self) -> Option<&str> {
        self.fields().title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.fields().description.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.fields().version.as_deref()
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

    pub fn self_url(&self) -> Result<&str> {
        self.state.cached_url(|| {
            link_href(self.links(), rel::SELF).ok_or_else(|| Error::missing_link(Self::KIND, rel::SELF))
        })
    }

    /// Start an asynchronous execution with `inputs`
    pub async fn execute(&self, inputs: JsonObject) -> Result<Job> {
        let url = join_url(&[self.self_url()?, "execution"])?;
        let client = self.state.client();

        let request = Request::new(Method::POST, &url)
            .header("Prefer", "respond-async")
            .json(json!({ "inputs": inputs }));
        let (headers, body) = client.request_json(request).await?;

        let job = Job::from_json(
            RecordContext::new(client.clone(), headers, None),
            require_body(body, &url)?,
        )?;
        info!(process = %self.id(), job = %job.id(), status = %job.status(), "process executed");
        Ok(job)
    }

    /// Replace the workflow, then reload the process
    pub async fn update(&mut self, cwl_url: Option<&str>, cwl_yaml: Option<&str>) -> Result<()> {
        let body = workflow_body(cwl_url, cwl_yaml)?;
        let url = self.self_url()?.to_string();
        let client = self.state.client().clone();

        debug!(url = %url, "updating process");
        client
            .send(Request::new(Method::PUT, &url).body(body))
            .await?;

        let (_, refreshed) = client.request_json(Request::new(Method::GET, url)).await?;
        self.state.apply_response(Self::KIND, refreshed)?;
        Ok(())
    }

    /// Undeploy the process
    pub async fn delete(&self) -> Result<()> {
        let url = self.self_url()?;
        debug!(url, "deleting process");
        self.state
            .client()
            .send(Request::new(Method::DELETE, url))
            .await?;
        Ok(())
    }
}
