//! Client handle shared by every record
//!
//! `Client` is cheap to clone; records and paged lists keep a clone and
//! issue their requests through it.

use crate::ades::Ades;
use crate::catalog::CatalogService;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{HttpTransport, Request, Response, Transport};
use crate::record::{Record, RecordContext};
use crate::types::{Headers, JsonValue, Method};
use crate::utils::join_url;
use std::sync::Arc;
use tracing::debug;

/// Path of the STAC catalogue service below the base URL
const CATALOGUE_PATH: &str = "api/catalogue/stac/";

/// Path template of a user's ADES service below the base URL
const ADES_PATH: &str = "api/ades";

struct ClientInner {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

/// Entry point to the hub APIs
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    /// Create a client using the reqwest transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client from `EODH_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Create a client over any transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(ClientInner { config, transport }),
        }
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Resolved base URL
    pub fn base_url(&self) -> String {
        self.inner.config.base_url()
    }

    /// Send a request through the transport
    pub async fn send(&self, request: Request) -> Result<Response> {
        debug!(method = %request.method, url = %request.url, "sending request");
        self.inner.transport.send(request).await
    }

    /// Send a request and decode the JSON body; an empty body is `None`
    pub async fn request_json(&self, request: Request) -> Result<(Headers, Option<JsonValue>)> {
        let response = self.send(request).await?;
        let body = response.json()?;
        Ok((response.headers, body))
    }

    /// GET `url` and decode a JSON body that must be present
    pub async fn get_json(&self, url: &str) -> Result<(Headers, JsonValue)> {
        let (headers, body) = self.request_json(Request::new(Method::GET, url)).await?;
        let body = body.ok_or_else(|| Error::EmptyResponse {
            url: url.to_string(),
        })?;
        Ok((headers, body))
    }

    /// GET `url` and build a record from the response
    pub(crate) async fn get_record<T: Record>(
        &self,
        url: &str,
        parent: Option<crate::record::Parent>,
    ) -> Result<T> {
        let (headers, body) = self.get_json(url).await?;
        T::from_json(RecordContext::new(self.clone(), headers, parent), body)
    }

    /// URL of the STAC catalogue service
    pub fn catalog_service_url(&self) -> Result<String> {
        join_url(&[&self.base_url(), CATALOGUE_PATH])
    }

    /// URL of the ADES service of the configured user
    pub fn ades_url(&self) -> Result<String> {
        let username = self.inner.config.username.as_deref().ok_or_else(|| {
            Error::validation("username", "a username is required to access ADES")
        })?;
        join_url(&[&self.base_url(), ADES_PATH, username, "ogc-api/"])
    }

    /// Fetch the STAC catalogue service landing page
    pub async fn catalog_service(&self) -> Result<CatalogService> {
        self.get_record(&self.catalog_service_url()?, None).await
    }

    /// Fetch the ADES landing page of the configured user
    pub async fn ades(&self) -> Result<Ades> {
        self.get_record(&self.ades_url()?, None).await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
