//! Catalogue service landing page

use super::conformance;
use super::search::{CollectionSearchParams, SearchParams};
use super::types::NewCatalog;
use super::{Catalog, Collection, DiscoveryResult, Item};
use crate::client::Client;
use crate::error::{Error, Result};
use crate::http::Request;
use crate::link::{rel, Link};
use crate::pagination::{CountField, EmbeddedTokenStrategy, PagedList};
use crate::record::{link_href, Parent, Record, RecordContext, RecordState};
use crate::types::{Headers, JsonValue, Method};
use crate::utils::join_url;
use serde::Deserialize;
use tracing::debug;

/// Projected fields of the landing page
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogServiceFields {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stac_version: Option<String>,
    #[serde(rename = "conformsTo", default)]
    pub conforms_to: Vec<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Root of the STAC catalogue hierarchy
#[derive(Debug, Clone)]
pub struct CatalogService {
    state: RecordState<CatalogServiceFields>,
}

impl Record for CatalogService {
    const KIND: &'static str = "CatalogService";

    fn from_json(ctx: RecordContext, value: JsonValue) -> Result<Self> {
        Ok(Self {
            state: RecordState::new(Self::KIND, ctx, value)?,
        })
    }
}

impl CatalogService {
    pub fn fields(&self) -> &CatalogServiceFields {
        self.state.fields()
    }

    pub fn id(&self) -> Option<&str> {
        self.fields().id.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.fields().title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.fields().description.as_deref()
    }

    pub fn links(&self) -> &[Link] {
        &self.fields().links
    }

    /// Conformance classes listed on the landing page
    pub fn conforms_to(&self) -> &[String] {
        &self.fields().conforms_to
    }

    pub fn raw(&self) -> &JsonValue {
        self.state.raw()
    }

    pub fn headers(&self) -> &Headers {
        self.state.headers()
    }

    /// Canonical URL from the `self` link
    pub fn self_url(&self) -> Result<&str> {
        self.state.cached_url(|| {
            link_href(self.links(), rel::SELF).ok_or_else(|| Error::missing_link(Self::KIND, rel::SELF))
        })
    }

    fn as_parent(&self) -> Parent {
        let url = self.self_url().ok().map(str::to_string);
        Parent {
            kind: Self::KIND,
            id: self.fields().id.clone(),
            root_url: url.clone(),
            url,
        }
    }

    /// Health check; returns the service's message (`PONG`)
    pub async fn ping(&self) -> Result<Option<String>> {
        let url = join_url(&[self.self_url()?, "_mgmt/ping"])?;
        let (_, body) = self.state.client().get_json(&url).await?;
        Ok(body
            .get("message")
            .and_then(JsonValue::as_str)
            .map(str::to_string))
    }

    /// Conformance classes currently advertised by the service
    pub async fn get_conformance(&self) -> Result<Vec<String>> {
        conformance::fetch(self.state.client(), self.self_url()?).await
    }

    /// Fail with `Error::Conformance` unless the service advertises `uri`
    pub async fn check_conforms_to(&self, uri: &str) -> Result<()> {
        conformance::require(self.state.client(), self.self_url()?, uri).await
    }

    /// Top-level catalogs
    pub fn get_catalogs(&self) -> Result<PagedList<Catalog>> {
        let url = join_url(&[self.self_url()?, "catalogs"])?;
        Ok(
            PagedList::new(self.state.client().clone(), Method::GET, url, "catalogs")
                .with_count_field(CountField::NumMatched)
                .with_parent(Some(self.as_parent())),
        )
    }

    /// Catalog at `path`; `a/b` addresses catalog `b` nested in `a`
    pub async fn get_catalog(&self, path: &str) -> Result<Catalog> {
        let url = catalog_url(self.self_url()?, path)?;
        debug!(path, url = %url, "fetching catalog");
        self.state
            .client()
            .get_record(&url, Some(self.as_parent()))
            .await
    }

    /// Create a top-level catalog
    pub async fn create_catalog(&self, catalog: &NewCatalog) -> Result<Catalog> {
        let body = catalog.to_body()?;
        self.check_conforms_to(conformance::CATALOG_TRANSACTION_URI).await?;

        let url = join_url(&[self.self_url()?, "catalogs"])?;
        let client = self.state.client();
        let (headers, response) = client
            .request_json(Request::new(Method::POST, &url).json(body))
            .await?;
        let response = response.ok_or(Error::EmptyResponse { url })?;

        Catalog::from_json(
            RecordContext::new(client.clone(), headers, Some(self.as_parent())),
            response,
        )
    }

    /// STAC item search across the whole service
    pub fn search(&self, params: &SearchParams) -> Result<PagedList<Item>> {
        let body = params.to_body()?;
        let url = join_url(&[self.self_url()?, "search"])?;
        Ok(item_search(self.state.client().clone(), url, body, self.as_parent()))
    }

    /// Free-text search over collections
    pub fn collection_search(&self, params: &CollectionSearchParams) -> Result<PagedList<Collection>> {
        let client = self.state.client();
        let query = params.to_params(client.config().pagination_limit)?;
        let url = join_url(&[self.self_url()?, "collection-search"])?;
        Ok(PagedList::new(client.clone(), Method::GET, url, "collections")
            .with_params(query)
            .with_count_field(CountField::NumMatched)
            .with_parent(Some(self.as_parent())))
    }

    /// Free-text search over catalogs and collections
    pub fn discovery_search(
        &self,
        params: &CollectionSearchParams,
    ) -> Result<PagedList<DiscoveryResult>> {
        let client = self.state.client();
        let query = params.to_params(client.config().pagination_limit)?;
        let url = join_url(&[self.self_url()?, "discovery-search"])?;
        Ok(
            PagedList::new(client.clone(), Method::GET, url, "catalogs_and_collections")
                .with_params(query)
                .with_count_field(CountField::NumMatched)
                .with_parent(Some(self.as_parent())),
        )
    }
}

/// URL of the catalog at `path` below the service root
pub(crate) fn catalog_url(root: &str, path: &str) -> Result<String> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Err(Error::validation("path", "catalog path cannot be empty"));
    }

    let mut parts = vec![root];
    for segment in segments {
        parts.push("catalogs");
        parts.push(segment);
    }
    join_url(&parts)
}

/// POST item search with the embedded `next` token continuation
pub(crate) fn item_search(
    client: Client,
    url: String,
    body: JsonValue,
    parent: Parent,
) -> PagedList<Item> {
    PagedList::new(client, Method::POST, url, "features")
        .with_body(body)
        .with_strategy(EmbeddedTokenStrategy::default())
        .with_count_field(CountField::ContextMatched)
        .with_parent(Some(parent))
}
