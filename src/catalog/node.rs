//! Catalog records

use super::conformance::{self, CATALOG_TRANSACTION_URI, COLLECTION_TRANSACTION_URI};
use super::search::SearchParams;
use super::service::item_search;
use super::types::{CatalogUpdate, NewCollection};
use super::{merge_update, root_url, Collection, Item};
use crate::error::{Error, Result};
use crate::http::Request;
use crate::link::{rel, Link};
use crate::pagination::{CountField, PagedList};
use crate::record::{link_href, Parent, Record, RecordContext, RecordState};
use crate::types::{Headers, JsonValue, Method, StringMap};
use crate::utils::join_url;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFields {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stac_version: Option<String>,
    #[serde(default)]
    pub stac_extensions: Vec<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// A STAC catalog of the hub's catalogue
#[derive(Debug, Clone)]
pub struct Catalog {
    state: RecordState<CatalogFields>,
}

impl Record for Catalog {
    const KIND: &'static str = "Catalog";

    fn from_json(ctx: RecordContext, value: JsonValue) -> Result<Self> {
        Ok(Self {
            state: RecordState::new(Self::KIND, ctx, value)?,
        })
    }
}

impl Catalog {
    pub fn fields(&self) -> &CatalogFields {
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

    pub fn links(&self) -> &[Link] {
        &self.fields().links
    }

    pub fn raw(&self) -> &JsonValue {
        self.state.raw()
    }

    pub fn headers(&self) -> &Headers {
        self.state.headers()
    }

    pub fn parent(&self) -> Option<&Parent> {
        self.state.parent()
    }

    pub fn self_url(&self) -> Result<&str> {
        self.state.cached_url(|| {
            link_href(self.links(), rel::SELF).ok_or_else(|| Error::missing_link(Self::KIND, rel::SELF))
        })
    }

    /// URL of the catalog's collections (`data` link)
    pub fn collections_url(&self) -> Result<String> {
        link_href(self.links(), rel::DATA).ok_or_else(|| Error::missing_link(Self::KIND, rel::DATA))
    }

    fn as_parent(&self) -> Result<Parent> {
        Ok(Parent {
            kind: Self::KIND,
            id: Some(self.id().to_string()),
            url: self.self_url().ok().map(str::to_string),
            root_url: Some(root_url(&self.state)?),
        })
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Sub-catalogs
    pub fn get_catalogs(&self) -> Result<PagedList<Catalog>> {
        let url = join_url(&[self.self_url()?, "catalogs"])?;
        Ok(
            PagedList::new(self.state.client().clone(), Method::GET, url, "catalogs")
                .with_count_field(CountField::NumMatched)
                .with_parent(Some(self.as_parent()?)),
        )
    }

    /// Collections of the catalog
    pub fn get_collections(&self) -> Result<PagedList<Collection>> {
        let client = self.state.client();
        let params = StringMap::from([(
            "limit".to_string(),
            client.config().pagination_limit.to_string(),
        )]);
        Ok(
            PagedList::new(client.clone(), Method::GET, self.collections_url()?, "collections")
                .with_params(params)
                .with_count_field(CountField::NumMatched)
                .with_parent(Some(self.as_parent()?)),
        )
    }

    pub async fn get_collection(&self, collection_id: &str) -> Result<Collection> {
        let url = join_url(&[&self.collections_url()?, collection_id])?;
        self.state
            .client()
            .get_record(&url, Some(self.as_parent()?))
            .await
    }

    /// Item search restricted to this catalog
    pub fn search(&self, params: &SearchParams) -> Result<PagedList<Item>> {
        let body = params.to_body()?;
        let url = join_url(&[self.self_url()?, "search"])?;
        Ok(item_search(
            self.state.client().clone(),
            url,
            body,
            self.as_parent()?,
        ))
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    pub async fn create_collection(&self, collection: &NewCollection) -> Result<Collection> {
        let body = collection.to_body()?;
        let client = self.state.client();
        conformance::require(client, &root_url(&self.state)?, COLLECTION_TRANSACTION_URI).await?;

        let url = self.collections_url()?;
        let (headers, response) = client
            .request_json(Request::new(Method::POST, &url).json(body))
            .await?;
        let response = response.ok_or(Error::EmptyResponse { url })?;

        Collection::from_json(
            RecordContext::new(client.clone(), headers, Some(self.as_parent()?)),
            response,
        )
    }

    /// Replace the catalog document with `update` applied
    pub async fn update(&mut self, update: &CatalogUpdate) -> Result<()> {
        let body = merge_update(self.raw(), update)?;
        let client = self.state.client().clone();
        conformance::require(&client, &root_url(&self.state)?, CATALOG_TRANSACTION_URI).await?;

        let url = self.self_url()?.to_string();
        debug!(url = %url, "updating catalog");
        let (_, response) = client
            .request_json(Request::new(Method::PUT, url).json(JsonValue::Object(body)))
            .await?;
        self.state.apply_response(Self::KIND, response)?;
        Ok(())
    }

    pub async fn delete(&self) -> Result<()> {
        let client = self.state.client();
        conformance::require(client, &root_url(&self.state)?, CATALOG_TRANSACTION_URI).await?;

        let url = self.self_url()?;
        debug!(url, "deleting catalog");
        client.send(Request::new(Method::DELETE, url)).await?;
        Ok(())
    }
}
