//! Collection records

use super::conformance::{self, COLLECTION_TRANSACTION_URI, ITEM_TRANSACTION_URI};
use super::types::{CollectionUpdate, Extent, NewItem, Provider};
use super::{merge_update, root_url, Item};
use crate::error::{Error, Result};
use crate::http::Request;
use crate::link::{rel, Link};
use crate::pagination::{CountField, PagedList};
use crate::record::{link_href, Parent, Record, RecordContext, RecordState};
use crate::types::{Headers, JsonObject, JsonValue, Method, StringMap};
use crate::utils::join_url;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionFields {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub extent: Option<Extent>,
    #[serde(default)]
    pub providers: Vec<Provider>,
    #[serde(default)]
    pub summaries: Option<JsonObject>,
    #[serde(default)]
    pub assets: JsonObject,
    #[serde(default)]
    pub stac_version: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// A STAC collection
#[derive(Debug, Clone)]
pub struct Collection {
    state: RecordState<CollectionFields>,
}

impl Record for Collection {
    const KIND: &'static str = "Collection";

    fn from_json(ctx: RecordContext, value: JsonValue) -> Result<Self> {
        Ok(Self {
            state: RecordState::new(Self::KIND, ctx, value)?,
        })
    }
}

impl Collection {
    pub fn fields(&self) -> &CollectionFields {
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

    /// URL of the collection's items: the `items` link, else `{self}/items`
    pub fn items_url(&self) -> Result<String> {
        match link_href(self.links(), rel::ITEMS) {
            Some(url) => Ok(url),
            None => join_url(&[self.self_url()?, "items"]),
        }
    }

    fn as_parent(&self) -> Result<Parent> {
        Ok(Parent {
            kind: Self::KIND,
            id: Some(self.id().to_string()),
            url: self.self_url().ok().map(str::to_string),
            root_url: Some(root_url(&self.state)?),
        })
    }

    /// Items of the collection, one page of the configured size at a time
    pub fn get_items(&self) -> Result<PagedList<Item>> {
        let client = self.state.client();
        let params = StringMap::from([(
            "limit".to_string(),
            client.config().pagination_limit.to_string(),
        )]);
        Ok(
            PagedList::new(client.clone(), Method::GET, self.items_url()?, "features")
                .with_params(params)
                .with_count_field(CountField::ContextMatched)
                .with_parent(Some(self.as_parent()?)),
        )
    }

    pub async fn get_item(&self, item_id: &str) -> Result<Item> {
        let url = join_url(&[&self.items_url()?, item_id])?;
        self.state
            .client()
            .get_record(&url, Some(self.as_parent()?))
            .await
    }

    pub async fn create_item(&self, item: &NewItem) -> Result<Item> {
        let body = item.to_body(self.id())?;
        let client = self.state.client();
        conformance::require(client, &root_url(&self.state)?, ITEM_TRANSACTION_URI).await?;

        let url = self.items_url()?;
        debug!(url = %url, item = %item.id, "creating item");
        let (headers, response) = client
            .request_json(Request::new(Method::POST, &url).json(body))
            .await?;
        let response = response.ok_or(Error::EmptyResponse { url })?;

        Item::from_json(
            RecordContext::new(client.clone(), headers, Some(self.as_parent()?)),
            response,
        )
    }

    /// Replace the collection document with `update` applied
    pub async fn update(&mut self, update: &CollectionUpdate) -> Result<()> {
        update.validate()?;
        let body = merge_update(self.raw(), update)?;
        let client = self.state.client().clone();
        conformance::require(&client, &root_url(&self.state)?, COLLECTION_TRANSACTION_URI).await?;

        let url = self.self_url()?.to_string();
        debug!(url = %url, "updating collection");
        let (_, response) = client
            .request_json(Request::new(Method::PUT, url).json(JsonValue::Object(body)))
            .await?;
        self.state.apply_response(Self::KIND, response)?;
        Ok(())
    }

    pub async fn delete(&self) -> Result<()> {
        let client = self.state.client();
        conformance::require(client, &root_url(&self.state)?, COLLECTION_TRANSACTION_URI).await?;

        let url = self.self_url()?;
        debug!(url, "deleting collection");
        client.send(Request::new(Method::DELETE, url)).await?;
        Ok(())
    }
}
