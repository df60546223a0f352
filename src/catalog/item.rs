//! Item records

use super::conformance::{self, ITEM_TRANSACTION_URI};
use super::types::ItemUpdate;
use super::{merge_update, root_url, Collection};
use crate::error::{Error, Result};
use crate::http::Request;
use crate::link::{rel, Link};
use crate::record::{link_href, Parent, Record, RecordContext, RecordState};
use crate::types::{Headers, JsonObject, JsonValue, Method};
use crate::utils::join_url;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

/// Path of the item endpoint used when the server omits the `self` link
const FALLBACK_COLLECTIONS_PATH: &str = "stac-fastapi/collections";

#[derive(Debug, Clone, Deserialize)]
pub struct ItemFields {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub id: String,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub geometry: Option<JsonValue>,
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
    #[serde(default)]
    pub properties: JsonObject,
    #[serde(default)]
    pub assets: JsonObject,
    #[serde(default)]
    pub stac_version: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// A STAC item (GeoJSON feature)
#[derive(Debug, Clone)]
pub struct Item {
    state: RecordState<ItemFields>,
}

impl Record for Item {
    const KIND: &'static str = "Item";

    fn from_json(ctx: RecordContext, value: JsonValue) -> Result<Self> {
        Ok(Self {
            state: RecordState::new(Self::KIND, ctx, value)?,
        })
    }
}

impl Item {
    pub fn fields(&self) -> &ItemFields {
        self.state.fields()
    }

    pub fn id(&self) -> &str {
        &self.fields().id
    }

    pub fn collection(&self) -> Option<&str> {
        self.fields().collection.as_deref()
    }

    pub fn properties(&self) -> &JsonObject {
        &self.fields().properties
    }

    pub fn assets(&self) -> &JsonObject {
        &self.fields().assets
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

    /// `properties.datetime`, if present and RFC 3339
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        self.properties()
            .get("datetime")
            .and_then(JsonValue::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Canonical URL.
    ///
    /// Items returned by a create call may lack a `self` link; the URL is
    /// then derived from the parent collection, or from the collection id
    /// below the hub's STAC endpoint.
    pub fn self_url(&self) -> Result<&str> {
        self.state.cached_url(|| {
            if let Some(url) = link_href(self.links(), rel::SELF) {
                return Ok(url);
            }

            let parent_url = self
                .parent()
                .filter(|p| p.kind == Collection::KIND)
                .and_then(|p| p.url.as_deref());
            if let Some(collection_url) = parent_url {
                return join_url(&[collection_url, "items", self.id()]);
            }

            let collection = self
                .collection()
                .ok_or_else(|| Error::missing_link(Self::KIND, rel::SELF))?;
            join_url(&[
                &self.state.client().base_url(),
                FALLBACK_COLLECTIONS_PATH,
                collection,
                "items",
                self.id(),
            ])
        })
    }

    /// Replace the item document with `update` applied
    pub async fn update(&mut self, update: &ItemUpdate) -> Result<()> {
        update.validate()?;
        let mut body = merge_update(self.raw(), update)?;
        if let Some(datetime) = update.datetime {
            let properties = body
                .entry("properties")
                .or_insert_with(|| JsonValue::Object(JsonObject::new()));
            if let Some(properties) = properties.as_object_mut() {
                properties.insert("datetime".to_string(), JsonValue::from(datetime.to_rfc3339()));
            }
        }

        let client = self.state.client().clone();
        conformance::require(&client, &root_url(&self.state)?, ITEM_TRANSACTION_URI).await?;

        let url = self.self_url()?.to_string();
        debug!(url = %url, "updating item");
        let (_, response) = client
            .request_json(Request::new(Method::PUT, url).json(JsonValue::Object(body)))
            .await?;
        self.state.apply_response(Self::KIND, response)?;
        Ok(())
    }

    pub async fn delete(&self) -> Result<()> {
        let client = self.state.client();
        conformance::require(client, &root_url(&self.state)?, ITEM_TRANSACTION_URI).await?;

        let url = self.self_url()?;
        debug!(url, "deleting item");
        client.send(Request::new(Method::DELETE, url)).await?;
        Ok(())
    }
}
