//! STAC resource catalogue
//!
//! Record types for the hub's catalogue service:
//!
//! - [`CatalogService`]: root of the hierarchy, search entry point
//! - [`Catalog`]: (possibly nested) catalog holding collections
//! - [`Collection`]: collection of items
//! - [`Item`]: a single STAC feature
//! - [`DiscoveryResult`]: catalog-or-collection hit of a discovery search
//!
//! Transactions (create/update/delete) are only attempted when the root
//! service advertises the matching conformance class.

pub mod conformance;
mod collection;
mod discovery;
mod item;
mod node;
mod search;
mod service;
mod types;

pub use collection::{Collection, CollectionFields};
pub use discovery::{DiscoveryKind, DiscoveryResult, DiscoveryResultFields};
pub use item::{Item, ItemFields};
pub use node::{Catalog, CatalogFields};
pub use search::{
    parse_query, validate_bbox, CollectionSearchParams, FilterLang, SearchFields, SearchParams,
    SortBy, SortDirection,
};
pub use service::{CatalogService, CatalogServiceFields};
pub use types::{
    CatalogUpdate, CollectionUpdate, Extent, ItemUpdate, NewCatalog, NewCollection, NewItem,
    Provider, SpatialExtent, TemporalExtent,
};

use crate::error::Result;
use crate::record::RecordState;
use crate::types::{JsonObject, JsonValue};
use crate::utils::remove_null_items;
use serde::Serialize;

/// Current document overlaid with the fields set on `update`, nulls dropped
pub(crate) fn merge_update<U: Serialize>(raw: &JsonValue, update: &U) -> Result<JsonObject> {
    let mut body = raw.as_object().cloned().unwrap_or_default();
    if let JsonValue::Object(changes) = serde_json::to_value(update)? {
        body.extend(changes);
    }
    Ok(remove_null_items(body))
}

/// Canonical URL of the catalogue service a record belongs to
pub(crate) fn root_url<F>(state: &RecordState<F>) -> Result<String> {
    match state.parent().and_then(|p| p.root_url.clone()) {
        Some(url) => Ok(url),
        None => state.client().catalog_service_url(),
    }
}

#[cfg(test)]
mod tests;
