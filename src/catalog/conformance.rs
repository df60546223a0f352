//! Conformance classes advertised by the catalogue service
//!
//! Transactional operations are gated on these URIs; the list is fetched from
//! `{root}/conformance` on every check so a server-side change is picked up.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use crate::utils::join_url;
use tracing::debug;

/// STAC API core
pub const CORE_URI: &str = "https://api.stacspec.org/v1.0.0/core";

/// STAC API item search
pub const ITEM_SEARCH_URI: &str = "https://api.stacspec.org/v1.0.0/item-search";

/// STAC API collections
pub const COLLECTIONS_URI: &str = "https://api.stacspec.org/v1.0.0/collections";

/// Item create/update/delete
pub const ITEM_TRANSACTION_URI: &str =
    "https://api.stacspec.org/v1.0.0/ogcapi-features/extensions/transaction";

/// Collection create/update/delete
pub const COLLECTION_TRANSACTION_URI: &str =
    "https://api.stacspec.org/v1.0.0/collections/extensions/transaction";

/// Catalog create/update/delete on multi-tenant catalogues
pub const CATALOG_TRANSACTION_URI: &str =
    "https://api.stacspec.org/v1.0.0-rc.1/multi-tenant-catalogs/transaction";

/// Fetch the conformance classes of the service rooted at `root_url`
pub async fn fetch(client: &Client, root_url: &str) -> Result<Vec<String>> {
    let url = join_url(&[root_url, "conformance"])?;
    let (_, body) = client.get_json(&url).await?;

    let conforms_to = match body.get("conformsTo") {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| Error::projection("Conformance", e.to_string()))?,
    };

    debug!(url = %url, classes = conforms_to.len(), "fetched conformance");
    Ok(conforms_to)
}

/// Fail with `Error::Conformance` unless the service advertises `uri`
pub async fn require(client: &Client, root_url: &str, uri: &str) -> Result<()> {
    let conforms_to = fetch(client, root_url).await?;
    if conforms_to.iter().any(|c| c == uri) {
        Ok(())
    } else {
        Err(Error::conformance(uri))
    }
}
