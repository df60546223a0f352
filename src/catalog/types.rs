//! STAC value types and mutation arguments

use super::search::validate_bbox;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Types
// ============================================================================

/// Spatial and temporal extent of a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub spatial: SpatialExtent,
    pub temporal: TemporalExtent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialExtent {
    pub bbox: Vec<Vec<f64>>,
}

/// Intervals of `[start, end]`, either end open as `null`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalExtent {
    pub interval: Vec<[Option<String>; 2]>,
}

impl Extent {
    /// Extent with one bounding box and one interval
    pub fn new(bbox: Vec<f64>, start: Option<String>, end: Option<String>) -> Self {
        Self {
            spatial: SpatialExtent { bbox: vec![bbox] },
            temporal: TemporalExtent {
                interval: vec![[start, end]],
            },
        }
    }

    fn validate(&self) -> Result<()> {
        self.spatial.bbox.iter().try_for_each(|b| validate_bbox(b))
    }
}

/// Organisation capturing or processing the data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

// ============================================================================
// Mutation Arguments
// ============================================================================

fn require_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::validation("id", "cannot be empty"));
    }
    Ok(())
}

/// Body of a catalog creation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCatalog {
    pub id: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl NewCatalog {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            title: None,
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub(crate) fn to_body(&self) -> Result<JsonValue> {
        require_id(&self.id)?;
        let mut body = serde_json::to_value(self)?;
        if let Some(object) = body.as_object_mut() {
            object.insert("type".to_string(), JsonValue::from("Catalog"));
        }
        Ok(body)
    }
}

/// Fields to change on a catalog; unset fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of a collection creation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCollection {
    pub id: String,
    pub description: String,
    pub extent: Extent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<Provider>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summaries: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<JsonObject>,
}

impl NewCollection {
    pub fn new(id: impl Into<String>, description: impl Into<String>, extent: Extent) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            extent,
            title: None,
            license: None,
            keywords: None,
            providers: None,
            summaries: None,
            assets: None,
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    #[must_use]
    pub fn keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = Some(keywords);
        self
    }

    pub(crate) fn to_body(&self) -> Result<JsonValue> {
        require_id(&self.id)?;
        self.extent.validate()?;
        Ok(serde_json::to_value(self)?)
    }
}

/// Fields to change on a collection; unset fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extent: Option<Extent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<Provider>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summaries: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<JsonObject>,
}

impl CollectionUpdate {
    pub(crate) fn validate(&self) -> Result<()> {
        match &self.extent {
            Some(extent) => extent.validate(),
            None => Ok(()),
        }
    }
}

/// Body of an item creation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewItem {
    pub id: String,
    pub geometry: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    #[serde(skip)]
    pub datetime: Option<DateTime<Utc>>,
    pub properties: JsonObject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<JsonObject>,
}

impl NewItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            geometry: None,
            bbox: None,
            datetime: None,
            properties: JsonObject::new(),
            collection: None,
            assets: None,
        }
    }

    #[must_use]
    pub fn geometry(mut self, geometry: JsonValue, bbox: Vec<f64>) -> Self {
        self.geometry = Some(geometry);
        self.bbox = Some(bbox);
        self
    }

    #[must_use]
    pub fn datetime(mut self, datetime: DateTime<Utc>) -> Self {
        self.datetime = Some(datetime);
        self
    }

    #[must_use]
    pub fn property(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn assets(mut self, assets: JsonObject) -> Self {
        self.assets = Some(assets);
        self
    }

    /// GeoJSON feature body; `collection` is filled in when unset
    pub(crate) fn to_body(&self, collection: &str) -> Result<JsonValue> {
        require_id(&self.id)?;
        if let Some(bbox) = &self.bbox {
            validate_bbox(bbox)?;
        }

        let mut item = self.clone();
        item.collection.get_or_insert_with(|| collection.to_string());
        if let Some(datetime) = self.datetime {
            item.properties
                .insert("datetime".to_string(), JsonValue::from(datetime.to_rfc3339()));
        }

        let mut body = serde_json::to_value(&item)?;
        if let Some(object) = body.as_object_mut() {
            object.insert("type".to_string(), JsonValue::from("Feature"));
        }
        Ok(body)
    }
}

/// Fields to change on an item; unset fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    #[serde(skip)]
    pub datetime: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<JsonObject>,
}

impl ItemUpdate {
    pub(crate) fn validate(&self) -> Result<()> {
        match &self.bbox {
            Some(bbox) => validate_bbox(bbox),
            None => Ok(()),
        }
    }
}
