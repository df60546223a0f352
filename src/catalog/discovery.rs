//! Discovery search hits

use super::{Catalog, Collection};
use crate::error::{Error, Result};
use crate::link::Link;
use crate::record::{Record, RecordContext, RecordState};
use crate::types::JsonValue;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryResultFields {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// What a discovery hit refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryKind {
    Catalog,
    Collection,
    Unknown,
}

/// A catalog or a collection returned by a discovery search
#[derive(Debug, Clone)]
pub struct DiscoveryResult {
    state: RecordState<DiscoveryResultFields>,
}

impl Record for DiscoveryResult {
    const KIND: &'static str = "DiscoveryResult";

    fn from_json(ctx: RecordContext, value: JsonValue) -> Result<Self> {
        Ok(Self {
            state: RecordState::new(Self::KIND, ctx, value)?,
        })
    }
}

impl DiscoveryResult {
    pub fn fields(&self) -> &DiscoveryResultFields {
        self.state.fields()
    }

    pub fn id(&self) -> &str {
        &self.fields().id
    }

    pub fn title(&self) -> Option<&str> {
        self.fields().title.as_deref()
    }

    pub fn kind(&self) -> DiscoveryKind {
        match self.fields().kind.as_deref() {
            Some("Catalog") => DiscoveryKind::Catalog,
            Some("Collection") => DiscoveryKind::Collection,
            _ => DiscoveryKind::Unknown,
        }
    }

    /// Re-read the hit as a catalog
    pub fn to_catalog(&self) -> Result<Catalog> {
        self.convert(DiscoveryKind::Catalog)
    }

    /// Re-read the hit as a collection
    pub fn to_collection(&self) -> Result<Collection> {
        self.convert(DiscoveryKind::Collection)
    }

    fn convert<T: Record>(&self, expected: DiscoveryKind) -> Result<T> {
        if self.kind() != expected {
            return Err(Error::projection(
                T::KIND,
                format!("discovery result '{}' is a {:?}", self.id(), self.kind()),
            ));
        }
        T::from_json(self.state.context().clone(), self.state.raw().clone())
    }
}
