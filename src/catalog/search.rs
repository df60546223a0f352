//! Search request parameters
//!
//! [`SearchParams`] is the body of `POST /search` (STAC item search).
//! [`CollectionSearchParams`] is the query of the free-text
//! `collection-search` and `discovery-search` endpoints.

use crate::config::PAGINATION_LIMIT;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, StringMap};
use serde::{Deserialize, Serialize};

// ============================================================================
// Item Search
// ============================================================================

/// Body of a STAC item search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub limit: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,

    /// `[west, south, east, north]` or with min/max elevation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,

    /// GeoJSON geometry, mutually exclusive with `bbox`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intersects: Option<JsonValue>,

    /// RFC 3339 datetime or interval
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<SearchFields>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<JsonObject>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub sortby: Vec<SortBy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<JsonValue>,

    #[serde(rename = "filter-crs", skip_serializing_if = "Option::is_none")]
    pub filter_crs: Option<String>,

    #[serde(rename = "filter-lang", skip_serializing_if = "Option::is_none")]
    pub filter_lang: Option<FilterLang>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            limit: PAGINATION_LIMIT,
            collections: None,
            ids: None,
            bbox: None,
            intersects: None,
            datetime: None,
            fields: None,
            query: None,
            sortby: Vec::new(),
            filter: None,
            filter_crs: None,
            filter_lang: None,
        }
    }
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records per page
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn collections<I, S>(mut self, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collections = Some(collections.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn bbox(mut self, bbox: Vec<f64>) -> Self {
        self.bbox = Some(bbox);
        self
    }

    #[must_use]
    pub fn intersects(mut self, geometry: JsonValue) -> Self {
        self.intersects = Some(geometry);
        self
    }

    #[must_use]
    pub fn datetime(mut self, datetime: impl Into<String>) -> Self {
        self.datetime = Some(datetime.into());
        self
    }

    #[must_use]
    pub fn fields(mut self, fields: SearchFields) -> Self {
        self.fields = Some(fields);
        self
    }

    #[must_use]
    pub fn query(mut self, query: JsonObject) -> Self {
        self.query = Some(query);
        self
    }

    #[must_use]
    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sortby.push(SortBy {
            field: field.into(),
            direction,
        });
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: JsonValue, lang: FilterLang) -> Self {
        self.filter = Some(filter);
        self.filter_lang = Some(lang);
        self
    }

    #[must_use]
    pub fn filter_crs(mut self, crs: impl Into<String>) -> Self {
        self.filter_crs = Some(crs.into());
        self
    }

    /// Check argument shapes before anything is sent
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(Error::validation("limit", "must be greater than zero"));
        }
        if let Some(bbox) = &self.bbox {
            validate_bbox(bbox)?;
            if self.intersects.is_some() {
                return Err(Error::validation(
                    "intersects",
                    "bbox and intersects are mutually exclusive",
                ));
            }
        }
        if let Some(geometry) = &self.intersects {
            if geometry.get("type").and_then(JsonValue::as_str).is_none() {
                return Err(Error::validation(
                    "intersects",
                    "expected a GeoJSON geometry object with a 'type'",
                ));
            }
        }
        Ok(())
    }

    /// Validated JSON request body
    pub fn to_body(&self) -> Result<JsonValue> {
        self.validate()?;
        Ok(serde_json::to_value(self)?)
    }
}

/// Check a bounding box has 4 (2D) or 6 (3D) coordinates
pub fn validate_bbox(bbox: &[f64]) -> Result<()> {
    match bbox.len() {
        4 | 6 => Ok(()),
        n => Err(Error::validation(
            "bbox",
            format!("expected 4 or 6 numbers, received {n}"),
        )),
    }
}

/// Fields extension: properties to include or exclude
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFields {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

/// Sort extension entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortBy {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Language of a `filter` expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterLang {
    #[serde(rename = "cql-json")]
    CqlJson,
    #[serde(rename = "cql2-json")]
    Cql2Json,
    #[serde(rename = "cql2-text")]
    Cql2Text,
}

impl FilterLang {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterLang::CqlJson => "cql-json",
            FilterLang::Cql2Json => "cql2-json",
            FilterLang::Cql2Text => "cql2-text",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "cql-json" => Ok(FilterLang::CqlJson),
            "cql2-json" => Ok(FilterLang::Cql2Json),
            "cql2-text" => Ok(FilterLang::Cql2Text),
            other => Err(Error::validation(
                "filter-lang",
                format!("expected one of cql-json, cql2-json, cql2-text, received '{other}'"),
            )),
        }
    }
}

// ============================================================================
// Query Expressions
// ============================================================================

/// Comparison operators of the query extension, longest first
const OPERATORS: [(&str, &str); 6] = [
    (">=", "gte"),
    ("<=", "lte"),
    ("<>", "neq"),
    ("=", "eq"),
    (">", "gt"),
    ("<", "lt"),
];

/// Build a query extension object from expressions.
///
/// Each expression is either a JSON object (`{"eo:cloud_cover": {"lt": 10}}`)
/// merged as is, or `property<op>value` with one of `>= <= <> = > <`
/// (`eo:cloud_cover<=10`). Values are kept as strings.
pub fn parse_query<S: AsRef<str>>(expressions: &[S]) -> Result<JsonObject> {
    let mut query = JsonObject::new();

    for expression in expressions {
        let expression = expression.as_ref().trim();

        if let Ok(JsonValue::Object(object)) = serde_json::from_str(expression) {
            query.extend(object);
            continue;
        }

        let parsed = OPERATORS.iter().find_map(|(op, name)| {
            let (property, value) = expression.split_once(op)?;
            (!property.is_empty() && !value.contains(op)).then_some((property, *name, value))
        });

        match parsed {
            Some((property, name, value)) => {
                let mut condition = JsonObject::new();
                condition.insert(name.to_string(), JsonValue::String(value.to_string()));
                query.insert(property.to_string(), JsonValue::Object(condition));
            }
            None => {
                return Err(Error::validation(
                    "query",
                    format!("cannot parse query expression '{expression}'"),
                ))
            }
        }
    }

    Ok(query)
}

// ============================================================================
// Collection Search
// ============================================================================

/// Query parameters of `collection-search` and `discovery-search`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectionSearchParams {
    /// Free-text terms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Sort expression such as `-datetime`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sortby: Option<String>,

    /// CQL2 text filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl CollectionSearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn q(mut self, terms: impl Into<String>) -> Self {
        self.q = Some(terms.into());
        self
    }

    #[must_use]
    pub fn bbox(mut self, bbox: Vec<f64>) -> Self {
        self.bbox = Some(bbox);
        self
    }

    #[must_use]
    pub fn datetime(mut self, datetime: impl Into<String>) -> Self {
        self.datetime = Some(datetime.into());
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn sortby(mut self, sortby: impl Into<String>) -> Self {
        self.sortby = Some(sortby.into());
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Validated query parameters; `default_limit` fills in a missing limit
    pub fn to_params(&self, default_limit: u32) -> Result<StringMap> {
        let mut params = StringMap::new();

        if let Some(q) = &self.q {
            params.insert("q".to_string(), q.clone());
        }
        if let Some(bbox) = &self.bbox {
            validate_bbox(bbox)?;
            let joined = bbox
                .iter()
                .map(f64::to_string)
                .collect::<Vec<_>>()
                .join(",");
            params.insert("bbox".to_string(), joined);
        }
        if let Some(datetime) = &self.datetime {
            params.insert("datetime".to_string(), datetime.clone());
        }
        if let Some(sortby) = &self.sortby {
            params.insert("sortby".to_string(), sortby.clone());
        }
        if let Some(filter) = &self.filter {
            params.insert("filter".to_string(), filter.clone());
            params.insert(
                "filter-lang".to_string(),
                FilterLang::Cql2Text.as_str().to_string(),
            );
        }

        let limit = self.limit.unwrap_or(default_limit);
        if limit == 0 {
            return Err(Error::validation("limit", "must be greater than zero"));
        }
        params.insert("limit".to_string(), limit.to_string());

        Ok(params)
    }
}
