//! State shared by every record type

use super::{project, Parent, RecordContext};
use crate::client::Client;
use crate::error::Result;
use crate::link::{find_link, Link};
use crate::types::{Headers, JsonValue};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;

/// Projected fields plus the context they were decoded in.
///
/// The canonical URL is resolved on first use and cached; it never changes
/// for the lifetime of the record even when fields are re-projected.
#[derive(Debug, Clone)]
pub struct RecordState<F> {
    ctx: RecordContext,
    fields: F,
    raw: JsonValue,
    self_url: OnceCell<String>,
}

impl<F: DeserializeOwned> RecordState<F> {
    /// Project `raw` into `F`
    pub fn new(kind: &str, ctx: RecordContext, raw: JsonValue) -> Result<Self> {
        let fields = project(kind, raw.clone())?;
        Ok(Self {
            ctx,
            fields,
            raw,
            self_url: OnceCell::new(),
        })
    }

    /// Replace the whole field set from a fresh JSON document.
    ///
    /// On a projection error the previous fields are kept.
    pub fn reproject(&mut self, kind: &str, raw: JsonValue) -> Result<()> {
        let fields = project(kind, raw.clone())?;
        self.fields = fields;
        self.raw = raw;
        Ok(())
    }

    /// Re-project from a response body; an empty body leaves fields as they are.
    /// Returns whether the fields were replaced.
    pub fn apply_response(&mut self, kind: &str, body: Option<JsonValue>) -> Result<bool> {
        match body {
            Some(raw) => self.reproject(kind, raw).map(|()| true),
            None => Ok(false),
        }
    }
}

impl<F> RecordState<F> {
    pub fn fields(&self) -> &F {
        &self.fields
    }

    /// The JSON the current fields were projected from
    pub fn raw(&self) -> &JsonValue {
        &self.raw
    }

    pub fn context(&self) -> &RecordContext {
        &self.ctx
    }

    pub fn client(&self) -> &Client {
        &self.ctx.client
    }

    /// Headers of the response the record was decoded from
    pub fn headers(&self) -> &Headers {
        &self.ctx.headers
    }

    pub fn parent(&self) -> Option<&Parent> {
        self.ctx.parent.as_ref()
    }

    /// Canonical URL, resolved once with `resolve`
    pub fn cached_url(&self, resolve: impl FnOnce() -> Result<String>) -> Result<&str> {
        self.self_url.get_or_try_init(resolve).map(String::as_str)
    }
}

/// `href` of the link with relation `rel`, if any
pub(crate) fn link_href(links: &[Link], rel: &str) -> Option<String> {
    find_link(links, rel)
        .map(|l| l.href.clone())
        .filter(|href| !href.is_empty())
}
