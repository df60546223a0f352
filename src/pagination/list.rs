//! Lazy paged sequence
//!
//! `PagedList<T>` realizes records page by page on demand. Realized records
//! are kept for the lifetime of the list; iteration always starts from the
//! first realized record and only touches the network once the realized
//! prefix is used up.

use super::slice::SliceView;
use super::strategies::NextLinkStrategy;
use super::types::{ContinuationStrategy, CountField, PageDescriptor};
use crate::client::Client;
use crate::error::{Error, Result};
use crate::record::{Parent, Record, RecordContext};
use crate::types::{Headers, JsonValue, Method, StringMap};
use futures::stream::{self, Stream};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Key of the per-page size field in request bodies and query parameters
pub const DEFAULT_PAGE_SIZE_KEY: &str = "limit";

/// Mutable part of a paged list, guarded as one unit
struct PageState<T> {
    realized: Vec<T>,
    next: Option<PageDescriptor>,
    total_count: Option<u64>,
}

/// A lazily fetched, append-only sequence of records.
///
/// Fetching holds an async lock for the whole request-and-append step, so
/// concurrent consumers never duplicate or skip a page. State is only
/// committed after a page was fetched and decoded; a failed fetch can be
/// retried and resumes from the same page.
pub struct PagedList<T: Record> {
    client: Client,
    first: PageDescriptor,
    list_key: String,
    parent: Option<Parent>,
    count_field: CountField,
    page_size_key: String,
    strategy: Arc<dyn ContinuationStrategy>,
    state: Mutex<PageState<T>>,
}

impl<T: Record> PagedList<T> {
    /// Create a list in the not-yet-fetched state
    pub fn new(
        client: Client,
        method: Method,
        url: impl Into<String>,
        list_key: impl Into<String>,
    ) -> Self {
        let first = PageDescriptor::new(method, url);
        Self {
            client,
            list_key: list_key.into(),
            parent: None,
            count_field: CountField::default(),
            page_size_key: DEFAULT_PAGE_SIZE_KEY.to_string(),
            strategy: Arc::new(NextLinkStrategy),
            state: Mutex::new(PageState {
                realized: Vec::new(),
                next: Some(first.clone()),
                total_count: None,
            }),
            first,
        }
    }

    /// Set query parameters of the first page
    #[must_use]
    pub fn with_params(mut self, params: StringMap) -> Self {
        self.first.params = params;
        self.reset_first()
    }

    /// Set headers sent with every page
    #[must_use]
    pub fn with_headers(mut self, headers: StringMap) -> Self {
        self.first.headers = headers;
        self.reset_first()
    }

    /// Set the JSON body of the first page
    #[must_use]
    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.first.body = Some(body);
        self.reset_first()
    }

    /// Parent passed to every record built by this list
    #[must_use]
    pub fn with_parent(mut self, parent: Option<Parent>) -> Self {
        self.parent = parent;
        self
    }

    /// Where the total count is read from
    #[must_use]
    pub fn with_count_field(mut self, count_field: CountField) -> Self {
        self.count_field = count_field;
        self
    }

    /// How the next page is derived from a response
    #[must_use]
    pub fn with_strategy(mut self, strategy: impl ContinuationStrategy + 'static) -> Self {
        self.strategy = Arc::new(strategy);
        self
    }

    /// Name of the per-page size field
    #[must_use]
    pub fn with_page_size_key(mut self, key: impl Into<String>) -> Self {
        self.page_size_key = key.into();
        self
    }

    fn reset_first(mut self) -> Self {
        self.state.get_mut().next = Some(self.first.clone());
        self
    }

    /// Descriptor of the first page
    pub fn first_page(&self) -> &PageDescriptor {
        &self.first
    }

    pub fn list_key(&self) -> &str {
        &self.list_key
    }

    // ========================================================================
    // Fetching
    // ========================================================================

    /// Fetch the next page and return its records.
    ///
    /// Fails with `Error::NoNextPage` without any request when the list is
    /// exhausted; check [`has_next`](Self::has_next) first.
    pub async fn fetch_next(&self) -> Result<Vec<T>> {
        let mut state = self.state.lock().await;
        self.fetch_page(&mut state).await
    }

    async fn fetch_page(&self, state: &mut PageState<T>) -> Result<Vec<T>> {
        let descriptor = state.next.clone().ok_or(Error::NoNextPage)?;

        debug!(
            method = %descriptor.method,
            url = %descriptor.url,
            realized = state.realized.len(),
            "fetching page"
        );

        let (headers, envelope) = self.client.request_json(descriptor.to_request()).await?;

        let Some(envelope) = envelope else {
            debug!(url = %descriptor.url, "empty page, sequence exhausted");
            state.next = None;
            return Ok(Vec::new());
        };

        let next = self.strategy.next_page(&descriptor, &envelope);
        let count = self.count_field.read(&envelope);
        let batch = self.decode_page(headers, &envelope)?;

        state.realized.extend(batch.iter().cloned());
        state.next = next;
        if count.is_some() {
            state.total_count = count;
        }

        debug!(
            records = batch.len(),
            realized = state.realized.len(),
            has_next = state.next.is_some(),
            "page fetched"
        );

        Ok(batch)
    }

    fn decode_page(&self, headers: Headers, envelope: &JsonValue) -> Result<Vec<T>> {
        let elements: &[JsonValue] = match envelope {
            JsonValue::Array(items) => items,
            JsonValue::Object(map) => match map.get(&self.list_key) {
                Some(JsonValue::Array(items)) => items,
                Some(JsonValue::Null) => &[],
                Some(_) => {
                    return Err(Error::projection(
                        T::KIND,
                        format!("'{}' in page envelope is not an array", self.list_key),
                    ))
                }
                None => {
                    if !map.is_empty() {
                        warn!(
                            list_key = %self.list_key,
                            "page envelope has no record array, treating page as empty"
                        );
                    }
                    &[]
                }
            },
            _ => {
                return Err(Error::projection(
                    T::KIND,
                    "page envelope is neither an object nor an array",
                ))
            }
        };

        let ctx = RecordContext::new(self.client.clone(), headers, self.parent.clone());
        elements
            .iter()
            .filter(|value| !value.is_null())
            .map(|value| T::from_json(ctx.clone(), value.clone()))
            .collect()
    }

    /// Fetch pages until at least `len` records are realized or the list is exhausted
    async fn fill(&self, state: &mut PageState<T>, len: usize) -> Result<()> {
        while state.realized.len() < len && state.next.is_some() {
            self.fetch_page(state).await?;
        }
        Ok(())
    }

    /// Make sure index `index` is realized, if the list is long enough
    pub async fn fetch_to_index(&self, index: usize) -> Result<()> {
        let mut state = self.state.lock().await;
        self.fill(&mut state, index.saturating_add(1)).await
    }

    /// Record at `index`, fetching as needed
    pub async fn get(&self, index: usize) -> Result<T> {
        let mut state = self.state.lock().await;
        self.fill(&mut state, index.saturating_add(1)).await?;
        state
            .realized
            .get(index)
            .cloned()
            .ok_or(Error::IndexOutOfRange {
                index,
                len: state.realized.len(),
            })
    }

    /// Record at `index`, or `None` when the list ends before it
    pub async fn try_get(&self, index: usize) -> Result<Option<T>> {
        let mut state = self.state.lock().await;
        self.fill(&mut state, index.saturating_add(1)).await?;
        Ok(state.realized.get(index).cloned())
    }

    /// Stream every record from the start, fetching pages as it goes.
    ///
    /// Each call starts a new cursor at position 0 over the shared realized
    /// records.
    pub fn stream(&self) -> impl Stream<Item = Result<T>> + Send + '_ {
        stream::try_unfold(0usize, move |position| async move {
            Ok(self
                .try_get(position)
                .await?
                .map(|record| (record, position + 1)))
        })
    }

    /// Realize the whole list and return every record
    pub async fn collect_all(&self) -> Result<Vec<T>> {
        let mut state = self.state.lock().await;
        while state.next.is_some() {
            self.fetch_page(&mut state).await?;
        }
        Ok(state.realized.clone())
    }

    /// A view over `start..stop` taking every `step`-th record. Nothing is fetched.
    pub fn slice(&self, start: usize, stop: Option<usize>, step: usize) -> Result<SliceView<'_, T>> {
        SliceView::new(self, start, stop, step)
    }

    /// The first page worth of records.
    ///
    /// The page size comes from the first request's size field and defaults
    /// to the configured pagination limit. More pages are fetched only if the
    /// first one came back short.
    pub async fn get_limited(&self) -> Result<Vec<T>> {
        let limit = self
            .first
            .page_size(&self.page_size_key)
            .unwrap_or(self.client.config().pagination_limit as usize);

        let mut state = self.state.lock().await;
        self.fill(&mut state, limit).await?;
        Ok(state.realized.iter().take(limit).cloned().collect())
    }

    // ========================================================================
    // Count
    // ========================================================================

    /// Total number of records the server reports for this query.
    ///
    /// When unknown, one request for a single-record page of the first
    /// descriptor is issued. A response without a count logs a warning and
    /// yields `None`.
    pub async fn total_count(&self) -> Result<Option<u64>> {
        let mut state = self.state.lock().await;
        if state.total_count.is_some() {
            return Ok(state.total_count);
        }

        let descriptor = self.first.with_page_size(&self.page_size_key, 1);
        debug!(url = %descriptor.url, "requesting result count");

        let (_, envelope) = self.client.request_json(descriptor.to_request()).await?;
        let count = envelope.as_ref().and_then(|e| self.count_field.read(e));

        if count.is_none() {
            warn!(
                url = %descriptor.url,
                count_field = ?self.count_field,
                "response does not report a result count"
            );
        }

        state.total_count = count;
        Ok(count)
    }

    /// Total count if already known, without any request
    pub async fn known_total_count(&self) -> Option<u64> {
        self.state.lock().await.total_count
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Whether another page can be fetched
    pub async fn has_next(&self) -> bool {
        self.state.lock().await.next.is_some()
    }

    /// Number of records realized so far
    pub async fn realized_len(&self) -> usize {
        self.state.lock().await.realized.len()
    }

    /// Records realized so far
    pub async fn realized(&self) -> Vec<T> {
        self.state.lock().await.realized.clone()
    }
}

impl<T: Record> fmt::Debug for PagedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagedList")
            .field("kind", &T::KIND)
            .field("first", &self.first)
            .field("list_key", &self.list_key)
            .field("count_field", &self.count_field)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}
