//! Slice view over a paged list

use super::list::PagedList;
use crate::error::{Error, Result};
use crate::record::Record;
use futures::stream::{self, Stream, TryStreamExt};
use std::fmt;

/// A `start..stop` window with a step over a [`PagedList`].
///
/// The view owns nothing and fetches nothing on construction. Indices passed
/// to [`get`](Self::get) and [`slice`](Self::slice) are relative to the view:
/// position 0 is the list's `start` record.
pub struct SliceView<'a, T: Record> {
    list: &'a PagedList<T>,
    start: usize,
    stop: Option<usize>,
    step: usize,
}

impl<T: Record> Clone for SliceView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Record> Copy for SliceView<'_, T> {}

impl<T: Record> fmt::Debug for SliceView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliceView")
            .field("start", &self.start)
            .field("stop", &self.stop)
            .field("step", &self.step)
            .finish_non_exhaustive()
    }
}

impl<'a, T: Record> SliceView<'a, T> {
    pub(crate) fn new(
        list: &'a PagedList<T>,
        start: usize,
        stop: Option<usize>,
        step: usize,
    ) -> Result<Self> {
        if step == 0 {
            return Err(Error::validation("step", "slice step cannot be zero"));
        }
        Ok(Self {
            list,
            start,
            stop,
            step,
        })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn stop(&self) -> Option<usize> {
        self.stop
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// Index in the underlying list of view position `position`
    fn list_index(&self, position: usize) -> Option<usize> {
        let index = position.checked_mul(self.step)?.checked_add(self.start)?;
        match self.stop {
            Some(stop) if index >= stop => None,
            _ => Some(index),
        }
    }

    /// Number of view positions below list length `len`
    fn positions_below(&self, len: usize) -> usize {
        let bound = self.stop.map_or(len, |stop| stop.min(len));
        if bound <= self.start {
            0
        } else {
            (bound - self.start).div_ceil(self.step)
        }
    }

    /// Record at view position `position`
    pub async fn get(&self, position: usize) -> Result<T> {
        let record = match self.list_index(position) {
            Some(index) => self.list.try_get(index).await?,
            None => None,
        };

        match record {
            Some(record) => Ok(record),
            None => Err(Error::IndexOutOfRange {
                index: position,
                len: self.positions_below(self.list.realized_len().await),
            }),
        }
    }

    /// Stream the records of the view.
    ///
    /// Stops at `stop`, or as soon as the list is exhausted before the next
    /// position; never fetches past `stop`.
    pub fn stream(&self) -> impl Stream<Item = Result<T>> + Send + 'a {
        let view = *self;
        stream::try_unfold(0usize, move |position| async move {
            let Some(index) = view.list_index(position) else {
                return Ok(None);
            };
            Ok(view
                .list
                .try_get(index)
                .await?
                .map(|record| (record, position + 1)))
        })
    }

    /// Every record of the view
    pub async fn collect_all(&self) -> Result<Vec<T>> {
        self.stream().try_collect().await
    }

    /// A view of this view, with positions relative to it
    pub fn slice(&self, start: usize, stop: Option<usize>, step: usize) -> Result<SliceView<'a, T>> {
        if step == 0 {
            return Err(Error::validation("step", "slice step cannot be zero"));
        }

        let new_start = self.start.saturating_add(start.saturating_mul(self.step));
        let mapped_stop = stop.map(|stop| self.start.saturating_add(stop.saturating_mul(self.step)));
        let new_stop = match (mapped_stop, self.stop) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        SliceView::new(
            self.list,
            new_start,
            new_stop,
            self.step.saturating_mul(step),
        )
    }
}
