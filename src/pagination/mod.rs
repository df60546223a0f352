//! Pagination subsystem
//!
//! Every listing and search endpoint of the hub returns its records in pages.
//! This module provides:
//!
//! - [`PagedList`]: lazily realized, append-only record sequence
//! - [`SliceView`]: non-owning window over a paged list
//! - [`ContinuationStrategy`]: per-endpoint rule deriving the next page
//!   ([`NextLinkStrategy`], [`EmbeddedTokenStrategy`])
//! - [`CountField`]: where the result count lives in an envelope

mod list;
mod slice;
mod strategies;
mod types;

pub use list::{PagedList, DEFAULT_PAGE_SIZE_KEY};
pub use slice::SliceView;
pub use strategies::{EmbeddedTokenStrategy, NextLinkStrategy};
pub use types::{ContinuationStrategy, CountField, PageDescriptor};
