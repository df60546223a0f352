//! # eodh
//!
//! Async client for the EODH Earth-observation data hub.
//!
//! ## Features
//!
//! - **STAC catalogue**: browse catalogs, collections and items; search with
//!   the query, filter, sort and fields extensions
//! - **ADES**: deploy CWL workflows, execute them and follow their jobs
//! - **Lazy paging**: every listing is a [`PagedList`] that fetches pages on
//!   demand and never refetches a realized record
//! - **Transactions**: create, update and delete records, gated on the
//!   conformance classes the server advertises
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use eodh::{Client, SearchParams, Result};
//! use futures::TryStreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::from_env()?;
//!     let catalogue = client.catalog_service().await?;
//!
//!     let params = SearchParams::new()
//!         .collections(["sentinel2_ard"])
//!         .bbox(vec![-1.5, 50.0, 0.5, 52.0]);
//!     let items = catalogue.search(&params)?;
//!
//!     println!("{:?} matching items", items.total_count().await?);
//!     let first_ten = items.slice(0, Some(10), 1)?.collect_all().await?;
//!     for item in &first_ten {
//!         println!("{}", item.id());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 Client (config + transport)                  │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴────────┬──────────────────────┐
//! │   Records    │      PagedList         │      Transport       │
//! ├──────────────┼────────────────────────┼──────────────────────┤
//! │ Catalog      │ next link              │ reqwest              │
//! │ Collection   │ embedded token         │ Retry / Backoff      │
//! │ Item         │ count oracle           │ Rate Limit           │
//! │ Process, Job │ SliceView              │                      │
//! └──────────────┴────────────────────────┴──────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::unused_async)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// URL helpers
pub mod utils;

/// Hypermedia links
pub mod link;

/// Client configuration
pub mod config;

/// HTTP transport with retry and rate limiting
pub mod http;

/// Record model shared by every resource
pub mod record;

/// Lazy paged sequences
pub mod pagination;

/// Client handle
pub mod client;

/// STAC catalogue service
pub mod catalog;

/// ADES workflow service
pub mod ades;

/// Command-line interface
pub mod cli;

#[cfg(test)]
mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use ades::{Ades, Job, JobStatus, Process};
pub use catalog::{
    Catalog, CatalogService, Collection, CollectionSearchParams, Item, SearchParams,
};
pub use client::Client;
pub use config::ClientConfig;
pub use pagination::{PagedList, SliceView};
pub use record::{Parent, Record};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
