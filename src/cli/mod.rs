//! CLI module
//!
//! Command-line interface to the hub.
//!
//! # Commands
//!
//! - `ping` / `conformance` - Inspect the catalogue service
//! - `catalogs` / `collections` / `items` - Browse the catalogue
//! - `search` / `collection-search` / `count` - Query the catalogue
//! - `processes` / `jobs` / `job` - Inspect the user's ADES

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, PageArgs, SearchArgs};
pub use runner::{search_params, Runner};
