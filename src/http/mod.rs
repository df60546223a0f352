//! HTTP transport module
//!
//! Everything above this module sees HTTP only through the `Transport` trait.
//!
//! # Features
//!
//! - **Pluggable Transport**: record types and paged lists depend on the trait
//! - **Body Encoding**: JSON, CWL YAML and raw bytes
//! - **Automatic Retries**: Opt-in retry logic with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor

mod client;
mod rate_limit;
mod transport;

pub use client::HttpTransport;
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use transport::{Body, Request, Response, Transport};
