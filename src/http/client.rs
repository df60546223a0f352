//! reqwest-backed transport
//!
//! Provides the production `Transport` that handles:
//! - Base URL resolution for relative paths
//! - Default headers and bearer token injection
//! - Optional retries with configurable backoff
//! - Optional rate limiting

use super::rate_limit::RateLimiter;
use super::transport::{ensure_success, Request, Response, Transport};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::types::BackoffType;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP transport with retry and rate limiting
pub struct HttpTransport {
    client: Client,
    base_url: String,
    default_headers: Vec<(String, String)>,
    timeout: Duration,
    max_retries: u32,
    backoff_type: BackoffType,
    initial_backoff: Duration,
    max_backoff: Duration,
    rate_limiter: Option<RateLimiter>,
}

impl HttpTransport {
    /// Create a transport from client configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .build()?;

        let mut default_headers: Vec<(String, String)> = config
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Some(token) = &config.token {
            default_headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        Ok(Self {
            client,
            base_url: config.base_url(),
            default_headers,
            timeout: config.timeout(),
            max_retries: config.max_retries,
            backoff_type: config.backoff,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            rate_limiter: config.rate_limit.as_ref().map(RateLimiter::new),
        })
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Build full URL from path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.backoff_type {
            BackoffType::Constant => self.initial_backoff,
            BackoffType::Linear => self.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.initial_backoff * factor
            }
        };

        std::cmp::min(delay, self.max_backoff)
    }

    fn build(&self, request: &Request, url: &str) -> Result<reqwest::RequestBuilder> {
        let mut req = self
            .client
            .request(request.method.into(), url)
            .timeout(self.timeout);

        for (key, value) in &self.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }
        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(body) = &request.body {
            let (content_type, data) = body.encode()?;
            req = req.header("Content-Type", content_type).body(data);
        }

        Ok(req)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        let url = self.build_url(&request.url);
        let mut attempt = 0;

        loop {
            if let Some(limiter) = &self.rate_limiter {
                limiter.wait().await;
            }

            let can_retry = attempt < self.max_retries;

            match self.build(&request, &url)?.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS && can_retry {
                        let retry_after = extract_retry_after(&response);
                        warn!(
                            "Rate limited (429), attempt {}/{}, waiting {}s",
                            attempt + 1,
                            self.max_retries + 1,
                            retry_after
                        );
                        tokio::time::sleep(Duration::from_secs(retry_after)).await;
                        attempt += 1;
                        continue;
                    }

                    if status.is_server_error() && can_retry {
                        let delay = self.calculate_backoff(attempt);
                        warn!(
                            "Request failed with {}, attempt {}/{}, retrying in {:?}",
                            status.as_u16(),
                            attempt + 1,
                            self.max_retries + 1,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        return Err(Error::RateLimited {
                            retry_after_seconds: extract_retry_after(&response),
                        });
                    }

                    let headers = response.headers().clone();
                    let body = response.bytes().await?;
                    ensure_success(status.as_u16(), &body)?;

                    debug!(method = %request.method, url = %url, status = status.as_u16(), "request succeeded");
                    return Ok(Response {
                        status: status.as_u16(),
                        headers,
                        body,
                    });
                }
                Err(e) if (e.is_timeout() || e.is_connect()) && can_retry => {
                    let delay = self.calculate_backoff(attempt);
                    warn!(
                        "Request error ({}), attempt {}/{}, retrying in {:?}",
                        e,
                        attempt + 1,
                        self.max_retries + 1,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) if e.is_timeout() => {
                    return Err(Error::Timeout {
                        timeout_ms: self.timeout.as_millis() as u64,
                    });
                }
                Err(e) => return Err(Error::Http(e)),
            }
        }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Extract retry-after header value
fn extract_retry_after(response: &reqwest::Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(60)
}
