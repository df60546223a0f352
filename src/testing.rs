//! In-crate test doubles

use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{Request, Response, Transport};
use crate::types::{JsonValue, Method};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderName, HeaderValue};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "https://hub.test";

/// Transport replaying queued responses and recording every request
#[derive(Debug, Default)]
pub struct StubTransport {
    responses: Mutex<VecDeque<Result<Response>>>,
    requests: Mutex<Vec<Request>>,
}

impl StubTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, response: Result<Response>) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn push_json(&self, body: JsonValue) -> &Self {
        self.push(Ok(json_response(body)))
    }

    pub fn push_empty(&self) -> &Self {
        self.push(Ok(Response {
            status: 204,
            ..Default::default()
        }))
    }

    pub fn push_error(&self, status: u16) -> &Self {
        self.push(Err(Error::http_status(status, "stubbed failure")))
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests with a method other than GET
    pub fn mutating_calls(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method != Method::GET)
            .count()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other("no stubbed response left".to_string())))
    }
}

pub fn json_response(body: JsonValue) -> Response {
    Response {
        status: 200,
        headers: Default::default(),
        body: Bytes::from(serde_json::to_vec(&body).unwrap()),
    }
}

pub fn with_header(mut response: Response, name: &'static str, value: &str) -> Response {
    response.headers.insert(
        HeaderName::from_static(name),
        HeaderValue::from_str(value).unwrap(),
    );
    response
}

pub fn test_config() -> ClientConfig {
    ClientConfig::builder()
        .base_url(BASE_URL)
        .username("test-user")
        .token("secret")
        .build()
}

pub fn stub_client(transport: Arc<StubTransport>) -> Client {
    Client::with_transport(test_config(), transport)
}
