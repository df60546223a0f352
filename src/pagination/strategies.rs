//! Continuation strategy implementations
//!
//! Each strategy handles one way the hub APIs announce the next page.

use super::types::{ContinuationStrategy, PageDescriptor};
use crate::link::{find_link_in, rel};
use crate::types::{JsonValue, Method};
use url::form_urlencoded;

// ============================================================================
// Next Link
// ============================================================================

/// Follow the `next` link of the envelope's `links` array.
///
/// The link's method is used when it declares one, otherwise the current
/// method is kept. The link's body, if any, replaces the request body;
/// query parameters are dropped because the link target already carries them.
#[derive(Debug, Clone, Default)]
pub struct NextLinkStrategy;

impl ContinuationStrategy for NextLinkStrategy {
    fn next_page(&self, current: &PageDescriptor, envelope: &JsonValue) -> Option<PageDescriptor> {
        let link = find_link_in(envelope.get("links"), rel::NEXT)?;

        Some(PageDescriptor {
            method: link.http_method().unwrap_or(current.method),
            url: link.href,
            headers: current.headers.clone(),
            params: Default::default(),
            body: link.body,
        })
    }
}

// ============================================================================
// Embedded Token
// ============================================================================

/// `next` link whose continuation token is embedded in the URL query
/// (`.../search?next=<token>`).
///
/// The token is moved out of the URL and into the JSON body for requests
/// that carry one (POST search), or into the query parameters otherwise.
#[derive(Debug, Clone)]
pub struct EmbeddedTokenStrategy {
    /// Name of the query parameter holding the token
    pub token_param: String,
}

impl Default for EmbeddedTokenStrategy {
    fn default() -> Self {
        Self {
            token_param: "next".to_string(),
        }
    }
}

impl EmbeddedTokenStrategy {
    /// Create a strategy for a custom token parameter
    pub fn new(token_param: impl Into<String>) -> Self {
        Self {
            token_param: token_param.into(),
        }
    }
}

impl ContinuationStrategy for EmbeddedTokenStrategy {
    fn next_page(&self, current: &PageDescriptor, envelope: &JsonValue) -> Option<PageDescriptor> {
        let mut next = NextLinkStrategy.next_page(current, envelope)?;

        let Some((url, token)) = split_token(&next.url, &self.token_param) else {
            return Some(next);
        };
        next.url = url;

        let carries_body = next.method == Method::POST || next.body.is_some();
        if carries_body {
            let mut body = next
                .body
                .take()
                .or_else(|| current.body.clone())
                .filter(JsonValue::is_object)
                .unwrap_or_else(|| JsonValue::Object(Default::default()));
            if let Some(object) = body.as_object_mut() {
                object.insert(self.token_param.clone(), JsonValue::String(token));
            }
            next.body = Some(body);
        } else {
            next.params.insert(self.token_param.clone(), token);
        }

        Some(next)
    }
}

/// Split `param` out of the query of `url`, returning the rewritten URL and
/// the token. `None` when the parameter is absent.
fn split_token(url: &str, param: &str) -> Option<(String, String)> {
    let (base, query) = url.split_once('?')?;

    let mut token = None;
    let mut rest = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if key == param && token.is_none() {
            token = Some(value.into_owned());
        } else {
            rest.append_pair(&key, &value);
        }
    }

    let token = token?;
    let rest = rest.finish();
    let url = if rest.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{rest}")
    };
    Some((url, token))
}

#[cfg(test)]
mod strategy_tests {
    use super::*;

    #[test]
    fn test_split_token() {
        assert_eq!(
            split_token("https://h/search?next=abc", "next"),
            Some(("https://h/search".to_string(), "abc".to_string()))
        );
        assert_eq!(
            split_token("https://h/search?limit=5&next=a%2Bb", "next"),
            Some(("https://h/search?limit=5".to_string(), "a+b".to_string()))
        );
        assert_eq!(split_token("https://h/search?limit=5", "next"), None);
        assert_eq!(split_token("https://h/search", "next"), None);
    }
}
