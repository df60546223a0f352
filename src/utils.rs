//! URL and JSON helpers shared by the record types

use crate::error::{Error, Result};
use crate::types::JsonObject;
use url::Url;

/// Whether `url` carries a host (`https://host/...`)
pub fn is_absolute_url(url: &str) -> bool {
    Url::parse(url).is_ok_and(|u| u.has_host())
}

/// Join URL path segments with `/`.
///
/// Only the first segment may start with `/`; a later absolute segment would
/// silently discard everything before it, so it is rejected instead.
pub fn join_url(parts: &[&str]) -> Result<String> {
    let mut iter = parts.iter();
    let mut joined = iter.next().map(|s| (*s).to_string()).unwrap_or_default();

    for part in iter {
        if part.starts_with('/') {
            return Err(Error::validation(
                "url",
                format!("segment '{part}' is an absolute path, only the first segment can start with '/'"),
            ));
        }
        if !joined.is_empty() && !joined.ends_with('/') {
            joined.push('/');
        }
        joined.push_str(part);
    }

    Ok(joined)
}

/// Drop keys whose value is JSON `null`
pub fn remove_null_items(object: JsonObject) -> JsonObject {
    object.into_iter().filter(|(_, v)| !v.is_null()).collect()
}
