//! Link classification and link labels.
//!
//! The API expresses relations between resources by embedding link objects:
//!
//! ```json
//! { "href": "https://api.example/regions/", "name": "Regions" }
//! ```
//!
//! [`is_link`] recognizes that embedded shape strictly. Objects that carry an
//! `href` next to arbitrary other data (the sibling shape) are not links by
//! this test; the renderer handles them by emitting a self link for the
//! object and rendering the remaining siblings as data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A rendered hyperlink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Absolute URI of the target resource.
    pub href: String,
    /// Text shown for the link.
    pub label: String,
    /// Tooltip, taken from the schema description of the linking property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// True if `value` is an embedded link: an object holding `href` and
/// optionally `name`, nothing else, each a non-empty string.
///
/// An empty-string `name` disqualifies the object too. Sparse records like
/// `{"href": "...", "name": ""}` therefore fall back to structural rendering.
pub fn is_link(value: &Value) -> bool {
    let Value::Object(map) = value else {
        return false;
    };
    if !map.contains_key("href") {
        return false;
    }
    map.iter()
        .all(|(key, v)| (key == "href" || key == "name") && non_empty_str(v).is_some())
}

/// Label for a link built from `object`.
///
/// Uses the object's `name` when it is a non-empty string, then `key` (the
/// property the link was found under) unless that key is `href` itself, and
/// finally the path component of the `href`.
pub fn link_label(object: &Map<String, Value>, key: Option<&str>) -> String {
    if let Some(name) = object.get("name").and_then(non_empty_str) {
        return name.to_string();
    }
    if let Some(key) = key.filter(|k| *k != "href") {
        return key.to_string();
    }
    let href = object.get("href").and_then(Value::as_str).unwrap_or_default();
    uri_path(href)
}

/// Path component of `href`, or `href` unchanged when it does not parse.
pub fn uri_path(href: &str) -> String {
    match url::Url::parse(href) {
        Ok(u) => u.path().to_string(),
        Err(_) => href.to_string(),
    }
}

/// Builds the [`Link`] for `object`, whose `href` must be a string.
pub(crate) fn build_link(
    object: &Map<String, Value>,
    key: Option<&str>,
    title: Option<&str>,
) -> Option<Link> {
    let href = object.get("href")?.as_str()?;
    Some(Link {
        href: href.to_string(),
        label: link_label(object, key),
        title: title.map(str::to_string),
    })
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}
