//! Schema descriptors and schema-fragment lookups.
//!
//! A server describes each resource through its OPTIONS response. Turning
//! that payload into JSON Schema is the job of a [`SchemaResolver`]; the rest
//! of the crate only reads the resulting [`Schema`], and within it only the
//! `GET` mapping from media type to schema fragment.
//!
//! Schema fragments are plain `Option<&Value>` borrows. Every accessor here
//! tolerates absence at any level, so a missing `properties` map, a missing
//! key, or a missing fragment all read as "no description, no hints".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ExplorerError;

/// Per-method, per-media-type schema description of a resource.
///
/// ```json
/// { "GET": { "application/vnd.ccp.eve.Api-v3+json": { "properties": { ... } } } }
/// ```
///
/// Methods other than `GET` are kept in `other` but never consulted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Schema {
    /// Schema fragment for each media type a `GET` can return.
    #[serde(rename = "GET", default)]
    pub get: BTreeMap<String, Value>,

    /// Remaining methods (`PUT`, `POST`, …), preserved verbatim.
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl Schema {
    /// The `GET` schema fragment for `media_type`, if described.
    pub fn get_fragment(&self, media_type: &str) -> Option<&Value> {
        self.get.get(media_type)
    }

    /// All media types a `GET` can return, in sorted order.
    pub fn media_types(&self) -> impl Iterator<Item = &str> {
        self.get.keys().map(String::as_str)
    }
}

/// Turns a raw OPTIONS response body into a [`Schema`].
///
/// Implementations are pure; the host performs the OPTIONS request and hands
/// over the body text.
pub trait SchemaResolver: Send + Sync {
    fn resolve(&self, options_payload: &str) -> Result<Schema, ExplorerError>;
}

/// Resolver for servers whose OPTIONS body already is a [`Schema`] descriptor.
///
/// An empty body resolves to an empty descriptor, so resources without a
/// description still render (schema-less).
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorResolver;

impl SchemaResolver for DescriptorResolver {
    fn resolve(&self, options_payload: &str) -> Result<Schema, ExplorerError> {
        if options_payload.trim().is_empty() {
            return Ok(Schema::default());
        }
        serde_json::from_str(options_payload)
            .map_err(|e| ExplorerError::InvalidSchema(e.to_string()))
    }
}

/// The `description` of a fragment, when it is a string.
pub fn description(schema: Option<&Value>) -> Option<&str> {
    schema?.get("description")?.as_str()
}

/// The fragment describing property `name` of an object fragment.
pub fn property<'a>(schema: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    schema?.get("properties")?.get(name)
}

/// The fragment describing the elements of an array fragment.
pub fn items(schema: Option<&Value>) -> Option<&Value> {
    schema?.get("items")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_descriptor_payload() {
        let payload = r#"{
            "GET": { "application/vnd.ccp.eve.Api-v3+json": { "description": "root" } },
            "PUT": {}
        }"#;
        let schema = DescriptorResolver.resolve(payload).unwrap();
        assert_eq!(
            description(schema.get_fragment("application/vnd.ccp.eve.Api-v3+json")),
            Some("root")
        );
        assert!(schema.other.contains_key("PUT"));
    }

    #[test]
    fn empty_payload_is_empty_schema() {
        assert_eq!(DescriptorResolver.resolve("  ").unwrap(), Schema::default());
    }

    #[test]
    fn malformed_payload_is_invalid_schema() {
        assert!(matches!(
            DescriptorResolver.resolve("not json"),
            Err(ExplorerError::InvalidSchema(_))
        ));
    }

    #[test]
    fn lookups_tolerate_absence() {
        let s = json!({ "properties": { "a": { "description": "alpha" } } });
        assert_eq!(description(property(Some(&s), "a")), Some("alpha"));
        assert_eq!(property(Some(&s), "b"), None);
        assert_eq!(property(Some(&json!({})), "a"), None);
        assert_eq!(property(None, "a"), None);
        assert_eq!(items(None), None);
        assert_eq!(description(Some(&json!({ "description": 3 }))), None);
    }
}
