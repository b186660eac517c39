//! Media types, representation selection, and the schema download artifact.
//!
//! A resource may be served in several representations, each a distinct
//! media type with its own schema fragment under `schema.GET`. After a GET,
//! the received `Content-Type` picks the fragment the renderer uses; the
//! other media types are offered as alternatives, navigable by re-requesting
//! the same URI with an `Accept` override recorded in the address fragment.

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::address::Address;
use crate::error::ExplorerError;
use crate::schema::Schema;

/// Vendor tree shared by the API's media types.
pub const VENDOR_PREFIX: &str = "application/vnd.ccp.eve.";

const JSON_SUFFIX: &str = "+json";

/// One representation a resource can be requested in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepresentationOption {
    /// Full media type, e.g. `application/vnd.ccp.eve.Api-v3+json`.
    pub media_type: String,
    /// Short name derived with [`representation_from_media_type`].
    pub name: String,
    /// True for the representation the server actually returned.
    pub selected: bool,
    /// Address fragment that re-requests the resource in this representation.
    pub fragment: String,
}

/// The outcome of matching a response against its schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Representation<'a> {
    /// Normalized media type of the response.
    pub media_type: String,
    /// Schema fragment for `media_type`; `None` on a lookup miss.
    pub fragment: Option<&'a Value>,
    /// Every `GET` representation, exactly one `selected` when the lookup hit.
    pub options: Vec<RepresentationOption>,
}

impl Representation<'_> {
    /// The lookup miss for this response, if the schema does not describe it.
    pub fn lookup_miss(&self) -> Option<ExplorerError> {
        match self.fragment {
            Some(_) => None,
            None => Some(ExplorerError::SchemaLookupMiss(self.media_type.clone())),
        }
    }

    /// Options other than the selected one.
    pub fn alternatives(&self) -> impl Iterator<Item = &RepresentationOption> {
        self.options.iter().filter(|o| !o.selected)
    }
}

/// Canonical media type of a `Content-Type` header value.
///
/// Drops any parameters (`; charset=utf-8`) and surrounding whitespace.
pub fn media_type_from_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Pick the schema fragment for a response and list the alternatives.
///
/// `uri` is the resource address, used to build each option's fragment.
pub fn select_representation<'a>(
    schema: &'a Schema,
    content_type: &str,
    uri: &str,
) -> Representation<'a> {
    let media_type = media_type_from_content_type(content_type);
    let fragment = schema.get_fragment(&media_type);
    let options = schema
        .media_types()
        .map(|mt| RepresentationOption {
            media_type: mt.to_string(),
            name: representation_from_media_type(mt),
            selected: mt == media_type,
            fragment: Address::with_media_type(uri, mt).to_fragment(),
        })
        .collect();
    Representation {
        media_type,
        fragment,
        options,
    }
}

/// Short representation name of a media type.
///
/// `application/vnd.ccp.eve.foo+json` becomes `foo`. Any other media type
/// keeps its whole name, with `/` written as `-` and a structured-syntax
/// suffix as an extension: `application/hal+json` becomes
/// `application-hal.json`, distinct from `application/hal`.
pub fn representation_from_media_type(media_type: &str) -> String {
    let vendor_json = media_type
        .strip_prefix(VENDOR_PREFIX)
        .and_then(|rest| rest.strip_suffix(JSON_SUFFIX))
        .filter(|name| !name.is_empty());
    match vendor_json {
        Some(name) => name.to_string(),
        None => media_type.replace('/', "-").replace('+', "."),
    }
}

/// File name offered for downloading a representation's schema.
pub fn schema_file_name(media_type: &str) -> String {
    format!("{}.json", representation_from_media_type(media_type))
}

/// The schema fragment as a 4-space indented JSON document.
pub fn schema_document(fragment: &Value) -> String {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    match fragment.serialize(&mut ser) {
        Ok(()) => String::from_utf8(buf).unwrap_or_default(),
        // Serializing a `Value` into memory cannot fail.
        Err(_) => fragment.to_string(),
    }
}

/// `data:` URI carrying [`schema_document`], for browser downloads.
pub fn schema_data_uri(fragment: &Value) -> String {
    format!(
        "data:application/json;charset=utf-8,{}",
        urlencoding::encode(&schema_document(fragment))
    )
}
