//! Address fragments: where the explorer is, encoded after `#`.
//!
//! ```text
//! #https://crest-tq.eveonline.com/
//! #https://crest-tq.eveonline.com/regions/#application/vnd.ccp.eve.RegionCollection-v1+json
//! ```
//!
//! The first `#` introduces the resource URI; a second `#` separates an
//! explicit media-type override, sent as the request's `Accept` header.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ExplorerError;

/// `Accept` value used when no representation is requested explicitly.
pub const DEFAULT_ACCEPT: &str = "application/json, charset=utf-8";

/// A navigable location: an absolute URI plus an optional representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl Address {
    /// Parse an absolute URI, optionally followed by `#<media-type>`.
    ///
    /// A leading `#` is accepted and ignored, so both `location.hash` and a
    /// bare URI parse the same way.
    pub fn parse(input: &str) -> Result<Self, ExplorerError> {
        let input = input.strip_prefix('#').unwrap_or(input);
        let (uri, media_type) = match input.split_once('#') {
            Some((uri, mt)) if !mt.trim().is_empty() => (uri, Some(mt.trim().to_string())),
            Some((uri, _)) => (uri, None),
            None => (input, None),
        };
        let uri = uri.trim();
        ensure_absolute(uri)?;
        Ok(Self {
            uri: uri.to_string(),
            media_type,
        })
    }

    /// An address for `uri` in its default representation. Not validated.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            media_type: None,
        }
    }

    /// An address for `uri` with an explicit representation. Not validated.
    pub fn with_media_type(uri: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            media_type: Some(media_type.into()),
        }
    }

    /// `#<uri>` or `#<uri>#<media-type>`.
    pub fn to_fragment(&self) -> String {
        format!("#{self}")
    }

    /// The `Accept` header value for requesting this address.
    pub fn accept_header(&self) -> String {
        match &self.media_type {
            Some(mt) => format!("{mt}, charset=utf-8"),
            None => DEFAULT_ACCEPT.to_string(),
        }
    }
}

/// Formats as the fragment body, without the leading `#`.
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.media_type {
            Some(mt) => write!(f, "{}#{}", self.uri, mt),
            None => write!(f, "{}", self.uri),
        }
    }
}

impl std::str::FromStr for Address {
    type Err = ExplorerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

/// Reject anything that is not an absolute `http` or `https` URI.
pub fn ensure_absolute(uri: &str) -> Result<(), ExplorerError> {
    match url::Url::parse(uri) {
        Ok(u) if matches!(u.scheme(), "http" | "https") && u.has_host() => Ok(()),
        _ => Err(ExplorerError::NonAbsoluteUri(uri.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MT: &str = "application/vnd.ccp.eve.Api-v3+json";

    #[test]
    fn parses_bare_uri() {
        let a = Address::parse("https://crest.example/").unwrap();
        assert_eq!(a, Address::new("https://crest.example/"));
    }

    #[test]
    fn parses_fragment_with_override() {
        let a = Address::parse(&format!("#https://crest.example/regions/#{MT}")).unwrap();
        assert_eq!(a.uri, "https://crest.example/regions/");
        assert_eq!(a.media_type.as_deref(), Some(MT));
    }

    #[test]
    fn empty_override_is_ignored() {
        let a = Address::parse("#http://e/#").unwrap();
        assert_eq!(a.media_type, None);
    }

    #[test]
    fn fragment_round_trips() {
        let a = Address::with_media_type("http://e/x/", MT);
        assert_eq!(Address::parse(&a.to_fragment()).unwrap(), a);
        assert_eq!(a.to_fragment(), format!("#http://e/x/#{MT}"));
    }

    #[test]
    fn rejects_relative_addresses() {
        for input in ["", "#", "/regions/", "regions/", "#/regions/", "ftp://e/", "mailto:a@b", "http//e/"] {
            assert!(
                matches!(Address::parse(input), Err(ExplorerError::NonAbsoluteUri(_))),
                "{input:?} must be rejected"
            );
        }
    }

    #[test]
    fn accept_headers() {
        assert_eq!(Address::new("http://e/").accept_header(), DEFAULT_ACCEPT);
        assert_eq!(
            Address::with_media_type("http://e/", MT).accept_header(),
            format!("{MT}, charset=utf-8")
        );
    }
}
