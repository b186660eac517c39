//! OAuth implicit-grant helpers: authorization URLs and callback checking.
//!
//! The host performs the redirects and keeps the CSRF state somewhere that
//! survives them; this module only builds and checks strings.
//!
//! ```text
//! // 1. Before redirecting, remember a fresh state token.
//! let request = AuthorizationRequest::new(endpoint, client_id, redirect_uri, scopes);
//! store(request.state.clone());
//! redirect(request.url()?);
//!
//! // 2. Back from the server, the token arrives in the hash.
//! let callback = OAuthCallback::from_hash(&location_hash).unwrap();
//! let token = callback.verify(stored_state.as_deref())?;
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ExplorerError;

/// Parameters of an implicit-grant authorization redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    pub endpoint: String,
    pub client_id: String,
    pub redirect_uri: String,
    /// Space-separated scope list.
    pub scopes: String,
    /// CSRF token echoed back by the server in the callback's `state`.
    pub state: String,
}

impl AuthorizationRequest {
    /// A request with a freshly generated CSRF state token.
    pub fn new(
        endpoint: impl Into<String>,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        scopes: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scopes: scopes.into(),
            state: new_csrf_token(),
        }
    }

    /// `<endpoint>?response_type=token&client_id=…&scope=…&redirect_uri=…&state=…`
    pub fn url(&self) -> Result<String, ExplorerError> {
        let mut url = url::Url::parse(&self.endpoint)
            .map_err(|_| ExplorerError::NonAbsoluteUri(self.endpoint.clone()))?;
        url.query_pairs_mut()
            .append_pair("response_type", "token")
            .append_pair("client_id", &self.client_id)
            .append_pair("scope", &self.scopes)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("state", &self.state);
        Ok(url.into())
    }
}

/// Token and state carried by the authorization server's redirect hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCallback {
    pub access_token: String,
    pub state: Option<String>,
}

impl OAuthCallback {
    /// Read the callback out of `hash`; `None` when it holds no access token.
    pub fn from_hash(hash: &str) -> Option<Self> {
        let access_token = extract_from_hash("access_token", hash)?;
        Some(Self {
            access_token,
            state: extract_from_hash("state", hash),
        })
    }

    /// The access token, provided `state` matches the stored CSRF token.
    ///
    /// A missing stored token or a missing `state` is a mismatch too.
    pub fn verify(self, expected_state: Option<&str>) -> Result<String, ExplorerError> {
        match (self.state.as_deref(), expected_state) {
            (Some(got), Some(want)) if got == want => Ok(self.access_token),
            _ => Err(ExplorerError::CsrfMismatch),
        }
    }
}

/// Value of `name=` in an OAuth-style `a=1&b=2` hash, decoded.
pub fn extract_from_hash(name: &str, hash: &str) -> Option<String> {
    let re = Regex::new(&format!("(?:^|[#&?]){}=([^&]+)", regex::escape(name))).ok()?;
    let raw = re.captures(hash)?.get(1)?.as_str();
    Some(
        urlencoding::decode(raw)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw.to_string()),
    )
}

/// A random RFC 4122 version 4 UUID, used as CSRF state.
pub fn new_csrf_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_url_carries_all_parameters() {
        let mut req = AuthorizationRequest::new(
            "https://login.example/oauth/authorize/",
            "client",
            "http://localhost/app/",
            "publicData characterLocationRead",
        );
        req.state = "s-1".into();
        let url = req.url().unwrap();
        assert!(url.starts_with("https://login.example/oauth/authorize/?response_type=token"));
        assert!(url.contains("client_id=client"));
        assert!(url.contains("scope=publicData+characterLocationRead"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%2Fapp%2F"));
        assert!(url.ends_with("state=s-1"));
    }

    #[test]
    fn authorization_url_rejects_relative_endpoint() {
        let req = AuthorizationRequest::new("/authorize", "c", "r", "s");
        assert!(matches!(req.url(), Err(ExplorerError::NonAbsoluteUri(_))));
    }

    #[test]
    fn csrf_tokens_are_fresh_v4_uuids() {
        let a = new_csrf_token();
        let b = new_csrf_token();
        assert_ne!(a, b);
        assert_eq!(uuid::Uuid::parse_str(&a).unwrap().get_version_num(), 4);
    }

    #[test]
    fn extracts_hash_values() {
        let hash = "#access_token=abc%2Fdef&token_type=Bearer&expires_in=1200&state=xyz";
        assert_eq!(extract_from_hash("access_token", hash).as_deref(), Some("abc/def"));
        assert_eq!(extract_from_hash("state", hash).as_deref(), Some("xyz"));
        assert_eq!(extract_from_hash("missing", hash), None);
    }

    #[test]
    fn extraction_matches_whole_names() {
        assert_eq!(extract_from_hash("state", "#mystate=1"), None);
    }

    #[test]
    fn matching_state_yields_token() {
        let cb = OAuthCallback::from_hash("#access_token=tok&state=s-1").unwrap();
        assert_eq!(cb.verify(Some("s-1")), Ok("tok".to_string()));
    }

    #[test]
    fn mismatched_state_is_rejected() {
        let cb = OAuthCallback::from_hash("#access_token=tok&state=forged").unwrap();
        assert_eq!(cb.verify(Some("s-1")), Err(ExplorerError::CsrfMismatch));
    }

    #[test]
    fn missing_state_is_rejected() {
        let cb = OAuthCallback::from_hash("#access_token=tok").unwrap();
        assert_eq!(cb.clone().verify(Some("s-1")), Err(ExplorerError::CsrfMismatch));
        let cb = OAuthCallback::from_hash("#access_token=tok&state=s-1").unwrap();
        assert_eq!(cb.verify(None), Err(ExplorerError::CsrfMismatch));
    }

    #[test]
    fn hash_without_token_is_not_a_callback() {
        assert_eq!(OAuthCallback::from_hash("#http://e/"), None);
    }
}
