//! Explorer configuration, populated from environment variables.

use std::time::Duration;

/// OAuth client id registered for the explorer.
pub const DEFAULT_CLIENT_ID: &str = "c8cc66f9e3a9488993f553264fc5f428";

/// Runtime configuration for an explorer session.
///
/// All fields are populated from environment variables with defaults, so
/// public resources can be browsed with zero configuration.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `CREST_TOKEN` | (absent) | Bearer token sent with every request |
/// | `CREST_TIMEOUT_SECS` | `30` | HTTP request timeout |
/// | `CREST_REFRESH_SECS` | (absent = no refresh) | Seconds between auto-refreshes |
/// | `CREST_CLIENT_ID` | built-in id | OAuth client id |
/// | `CREST_AUTHORIZE_URL` | EVE SSO authorize endpoint | OAuth authorization endpoint |
/// | `CREST_REDIRECT_URI` | `http://localhost/crestexplorer/` | OAuth redirect target |
/// | `CREST_SCOPES` | `publicData` | Space-separated OAuth scopes |
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerConfig {
    pub token: Option<String>,
    pub timeout: Duration,
    /// `None` disables auto-refresh.
    pub refresh_interval: Option<Duration>,
    pub client_id: String,
    pub authorize_url: String,
    pub redirect_uri: String,
    pub scopes: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            token: None,
            timeout: Duration::from_secs(30),
            refresh_interval: None,
            client_id: DEFAULT_CLIENT_ID.into(),
            authorize_url: "https://login.eveonline.com/oauth/authorize/".into(),
            redirect_uri: "http://localhost/crestexplorer/".into(),
            scopes: "publicData".into(),
        }
    }
}

impl ExplorerConfig {
    /// Populate config from the process environment, applying defaults where absent.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Populate config from an arbitrary variable source.
    ///
    /// Unparseable numeric values fall back to their defaults; a zero refresh
    /// interval disables refreshing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let timeout = lookup("CREST_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let refresh_interval = lookup("CREST_REFRESH_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self {
            token: lookup("CREST_TOKEN").filter(|t| !t.is_empty()),
            timeout,
            refresh_interval,
            client_id: lookup("CREST_CLIENT_ID").unwrap_or(defaults.client_id),
            authorize_url: lookup("CREST_AUTHORIZE_URL").unwrap_or(defaults.authorize_url),
            redirect_uri: lookup("CREST_REDIRECT_URI").unwrap_or(defaults.redirect_uri),
            scopes: lookup("CREST_SCOPES").unwrap_or(defaults.scopes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        assert_eq!(ExplorerConfig::from_lookup(lookup(&[])), ExplorerConfig::default());
    }

    #[test]
    fn reads_all_variables() {
        let config = ExplorerConfig::from_lookup(lookup(&[
            ("CREST_TOKEN", "tok"),
            ("CREST_TIMEOUT_SECS", "5"),
            ("CREST_REFRESH_SECS", "60"),
            ("CREST_CLIENT_ID", "cid"),
            ("CREST_AUTHORIZE_URL", "https://sso.example/authorize"),
            ("CREST_REDIRECT_URI", "http://app.example/"),
            ("CREST_SCOPES", "publicData characterLocationRead"),
        ]));
        assert_eq!(config.token.as_deref(), Some("tok"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.refresh_interval, Some(Duration::from_secs(60)));
        assert_eq!(config.client_id, "cid");
        assert_eq!(config.authorize_url, "https://sso.example/authorize");
        assert_eq!(config.redirect_uri, "http://app.example/");
        assert_eq!(config.scopes, "publicData characterLocationRead");
    }

    #[test]
    fn bad_numbers_fall_back() {
        let config = ExplorerConfig::from_lookup(lookup(&[
            ("CREST_TIMEOUT_SECS", "soon"),
            ("CREST_REFRESH_SECS", "0"),
            ("CREST_TOKEN", ""),
        ]));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.refresh_interval, None);
        assert_eq!(config.token, None);
    }
}
