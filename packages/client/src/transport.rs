//! HTTP transport abstraction.
//!
//! The [`Transport`] trait is the seam between the explorer pipeline and the
//! network. [`HttpTransport`] is the `reqwest` implementation; tests can
//! substitute an in-memory one.

use async_trait::async_trait;
use crestexplorer::ExplorerError;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;

/// `Content-Type` assumed when a response does not carry one.
const FALLBACK_CONTENT_TYPE: &str = "application/json";

/// A successful GET: the representation and how the server labelled it.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    /// Raw `Content-Type` header value, parameters included.
    pub content_type: String,
    pub body: Value,
}

/// The two requests a navigation issues.
///
/// `headers` are the name/value pairs prepared by the navigator (`Accept`,
/// and `Authorization` once logged in). Every failure, non-2xx statuses
/// included, is reported as [`ExplorerError::Transport`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// `OPTIONS uri`, returning the body as text.
    async fn options(&self, uri: &str, headers: &[(String, String)]) -> Result<String, ExplorerError>;

    /// `GET uri`, returning the JSON body and its content type.
    async fn get(&self, uri: &str, headers: &[(String, String)]) -> Result<Fetched, ExplorerError>;
}

/// [`Transport`] over a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Wrap a pre-configured client (e.g. with a timeout).
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// A client with the given request timeout.
    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, ExplorerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport_error)?;
        Ok(Self::new(client))
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        headers: &[(String, String)],
    ) -> Result<reqwest::Response, ExplorerError> {
        let request = apply_headers(self.client.request(method.clone(), uri), headers);
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExplorerError::Transport(format!(
                "{method} {uri} returned status {}",
                status.as_u16()
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn options(&self, uri: &str, headers: &[(String, String)]) -> Result<String, ExplorerError> {
        let response = self.send(Method::OPTIONS, uri, headers).await?;
        response.text().await.map_err(transport_error)
    }

    async fn get(&self, uri: &str, headers: &[(String, String)]) -> Result<Fetched, ExplorerError> {
        let response = self.send(Method::GET, uri, headers).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let body = response.json::<Value>().await.map_err(transport_error)?;
        Ok(Fetched { content_type, body })
    }
}

fn apply_headers(mut request: RequestBuilder, headers: &[(String, String)]) -> RequestBuilder {
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }
    request
}

/// Fold a `reqwest` failure into the explorer's error type.
pub fn transport_error(e: reqwest::Error) -> ExplorerError {
    ExplorerError::Transport(e.to_string())
}
