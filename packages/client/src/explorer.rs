//! The fetch-then-render pipeline.
//!
//! One [`Explorer`] owns the data pane for a session. Each navigation:
//!
//! 1. parses the address fragment (rejecting relative addresses before any
//!    request is made) and takes a [`Ticket`] from the [`Navigator`];
//! 2. requests `OPTIONS uri` and resolves the body into a [`Schema`];
//! 3. requests `GET uri` with the navigator's headers;
//! 4. selects the representation's schema fragment and renders the body;
//! 5. replaces the pane, unless a newer navigation has started meanwhile,
//!    in which case the result is dropped.
//!
//! Any failure in steps 2–4 replaces the pane with the error; the previous
//! page is never left on display.

use std::sync::{Arc, Mutex};

use crestexplorer::media::{schema_data_uri, schema_file_name};
use crestexplorer::{
    build_element, select_representation, Address, DescriptorResolver, DisplayNode,
    ExplorerError, Navigator, RepresentationOption, Schema, SchemaResolver, Ticket,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ExplorerConfig;
use crate::transport::{HttpTransport, Transport};

/// A rendered resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub address: Address,
    /// Normalized media type the server answered with.
    pub media_type: String,
    /// Every described representation, the received one `selected`.
    pub representations: Vec<RepresentationOption>,
    pub tree: DisplayNode,
    /// Schema fragment used for rendering; `None` when the schema lacks one.
    pub schema: Option<Value>,
}

impl Page {
    /// File name for downloading [`Page::schema`].
    pub fn schema_file_name(&self) -> String {
        schema_file_name(&self.media_type)
    }

    /// `data:` URI carrying [`Page::schema`], when there is one.
    pub fn schema_data_uri(&self) -> Option<String> {
        self.schema.as_ref().map(schema_data_uri)
    }
}

/// What the data pane currently shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PaneState {
    #[default]
    Empty,
    Rendered(Page),
    Failed(String),
}

/// A browsing session: navigator state, transport, resolver, and the pane.
pub struct Explorer {
    transport: Arc<dyn Transport>,
    resolver: Arc<dyn SchemaResolver>,
    navigator: Mutex<Navigator>,
    pane: Mutex<PaneState>,
}

impl Explorer {
    pub fn new(
        transport: Arc<dyn Transport>,
        resolver: Arc<dyn SchemaResolver>,
        navigator: Navigator,
    ) -> Self {
        Self {
            transport,
            resolver,
            navigator: Mutex::new(navigator),
            pane: Mutex::new(PaneState::Empty),
        }
    }

    /// An HTTP-backed explorer for servers whose OPTIONS body is a schema
    /// descriptor, authenticated when the config carries a token.
    pub fn from_config(config: &ExplorerConfig) -> Result<Self, ExplorerError> {
        let transport = HttpTransport::with_timeout(config.timeout)?;
        let navigator = match &config.token {
            Some(token) => Navigator::with_token(token.as_str()),
            None => Navigator::new(),
        };
        Ok(Self::new(Arc::new(transport), Arc::new(DescriptorResolver), navigator))
    }

    /// Navigate to an address fragment and render it.
    ///
    /// Returns `Ok(None)` when the result was discarded because a newer
    /// navigation started while this one was in flight. A rejected address
    /// counts as newer: the pane shows the error and outstanding loads are
    /// discarded.
    pub async fn navigate(&self, fragment: &str) -> Result<Option<Page>, ExplorerError> {
        let ticket = {
            let mut navigator = self.navigator.lock().unwrap();
            let ticket = navigator.navigate(fragment);
            if ticket.is_err() {
                navigator.supersede();
            }
            ticket
        };
        match ticket {
            Ok(ticket) => self.load(ticket).await,
            Err(e) => {
                warn!("explorer: rejected address {fragment:?}: {e}");
                *self.pane.lock().unwrap() = PaneState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Re-render the current address. `Ok(None)` when there is none yet or
    /// the result went stale.
    pub async fn refresh(&self) -> Result<Option<Page>, ExplorerError> {
        let ticket = self.navigator.lock().unwrap().refresh();
        match ticket {
            Some(ticket) => self.load(ticket).await,
            None => Ok(None),
        }
    }

    /// Run the pipeline for `ticket` and apply the outcome if still current.
    pub async fn load(&self, ticket: Ticket) -> Result<Option<Page>, ExplorerError> {
        info!("explorer: loading {} (seq {})", ticket.address, ticket.seq);
        let headers = self
            .navigator
            .lock()
            .unwrap()
            .request_headers(&ticket.address);

        let outcome = self.fetch(&ticket.address, &headers).await;

        if !self.navigator.lock().unwrap().is_current(&ticket) {
            debug!(
                "explorer: discarding stale result for {} (seq {})",
                ticket.address, ticket.seq
            );
            return Ok(None);
        }

        let mut pane = self.pane.lock().unwrap();
        match outcome {
            Ok(page) => {
                *pane = PaneState::Rendered(page.clone());
                Ok(Some(page))
            }
            Err(e) => {
                warn!("explorer: failed to load {}: {e}", ticket.address);
                *pane = PaneState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    async fn fetch(&self, address: &Address, headers: &[(String, String)]) -> Result<Page, ExplorerError> {
        let options = self.transport.options(&address.uri, headers).await?;
        let schema: Schema = self.resolver.resolve(&options)?;

        let fetched = self.transport.get(&address.uri, headers).await?;
        let representation = select_representation(&schema, &fetched.content_type, &address.uri);
        if let Some(miss) = representation.lookup_miss() {
            warn!("explorer: {miss}; rendering without schema");
        }

        let tree = build_element(&fetched.body, representation.fragment);
        Ok(Page {
            address: address.clone(),
            media_type: representation.media_type,
            representations: representation.options,
            tree,
            schema: representation.fragment.cloned(),
        })
    }

    /// Snapshot of the pane.
    pub fn pane(&self) -> PaneState {
        self.pane.lock().unwrap().clone()
    }

    /// Run `f` against the navigator, e.g. to log in or out.
    pub fn with_navigator<R>(&self, f: impl FnOnce(&mut Navigator) -> R) -> R {
        let mut navigator = self.navigator.lock().unwrap();
        f(&mut navigator)
    }

    /// Accept an OAuth callback hash; see [`Navigator::complete_login`].
    ///
    /// On a CSRF mismatch the pane shows the error and no token is kept.
    pub fn complete_login(&self, hash: &str) -> Result<Option<String>, ExplorerError> {
        let result = self.with_navigator(|nav| nav.complete_login(hash));
        if let Err(e) = &result {
            warn!("explorer: login rejected: {e}");
            *self.pane.lock().unwrap() = PaneState::Failed(e.to_string());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Fetched;
    use async_trait::async_trait;
    use crestexplorer::{Item, Link};
    use serde_json::json;
    use std::collections::HashMap;
    use tokio::sync::Notify;

    const MT: &str = "application/vnd.ccp.eve.Api-v3+json";

    /// In-memory transport: per-URI options and GET responses, with an
    /// optional gate that holds a GET until released.
    #[derive(Default)]
    struct FakeTransport {
        options: HashMap<String, String>,
        bodies: HashMap<String, Result<Fetched, ExplorerError>>,
        gates: HashMap<String, Arc<Notify>>,
        seen_headers: Mutex<Vec<Vec<(String, String)>>>,
    }

    impl FakeTransport {
        fn resource(mut self, uri: &str, schema: Value, body: Value) -> Self {
            self.options.insert(uri.into(), json!({ "GET": { MT: schema } }).to_string());
            self.bodies.insert(
                uri.into(),
                Ok(Fetched {
                    content_type: format!("{MT}; charset=utf-8"),
                    body,
                }),
            );
            self
        }

        fn failing(mut self, uri: &str) -> Self {
            self.options.insert(uri.into(), String::new());
            self.bodies.insert(
                uri.into(),
                Err(ExplorerError::Transport(format!("GET {uri} returned status 503"))),
            );
            self
        }

        fn gated(mut self, uri: &str, gate: Arc<Notify>) -> Self {
            self.gates.insert(uri.into(), gate);
            self
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn options(&self, uri: &str, _: &[(String, String)]) -> Result<String, ExplorerError> {
            self.options
                .get(uri)
                .cloned()
                .ok_or_else(|| ExplorerError::Transport(format!("OPTIONS {uri} returned status 404")))
        }

        async fn get(&self, uri: &str, headers: &[(String, String)]) -> Result<Fetched, ExplorerError> {
            self.seen_headers.lock().unwrap().push(headers.to_vec());
            if let Some(gate) = self.gates.get(uri) {
                gate.notified().await;
            }
            self.bodies
                .get(uri)
                .cloned()
                .unwrap_or_else(|| Err(ExplorerError::Transport(format!("GET {uri} returned status 404"))))
        }
    }

    fn explorer(transport: FakeTransport) -> Explorer {
        Explorer::new(Arc::new(transport), Arc::new(DescriptorResolver), Navigator::new())
    }

    #[tokio::test]
    async fn renders_with_schema_descriptions() {
        let ex = explorer(FakeTransport::default().resource(
            "http://api.example/x",
            json!({ "properties": { "status": { "description": "state" } } }),
            json!({ "href": "http://api.example/x", "name": "X", "status": "ok" }),
        ));
        let page = ex.navigate("#http://api.example/x").await.unwrap().unwrap();
        assert_eq!(page.media_type, MT);
        assert_eq!(
            page.tree,
            DisplayNode::UnorderedList {
                items: vec![
                    Item::Link(Link {
                        href: "http://api.example/x".into(),
                        label: "X".into(),
                        title: None,
                    }),
                    Item::Entry {
                        label: "status".into(),
                        title: Some("state".into()),
                        value: DisplayNode::text("ok"),
                    },
                ]
            }
        );
        assert_eq!(page.schema_file_name(), "Api-v3.json");
        assert!(page.schema_data_uri().is_some());
        assert_eq!(ex.pane(), PaneState::Rendered(page));
    }

    #[tokio::test]
    async fn relative_address_fails_without_requests() {
        let transport = Arc::new(FakeTransport::default());
        let ex = Explorer::new(transport.clone(), Arc::new(DescriptorResolver), Navigator::new());
        let err = ex.navigate("#/regions/").await.unwrap_err();
        assert!(matches!(err, ExplorerError::NonAbsoluteUri(_)));
        assert!(transport.seen_headers.lock().unwrap().is_empty());
        assert!(matches!(ex.pane(), PaneState::Failed(_)));
    }

    #[tokio::test]
    async fn transport_failure_replaces_previous_page() {
        let ex = explorer(
            FakeTransport::default()
                .resource("http://e/ok", json!({}), json!({ "a": 1 }))
                .failing("http://e/down"),
        );
        ex.navigate("http://e/ok").await.unwrap();
        assert!(matches!(ex.pane(), PaneState::Rendered(_)));

        let err = ex.navigate("http://e/down").await.unwrap_err();
        assert!(matches!(err, ExplorerError::Transport(_)));
        assert_eq!(ex.pane(), PaneState::Failed(err.to_string()));
    }

    #[tokio::test]
    async fn schema_miss_renders_schema_less() {
        let mut transport = FakeTransport::default();
        transport.options.insert("http://e/".into(), json!({ "GET": {} }).to_string());
        transport.bodies.insert(
            "http://e/".into(),
            Ok(Fetched {
                content_type: "application/json; charset=utf-8".into(),
                body: json!({ "a": 1 }),
            }),
        );
        let page = explorer(transport).navigate("http://e/").await.unwrap().unwrap();
        assert_eq!(page.schema, None);
        assert_eq!(page.media_type, "application/json");
        assert_eq!(page.tree.len(), 1);
    }

    #[tokio::test]
    async fn stale_completion_is_discarded() {
        let gate = Arc::new(Notify::new());
        let ex = Arc::new(explorer(
            FakeTransport::default()
                .resource("http://e/slow", json!({}), json!("slow"))
                .resource("http://e/fast", json!({}), json!("fast"))
                .gated("http://e/slow", gate.clone()),
        ));

        let slow = {
            let ex = Arc::clone(&ex);
            tokio::spawn(async move { ex.navigate("http://e/slow").await })
        };
        // Let the slow navigation reach its gated GET.
        tokio::task::yield_now().await;
        while ex.with_navigator(|nav| nav.current().map(|a| a.uri.clone())) != Some("http://e/slow".to_string()) {
            tokio::task::yield_now().await;
        }

        let fast = ex.navigate("http://e/fast").await.unwrap().unwrap();
        gate.notify_one();
        let slow = slow.await.unwrap().unwrap();

        assert_eq!(slow, None);
        assert_eq!(ex.pane(), PaneState::Rendered(fast));
    }

    #[tokio::test]
    async fn rejected_address_discards_in_flight_navigation() {
        let gate = Arc::new(Notify::new());
        let ex = Arc::new(explorer(
            FakeTransport::default()
                .resource("http://e/slow", json!({}), json!("slow"))
                .gated("http://e/slow", gate.clone()),
        ));

        let slow = {
            let ex = Arc::clone(&ex);
            tokio::spawn(async move { ex.navigate("http://e/slow").await })
        };
        tokio::task::yield_now().await;
        while ex.with_navigator(|nav| nav.current().map(|a| a.uri.clone())) != Some("http://e/slow".to_string()) {
            tokio::task::yield_now().await;
        }

        let err = ex.navigate("#/relative").await.unwrap_err();
        assert_eq!(err, ExplorerError::NonAbsoluteUri("/relative".into()));
        gate.notify_one();
        let slow = slow.await.unwrap().unwrap();

        assert_eq!(slow, None);
        assert_eq!(ex.pane(), PaneState::Failed(err.to_string()));
        assert_eq!(ex.refresh().await.unwrap(), None);
    }

    #[tokio::test]
    async fn refresh_reloads_current_address() {
        let ex = explorer(FakeTransport::default().resource("http://e/", json!({}), json!(1)));
        assert_eq!(ex.refresh().await.unwrap(), None);
        ex.navigate("http://e/").await.unwrap();
        let page = ex.refresh().await.unwrap().unwrap();
        assert_eq!(page.tree, DisplayNode::text("1"));
    }

    #[tokio::test]
    async fn csrf_mismatch_keeps_requests_anonymous() {
        let transport = Arc::new(FakeTransport::default().resource("http://e/", json!({}), json!(1)));
        let ex = Explorer::new(transport.clone(), Arc::new(DescriptorResolver), Navigator::new());
        ex.with_navigator(|nav| nav.begin_login("https://sso.example/authorize", "c", "http://app/", "publicData"));

        let err = ex.complete_login("#access_token=stolen&state=forged").unwrap_err();
        assert_eq!(err, ExplorerError::CsrfMismatch);
        assert_eq!(ex.pane(), PaneState::Failed("CSRF token mismatch".into()));

        ex.navigate("http://e/").await.unwrap();
        let seen = transport.seen_headers.lock().unwrap();
        assert!(seen[0].iter().all(|(name, _)| name != "Authorization"));
    }

    #[tokio::test]
    async fn accepted_token_is_sent() {
        let transport = Arc::new(FakeTransport::default().resource("http://e/", json!({}), json!(1)));
        let ex = Explorer::new(transport.clone(), Arc::new(DescriptorResolver), Navigator::with_token("tok"));
        ex.navigate(&format!("#http://e/#{MT}")).await.unwrap();
        let seen = transport.seen_headers.lock().unwrap();
        assert!(seen[0].contains(&("Authorization".to_string(), "Bearer tok".to_string())));
        assert!(seen[0].contains(&("Accept".to_string(), format!("{MT}, charset=utf-8"))));
    }
}
