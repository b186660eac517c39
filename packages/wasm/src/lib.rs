//! WebAssembly bindings for the CREST explorer core.
//!
//! The page does its own `fetch`; these bindings do everything else. Compile
//! with `wasm-pack build` to produce an npm-ready package.
//!
//! ## Rendering — [`render_html`], [`render_tree`], [`select_representation`]
//!
//! ```js
//! import init, { renderHtml, selectRepresentation } from './crestexplorer_wasm.js';
//! await init();
//!
//! const rep = JSON.parse(selectRepresentation(optionsText, contentType, uri));
//! pane.innerHTML = renderHtml(bodyText, rep.schema ? JSON.stringify(rep.schema) : undefined);
//! ```
//!
//! ## Session — [`BrowserSession`]
//!
//! ```js
//! const session = new BrowserSession();
//! window.onhashchange = async () => {
//!   const ticket = JSON.parse(session.navigate(location.hash));
//!   const headers = Object.fromEntries(ticket.headers);
//!   const options = await fetch(ticket.uri, { method: 'OPTIONS', headers }).then(r => r.text());
//!   const res = await fetch(ticket.uri, { headers });
//!   const page = session.renderResponse(ticket.seq, options, res.headers.get('Content-Type'), await res.text());
//!   if (page !== undefined) pane.innerHTML = JSON.parse(page).html;  // undefined: superseded
//! };
//! ```
//!
//! Structured results cross the boundary as JSON strings, like the inputs.

use crestexplorer::media::{schema_data_uri, schema_file_name as file_name_for};
use crestexplorer::{
    build_element, is_link, present, Address, DescriptorResolver, DisplayNode, Navigator,
    Representation, SchemaResolver,
};
use serde_json::{json, Value};
use wasm_bindgen::prelude::*;

/// One-time initialisation called at the start of every exported function.
///
/// Installs the `console_error_panic_hook` when the feature is enabled so
/// that Rust panics are forwarded to the browser console as readable errors
/// rather than appearing as generic "unreachable" WASM traps.
fn setup() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse(json: &str, what: &str) -> Result<Value, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("{what} parse error: {e}")))
}

fn build(json: &str, schema_json: Option<String>) -> Result<DisplayNode, JsValue> {
    let value = parse(json, "body")?;
    let schema = schema_json.map(|s| parse(&s, "schema")).transpose()?;
    Ok(build_element(&value, schema.as_ref()))
}

/// Render a JSON document as the data pane's HTML.
///
/// `schema_json` is the schema fragment for the document's representation,
/// or `undefined` to render without descriptions.
#[wasm_bindgen(js_name = renderHtml)]
pub fn render_html(json: &str, schema_json: Option<String>) -> Result<String, JsValue> {
    setup();
    Ok(present::to_html(&build(json, schema_json)?))
}

/// Render a JSON document into its display tree, returned as JSON.
///
/// Nodes are tagged by `kind`: `text`, `link`, `ordered_list`,
/// `unordered_list`. Hosts that build their own DOM walk this instead of
/// using [`render_html`].
#[wasm_bindgen(js_name = renderTree)]
pub fn render_tree(json: &str, schema_json: Option<String>) -> Result<String, JsValue> {
    setup();
    serde_json::to_string(&build(json, schema_json)?).map_err(js_err)
}

/// True when `json` is a link object: only `href`/`name`, both non-empty strings.
#[wasm_bindgen(js_name = isLink)]
pub fn is_link_json(json: &str) -> Result<bool, JsValue> {
    setup();
    Ok(is_link(&parse(json, "value")?))
}

/// Parse an address fragment (`#<uri>[#<media-type>]`).
///
/// Returns `{ "uri", "mediaType", "accept" }` as JSON, with `mediaType`
/// `null` when no override is present. Throws on a relative address.
#[wasm_bindgen(js_name = parseAddress)]
pub fn parse_address(fragment: &str) -> Result<String, JsValue> {
    setup();
    let address = Address::parse(fragment).map_err(js_err)?;
    Ok(json!({
        "uri":       address.uri,
        "mediaType": address.media_type,
        "accept":    address.accept_header(),
    })
    .to_string())
}

/// Download name for a representation's schema, e.g. `Api-v3.json`.
#[wasm_bindgen(js_name = schemaFileName)]
pub fn schema_file_name(media_type: &str) -> String {
    file_name_for(media_type)
}

/// Match a response against the resource's OPTIONS body.
///
/// Returns, as JSON:
///
/// ```json
/// {
///   "mediaType":       "application/vnd.ccp.eve.Api-v3+json",
///   "schema":          { … } | null,
///   "representations": [{ "media_type", "name", "selected", "fragment" }, …],
///   "schemaFileName":  "Api-v3.json",
///   "schemaDataUri":   "data:application/json;…" | null
/// }
/// ```
///
/// `schema` is `null` when the OPTIONS body does not describe the response's
/// media type; render without it. Throws when the OPTIONS body is not a
/// schema descriptor.
#[wasm_bindgen(js_name = selectRepresentation)]
pub fn select_representation(
    options_body: &str,
    content_type: &str,
    uri: &str,
) -> Result<String, JsValue> {
    setup();
    let schema = DescriptorResolver.resolve(options_body).map_err(js_err)?;
    let rep = crestexplorer::select_representation(&schema, content_type, uri);
    Ok(representation_json(&rep).to_string())
}

fn representation_json(rep: &Representation<'_>) -> Value {
    json!({
        "mediaType":       rep.media_type,
        "schema":          rep.fragment,
        "representations": rep.options,
        "schemaFileName":  file_name_for(&rep.media_type),
        "schemaDataUri":   rep.fragment.map(schema_data_uri),
    })
}

// ── Session ──────────────────────────────────────────────────────────────────

/// Navigation state for one browser tab.
///
/// Tracks the current address, the access token, the CSRF state of a login
/// in progress, and which navigation is the newest. A login redirect reloads
/// the page, so the host persists [`pendingState`] and [`pendingReturnTo`]
/// (e.g. in a cookie) and hands them back through [`restorePendingLogin`].
#[wasm_bindgen]
pub struct BrowserSession {
    inner: Navigator,
}

#[wasm_bindgen]
impl BrowserSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        setup();
        Self {
            inner: Navigator::new(),
        }
    }

    /// Start navigating to `fragment`.
    ///
    /// Returns the ticket as JSON: `{ "seq", "uri", "mediaType", "headers" }`
    /// where `headers` is a list of `[name, value]` pairs for both requests.
    /// Throws on a relative address. The host shows that error in place of
    /// a page, so every outstanding ticket goes stale.
    pub fn navigate(&mut self, fragment: &str) -> Result<String, JsValue> {
        match self.inner.navigate(fragment) {
            Ok(ticket) => Ok(self.ticket_json(ticket.seq, &ticket.address)),
            Err(e) => {
                self.inner.supersede();
                Err(js_err(e))
            }
        }
    }

    /// Re-issue the current address under a new ticket, for auto-refresh.
    /// `undefined` before the first navigation.
    pub fn refresh(&mut self) -> Option<String> {
        let ticket = self.inner.refresh()?;
        Some(self.ticket_json(ticket.seq, &ticket.address))
    }

    /// False once a newer navigation (or a logout) has started.
    ///
    /// `seq` is the ticket's JavaScript number, taken as issued; anything
    /// that is not a whole non-negative number is never current.
    #[wasm_bindgen(js_name = isCurrent)]
    pub fn is_current(&self, seq: f64) -> bool {
        seq.is_finite() && seq >= 0.0 && seq.fract() == 0.0 && self.inner.is_current_seq(seq as u64)
    }

    /// Render the responses fetched for ticket `seq`.
    ///
    /// Returns `undefined` when the ticket is stale, otherwise the
    /// [`selectRepresentation`] object plus an `html` field, as JSON.
    #[wasm_bindgen(js_name = renderResponse)]
    pub fn render_response(
        &self,
        seq: f64,
        options_body: &str,
        content_type: &str,
        body: &str,
    ) -> Result<Option<String>, JsValue> {
        if !self.is_current(seq) {
            return Ok(None);
        }
        let uri = self
            .inner
            .current()
            .map(|a| a.uri.clone())
            .unwrap_or_default();
        let schema = DescriptorResolver.resolve(options_body).map_err(js_err)?;
        let value = parse(body, "body")?;
        let rep = crestexplorer::select_representation(&schema, content_type, &uri);
        let mut page = representation_json(&rep);
        page["html"] = Value::String(present::to_html(&build_element(&value, rep.fragment)));
        Ok(Some(page.to_string()))
    }

    /// The OAuth authorization URL to redirect to. Remembers its CSRF state
    /// and the current address.
    #[wasm_bindgen(js_name = beginLogin)]
    pub fn begin_login(
        &mut self,
        endpoint: &str,
        client_id: &str,
        redirect_uri: &str,
        scopes: &str,
    ) -> Result<String, JsValue> {
        let request = self.inner.begin_login(endpoint, client_id, redirect_uri, scopes);
        request.url().map_err(js_err)
    }

    /// Accept the redirect's `location.hash`.
    ///
    /// Returns the fragment to navigate back to (or `undefined`). Throws
    /// `CSRF token mismatch` when the state does not match; no token is kept.
    #[wasm_bindgen(js_name = completeLogin)]
    pub fn complete_login(&mut self, hash: &str) -> Result<Option<String>, JsValue> {
        self.inner.complete_login(hash).map_err(js_err)
    }

    #[wasm_bindgen(js_name = restorePendingLogin)]
    pub fn restore_pending_login(&mut self, state: String, return_to: Option<String>) {
        self.inner.restore_pending_login(state, return_to);
    }

    #[wasm_bindgen(getter, js_name = pendingState)]
    pub fn pending_state(&self) -> Option<String> {
        self.inner.pending_state().map(str::to_string)
    }

    #[wasm_bindgen(getter, js_name = pendingReturnTo)]
    pub fn pending_return_to(&self) -> Option<String> {
        self.inner.pending_return_to().map(str::to_string)
    }

    #[wasm_bindgen(getter, js_name = loggedIn)]
    pub fn logged_in(&self) -> bool {
        self.inner.access_token().is_some()
    }

    pub fn logout(&mut self) {
        self.inner.logout();
    }
}

impl BrowserSession {
    fn ticket_json(&self, seq: u64, address: &Address) -> String {
        json!({
            "seq":       seq,
            "uri":       address.uri,
            "mediaType": address.media_type,
            "headers":   self.inner.request_headers(address),
        })
        .to_string()
    }
}

impl Default for BrowserSession {
    fn default() -> Self {
        Self::new()
    }
}
