//! Navigation controller state.
//!
//! [`Navigator`] owns everything that changes as the user moves around: the
//! current address, the OAuth CSRF state pending across a login redirect,
//! the access token, and a navigation sequence counter. It performs no I/O;
//! the host asks it for a [`Ticket`] before fetching and checks the ticket
//! again before rendering, so a response that arrives after a newer
//! navigation started is dropped instead of overwriting the newer page.

use crate::address::Address;
use crate::auth::{AuthorizationRequest, OAuthCallback};
use crate::error::ExplorerError;

/// Identifies one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub seq: u64,
    pub address: Address,
}

/// Login state kept between the authorization redirect and its callback.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingLogin {
    state: String,
    /// Fragment to restore once the callback has been accepted.
    return_to: Option<String>,
}

#[derive(Debug, Default)]
pub struct Navigator {
    seq: u64,
    current: Option<Address>,
    access_token: Option<String>,
    pending_login: Option<PendingLogin>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A navigator that is already authenticated.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            ..Self::default()
        }
    }

    /// Start navigating to `fragment`.
    ///
    /// Fails with [`ExplorerError::NonAbsoluteUri`] without touching the
    /// sequence, so a rejected address never invalidates an in-flight load.
    pub fn navigate(&mut self, fragment: &str) -> Result<Ticket, ExplorerError> {
        let address = Address::parse(fragment)?;
        Ok(self.navigate_to(address))
    }

    /// Start navigating to an already-parsed address.
    pub fn navigate_to(&mut self, address: Address) -> Ticket {
        self.seq += 1;
        self.current = Some(address.clone());
        Ticket {
            seq: self.seq,
            address,
        }
    }

    /// Re-issue the current address under a new ticket (auto-refresh).
    pub fn refresh(&mut self) -> Option<Ticket> {
        let address = self.current.clone()?;
        Some(self.navigate_to(address))
    }

    /// True while no newer navigation has started since `ticket` was issued.
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.is_current_seq(ticket.seq)
    }

    /// [`is_current`](Self::is_current) for hosts that only kept the number.
    pub fn is_current_seq(&self, seq: u64) -> bool {
        seq == self.seq
    }

    pub fn current(&self) -> Option<&Address> {
        self.current.as_ref()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Headers for requesting `address`: `Accept`, plus `Authorization`
    /// once a token has been accepted.
    pub fn request_headers(&self, address: &Address) -> Vec<(String, String)> {
        let mut headers = vec![("Accept".to_string(), address.accept_header())];
        if let Some(token) = &self.access_token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        headers
    }

    /// Prepare a login redirect, remembering its state and where to return.
    pub fn begin_login(
        &mut self,
        endpoint: &str,
        client_id: &str,
        redirect_uri: &str,
        scopes: &str,
    ) -> AuthorizationRequest {
        let request = AuthorizationRequest::new(endpoint, client_id, redirect_uri, scopes);
        self.pending_login = Some(PendingLogin {
            state: request.state.clone(),
            return_to: self.current.as_ref().map(Address::to_fragment),
        });
        request
    }

    /// Accept the authorization callback found in `hash`.
    ///
    /// On success the token is stored and the fragment saved by
    /// [`begin_login`](Self::begin_login) is returned for restoring. On a
    /// state mismatch nothing is stored, the pending login is discarded, and
    /// [`ExplorerError::CsrfMismatch`] is returned. A hash that carries no
    /// token yields `Ok(None)`.
    pub fn complete_login(&mut self, hash: &str) -> Result<Option<String>, ExplorerError> {
        let Some(callback) = OAuthCallback::from_hash(hash) else {
            return Ok(None);
        };
        let pending = self.pending_login.take();
        let token = callback.verify(pending.as_ref().map(|p| p.state.as_str()))?;
        self.access_token = Some(token);
        Ok(pending.and_then(|p| p.return_to))
    }

    /// Restore the pending login after a host reload, e.g. from a cookie.
    pub fn restore_pending_login(&mut self, state: String, return_to: Option<String>) {
        self.pending_login = Some(PendingLogin { state, return_to });
    }

    /// The state token of the pending login, for the host to persist.
    pub fn pending_state(&self) -> Option<&str> {
        self.pending_login.as_ref().map(|p| p.state.as_str())
    }

    /// The fragment the pending login returns to.
    pub fn pending_return_to(&self) -> Option<&str> {
        self.pending_login.as_ref().and_then(|p| p.return_to.as_deref())
    }

    /// Drop the current address and make every outstanding ticket stale.
    ///
    /// Hosts call this when they show something other than a loaded page,
    /// such as a rejected address, so a late response cannot replace it.
    pub fn supersede(&mut self) {
        self.current = None;
        self.seq += 1;
    }

    /// Forget the token and any pending login. In-flight tickets go stale.
    pub fn logout(&mut self) {
        self.access_token = None;
        self.pending_login = None;
        self.supersede();
    }
}
