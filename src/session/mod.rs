//! Authenticated sessions: method selection, token exchange, process-wide cache, reconnect.

mod auth;
mod expiry;
mod manager;
mod store;

pub use auth::{
    authenticate, build_assertion, load_private_key, login_url, Authenticator, HttpAuthClient, TokenGrant,
    ASSERTION_LIFETIME_SECS, JWT_BEARER_GRANT,
};
pub use expiry::{is_session_expired, SESSION_EXPIRY_MARKERS};
pub use manager::SessionManager;
pub use store::SessionStore;

use crate::config::AuthKind;
use std::fmt;

/// Bearer token plus the endpoint it is valid for.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub instance_url: String,
    pub api_version: String,
    pub client_id: String,
    /// Method that produced this session; decides whether it can be refreshed.
    pub auth: AuthKind,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("instance_url", &self.instance_url)
            .field("api_version", &self.api_version)
            .field("client_id", &self.client_id)
            .field("auth", &self.auth)
            .finish()
    }
}
