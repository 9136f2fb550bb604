//! Get-or-create and reconnect for one connection's session.

use super::{authenticate, Authenticator, Session, SessionStore};
use crate::config::{AuthKind, ConnectionConfig};
use crate::error::ConnectorError;
use std::sync::Arc;

/// Owns the session lifecycle for one connection identity.
///
/// Several managers may share one `SessionStore`; managers built with the same key
/// share the cached session and the authentication lock.
pub struct SessionManager {
    key: String,
    config: Arc<ConnectionConfig>,
    authenticator: Arc<dyn Authenticator>,
    store: Arc<SessionStore>,
}

impl SessionManager {
    pub fn new(
        key: impl Into<String>,
        config: Arc<ConnectionConfig>,
        authenticator: Arc<dyn Authenticator>,
        store: Arc<SessionStore>,
    ) -> Self {
        SessionManager {
            key: key.into(),
            config,
            authenticator,
            store,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Cached session, or authenticate and cache a new one.
    pub async fn connect(&self) -> Result<Arc<Session>, ConnectorError> {
        if let Some(session) = self.store.get(&self.key).await {
            return Ok(session);
        }
        let lock = self.store.auth_lock(&self.key).await;
        let _guard = lock.lock().await;
        if let Some(session) = self.store.get(&self.key).await {
            return Ok(session);
        }
        self.login().await
    }

    /// Replace `stale` with a freshly authenticated session.
    ///
    /// A pre-obtained access token cannot be renewed: that case fails with
    /// `CannotRefresh` and leaves the cache as it is. When another caller already
    /// replaced `stale`, its session is returned without logging in again.
    pub async fn reconnect(&self, stale: &Session) -> Result<Arc<Session>, ConnectorError> {
        if stale.auth == AuthKind::AccessToken {
            tracing::warn!(connection = %self.key, "session expired and access_token auth cannot refresh");
            return Err(ConnectorError::CannotRefresh);
        }
        let lock = self.store.auth_lock(&self.key).await;
        let _guard = lock.lock().await;
        if let Some(current) = self.store.get(&self.key).await {
            if current.access_token != stale.access_token {
                tracing::debug!(connection = %self.key, "session already renewed by another caller");
                return Ok(current);
            }
        }
        self.store.invalidate(&self.key).await;
        tracing::info!(connection = %self.key, method = stale.auth.as_str(), "re-authenticating");
        self.login().await
    }

    /// Drop the cached session for this connection.
    pub async fn invalidate(&self) {
        self.store.invalidate(&self.key).await;
    }

    async fn login(&self) -> Result<Arc<Session>, ConnectorError> {
        let session = Arc::new(authenticate(&self.config, self.authenticator.as_ref()).await?);
        tracing::info!(
            connection = %self.key,
            method = session.auth.as_str(),
            instance_url = %session.instance_url,
            "authenticated"
        );
        self.store.insert(&self.key, session.clone()).await;
        Ok(session)
    }
}
