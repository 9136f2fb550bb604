//! Process-wide session cache keyed by connection identity.
//!
//! Sessions are stored as whole `Arc<Session>` values, so a reader sees either the
//! old or the new session, never a partial one. A per-key authentication lock keeps
//! concurrent first callers (and concurrent reconnects) from logging in twice.

use super::Session;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    auth_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore::default()
    }

    pub async fn get(&self, key: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(key).cloned()
    }

    pub async fn insert(&self, key: &str, session: Arc<Session>) {
        self.sessions.write().await.insert(key.to_string(), session);
    }

    /// Drop the cached session; the next `connect` re-authenticates.
    pub async fn invalidate(&self, key: &str) -> Option<Arc<Session>> {
        self.sessions.write().await.remove(key)
    }

    /// Lock serializing authentication for one connection identity.
    pub(crate) async fn auth_lock(&self, key: &str) -> Arc<Mutex<()>> {
        self.auth_locks
            .lock()
            .await
            .entry(key.to_string())
            .or_default()
            .clone()
    }
}
