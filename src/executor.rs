//! Session-resilient remote reads.
//!
//! Every remote call gets at most one reconnect and one retry when its error looks
//! like an expired session. Pagination carries the session forward, so pages after
//! a reconnect use the renewed session.

use crate::error::{ConnectorError, RemoteError};
use crate::session::{is_session_expired, Session, SessionManager};
use crate::soql::probe_query;
use crate::transport::{Cursor, QueryPage, Record, Transport};
use std::ops::ControlFlow;
use std::sync::Arc;

/// Classifies remote error text as a session-expiry signal.
pub type ExpiryPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

enum PageRequest<'a> {
    First(&'a str),
    More(String),
}

pub struct Executor {
    sessions: Arc<SessionManager>,
    transport: Arc<dyn Transport>,
    is_expired: ExpiryPredicate,
}

impl Executor {
    pub fn new(sessions: Arc<SessionManager>, transport: Arc<dyn Transport>) -> Self {
        Executor {
            sessions,
            transport,
            is_expired: Arc::new(is_session_expired),
        }
    }

    pub fn with_expiry_predicate(mut self, predicate: ExpiryPredicate) -> Self {
        self.is_expired = predicate;
        self
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    fn expired(&self, e: &RemoteError) -> bool {
        (self.is_expired)(&e.to_string())
    }

    async fn send(&self, session: &Session, request: &PageRequest<'_>) -> Result<QueryPage, RemoteError> {
        match request {
            PageRequest::First(soql) => self.transport.query(session, soql).await,
            PageRequest::More(cursor) => self.transport.query_more(session, cursor).await,
        }
    }

    /// One page, reconnecting and retrying once on expiry. Returns the session the page was read with.
    async fn fetch_page(
        &self,
        session: Arc<Session>,
        request: &PageRequest<'_>,
    ) -> Result<(Arc<Session>, QueryPage), ConnectorError> {
        let err = match self.send(&session, request).await {
            Ok(page) => return Ok((session, page)),
            Err(e) => e,
        };
        if !self.expired(&err) {
            return Err(err.into());
        }
        tracing::warn!(error = %err, "session expired during query, reconnecting");
        let fresh = self.sessions.reconnect(&session).await?;
        match self.send(&fresh, request).await {
            Ok(page) => Ok((fresh, page)),
            Err(e) if self.expired(&e) => Err(ConnectorError::SessionExpired(e.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Run `soql` and pass every record of every page to `emit`, one page in flight at a time.
    /// `emit` returning `Break` stops the listing without error.
    pub async fn query_all<F>(&self, soql: &str, mut emit: F) -> Result<(), ConnectorError>
    where
        F: FnMut(Record) -> ControlFlow<()> + Send,
    {
        tracing::debug!(soql = %soql, "query");
        let mut session = self.sessions.connect().await?;
        let mut request = PageRequest::First(soql);
        loop {
            let (current, page) = self.fetch_page(session, &request).await?;
            session = current;
            for record in page.records {
                if emit(record).is_break() {
                    tracing::debug!("listing stopped by caller");
                    return Ok(());
                }
            }
            match page.cursor {
                Cursor::Done => return Ok(()),
                Cursor::More(next) => request = PageRequest::More(next),
            }
        }
    }

    /// All records of `soql`, collected.
    pub async fn query_collect(&self, soql: &str) -> Result<Vec<Record>, ConnectorError> {
        let mut records = Vec::new();
        self.query_all(soql, |r| {
            records.push(r);
            ControlFlow::Continue(())
        })
        .await?;
        Ok(records)
    }

    /// Record by id, None when it does not exist.
    ///
    /// The transport's `get` cannot tell a missing record from a dead session, so an
    /// absent result is checked with a probe query. A probe that fails for any other
    /// reason counts as "not found".
    pub async fn get(&self, object_type: &str, id: &str) -> Result<Option<Record>, ConnectorError> {
        let session = self.sessions.connect().await?;
        if let Some(record) = self.transport.get(&session, object_type, id).await {
            return Ok(Some(record));
        }
        let probe = probe_query(object_type, id);
        match self.transport.query(&session, &probe).await {
            Ok(_) => Ok(None),
            Err(e) if !self.expired(&e) => {
                tracing::debug!(object_type = %object_type, error = %e, "probe failed, treating record as absent");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(object_type = %object_type, error = %e, "session expired during get, reconnecting");
                let fresh = self.sessions.reconnect(&session).await?;
                Ok(self.transport.get(&fresh, object_type, id).await)
            }
        }
    }
}
