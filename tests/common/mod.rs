#![allow(dead_code)]

use async_trait::async_trait;
use salesforce_tables::error::{ConnectorError, RemoteError};
use salesforce_tables::session::{Authenticator, Session, TokenGrant};
use salesforce_tables::transport::{Cursor, ObjectDescribe, QueryPage, Record, Transport};
use salesforce_tables::ConnectionConfig;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const ORG_ID: &str = "00D000000000001";

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {}", other),
    }
}

pub fn page(ids: &[&str], next: Option<&str>) -> QueryPage {
    QueryPage {
        records: ids.iter().map(|id| record(json!({ "Id": id }))).collect(),
        cursor: next.map(|n| Cursor::More(n.to_string())).unwrap_or(Cursor::Done),
    }
}

pub fn expired() -> RemoteError {
    RemoteError::new(Some(401), "INVALID_SESSION_ID: Session expired or invalid")
}

pub fn refresh_config() -> ConnectionConfig {
    ConnectionConfig {
        url: Some("https://na1.salesforce.com".into()),
        refresh_token: Some("refresh".into()),
        client_id: Some("app".into()),
        client_secret: Some("secret".into()),
        ..Default::default()
    }
}

pub fn access_token_config() -> ConnectionConfig {
    ConnectionConfig {
        url: Some("https://na1.salesforce.com".into()),
        access_token: Some("fixed-token".into()),
        ..Default::default()
    }
}

/// Hands out `token-1`, `token-2`, ... and counts logins.
/// With `succeed_times` set, every login past that count is rejected.
#[derive(Default)]
pub struct FakeAuth {
    pub logins: AtomicUsize,
    pub succeed_times: Option<usize>,
}

impl FakeAuth {
    /// Grants the first `n` logins and rejects the rest.
    pub fn succeeding(n: usize) -> Self {
        FakeAuth {
            succeed_times: Some(n),
            ..Default::default()
        }
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authenticator for FakeAuth {
    async fn request_token(&self, _token_url: &str, _form: &[(&str, &str)]) -> Result<TokenGrant, ConnectorError> {
        let n = self.logins.fetch_add(1, Ordering::SeqCst) + 1;
        if self.succeed_times.is_some_and(|limit| n > limit) {
            return Err(ConnectorError::Auth("invalid_grant: expired access/refresh token".into()));
        }
        Ok(TokenGrant {
            access_token: format!("token-{}", n),
            instance_url: Some("https://na1.salesforce.com".into()),
        })
    }

    async fn login_password(
        &self,
        _instance_url: &str,
        _api_version: &str,
        _client_id: &str,
        _username: &str,
        _password: &str,
    ) -> Result<TokenGrant, ConnectorError> {
        self.request_token("", &[]).await
    }
}

/// Scripted transport. Each call pops the next scripted response; calls are logged
/// with the token they were made with.
#[derive(Default)]
pub struct FakeTransport {
    pub queries: Mutex<VecDeque<Result<QueryPage, RemoteError>>>,
    pub mores: Mutex<VecDeque<Result<QueryPage, RemoteError>>>,
    pub gets: Mutex<VecDeque<Option<Record>>>,
    pub org_results: Mutex<VecDeque<Result<QueryPage, RemoteError>>>,
    pub describes: HashMap<String, ObjectDescribe>,
    pub org_delay: Option<Duration>,
    pub describe_delay: Option<Duration>,
    /// Number of upcoming describe calls that come back empty.
    pub describe_outages: AtomicUsize,
    pub calls: Mutex<Vec<(String, String, String)>>,
    pub org_queries: AtomicUsize,
    pub describe_calls: AtomicUsize,
}

impl FakeTransport {
    pub fn script_query(&self, r: Result<QueryPage, RemoteError>) {
        self.queries.lock().unwrap().push_back(r);
    }

    pub fn script_more(&self, r: Result<QueryPage, RemoteError>) {
        self.mores.lock().unwrap().push_back(r);
    }

    pub fn script_get(&self, r: Option<Record>) {
        self.gets.lock().unwrap().push_back(r);
    }

    pub fn script_org(&self, r: Result<QueryPage, RemoteError>) {
        self.org_results.lock().unwrap().push_back(r);
    }

    fn log(&self, op: &str, session: &Session, arg: &str) {
        self.calls
            .lock()
            .unwrap()
            .push((op.to_string(), session.access_token.clone(), arg.to_string()));
    }

    /// (token, argument) of every call of one kind, in order.
    pub fn calls_of(&self, op: &str) -> Vec<(String, String)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(o, _, _)| o == op)
            .map(|(_, t, a)| (t.clone(), a.clone()))
            .collect()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn query(&self, session: &Session, soql: &str) -> Result<QueryPage, RemoteError> {
        if soql.contains("FROM Organization") {
            self.org_queries.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.org_delay {
                tokio::time::sleep(delay).await;
            }
            let scripted = self.org_results.lock().unwrap().pop_front();
            return scripted.unwrap_or_else(|| Ok(page(&[ORG_ID], None)));
        }
        self.log("query", session, soql);
        let scripted = self.queries.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(page(&[], None)))
    }

    async fn query_more(&self, session: &Session, cursor: &str) -> Result<QueryPage, RemoteError> {
        self.log("query_more", session, cursor);
        let scripted = self.mores.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(page(&[], None)))
    }

    async fn get(&self, session: &Session, object_type: &str, id: &str) -> Option<Record> {
        self.log("get", session, &format!("{}/{}", object_type, id));
        self.gets.lock().unwrap().pop_front().flatten()
    }

    async fn describe(&self, session: &Session, object_type: &str) -> Option<ObjectDescribe> {
        self.log("describe", session, object_type);
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.describe_delay {
            tokio::time::sleep(delay).await;
        }
        let outage = self
            .describe_outages
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if outage {
            return None;
        }
        self.describes.get(object_type).cloned()
    }
}
