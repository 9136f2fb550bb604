//! Salesforce REST API client over reqwest.

use super::{Cursor, ObjectDescribe, QueryPage, Record, Transport};
use crate::error::RemoteError;
use crate::session::Session;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Clone, Default)]
pub struct RestTransport {
    client: reqwest::Client,
}

impl RestTransport {
    pub fn new() -> Self {
        RestTransport::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        RestTransport { client }
    }

    fn data_url(session: &Session, path: &str) -> String {
        format!(
            "{}/services/data/v{}/{}",
            session.instance_url.trim_end_matches('/'),
            session.api_version,
            path
        )
    }

    /// GET with the session's bearer token; body text on 2xx, `RemoteError` otherwise.
    async fn fetch(&self, session: &Session, url: &str, soql: Option<&str>) -> Result<String, RemoteError> {
        let mut request = self
            .client
            .get(url)
            .bearer_auth(&session.access_token)
            .header("Accept", "application/json");
        if let Some(q) = soql {
            request = request.query(&[("q", q)]);
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RemoteError::new(Some(status.as_u16()), error_message(&body)));
        }
        Ok(body)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiError {
    #[serde(default)]
    error_code: String,
    #[serde(default)]
    message: String,
}

/// `[{"errorCode": "...", "message": "..."}]` -> "errorCode: message"; raw body otherwise.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<Vec<ApiError>>(body) {
        Ok(errors) if !errors.is_empty() => errors
            .iter()
            .map(|e| format!("{}: {}", e.error_code, e.message))
            .collect::<Vec<_>>()
            .join("; "),
        _ => body.trim().to_string(),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    done: bool,
    #[serde(default)]
    next_records_url: Option<String>,
    #[serde(default)]
    records: Vec<Record>,
}

fn strip_attributes(mut record: Record) -> Record {
    record.remove("attributes");
    record
}

fn parse_query_page(body: &str) -> Result<QueryPage, RemoteError> {
    let response: QueryResponse = serde_json::from_str(body)
        .map_err(|e| RemoteError::transport(format!("unreadable query response: {}", e)))?;
    let cursor = match response.next_records_url {
        Some(next) if !response.done && !next.is_empty() => Cursor::More(next),
        _ => Cursor::Done,
    };
    Ok(QueryPage {
        records: response.records.into_iter().map(strip_attributes).collect(),
        cursor,
    })
}

#[async_trait]
impl Transport for RestTransport {
    async fn query(&self, session: &Session, soql: &str) -> Result<QueryPage, RemoteError> {
        tracing::debug!(soql = %soql, "query");
        let url = Self::data_url(session, "query");
        let body = self.fetch(session, &url, Some(soql)).await?;
        parse_query_page(&body)
    }

    async fn query_more(&self, session: &Session, cursor: &str) -> Result<QueryPage, RemoteError> {
        tracing::debug!(cursor = %cursor, "query more");
        let url = format!("{}{}", session.instance_url.trim_end_matches('/'), cursor);
        let body = self.fetch(session, &url, None).await?;
        parse_query_page(&body)
    }

    async fn get(&self, session: &Session, object_type: &str, id: &str) -> Option<Record> {
        let url = Self::data_url(session, &format!("sobjects/{}/{}", object_type, id));
        match self.fetch(session, &url, None).await {
            Ok(body) => match serde_json::from_str::<Record>(&body) {
                Ok(record) => Some(strip_attributes(record)),
                Err(e) => {
                    tracing::debug!(object_type = %object_type, error = %e, "unreadable record");
                    None
                }
            },
            Err(e) => {
                tracing::debug!(object_type = %object_type, id = %id, error = %e, "get failed");
                None
            }
        }
    }

    async fn describe(&self, session: &Session, object_type: &str) -> Option<ObjectDescribe> {
        let url = Self::data_url(session, &format!("sobjects/{}/describe", object_type));
        let body = match self.fetch(session, &url, None).await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(object_type = %object_type, error = %e, "describe failed");
                return None;
            }
        };
        match serde_json::from_str::<ObjectDescribe>(&body) {
            Ok(describe) => Some(describe),
            Err(e) => {
                tracing::debug!(object_type = %object_type, error = %e, "unreadable describe");
                None
            }
        }
    }
}
