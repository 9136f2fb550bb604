//! Remote object-store client seam: bulk query with continuation, point lookup, describe.
//!
//! `RestTransport` is the Salesforce REST implementation; tests substitute in-memory fakes.

mod rest;

pub use rest::RestTransport;

use crate::error::RemoteError;
use crate::session::Session;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One remote record as returned by the API, keyed by remote field name.
pub type Record = Map<String, Value>;

/// Continuation state of a bulk query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cursor {
    /// Opaque token for the next page (the `nextRecordsUrl`).
    More(String),
    Done,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryPage {
    pub records: Vec<Record>,
    pub cursor: Cursor,
}

/// Field metadata from an object describe. Only the parts schema derivation reads.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescribe {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub soap_type: Option<String>,
    /// Set on the sub-fields of a compound field (and on the compound field itself).
    #[serde(default)]
    pub compound_field_name: Option<String>,
    #[serde(default)]
    pub custom: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ObjectDescribe {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub custom: bool,
    #[serde(default)]
    pub fields: Vec<FieldDescribe>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// First page of a SOQL query.
    async fn query(&self, session: &Session, soql: &str) -> Result<QueryPage, RemoteError>;

    /// Page after `cursor`, from a previous `Cursor::More`.
    async fn query_more(&self, session: &Session, cursor: &str) -> Result<QueryPage, RemoteError>;

    /// Record by id. Returns None both for a missing record and for any failure,
    /// including an expired session; callers disambiguate with a probe query.
    async fn get(&self, session: &Session, object_type: &str, id: &str) -> Option<Record>;

    /// Object metadata, or None when the object type does not exist (or the call failed).
    async fn describe(&self, session: &Session, object_type: &str) -> Option<ObjectDescribe>;
}
