//! Caller-facing read API: tables, filtered listing, point lookup.

use crate::config::{non_empty, resolve_auth_method, ConnectionConfig, NamingConvention};
use crate::error::ConnectorError;
use crate::executor::{Executor, ExpiryPredicate};
use crate::organization::OrgIdCache;
use crate::record::{project, Row};
use crate::schema::{describe_and_derive, ColumnSource, Table, TableDefinition};
use crate::session::{Authenticator, SessionManager, SessionStore};
use crate::soql::{filtered_query, Operator, QualMap, QualValue};
use crate::transport::Transport;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Cache key for a connection: auth method, instance, identity, API version and a
/// digest of the secrets. Configs that could authenticate differently never share a key.
pub fn connection_key(config: &ConnectionConfig) -> String {
    let kind = resolve_auth_method(config)
        .map(|m| m.kind().as_str())
        .unwrap_or("unresolved");
    let mut hasher = Sha256::new();
    for secret in [
        &config.access_token,
        &config.refresh_token,
        &config.client_secret,
        &config.password,
        &config.token,
        &config.private_key,
        &config.private_key_file,
    ] {
        hasher.update(non_empty(secret).unwrap_or("").as_bytes());
        hasher.update([0u8]);
    }
    let digest = hex::encode(hasher.finalize());
    format!(
        "{}|{}|{}|{}|v{}|{}",
        kind,
        non_empty(&config.url).unwrap_or(""),
        non_empty(&config.username).unwrap_or(""),
        config.client_id(),
        config.api_version(),
        &digest[..16]
    )
}

pub struct ConnectorBuilder {
    config: ConnectionConfig,
    transport: Arc<dyn Transport>,
    authenticator: Arc<dyn Authenticator>,
    store: Option<Arc<SessionStore>>,
    org_ids: Option<Arc<OrgIdCache>>,
    expiry: Option<ExpiryPredicate>,
    definitions: Vec<TableDefinition>,
}

impl ConnectorBuilder {
    /// Share sessions with other connectors built over the same store.
    pub fn session_store(mut self, store: Arc<SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Share the organization id memo with other connectors.
    pub fn org_id_cache(mut self, cache: Arc<OrgIdCache>) -> Self {
        self.org_ids = Some(cache);
        self
    }

    pub fn expiry_predicate(mut self, predicate: ExpiryPredicate) -> Self {
        self.expiry = Some(predicate);
        self
    }

    /// Static columns for an object type; derived columns are merged in on first use.
    pub fn table(mut self, definition: TableDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn build(self) -> Connector {
        let key = connection_key(&self.config);
        let config = Arc::new(self.config);
        let sessions = Arc::new(SessionManager::new(
            key,
            config.clone(),
            self.authenticator,
            self.store.unwrap_or_default(),
        ));
        let mut executor = Executor::new(sessions, self.transport);
        if let Some(predicate) = self.expiry {
            executor = executor.with_expiry_predicate(predicate);
        }
        Connector {
            config,
            executor,
            org_ids: self.org_ids.unwrap_or_default(),
            definitions: self
                .definitions
                .into_iter()
                .map(|d| (d.object_type.clone(), d))
                .collect(),
            tables: RwLock::new(HashMap::new()),
        }
    }
}

pub struct Connector {
    config: Arc<ConnectionConfig>,
    executor: Executor,
    org_ids: Arc<OrgIdCache>,
    definitions: HashMap<String, TableDefinition>,
    /// Built tables by object type. Only tables with describe metadata are cached.
    tables: RwLock<HashMap<String, Arc<Table>>>,
}

impl Connector {
    pub fn builder(
        config: ConnectionConfig,
        transport: Arc<dyn Transport>,
        authenticator: Arc<dyn Authenticator>,
    ) -> ConnectorBuilder {
        ConnectorBuilder {
            config,
            transport,
            authenticator,
            store: None,
            org_ids: None,
            expiry: None,
            definitions: Vec::new(),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn naming_convention(&self) -> NamingConvention {
        self.config.naming_convention()
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Object types with a static definition or on the configured allow-list.
    pub fn object_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.definitions.keys().cloned().collect();
        types.sort();
        for object in self.config.objects() {
            if !types.contains(object) {
                types.push(object.clone());
            }
        }
        types
    }

    /// Table for `object_type`, derived from describe metadata on first use.
    pub async fn table(&self, object_type: &str) -> Result<Arc<Table>, ConnectorError> {
        if let Some(table) = self.tables.read().await.get(object_type) {
            return Ok(table.clone());
        }
        let convention = self.naming_convention();
        let session = self.executor.sessions().connect().await?;
        let derived = describe_and_derive(self.executor.transport().as_ref(), &session, object_type, convention).await;
        let complete = derived.is_some();
        if !complete {
            tracing::warn!(object_type = %object_type, "describe unavailable, using static columns");
        }
        let default_definition;
        let definition = match self.definitions.get(object_type) {
            Some(d) => d,
            None => {
                default_definition = TableDefinition::new(object_type);
                &default_definition
            }
        };
        let table = Table::build(definition, derived, convention)
            .map(Arc::new)
            .ok_or_else(|| ConnectorError::ObjectNotFound(object_type.to_string()))?;
        // Static-only tables are served but not kept; the next call describes again.
        if !complete {
            return Ok(table);
        }
        let cached = self
            .tables
            .write()
            .await
            .entry(object_type.to_string())
            .or_insert(table)
            .clone();
        Ok(cached)
    }

    /// Id of the connected organization, looked up once.
    pub async fn organization_id(&self) -> Result<String, ConnectorError> {
        Ok(self.org_ids.get_or_resolve(&self.executor).await?.to_string())
    }

    async fn organization_id_for(&self, table: &Table) -> Result<String, ConnectorError> {
        if table.columns.iter().any(|c| c.source == ColumnSource::OrganizationId) {
            self.organization_id().await
        } else {
            Ok(String::new())
        }
    }

    /// Stream rows of `object_type` matching `quals` to `emit`. Rows are keyed by local column name.
    pub async fn list_objects<F>(&self, object_type: &str, quals: &QualMap, mut emit: F) -> Result<(), ConnectorError>
    where
        F: FnMut(Row) -> ControlFlow<()> + Send,
    {
        let table = self.table(object_type).await?;
        let organization_id = self.organization_id_for(&table).await?;
        let soql = filtered_query(&table.columns, &table.object_type, quals, &table.type_map);
        self.executor
            .query_all(&soql, |record| emit(project(&record, &table.columns, &organization_id)))
            .await
    }

    /// Row for one record id, None when it does not exist.
    pub async fn get_object(&self, object_type: &str, id: &str) -> Result<Option<Row>, ConnectorError> {
        let table = self.table(object_type).await?;
        let Some(record) = self.executor.get(&table.object_type, id).await? else {
            return Ok(None);
        };
        let organization_id = self.organization_id_for(&table).await?;
        Ok(Some(project(&record, &table.columns, &organization_id)))
    }

    /// Point lookup driven by an `=` string qualifier on the table's id column.
    /// None when no such qualifier is present.
    pub async fn get_object_by_quals(&self, object_type: &str, quals: &QualMap) -> Result<Option<Row>, ConnectorError> {
        let table = self.table(object_type).await?;
        let id = quals.get(&table.id_column).iter().find_map(|q| match (&q.operator, &q.value) {
            (Operator::Eq, QualValue::String(id)) if !id.is_empty() => Some(id.clone()),
            _ => None,
        });
        match id {
            Some(id) => self.get_object(object_type, &id).await,
            None => Ok(None),
        }
    }
}
