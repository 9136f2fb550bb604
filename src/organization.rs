//! Organization id lookup, resolved once and shared by every table of a connector.

use crate::error::ConnectorError;
use crate::executor::Executor;
use serde_json::Value;
use tokio::sync::OnceCell;

pub const ORGANIZATION_QUERY: &str = "SELECT Id, Name, InstanceName, IsSandbox FROM Organization";

/// Single-flight memo of the organization id. Concurrent first callers share one
/// lookup; a failed lookup leaves the cell empty so the next caller retries.
#[derive(Debug, Default)]
pub struct OrgIdCache {
    cell: OnceCell<String>,
}

impl OrgIdCache {
    pub fn new() -> Self {
        OrgIdCache::default()
    }

    pub fn get(&self) -> Option<&str> {
        self.cell.get().map(String::as_str)
    }

    pub async fn get_or_resolve(&self, executor: &Executor) -> Result<&str, ConnectorError> {
        let id = self
            .cell
            .get_or_try_init(|| async {
                let records = executor.query_collect(ORGANIZATION_QUERY).await?;
                let id = records
                    .first()
                    .and_then(|r| r.get("Id"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                tracing::debug!(organization_id = %id, "resolved organization id");
                Ok::<_, ConnectorError>(id)
            })
            .await?;
        Ok(id.as_str())
    }
}
