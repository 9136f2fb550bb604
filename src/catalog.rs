//! Table catalog: one table per configured object type, derived concurrently.

use crate::connector::Connector;
use crate::error::ConnectorError;
use crate::schema::Table;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Build every table the connector knows about, one task per object type.
///
/// Object types that neither exist remotely nor have static columns are skipped
/// with a warning. Any other failure (authentication, configuration) aborts the build.
/// Tables come back in object-type order.
pub async fn build_catalog(connector: Arc<Connector>) -> Result<Vec<Arc<Table>>, ConnectorError> {
    // One login up front so the per-object tasks share the session.
    connector.executor().sessions().connect().await?;

    let object_types = connector.object_types();
    let mut tasks = JoinSet::new();
    for (index, object_type) in object_types.into_iter().enumerate() {
        let connector = connector.clone();
        tasks.spawn(async move {
            let result = connector.table(&object_type).await;
            (index, object_type, result)
        });
    }

    let mut tables = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (index, object_type, result) = joined?;
        match result {
            Ok(table) => tables.push((index, table)),
            Err(ConnectorError::ObjectNotFound(_)) => {
                tracing::warn!(object_type = %object_type, "object not found, table skipped");
            }
            Err(e) => return Err(e),
        }
    }
    tables.sort_by_key(|(index, _)| *index);
    tracing::info!(tables = tables.len(), "catalog built");
    Ok(tables.into_iter().map(|(_, t)| t).collect())
}
