//! Column derivation from object describe metadata.

use super::types::{key_columns_for, Column, ColumnSource, ColumnType, KeyColumn, RemoteFieldType, TypeMap};
use crate::case::{is_custom, to_local_name};
use crate::config::NamingConvention;
use crate::session::Session;
use crate::transport::{FieldDescribe, ObjectDescribe, Transport};

/// Columns of one object type, ready to merge with its static columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DerivedSchema {
    pub columns: Vec<Column>,
    pub key_columns: Vec<KeyColumn>,
    pub type_map: TypeMap,
}

/// Local name of a remote field or object under the given convention.
pub fn local_column_name(remote: &str, convention: NamingConvention) -> String {
    match convention {
        NamingConvention::ApiNative => remote.to_string(),
        NamingConvention::SnakeCase => to_local_name(remote),
    }
}

/// Name of the synthetic organization-id column under every naming convention.
pub const ORGANIZATION_ID_COLUMN: &str = "organization_id";

/// Synthetic column carrying the owning organization's id.
pub fn organization_id_column() -> Column {
    Column {
        name: ORGANIZATION_ID_COLUMN.to_string(),
        column_type: ColumnType::Text,
        description: "Unique identifier of the organization in Salesforce.".to_string(),
        custom: false,
        source: ColumnSource::OrganizationId,
    }
}

/// Field name, remote type and column, or None for fields that are not exposed.
fn field_column(field: &FieldDescribe, convention: NamingConvention) -> Option<(Column, RemoteFieldType)> {
    let name = field.name.as_deref().filter(|n| !n.is_empty())?;
    // Sub-fields of a compound field (BillingCity under BillingAddress) are covered by the parent.
    if let Some(compound) = field.compound_field_name.as_deref() {
        if compound != name {
            return None;
        }
    }
    let remote_type = RemoteFieldType::from_soap_type(field.soap_type.as_deref()?);
    let description = field.label.as_deref().map(|l| format!("{}.", l)).unwrap_or_default();
    let column = Column {
        name: local_column_name(name, convention),
        column_type: remote_type.column_type(),
        description,
        custom: field.custom || is_custom(name),
        source: ColumnSource::Field(name.to_string()),
    };
    Some((column, remote_type))
}

/// Columns, key columns and type map for an object, in metadata order behind the
/// organization-id column.
pub fn derive_schema(describe: &ObjectDescribe, convention: NamingConvention) -> DerivedSchema {
    let mut columns = vec![organization_id_column()];
    let mut type_map = TypeMap::new();
    for field in &describe.fields {
        if let Some((column, remote_type)) = field_column(field, convention) {
            if column.name == ORGANIZATION_ID_COLUMN {
                tracing::debug!(field = ?field.name, "field shadowed by the organization id column");
                continue;
            }
            type_map.insert(column.name.clone(), remote_type);
            columns.push(column);
        }
    }
    DerivedSchema {
        key_columns: key_columns_for(&columns),
        columns,
        type_map,
    }
}

/// Describe `object_type` and derive its schema. None when the object does not exist remotely.
pub async fn describe_and_derive(
    transport: &dyn Transport,
    session: &Session,
    object_type: &str,
    convention: NamingConvention,
) -> Option<DerivedSchema> {
    tracing::debug!(object_type = %object_type, "describe");
    let describe = transport.describe(session, object_type).await?;
    let schema = derive_schema(&describe, convention);
    tracing::debug!(object_type = %object_type, columns = schema.columns.len(), "derived schema");
    Some(schema)
}
