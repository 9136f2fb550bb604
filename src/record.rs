//! Field access on remote records and projection onto table rows.

use crate::case::to_remote_name;
use crate::error::ConnectorError;
use crate::schema::{Column, ColumnSource};
use crate::transport::Record;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Table row keyed by local column name.
pub type Row = Map<String, Value>;

/// Value of a remote field; `Null` when absent.
pub fn field_value(record: &Record, remote_name: &str) -> Value {
    record.get(remote_name).cloned().unwrap_or(Value::Null)
}

/// Value for a local column name, converted to its remote field name first.
pub fn column_value(record: &Record, column_name: &str) -> Value {
    field_value(record, &to_remote_name(column_name))
}

/// Decode a record into a caller type.
pub fn decode<T: DeserializeOwned>(record: Record) -> Result<T, ConnectorError> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

/// Row keyed by local column name, in column order. The synthetic column gets `organization_id`.
pub fn project(record: &Record, columns: &[Column], organization_id: &str) -> Row {
    let mut row = Row::new();
    for column in columns {
        let value = match &column.source {
            ColumnSource::Field(remote) => field_value(record, remote),
            ColumnSource::OrganizationId => Value::String(organization_id.to_string()),
        };
        row.insert(column.name.clone(), value);
    }
    row
}
