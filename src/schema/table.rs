//! Table definitions: static columns for an object type, completed by derived columns.

use super::derive::{local_column_name, DerivedSchema};
use super::merge::merge_columns;
use super::types::{key_columns_for, Column, KeyColumn, TypeMap};
use crate::config::NamingConvention;

/// Prefix of every table name under the snake_case convention.
pub const TABLE_PREFIX: &str = "salesforce_";

/// Hand-written part of a table: the object it reads and the columns known up front.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableDefinition {
    pub object_type: String,
    pub static_columns: Vec<Column>,
}

impl TableDefinition {
    pub fn new(object_type: impl Into<String>) -> Self {
        TableDefinition {
            object_type: object_type.into(),
            static_columns: Vec::new(),
        }
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.static_columns = columns;
        self
    }
}

/// A queryable table: merged columns plus what filter pushdown needs.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub name: String,
    pub object_type: String,
    pub columns: Vec<Column>,
    pub key_columns: Vec<KeyColumn>,
    pub type_map: TypeMap,
    /// Column holding the record id: `Id` under api_native with derived columns, `id` otherwise.
    pub id_column: String,
}

/// "Account" -> "salesforce_account", "Invoice__c" -> "salesforce_invoice__c"; verbatim under api_native.
pub fn table_name_for(object_type: &str, convention: NamingConvention) -> String {
    match convention {
        NamingConvention::ApiNative => object_type.to_string(),
        NamingConvention::SnakeCase => format!("{}{}", TABLE_PREFIX, local_column_name(object_type, convention)),
    }
}

pub fn id_column_name(convention: NamingConvention, has_derived: bool) -> &'static str {
    if convention == NamingConvention::ApiNative && has_derived {
        "Id"
    } else {
        "id"
    }
}

impl Table {
    /// Merge `derived` into `definition`. None when there is nothing to expose.
    pub fn build(
        definition: &TableDefinition,
        derived: Option<DerivedSchema>,
        convention: NamingConvention,
    ) -> Option<Table> {
        let derived = derived.unwrap_or_default();
        let columns = merge_columns(&definition.static_columns, &derived.columns, convention);
        if columns.is_empty() {
            return None;
        }
        Some(Table {
            name: table_name_for(&definition.object_type, convention),
            object_type: definition.object_type.clone(),
            key_columns: key_columns_for(&columns),
            id_column: id_column_name(convention, !derived.columns.is_empty()).to_string(),
            type_map: derived.type_map,
            columns,
        })
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}
