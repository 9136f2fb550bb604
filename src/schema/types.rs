//! Column descriptors, semantic types and the per-table remote type map.

use crate::case::{is_custom, to_remote_name};
use crate::soql::Operator;
use std::collections::HashMap;

/// Semantic type of an exposed column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    /// Record identifiers on hand-written columns; filtered like text.
    Identifier,
    Boolean,
    Integer,
    Double,
    /// Date or date-time; the remote type in `TypeMap` decides the literal format.
    Timestamp,
    /// Compound and unrecognized remote types. Not filterable.
    Json,
}

const EQUALITY_OPERATORS: &[Operator] = &[Operator::Eq, Operator::NotEq];
const RANGE_OPERATORS: &[Operator] = &[
    Operator::Eq,
    Operator::Gt,
    Operator::GtEq,
    Operator::LtEq,
    Operator::Lt,
];

impl ColumnType {
    /// Filter operators that can be pushed down for this type.
    pub fn operators(&self) -> &'static [Operator] {
        match self {
            ColumnType::Text | ColumnType::Identifier | ColumnType::Boolean => EQUALITY_OPERATORS,
            ColumnType::Integer | ColumnType::Double | ColumnType::Timestamp => RANGE_OPERATORS,
            ColumnType::Json => &[],
        }
    }
}

/// Remote scalar kind from a field's `soapType` (namespace prefix dropped).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoteFieldType {
    String,
    Id,
    Time,
    Date,
    DateTime,
    Boolean,
    Double,
    Int,
    Other(String),
}

impl RemoteFieldType {
    /// "xsd:string" -> String, "tns:ID" -> Id, "urn:address" -> Other("address").
    pub fn from_soap_type(soap_type: &str) -> Self {
        let local = soap_type.rsplit(':').next().unwrap_or(soap_type);
        match local {
            "string" => RemoteFieldType::String,
            "ID" => RemoteFieldType::Id,
            "time" => RemoteFieldType::Time,
            "date" => RemoteFieldType::Date,
            "dateTime" => RemoteFieldType::DateTime,
            "boolean" => RemoteFieldType::Boolean,
            "double" => RemoteFieldType::Double,
            "int" => RemoteFieldType::Int,
            other => RemoteFieldType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RemoteFieldType::String => "string",
            RemoteFieldType::Id => "ID",
            RemoteFieldType::Time => "time",
            RemoteFieldType::Date => "date",
            RemoteFieldType::DateTime => "dateTime",
            RemoteFieldType::Boolean => "boolean",
            RemoteFieldType::Double => "double",
            RemoteFieldType::Int => "int",
            RemoteFieldType::Other(s) => s,
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            RemoteFieldType::String | RemoteFieldType::Id | RemoteFieldType::Time => ColumnType::Text,
            RemoteFieldType::Date | RemoteFieldType::DateTime => ColumnType::Timestamp,
            RemoteFieldType::Boolean => ColumnType::Boolean,
            RemoteFieldType::Double => ColumnType::Double,
            RemoteFieldType::Int => ColumnType::Integer,
            RemoteFieldType::Other(_) => ColumnType::Json,
        }
    }
}

/// Local column name -> declared remote type.
pub type TypeMap = HashMap<String, RemoteFieldType>;

/// Where a column's value comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnSource {
    /// A field of the remote record, by remote name.
    Field(String),
    /// The owning organization's id, resolved once per connector.
    OrganizationId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub description: String,
    /// Custom (`__c`) fields are never case-converted.
    pub custom: bool,
    pub source: ColumnSource,
}

impl Column {
    /// Hand-written column whose remote field is derived from the local name.
    pub fn new(name: impl Into<String>, column_type: ColumnType, description: impl Into<String>) -> Self {
        let name = name.into();
        Column {
            source: ColumnSource::Field(to_remote_name(&name)),
            custom: is_custom(&name),
            name,
            column_type,
            description: description.into(),
        }
    }

    /// Remote field name, or None for synthetic columns.
    pub fn remote_name(&self) -> Option<&str> {
        match &self.source {
            ColumnSource::Field(f) => Some(f),
            ColumnSource::OrganizationId => None,
        }
    }
}

/// Column that accepts pushed-down filters, with the operators it accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyColumn {
    pub name: String,
    pub operators: &'static [Operator],
}

/// Key columns for every filterable column of the list, in column order.
pub fn key_columns_for(columns: &[Column]) -> Vec<KeyColumn> {
    columns
        .iter()
        .filter(|c| c.source != ColumnSource::OrganizationId)
        .filter(|c| !c.column_type.operators().is_empty())
        .map(|c| KeyColumn {
            name: c.name.clone(),
            operators: c.column_type.operators(),
        })
        .collect()
}
