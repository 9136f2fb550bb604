//! SELECT statements over a table's columns, plus the point-lookup probe.

use super::filter::translate;
use super::qual::QualMap;
use crate::schema::{Column, TypeMap};

/// `SELECT A, B FROM Type`. Synthetic columns are not selected.
pub fn select_query(columns: &[Column], object_type: &str) -> String {
    let fields = columns
        .iter()
        .filter_map(Column::remote_name)
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT {} FROM {}", fields, object_type)
}

/// SELECT with the translated qualifiers as WHERE clause, when any apply.
pub fn filtered_query(columns: &[Column], object_type: &str, quals: &QualMap, type_map: &TypeMap) -> String {
    let select = select_query(columns, object_type);
    let filter = translate(quals, columns, type_map);
    if filter.is_empty() {
        select
    } else {
        format!("{} WHERE {}", select, filter)
    }
}

/// Minimal query telling "record missing" apart from "session dead".
pub fn probe_query(object_type: &str, id: &str) -> String {
    format!("SELECT Id FROM {} WHERE Id = '{}' LIMIT 1", object_type, id)
}
