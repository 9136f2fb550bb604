//! Qualifier -> SOQL WHERE fragment translation.
//!
//! Values are substituted literally; embedded quotes in text values are not escaped.

use super::qual::{Operator, Qual, QualMap, QualValue};
use crate::schema::{Column, ColumnType, RemoteFieldType, TypeMap};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Quoted, comma separated string members of a list value. Non-string members are dropped.
fn string_list(values: &[QualValue]) -> Option<String> {
    let items: Vec<&str> = values
        .iter()
        .filter_map(|v| match v {
            QualValue::String(s) => Some(s.as_str()),
            _ => None,
        })
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(format!("('{}')", items.join("','")))
    }
}

fn text_clause(field: &str, qual: &Qual) -> Option<String> {
    match (&qual.value, qual.operator) {
        (QualValue::List(values), Operator::Eq) => string_list(values).map(|l| format!("{} IN {}", field, l)),
        (QualValue::List(values), Operator::NotEq) => string_list(values).map(|l| format!("{} NOT IN {}", field, l)),
        (QualValue::String(s), Operator::Eq) => Some(format!("{} = '{}'", field, s)),
        (QualValue::String(s), Operator::NotEq) => Some(format!("{} != '{}'", field, s)),
        _ => None,
    }
}

/// Fixed two-branch table: `=` selects TRUE, `<>` selects FALSE, whatever the value.
fn bool_clause(field: &str, qual: &Qual) -> Option<String> {
    if !matches!(qual.value, QualValue::Bool(_)) {
        return None;
    }
    match qual.operator {
        Operator::Eq => Some(format!("{} = TRUE", field)),
        Operator::NotEq => Some(format!("{} = FALSE", field)),
        _ => None,
    }
}

fn numeric_operator(op: Operator) -> &'static str {
    match op {
        Operator::NotEq => "!=",
        other => other.as_str(),
    }
}

fn number_clause(field: &str, column_type: ColumnType, qual: &Qual) -> Option<String> {
    let literal = match (column_type, &qual.value) {
        (ColumnType::Integer, QualValue::Int(i)) => i.to_string(),
        (ColumnType::Double, QualValue::Double(d)) => format!("{:.6}", d),
        _ => return None,
    };
    Some(format!("{} {} {}", field, numeric_operator(qual.operator), literal))
}

fn timestamp_clause(field: &str, remote_type: Option<&RemoteFieldType>, qual: &Qual) -> Option<String> {
    let QualValue::Timestamp(ts) = &qual.value else {
        return None;
    };
    if qual.operator == Operator::NotEq {
        return None;
    }
    let format = match remote_type {
        Some(RemoteFieldType::Date) => DATE_FORMAT,
        _ => DATETIME_FORMAT,
    };
    Some(format!("{} {} {}", field, qual.operator, ts.format(format)))
}

fn clause_for(column: &Column, field: &str, type_map: &TypeMap, qual: &Qual) -> Option<String> {
    match column.column_type {
        ColumnType::Text | ColumnType::Identifier => text_clause(field, qual),
        ColumnType::Boolean => bool_clause(field, qual),
        ColumnType::Integer | ColumnType::Double => number_clause(field, column.column_type, qual),
        ColumnType::Timestamp => timestamp_clause(field, type_map.get(&column.name), qual),
        ColumnType::Json => None,
    }
}

/// AND-joined WHERE fragment for every qualifier on a known column, in column order.
/// Empty when nothing applies.
pub fn translate(quals: &QualMap, columns: &[Column], type_map: &TypeMap) -> String {
    let mut clauses = Vec::new();
    for column in columns {
        let Some(field) = column.remote_name() else {
            continue;
        };
        for qual in quals.get(&column.name) {
            if let Some(clause) = clause_for(column, field, type_map, qual) {
                clauses.push(clause);
            }
        }
    }
    clauses.join(" AND ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn columns() -> Vec<Column> {
        vec![
            Column::new("name", ColumnType::Text, ""),
            Column::new("is_active", ColumnType::Boolean, ""),
            Column::new("number_of_employees", ColumnType::Integer, ""),
            Column::new("amount", ColumnType::Double, ""),
            Column::new("created_date", ColumnType::Timestamp, ""),
            Column::new("birth_date", ColumnType::Timestamp, ""),
            Column::new("billing_address", ColumnType::Json, ""),
            Column::new("region__c", ColumnType::Text, ""),
        ]
    }

    fn type_map() -> TypeMap {
        TypeMap::from([
            ("created_date".to_string(), RemoteFieldType::DateTime),
            ("birth_date".to_string(), RemoteFieldType::Date),
        ])
    }

    fn one(qual: Qual) -> String {
        translate(&QualMap::new().with(qual), &columns(), &type_map())
    }

    fn s(v: &str) -> QualValue {
        QualValue::String(v.to_string())
    }

    #[test]
    fn test_empty_quals() {
        assert_eq!(translate(&QualMap::new(), &columns(), &type_map()), "");
    }

    #[test]
    fn test_text_equality() {
        assert_eq!(one(Qual::new("name", Operator::Eq, s("Acme"))), "Name = 'Acme'");
        assert_eq!(one(Qual::new("name", Operator::NotEq, s("Acme"))), "Name != 'Acme'");
    }

    #[test]
    fn test_text_list() {
        let list = QualValue::List(vec![s("Acme"), s("Globex")]);
        assert_eq!(one(Qual::new("name", Operator::Eq, list.clone())), "Name IN ('Acme','Globex')");
        assert_eq!(one(Qual::new("name", Operator::NotEq, list)), "Name NOT IN ('Acme','Globex')");
    }

    #[test]
    fn test_empty_list_produces_nothing() {
        assert_eq!(one(Qual::new("name", Operator::Eq, QualValue::List(vec![]))), "");
        assert_eq!(one(Qual::new("name", Operator::Eq, QualValue::List(vec![QualValue::Int(1)]))), "");
    }

    #[test]
    fn test_text_range_operator_skipped() {
        assert_eq!(one(Qual::new("name", Operator::Gt, s("A"))), "");
    }

    #[test]
    fn test_custom_field_name_kept() {
        assert_eq!(one(Qual::new("region__c", Operator::Eq, s("EMEA"))), "region__c = 'EMEA'");
    }

    #[test]
    fn test_boolean_fixed_table() {
        assert_eq!(one(Qual::new("is_active", Operator::Eq, QualValue::Bool(true))), "IsActive = TRUE");
        assert_eq!(one(Qual::new("is_active", Operator::NotEq, QualValue::Bool(false))), "IsActive = FALSE");
    }

    #[test]
    fn test_integer() {
        assert_eq!(
            one(Qual::new("number_of_employees", Operator::Eq, QualValue::Int(100))),
            "NumberOfEmployees = 100"
        );
        assert_eq!(
            one(Qual::new("number_of_employees", Operator::GtEq, QualValue::Int(5))),
            "NumberOfEmployees >= 5"
        );
        assert_eq!(
            one(Qual::new("number_of_employees", Operator::NotEq, QualValue::Int(0))),
            "NumberOfEmployees != 0"
        );
    }

    #[test]
    fn test_double_six_decimals() {
        assert_eq!(one(Qual::new("amount", Operator::Eq, QualValue::Double(99.5))), "Amount = 99.500000");
        assert_eq!(one(Qual::new("amount", Operator::Lt, QualValue::Double(1.0))), "Amount < 1.000000");
    }

    #[test]
    fn test_timestamp_format_follows_declared_type() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(
            one(Qual::new("created_date", Operator::GtEq, QualValue::Timestamp(ts))),
            "CreatedDate >= 2024-01-15T10:30:00Z"
        );
        assert_eq!(
            one(Qual::new("birth_date", Operator::GtEq, QualValue::Timestamp(ts))),
            "BirthDate >= 2024-01-15"
        );
        let day = Utc.with_ymd_and_hms(2024, 6, 20, 0, 0, 0).unwrap();
        assert_eq!(one(Qual::new("birth_date", Operator::Eq, QualValue::Timestamp(day))), "BirthDate = 2024-06-20");
    }

    #[test]
    fn test_json_and_unknown_columns_ignored() {
        assert_eq!(one(Qual::new("billing_address", Operator::Eq, s("x"))), "");
        assert_eq!(one(Qual::new("not_a_column", Operator::Eq, s("x"))), "");
    }

    #[test]
    fn test_mismatched_value_type_skipped() {
        assert_eq!(one(Qual::new("number_of_employees", Operator::Eq, s("100"))), "");
        assert_eq!(one(Qual::new("is_active", Operator::Eq, s("true"))), "");
    }

    #[test]
    fn test_column_order_and_determinism() {
        let quals = QualMap::new()
            .with(Qual::new("amount", Operator::Gt, QualValue::Double(10.0)))
            .with(Qual::new("name", Operator::Eq, s("Acme")))
            .with(Qual::new("is_active", Operator::Eq, QualValue::Bool(true)));
        let first = translate(&quals, &columns(), &type_map());
        assert_eq!(first, "Name = 'Acme' AND IsActive = TRUE AND Amount > 10.000000");
        for _ in 0..10 {
            assert_eq!(translate(&quals, &columns(), &type_map()), first);
        }
    }

    #[test]
    fn test_multiple_quals_on_one_column() {
        let quals = QualMap::new()
            .with(Qual::new("number_of_employees", Operator::Gt, QualValue::Int(10)))
            .with(Qual::new("number_of_employees", Operator::Lt, QualValue::Int(50)));
        assert_eq!(
            translate(&quals, &columns(), &type_map()),
            "NumberOfEmployees > 10 AND NumberOfEmployees < 50"
        );
    }
}
