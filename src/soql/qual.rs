//! Relational qualifiers supplied by the caller: column, operator, typed value.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
}

impl Operator {
    /// Relational spelling, which is also the SOQL spelling for everything but `<>`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "<>",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(Operator::Eq),
            "<>" | "!=" => Ok(Operator::NotEq),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::GtEq),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::LtEq),
            _ => Err(format!("unsupported operator: {}", s)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum QualValue {
    String(String),
    Bool(bool),
    Int(i64),
    Double(f64),
    Timestamp(DateTime<Utc>),
    /// Set membership (`IN` / `NOT IN`).
    List(Vec<QualValue>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Qual {
    pub column: String,
    pub operator: Operator,
    pub value: QualValue,
}

impl Qual {
    pub fn new(column: impl Into<String>, operator: Operator, value: QualValue) -> Self {
        Qual {
            column: column.into(),
            operator,
            value,
        }
    }
}

/// Qualifiers grouped by column name, in the order they were added per column.
#[derive(Clone, Debug, Default)]
pub struct QualMap {
    by_column: HashMap<String, Vec<Qual>>,
}

impl QualMap {
    pub fn new() -> Self {
        QualMap::default()
    }

    pub fn push(&mut self, qual: Qual) {
        self.by_column.entry(qual.column.clone()).or_default().push(qual);
    }

    pub fn with(mut self, qual: Qual) -> Self {
        self.push(qual);
        self
    }

    pub fn get(&self, column: &str) -> &[Qual] {
        self.by_column.get(column).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.by_column.values().all(|v| v.is_empty())
    }
}

impl FromIterator<Qual> for QualMap {
    fn from_iter<I: IntoIterator<Item = Qual>>(iter: I) -> Self {
        let mut map = QualMap::new();
        for q in iter {
            map.push(q);
        }
        map
    }
}
