//! Column values and table shapes for warehouse writes
//!
//! The bulk writer is table-agnostic: every warehouse row type describes its
//! target table with a static [`TableShape`] and hands over its column values
//! as [`SqlValue`]s in the same order as [`TableShape::columns`].

use chrono::NaiveDate;
use std::fmt;

/// A typed, nullable column value
///
/// Nulls stay typed so that a parameterized insert binds them against the
/// right column type.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// `INTEGER`
    Int(Option<i32>),
    /// `BIGINT`
    BigInt(Option<i64>),
    /// `DOUBLE PRECISION`
    Float(Option<f64>),
    /// `TEXT` / `VARCHAR`
    Text(Option<String>),
    /// `DATE`
    Date(Option<NaiveDate>),
    /// `BOOLEAN`
    Bool(Option<bool>),
}

impl SqlValue {
    /// Whether the value is SQL `NULL`
    pub fn is_null(&self) -> bool {
        match self {
            SqlValue::Int(v) => v.is_none(),
            SqlValue::BigInt(v) => v.is_none(),
            SqlValue::Float(v) => v.is_none(),
            SqlValue::Text(v) => v.is_none(),
            SqlValue::Date(v) => v.is_none(),
            SqlValue::Bool(v) => v.is_none(),
        }
    }

    /// Integer view of the value, widening `INTEGER` to `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(v) => v.map(i64::from),
            SqlValue::BigInt(v) => *v,
            _ => None,
        }
    }

    /// Text view of the value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(v) => v.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Int(Some(v)) => write!(f, "{v}"),
            SqlValue::BigInt(Some(v)) => write!(f, "{v}"),
            SqlValue::Float(Some(v)) => write!(f, "{v}"),
            SqlValue::Text(Some(v)) => write!(f, "'{v}'"),
            SqlValue::Date(Some(v)) => write!(f, "{v}"),
            SqlValue::Bool(Some(v)) => write!(f, "{v}"),
            _ => f.write_str("NULL"),
        }
    }
}

/// Static description of a warehouse table
#[derive(Debug, PartialEq, Eq)]
pub struct TableShape {
    /// Table name
    pub name: &'static str,
    /// Primary key column
    pub primary_key: &'static str,
    /// Whether the warehouse assigns the primary key on insert
    pub generated_key: bool,
    /// Source natural key column, for tables whose keys are read back
    pub natural_key: Option<&'static str>,
    /// Inserted columns, in value order
    pub columns: &'static [&'static str],
}

impl TableShape {
    /// Position of a column among the inserted columns
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }
}

/// A row that the bulk writer can insert
pub trait WarehouseRow: Send + Sync {
    /// Shape of the target table
    fn shape() -> &'static TableShape
    where
        Self: Sized;

    /// Column values in [`TableShape::columns`] order
    fn values(&self) -> Vec<SqlValue>;
}
