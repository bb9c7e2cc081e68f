//! Error type for `newsedits-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] newsedits_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A required input table does not exist.
  #[error("missing table: {0}")]
  MissingTable(&'static str),

  #[error("table {table} is missing column {column}")]
  MissingColumn {
    table:  &'static str,
    column: &'static str,
  },

  /// A required column is declared with a type the pipeline cannot read.
  #[error("column {table}.{column} has declared type {declared:?}, expected {expected}")]
  ColumnType {
    table:    &'static str,
    column:   &'static str,
    declared: String,
    expected: &'static str,
  },

  /// An index column holds a value that is not a whole number.
  #[error("column {table}.{column} holds non-integer value {value}")]
  NonIntegral {
    table:  &'static str,
    column: &'static str,
    value:  f64,
  },

  #[error("row count out of range: {0}")]
  RowCount(#[from] std::num::TryFromIntError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
