//! Rows, cell values, and query results.

use std::sync::Arc;

/// A single parameter or cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Raw binary value.
    Bytes(Vec<u8>),
}

impl Value {
    /// Check if this value is SQL NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the value as an integer, if it is one.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as a boolean, if it is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as a float, if it is one.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as a string slice, if it is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Get the value as raw bytes, if it is binary.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// A single row of a result set.
///
/// Column names are shared across all rows of a result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row from shared column names and cell values.
    #[must_use]
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Get a cell by positional index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get a cell by column name.
    #[must_use]
    pub fn get_named(&self, name: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c == name)?;
        self.values.get(index)
    }

    /// Column names of the result set this row belongs to.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of cells in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The terminal value of a non-streamed statement.
///
/// SELECT-style statements populate `rows`; OK-style responses to
/// INSERT/UPDATE/DELETE populate `rows_affected` and, for inserts on
/// auto-increment tables, `last_insert_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Column names of the result set (empty for OK-style responses).
    pub columns: Arc<[String]>,
    /// Rows of the result set.
    pub rows: Vec<Row>,
    /// Number of rows affected by the statement.
    pub rows_affected: u64,
    /// Identifier generated for an inserted row, when the server reports one.
    pub last_insert_id: Option<u64>,
}

impl QueryResult {
    /// An empty OK-style result.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            columns: Arc::from(Vec::new()),
            rows: Vec::new(),
            rows_affected: 0,
            last_insert_id: None,
        }
    }

    /// Build a result set from column names and per-row cell values.
    #[must_use]
    pub fn with_rows(columns: &[&str], cells: Vec<Vec<Value>>) -> Self {
        let columns: Arc<[String]> = columns.iter().map(|c| (*c).to_owned()).collect();
        let rows = cells
            .into_iter()
            .map(|values| Row::new(Arc::clone(&columns), values))
            .collect();
        Self {
            columns,
            rows,
            rows_affected: 0,
            last_insert_id: None,
        }
    }

    /// Build an OK-style result for a statement that modified rows.
    #[must_use]
    pub fn ok(rows_affected: u64, last_insert_id: Option<u64>) -> Self {
        Self {
            columns: Arc::from(Vec::new()),
            rows: Vec::new(),
            rows_affected,
            last_insert_id,
        }
    }

    /// Number of rows in the result set.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl Default for QueryResult {
    fn default() -> Self {
        Self::empty()
    }
}
