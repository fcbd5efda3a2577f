//! Small result-set builders shared by the executor tests.

use sqlmux::{QueryResult, Row, Value};

/// A `blog`-shaped result set with `count` rows.
#[must_use]
pub fn blog_rows(count: i64) -> QueryResult {
    let cells = (1..=count)
        .map(|id| vec![Value::Int(id), Value::from(format!("post {id}"))])
        .collect();
    QueryResult::with_rows(&["id", "content"], cells)
}

/// The rows of [`blog_rows`], detached from the result wrapper.
#[must_use]
pub fn blog_row_vec(count: i64) -> Vec<Row> {
    blog_rows(count).rows
}
