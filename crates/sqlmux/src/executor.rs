//! The pooled query executor.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::connection::Connection;
use crate::error::Result;
use crate::pool::{Pool, PoolStatus};
use crate::row::{QueryResult, Value};
use crate::stream::{self, RowStream};
use crate::transaction;

/// Multiplexes logical operations over a bounded connection pool.
///
/// Each operation acquires one connection, drives it exclusively, and
/// guarantees exactly one terminal release or discard before the caller
/// observes the outcome. The executor is cheap to clone; clones share the
/// same pool.
pub struct Executor<P: Pool> {
    pool: Arc<P>,
}

impl<P: Pool> Clone for Executor<P> {
    fn clone(&self) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
        }
    }
}

impl<P: Pool> Executor<P> {
    /// Create an executor over a pool.
    pub fn new(pool: P) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create an executor over an already-shared pool.
    pub fn from_arc(pool: Arc<P>) -> Self {
        Self { pool }
    }

    /// The pool this executor draws from.
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Current occupancy of the underlying pool.
    pub fn status(&self) -> PoolStatus {
        self.pool.status()
    }

    /// Execute a single non-transactional statement.
    ///
    /// Suspends until a connection is available, issues the statement, and
    /// releases the connection before resolving. A statement failure is
    /// not taken as a sign the connection is broken; the connection is
    /// released either way and the error surfaces as-is. No retries.
    pub async fn query(&self, statement: &str, params: &[Value]) -> Result<QueryResult> {
        let mut conn = self.pool.acquire().await?;
        tracing::trace!(statement = %statement, "connection acquired for query");
        let outcome = conn.query(statement, params).await;
        self.pool.release(conn);
        outcome
    }

    /// Execute a statement with a streaming result set.
    ///
    /// Returns the stream handle synchronously; the connection is acquired
    /// and the protocol stream opened on a background task. Failures,
    /// including acquisition failures, arrive as the handle's single
    /// terminal error notification, never inline with this call.
    ///
    /// Must be called within a tokio runtime.
    pub fn query_stream(&self, statement: &str, params: &[Value]) -> RowStream {
        stream::open(
            Arc::clone(&self.pool),
            statement.to_owned(),
            params.to_vec(),
        )
    }

    /// Run a unit of work inside a transaction.
    ///
    /// Acquires a connection, issues BEGIN, and hands the connection to
    /// `work` exclusively. If `work` resolves, COMMIT is issued and its
    /// value returned; if `work` fails, ROLLBACK is issued and the work's
    /// original error returned. When COMMIT or ROLLBACK itself fails, a
    /// liveness probe decides whether the connection is released or
    /// discarded; the probe never masks the original error.
    ///
    /// ```rust,ignore
    /// let inserted = executor
    ///     .transaction(|conn| {
    ///         Box::pin(async move {
    ///             let result = conn
    ///                 .query("INSERT INTO blog (content) VALUES (?)", &[Value::from("hi")])
    ///                 .await?;
    ///             Ok(result.last_insert_id)
    ///         })
    ///     })
    ///     .await?;
    /// ```
    pub async fn transaction<T, F>(&self, work: F) -> Result<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut P::Conn) -> BoxFuture<'c, Result<T>> + Send,
    {
        transaction::run(&*self.pool, work).await
    }
}
