//! Boundary traits for the protocol client.
//!
//! The executor never speaks a wire protocol itself. It drives any client
//! session implementing [`Connection`], and hands the pool primitive a
//! [`Connector`] so it can establish replacement sessions.

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::error::Result;
use crate::row::{QueryResult, Row, Value};

/// An ordered stream of rows produced by the protocol client.
///
/// Items arrive in server order; the stream terminates after yielding
/// either its final row or a single error.
pub type ProtocolStream = BoxStream<'static, Result<Row>>;

/// A single logical session to the database.
///
/// A connection is not safe for concurrent use by two operations at once;
/// the executor enforces exclusivity by owning the handle for the full
/// duration of each logical operation.
#[async_trait]
pub trait Connection: Send + 'static {
    /// Execute a statement as a single round-trip.
    async fn query(&mut self, statement: &str, params: &[Value]) -> Result<QueryResult>;

    /// Open a streaming result set for a statement.
    ///
    /// The returned stream owns whatever it needs to keep producing rows;
    /// the connection must not be used for other statements until the
    /// stream has terminated.
    async fn query_stream(&mut self, statement: &str, params: &[Value])
    -> Result<ProtocolStream>;

    /// Lightweight liveness probe.
    ///
    /// Must fail fast if the connection is broken. Sessions that cannot be
    /// probed return [`Error::ProbeUnsupported`](crate::Error::ProbeUnsupported),
    /// which callers treat as a probe failure.
    async fn ping(&mut self) -> Result<()>;

    /// Check if the underlying transport has been closed.
    fn is_closed(&self) -> bool;
}

/// Factory hook supplied to the pool primitive.
///
/// The pool calls this to establish one persistent session whenever it
/// grows or replaces a discarded connection.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Connection type produced by this connector.
    type Conn: Connection;

    /// Establish one new session.
    async fn connect(&self) -> Result<Self::Conn>;
}
