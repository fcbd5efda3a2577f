//! # sqlmux
//!
//! Pooled, transaction-aware query executor over asynchronous database
//! connections.
//!
//! sqlmux multiplexes many logical query and transaction requests over a
//! small, bounded set of persistent connections. It does not speak a wire
//! protocol and does not implement pool mechanics; it drives any client
//! session behind the [`Connection`] trait and any pool primitive behind
//! the [`Pool`] trait, and guarantees the acquire/execute/release
//! discipline around every logical operation.
//!
//! ## Guarantees
//!
//! - **Release discipline**: every acquired connection reaches exactly one
//!   terminal `release` or `discard`, on success, statement error, and
//!   transport error paths alike.
//! - **Atomic transactions**: BEGIN → unit of work → COMMIT/ROLLBACK on
//!   one exclusively-held connection, with a probe-gated
//!   release-vs-discard decision when COMMIT or ROLLBACK fails.
//! - **Early stream handles**: [`Executor::query_stream`] returns a live
//!   [`RowStream`] synchronously, before the backing connection has even
//!   been acquired; exactly one terminal notification (end or error)
//!   reaches the handle.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sqlmux::{Executor, Value};
//!
//! let executor = Executor::new(pool);
//!
//! // Single statement: acquire, execute, release.
//! let result = executor
//!     .query("SELECT * FROM blog WHERE id = ?", &[Value::Int(1)])
//!     .await?;
//! println!("{} row(s) in set", result.row_count());
//!
//! // Streaming: the handle exists before the connection does.
//! use futures_util::StreamExt;
//! let mut rows = executor.query_stream("SELECT * FROM blog", &[]);
//! while let Some(row) = rows.next().await {
//!     let row = row?;
//!     // ...
//! }
//!
//! // Transactions: commit on success, roll back on failure.
//! let id = executor
//!     .transaction(|conn| {
//!         Box::pin(async move {
//!             let result = conn
//!                 .query("INSERT INTO blog (content) VALUES (?)", &[Value::from("hello")])
//!                 .await?;
//!             Ok(result.last_insert_id)
//!         })
//!     })
//!     .await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod pool;
pub mod row;
pub mod stream;
pub mod transaction;

// Re-export commonly used types
pub use config::PoolConfig;
pub use connection::{Connection, Connector, ProtocolStream};
pub use error::{Error, ErrorKind, Result};
pub use executor::Executor;
pub use pool::{Pool, PoolStatus};
pub use row::{QueryResult, Row, Value};
pub use stream::RowStream;
pub use transaction::{Disposition, TxPhase, disposition};
