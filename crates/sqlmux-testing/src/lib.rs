//! # sqlmux-testing
//!
//! Test infrastructure for the sqlmux executor: a scripted in-memory
//! connection, a bounded FIFO pool implementing the executor's [`Pool`]
//! trait, and result-set fixtures.
//!
//! The executor's integration suites live in this crate's `tests/`
//! directory rather than in `sqlmux` itself, which keeps the dev-dependency
//! graph acyclic.
//!
//! [`Pool`]: sqlmux::Pool

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod connection;
pub mod fixtures;
pub mod pool;

pub use connection::{ConnectionLog, FakeConnection, FakeConnector, PingBehavior};
pub use fixtures::{blog_row_vec, blog_rows};
pub use pool::{PoolStats, TestPool};
