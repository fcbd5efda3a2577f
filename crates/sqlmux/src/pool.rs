//! Boundary trait for the connection-pool primitive.

use async_trait::async_trait;

use crate::connection::Connection;
use crate::error::Result;

/// A bounded set of reusable connections with a FIFO waiter queue.
///
/// The pool is the sole serialization point for connections: at any
/// instant a handle is owned either by the pool or by exactly one logical
/// operation. `release` and `discard` consume the handle, so every
/// acquired connection reaches exactly one terminal call.
#[async_trait]
pub trait Pool: Send + Sync + 'static {
    /// Connection type managed by this pool.
    type Conn: Connection;

    /// Acquire a connection, waiting if the pool is saturated.
    ///
    /// May remain pending indefinitely; bounding the wait is the pool
    /// implementation's policy, surfaced here as an acquisition error.
    async fn acquire(&self) -> Result<Self::Conn>;

    /// Return a connection to the pool, eligible for reuse.
    fn release(&self, conn: Self::Conn);

    /// Remove a connection from the managed set permanently.
    ///
    /// The pool may establish a replacement via its [`Connector`]
    /// (see [`crate::Connector`]) on a later acquisition.
    fn discard(&self, conn: Self::Conn);

    /// Current pool occupancy.
    fn status(&self) -> PoolStatus;
}

/// Status information about a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Number of idle connections available.
    pub available: u32,
    /// Number of connections currently in use.
    pub in_use: u32,
    /// Total number of live connections.
    pub total: u32,
    /// Maximum allowed connections.
    pub max: u32,
}
