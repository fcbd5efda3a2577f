//! Bounded in-memory pool with a FIFO waiter queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use sqlmux::{Connection, Connector, Error, Pool, PoolConfig, PoolStatus, Result};

use crate::connection::{FakeConnection, FakeConnector};

/// Cumulative pool activity counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Connections handed out.
    pub acquired: u32,
    /// Connections returned to the pool.
    pub released: u32,
    /// Connections removed from the managed set.
    pub discarded: u32,
    /// Connections established via the connector.
    pub created: u32,
}

struct Inner {
    max: u32,
    semaphore: Semaphore,
    idle: Mutex<Vec<FakeConnection>>,
    connector: FakeConnector,
    fail_acquire: Mutex<Option<String>>,
    total: AtomicU32,
    in_use: AtomicU32,
    acquired: AtomicU32,
    released: AtomicU32,
    discarded: AtomicU32,
    created: AtomicU32,
}

/// An in-memory [`Pool`] over [`FakeConnection`]s.
///
/// Capacity is enforced with a fair semaphore, so saturated acquisitions
/// queue FIFO the way the production pool primitive does. Every release
/// and discard is counted, which is what the executor tests assert on.
#[derive(Clone)]
pub struct TestPool {
    inner: Arc<Inner>,
}

impl TestPool {
    /// Pool whose capacity equals the given connections, all idle.
    #[must_use]
    pub fn with_connections(connections: Vec<FakeConnection>) -> Self {
        let max = u32::try_from(connections.len()).unwrap_or(u32::MAX);
        Self {
            inner: Arc::new(Inner {
                max,
                semaphore: Semaphore::new(connections.len()),
                total: AtomicU32::new(max),
                idle: Mutex::new(connections),
                connector: FakeConnector::default(),
                fail_acquire: Mutex::new(None),
                in_use: AtomicU32::new(0),
                acquired: AtomicU32::new(0),
                released: AtomicU32::new(0),
                discarded: AtomicU32::new(0),
                created: AtomicU32::new(0),
            }),
        }
    }

    /// Pool that establishes connections lazily through a connector.
    ///
    /// Validates the configuration the way a production pool would.
    pub fn configured(config: &PoolConfig, connector: FakeConnector) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(Inner {
                max: config.max_connections,
                semaphore: Semaphore::new(config.max_connections as usize),
                idle: Mutex::new(Vec::new()),
                connector,
                fail_acquire: Mutex::new(None),
                total: AtomicU32::new(0),
                in_use: AtomicU32::new(0),
                acquired: AtomicU32::new(0),
                released: AtomicU32::new(0),
                discarded: AtomicU32::new(0),
                created: AtomicU32::new(0),
            }),
        })
    }

    /// Pool whose every acquisition fails with the given message.
    #[must_use]
    pub fn broken(message: &str) -> Self {
        let pool = Self::with_connections(Vec::new());
        pool.fail_acquires(message);
        pool
    }

    /// Make subsequent acquisitions fail with the given message.
    pub fn fail_acquires(&self, message: &str) {
        *self.inner.fail_acquire.lock() = Some(message.to_owned());
    }

    /// Queue a replacement connection for a discarded one.
    pub fn add_replacement(&self, conn: FakeConnection) {
        self.inner.connector.push(conn);
    }

    /// Cumulative activity counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            acquired: self.inner.acquired.load(Ordering::SeqCst),
            released: self.inner.released.load(Ordering::SeqCst),
            discarded: self.inner.discarded.load(Ordering::SeqCst),
            created: self.inner.created.load(Ordering::SeqCst),
        }
    }
}

#[async_trait]
impl Pool for TestPool {
    type Conn = FakeConnection;

    async fn acquire(&self) -> Result<FakeConnection> {
        let failure = self.inner.fail_acquire.lock().clone();
        if let Some(message) = failure {
            return Err(Error::Acquire(message));
        }

        let permit = self
            .inner
            .semaphore
            .acquire()
            .await
            .map_err(|_| Error::PoolClosed)?;
        permit.forget();

        let idle = self.inner.idle.lock().pop();
        let conn = match idle {
            Some(conn) => conn,
            None => match self.inner.connector.connect().await {
                Ok(conn) => {
                    self.inner.total.fetch_add(1, Ordering::SeqCst);
                    self.inner.created.fetch_add(1, Ordering::SeqCst);
                    conn
                }
                Err(err) => {
                    // The slot stays usable even though this acquisition
                    // failed.
                    self.inner.semaphore.add_permits(1);
                    return Err(err);
                }
            },
        };

        self.inner.in_use.fetch_add(1, Ordering::SeqCst);
        self.inner.acquired.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(id = conn.id(), "connection checked out");
        Ok(conn)
    }

    fn release(&self, conn: FakeConnection) {
        self.inner.in_use.fetch_sub(1, Ordering::SeqCst);
        self.inner.released.fetch_add(1, Ordering::SeqCst);
        if conn.is_closed() {
            // The transport closed while checked out; the slot stays open
            // for the connector to refill later.
            tracing::trace!(id = conn.id(), "closed connection dropped on release");
            self.inner.total.fetch_sub(1, Ordering::SeqCst);
        } else {
            tracing::trace!(id = conn.id(), "connection returned to pool");
            self.inner.idle.lock().push(conn);
        }
        self.inner.semaphore.add_permits(1);
    }

    fn discard(&self, conn: FakeConnection) {
        tracing::trace!(id = conn.id(), "connection discarded");
        self.inner.in_use.fetch_sub(1, Ordering::SeqCst);
        self.inner.discarded.fetch_add(1, Ordering::SeqCst);
        self.inner.total.fetch_sub(1, Ordering::SeqCst);
        drop(conn);
        // The freed slot may be refilled through the connector later.
        self.inner.semaphore.add_permits(1);
    }

    fn status(&self) -> PoolStatus {
        let available = u32::try_from(self.inner.idle.lock().len()).unwrap_or(u32::MAX);
        PoolStatus {
            available,
            in_use: self.inner.in_use.load(Ordering::SeqCst),
            total: self.inner.total.load(Ordering::SeqCst),
            max: self.inner.max,
        }
    }
}
