//! Transaction orchestration.
//!
//! Runs BEGIN → unit of work → COMMIT (or ROLLBACK) on a single pooled
//! connection, deciding on failure whether that connection can go back to
//! the pool or must be discarded.
//!
//! ## State Machine
//!
//! ```text
//! Started -> issue BEGIN
//!   ok   -> InProgress (unit of work holds the connection exclusively)
//!   fail -> release, fail, Done
//! InProgress -> unit of work resolves
//!   Ok(v)  -> Committing:  COMMIT ok -> release, resolve v, Done
//!                          COMMIT fail -> probe-gated disposition, fail, Done
//!   Err(e) -> RollingBack: ROLLBACK ok -> release, fail with e, Done
//!                          ROLLBACK fail -> probe-gated disposition, fail with e, Done
//! ```
//!
//! A COMMIT or ROLLBACK failure does not by itself prove the connection is
//! unusable, but it leaves the session's transactional state unknown. The
//! liveness probe distinguishes "safe to reuse" from "indeterminate,
//! discard". The original error always takes precedence over any failure
//! in the cleanup steps.

use futures_util::future::BoxFuture;

use crate::connection::Connection;
use crate::error::Result;
use crate::pool::Pool;

const BEGIN: &str = "BEGIN";
const COMMIT: &str = "COMMIT";
const ROLLBACK: &str = "ROLLBACK";

/// Phase of an in-flight transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxPhase {
    /// Connection acquired, BEGIN not yet issued.
    Started,
    /// Unit of work executing with exclusive use of the connection.
    InProgress,
    /// COMMIT in flight.
    Committing,
    /// ROLLBACK in flight.
    RollingBack,
    /// Connection released or discarded; the transaction context is over.
    Done,
}

impl TxPhase {
    /// Check if the transaction has reached its terminal phase.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// What happens to a connection once its operation has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Return the connection to the pool, eligible for reuse.
    Release,
    /// Remove the connection from the pool's managed set and close it.
    Discard,
}

/// Decide a connection's disposition from the outcome of a liveness probe.
///
/// A connection whose probe succeeds is safe to return to the pool even
/// though the operation on it failed. A failed probe, including
/// [`Error::ProbeUnsupported`](crate::Error::ProbeUnsupported), means the
/// session state is indeterminate and the connection must not be reused.
#[must_use]
pub fn disposition(probe: &Result<()>) -> Disposition {
    match probe {
        Ok(()) => Disposition::Release,
        Err(_) => Disposition::Discard,
    }
}

/// Probe a connection after an ambiguous failure and apply the resulting
/// disposition.
pub(crate) async fn settle<P: Pool>(pool: &P, mut conn: P::Conn, context: &'static str) {
    let probe = conn.ping().await;
    match disposition(&probe) {
        Disposition::Release => {
            tracing::debug!(context, "probe succeeded, releasing connection");
            pool.release(conn);
        }
        Disposition::Discard => {
            tracing::warn!(
                context,
                error = ?probe.err(),
                "probe failed, discarding connection"
            );
            pool.discard(conn);
        }
    }
}

/// Run one transaction on a freshly acquired connection.
///
/// The unit of work borrows the connection mutably for the whole
/// `InProgress` phase, so no other operation can interleave statements on
/// it. Transactions do not nest: the work must not acquire a second
/// connection from the same pool for the same logical transaction.
pub(crate) async fn run<P, T, F>(pool: &P, work: F) -> Result<T>
where
    P: Pool,
    T: Send,
    F: for<'c> FnOnce(&'c mut P::Conn) -> BoxFuture<'c, Result<T>> + Send,
{
    let mut conn = pool.acquire().await?;
    let mut phase = TxPhase::Started;
    tracing::trace!(?phase, "transaction connection acquired");

    if let Err(err) = conn.query(BEGIN, &[]).await {
        // Nothing has happened on the session yet; it goes straight back.
        pool.release(conn);
        return Err(err);
    }

    phase = TxPhase::InProgress;
    tracing::debug!(?phase, "transaction begun");
    let outcome = work(&mut conn).await;

    match outcome {
        Ok(value) => {
            phase = TxPhase::Committing;
            tracing::debug!(?phase, "unit of work succeeded");
            match conn.query(COMMIT, &[]).await {
                Ok(_) => {
                    pool.release(conn);
                    tracing::debug!(phase = ?TxPhase::Done, "transaction committed");
                    Ok(value)
                }
                Err(commit_err) => {
                    settle(pool, conn, "commit").await;
                    Err(commit_err)
                }
            }
        }
        Err(work_err) => {
            phase = TxPhase::RollingBack;
            tracing::debug!(?phase, error = %work_err, "unit of work failed");
            match conn.query(ROLLBACK, &[]).await {
                Ok(_) => {
                    pool.release(conn);
                    tracing::debug!(phase = ?TxPhase::Done, "transaction rolled back");
                    Err(work_err)
                }
                Err(rollback_err) => {
                    // The unit of work's failure takes precedence over the
                    // rollback's.
                    tracing::warn!(error = %rollback_err, "rollback failed");
                    settle(pool, conn, "rollback").await;
                    Err(work_err)
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_disposition_probe_ok_releases() {
        assert_eq!(disposition(&Ok(())), Disposition::Release);
    }

    #[test]
    fn test_disposition_probe_failure_discards() {
        let probe: Result<()> = Err(Error::transport("connection reset"));
        assert_eq!(disposition(&probe), Disposition::Discard);
    }

    #[test]
    fn test_disposition_probe_unsupported_discards() {
        let probe: Result<()> = Err(Error::ProbeUnsupported);
        assert_eq!(disposition(&probe), Disposition::Discard);
    }

    #[test]
    fn test_phase_terminality() {
        assert!(TxPhase::Done.is_terminal());
        assert!(!TxPhase::Started.is_terminal());
        assert!(!TxPhase::InProgress.is_terminal());
        assert!(!TxPhase::Committing.is_terminal());
        assert!(!TxPhase::RollingBack.is_terminal());
    }
}
