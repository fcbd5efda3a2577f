//! Streaming query results over a connection that may not exist yet.
//!
//! A streamed query needs a pooled connection, but acquisition is
//! asynchronous. [`RowStream`] is the caller-visible handle returned
//! immediately; a spawned adapter task resolves the connection, opens the
//! protocol stream, and forwards rows through a bounded channel. The
//! handle buffers nothing beyond that channel's single slot, so rows flow
//! at the pace the caller consumes them.
//!
//! Exactly one terminal notification reaches the handle: the stream either
//! ends cleanly or yields a single error. Errors are only ever observed by
//! polling, never inline with the call that opened the stream.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use futures_util::StreamExt;
use tokio::sync::mpsc;

use crate::connection::{Connection, ProtocolStream};
use crate::error::Result;
use crate::pool::Pool;
use crate::row::{Row, Value};
use crate::transaction::settle;

/// One in-flight row at a time; backpressure comes from the caller.
const CHANNEL_CAPACITY: usize = 1;

/// A streaming result set handed to the caller before the backing
/// connection has been acquired.
///
/// Yields `Ok(Row)` items in server order, then terminates with either a
/// clean end or exactly one `Err`. After an error the stream is fused.
pub struct RowStream {
    rx: mpsc::Receiver<Result<Row>>,
    done: bool,
}

impl Stream for RowStream {
    type Item = Result<Row>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(Err(err))) => {
                // An error is terminal; nothing further is forwarded.
                this.done = true;
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(item) => Poll::Ready(item),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Open a streamed query: hand back the receiving end immediately and
/// resolve the connection underneath it on a spawned task.
///
/// Must be called within a tokio runtime.
pub(crate) fn open<P: Pool>(pool: Arc<P>, statement: String, params: Vec<Value>) -> RowStream {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(forward(pool, statement, params, tx));
    RowStream { rx, done: false }
}

/// Adapter task: acquire, open, forward, and always settle the connection.
async fn forward<P: Pool>(
    pool: Arc<P>,
    statement: String,
    params: Vec<Value>,
    tx: mpsc::Sender<Result<Row>>,
) {
    let mut conn = match pool.acquire().await {
        Ok(conn) => conn,
        Err(err) => {
            // Nothing was acquired; the handle just gets the error.
            let _ = tx.send(Err(err)).await;
            return;
        }
    };
    tracing::trace!(statement = %statement, "connection acquired for stream");

    let mut rows = match conn.query_stream(&statement, &params).await {
        Ok(rows) => rows,
        Err(err) => {
            // Open failure is a statement-level rejection; the session
            // itself survives.
            pool.release(conn);
            let _ = tx.send(Err(err)).await;
            return;
        }
    };

    loop {
        match rows.next().await {
            Some(Ok(row)) => {
                if tx.send(Ok(row)).await.is_err() {
                    // Caller dropped the handle. Interest is gone but the
                    // protocol exchange is not abortable: a half-read
                    // result set cannot go back to the pool.
                    tracing::trace!("stream handle dropped, draining to terminal event");
                    drain(&*pool, rows, conn).await;
                    return;
                }
            }
            Some(Err(err)) => {
                // Mid-stream failure leaves the session state unknown.
                drop(rows);
                settle(&*pool, conn, "stream").await;
                let _ = tx.send(Err(err)).await;
                return;
            }
            None => {
                drop(rows);
                tracing::trace!("stream complete, releasing connection");
                pool.release(conn);
                return;
            }
        }
    }
}

/// Consume the rest of a protocol stream whose consumer is gone, then
/// return the connection.
///
/// The remaining rows are discarded; a trailing error still leaves the
/// session state unknown, so it goes through the same probe-gated
/// settlement as an observed one.
async fn drain<P: Pool>(pool: &P, mut rows: ProtocolStream, conn: P::Conn) {
    loop {
        match rows.next().await {
            Some(Ok(_)) => {}
            Some(Err(err)) => {
                tracing::debug!(error = %err, "error while draining abandoned stream");
                drop(rows);
                settle(pool, conn, "stream drain").await;
                return;
            }
            None => {
                drop(rows);
                tracing::trace!("abandoned stream drained, releasing connection");
                pool.release(conn);
                return;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::row::QueryResult;

    fn sample_row() -> Row {
        QueryResult::with_rows(&["id"], vec![vec![Value::Int(1)]])
            .rows
            .remove(0)
    }

    #[tokio::test]
    async fn test_stream_is_fused_after_error() {
        let (tx, rx) = mpsc::channel(4);
        let mut stream = RowStream { rx, done: false };

        tx.send(Ok(sample_row())).await.unwrap();
        tx.send(Err(Error::transport("gone"))).await.unwrap();
        // A late row after the terminal error must never surface.
        tx.send(Ok(sample_row())).await.unwrap();
        drop(tx);

        assert!(stream.next().await.unwrap().is_ok());
        assert!(matches!(stream.next().await, Some(Err(Error::Transport(_)))));
        assert!(stream.next().await.is_none());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_clean_end() {
        let (tx, rx) = mpsc::channel(4);
        let mut stream = RowStream { rx, done: false };

        tx.send(Ok(sample_row())).await.unwrap();
        drop(tx);

        assert!(stream.next().await.unwrap().is_ok());
        assert!(stream.next().await.is_none());
    }
}
