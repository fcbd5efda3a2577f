//! Scripted in-memory connection.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use futures_util::StreamExt;
use parking_lot::Mutex;

use sqlmux::{Connection, Connector, Error, ProtocolStream, QueryResult, Result, Row, Value};

/// Scripted outcome for one statement execution.
#[derive(Debug, Clone)]
enum ScriptedOutcome {
    Result(QueryResult),
    StatementError(String),
    TransportError(String),
}

impl ScriptedOutcome {
    fn into_result(self) -> Result<QueryResult> {
        match self {
            Self::Result(result) => Ok(result),
            Self::StatementError(message) => Err(Error::statement(message)),
            Self::TransportError(message) => Err(Error::transport(message)),
        }
    }
}

/// How the fake responds to liveness probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PingBehavior {
    /// Probe succeeds.
    #[default]
    Ok,
    /// Probe fails with a transport error.
    Fail,
    /// Probe is not supported by this session type.
    Unsupported,
}

/// Observation log shared between a [`FakeConnection`] and the test that
/// scripted it. The log outlives the connection, so assertions can run
/// after the pool has consumed the handle.
#[derive(Debug, Default)]
pub struct ConnectionLog {
    statements: Mutex<Vec<String>>,
    pings: AtomicU32,
    rows_streamed: AtomicU32,
}

impl ConnectionLog {
    fn record(&self, statement: &str) {
        self.statements.lock().push(statement.to_owned());
    }

    fn record_ping(&self) {
        self.pings.fetch_add(1, Ordering::SeqCst);
    }

    fn record_streamed_row(&self) {
        self.rows_streamed.fetch_add(1, Ordering::SeqCst);
    }

    /// Statements issued on the connection, in order.
    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().clone()
    }

    /// Number of liveness probes issued on the connection.
    pub fn ping_count(&self) -> u32 {
        self.pings.load(Ordering::SeqCst)
    }

    /// Number of rows the protocol stream has yielded so far.
    pub fn rows_streamed(&self) -> u32 {
        self.rows_streamed.load(Ordering::SeqCst)
    }
}

/// Rows (and optionally a trailing transport error) for a streamed query.
#[derive(Debug, Default)]
struct StreamScript {
    rows: Vec<Row>,
    trailing_error: Option<String>,
}

/// An in-memory [`Connection`] whose responses are scripted per statement.
///
/// Unscripted statements succeed with an empty OK result, so BEGIN/COMMIT/
/// ROLLBACK work out of the box and tests only script the interesting
/// paths.
#[derive(Debug)]
pub struct FakeConnection {
    id: u64,
    responses: HashMap<String, VecDeque<ScriptedOutcome>>,
    stream_script: Option<StreamScript>,
    stream_open_error: Option<String>,
    ping: PingBehavior,
    closed: bool,
    log: Arc<ConnectionLog>,
}

impl FakeConnection {
    /// Create a fake connection that answers everything with an empty OK.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            responses: HashMap::new(),
            stream_script: None,
            stream_open_error: None,
            ping: PingBehavior::default(),
            closed: false,
            log: Arc::new(ConnectionLog::default()),
        }
    }

    /// Identity of this connection.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Handle to the shared observation log.
    #[must_use]
    pub fn log(&self) -> Arc<ConnectionLog> {
        Arc::clone(&self.log)
    }

    /// Script a successful result for a statement.
    ///
    /// Multiple responses for the same statement are consumed in order.
    #[must_use]
    pub fn on_query(mut self, statement: &str, result: QueryResult) -> Self {
        self.responses
            .entry(statement.to_owned())
            .or_default()
            .push_back(ScriptedOutcome::Result(result));
        self
    }

    /// Script a statement-level rejection for a statement.
    #[must_use]
    pub fn fail_statement(mut self, statement: &str, message: &str) -> Self {
        self.responses
            .entry(statement.to_owned())
            .or_default()
            .push_back(ScriptedOutcome::StatementError(message.to_owned()));
        self
    }

    /// Script a transport-level failure for a statement.
    #[must_use]
    pub fn fail_transport(mut self, statement: &str, message: &str) -> Self {
        self.responses
            .entry(statement.to_owned())
            .or_default()
            .push_back(ScriptedOutcome::TransportError(message.to_owned()));
        self
    }

    /// Script the rows yielded by the next streamed query.
    #[must_use]
    pub fn stream_rows(mut self, rows: Vec<Row>) -> Self {
        self.stream_script.get_or_insert_with(Default::default).rows = rows;
        self
    }

    /// Script a transport error emitted after the scripted rows.
    #[must_use]
    pub fn stream_error_after(mut self, message: &str) -> Self {
        self.stream_script
            .get_or_insert_with(Default::default)
            .trailing_error = Some(message.to_owned());
        self
    }

    /// Script a statement-level failure when opening a stream.
    #[must_use]
    pub fn fail_stream_open(mut self, message: &str) -> Self {
        self.stream_open_error = Some(message.to_owned());
        self
    }

    /// Set the liveness probe behavior.
    #[must_use]
    pub fn ping_behavior(mut self, behavior: PingBehavior) -> Self {
        self.ping = behavior;
        self
    }

    /// Mark the underlying transport as closed.
    #[must_use]
    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }
}

#[async_trait]
impl Connection for FakeConnection {
    async fn query(&mut self, statement: &str, _params: &[Value]) -> Result<QueryResult> {
        self.log.record(statement);
        if let Some(queue) = self.responses.get_mut(statement) {
            if let Some(outcome) = queue.pop_front() {
                return outcome.into_result();
            }
        }
        Ok(QueryResult::empty())
    }

    async fn query_stream(
        &mut self,
        statement: &str,
        _params: &[Value],
    ) -> Result<ProtocolStream> {
        self.log.record(statement);
        if let Some(message) = self.stream_open_error.take() {
            return Err(Error::statement(message));
        }
        let script = self.stream_script.take().unwrap_or_default();
        let items: Vec<Result<Row>> = script
            .rows
            .into_iter()
            .map(Ok)
            .chain(script.trailing_error.map(|m| Err(Error::transport(m))))
            .collect();
        let log = Arc::clone(&self.log);
        let rows = futures_util::stream::iter(items).inspect(move |item| {
            if item.is_ok() {
                log.record_streamed_row();
            }
        });
        Ok(rows.boxed())
    }

    async fn ping(&mut self) -> Result<()> {
        self.log.record_ping();
        match self.ping {
            PingBehavior::Ok => Ok(()),
            PingBehavior::Fail => Err(Error::transport("ping failed")),
            PingBehavior::Unsupported => Err(Error::ProbeUnsupported),
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// A [`Connector`] that hands out a prepared queue of fake connections.
#[derive(Debug, Default)]
pub struct FakeConnector {
    queue: Mutex<VecDeque<FakeConnection>>,
}

impl FakeConnector {
    /// Create a connector with a queue of replacement connections.
    #[must_use]
    pub fn new(connections: Vec<FakeConnection>) -> Self {
        Self {
            queue: Mutex::new(connections.into()),
        }
    }

    /// Queue one more replacement connection.
    pub fn push(&self, conn: FakeConnection) {
        self.queue.lock().push_back(conn);
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Conn = FakeConnection;

    async fn connect(&self) -> Result<FakeConnection> {
        self.queue
            .lock()
            .pop_front()
            .ok_or_else(|| Error::Acquire("connector exhausted".into()))
    }
}
