//! Executor error types.

use thiserror::Error;

/// Errors that can occur while executing pooled operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The pool could not supply a connection (saturation, factory failure).
    ///
    /// Nothing was acquired, so no release or discard takes place.
    #[error("connection acquisition failed: {0}")]
    Acquire(String),

    /// The pool has been closed and accepts no further acquisitions.
    #[error("pool is closed")]
    PoolClosed,

    /// The database rejected a statement (syntax, constraint, runtime).
    ///
    /// The connection itself is assumed healthy and is released normally.
    #[error("statement rejected: {message}")]
    Statement {
        /// Server-supplied error message.
        message: String,
        /// Server-specific error code, when one was reported.
        code: Option<u32>,
    },

    /// The connection failed mid-operation.
    ///
    /// The connection's state is unknown; a liveness probe decides whether
    /// it is released or discarded.
    #[error("transport failure: {0}")]
    Transport(String),

    /// IO error from the underlying transport.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The liveness probe is not supported by this connection type.
    ///
    /// Treated conservatively as a probe failure: the connection is
    /// discarded, never returned to the pool.
    #[error("liveness probe not supported by this connection")]
    ProbeUnsupported,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Broad classification of an [`Error`], matching the disposition rules
/// each class implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No connection was acquired.
    Acquire,
    /// Statement-level failure; connection still usable.
    Statement,
    /// Connection-level failure; disposition is probe-gated.
    Transport,
    /// Liveness probe unavailable.
    Probe,
    /// Invalid configuration.
    Config,
}

impl Error {
    /// Build a statement-level error.
    pub fn statement(message: impl Into<String>) -> Self {
        Self::Statement {
            message: message.into(),
            code: None,
        }
    }

    /// Build a statement-level error carrying a server error code.
    pub fn statement_with_code(message: impl Into<String>, code: u32) -> Self {
        Self::Statement {
            message: message.into(),
            code: Some(code),
        }
    }

    /// Build a transport-level error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Acquire(_) | Self::PoolClosed => ErrorKind::Acquire,
            Self::Statement { .. } => ErrorKind::Statement,
            Self::Transport(_) | Self::Io(_) => ErrorKind::Transport,
            Self::ProbeUnsupported => ErrorKind::Probe,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Check if this is a statement-level error.
    #[must_use]
    pub fn is_statement(&self) -> bool {
        self.kind() == ErrorKind::Statement
    }

    /// Check if this is a connection-level (transport) error.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// Check if this error occurred before any connection was acquired.
    #[must_use]
    pub fn is_acquire(&self) -> bool {
        self.kind() == ErrorKind::Acquire
    }
}

/// Result type for executor operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::Acquire("full".into()).kind(), ErrorKind::Acquire);
        assert_eq!(Error::PoolClosed.kind(), ErrorKind::Acquire);
        assert_eq!(Error::statement("syntax").kind(), ErrorKind::Statement);
        assert_eq!(Error::transport("reset").kind(), ErrorKind::Transport);
        assert_eq!(
            Error::Io(std::io::Error::other("broken pipe")).kind(),
            ErrorKind::Transport
        );
        assert_eq!(Error::ProbeUnsupported.kind(), ErrorKind::Probe);
        assert_eq!(Error::Config("bad".into()).kind(), ErrorKind::Config);
    }

    #[test]
    fn test_classification_helpers() {
        assert!(Error::statement("dup key").is_statement());
        assert!(!Error::statement("dup key").is_transport());
        assert!(Error::transport("gone").is_transport());
        assert!(Error::Acquire("saturated".into()).is_acquire());
        assert!(Error::PoolClosed.is_acquire());
    }

    #[test]
    fn test_statement_with_code() {
        let err = Error::statement_with_code("duplicate entry", 1062);
        assert!(matches!(
            err,
            Error::Statement {
                ref message,
                code: Some(1062)
            } if message == "duplicate entry"
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Error::statement("no such table").to_string(),
            "statement rejected: no such table"
        );
        assert_eq!(
            Error::transport("connection reset").to_string(),
            "transport failure: connection reset"
        );
        assert_eq!(Error::PoolClosed.to_string(), "pool is closed");
    }
}
