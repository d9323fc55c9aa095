//! Error types for the console client
//!
//! Nothing is retried: every error is surfaced once to the caller that
//! triggered it. Malformed output lines are not errors; they are reported as
//! [`Diagnostic`](crate::decoder::Diagnostic)s and decoding continues.

use std::io;
use tips_console_protocol::ProtocolError;
use tips_console_transport::TransportError;

/// Result type for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Errors that can occur while driving a console session
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// The console program could not be started
    #[error("Failed to start console: {0}")]
    ProcessSpawn(#[source] TransportError),

    /// A write hit a closed stdin (the console exited or was shut down)
    #[error("Console session closed: {0}")]
    SessionClosed(#[source] io::Error),

    /// Arguments that cannot be expressed as a console command
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A binary block on stdout could not be read as declared
    #[error("Framing error: {0}")]
    Framing(#[from] FramingError),

    /// Invalid console configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A decoder for this stream was already handed out
    #[error("Console {0} stream already taken")]
    StreamAlreadyTaken(&'static str),

    /// Process management failure other than spawning
    #[error("Transport error: {0}")]
    Transport(#[source] TransportError),

    /// Other I/O error on the console pipes
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
}

/// Binary framing failures on the console's stdout
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FramingError {
    /// The stream ended before the declared number of bytes arrived
    #[error("{context} declared {expected} bytes but the stream ended after {got}")]
    Truncated {
        /// Which block was being read (`msgbin`, `attbin`, ...)
        context: &'static str,
        /// Declared length
        expected: usize,
        /// Bytes received before end of stream
        got: usize,
    },

    /// The declared length exceeds the decoder's block limit
    #[error("{context} declared {len} bytes, more than the {max} byte limit")]
    Oversized {
        /// Which block was being read
        context: &'static str,
        /// Declared length
        len: usize,
        /// Configured limit
        max: usize,
    },

    /// A text line ran past the decoder's line limit without a terminator
    #[error("line exceeds {max} bytes without a terminator")]
    LineTooLong {
        /// Line limit in bytes
        max: usize,
    },
}

impl ConsoleError {
    /// Map an I/O error from writing to the console's stdin
    ///
    /// Errors meaning the reading end is gone become
    /// [`ConsoleError::SessionClosed`].
    pub fn from_write(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::NotConnected
            | io::ErrorKind::WriteZero
            | io::ErrorKind::UnexpectedEof => Self::SessionClosed(err),
            _ => Self::Io(err),
        }
    }

    /// Whether this error means the session can no longer accept commands
    pub fn is_session_closed(&self) -> bool {
        matches!(self, Self::SessionClosed(_))
    }
}

impl From<TransportError> for ConsoleError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Spawn { .. } => Self::ProcessSpawn(err),
            other => Self::Transport(other),
        }
    }
}

impl From<ProtocolError> for ConsoleError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::InvalidArgument(msg) => Self::InvalidArgument(msg),
            other => Self::InvalidArgument(other.to_string()),
        }
    }
}

impl From<io::Error> for ConsoleError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
