//! Transport error types

use std::io;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur in transport operations
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The program could not be started
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        /// Program that was launched
        program: String,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// A standard stream was not piped or was already taken
    #[error("Child {0} is not available")]
    MissingPipe(&'static str),

    /// Sending a signal to the child failed
    #[error("Failed to signal child: {0}")]
    Signal(String),

    /// I/O error on the child
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TransportError {
    /// Whether the error means the program does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
