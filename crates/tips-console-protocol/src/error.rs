//! Error types for protocol operations
//!
//! Covers malformed lines read from the console and command arguments that
//! cannot be expressed in the console's line grammar.

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors that can occur while tokenizing console lines or validating commands
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The line has no tag token in front of the type token
    #[error("Missing tag in line: {0:?}")]
    MissingTag(String),

    /// The tag token is not an integer in range
    #[error("Invalid tag token: {0:?}")]
    InvalidTag(String),

    /// No `=` between the type token and its value
    #[error("Missing '=' separator in line: {0:?}")]
    MissingSeparator(String),

    /// Type token the decoder does not know in header position
    #[error("Unknown type token {token:?} with value {value:?}")]
    UnknownType {
        /// The token before `=`.
        token: String,
        /// Everything after `=`.
        value: String,
    },

    /// A byte token is not one or two hex digits
    #[error("Invalid hex byte token: {0:?}")]
    InvalidHex(String),

    /// A length field is not a decimal count, or has the wrong arity
    #[error("Invalid length field: {0:?}")]
    InvalidLength(String),

    /// Command argument that would corrupt the line grammar
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
