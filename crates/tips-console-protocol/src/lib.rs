//! Line grammar and record types for the tips console
//!
//! The tips console is an external program that bridges a pub/sub bus to its
//! standard streams. This crate holds everything needed to talk its language
//! without doing any I/O:
//!
//! - **Commands**: [`command`] - the line grammar written to the console's stdin
//! - **Records**: [`types`] - tags, incoming messages and status lines
//! - **Framing**: [`frame`] - tokenizing of stdout header/attachment lines and stderr lines
//! - **Hex codec**: [`hex`] - the space separated byte notation used by `pub`/`msg`
//! - **Error types**: [`error`] - malformed tokens and arguments
//!
//! # Design Principles
//!
//! - **Zero I/O**: readers and writers live in `tips-console`
//! - **Serialization**: records serialize with serde into the same field names the console prints
//! - **Borrowing**: commands borrow their payloads so publishing never copies

#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! # Usage
//!
//! ```
//! use tips_console_protocol::ConsoleCommand;
//!
//! let cmd = ConsoleCommand::PubTags(&[1001, 2001]);
//! assert_eq!(cmd.encode(), b"pubtags 1001 2001\n");
//! ```

pub mod command;
pub mod error;
pub mod frame;
pub mod hex;
pub mod types;

// Re-export commonly used types at crate level
pub use command::ConsoleCommand;
pub use error::{ProtocolError, Result};
pub use frame::{
    AttachmentLine, HeaderLine, STATUS_MARKER, classify_status_line, parse_attachment_line,
    parse_header_line, strip_line_terminator,
};
pub use types::{IncomingRecord, OutputFormat, Payload, StatusRecord, Tag};
