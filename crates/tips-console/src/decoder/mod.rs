//! Decoders for the console's output streams
//!
//! - [`IncomingMessages`]: stdout, framed message records with attachments
//! - [`StatusMessages`]: stderr, one status record per line
//!
//! Both are generic over any [`tokio::io::AsyncRead`], read lazily, and end
//! when their stream closes. Each consumes its stream, so there is one
//! decoder per pipe.

mod diagnostic;
mod incoming;
mod status;

pub use diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSender};
pub use incoming::{DEFAULT_MAX_BLOCK_LEN, IncomingMessages};
pub use status::StatusMessages;
