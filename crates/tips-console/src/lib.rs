//! Scripted async client for the tips console
//!
//! `tips-console` is an external program that joins a pub/sub bus and speaks
//! a small line language on its standard streams: commands on stdin, received
//! messages on stdout, status lines on stderr. This crate drives it from
//! async Rust.
//!
//! # Key Features
//!
//! - **Commands**: one method per console command, written and flushed in call order
//! - **Incoming decoder**: reassembles hex, string and binary records, attachments included
//! - **Status decoder**: classifies stderr lines into `[status]` and everything else
//! - **Diagnostics**: malformed lines are logged and optionally forwarded, never fatal
//! - **Scoped shutdown**: `exit`, then close, SIGTERM and kill with a grace period
//!
//! # Architecture
//!
//! 1. **Protocol Layer** (`tips-console-protocol`): line grammar and record types
//! 2. **Transport Layer** (`tips-console-transport`): child process management

#![deny(unsafe_code)]
//! 3. **Client Layer** (this crate): commands, decoders and configuration
//!
//! # Usage Example
//!
//! ```no_run
//! use tips_console::{ConsoleClient, ConsoleConfig};
//!
//! #[tokio::main]
//! async fn main() -> tips_console::Result<()> {
//!     let mut client = ConsoleClient::from_config(&ConsoleConfig::from_env()?)?;
//!     let mut incoming = client.incoming_msgs()?;
//!
//!     client.pubtags(&[2001]).await?;
//!     client.subtags(&[2001]).await?;
//!     client.pubatt(2001, 4, &[1, 2, 3, 4, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]).await?;
//!
//!     if let Some(record) = incoming.next().await {
//!         let record = record?;
//!         println!("{} {:?} {:?}", record.tag, record.msgatt(), record.att());
//!     }
//!     client.shutdown().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod decoder;
pub mod error;
pub mod testing;
pub mod writer;

// Re-export commonly used types
pub use client::ConsoleClient;
pub use config::{ConsoleConfig, ENV_CONSOLE_BIN, ENV_NET_PROT, NetProt, SUPPORTED_IPC_CAPACITIES};
pub use decoder::{
    DEFAULT_MAX_BLOCK_LEN, Diagnostic, DiagnosticKind, DiagnosticSender, IncomingMessages,
    StatusMessages,
};
pub use error::{ConsoleError, FramingError, Result};
pub use writer::CommandWriter;

pub use tips_console_protocol::{
    ConsoleCommand, IncomingRecord, OutputFormat, Payload, StatusRecord, Tag,
};
pub use tips_console_transport::{ProcessConfig, ProcessHandle};
