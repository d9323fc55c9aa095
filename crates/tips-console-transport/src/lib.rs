//! Subprocess transport for the tips console
//!
//! Spawns the console as a child process with all three standard streams
//! piped and hands the pipes out to the client layer, which owns framing.
//!
//! # Architecture
//!
//! - **Process configuration**: [`ProcessConfig`] - program, arguments, environment

#![deny(unsafe_code)]
#![warn(missing_docs)]
//! - **Process handle**: [`ProcessHandle`] - owns the child, yields its pipes, terminates it
//! - **Error handling**: [`TransportError`] - spawn, pipe and signal failures
//!
//! # Usage
//!
//! ```ignore
//! use tips_console_transport::{ProcessConfig, ProcessHandle};
//!
//! let mut process = ProcessHandle::spawn(
//!     ProcessConfig::new("tips-console").with_args(["--netProt", "rmcast"]),
//! )?;
//! let stdin = process.take_stdin()?;
//! let stdout = process.take_stdout()?;
//! ```

pub mod error;
pub mod subprocess;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use subprocess::{ProcessConfig, ProcessHandle};
