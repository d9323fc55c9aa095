//! Subprocess transport for the console
//!
//! Implements process spawning with separately readable stdout/stderr and a
//! writable stdin.

pub mod process;

pub use process::{ProcessConfig, ProcessHandle};
