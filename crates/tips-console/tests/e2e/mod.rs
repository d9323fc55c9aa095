//! End-to-end tests module - tests against a real tips console
//!
//! These tests are separate from the fake console tests and require:
//! - TIPS_CONSOLE_BIN pointing at a `tips-console` executable
//! - A network interface usable by the selected protocol (TIPS_CONSOLE_NET_PROT)
//!
//! Run with: cargo test --test e2e_console -- --ignored --nocapture

pub mod common;
