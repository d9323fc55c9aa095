//! Common utilities for E2E tests

use std::env;
use tips_console::{ConsoleClient, ConsoleConfig, ENV_CONSOLE_BIN};

/// Require a console binary, panic if not set
///
/// E2E tests fail loudly instead of silently passing without a console.
/// Keep them `#[ignore]` so they only run on request.
pub fn require_console_bin() {
    if env::var(ENV_CONSOLE_BIN).is_err() {
        panic!(
            "E2E test requires {ENV_CONSOLE_BIN}\n\
             Set it with: export {ENV_CONSOLE_BIN}=/path/to/tips-console\n\
             Then run: cargo test --test e2e_console -- --ignored"
        );
    }
}

/// Start a console session configured from the environment
///
/// # Panics
///
/// Panics if the console binary is not configured or fails to start.
pub fn spawn_console() -> ConsoleClient {
    require_console_bin();

    let config = ConsoleConfig::from_env().expect("Invalid console environment");
    ConsoleClient::from_config(&config).expect("Failed to start tips-console")
}
