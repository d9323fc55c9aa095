//! Console Roundtrip Example
//!
//! Drives a real `tips-console`:
//! - Publishes a string and a message with attachment to itself
//! - Records the next messages into a bag file
//! - Plays the bag back in a second session
//!
//! Run with:
//!   TIPS_CONSOLE_BIN=/path/to/tips-console TIPS_CONSOLE_NET_PROT=rmcast \
//!     cargo run --example console_roundtrip
//!
//! Set RUST_LOG=tips_console=debug to see every command written.

use anyhow::{Context, bail};
use std::time::Duration;
use tips_console::{ConsoleClient, ConsoleConfig};
use tracing_subscriber::EnvFilter;

const BYTES: [u8; 14] = [1, 2, 3, 4, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ConsoleConfig::from_env()?;
    let bag = std::env::temp_dir().join("tips-console-roundtrip.bag");

    // Step 1: publish to ourselves
    let mut console = ConsoleClient::from_config(&config)?;
    let mut incoming = console.incoming_msgs()?;
    let mut status = console.status_msgs()?;

    console.ostr().await?;
    console.pubtags(&[1001, 2001]).await?;
    console.subtags(&[1001, 2001]).await?;
    console.pubstr(1001, "hello world").await?;
    let record = incoming.next().await.context("console closed stdout")??;
    println!("{}", serde_json::to_string(&record)?);

    console.ohex().await?;
    console.pubatt(2001, 4, &BYTES).await?;
    let record = incoming.next().await.context("console closed stdout")??;
    println!("{}", serde_json::to_string(&record)?);

    // Step 2: record the next 1.5 seconds into a bag
    console.record(&bag, 1.5).await?;
    console.pubatt(2001, 4, &BYTES).await?;
    tokio::time::sleep(Duration::from_secs(2)).await;

    while let Some(record) = status.next().await {
        let record = record?;
        println!("{}", serde_json::to_string(&record)?);
        if record.status().is_some_and(|s| s.starts_with("record bag ready")) {
            break;
        }
    }
    console.shutdown().await?;
    println!("recorded a bag at {}", bag.display());

    // Step 3: play the bag back in a fresh session
    let mut console = ConsoleClient::from_config(&config)?;
    let mut incoming = console.incoming_msgs()?;
    console.subtags(&[2001]).await?;
    console.ohex().await?;
    console.play(&bag).await?;

    let Some(record) = incoming.next().await else {
        bail!("bag replay produced no message");
    };
    let record = record?;
    if record.tag != 2001 {
        bail!("unexpected tag {} in replay", record.tag);
    }
    println!("{}", serde_json::to_string(&record)?);

    let status = console.shutdown().await?;
    println!("Done playing back the bag ({})", status);
    Ok(())
}
