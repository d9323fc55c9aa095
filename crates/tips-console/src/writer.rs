//! Command emission to the console's stdin
//!
//! Every command is validated, encoded, written and flushed before the call
//! returns, so the console sees commands in call order. Nothing waits for an
//! acknowledgment. The typed per-command methods live on
//! [`ConsoleClient`](crate::ConsoleClient).

use crate::error::{ConsoleError, Result};
use std::io;
use tips_console_protocol::{ConsoleCommand, OutputFormat};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Writes console commands to any async byte sink
#[derive(Debug)]
pub struct CommandWriter<W> {
    inner: Option<W>,
    output_format: OutputFormat,
}

impl<W: AsyncWrite + Unpin> CommandWriter<W> {
    /// Wrap the console's stdin (or any writer)
    pub fn new(inner: W) -> Self {
        Self {
            inner: Some(inner),
            output_format: OutputFormat::default(),
        }
    }

    /// Output format most recently requested with `ohex`/`ostr`/`obin`
    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// Whether [`CommandWriter::close`] was called
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Validate, encode, write and flush one command
    pub async fn send(&mut self, command: ConsoleCommand<'_>) -> Result<()> {
        command.validate()?;
        let bytes = command.encode();

        let inner = self.inner.as_mut().ok_or_else(|| {
            ConsoleError::SessionClosed(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "console stdin already closed",
            ))
        })?;
        inner
            .write_all(&bytes)
            .await
            .map_err(ConsoleError::from_write)?;
        inner.flush().await.map_err(ConsoleError::from_write)?;

        if let ConsoleCommand::Output(format) = command {
            self.output_format = format;
        }
        debug!(command = command.name(), bytes = bytes.len(), "Sent console command");
        Ok(())
    }

    /// Shut down and drop the underlying writer
    ///
    /// Later commands fail with [`ConsoleError::SessionClosed`].
    pub async fn close(&mut self) -> Result<()> {
        if let Some(mut inner) = self.inner.take() {
            inner.shutdown().await.map_err(ConsoleError::from_write)?;
        }
        Ok(())
    }

    /// Give back the underlying writer, if still open
    pub fn into_inner(self) -> Option<W> {
        self.inner
    }
}
