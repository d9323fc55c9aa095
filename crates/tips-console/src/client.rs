//! Console session client
//!
//! [`ConsoleClient`] owns one `tips-console` child process. Commands go to its
//! stdin through a [`CommandWriter`]; its stdout and stderr are handed out
//! once each as [`IncomingMessages`] and [`StatusMessages`].

use crate::config::ConsoleConfig;
use crate::decoder::{IncomingMessages, StatusMessages};
use crate::error::{ConsoleError, Result};
use crate::writer::CommandWriter;
use std::path::Path;
use std::process::ExitStatus;
use tips_console_protocol::{ConsoleCommand, OutputFormat, Tag};
use tips_console_transport::{ProcessConfig, ProcessHandle};
use tokio::process::{ChildStderr, ChildStdin, ChildStdout};
use tracing::{Instrument, Span, debug, info, info_span};
use uuid::Uuid;

/// A running console session
///
/// Dropping the client kills the console; call [`ConsoleClient::shutdown`] to
/// let it exit cleanly.
///
/// # Example
///
/// ```no_run
/// use tips_console::{ConsoleClient, ConsoleConfig};
///
/// # async fn run() -> tips_console::Result<()> {
/// let mut client = ConsoleClient::from_config(&ConsoleConfig::from_env()?)?;
/// let mut incoming = client.incoming_msgs()?;
///
/// client.pubtags(&[1001]).await?;
/// client.subtags(&[1001]).await?;
/// client.ostr().await?;
/// client.pubstr(1001, "hello world").await?;
///
/// if let Some(record) = incoming.next().await {
///     println!("{:?}", record?);
/// }
/// client.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct ConsoleClient {
    session_id: Uuid,
    process: ProcessHandle,
    writer: CommandWriter<ChildStdin>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    span: Span,
}

impl ConsoleClient {
    /// Start a console from a command line (program followed by arguments)
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<I, S>(command_line: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config = ProcessConfig::from_command_line(command_line)
            .ok_or_else(|| ConsoleError::Config("console command line is empty".to_string()))?;
        Self::from_process_config(config)
    }

    /// Start a console with the options in `config`
    pub fn from_config(config: &ConsoleConfig) -> Result<Self> {
        Self::from_process_config(config.to_process_config()?)
    }

    /// Start a console from a raw process config
    pub fn from_process_config(config: ProcessConfig) -> Result<Self> {
        let mut process = ProcessHandle::spawn(config)?;
        let stdin = process.take_stdin()?;
        let stdout = process.take_stdout()?;
        let stderr = process.take_stderr()?;

        let session_id = Uuid::new_v4();
        let span = info_span!("console", %session_id);
        info!(parent: &span, pid = process.id(), "Console session started");

        Ok(Self {
            session_id,
            process,
            writer: CommandWriter::new(stdin),
            stdout: Some(stdout),
            stderr: Some(stderr),
            span,
        })
    }

    /// Identifier of this session, used in log events
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// OS process id of the console, `None` once it has been reaped
    pub fn pid(&self) -> Option<u32> {
        self.process.id()
    }

    /// Whether the console process is still running
    pub fn is_alive(&mut self) -> bool {
        self.process.is_alive()
    }

    /// Output format most recently requested
    pub fn output_format(&self) -> OutputFormat {
        self.writer.output_format()
    }

    /// Take the decoder for the console's stdout
    ///
    /// Fails with [`ConsoleError::StreamAlreadyTaken`] on the second call.
    pub fn incoming_msgs(&mut self) -> Result<IncomingMessages<ChildStdout>> {
        let stdout = self
            .stdout
            .take()
            .ok_or(ConsoleError::StreamAlreadyTaken("stdout"))?;
        Ok(IncomingMessages::new(stdout))
    }

    /// Take the decoder for the console's stderr
    ///
    /// Fails with [`ConsoleError::StreamAlreadyTaken`] on the second call.
    pub fn status_msgs(&mut self) -> Result<StatusMessages<ChildStderr>> {
        let stderr = self
            .stderr
            .take()
            .ok_or(ConsoleError::StreamAlreadyTaken("stderr"))?;
        Ok(StatusMessages::new(stderr))
    }

    /// Write one command to the console
    pub async fn send(&mut self, command: ConsoleCommand<'_>) -> Result<()> {
        self.writer.send(command).instrument(self.span.clone()).await
    }

    /// `pubtags <tag> ...`
    pub async fn pubtags(&mut self, tags: &[Tag]) -> Result<()> {
        self.send(ConsoleCommand::PubTags(tags)).await
    }

    /// `subtags <tag> ...`
    pub async fn subtags(&mut self, tags: &[Tag]) -> Result<()> {
        self.send(ConsoleCommand::SubTags(tags)).await
    }

    /// `pubstr <tag> <text>`
    pub async fn pubstr(&mut self, tag: Tag, text: &str) -> Result<()> {
        self.send(ConsoleCommand::PubStr { tag, text }).await
    }

    /// `pub <tag> <len> <hex>...`
    pub async fn publish(&mut self, tag: Tag, bytes: &[u8]) -> Result<()> {
        self.send(ConsoleCommand::Pub { tag, bytes }).await
    }

    /// `pubbin <tag> <len>` then raw bytes
    pub async fn pubbin(&mut self, tag: Tag, bytes: &[u8]) -> Result<()> {
        self.send(ConsoleCommand::PubBin { tag, bytes }).await
    }

    /// `pubatt <tag> <msg_len> <att_len> <hex>...`
    ///
    /// The first `msg_len` bytes of `bytes` are the message, the rest the
    /// attachment.
    pub async fn pubatt(&mut self, tag: Tag, msg_len: usize, bytes: &[u8]) -> Result<()> {
        self.send(ConsoleCommand::pub_att(tag, msg_len, bytes)?).await
    }

    /// `pubattbin <tag> <msg_len> <att_len>` then raw bytes
    pub async fn pubattbin(&mut self, tag: Tag, msg_len: usize, bytes: &[u8]) -> Result<()> {
        self.send(ConsoleCommand::pub_att_bin(tag, msg_len, bytes)?).await
    }

    /// `play <bag>`
    pub async fn play(&mut self, bag: impl AsRef<Path>) -> Result<()> {
        self.send(ConsoleCommand::Play { bag: bag.as_ref() }).await
    }

    /// `record <bag> <seconds>`
    pub async fn record(&mut self, bag: impl AsRef<Path>, seconds: f64) -> Result<()> {
        self.send(ConsoleCommand::Record {
            bag: bag.as_ref(),
            seconds,
        })
        .await
    }

    /// `ohex`
    pub async fn ohex(&mut self) -> Result<()> {
        self.send(ConsoleCommand::Output(OutputFormat::Hex)).await
    }

    /// `ostr`
    pub async fn ostr(&mut self) -> Result<()> {
        self.send(ConsoleCommand::Output(OutputFormat::Str)).await
    }

    /// `obin`
    pub async fn obin(&mut self) -> Result<()> {
        self.send(ConsoleCommand::Output(OutputFormat::Bin)).await
    }

    /// `help`
    pub async fn help(&mut self) -> Result<()> {
        self.send(ConsoleCommand::Help).await
    }

    /// `exit`
    ///
    /// The process keeps running until it notices; use
    /// [`ConsoleClient::shutdown`] to also wait for it.
    pub async fn exit(&mut self) -> Result<()> {
        self.send(ConsoleCommand::Exit).await
    }

    /// End the session and reap the console
    ///
    /// Sends `exit`, closes stdin and waits for the console to exit, escalating
    /// to SIGTERM and then a kill after the configured grace period.
    pub async fn shutdown(mut self) -> Result<ExitStatus> {
        let span = self.span.clone();
        async move {
            match self.writer.send(ConsoleCommand::Exit).await {
                Ok(()) => {}
                Err(e) if e.is_session_closed() => debug!("Console stdin already closed"),
                Err(e) => return Err(e),
            }
            if let Err(e) = self.writer.close().await {
                if !e.is_session_closed() {
                    return Err(e);
                }
            }

            let status = self.process.terminate().await?;
            info!(?status, "Console session ended");
            Ok(status)
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for ConsoleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleClient")
            .field("session_id", &self.session_id)
            .field("process", &self.process)
            .field("output_format", &self.writer.output_format())
            .field("stdout_taken", &self.stdout.is_none())
            .field("stderr_taken", &self.stderr.is_none())
            .finish()
    }
}
