//! Stdout decoder: header lines, binary blocks and attachment framing

use super::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSender};
use crate::error::{FramingError, Result};
use futures::Stream;
use tips_console_protocol::{
    AttachmentLine, HeaderLine, IncomingRecord, Tag, parse_attachment_line, parse_header_line,
    strip_line_terminator,
};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tracing::{debug, trace, warn};

/// Largest binary block accepted by default (64 MiB)
pub const DEFAULT_MAX_BLOCK_LEN: usize = 64 * 1024 * 1024;

/// Room for the tag and type token in front of a hex encoded block
const LINE_HEADER_LEN: usize = 64;

/// Framing state between calls
#[derive(Debug)]
enum FrameState {
    AwaitingHeader,

    /// A `msgatt`/`msgattbin` header was read; its attachment line is next
    AwaitingAttachment { tag: Tag, message: Vec<u8> },
}

/// Lazy sequence of [`IncomingRecord`]s read from the console's stdout
///
/// A record with an attachment is yielded only after both of its parts were
/// read. If the stream closes in between, the partial record is discarded
/// and the sequence ends.
///
/// # Example
///
/// ```
/// # tokio_test::block_on(async {
/// use tips_console::IncomingMessages;
///
/// let output: &[u8] = b"1001 msgstr= hello world\n2001 msgatt= 01 02\natt= 03\n";
/// let mut msgs = IncomingMessages::new(output);
///
/// let first = msgs.next().await.unwrap().unwrap();
/// assert_eq!(first.msgstr(), Some("hello world"));
///
/// let second = msgs.next().await.unwrap().unwrap();
/// assert_eq!(second.msgatt(), Some(&[1u8, 2][..]));
/// assert_eq!(second.att(), Some(&[3u8][..]));
///
/// assert!(msgs.next().await.is_none());
/// # });
/// ```
#[derive(Debug)]
pub struct IncomingMessages<R> {
    reader: BufReader<R>,
    state: FrameState,
    diagnostics: Option<DiagnosticSender>,
    max_block_len: usize,
    finished: bool,
}

impl<R: AsyncRead + Unpin> IncomingMessages<R> {
    /// Decode records from `reader`
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            state: FrameState::AwaitingHeader,
            diagnostics: None,
            max_block_len: DEFAULT_MAX_BLOCK_LEN,
            finished: false,
        }
    }

    /// Forward diagnostics to `sender` in addition to logging them
    pub fn with_diagnostics(mut self, sender: DiagnosticSender) -> Self {
        self.diagnostics = Some(sender);
        self
    }

    /// Refuse binary blocks longer than `max` bytes
    ///
    /// Text lines are capped at the length of such a block in hex notation,
    /// see [`IncomingMessages::max_line_len`].
    pub fn with_max_block_len(mut self, max: usize) -> Self {
        self.max_block_len = max;
        self
    }

    /// Longest line accepted before the stream is treated as out of sync
    pub fn max_line_len(&self) -> usize {
        self.max_block_len
            .saturating_mul(3)
            .saturating_add(LINE_HEADER_LEN)
    }

    /// Whether a message is waiting for its attachment line
    pub fn is_awaiting_attachment(&self) -> bool {
        matches!(self.state, FrameState::AwaitingAttachment { .. })
    }

    /// Read the next record
    ///
    /// Returns `None` once the stream is closed. After an error the sequence
    /// is over and further calls return `None`.
    pub async fn next(&mut self) -> Option<Result<IncomingRecord>> {
        if self.finished {
            return None;
        }
        match self.advance().await {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }

    /// Adapt into a [`Stream`]
    pub fn into_stream(self) -> impl Stream<Item = Result<IncomingRecord>> {
        futures::stream::unfold(self, |mut decoder| async move {
            decoder.next().await.map(|item| (item, decoder))
        })
    }

    async fn advance(&mut self) -> Result<Option<IncomingRecord>> {
        loop {
            let Some(line) = self.read_line().await? else {
                if let FrameState::AwaitingAttachment { tag, .. } = &self.state {
                    debug!(tag, "Stdout closed before attachment, discarding message");
                }
                return Ok(None);
            };
            if line.trim().is_empty() {
                continue;
            }

            match std::mem::replace(&mut self.state, FrameState::AwaitingHeader) {
                FrameState::AwaitingHeader => match parse_header_line(&line) {
                    Ok(header) => {
                        if let Some(record) = self.on_header(header).await? {
                            return Ok(Some(record));
                        }
                    }
                    Err(error) => {
                        self.report(Diagnostic::new(DiagnosticKind::MalformedHeader(error), line));
                    }
                },
                FrameState::AwaitingAttachment { tag, message } => {
                    match parse_attachment_line(&line) {
                        Ok(AttachmentLine::Hex(att)) => {
                            return Ok(Some(IncomingRecord::attached(tag, message, att)));
                        }
                        Ok(AttachmentLine::Bin(len)) => {
                            let att = self.read_block(len, "attbin").await?;
                            return Ok(Some(IncomingRecord::attached(tag, message, att)));
                        }
                        Ok(AttachmentLine::Unexpected { token, value }) => {
                            self.report(Diagnostic::new(
                                DiagnosticKind::UnexpectedWhileAwaitingAttachment {
                                    tag,
                                    token,
                                    value,
                                },
                                line,
                            ));
                            self.state = FrameState::AwaitingAttachment { tag, message };
                        }
                        Err(error) => {
                            self.report(Diagnostic::new(
                                DiagnosticKind::MalformedAttachment { tag, error },
                                line,
                            ));
                        }
                    }
                }
            }
        }
    }

    async fn on_header(&mut self, header: HeaderLine) -> Result<Option<IncomingRecord>> {
        trace!(?header, "Header line");
        let record = match header {
            HeaderLine::Str { tag, text } => IncomingRecord::string(tag, text),
            HeaderLine::Hex { tag, bytes } => IncomingRecord::bytes(tag, bytes),
            HeaderLine::HexAttached { tag, message } => {
                self.state = FrameState::AwaitingAttachment { tag, message };
                return Ok(None);
            }
            HeaderLine::Bin { tag, len } => {
                IncomingRecord::bytes(tag, self.read_block(len, "msgbin").await?)
            }
            HeaderLine::BinAttached {
                tag,
                msg_len,
                att_len,
            } => {
                let message = self.read_block(msg_len, "msgattbin").await?;
                match att_len {
                    Some(att_len) => {
                        let att = self.read_block(att_len, "msgattbin attachment").await?;
                        IncomingRecord::attached(tag, message, att)
                    }
                    None => {
                        self.state = FrameState::AwaitingAttachment { tag, message };
                        return Ok(None);
                    }
                }
            }
        };
        Ok(Some(record))
    }

    /// One line without its terminator, `None` at end of stream
    async fn read_line(&mut self) -> Result<Option<String>> {
        let max = self.max_line_len();
        let limit = u64::try_from(max).unwrap_or(u64::MAX).saturating_add(1);
        let mut buf = Vec::new();
        let n = (&mut self.reader).take(limit).read_until(b'\n', &mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        if n as u64 == limit && buf.last() != Some(&b'\n') {
            return Err(FramingError::LineTooLong { max }.into());
        }
        let line = String::from_utf8_lossy(&buf);
        Ok(Some(strip_line_terminator(&line).to_string()))
    }

    /// Exactly `len` raw bytes
    async fn read_block(&mut self, len: usize, context: &'static str) -> Result<Vec<u8>> {
        if len > self.max_block_len {
            return Err(FramingError::Oversized {
                context,
                len,
                max: self.max_block_len,
            }
            .into());
        }

        let mut block = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            let n = self.reader.read(&mut block[filled..]).await?;
            if n == 0 {
                return Err(FramingError::Truncated {
                    context,
                    expected: len,
                    got: filled,
                }
                .into());
            }
            filled += n;
        }
        Ok(block)
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        if let Some(sender) = &self.diagnostics {
            if sender.send(diagnostic).is_err() {
                // receiver gone, keep logging only
                self.diagnostics = None;
            }
        }
    }
}
