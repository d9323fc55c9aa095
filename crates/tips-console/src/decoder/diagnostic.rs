//! Side channel for lines the decoder could not use
//!
//! Diagnostics never enter the record sequence. They are logged at warn
//! level and, when a sender is attached, forwarded to the caller.

use std::fmt;
use tips_console_protocol::{ProtocolError, Tag};
use tokio::sync::mpsc;

/// Sending half of a diagnostics channel
pub type DiagnosticSender = mpsc::UnboundedSender<Diagnostic>;

/// What went wrong with a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A header line that could not be tokenized; it was skipped
    MalformedHeader(ProtocolError),

    /// A non-attachment line arrived while an attachment was pending; still waiting
    UnexpectedWhileAwaitingAttachment {
        /// Tag of the pending message
        tag: Tag,
        /// Token before `=`
        token: String,
        /// Value after `=`
        value: String,
    },

    /// An attachment line with a bad value; the pending message was dropped
    MalformedAttachment {
        /// Tag of the dropped message
        tag: Tag,
        /// Tokenizer error
        error: ProtocolError,
    },
}

/// A stdout line that did not produce a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Classification
    pub kind: DiagnosticKind,
    /// The offending line, terminator removed
    pub line: String,
}

impl Diagnostic {
    pub(crate) fn new(kind: DiagnosticKind, line: impl Into<String>) -> Self {
        Self {
            kind,
            line: line.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::MalformedHeader(error) => {
                write!(f, "skipped malformed header ({}): {:?}", error, self.line)
            }
            DiagnosticKind::UnexpectedWhileAwaitingAttachment { tag, token, value } => write!(
                f,
                "while expecting att for tag {}, got {}= and {}",
                tag, token, value
            ),
            DiagnosticKind::MalformedAttachment { tag, error } => write!(
                f,
                "dropped message tag {} with malformed attachment ({}): {:?}",
                tag, error, self.line
            ),
        }
    }
}
