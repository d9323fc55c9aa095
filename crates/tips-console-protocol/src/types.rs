//! Record types produced by decoding the console's output streams
//!
//! Field names follow what the console prints (`msgstr`, `msg`, `msgatt`,
//! `att`, `status`), so a record serialized to JSON reads like the line it
//! came from.

use serde::{Deserialize, Serialize};

/// Topic identifier for publish/subscribe routing
///
/// The console parses tags as 16 bit unsigned integers and forwards them
/// untouched; the client does the same.
pub type Tag = u16;

/// Output formatting mode of the console's stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Bytes as space separated hex (`ohex`, the console default)
    #[default]
    Hex,

    /// Message bytes as a string (`ostr`)
    Str,

    /// Raw length-prefixed bytes (`obin`)
    Bin,
}

impl OutputFormat {
    /// The console command that switches to this format
    pub fn command_name(&self) -> &'static str {
        match self {
            OutputFormat::Hex => "ohex",
            OutputFormat::Str => "ostr",
            OutputFormat::Bin => "obin",
        }
    }
}

/// A message delivered by the console on stdout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingRecord {
    /// Tag the message was published on
    pub tag: Tag,

    /// The decoded payload
    #[serde(flatten)]
    pub payload: Payload,
}

/// Payload of an [`IncomingRecord`]
///
/// Exactly one variant per record. A message with an attachment is only ever
/// built once both parts have been read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// Message bytes followed by a separate attachment
    Attached {
        /// Primary message bytes
        msgatt: Vec<u8>,
        /// Attachment bytes
        att: Vec<u8>,
    },

    /// String output (`msgstr=`)
    Str {
        /// The text, without the separator the console puts after `=`
        msgstr: String,
    },

    /// Raw bytes (`msg=` in hex or `msgbin=` in binary output)
    Bytes {
        /// Message bytes
        msg: Vec<u8>,
    },
}

impl IncomingRecord {
    /// Create a string record
    pub fn string(tag: Tag, text: impl Into<String>) -> Self {
        Self {
            tag,
            payload: Payload::Str {
                msgstr: text.into(),
            },
        }
    }

    /// Create a plain bytes record
    pub fn bytes(tag: Tag, msg: impl Into<Vec<u8>>) -> Self {
        Self {
            tag,
            payload: Payload::Bytes { msg: msg.into() },
        }
    }

    /// Create a record with an attachment
    pub fn attached(tag: Tag, msgatt: impl Into<Vec<u8>>, att: impl Into<Vec<u8>>) -> Self {
        Self {
            tag,
            payload: Payload::Attached {
                msgatt: msgatt.into(),
                att: att.into(),
            },
        }
    }

    /// String payload, if this is a `msgstr` record
    pub fn msgstr(&self) -> Option<&str> {
        match &self.payload {
            Payload::Str { msgstr } => Some(msgstr),
            _ => None,
        }
    }

    /// Bytes payload, if this is a `msg`/`msgbin` record
    pub fn msg(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Bytes { msg } => Some(msg),
            _ => None,
        }
    }

    /// Primary bytes of a record with an attachment
    pub fn msgatt(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Attached { msgatt, .. } => Some(msgatt),
            _ => None,
        }
    }

    /// Attachment bytes
    pub fn att(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Attached { att, .. } => Some(att),
            _ => None,
        }
    }
}

/// One line of the console's stderr
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusRecord {
    /// A `[status] ...` line, marker removed
    Status(String),

    /// Any other line, verbatim
    Other(String),
}

impl StatusRecord {
    /// Text of a `[status]` line
    pub fn status(&self) -> Option<&str> {
        match self {
            StatusRecord::Status(text) => Some(text),
            StatusRecord::Other(_) => None,
        }
    }

    /// Text of an unrecognized line
    pub fn other(&self) -> Option<&str> {
        match self {
            StatusRecord::Other(text) => Some(text),
            StatusRecord::Status(_) => None,
        }
    }
}
