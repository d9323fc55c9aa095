//! Tokenizing of console output lines
//!
//! Stdout carries message headers of the form `<tag> <type>= <value>`, with
//! an attachment following its header as `att= <hex>` (hex output) or
//! `attbin= <len>` plus raw bytes (binary output). Stderr carries one status
//! or diagnostic line per message.
//!
//! These functions only look at a single line with its terminator removed.
//! Reading raw byte blocks and tracking the attachment state is up to the
//! caller.

use crate::error::{ProtocolError, Result};
use crate::hex::decode_hex_tokens;
use crate::types::{StatusRecord, Tag};

/// Marker the console puts in front of its status lines on stderr
pub const STATUS_MARKER: &str = "[status]";

/// A tokenized stdout header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderLine {
    /// `<tag> msgstr= <text>`
    Str {
        /// Message tag
        tag: Tag,
        /// Text with the leading separator removed
        text: String,
    },

    /// `<tag> msg= XX XX ...`
    Hex {
        /// Message tag
        tag: Tag,
        /// Decoded bytes
        bytes: Vec<u8>,
    },

    /// `<tag> msgatt= XX XX ...`, attachment line follows
    HexAttached {
        /// Message tag
        tag: Tag,
        /// Decoded primary bytes
        message: Vec<u8>,
    },

    /// `<tag> msgbin= <len>`, raw bytes follow
    Bin {
        /// Message tag
        tag: Tag,
        /// Number of raw bytes to read
        len: usize,
    },

    /// `<tag> msgattbin= <msg_len> [<att_len>]`, raw bytes follow
    ///
    /// Without `att_len` the attachment comes later as an `attbin=` line.
    BinAttached {
        /// Message tag
        tag: Tag,
        /// Number of primary bytes to read
        msg_len: usize,
        /// Number of attachment bytes that directly follow the primary bytes
        att_len: Option<usize>,
    },
}

impl HeaderLine {
    /// Tag of the message this header starts
    pub fn tag(&self) -> Tag {
        match self {
            HeaderLine::Str { tag, .. }
            | HeaderLine::Hex { tag, .. }
            | HeaderLine::HexAttached { tag, .. }
            | HeaderLine::Bin { tag, .. }
            | HeaderLine::BinAttached { tag, .. } => *tag,
        }
    }
}

/// A line read while an attachment is pending
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentLine {
    /// `att= XX XX ...`
    Hex(Vec<u8>),

    /// `attbin= <len>`, raw bytes follow
    Bin(usize),

    /// Anything else
    Unexpected {
        /// Token before `=` (the whole line when there is no `=`)
        token: String,
        /// Everything after `=`
        value: String,
    },
}

/// Remove a trailing `\n` or `\r\n`
pub fn strip_line_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Tokenize a stdout header line
///
/// # Errors
///
/// Returns a [`ProtocolError`] for a missing or non-integer tag, a missing
/// `=`, an unknown type token, or a malformed value.
pub fn parse_header_line(line: &str) -> Result<HeaderLine> {
    let (tag_token, rest) = line
        .trim_start()
        .split_once(char::is_whitespace)
        .ok_or_else(|| ProtocolError::MissingTag(line.to_string()))?;
    let tag: Tag = tag_token
        .parse()
        .map_err(|_| ProtocolError::InvalidTag(tag_token.to_string()))?;

    let (token, value) = rest
        .trim_start()
        .split_once('=')
        .ok_or_else(|| ProtocolError::MissingSeparator(line.to_string()))?;

    match token.trim() {
        "msgstr" => {
            // drop the separator the console writes after '='
            let mut chars = value.chars();
            chars.next();
            Ok(HeaderLine::Str {
                tag,
                text: chars.as_str().to_string(),
            })
        }
        "msg" => Ok(HeaderLine::Hex {
            tag,
            bytes: decode_hex_tokens(value)?,
        }),
        "msgatt" => Ok(HeaderLine::HexAttached {
            tag,
            message: decode_hex_tokens(value)?,
        }),
        "msgbin" => match parse_lengths(value)?.as_slice() {
            [len] => Ok(HeaderLine::Bin { tag, len: *len }),
            _ => Err(ProtocolError::InvalidLength(value.to_string())),
        },
        "msgattbin" => match parse_lengths(value)?.as_slice() {
            [msg_len] => Ok(HeaderLine::BinAttached {
                tag,
                msg_len: *msg_len,
                att_len: None,
            }),
            [msg_len, att_len] => Ok(HeaderLine::BinAttached {
                tag,
                msg_len: *msg_len,
                att_len: Some(*att_len),
            }),
            _ => Err(ProtocolError::InvalidLength(value.to_string())),
        },
        other => Err(ProtocolError::UnknownType {
            token: other.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Tokenize a line read while an attachment is pending
///
/// # Errors
///
/// Returns a [`ProtocolError`] only when the line is an `att=`/`attbin=` line
/// with a malformed value. Any other line is [`AttachmentLine::Unexpected`].
pub fn parse_attachment_line(line: &str) -> Result<AttachmentLine> {
    let Some((token, value)) = line.split_once('=') else {
        return Ok(AttachmentLine::Unexpected {
            token: line.trim().to_string(),
            value: String::new(),
        });
    };

    match token.trim() {
        "att" => Ok(AttachmentLine::Hex(decode_hex_tokens(value)?)),
        "attbin" => match parse_lengths(value)?.as_slice() {
            [len] => Ok(AttachmentLine::Bin(*len)),
            _ => Err(ProtocolError::InvalidLength(value.to_string())),
        },
        other => Ok(AttachmentLine::Unexpected {
            token: other.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Classify one stderr line
pub fn classify_status_line(line: &str) -> StatusRecord {
    let line = strip_line_terminator(line);
    let trimmed = line.trim_start();
    let (token, rest) = trimmed
        .split_once(char::is_whitespace)
        .map(|(token, rest)| (token, rest.trim_start()))
        .unwrap_or((trimmed, ""));

    if token == STATUS_MARKER {
        StatusRecord::Status(rest.to_string())
    } else {
        StatusRecord::Other(line.to_string())
    }
}

fn parse_lengths(value: &str) -> Result<Vec<usize>> {
    value
        .split_whitespace()
        .map(|token| {
            token
                .parse::<usize>()
                .map_err(|_| ProtocolError::InvalidLength(value.to_string()))
        })
        .collect()
}
