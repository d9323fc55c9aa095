//! Commands understood by the console on its stdin
//!
//! Every command encodes to exactly one newline terminated line, except the
//! raw binary publishes which append their payload bytes after the header
//! line. Commands borrow their arguments; encoding allocates a single buffer.

use crate::error::{ProtocolError, Result};
use crate::hex::push_hex_tokens;
use crate::types::{OutputFormat, Tag};
use std::path::Path;

/// One console command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleCommand<'a> {
    /// `pubtags <tag> <tag> ...`
    PubTags(&'a [Tag]),

    /// `subtags <tag> <tag> ...`
    SubTags(&'a [Tag]),

    /// `pubstr <tag> <text>`
    PubStr {
        /// Tag to publish on
        tag: Tag,
        /// Single line of text
        text: &'a str,
    },

    /// `pub <tag> <len> XX XX ...`
    Pub {
        /// Tag to publish on
        tag: Tag,
        /// Message bytes
        bytes: &'a [u8],
    },

    /// `pubbin <tag> <len>` then the raw bytes
    PubBin {
        /// Tag to publish on
        tag: Tag,
        /// Message bytes
        bytes: &'a [u8],
    },

    /// `pubatt <tag> <msg_len> <att_len> XX XX ...`
    PubAtt {
        /// Tag to publish on
        tag: Tag,
        /// Primary message bytes
        message: &'a [u8],
        /// Attachment bytes
        attachment: &'a [u8],
    },

    /// `pubattbin <tag> <msg_len> <att_len>` then the raw bytes
    PubAttBin {
        /// Tag to publish on
        tag: Tag,
        /// Primary message bytes
        message: &'a [u8],
        /// Attachment bytes
        attachment: &'a [u8],
    },

    /// `play <bag>`
    Play {
        /// Bag file to replay
        bag: &'a Path,
    },

    /// `record <bag> <seconds>`
    Record {
        /// Bag file to write
        bag: &'a Path,
        /// Recording window in seconds
        seconds: f64,
    },

    /// `ohex` / `ostr` / `obin`
    Output(OutputFormat),

    /// `help`
    Help,

    /// `exit`
    Exit,
}

impl<'a> ConsoleCommand<'a> {
    /// `pubatt` from one buffer holding the message followed by the attachment
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidArgument`] if `msg_len` exceeds the
    /// buffer.
    pub fn pub_att(tag: Tag, msg_len: usize, bytes: &'a [u8]) -> Result<Self> {
        let (message, attachment) = split_message(msg_len, bytes)?;
        Ok(ConsoleCommand::PubAtt {
            tag,
            message,
            attachment,
        })
    }

    /// `pubattbin` from one buffer holding the message followed by the attachment
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidArgument`] if `msg_len` exceeds the
    /// buffer.
    pub fn pub_att_bin(tag: Tag, msg_len: usize, bytes: &'a [u8]) -> Result<Self> {
        let (message, attachment) = split_message(msg_len, bytes)?;
        Ok(ConsoleCommand::PubAttBin {
            tag,
            message,
            attachment,
        })
    }
}

impl ConsoleCommand<'_> {
    /// The command keyword as the console reads it
    pub fn name(&self) -> &'static str {
        match self {
            ConsoleCommand::PubTags(_) => "pubtags",
            ConsoleCommand::SubTags(_) => "subtags",
            ConsoleCommand::PubStr { .. } => "pubstr",
            ConsoleCommand::Pub { .. } => "pub",
            ConsoleCommand::PubBin { .. } => "pubbin",
            ConsoleCommand::PubAtt { .. } => "pubatt",
            ConsoleCommand::PubAttBin { .. } => "pubattbin",
            ConsoleCommand::Play { .. } => "play",
            ConsoleCommand::Record { .. } => "record",
            ConsoleCommand::Output(format) => format.command_name(),
            ConsoleCommand::Help => "help",
            ConsoleCommand::Exit => "exit",
        }
    }

    /// Check that the arguments fit the line grammar
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidArgument`] when a text argument contains
    /// a line break, a bag path is empty or not a single token, or a record
    /// duration is negative or not finite.
    pub fn validate(&self) -> Result<()> {
        match self {
            ConsoleCommand::PubStr { text, .. } => {
                if text.contains(['\n', '\r']) {
                    return Err(ProtocolError::InvalidArgument(
                        "pubstr text must be a single line".to_string(),
                    ));
                }
            }
            ConsoleCommand::Play { bag } => validate_bag(bag)?,
            ConsoleCommand::Record { bag, seconds } => {
                validate_bag(bag)?;
                if !seconds.is_finite() || *seconds < 0.0 {
                    return Err(ProtocolError::InvalidArgument(format!(
                        "record duration must be a non-negative number of seconds, got {}",
                        seconds
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Encode into the bytes written to the console's stdin
    pub fn encode(&self) -> Vec<u8> {
        let mut line = String::from(self.name());
        // raw payload blocks that follow the header line
        let mut raw: [&[u8]; 2] = [&[], &[]];

        match self {
            ConsoleCommand::PubTags(tags) | ConsoleCommand::SubTags(tags) => {
                for tag in tags.iter() {
                    line.push_str(&format!(" {}", tag));
                }
            }
            ConsoleCommand::PubStr { tag, text } => {
                line.push_str(&format!(" {} {}", tag, text));
            }
            ConsoleCommand::Pub { tag, bytes } => {
                line.push_str(&format!(" {} {}", tag, bytes.len()));
                push_hex_tokens(&mut line, bytes);
            }
            ConsoleCommand::PubBin { tag, bytes } => {
                line.push_str(&format!(" {} {}", tag, bytes.len()));
                raw[0] = *bytes;
            }
            ConsoleCommand::PubAtt {
                tag,
                message,
                attachment,
            } => {
                line.push_str(&format!(" {} {} {}", tag, message.len(), attachment.len()));
                push_hex_tokens(&mut line, message);
                push_hex_tokens(&mut line, attachment);
            }
            ConsoleCommand::PubAttBin {
                tag,
                message,
                attachment,
            } => {
                line.push_str(&format!(" {} {} {}", tag, message.len(), attachment.len()));
                raw = [*message, *attachment];
            }
            ConsoleCommand::Play { bag } => {
                line.push_str(&format!(" {}", bag.to_string_lossy()));
            }
            ConsoleCommand::Record { bag, seconds } => {
                line.push_str(&format!(" {} {}", bag.to_string_lossy(), seconds));
            }
            ConsoleCommand::Output(_) | ConsoleCommand::Help | ConsoleCommand::Exit => {}
        }

        line.push('\n');
        let mut out = line.into_bytes();
        for part in raw {
            out.extend_from_slice(part);
        }
        out
    }
}

fn split_message(msg_len: usize, bytes: &[u8]) -> Result<(&[u8], &[u8])> {
    if msg_len > bytes.len() {
        return Err(ProtocolError::InvalidArgument(format!(
            "message length {} exceeds buffer of {} bytes",
            msg_len,
            bytes.len()
        )));
    }
    Ok(bytes.split_at(msg_len))
}

fn validate_bag(bag: &Path) -> Result<()> {
    let text = bag.to_string_lossy();
    if text.is_empty() || text.contains(char::is_whitespace) {
        return Err(ProtocolError::InvalidArgument(format!(
            "bag file path must be a single non-empty token, got {:?}",
            text
        )));
    }
    Ok(())
}
