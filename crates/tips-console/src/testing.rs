//! Testing utilities
//!
//! [`ConsoleOutput`] renders records and status lines the way the console
//! prints them, so decoders can be exercised without a running console.

use tips_console_protocol::{IncomingRecord, OutputFormat, Payload, STATUS_MARKER, Tag};

/// Builder for a fake console stdout/stderr byte stream
///
/// ```
/// use tips_console::testing::ConsoleOutput;
/// use tips_console::{IncomingRecord, OutputFormat};
///
/// let bytes = ConsoleOutput::new(OutputFormat::Hex)
///     .record(&IncomingRecord::bytes(1001, vec![0x0a, 0xff]))
///     .into_bytes();
/// assert_eq!(bytes, b"1001 msg= 0a ff\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConsoleOutput {
    format: OutputFormat,
    buf: Vec<u8>,
}

impl ConsoleOutput {
    /// Start an empty stream printed in `format`
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            buf: Vec::new(),
        }
    }

    /// Change the format for records appended after this call
    pub fn switch(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Append a record in the current format
    ///
    /// In string format only the primary payload is printed, the console
    /// drops attachments there. In binary format an attached record is a
    /// `msgattbin= <m>` block followed by an `attbin= <n>` block.
    pub fn record(mut self, record: &IncomingRecord) -> Self {
        let tag = record.tag;
        match (self.format, &record.payload) {
            (OutputFormat::Hex, Payload::Str { msgstr }) => {
                self.hex_line(tag, "msg", msgstr.as_bytes());
            }
            (OutputFormat::Hex, Payload::Bytes { msg }) => self.hex_line(tag, "msg", msg),
            (OutputFormat::Hex, Payload::Attached { msgatt, att }) => {
                self.hex_line(tag, "msgatt", msgatt);
                self.hex_line_untagged("att", att);
            }
            (OutputFormat::Str, payload) => {
                let text = match payload {
                    Payload::Str { msgstr } => msgstr.clone(),
                    Payload::Bytes { msg } => String::from_utf8_lossy(msg).into_owned(),
                    Payload::Attached { msgatt, .. } => String::from_utf8_lossy(msgatt).into_owned(),
                };
                self.buf
                    .extend_from_slice(format!("{} msgstr= {}\n", tag, text).as_bytes());
            }
            (OutputFormat::Bin, Payload::Str { msgstr }) => {
                self.bin_block(tag, msgstr.as_bytes());
            }
            (OutputFormat::Bin, Payload::Bytes { msg }) => self.bin_block(tag, msg),
            (OutputFormat::Bin, Payload::Attached { msgatt, att }) => {
                self.buf
                    .extend_from_slice(format!("{} msgattbin= {}\n", tag, msgatt.len()).as_bytes());
                self.buf.extend_from_slice(msgatt);
                self.buf
                    .extend_from_slice(format!("\nattbin= {}\n", att.len()).as_bytes());
                self.buf.extend_from_slice(att);
                self.buf.push(b'\n');
            }
        }
        self
    }

    /// Append an attached record as one `msgattbin= <m> <n>` block
    ///
    /// Both lengths sit on the header line and the two payloads follow back
    /// to back. The decoder accepts this alongside the `attbin=` form that
    /// [`ConsoleOutput::record`] produces.
    pub fn paired_attachment(mut self, tag: Tag, message: &[u8], attachment: &[u8]) -> Self {
        self.buf.extend_from_slice(
            format!("{} msgattbin= {} {}\n", tag, message.len(), attachment.len()).as_bytes(),
        );
        self.buf.extend_from_slice(message);
        self.buf.extend_from_slice(attachment);
        self.buf.push(b'\n');
        self
    }

    /// Append a `[status]` line as printed on stderr
    pub fn status(mut self, text: &str) -> Self {
        self.buf
            .extend_from_slice(format!("{} {}\n", STATUS_MARKER, text).as_bytes());
        self
    }

    /// Append an arbitrary line, terminator added
    pub fn line(mut self, line: &str) -> Self {
        self.buf.extend_from_slice(line.as_bytes());
        self.buf.push(b'\n');
        self
    }

    /// Append raw bytes unchanged
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// The bytes built so far
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn hex_line(&mut self, tag: Tag, token: &str, bytes: &[u8]) {
        self.buf.extend_from_slice(format!("{} ", tag).as_bytes());
        self.hex_line_untagged(token, bytes);
    }

    fn hex_line_untagged(&mut self, token: &str, bytes: &[u8]) {
        let mut line = format!("{}=", token);
        for byte in bytes {
            line.push_str(&format!(" {:02x}", byte));
        }
        line.push('\n');
        self.buf.extend_from_slice(line.as_bytes());
    }

    fn bin_block(&mut self, tag: Tag, bytes: &[u8]) {
        self.buf
            .extend_from_slice(format!("{} msgbin= {}\n", tag, bytes.len()).as_bytes());
        self.buf.extend_from_slice(bytes);
        self.buf.push(b'\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_attached_rendering() {
        let bytes = ConsoleOutput::new(OutputFormat::Hex)
            .record(&IncomingRecord::attached(2001, vec![1, 2], vec![0xab]))
            .into_bytes();
        assert_eq!(bytes, b"2001 msgatt= 01 02\natt= ab\n");
    }

    #[test]
    fn test_str_rendering_drops_attachment() {
        let bytes = ConsoleOutput::new(OutputFormat::Str)
            .record(&IncomingRecord::string(1099, "some string in a line"))
            .record(&IncomingRecord::attached(1100, b"abc".to_vec(), vec![1]))
            .into_bytes();
        assert_eq!(
            bytes,
            b"1099 msgstr= some string in a line\n1100 msgstr= abc\n"
        );
    }

    #[test]
    fn test_bin_rendering() {
        let bytes = ConsoleOutput::new(OutputFormat::Bin)
            .record(&IncomingRecord::bytes(1099, vec![0, b'\n']))
            .record(&IncomingRecord::attached(1201, vec![7], vec![8, 9]))
            .into_bytes();
        assert_eq!(
            bytes,
            b"1099 msgbin= 2\n\x00\n\n1201 msgattbin= 1\n\x07\nattbin= 2\n\x08\x09\n".to_vec()
        );
    }

    #[test]
    fn test_paired_attachment_and_status() {
        let bytes = ConsoleOutput::default()
            .paired_attachment(1201, &[1], &[2, 3])
            .status("Session started")
            .into_bytes();
        assert_eq!(
            bytes,
            b"1201 msgattbin= 1 2\n\x01\x02\x03\n[status] Session started\n".to_vec()
        );
    }
}
