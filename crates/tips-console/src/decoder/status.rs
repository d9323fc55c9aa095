//! Stderr decoder: one [`StatusRecord`] per line

use crate::error::Result;
use futures::Stream;
use tips_console_protocol::{StatusRecord, classify_status_line};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Lazy sequence of [`StatusRecord`]s read from the console's stderr
///
/// Stateless: each line is classified on its own.
#[derive(Debug)]
pub struct StatusMessages<R> {
    reader: BufReader<R>,
    finished: bool,
}

impl<R: AsyncRead + Unpin> StatusMessages<R> {
    /// Decode status lines from `reader`
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            finished: false,
        }
    }

    /// Read the next status record, `None` once the stream is closed
    pub async fn next(&mut self) -> Option<Result<StatusRecord>> {
        if self.finished {
            return None;
        }
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf).await {
            Ok(0) => {
                self.finished = true;
                None
            }
            Ok(_) => Some(Ok(classify_status_line(&String::from_utf8_lossy(&buf)))),
            Err(e) => {
                self.finished = true;
                Some(Err(e.into()))
            }
        }
    }

    /// Adapt into a [`Stream`]
    pub fn into_stream(self) -> impl Stream<Item = Result<StatusRecord>> {
        futures::stream::unfold(self, |mut decoder| async move {
            decoder.next().await.map(|item| (item, decoder))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_status_and_other_lines() {
        let input: &[u8] = b"[status] Session started\nwarning: foo\n[status] exiting... \n";
        let records: Vec<StatusRecord> = StatusMessages::new(input)
            .into_stream()
            .map(|r| r.unwrap())
            .collect()
            .await;

        assert_eq!(
            records,
            vec![
                StatusRecord::Status("Session started".to_string()),
                StatusRecord::Other("warning: foo".to_string()),
                StatusRecord::Status("exiting... ".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_last_line_without_terminator() {
        let mut msgs = StatusMessages::new(&b"[status] bag play done"[..]);
        assert_eq!(
            msgs.next().await.unwrap().unwrap(),
            StatusRecord::Status("bag play done".to_string())
        );
        assert!(msgs.next().await.is_none());
        assert!(msgs.next().await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_lossy() {
        let mut msgs = StatusMessages::new(&b"bad \xff byte\n"[..]);
        let record = msgs.next().await.unwrap().unwrap();
        assert_eq!(record.other(), Some("bad \u{fffd} byte"));
    }

    #[tokio::test]
    async fn test_empty_stream() {
        let mut msgs = StatusMessages::new(&b""[..]);
        assert!(msgs.next().await.is_none());
    }
}
