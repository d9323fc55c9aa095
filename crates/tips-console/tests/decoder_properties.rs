//! Decoder behavior over console-formatted byte streams
//!
//! Inputs are rendered with `testing::ConsoleOutput` and fed through
//! in-memory readers, including readers that deliver bytes in small chunks.

use rstest::rstest;
use std::time::Duration;
use tips_console::testing::ConsoleOutput;
use tips_console::{
    ConsoleError, DiagnosticKind, FramingError, IncomingMessages, IncomingRecord, OutputFormat,
    StatusMessages, StatusRecord,
};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

async fn decode_all(input: &[u8]) -> Vec<IncomingRecord> {
    let mut msgs = IncomingMessages::new(input);
    let mut records = Vec::new();
    while let Some(record) = msgs.next().await {
        records.push(record.expect("decode failed"));
    }
    records
}

fn sample_records() -> Vec<IncomingRecord> {
    vec![
        IncomingRecord::bytes(1001, vec![0x00, 0x0a, 0x0d, 0xff]),
        IncomingRecord::attached(2001, vec![1, 2, 3, 4], vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]),
        IncomingRecord::bytes(1002, Vec::new()),
        IncomingRecord::attached(2002, b"=\n".to_vec(), vec![b'\n'; 3]),
    ]
}

#[rstest]
#[case::hex(OutputFormat::Hex)]
#[case::bin(OutputFormat::Bin)]
#[tokio::test]
async fn test_byte_records_survive_console_formatting(#[case] format: OutputFormat) {
    let records = sample_records();
    let mut output = ConsoleOutput::new(format);
    for record in &records {
        output = output.record(record);
    }

    assert_eq!(decode_all(&output.into_bytes()).await, records);
}

#[tokio::test]
async fn test_string_record_from_console_line() {
    let input = ConsoleOutput::new(OutputFormat::Str)
        .record(&IncomingRecord::string(1001, "hello world"))
        .into_bytes();
    assert_eq!(input, b"1001 msgstr= hello world\n");
    assert_eq!(
        decode_all(&input).await,
        vec![IncomingRecord::string(1001, "hello world")]
    );
}

#[tokio::test]
async fn test_string_keeps_inner_and_trailing_spaces() {
    let records = decode_all(b"7 msgstr=  two leading, one trailing \r\n").await;
    assert_eq!(
        records,
        vec![IncomingRecord::string(7, " two leading, one trailing ")]
    );
}

#[tokio::test]
async fn test_format_switches_mid_stream() {
    let input = ConsoleOutput::new(OutputFormat::Hex)
        .record(&IncomingRecord::bytes(1, vec![0xab]))
        .switch(OutputFormat::Str)
        .record(&IncomingRecord::string(2, "text"))
        .switch(OutputFormat::Bin)
        .record(&IncomingRecord::bytes(3, b"bin\n".to_vec()))
        .record(&IncomingRecord::attached(4, b"m".to_vec(), b"att".to_vec()))
        .paired_attachment(5, b"\nmsg", b"")
        .into_bytes();

    assert_eq!(
        decode_all(&input).await,
        vec![
            IncomingRecord::bytes(1, vec![0xab]),
            IncomingRecord::string(2, "text"),
            IncomingRecord::bytes(3, b"bin\n".to_vec()),
            IncomingRecord::attached(4, b"m".to_vec(), b"att".to_vec()),
            IncomingRecord::attached(5, b"\nmsg".to_vec(), Vec::new()),
        ]
    );
}

#[tokio::test]
async fn test_msgbin_block_split_across_reads() {
    let block = [b'\n', b'1', b' ', b'm', b's', b'g', b'=', 0xff];
    let reader = tokio_test::io::Builder::new()
        .read(b"1099 msgbin= 8\n")
        .read(&block[..3])
        .read(&block[3..])
        .read(b"\n1100 msg= 01\n")
        .build();

    let mut msgs = IncomingMessages::new(reader);
    assert_eq!(
        msgs.next().await.unwrap().unwrap(),
        IncomingRecord::bytes(1099, block.to_vec())
    );
    assert_eq!(
        msgs.next().await.unwrap().unwrap(),
        IncomingRecord::bytes(1100, vec![1])
    );
    assert!(msgs.next().await.is_none());
}

#[tokio::test]
async fn test_close_between_message_and_attachment_yields_nothing() {
    let (mut tx, rx) = tokio::io::duplex(256);
    let mut msgs = IncomingMessages::new(rx);

    tx.write_all(b"2001 msgatt= 01 02 03 04\n").await.unwrap();
    tokio::task::yield_now().await;
    drop(tx);

    assert!(msgs.next().await.is_none());
    assert!(msgs.next().await.is_none());
}

#[tokio::test]
async fn test_attachment_waits_for_late_line() {
    let (mut tx, rx) = tokio::io::duplex(256);
    let mut msgs = IncomingMessages::new(rx);

    let writer = tokio::spawn(async move {
        tx.write_all(b"2001 msgatt= 0a\n").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.write_all(b"att= 0b 0c\n").await.unwrap();
    });

    assert_eq!(
        msgs.next().await.unwrap().unwrap(),
        IncomingRecord::attached(2001, vec![0x0a], vec![0x0b, 0x0c])
    );
    writer.await.unwrap();
    assert!(msgs.next().await.is_none());
}

#[tokio::test]
async fn test_truncated_block_ends_with_framing_error() {
    let mut input = b"1 msg= 01\n5 msgattbin= 4 4\n".to_vec();
    input.extend_from_slice(&[1, 2, 3, 4, 5]);
    let mut msgs = IncomingMessages::new(&input[..]);

    assert_eq!(
        msgs.next().await.unwrap().unwrap(),
        IncomingRecord::bytes(1, vec![1])
    );
    match msgs.next().await {
        Some(Err(ConsoleError::Framing(FramingError::Truncated { expected, got, .. }))) => {
            assert_eq!((expected, got), (4, 1));
        }
        other => panic!("expected truncation, got {:?}", other),
    }
    assert!(msgs.next().await.is_none());
}

#[tokio::test]
async fn test_help_text_only_produces_diagnostics() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let input = ConsoleOutput::default()
        .line("Console commands:")
        .line("pubtags <space-separated-tags>")
        .line("    example: pubtags 1001 2001")
        .record(&IncomingRecord::bytes(1001, vec![1]))
        .into_bytes();

    let mut msgs = IncomingMessages::new(&input[..]).with_diagnostics(tx);
    assert_eq!(
        msgs.next().await.unwrap().unwrap(),
        IncomingRecord::bytes(1001, vec![1])
    );
    assert!(msgs.next().await.is_none());

    let mut count = 0;
    while let Ok(diagnostic) = rx.try_recv() {
        assert!(matches!(diagnostic.kind, DiagnosticKind::MalformedHeader(_)));
        count += 1;
    }
    assert_eq!(count, 3);
}

#[tokio::test]
async fn test_status_lines_from_console_stderr() {
    let input = ConsoleOutput::default()
        .status("Session started")
        .line("warning: foo")
        .status("ignored att for tag=1001")
        .into_bytes();

    let mut msgs = StatusMessages::new(&input[..]);
    let mut records = Vec::new();
    while let Some(record) = msgs.next().await {
        records.push(record.unwrap());
    }
    assert_eq!(
        records,
        vec![
            StatusRecord::Status("Session started".to_string()),
            StatusRecord::Other("warning: foo".to_string()),
            StatusRecord::Status("ignored att for tag=1001".to_string()),
        ]
    );
}
