// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for message formats and the codec.
//!
//! Exercises the public `msg` API the way the CLI drives it: parse a textual
//! format, parse values, encode, stream, decode.

use socket_toolbox::error::{CodecError, FormatError};
use socket_toolbox::msg::input::{parse_hex, parse_values, tokenize};
use socket_toolbox::msg::{
    ItemFormat, ItemValue, Message, MessageDecoder, MessageEncoder, MessageFormat,
};

fn format_from(spec: &str) -> MessageFormat {
    let items: Vec<ItemFormat> = spec
        .split_whitespace()
        .map(|item| item.parse().unwrap())
        .collect();
    MessageFormat::new(&items).unwrap()
}

// =============================================================================
// Format Validation
// =============================================================================

#[test]
fn codec_textual_format_round_trips_through_display() {
    let fmt = format_from("uint:2 len:1 varstr:1 bytes:3 len:2 varbytes:4 int:8 str:4");
    assert_eq!(
        fmt.to_string(),
        "uint:2 len:1 varstr:1 bytes:3 len:2 varbytes:4 int:8 str:4"
    );
    assert_eq!(fmt.derived_len_count(), 2);
}

#[test]
fn codec_rejects_len_referenced_twice() {
    let items = [
        ItemFormat::Len { len: 1 },
        ItemFormat::VarString { len_idx: 0 },
        ItemFormat::VarBytes { len_idx: 0 },
    ];
    assert!(matches!(
        MessageFormat::new(&items),
        Err(FormatError::LenReferencedTwice { len_idx: 0, .. })
    ));
}

#[test]
fn codec_rejects_forward_reference() {
    let items = [
        ItemFormat::VarBytes { len_idx: 1 },
        ItemFormat::Len { len: 1 },
    ];
    assert!(matches!(
        MessageFormat::new(&items),
        Err(FormatError::LenIdxNotPreceding { .. })
    ));
}

// =============================================================================
// Encode / Decode
// =============================================================================

#[test]
fn codec_short_values_fill_lengths() {
    let fmt = format_from("uint:2 len:1 varstr:1 int:2 len:2 varbytes:4");
    let values = parse_values(&fmt, &["1", "ab", "-2", "00FF"]).unwrap();
    let msg = Message::new(values);
    assert_eq!(msg.to_string(), r#"1 | 2 | "ab" | -2 | 2 | 0x00FF"#);

    let bytes = fmt.encode(&msg).unwrap();
    assert_eq!(hex::encode_upper(&bytes), "0001026162FFFE000200FF");
    assert_eq!(fmt.decode(&bytes).unwrap(), msg);
}

#[test]
fn codec_interactive_line_to_wire() {
    let fmt = format_from("len:1 varstr:0 str:6");
    let tokens = tokenize(r#""say \"hi\"" tail"#).unwrap();
    let msg = Message::new(parse_values(&fmt, tokens.as_slice()).unwrap());
    let bytes = fmt.encode(&msg).unwrap();
    assert_eq!(bytes[0], 8);
    assert_eq!(&bytes[1..9], b"say \"hi\"");
    assert_eq!(&bytes[9..], b"tail\0\0");

    let decoded = fmt.decode(&bytes).unwrap();
    assert_eq!(
        decoded.values()[2],
        ItemValue::String("tail".to_string())
    );
}

#[test]
fn codec_decode_hex_input() {
    let fmt = format_from("uint:1 bytes:2");
    let bytes = parse_hex("0x 07 BE EF").unwrap();
    let msg = fmt.decode(&bytes).unwrap();
    assert_eq!(msg.to_string(), "7 | 0xBEEF");
    assert!(parse_hex("0x7").is_err());
}

#[test]
fn codec_decode_reports_truncation_and_trailing_bytes() {
    let fmt = format_from("uint:2 len:1 varbytes:1");
    assert!(matches!(
        fmt.decode(&[0, 1, 3, 0xAA]),
        Err(CodecError::Eof { item_idx: 2, .. })
    ));
    assert!(matches!(
        fmt.decode(&[0, 1, 0, 0xAA]),
        Err(CodecError::TrailingBytes { count: 1 })
    ));
}

// =============================================================================
// Streams
// =============================================================================

#[tokio::test]
async fn codec_stream_carries_back_to_back_messages() {
    let fmt = format_from("uint:1 len:1 varstr:1");
    let (mut client, mut server) = tokio::io::duplex(64);

    let writer_fmt = fmt.clone();
    let writer = tokio::spawn(async move {
        let mut encoder = MessageEncoder::new(&writer_fmt, &mut client);
        for (id, text) in [(1, "one"), (2, ""), (3, "three")] {
            let values = parse_values(&writer_fmt, &[id.to_string(), text.to_string()]).unwrap();
            encoder.encode(&Message::new(values)).await.unwrap();
        }
    });

    let mut decoder = MessageDecoder::new(&fmt, &mut server);
    let mut texts = Vec::new();
    for _ in 0..3 {
        let msg = decoder.decode().await.unwrap();
        texts.push(msg.values()[2].to_string());
    }
    writer.await.unwrap();
    assert_eq!(texts, vec![r#""one""#, r#""""#, r#""three""#]);

    assert!(matches!(
        decoder.decode().await,
        Err(CodecError::EndOfStream)
    ));
}
