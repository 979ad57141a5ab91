// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::net::SocketAddr;

use super::codec::{check_lines, decode_text, encode_hex, message_from_values};
use super::config::load_config;
use super::console::{ConnectLine, ServeLine, format_event, parse_connect_line, parse_serve_line};
use crate::cli::args::{DecodeArgs, EncodeArgs};
use crate::cli::global::GlobalOptions;
use crate::config::Config;
use crate::error::{InputError, ToolboxError};
use crate::msg::{ItemFormat, ItemValue, Message};
use crate::socket::SocketEvent;

fn config() -> Config {
    Config::parse(
        r#"
[message]
items = [
    { kind = "uint", len = 2 },
    { kind = "len", len = 1 },
    { kind = "var_string", len_idx = 1 },
    { kind = "int", len = 1 },
]
values = ["7", "hi", "-1"]
"#,
    )
    .unwrap()
}

fn encode_args(values: &[&str]) -> EncodeArgs {
    EncodeArgs {
        values: values.iter().map(ToString::to_string).collect(),
    }
}

#[test]
fn test_check_lines() {
    let lines = check_lines(&config()).unwrap();
    assert_eq!(lines[0], "format: uint:2 len:1 varstr:1 int:1");
    assert_eq!(lines.len(), 5);
}

#[test]
fn test_encode_uses_configured_values() {
    insta::assert_snapshot!(encode_hex(&config(), &EncodeArgs::default()).unwrap(), @"0007026869FF");
}

#[test]
fn test_encode_explicit_values() {
    let hex = encode_hex(&config(), &encode_args(&["258", "auto", "abc", "5"])).unwrap();
    assert_eq!(hex, "01020361626305");
}

#[test]
fn test_encode_rejects_out_of_range() {
    let err = encode_hex(&config(), &encode_args(&["1", "x", "200"])).unwrap_err();
    assert!(format!("{err:#}").contains("cannot encode"));
}

#[test]
fn test_decode_text_and_json() {
    let args = DecodeArgs {
        hex: "0x0007 02 6869 FF".to_string(),
        json: false,
    };
    insta::assert_snapshot!(decode_text(&config(), &args).unwrap(), @r#"7 | 2 | "hi" | -1"#);

    let args = DecodeArgs { json: true, ..args };
    insta::assert_snapshot!(
        decode_text(&config(), &args).unwrap(),
        @r#"[{"kind":"uint","value":7},{"kind":"len","value":2},{"kind":"string","value":"hi"},{"kind":"int","value":-1}]"#
    );
}

#[test]
fn test_decode_rejects_truncated() {
    let args = DecodeArgs {
        hex: "000702".to_string(),
        json: false,
    };
    assert!(decode_text(&config(), &args).is_err());
}

#[test]
fn test_decode_rejects_bad_hex_without_item_index() {
    let args = DecodeArgs {
        hex: "0x7".to_string(),
        json: false,
    };
    let err = decode_text(&config(), &args).unwrap_err();
    let err = err.downcast::<InputError>().unwrap();
    assert!(matches!(err, InputError::Hex { .. }));
    assert!(!err.to_string().contains("index of item"));
}

#[test]
fn test_message_from_values() {
    let fmt = config().message_format().unwrap();
    let msg = message_from_values(&fmt, &["1", "abc", "0"]).unwrap();
    assert_eq!(
        msg,
        Message::new(vec![
            ItemValue::Uint(1),
            ItemValue::Len(3),
            ItemValue::String("abc".to_string()),
            ItemValue::Int(0),
        ])
    );
    assert!(matches!(
        message_from_values(&fmt, &["1"]).unwrap_err(),
        ToolboxError::Input(_)
    ));
}

#[test]
fn test_load_config_applies_item_flags() {
    let global = GlobalOptions {
        items: vec![ItemFormat::Uint { len: 4 }],
        log_level: Some(1),
        ..GlobalOptions::default()
    };
    let config = load_config(&global).unwrap();
    assert_eq!(config.message.items, vec![ItemFormat::Uint { len: 4 }]);
    assert_eq!(config.global.output_log_level.as_u8(), 1);
    assert_eq!(config.global.file_log_level.as_u8(), 1);
}

#[test]
fn test_parse_serve_line() {
    assert_eq!(parse_serve_line("   ").unwrap(), ServeLine::Empty);
    assert_eq!(parse_serve_line("list").unwrap(), ServeLine::List);
    assert_eq!(
        parse_serve_line(r#"send 127.0.0.1:5000 7 "hello world""#).unwrap(),
        ServeLine::Send {
            peer: "127.0.0.1:5000".to_string(),
            values: vec!["7".to_string(), "hello world".to_string()],
        }
    );
    assert_eq!(
        parse_serve_line("broadcast 1 x").unwrap(),
        ServeLine::Broadcast {
            values: vec!["1".to_string(), "x".to_string()],
        }
    );
    assert_eq!(parse_serve_line("quit").unwrap(), ServeLine::Quit);
    assert!(matches!(
        parse_serve_line("send"),
        Err(InputError::UnknownCommand { .. })
    ));
    assert!(matches!(
        parse_serve_line("frobnicate"),
        Err(InputError::UnknownCommand { .. })
    ));
}

#[test]
fn test_parse_connect_line() {
    assert_eq!(parse_connect_line("").unwrap(), ConnectLine::Empty);
    assert_eq!(
        parse_connect_line("send 1 auto ok").unwrap(),
        ConnectLine::Send {
            values: vec!["1".to_string(), "auto".to_string(), "ok".to_string()],
        }
    );
    assert_eq!(parse_connect_line("help").unwrap(), ConnectLine::Help);
    assert!(matches!(
        parse_connect_line("send \"open"),
        Err(InputError::UnterminatedQuote { .. })
    ));
    assert!(parse_connect_line("list").is_err());
}

#[test]
fn test_format_event() {
    let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();
    let msg = Message::new(vec![ItemValue::Uint(7), ItemValue::String("hi".to_string())]);
    let lines = [
        format_event(&SocketEvent::Connected { peer }),
        format_event(&SocketEvent::Received {
            peer,
            msg: msg.clone(),
        }),
        format_event(&SocketEvent::Sent { peer, msg }),
        format_event(&SocketEvent::Disconnected { peer }),
    ];
    insta::assert_snapshot!(
        lines.join("\n"),
        @r#"
    ++ 127.0.0.1:5000 connected
    <- 127.0.0.1:5000: 7 | "hi"
    -> 127.0.0.1:5000: 7 | "hi"
    -- 127.0.0.1:5000 disconnected
    "#
    );
}
