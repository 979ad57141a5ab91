// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::Write;
use std::time::Duration;

use super::{Config, ConfigLoader};
use crate::error::{ConfigError, ToolboxError};
use crate::logging::LogLevel;
use crate::msg::ItemFormat;

const SAMPLE: &str = r#"
[global]
output_log_level = 4
log_file = "logs/toolbox.log"

[message]
items = [
    { kind = "uint", len = 2 },
    { kind = "len", len = 1 },
    { kind = "var_string", len_idx = 1 },
]
values = ["7", "auto", "hello"]

[server]
listen = "0.0.0.0:7000"
backlog = 16

[client]
connect = "127.0.0.1:7000"
connect_timeout_ms = 250
"#;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.global.output_log_level, LogLevel::INFO);
    assert_eq!(config.global.file_log_level, LogLevel::TRACE);
    assert!(config.global.log_file.is_none());
    assert!(config.message.items.is_empty());
    assert_eq!(config.server.listen, "127.0.0.1:0");
    assert_eq!(config.server.backlog, 1024);
    assert_eq!(config.client.connect_timeout_ms, 5000);
    assert!(config.client.connect.is_none());
}

#[test]
fn test_parse_sample() {
    let config = Config::parse(SAMPLE).unwrap();
    assert_eq!(config.global.output_log_level, LogLevel::DEBUG);
    assert_eq!(
        config.message.items,
        vec![
            ItemFormat::Uint { len: 2 },
            ItemFormat::Len { len: 1 },
            ItemFormat::VarString { len_idx: 1 },
        ]
    );
    assert_eq!(config.message.values, vec!["7", "auto", "hello"]);
    assert_eq!(config.server.listen, "0.0.0.0:7000");
    assert_eq!(config.server.backlog, 16);
    assert_eq!(config.server.event_capacity, 1024);
    assert_eq!(config.client.connect.as_deref(), Some("127.0.0.1:7000"));

    let fmt = config.message_format().unwrap();
    assert_eq!(fmt.len(), 3);
}

#[test]
fn test_socket_options_from_config() {
    let config = Config::parse(SAMPLE).unwrap();
    assert_eq!(config.server.options().backlog(), 16);
    assert_eq!(
        config.client.options().connect_timeout(),
        Duration::from_millis(250)
    );
}

#[test]
fn test_unknown_key_rejected() {
    let err = Config::parse("[server]\nlisten_addr = \"x\"\n").unwrap_err();
    assert!(format!("{err:#}").contains("listen_addr"));
}

#[test]
fn test_log_level_out_of_range_rejected() {
    assert!(Config::parse("[global]\noutput_log_level = 9\n").is_err());
}

#[test]
fn test_zero_capacity_rejected() {
    let err = Config::parse("[server]\nevent_capacity = 0\n").unwrap_err();
    let err = err.downcast::<ConfigError>().unwrap();
    insta::assert_snapshot!(
        err.to_string(),
        @"invalid value for 'event_capacity' in section '[server]': must be greater than zero"
    );
}

#[test]
fn test_message_format_missing_items() {
    let err = Config::default().message_format().unwrap_err();
    match err {
        ToolboxError::Config(e) => assert!(matches!(*e, ConfigError::MissingKey { .. })),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_message_format_invalid_items() {
    let config = Config::parse(
        "[message]\nitems = [{ kind = \"uint\", len = 2 }, { kind = \"var_bytes\", len_idx = 0 }]\n",
    )
    .unwrap();
    assert!(matches!(
        config.message_format().unwrap_err(),
        ToolboxError::Format(_)
    ));
}

#[test]
fn test_overrides_take_precedence() {
    let config = ConfigLoader::new()
        .add_toml_str(SAMPLE)
        .set_pairs(&["server.backlog=64", "client.bind = 127.0.0.1:0"])
        .unwrap()
        .set("global.file_log_level", 2_i64)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(config.server.backlog, 64);
    assert_eq!(config.client.bind.as_deref(), Some("127.0.0.1:0"));
    assert_eq!(config.global.file_log_level, LogLevel::WARN);
}

#[test]
fn test_set_pair_without_equals() {
    let Err(err) = ConfigLoader::new().set_pairs(&["server.backlog"]) else {
        panic!("expected an error");
    };
    assert!(err.downcast_ref::<ConfigError>().is_some());
}

#[test]
fn test_files_layer_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.toml");
    let second = dir.path().join("second.toml");
    let missing = dir.path().join("missing.toml");
    std::fs::File::create(&first)
        .unwrap()
        .write_all(b"[server]\nbacklog = 8\nlisten = \"127.0.0.1:9000\"\n")
        .unwrap();
    std::fs::File::create(&second)
        .unwrap()
        .write_all(b"[server]\nbacklog = 32\n")
        .unwrap();

    let loader = ConfigLoader::new()
        .add_toml_file_optional(&missing)
        .add_toml_file(&first)
        .add_toml_file(&second);
    let listed = loader.format_loaded_files();
    assert_eq!(listed.len(), 2);
    assert!(listed[0].starts_with("1. [file] "));

    let config = loader.build().unwrap();
    assert_eq!(config.server.backlog, 32);
    assert_eq!(config.server.listen, "127.0.0.1:9000");
}

#[test]
fn test_required_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Config::from_file(dir.path().join("nope.toml")).is_err());
}

#[test]
fn test_format_options() {
    let config = Config::parse(SAMPLE).unwrap();
    let options = config.format_options();
    let keys: Vec<_> = options
        .iter()
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted);
    assert!(options.contains(&"message.items             = uint:2 len:1 varstr:1".to_string()));
    assert!(
        options.contains(&"message.values            = \"7\" \"auto\" \"hello\"".to_string())
    );
    assert!(options.contains(&"server.listen             = 0.0.0.0:7000".to_string()));
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let err = Config::parse("[server\nbacklog = 1\n").unwrap_err();
    let err = err.downcast::<ConfigError>().unwrap();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}
