// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;

use super::{LogConfig, LogLevel};

#[test]
fn test_log_level_bounds() {
    assert_eq!(LogLevel::new(6).unwrap(), LogLevel::DUMP);
    assert!(LogLevel::new(7).is_err());
    assert_eq!(LogLevel::try_from(2).unwrap(), LogLevel::WARN);
    assert_eq!(u8::from(LogLevel::TRACE), 5);
}

#[test]
fn test_log_level_directives() {
    let directives: Vec<_> = (0..=6)
        .map(|level| LogLevel::new(level).unwrap().directives())
        .collect();
    insta::assert_snapshot!(
        directives.join(" ; "),
        @"off ; error ; warn ; warn,socket_toolbox=info ; warn,socket_toolbox=debug ; warn,socket_toolbox=trace ; trace"
    );
}

#[test]
fn test_log_level_serde_uses_number() {
    let level: LogLevel = serde_json::from_str("4").unwrap();
    assert_eq!(level, LogLevel::DEBUG);
    assert_eq!(serde_json::to_string(&level).unwrap(), "4");
    let err = serde_json::from_str::<LogLevel>("12").unwrap_err();
    assert!(err.to_string().contains("log level must be 0-6, got 12"));
}

#[test]
fn test_log_config_defaults() {
    let config = LogConfig::default();
    assert_eq!(config.console_level(), LogLevel::INFO);
    assert_eq!(config.file_level(), LogLevel::TRACE);
    assert!(config.log_file().is_none());
}

#[test]
fn test_log_config_builder() {
    let config = LogConfig::builder()
        .with_console_level(LogLevel::SILENT)
        .maybe_with_log_file(Some("logs/traffic.log".into()))
        .build();
    assert_eq!(config.console_level(), LogLevel::SILENT);
    assert_eq!(config.log_file(), Some(Path::new("logs/traffic.log")));
}
