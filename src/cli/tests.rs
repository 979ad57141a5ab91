// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::cli::{Cli, Command};
use crate::msg::ItemFormat;
use clap::{CommandFactory, Parser};

#[test]
fn test_cli_definition() {
    Cli::command().debug_assert();
}

#[test]
fn test_parse_version() {
    let cli = Cli::try_parse_from(["socket_toolbox", "version"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Version)));
}

#[test]
fn test_parse_global_options() {
    let cli = Cli::try_parse_from([
        "socket_toolbox",
        "-l",
        "5",
        "-c",
        "a.toml",
        "--config",
        "b.toml",
        "-f",
        "len:1",
        "--item",
        "varstr:0",
        "-s",
        "server.backlog=8",
        "check",
    ])
    .unwrap();
    assert_eq!(cli.global.log_level, Some(5));
    assert_eq!(cli.global.configs.len(), 2);
    assert_eq!(
        cli.global.items,
        vec![
            ItemFormat::Len { len: 1 },
            ItemFormat::VarString { len_idx: 0 }
        ]
    );
    insta::assert_snapshot!(
        cli.global.to_config_overrides().join(" "),
        @"server.backlog=8 global.output_log_level=5 global.file_log_level=5"
    );
}

#[test]
fn test_parse_rejects_bad_item() {
    assert!(Cli::try_parse_from(["socket_toolbox", "-f", "float:4", "check"]).is_err());
    assert!(Cli::try_parse_from(["socket_toolbox", "-l", "7", "check"]).is_err());
}

#[test]
fn test_parse_encode_negative_values() {
    let cli = Cli::try_parse_from(["socket_toolbox", "encode", "-5", "hi"]).unwrap();
    let Some(Command::Encode(args)) = cli.command else {
        panic!("expected encode");
    };
    assert_eq!(args.values, vec!["-5", "hi"]);
}

#[test]
fn test_parse_decode() {
    let cli = Cli::try_parse_from(["socket_toolbox", "decode", "0x0102", "--json"]).unwrap();
    let Some(Command::Decode(args)) = cli.command else {
        panic!("expected decode");
    };
    assert_eq!(args.hex, "0x0102");
    assert!(args.json);
}

#[test]
fn test_parse_connect() {
    let cli = Cli::try_parse_from([
        "socket_toolbox",
        "connect",
        "--oneshot",
        "--bind",
        "127.0.0.1:0",
        "127.0.0.1:7000",
        "7",
        "auto",
        "hello world",
    ])
    .unwrap();
    let Some(Command::Connect(args)) = cli.command else {
        panic!("expected connect");
    };
    assert_eq!(args.addr.as_deref(), Some("127.0.0.1:7000"));
    assert_eq!(args.bind.as_deref(), Some("127.0.0.1:0"));
    assert!(args.oneshot);
    assert_eq!(args.reply_timeout_ms, 5000);
    assert_eq!(args.values, vec!["7", "auto", "hello world"]);
}

#[test]
fn test_parse_serve() {
    let cli = Cli::try_parse_from(["socket_toolbox", "serve", "--listen", "0.0.0.0:7000"]).unwrap();
    let Some(Command::Serve(args)) = cli.command else {
        panic!("expected serve");
    };
    assert_eq!(args.listen.as_deref(), Some("0.0.0.0:7000"));
}
