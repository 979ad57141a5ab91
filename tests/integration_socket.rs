// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the TCP server and client on loopback.

use std::time::Duration;

use socket_toolbox::cmd::codec::message_from_values;
use socket_toolbox::config::Config;
use socket_toolbox::error::{SocketError, ToolboxError};
use socket_toolbox::msg::MessageFormat;
use socket_toolbox::socket::{Client, ClientOptions, Server, SocketEvent};

const CONFIG: &str = r#"
[message]
items = [
    { kind = "uint", len = 1 },
    { kind = "len", len = 2 },
    { kind = "var_bytes", len_idx = 1 },
]

[server]
listen = "127.0.0.1:0"
backlog = 8
event_capacity = 64

[client]
connect_timeout_ms = 1000
"#;

fn setup() -> (Config, MessageFormat) {
    let config = Config::parse(CONFIG).unwrap();
    let fmt = config.message_format().unwrap();
    (config, fmt)
}

async fn next_matching(
    rx: &flume::Receiver<SocketEvent>,
    pred: impl Fn(&SocketEvent) -> bool,
) -> SocketEvent {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv_async())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed");
        if pred(&event) {
            return event;
        }
    }
}

// =============================================================================
// Echo Round Trip
// =============================================================================

#[tokio::test]
async fn socket_server_echoes_client_messages() {
    let (config, fmt) = setup();
    let mut server = Server::new(fmt.clone(), config.server.options());
    let addr = server.run(Some(&config.server.listen)).unwrap();
    let server_events = server.events();

    let mut client = Client::new(fmt.clone(), config.client.options());
    client.run(None, &addr.to_string()).await.unwrap();
    let client_events = client.events();

    let request = message_from_values(&fmt, &["1", "DEADBEEF"]).unwrap();
    client.send_msg(request.clone()).unwrap();

    let SocketEvent::Received { peer, msg } =
        next_matching(&server_events, |e| matches!(e, SocketEvent::Received { .. })).await
    else {
        unreachable!()
    };
    assert_eq!(msg, request);
    server.send_msg(&peer.to_string(), msg).unwrap();

    let reply =
        next_matching(&client_events, |e| matches!(e, SocketEvent::Received { .. })).await;
    assert_eq!(
        reply,
        SocketEvent::Received {
            peer: addr,
            msg: request
        }
    );

    client.stop().await.unwrap();
    server.stop().await.unwrap();
}

#[tokio::test]
async fn socket_large_variable_item() {
    let (config, fmt) = setup();
    let mut server = Server::new(fmt.clone(), config.server.options());
    let addr = server.run(None).unwrap();
    let server_events = server.events();

    let mut client = Client::new(fmt.clone(), config.client.options());
    client.run(Some("127.0.0.1:0"), &addr.to_string()).await.unwrap();

    let payload = "AB".repeat(60_000);
    let request = message_from_values(&fmt, &["9", payload.as_str()]).unwrap();
    client.send_msg(request.clone()).unwrap();

    let event =
        next_matching(&server_events, |e| matches!(e, SocketEvent::Received { .. })).await;
    assert!(matches!(event, SocketEvent::Received { msg, .. } if msg == request));

    client.stop().await.unwrap();
    server.stop().await.unwrap();
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn socket_bind_conflict_is_reported() {
    let (config, fmt) = setup();
    let mut first = Server::new(fmt.clone(), config.server.options());
    let addr = first.run(None).unwrap();

    let mut client = Client::new(fmt.clone(), ClientOptions::default());
    let local = client.run(None, &addr.to_string()).await.unwrap();

    // The client's local port is taken by an established connection.
    let mut second = Client::new(fmt, ClientOptions::default());
    let err = second
        .run(Some(&local.to_string()), &addr.to_string())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ToolboxError::Socket(e) if matches!(*e, SocketError::Bind { .. } | SocketError::Connect { .. })
    ));

    client.stop().await.unwrap();
    first.stop().await.unwrap();
}

#[tokio::test]
async fn socket_client_rejects_bad_address() {
    let (config, fmt) = setup();
    let mut client = Client::new(fmt, config.client.options());
    let err = client.run(None, "example.invalid").await.unwrap_err();
    assert!(matches!(
        err,
        ToolboxError::Socket(e) if matches!(*e, SocketError::AddrParse { .. })
    ));
}
