// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `connect` command.

use std::time::Duration;

use anyhow::{Context, anyhow};

use super::codec::message_from_values;
use super::console::{
    CONNECT_HELP, ConnectLine, format_event, parse_connect_line, shutdown_signal, stdin_lines,
};
use crate::cli::args::ConnectArgs;
use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::msg::Message;
use crate::socket::{Client, SocketEvent};

/// Connects to a server, then either waits for one reply (`--oneshot`) or
/// runs an interactive session.
///
/// # Errors
///
/// Returns an error if no server address is configured, the connection
/// fails, the initial values are invalid, or `--oneshot` gets no reply.
pub async fn run_connect_command(args: &ConnectArgs, config: &Config) -> Result<()> {
    let fmt = config.message_format()?;
    let addr = args
        .addr
        .as_deref()
        .or(config.client.connect.as_deref())
        .ok_or_else(|| ConfigError::MissingKey {
            section: "client".to_string(),
            key: "connect".to_string(),
        })?;
    let bind = args.bind.as_deref().or(config.client.bind.as_deref());

    let initial = if args.values.is_empty() {
        None
    } else {
        Some(message_from_values(&fmt, args.values.as_slice())?)
    };

    let mut client = Client::new(fmt, config.client.options());
    let local = client
        .run(bind, addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;
    tracing::debug!(%local, "connected");

    if let Some(msg) = initial {
        client.send_msg(msg)?;
    }

    let result = if args.oneshot {
        wait_for_reply(&client, Duration::from_millis(args.reply_timeout_ms))
            .await
            .map(|msg| println!("{msg}"))
    } else {
        println!("connected {local} -> {addr}, type `help` for commands");
        interactive(&client).await;
        Ok(())
    };

    client.stop().await?;
    result
}

/// Prints events until a message arrives, the peer leaves, or `timeout`.
async fn wait_for_reply(client: &Client, timeout: Duration) -> Result<Message> {
    tokio::time::timeout(timeout, next_reply(&client.events()))
        .await
        .map_err(|_| anyhow!("no reply within {} ms", timeout.as_millis()))?
}

async fn next_reply(events: &flume::Receiver<SocketEvent>) -> Result<Message> {
    loop {
        let event = events
            .recv_async()
            .await
            .context("event channel closed")?;
        tracing::debug!(event = %format_event(&event), "oneshot");
        match event {
            SocketEvent::Received { msg, .. } => return Ok(msg),
            SocketEvent::Disconnected { peer } => {
                return Err(anyhow!("{peer} closed the connection before replying"));
            }
            SocketEvent::ReadFailed { error, .. } => {
                return Err(anyhow!("invalid reply: {error}"));
            }
            SocketEvent::Connected { .. } | SocketEvent::Sent { .. } => {}
        }
    }
}

async fn interactive(client: &Client) {
    let events = client.events();
    let lines = stdin_lines();
    let mut stdin_open = true;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            event = events.recv_async() => match event {
                Ok(event) => {
                    println!("{}", format_event(&event));
                    if matches!(event, SocketEvent::Disconnected { .. }) {
                        break;
                    }
                }
                Err(_) => break,
            },
            line = lines.recv_async(), if stdin_open => match line {
                Ok(line) => match handle_line(client, &line) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => eprintln!("Error: {e:#}"),
                },
                Err(_) => {
                    tracing::debug!("stdin closed, waiting for the server");
                    stdin_open = false;
                }
            },
        }
    }
}

/// Executes one console line. Returns `false` on `quit`.
fn handle_line(client: &Client, line: &str) -> Result<bool> {
    match parse_connect_line(line)? {
        ConnectLine::Empty => {}
        ConnectLine::Send { values } => {
            let msg = message_from_values(client.format(), values.as_slice())?;
            client.send_msg(msg)?;
        }
        ConnectLine::Help => println!("{CONNECT_HELP}"),
        ConnectLine::Quit => return Ok(false),
    }
    Ok(true)
}
