// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Interactive console shared by `serve` and `connect`.
//!
//! ```text
//! stdin thread --flume--> lines --> tokenize --> ServeLine / ConnectLine
//! SocketEvent ----------> format_event --> stdout
//! SIGINT / SIGTERM -----> shutdown_signal
//! ```

use std::io::BufRead;

use crate::error::InputError;
use crate::msg::input::tokenize;
use crate::socket::SocketEvent;

pub const SERVE_HELP: &str = "\
commands:
  list                       connected clients
  send <peer> <values...>    send a message to one client
  broadcast <values...>      send a message to every client
  help                       this text
  quit                       stop the server";

pub const CONNECT_HELP: &str = "\
commands:
  send <values...>           send a message to the server
  help                       this text
  quit                       close the connection";

/// A parsed `serve` console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeLine {
    Empty,
    List,
    Send { peer: String, values: Vec<String> },
    Broadcast { values: Vec<String> },
    Help,
    Quit,
}

/// A parsed `connect` console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectLine {
    Empty,
    Send { values: Vec<String> },
    Help,
    Quit,
}

fn unknown(line: &str) -> InputError {
    InputError::UnknownCommand {
        line: line.trim().to_string(),
    }
}

/// Parses a line typed into a running server.
///
/// # Errors
///
/// Returns an [`InputError`] for unknown commands, missing peers, or open
/// quotes.
pub fn parse_serve_line(line: &str) -> Result<ServeLine, InputError> {
    let mut tokens = tokenize(line)?.into_iter();
    let Some(command) = tokens.next() else {
        return Ok(ServeLine::Empty);
    };
    let parsed = match command.as_str() {
        "list" | "ls" => ServeLine::List,
        "send" => {
            let peer = tokens.next().ok_or_else(|| unknown(line))?;
            ServeLine::Send {
                peer,
                values: tokens.collect(),
            }
        }
        "broadcast" | "bc" => ServeLine::Broadcast {
            values: tokens.collect(),
        },
        "help" | "?" => ServeLine::Help,
        "quit" | "exit" => ServeLine::Quit,
        _ => return Err(unknown(line)),
    };
    Ok(parsed)
}

/// Parses a line typed into a running client.
///
/// # Errors
///
/// Returns an [`InputError`] for unknown commands or open quotes.
pub fn parse_connect_line(line: &str) -> Result<ConnectLine, InputError> {
    let mut tokens = tokenize(line)?.into_iter();
    let Some(command) = tokens.next() else {
        return Ok(ConnectLine::Empty);
    };
    let parsed = match command.as_str() {
        "send" => ConnectLine::Send {
            values: tokens.collect(),
        },
        "help" | "?" => ConnectLine::Help,
        "quit" | "exit" => ConnectLine::Quit,
        _ => return Err(unknown(line)),
    };
    Ok(parsed)
}

/// One line of console output per event.
#[must_use]
pub fn format_event(event: &SocketEvent) -> String {
    match event {
        SocketEvent::Connected { peer } => format!("++ {peer} connected"),
        SocketEvent::Received { peer, msg } => format!("<- {peer}: {msg}"),
        SocketEvent::Sent { peer, msg } => format!("-> {peer}: {msg}"),
        SocketEvent::ReadFailed { peer, error } => format!("!! {peer}: {error}"),
        SocketEvent::Disconnected { peer } => format!("-- {peer} disconnected"),
    }
}

/// Reads stdin on a detached thread so a pending read never blocks shutdown.
///
/// The receiver disconnects at end of input.
#[must_use]
pub fn stdin_lines() -> flume::Receiver<String> {
    let (tx, rx) = flume::unbounded();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, shutting down..."),
        () = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
