// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `serve` command.

use anyhow::Context;

use super::codec::message_from_values;
use super::console::{SERVE_HELP, ServeLine, format_event, parse_serve_line, shutdown_signal, stdin_lines};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::error::Result;
use crate::socket::Server;

/// Runs a server until `quit`, Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the format is invalid or the server cannot start.
pub async fn run_serve_command(args: &ServeArgs, config: &Config) -> Result<()> {
    let fmt = config.message_format()?;
    let listen = args.listen.as_deref().unwrap_or(&config.server.listen);

    let mut server = Server::new(fmt, config.server.options());
    let addr = server
        .run(Some(listen))
        .with_context(|| format!("cannot serve on {listen}"))?;
    println!("listening on {addr}, type `help` for commands");

    let events = server.events();
    let lines = stdin_lines();
    let mut stdin_open = true;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            event = events.recv_async() => match event {
                Ok(event) => println!("{}", format_event(&event)),
                Err(_) => break,
            },
            line = lines.recv_async(), if stdin_open => match line {
                Ok(line) => match handle_line(&server, &line) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => eprintln!("Error: {e:#}"),
                },
                Err(_) => {
                    tracing::debug!("stdin closed, serving until interrupted");
                    stdin_open = false;
                }
            },
        }
    }

    server.stop().await?;
    Ok(())
}

/// Executes one console line. Returns `false` on `quit`.
fn handle_line(server: &Server, line: &str) -> Result<bool> {
    match parse_serve_line(line)? {
        ServeLine::Empty => {}
        ServeLine::List => {
            let clients = server.clients();
            if clients.is_empty() {
                println!("no clients");
            }
            for client in clients {
                println!("{client}");
            }
        }
        ServeLine::Send { peer, values } => {
            let msg = message_from_values(server.format(), values.as_slice())?;
            server.send_msg(&peer, msg)?;
        }
        ServeLine::Broadcast { values } => {
            let msg = message_from_values(server.format(), values.as_slice())?;
            let reached = server.broadcast(&msg)?;
            println!("queued for {reached} client(s)");
        }
        ServeLine::Help => println!("{SERVE_HELP}"),
        ServeLine::Quit => return Ok(false),
    }
    Ok(true)
}
