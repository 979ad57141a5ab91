// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-command arguments.

use clap::Args;

/// Arguments for the `encode` command.
#[derive(Debug, Clone, Default, Args)]
pub struct EncodeArgs {
    /// One value per item, or per item that is not a referenced length.
    /// Falls back to [message].values when empty.
    #[arg(value_name = "VALUES", allow_hyphen_values = true)]
    pub values: Vec<String>,
}

/// Arguments for the `decode` command.
#[derive(Debug, Clone, Args)]
pub struct DecodeArgs {
    /// Encoded message as hex, optionally prefixed with 0x.
    #[arg(value_name = "HEX")]
    pub hex: String,

    /// Prints the values as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `serve` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ServeArgs {
    /// Address to listen on, overrides server.listen.
    #[arg(long, value_name = "ADDR")]
    pub listen: Option<String>,
}

/// Arguments for the `connect` command.
#[derive(Debug, Clone, Args)]
pub struct ConnectArgs {
    /// Server address, overrides client.connect.
    #[arg(value_name = "ADDR")]
    pub addr: Option<String>,

    /// Local address to bind before connecting, overrides client.bind.
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Sends the values, waits for one reply, then exits.
    #[arg(long)]
    pub oneshot: bool,

    /// How long --oneshot waits for a reply.
    #[arg(long, value_name = "MS", default_value_t = 5000)]
    pub reply_timeout_ms: u64,

    /// Values of a message to send right after connecting.
    #[arg(value_name = "VALUES", allow_hyphen_values = true, trailing_var_arg = true)]
    pub values: Vec<String>,
}
