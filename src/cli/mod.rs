// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for socket-toolbox using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! socket_toolbox [global options] <command>
//! version
//! options
//! configs
//! check
//! encode [values...]
//! decode <hex> [--json]
//! serve [--listen addr]
//! connect [addr] [--bind addr] [--oneshot] [values...]
//! ```

pub mod args;
pub mod global;

#[cfg(test)]
mod tests;

use crate::cli::args::{ConnectArgs, DecodeArgs, EncodeArgs, ServeArgs};
use crate::cli::global::GlobalOptions;
use clap::{Parser, Subcommand};

/// Binary Message Socket Toolbox
///
/// Describes binary messages as a list of typed items and exchanges them
/// over TCP.
#[derive(Debug, Parser)]
#[command(
    name = "socket_toolbox",
    author,
    version,
    about = "Binary Message Socket Toolbox",
    long_about = "socket-toolbox Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Describes binary messages as a list of typed items (len, uint,\n\
                  int, str, varstr, bytes, varbytes) and encodes, decodes, serves\n\
                  or sends them over TCP. See `socket_toolbox <command> --help`\n\
                  for more information about a command.",
    after_help = "CONFIG FILES:\n\n\
                  socket-toolbox.toml in the current directory is loaded when it\n\
                  exists. Additional files can be given with --config and are\n\
                  loaded after it, in order. SOCKET_TOOLBOX_<SECTION>__<KEY>\n\
                  environment variables and --set override files, and dedicated\n\
                  flags such as --item or --log-level override everything else."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    Version,

    /// Lists all options and their values.
    Options,

    /// Lists the configuration files that were loaded.
    Configs,

    /// Validates the message format and prints its layout.
    Check,

    /// Encodes values and prints the message as hex.
    Encode(EncodeArgs),

    /// Decodes a hex message and prints its values.
    Decode(DecodeArgs),

    /// Runs a server that prints traffic and reads commands from stdin.
    Serve(ServeArgs),

    /// Connects to a server, sends messages and prints replies.
    Connect(ConnectArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
