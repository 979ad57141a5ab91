// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Global CLI options available for all commands.
//!
//! # Option Precedence
//!
//! ```text
//! --config FILE     ← Additional config files (can repeat)
//! --log-level N     ← Console verbosity (0-6)
//! --file-log-level  ← File verbosity (defaults to --log-level)
//! --log-file FILE   ← global.log_file override
//! --item KIND:N     ← Replaces [message].items (can repeat)
//! --set KEY=VAL     ← Direct config override
//!
//! Precedence: CLI flags > --set > env > --config > socket-toolbox.toml > defaults
//! ```

use clap::Args;
use std::path::PathBuf;

use crate::msg::ItemFormat;

/// Global options available for all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOptions {
    /// Path to additional TOML configuration file(s).
    /// Can be specified multiple times.
    #[arg(short = 'c', long = "config", value_name = "FILE", action = clap::ArgAction::Append)]
    pub configs: Vec<PathBuf>,

    /// Console log level (0=silent, 1=errors, 2=warnings, 3=info, 4=debug, 5=trace, 6=dump).
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=6)
    )]
    pub log_level: Option<u8>,

    /// File log level, defaults to --log-level for the log file.
    #[arg(long = "file-log-level", value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=6)
    )]
    pub file_log_level: Option<u8>,

    /// Path to log file.
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Message item such as 'uint:2', 'len:1' or 'varstr:1'.
    /// Repeat in order to replace the configured message format.
    #[arg(short = 'f', long = "item", value_name = "KIND:N", action = clap::ArgAction::Append)]
    pub items: Vec<ItemFormat>,

    /// Sets an option, such as 'server.backlog=64'.
    /// Can be specified multiple times.
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE", action = clap::ArgAction::Append)]
    pub options: Vec<String>,
}

impl GlobalOptions {
    /// Converts command-line options to `key=value` configuration overrides.
    #[must_use]
    pub fn to_config_overrides(&self) -> Vec<String> {
        let mut overrides = self.options.clone();

        if let Some(level) = self.log_level {
            overrides.push(format!("global.output_log_level={level}"));
        }

        // file_log_level falls back to log_level if not specified
        if let Some(level) = self.file_log_level.or(self.log_level) {
            overrides.push(format!("global.file_log_level={level}"));
        }

        if let Some(ref path) = self.log_file {
            overrides.push(format!("global.log_file={}", path.display()));
        }

        overrides
    }
}
