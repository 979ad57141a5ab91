// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Offline commands: `check`, `encode`, `decode`.

use anyhow::Context;

use crate::cli::args::{DecodeArgs, EncodeArgs};
use crate::config::Config;
use crate::error::{Result, ToolboxResult};
use crate::msg::input::{parse_hex, parse_values};
use crate::msg::{Message, MessageFormat};

/// Builds a message from textual values, filling referenced lengths.
///
/// # Errors
///
/// Returns an error if the values do not parse or do not fit the format.
pub fn message_from_values<S: AsRef<str>>(
    fmt: &MessageFormat,
    values: &[S],
) -> ToolboxResult<Message> {
    let msg = Message::new(parse_values(fmt, values)?);
    // Encoding checks widths and ranges up front.
    fmt.encode(&msg)?;
    Ok(msg)
}

/// Layout lines for `check`.
///
/// # Errors
///
/// Returns an error if the configured format is invalid.
pub fn check_lines(config: &Config) -> ToolboxResult<Vec<String>> {
    let fmt = config.message_format()?;
    let mut lines = vec![format!("format: {fmt}")];
    lines.extend(fmt.layout());
    Ok(lines)
}

/// Upper-case hex encoding for `encode`.
///
/// # Errors
///
/// Returns an error if the format is invalid or the values do not fit it.
pub fn encode_hex(config: &Config, args: &EncodeArgs) -> Result<String> {
    let fmt = config.message_format()?;
    let values = if args.values.is_empty() {
        &config.message.values
    } else {
        &args.values
    };
    let msg = Message::new(parse_values(&fmt, values.as_slice())?);
    let bytes = fmt
        .encode(&msg)
        .with_context(|| format!("cannot encode {msg}"))?;
    tracing::debug!(%msg, len = bytes.len(), "encoded");
    Ok(hex::encode_upper(bytes))
}

/// Decoded message text (or JSON) for `decode`.
///
/// # Errors
///
/// Returns an error if the format is invalid or the bytes do not decode.
pub fn decode_text(config: &Config, args: &DecodeArgs) -> Result<String> {
    let fmt = config.message_format()?;
    let bytes = parse_hex(&args.hex)?;
    let msg = fmt.decode(&bytes)?;
    if args.json {
        Ok(serde_json::to_string(&msg)?)
    } else {
        Ok(msg.to_string())
    }
}

/// Run the `check` command.
///
/// # Errors
///
/// Returns an error if the configured format is invalid.
pub fn run_check_command(config: &Config) -> Result<()> {
    for line in check_lines(config)? {
        println!("{line}");
    }
    Ok(())
}

/// Run the `encode` command.
///
/// # Errors
///
/// See [`encode_hex`].
pub fn run_encode_command(args: &EncodeArgs, config: &Config) -> Result<()> {
    println!("{}", encode_hex(config, args)?);
    Ok(())
}

/// Run the `decode` command.
///
/// # Errors
///
/// See [`decode_text`].
pub fn run_decode_command(args: &DecodeArgs, config: &Config) -> Result<()> {
    println!("{}", decode_text(config, args)?);
    Ok(())
}
