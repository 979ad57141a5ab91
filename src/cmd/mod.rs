// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   config (options, configs), codec (check, encode, decode),
//!   serve, connect --> console (stdin, events, signals)
//! ```

pub mod codec;
pub mod config;
pub mod connect;
pub mod console;
pub mod serve;

#[cfg(test)]
mod tests;
