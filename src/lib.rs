// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |     check / encode / decode / serve / connect
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          config           |
//!              |   TOML, layered settings  |
//!              '-------------+-------------'
//!                            |
//!                 +----------+----------+
//!                 v                     v
//!               socket                 msg
//!        Server / Client tasks   format, codec, input
//!                 |                     ^
//!                 +---------------------+
//!
//!   +-----------------------------------------+
//!   |  foundation   error, logging            |
//!   +-----------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod logging;
pub mod msg;
pub mod socket;
