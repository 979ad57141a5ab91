// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration section types.
//!
//! ```text
//! Config: GlobalConfig, MessageConfig, ServerConfig, ClientConfig
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::logging::LogLevel;
use crate::msg::ItemFormat;
use crate::socket::{ClientOptions, ServerOptions};

const DEFAULT_LISTEN: &str = "127.0.0.1:0";
const DEFAULT_BACKLOG: u32 = 1024;
const DEFAULT_EVENT_CAPACITY: usize = 1024;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file. No file logging when unset.
    pub log_file: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: None,
        }
    }
}

/// The message format and default values for `encode` and `connect`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessageConfig {
    pub items: Vec<ItemFormat>,
    pub values: Vec<String>,
}

/// Server options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub listen: String,
    pub backlog: u32,
    pub event_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            backlog: DEFAULT_BACKLOG,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn options(&self) -> ServerOptions {
        ServerOptions::builder()
            .with_backlog(self.backlog)
            .with_event_capacity(self.event_capacity)
            .build()
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        positive("server", "backlog", u64::from(self.backlog))?;
        positive("server", "event_capacity", self.event_capacity as u64)
    }
}

/// Client options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Local address to bind before connecting.
    pub bind: Option<String>,
    /// Server address used when `connect` gets no address argument.
    pub connect: Option<String>,
    pub connect_timeout_ms: u64,
    pub event_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            bind: None,
            connect: None,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn options(&self) -> ClientOptions {
        ClientOptions::builder()
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .with_event_capacity(self.event_capacity)
            .build()
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        positive("client", "connect_timeout_ms", self.connect_timeout_ms)?;
        positive("client", "event_capacity", self.event_capacity as u64)
    }
}

fn positive(section: &str, key: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}
