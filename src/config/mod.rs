// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for socket-toolbox.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. socket-toolbox.toml (cwd, optional)
//! 3. --config (repeatable)
//! 4. SOCKET_TOOLBOX_* env vars
//! 5. --set key=value
//! 6. dedicated CLI flags (--item, --listen, ...)
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! SOCKET_TOOLBOX_GLOBAL__OUTPUT_LOG_LEVEL=4  → global.output_log_level = 4
//! SOCKET_TOOLBOX_SERVER__LISTEN=0.0.0.0:7000 → server.listen = "0.0.0.0:7000"
//! SOCKET_TOOLBOX_CLIENT__CONNECT_TIMEOUT_MS=500
//! ```
//!
//! # Message Section
//!
//! ```toml
//! [message]
//! items = [
//!     { kind = "uint", len = 2 },
//!     { kind = "len", len = 1 },
//!     { kind = "var_string", len_idx = 1 },
//! ]
//! values = ["7", "auto", "hello"]
//! ```

pub mod loader;
pub mod types;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ConfigError, Result, ToolboxResult};
use crate::msg::MessageFormat;

use loader::ConfigLoader;
use types::{ClientConfig, GlobalConfig, MessageConfig, ServerConfig};

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "socket-toolbox.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "SOCKET_TOOLBOX";

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Message format and default values.
    pub message: MessageConfig,
    /// Server options.
    pub server: ServerConfig,
    /// Client options.
    pub client: ClientConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use socket_toolbox::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("socket-toolbox.toml")
    ///     .with_env_prefix("SOCKET_TOOLBOX")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Check value ranges that the type system does not cover.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for zero capacities or timeouts.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.server.validate()?;
        self.client.validate()
    }

    /// The validated message format from `[message].items`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] when no items are configured, or a
    /// format error when the items do not form a valid message.
    pub fn message_format(&self) -> ToolboxResult<MessageFormat> {
        if self.message.items.is_empty() {
            return Err(ConfigError::MissingKey {
                section: "message".to_string(),
                key: "items".to_string(),
            }
            .into());
        }
        Ok(MessageFormat::new(&self.message.items)?)
    }

    /// Format configuration options for display, sorted by key.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_message_options(&mut options);
        self.format_server_options(&mut options);
        self.format_client_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file".into(),
            self.global
                .log_file
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );
    }

    fn format_message_options(&self, options: &mut BTreeMap<String, String>) {
        let items: Vec<_> = self.message.items.iter().map(ToString::to_string).collect();
        options.insert("message.items".into(), items.join(" "));
        let values: Vec<_> = self
            .message
            .values
            .iter()
            .map(|v| format!("{v:?}"))
            .collect();
        options.insert("message.values".into(), values.join(" "));
    }

    fn format_server_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("server.listen".into(), self.server.listen.clone());
        options.insert("server.backlog".into(), self.server.backlog.to_string());
        options.insert(
            "server.event_capacity".into(),
            self.server.event_capacity.to_string(),
        );
    }

    fn format_client_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "client.bind".into(),
            self.client.bind.clone().unwrap_or_default(),
        );
        options.insert(
            "client.connect".into(),
            self.client.connect.clone().unwrap_or_default(),
        );
        options.insert(
            "client.connect_timeout_ms".into(),
            self.client.connect_timeout_ms.to_string(),
        );
        options.insert(
            "client.event_capacity".into(),
            self.client.event_capacity.to_string(),
        );
    }
}
