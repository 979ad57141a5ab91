// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Console and file logging.
//!
//! ```text
//!                 init_logging(&LogConfig)
//!                          |
//!              +-----------+-----------+
//!              v                       v
//!   stderr, ANSI, no target   log_file (optional)
//!   console_level             file_level, plain text
//!                             conn spans logged on close
//!                                      |
//!                                      v
//!                          LogGuard flushes on drop
//!
//!  level  0    1      2     3     4      5      6
//!         off  error  warn  info  debug  trace  trace(all crates)
//! ```
//!
//! Levels 3-5 raise verbosity for this crate only; dependencies stay at
//! `warn`. stdout is left to command output and socket traffic.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use bon::Builder;
use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::{ConfigError, Result};

/// Verbosity from 0 (silent) to 6 (everything, dependencies included).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct LogLevel(u8);

impl LogLevel {
    pub const SILENT: Self = Self(0);
    pub const ERROR: Self = Self(1);
    pub const WARN: Self = Self(2);
    pub const INFO: Self = Self(3);
    pub const DEBUG: Self = Self(4);
    pub const TRACE: Self = Self(5);
    pub const DUMP: Self = Self(6);

    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `level` is above 6.
    pub fn new(level: u8) -> std::result::Result<Self, ConfigError> {
        if level <= Self::DUMP.0 {
            Ok(Self(level))
        } else {
            Err(ConfigError::InvalidValue {
                section: "global".to_string(),
                key: "log_level".to_string(),
                message: format!("log level must be 0-6, got {level}"),
            })
        }
    }

    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }

    /// `EnvFilter` directives for this level.
    #[must_use]
    pub const fn directives(self) -> &'static str {
        match self.0 {
            0 => "off",
            1 => "error",
            2 => "warn",
            3 => "warn,socket_toolbox=info",
            4 => "warn,socket_toolbox=debug",
            5 => "warn,socket_toolbox=trace",
            _ => "trace",
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::INFO
    }
}

impl TryFrom<u8> for LogLevel {
    type Error = ConfigError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LogLevel> for u8 {
    fn from(level: LogLevel) -> Self {
        level.0
    }
}

/// Where logs go and how much of them.
#[derive(Debug, Clone, Builder)]
pub struct LogConfig {
    #[builder(setters(name = with_console_level), default)]
    console_level: LogLevel,
    #[builder(setters(name = with_file_level), default = LogLevel::TRACE)]
    file_level: LogLevel,
    #[builder(setters(name = with_log_file))]
    log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl LogConfig {
    #[must_use]
    pub const fn console_level(&self) -> LogLevel {
        self.console_level
    }

    #[must_use]
    pub const fn file_level(&self) -> LogLevel {
        self.file_level
    }

    #[must_use]
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

/// Keeps the file writer alive. Dropping it flushes pending lines.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be created or a subscriber is
/// already installed.
///
/// # Example
///
/// ```no_run
/// use socket_toolbox::logging::{LogConfig, LogLevel, init_logging};
///
/// let config = LogConfig::builder()
///     .with_console_level(LogLevel::WARN)
///     .with_log_file("traffic.log".into())
///     .build();
/// let _guard = init_logging(&config)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logging(config: &LogConfig) -> Result<LogGuard> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(true)
        .with_filter(EnvFilter::new(config.console_level.directives()));

    let (file_layer, file_guard) = match config.log_file() {
        Some(path) => {
            let (layer, guard) = open_file_layer(path, config.file_level)?;
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn open_file_layer(path: &Path, level: LogLevel) -> Result<(BoxedLayer, WorkerGuard)> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(EnvFilter::new(level.directives()))
        .boxed();
    Ok((layer, guard))
}

#[cfg(test)]
mod tests;
