// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration loading from multiple sources.
//!
//! # Loader Pipeline
//!
//! ```text
//! ConfigLoader::new()
//!   .add_toml_file_optional(cwd)
//!   .add_toml_file(--config)
//!   .add_toml_str()
//!   .with_env_prefix()
//!   .set() / .set_pairs(--set)
//!        |
//!        v
//!    build() --> Config --> validate()
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Environment, File, FileFormat};

use super::Config;
use crate::error::{ConfigError, Result};

/// Builder for loading configuration from multiple sources.
pub struct ConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env_prefix: Option<String>,
    files: Vec<(String, PathBuf)>,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: config::Config::builder(),
            env_prefix: None,
            files: Vec::new(),
        }
    }

    /// Adds a TOML configuration file to the loader.
    ///
    /// The file will be read when `build()` is called. If the file doesn't exist
    /// or contains invalid TOML, `build()` will return an error.
    #[must_use]
    pub fn add_toml_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let p = path.as_ref();
        self.builder = self
            .builder
            .add_source(File::from(p).format(FileFormat::Toml).required(true));
        self.files.push(("file".to_string(), p.to_path_buf()));
        self
    }

    #[must_use]
    pub fn add_toml_file_optional<P: AsRef<Path>>(mut self, path: P) -> Self {
        let p = path.as_ref();
        self.builder = self
            .builder
            .add_source(File::from(p).format(FileFormat::Toml).required(false));
        if p.exists() {
            self.files.push(("optional".to_string(), p.to_path_buf()));
        }
        self
    }

    #[must_use]
    pub fn add_toml_str(mut self, content: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(content, FileFormat::Toml));
        self.files
            .push(("string".to_string(), PathBuf::from("<string>")));
        self
    }

    /// Reads `<PREFIX>_<SECTION>__<KEY>` variables at build time.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Sets a configuration override.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or if the value cannot be converted
    /// to a configuration value.
    pub fn set<T: Into<config::Value>>(mut self, key: &str, value: T) -> Result<Self> {
        self.builder = self
            .builder
            .set_override(key, value)
            .with_context(|| format!("invalid override for '{key}'"))?;
        Ok(self)
    }

    /// Applies `key=value` overrides in order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an entry without `=`, or an
    /// error if the key is invalid.
    pub fn set_pairs<S: AsRef<str>>(self, pairs: &[S]) -> Result<Self> {
        let mut loader = self;
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair.split_once('=').ok_or_else(|| ConfigError::InvalidValue {
                section: "set".to_string(),
                key: pair.to_string(),
                message: "expected KEY=VALUE".to_string(),
            })?;
            loader = loader.set(key.trim(), value.trim())?;
        }
        Ok(loader)
    }

    /// Builds the configuration from all added sources.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required configuration files are missing.
    /// - Configuration files have invalid TOML syntax.
    /// - Environment variables cannot be parsed.
    /// - The merged configuration cannot be deserialized into the `Config` struct.
    /// - A value is out of range.
    pub fn build(self) -> Result<Config> {
        let builder = match &self.env_prefix {
            Some(prefix) => self.builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            ),
            None => self.builder,
        };
        let cfg = builder.build().map_err(|e| match e {
            config::ConfigError::FileParse { uri, cause } => ConfigError::ParseError {
                path: uri.unwrap_or_else(|| "<string>".to_string()),
                message: cause.to_string(),
            }
            .into(),
            other => anyhow::Error::new(other).context("failed to load configuration"),
        })?;
        let config: Config = cfg
            .try_deserialize()
            .context("failed to read configuration")?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn loaded_files(&self) -> Vec<(String, PathBuf)> {
        self.files.clone()
    }

    #[must_use]
    pub fn format_loaded_files(&self) -> Vec<String> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, (source, path))| format!("{}. [{}] {}", i + 1, source, path.display()))
            .collect()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
