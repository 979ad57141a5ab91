// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Config-related commands and configuration assembly from CLI options.

use crate::cli::global::GlobalOptions;
use crate::config::loader::ConfigLoader;
use crate::config::{Config, DEFAULT_CONFIG_FILE, ENV_PREFIX};
use crate::error::Result;

/// Display current configuration options.
pub fn run_options_command(config: &Config) {
    for line in config.format_options() {
        println!("{line}");
    }
}

/// Display loaded configuration files.
pub fn run_configs_command(config_files: &[String]) {
    if config_files.is_empty() {
        println!("No configuration files loaded");
    } else {
        for line in config_files {
            println!("{line}");
        }
    }
}

/// Stacks the working-directory file, `--config` files and environment.
#[must_use]
pub fn build_config_loader(global: &GlobalOptions) -> ConfigLoader {
    let mut loader = ConfigLoader::new().add_toml_file_optional(DEFAULT_CONFIG_FILE);
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    loader.with_env_prefix(ENV_PREFIX)
}

/// Loads the full configuration, applying `--set` and dedicated flags last.
///
/// # Errors
///
/// Returns an error if any source fails to load or an override is invalid.
pub fn load_config(global: &GlobalOptions) -> Result<Config> {
    let mut config = build_config_loader(global)
        .set_pairs(&global.to_config_overrides())?
        .build()?;
    if !global.items.is_empty() {
        config.message.items.clone_from(&global.items);
    }
    Ok(config)
}
