// socket-toolbox: Binary Message Socket Toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Command Dispatch
//!   Version | Options | Configs | Check | Encode | Decode | Serve | Connect
//! ```

use std::process::ExitCode;

use socket_toolbox::cli::{self, Command};
use socket_toolbox::cmd::codec::{run_check_command, run_decode_command, run_encode_command};
use socket_toolbox::cmd::config::{
    build_config_loader, load_config, run_configs_command, run_options_command,
};
use socket_toolbox::cmd::connect::run_connect_command;
use socket_toolbox::cmd::serve::run_serve_command;
use socket_toolbox::config::Config;
use socket_toolbox::logging::{LogConfig, init_logging};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            return ExitCode::SUCCESS;
        }
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            return ExitCode::FAILURE;
        }
        Some(_) => {}
    }

    let config = match load_config(&cli.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let log_config = build_log_config(&config);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli, &config).await
}

fn build_log_config(config: &Config) -> LogConfig {
    LogConfig::builder()
        .with_console_level(config.global.output_log_level)
        .with_file_level(config.global.file_log_level)
        .maybe_with_log_file(config.global.log_file.clone())
        .build()
}

async fn dispatch_command(cli: &cli::Cli, config: &Config) -> ExitCode {
    let result = match &cli.command {
        Some(Command::Options) => {
            run_options_command(config);
            Ok(())
        }
        Some(Command::Configs) => {
            let loader = build_config_loader(&cli.global);
            run_configs_command(&loader.format_loaded_files());
            Ok(())
        }
        Some(Command::Check) => run_check_command(config),
        Some(Command::Encode(args)) => run_encode_command(args, config),
        Some(Command::Decode(args)) => run_decode_command(args, config),
        Some(Command::Serve(args)) => run_serve_command(args, config).await,
        Some(Command::Connect(args)) => run_connect_command(args, config).await,
        Some(Command::Version) | None => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}
