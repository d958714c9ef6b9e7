// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, WsFanoutConfig, CONFIG_FILE_NAME};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Find the wsfanout configuration file
///
/// Search order:
/// 1. `WSFANOUT_CONFIG_PATH` environment variable
/// 2. Current working directory: `./wsfanout.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("WSFANOUT_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by WSFANOUT_CONFIG_PATH not found: {}",
                path.display()
            )));
        }
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Configuration file '{}' not found in any of these locations:\n{}\n\nSet WSFANOUT_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Validation is a separate step (see [`crate::validate_config`]).
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<WsFanoutConfig> {
    let config_file = if let Some(path) = config_path {
        path.to_path_buf()
    } else {
        find_config_file()?
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: WsFanoutConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Overwrite `target` with the parsed value; unparseable input leaves it alone
fn set_parsed<T: FromStr>(target: &mut T, value: &str) {
    if let Ok(parsed) = value.parse::<T>() {
        *target = parsed;
    }
}

fn set_bool(target: &mut bool, value: &str) {
    if let Some(parsed) = parse_bool(value) {
        *target = parsed;
    }
}

/// Apply a single `key = value` override. Returns `false` for unknown keys.
fn apply_override(config: &mut WsFanoutConfig, key: &str, value: &str) -> bool {
    match key {
        "role" => set_parsed(&mut config.connection.role, value),
        "max_message_size" => set_parsed(&mut config.connection.max_message_size, value),
        "auto_pong" => set_bool(&mut config.connection.auto_pong, value),
        "close_status" => set_parsed(&mut config.connection.close_status, value),
        "decode_binary" => set_bool(&mut config.connection.text.decode_binary, value),
        "on_decode_error" => set_parsed(&mut config.connection.text.on_decode_error, value),
        "address" => config.transport.address = value.to_string(),
        "read_buffer_size" => set_parsed(&mut config.transport.read_buffer_size, value),
        "nodelay" => set_bool(&mut config.transport.nodelay, value),
        "log_level" => config.system.log_level = value.to_string(),
        "log_format" => config.system.log_format = value.to_string(),
        _ => return false,
    }
    true
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `WSFANOUT_ROLE` -> `connection.role`
/// - `WSFANOUT_MAX_MESSAGE_SIZE` -> `connection.max_message_size`
/// - `WSFANOUT_AUTO_PONG` -> `connection.auto_pong`
/// - `WSFANOUT_CLOSE_STATUS` -> `connection.close_status`
/// - `WSFANOUT_DECODE_BINARY` -> `connection.text.decode_binary`
/// - `WSFANOUT_ON_DECODE_ERROR` -> `connection.text.on_decode_error`
/// - `WSFANOUT_ADDRESS` -> `transport.address`
/// - `WSFANOUT_READ_BUFFER_SIZE` -> `transport.read_buffer_size`
/// - `WSFANOUT_NODELAY` -> `transport.nodelay`
/// - `WSFANOUT_LOG_LEVEL` -> `system.log_level`
pub fn apply_environment_overrides(config: &mut WsFanoutConfig) {
    const ENV_KEYS: &[(&str, &str)] = &[
        ("WSFANOUT_ROLE", "role"),
        ("WSFANOUT_MAX_MESSAGE_SIZE", "max_message_size"),
        ("WSFANOUT_AUTO_PONG", "auto_pong"),
        ("WSFANOUT_CLOSE_STATUS", "close_status"),
        ("WSFANOUT_DECODE_BINARY", "decode_binary"),
        ("WSFANOUT_ON_DECODE_ERROR", "on_decode_error"),
        ("WSFANOUT_ADDRESS", "address"),
        ("WSFANOUT_READ_BUFFER_SIZE", "read_buffer_size"),
        ("WSFANOUT_NODELAY", "nodelay"),
        ("WSFANOUT_LOG_LEVEL", "log_level"),
    ];

    for (var, key) in ENV_KEYS {
        if let Ok(value) = env::var(var) {
            apply_override(config, key, &value);
        }
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"role": "server", "auto_pong": "false"}`)
///
/// Unknown keys are ignored.
pub fn apply_cli_overrides(config: &mut WsFanoutConfig, cli_args: &HashMap<String, String>) {
    for (key, value) in cli_args {
        apply_override(config, key, value);
    }
}
