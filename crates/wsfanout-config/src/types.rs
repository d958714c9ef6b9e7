// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `wsfanout.toml`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WsFanoutConfig {
    pub system: SystemConfig,
    pub connection: ConnectionConfig,
    pub transport: TransportSettings,
}

/// System-level configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    pub log_level: String,
    /// "text" or "json"
    pub log_format: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

/// Which end of the WebSocket this process is.
///
/// Clients mask every outbound frame and expect unmasked inbound frames;
/// servers do the opposite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Client,
    Server,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Client => write!(f, "client"),
            Role::Server => write!(f, "server"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "client" => Ok(Role::Client),
            "server" => Ok(Role::Server),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// What happens when a payload routed to text observers is not valid UTF-8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeErrorPolicy {
    /// Text observers skip the message; data observers already saw it.
    #[default]
    SkipText,
    /// Close the connection with status 1007 (invalid payload data).
    FailConnection,
    /// Decode with U+FFFD replacement characters.
    Lossy,
}

impl FromStr for DecodeErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip_text" | "skip" => Ok(DecodeErrorPolicy::SkipText),
            "fail_connection" | "fail" => Ok(DecodeErrorPolicy::FailConnection),
            "lossy" => Ok(DecodeErrorPolicy::Lossy),
            other => Err(format!("unknown decode error policy '{}'", other)),
        }
    }
}

/// Text-level dispatch behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TextDispatchConfig {
    /// Offer binary payloads to text observers (decoded as UTF-8)
    pub decode_binary: bool,
    pub on_decode_error: DecodeErrorPolicy,
}

impl Default for TextDispatchConfig {
    fn default() -> Self {
        Self {
            decode_binary: true,
            on_decode_error: DecodeErrorPolicy::SkipText,
        }
    }
}

/// Connection engine configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub role: Role,
    /// Largest reassembled message accepted, in bytes
    pub max_message_size: usize,
    /// Answer inbound pings with a pong carrying the same payload
    pub auto_pong: bool,
    /// Status code written by `close()`
    pub close_status: u16,
    pub text: TextDispatchConfig,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            role: Role::Client,
            max_message_size: 16 * 1024 * 1024, // 16 MiB
            auto_pong: true,
            close_status: 1000,
            text: TextDispatchConfig::default(),
        }
    }
}

impl ConnectionConfig {
    /// Create a config for the given role with defaults elsewhere
    pub fn new(role: Role) -> Self {
        Self {
            role,
            ..Default::default()
        }
    }

    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    pub fn with_auto_pong(mut self, enabled: bool) -> Self {
        self.auto_pong = enabled;
        self
    }

    pub fn with_close_status(mut self, code: u16) -> Self {
        self.close_status = code;
        self
    }

    pub fn with_decode_binary(mut self, enabled: bool) -> Self {
        self.text.decode_binary = enabled;
        self
    }

    pub fn with_decode_error_policy(mut self, policy: DecodeErrorPolicy) -> Self {
        self.text.on_decode_error = policy;
        self
    }
}

/// Byte transport configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Address to connect to (client) or bind (server)
    pub address: String,
    /// Size of each read issued against the socket
    pub read_buffer_size: usize,
    /// Disable Nagle's algorithm
    pub nodelay: bool,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:9000".to_string(),
            read_buffer_size: 8192,
            nodelay: true,
        }
    }
}

impl TransportSettings {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }
}
