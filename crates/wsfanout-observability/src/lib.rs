// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # wsfanout-observability
//!
//! Logging setup shared by wsfanout binaries and tests, with per-crate debug
//! flag support.
//!
//! ## Features
//! - `file-logging`: additional JSON log file in a timestamped run folder

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known wsfanout crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "wsfanout",
    "wsfanout-config",
    "wsfanout-connection",
    "wsfanout-transports",
    "wsfanout-observability",
];
