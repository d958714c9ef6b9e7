// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output is always installed. With the `file-logging` feature and a
//! configured `log_dir`, a JSON file layer is added in a timestamped run
//! folder:
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       └── wsfanout.log
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps background log writers alive; flushes on drop
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder holding the log files, when file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Build the filter for one layer
///
/// `RUST_LOG` wins when set; otherwise the base level plus debug flags.
fn build_filter(debug_flags: &CrateDebugFlags, level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(debug_flags.to_filter_string(level)))
}

fn console_layer(config: &LoggingConfig, debug_flags: &CrateDebugFlags) -> BoxedLayer {
    let filter = build_filter(debug_flags, &config.level);
    match config.format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(filter)
            .boxed(),
    }
}

/// Initialize the global subscriber
///
/// # Errors
///
/// Fails if a global subscriber is already installed or the log directory
/// cannot be created.
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<LoggingGuard> {
    #[allow(unused_mut)]
    let mut layers: Vec<BoxedLayer> = vec![console_layer(config, debug_flags)];

    #[cfg(feature = "file-logging")]
    let mut file_guards = Vec::new();
    #[allow(unused_mut)]
    let mut log_dir = None;

    if let Some(base_log_dir) = &config.log_dir {
        #[cfg(feature = "file-logging")]
        {
            let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
            let run_folder = base_log_dir.join(format!("run_{}", timestamp));
            std::fs::create_dir_all(&run_folder).with_context(|| {
                format!("Failed to create log directory: {}", run_folder.display())
            })?;

            let appender = tracing_appender::rolling::never(&run_folder, "wsfanout.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            file_guards.push(guard);

            layers.push(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .json()
                    .with_filter(build_filter(debug_flags, &config.level))
                    .boxed(),
            );
            log_dir = Some(run_folder);
        }

        #[cfg(not(feature = "file-logging"))]
        {
            eprintln!(
                "Warning: log_dir {} ignored, built without the file-logging feature",
                base_log_dir.display()
            );
        }
    }

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guards: file_guards,
        log_dir,
    })
}

/// Initialize console logging at `info` with default settings
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_logging(debug_flags, &LoggingConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    // One global subscriber per process, so both checks share a test.
    #[test]
    fn test_log_dir_handling_and_second_init_fails() {
        let flags = CrateDebugFlags::default();
        let base = std::env::temp_dir().join("wsfanout_init_test");
        let guard = init_logging(&flags, &LoggingConfig::default().with_log_dir(&base)).unwrap();

        #[cfg(not(feature = "file-logging"))]
        assert!(guard.log_dir().is_none());
        #[cfg(feature = "file-logging")]
        assert!(guard.log_dir().is_some_and(|dir| dir.starts_with(&base)));

        assert!(init_logging_default(&flags).is_err());
    }
}
