// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Frame Dump Tool

Replays a captured WebSocket byte stream through a connection, feeding it in
fixed-size chunks, and prints every message the connection dispatches.

Usage:
  cargo run --bin frame_dump -- --input capture.bin [--chunk-size 7] [--role server] [--json] [--debug all]

Exits with status 1 when the stream ends with a protocol error.
*/

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};

use wsfanout::config::{
    apply_cli_overrides, apply_environment_overrides, find_config_file, load_config,
    validate_config, ConnectionConfig, Role, WsFanoutConfig,
};
use wsfanout::connection::{CodecError, Connection, LifecycleState, Message, MessageKind};
use wsfanout::observability::{
    debug_flags_help, init_logging, parse_debug_flags, LogFormat, LoggingConfig,
};
use wsfanout::transports::{MemoryTransport, TransportStats};

/// Replay captured WebSocket bytes and print the dispatched messages
#[derive(Parser, Debug)]
#[command(name = "frame_dump", version, long_about = None, after_help = debug_flags_help())]
struct Args {
    /// File holding the raw inbound byte stream (after the handshake)
    #[arg(short, long)]
    input: PathBuf,

    /// Number of bytes handed to the connection per read
    #[arg(long, default_value_t = 4096)]
    chunk_size: usize,

    /// Which end received the capture (overrides the config file)
    #[arg(long)]
    role: Option<Role>,

    /// Path to wsfanout.toml (searched for when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print one JSON object per message
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Enable debug logs for a crate (repeatable, or `all`)
    #[arg(long = "debug", value_name = "CRATE")]
    debug: Vec<String>,

    /// Directory for JSON run logs (needs the `file-logging` feature)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct MessageRecord {
    index: usize,
    kind: &'static str,
    len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl MessageRecord {
    fn new(index: usize, message: &Message) -> Self {
        Self {
            index,
            kind: match message.kind() {
                MessageKind::Text => "text",
                MessageKind::Binary => "binary",
            },
            len: message.len(),
            // Binary payloads are shown by length only.
            text: match message.kind() {
                MessageKind::Text => Some(message.to_text_lossy().into_owned()),
                MessageKind::Binary => None,
            },
        }
    }
}

/// Feed `bytes` through a fresh connection in `chunk_size` pieces
///
/// Returns every dispatched message and the protocol violation that ended
/// the stream, if one did.
fn replay(
    config: &ConnectionConfig,
    bytes: &[u8],
    chunk_size: usize,
) -> Result<(Vec<MessageRecord>, Option<CodecError>)> {
    let transport = MemoryTransport::new();
    let conn = Connection::new(transport.clone(), config.clone())?;

    let records = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&records);
    conn.on_each_data(move |message| {
        let mut records = sink.borrow_mut();
        let record = MessageRecord::new(records.len(), message);
        records.push(record);
    });

    transport.deliver_chunked(bytes, chunk_size);
    debug!("Delivered {} bytes", transport.bytes_received());

    let failure = conn.protocol_error();
    if conn.state() == LifecycleState::Open {
        conn.close();
    }
    let records = records.take();
    Ok((records, failure))
}

fn load(args: &Args) -> Result<WsFanoutConfig> {
    let mut overrides = HashMap::new();
    if let Some(role) = args.role {
        overrides.insert("role".to_string(), role.to_string());
    }

    let path = match &args.config {
        Some(path) => Some(path.clone()),
        None => find_config_file().ok(),
    };
    let config = match path {
        Some(path) => load_config(Some(&path), Some(&overrides))
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => {
            let mut config = WsFanoutConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, &overrides);
            config
        }
    };
    validate_config(&config)?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load(&args)?;

    // WSFANOUT_DEBUG first, then --debug
    let mut debug_flags = parse_debug_flags();
    for name in &args.debug {
        debug_flags.enable(name);
    }
    let format = config
        .system
        .log_format
        .parse::<LogFormat>()
        .unwrap_or(LogFormat::Text);
    let mut logging = LoggingConfig::new(config.system.log_level.clone(), format);
    if let Some(dir) = &args.log_dir {
        logging = logging.with_log_dir(dir);
    }
    let guard = init_logging(&debug_flags, &logging)?;
    if let Some(dir) = guard.log_dir() {
        info!("Writing run logs to {}", dir.display());
    }

    let bytes = fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    info!(
        "Replaying {} bytes from {} in {}-byte chunks as {}",
        bytes.len(),
        args.input.display(),
        args.chunk_size,
        config.connection.role
    );

    let (records, failure) = replay(&config.connection, &bytes, args.chunk_size)?;
    for record in &records {
        if args.json {
            match serde_json::to_string(record) {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("Failed to encode message {}: {}", record.index, e),
            }
        } else {
            match &record.text {
                Some(text) => println!("#{} {} {} bytes: {:?}", record.index, record.kind, record.len, text),
                None => println!("#{} {} {} bytes", record.index, record.kind, record.len),
            }
        }
    }

    eprintln!("{} messages", records.len());
    if let Some(error) = failure {
        eprintln!("Stream failed: {} (close status {})", error, error.close_status());
        drop(guard);
        std::process::exit(1);
    }
    Ok(())
}
