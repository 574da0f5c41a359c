//! File and UDP example
//!
//! Writes JSON lines to a rotating file under `log/` and sends the same
//! bytes to a UDP collector. Settings come from `GOLOGGER_*` environment
//! variables, falling back to `log/debug.log` and port 9999.
//!
//! Listen with: nc -ul 9999
//! Run with: cargo run --example file_and_udp

use log_emitter::prelude::*;
use log_emitter::{error, info, warning};
use std::path::PathBuf;

fn main() -> Result<()> {
    println!("=== Log Emitter - File and UDP Example ===\n");

    let mut config = EmitterConfig::from_env("GOLOGGER")?;
    if config.file_path.is_none() {
        config.file_path = Some(PathBuf::from("log/debug.log"));
    }
    if config.udp_port.is_none() {
        config.udp_port = Some(9999);
    }
    if config.channel.is_none() {
        config.channel = Some("my_logger".to_string());
    }

    let emitter = Emitter::from_config(&config)?;
    println!("Sinks: {:?}", emitter.sink_names());
    println!("Minimum level: {}\n", emitter.min_level());

    println!("1. Plain messages:");
    emitter.info("Application started");
    emitter.debug("Loading configuration...");
    emitter.notice("Using default settings for some options");

    println!("2. Messages with context:");
    emitter.error_with("disk full", LogContext::new().with_field("code", 28));
    emitter.info_with(
        "user login",
        LogContext::new()
            .with_field("user_id", 42)
            .with_field("ip", "192.168.1.100")
            .with_serialized("roles", &["admin", "ops"]),
    );

    println!("3. Macros:");
    for i in 1..=5 {
        info!(emitter, "Processing item {}/5", i);
        if i == 3 {
            warning!(emitter, ctx: LogContext::new().with_field("item", i), "Item took longer than expected");
        }
    }
    error!(emitter, "Failed to load optional plugin: {}", "metrics");

    emitter.flush()?;

    let metrics = emitter.metrics();
    println!("\nDelivered: {}", metrics.total_logged());
    println!("Dropped:   {}", metrics.dropped_count());
    println!("Filtered:  {}", metrics.filtered());

    if let Some(path) = &config.file_path {
        println!("\nLog file: {}", path.display());
    }

    Ok(())
}
