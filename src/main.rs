//! # Tello Log Dump
//!
//! Decodes a captured flight-log stream and prints the sensor records as
//! JSON Lines on stdout.
//!
//! ```bash
//! tello-logdump flight.bin [config.toml] > flight.jsonl
//! ```
//!
//! The capture must contain back-to-back log records. Status messages go to
//! stderr through `tracing`; set `RUST_LOG=debug` to see per-record detail.

use anyhow::{bail, Context, Result};
use std::io::{self, BufWriter};
use tracing::{debug, info, warn};

use tello_codec::config::Config;
use tello_codec::flight_log::stream::LogRecordIter;
use tello_codec::telemetry::JsonlWriter;

/// Record counts for one capture
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct DumpStats {
    decoded: u64,
    unmapped: u64,
    failed: u64,
}

/// Decode every record in `data` and write mapped ones to `writer`
///
/// Framing errors end the dump, since the next record boundary is unknown.
/// Sensor decode errors skip the record unless `stop_on_error` is set.
fn dump_records<W: io::Write>(
    data: &[u8],
    config: &Config,
    writer: &mut JsonlWriter<W>,
) -> Result<DumpStats> {
    let type_map = config.log_records.type_map();
    let mut stats = DumpStats::default();
    let mut records = LogRecordIter::new(data);

    while let Some(result) = records.next() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                stats.failed += 1;
                warn!("Log framing error at byte {}: {}", records.position(), e);
                break;
            }
        };

        let record_type = record.header.record_type;
        match type_map.decode(&record) {
            Ok(Some(sensor)) => {
                debug!("Record type {} decoded as {}", record_type, sensor.kind());
                writer.write_record(record_type, &sensor)?;
                stats.decoded += 1;
            }
            Ok(None) => {
                stats.unmapped += 1;
            }
            Err(e) => {
                stats.failed += 1;
                if config.output.stop_on_error {
                    bail!("Record type {} failed to decode: {}", record_type, e);
                }
                warn!("Skipping record type {}: {}", record_type, e);
            }
        }
    }

    writer.flush()?;
    Ok(stats)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Tello log dump v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let Some(capture_path) = args.next() else {
        bail!("usage: tello-logdump <capture> [config.toml]");
    };

    let config = match args.next() {
        Some(path) => {
            info!("Loading configuration from {}", path);
            Config::load(&path).with_context(|| format!("failed to load config {}", path))?
        }
        None => Config::default(),
    };

    let data = tokio::fs::read(&capture_path)
        .await
        .with_context(|| format!("failed to read capture {}", capture_path))?;
    info!("Read {} bytes from {}", data.len(), capture_path);

    let stdout = io::stdout();
    let mut writer = JsonlWriter::new(BufWriter::new(stdout.lock()), config.output.include_timestamp);
    let stats = dump_records(&data, &config, &mut writer)?;

    info!(
        "Decoded {} records ({} unmapped, {} failed)",
        stats.decoded, stats.unmapped, stats.failed
    );

    Ok(())
}
