//! # Telemetry Module
//!
//! Writes decoded flight-log sensor records as JSON Lines.
//!
//! Each line is one object:
//! ```text
//! {"timestamp":"2026-01-01T00:00:00Z","record_type":29,"kind":"mvo","data":{...}}
//! ```

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::io::Write;

use crate::error::Result;
use crate::flight_log::sensors::SensorRecord;

/// One JSONL line
#[derive(Debug, Serialize)]
struct JsonlLine<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    record_type: u16,
    #[serde(flatten)]
    record: &'a SensorRecord,
}

/// JSON Lines writer for sensor records
pub struct JsonlWriter<W: Write> {
    writer: W,
    include_timestamp: bool,
    records_written: u64,
}

impl<W: Write> JsonlWriter<W> {
    /// Create a writer
    ///
    /// # Arguments
    ///
    /// * `writer` - Output sink
    /// * `include_timestamp` - Prefix each line with the UTC time it was written
    pub fn new(writer: W, include_timestamp: bool) -> Self {
        Self {
            writer,
            include_timestamp,
            records_written: 0,
        }
    }

    /// Write one record as a single JSON line
    pub fn write_record(&mut self, record_type: u16, record: &SensorRecord) -> Result<()> {
        let line = JsonlLine {
            timestamp: self
                .include_timestamp
                .then(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            record_type,
            record,
        };

        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")?;
        self.records_written += 1;
        Ok(())
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of records written so far
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Consume the writer and return the sink
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight_log::sensors::{decode_imu_ex, IMU_EX_RECORD_SIZE};

    fn sample_record() -> SensorRecord {
        SensorRecord::ImuEx(decode_imu_ex(&[0u8; IMU_EX_RECORD_SIZE], IMU_EX_RECORD_SIZE).unwrap())
    }

    #[test]
    fn test_write_record_without_timestamp() {
        let mut writer = JsonlWriter::new(Vec::new(), false);
        writer.write_record(2064, &sample_record()).unwrap();
        assert_eq!(writer.records_written(), 1);

        let output = String::from_utf8(writer.into_inner()).unwrap();
        assert!(output.ends_with('\n'));

        let value: serde_json::Value = serde_json::from_str(output.trim_end()).unwrap();
        assert!(value.get("timestamp").is_none());
        assert_eq!(value["record_type"], 2064);
        assert_eq!(value["kind"], "imu_ex");
        assert_eq!(value["data"]["count"], 0);
    }

    #[test]
    fn test_write_record_with_timestamp() {
        let mut writer = JsonlWriter::new(Vec::new(), true);
        writer.write_record(2064, &sample_record()).unwrap();

        let output = String::from_utf8(writer.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(output.trim_end()).unwrap();
        let timestamp = value["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[test]
    fn test_one_line_per_record() {
        let mut writer = JsonlWriter::new(Vec::new(), false);
        for _ in 0..3 {
            writer.write_record(2064, &sample_record()).unwrap();
        }
        writer.flush().unwrap();
        assert_eq!(writer.records_written(), 3);

        let output = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(output.lines().count(), 3);
    }
}
