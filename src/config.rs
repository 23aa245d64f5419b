//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Result, TelloError};
use crate::flight_log::sensors::{
    RecordTypeMap, RECORD_TYPE_IMU, RECORD_TYPE_IMU_EX, RECORD_TYPE_MVO,
};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub log_records: LogRecordConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Log record type mapping
#[derive(Debug, Deserialize, Clone)]
pub struct LogRecordConfig {
    #[serde(default = "default_mvo_type")]
    pub mvo_type: u16,

    #[serde(default = "default_imu_type")]
    pub imu_type: u16,

    #[serde(default = "default_imu_ex_type")]
    pub imu_ex_type: u16,
}

/// Log dump output configuration
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_include_timestamp")]
    pub include_timestamp: bool,

    #[serde(default)]
    pub stop_on_error: bool,
}

// Default value functions
fn default_mvo_type() -> u16 { RECORD_TYPE_MVO }
fn default_imu_type() -> u16 { RECORD_TYPE_IMU }
fn default_imu_ex_type() -> u16 { RECORD_TYPE_IMU_EX }

fn default_include_timestamp() -> bool { true }

impl Default for LogRecordConfig {
    fn default() -> Self {
        Self {
            mvo_type: default_mvo_type(),
            imu_type: default_imu_type(),
            imu_ex_type: default_imu_ex_type(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            include_timestamp: default_include_timestamp(),
            stop_on_error: false,
        }
    }
}

impl LogRecordConfig {
    /// Record type map for the sensor decoders
    pub fn type_map(&self) -> RecordTypeMap {
        RecordTypeMap {
            mvo: self.mvo_type,
            imu: self.imu_type,
            imu_ex: self.imu_ex_type,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tello_codec::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if two sensor decoders share a record type
    fn validate(&self) -> Result<()> {
        let records = &self.log_records;

        for (a_name, a, b_name, b) in [
            ("mvo_type", records.mvo_type, "imu_type", records.imu_type),
            ("mvo_type", records.mvo_type, "imu_ex_type", records.imu_ex_type),
            ("imu_type", records.imu_type, "imu_ex_type", records.imu_ex_type),
        ] {
            if a == b {
                return Err(TelloError::Config(toml::de::Error::custom(format!(
                    "{} and {} must differ (both are {})",
                    a_name, b_name, a
                ))));
            }
        }

        Ok(())
    }
}
