//! # Error Types
//!
//! Custom error types for the Tello codec using `thiserror`.

use thiserror::Error;

/// Which integrity check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumKind {
    /// 8-bit header checksum
    Crc8,
    /// 16-bit trailing checksum
    Crc16,
}

impl std::fmt::Display for ChecksumKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChecksumKind::Crc8 => f.write_str("CRC8"),
            ChecksumKind::Crc16 => f.write_str("CRC16"),
        }
    }
}

/// Main error type for the Tello codec
#[derive(Debug, Error)]
pub enum TelloError {
    /// Bad magic byte or structurally impossible buffer
    #[error("Format error: {0}")]
    Format(String),

    /// Checksum mismatch
    #[error("{kind} mismatch: expected 0x{expected:04X}, got 0x{actual:04X}")]
    Checksum {
        kind: ChecksumKind,
        expected: u16,
        actual: u16,
    },

    /// Buffer shorter than a length field requires
    #[error("Truncated data: expected {expected} bytes, got {actual}")]
    TruncatedData { expected: usize, actual: usize },

    /// Encoder input outside a field's representable range
    #[error("Value {value} out of range for {field} (max {max})")]
    Range {
        field: &'static str,
        value: u32,
        max: u32,
    },

    /// Output field would not be representable
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for the Tello codec
pub type Result<T> = std::result::Result<T, TelloError>;
