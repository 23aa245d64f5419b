//! # Log Record Framer
//!
//! Frames and parses flight-log records.
//!
//! ```text
//! [0]      0x55 header
//! [1..2]   record length (u16 LE, header + payload, excludes CRC16)
//! [3]      CRC8 over bytes 0-2
//! [4..5]   record type (u16 LE)
//! [6]      scramble key
//! [7..9]   reserved
//! [10..]   scrambled payload
//! last 2   CRC16 over header + scrambled payload
//! ```

use bytes::{Buf, BufMut};
use serde::Serialize;
use tracing::debug;

use crate::error::{ChecksumKind, Result, TelloError};
use crate::link::crc::{checksum16, checksum8};

/// Log record header byte (always 0x55)
pub const LOG_RECORD_HEADER: u8 = 0x55;

/// Fixed header size
pub const LOG_HEADER_SIZE: usize = 10;

/// Trailing CRC16 size
pub const LOG_CRC16_SIZE: usize = 2;

/// Number of leading bytes covered by the CRC8
const LOG_CRC8_SPAN: usize = 3;

/// Largest payload whose record length still fits 16 bits
pub const LOG_MAX_PAYLOAD_SIZE: usize = u16::MAX as usize - LOG_HEADER_SIZE;

/// Log record header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LogRecordHeader {
    /// Header + payload length, excluding the trailing CRC16
    pub record_length: u16,
    pub crc8: u8,
    pub record_type: u16,
    /// Per-record scramble key
    pub xor_key: u8,
    pub reserved: [u8; 3],
}

/// A framed log record with its payload already descrambled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub header: LogRecordHeader,
    pub payload: Vec<u8>,
}

impl LogRecord {
    /// Bytes this record occupies in a stream, CRC16 included
    pub fn wire_len(&self) -> usize {
        self.header.record_length as usize + LOG_CRC16_SIZE
    }
}

/// Apply the payload scramble key
///
/// Every byte is XORed with `key`, so the same call scrambles and
/// descrambles.
pub fn descramble(key: u8, data: &[u8]) -> Vec<u8> {
    data.iter().map(|&byte| byte ^ key).collect()
}

/// Decode a single log record from the start of `data`
///
/// Bytes after the record's CRC16 are ignored.
///
/// # Errors
///
/// Returns error if:
/// - Header byte is wrong or record length is below the header size ([`TelloError::Format`])
/// - CRC8 or CRC16 check fails ([`TelloError::Checksum`])
/// - Buffer is shorter than the header or than record length + 2 ([`TelloError::TruncatedData`])
pub fn decode_log_record(data: &[u8]) -> Result<LogRecord> {
    let Some(&first) = data.first() else {
        return Err(TelloError::TruncatedData {
            expected: LOG_HEADER_SIZE,
            actual: 0,
        });
    };

    if first != LOG_RECORD_HEADER {
        return Err(TelloError::Format(format!("Invalid log record header: 0x{:02X}", first)));
    }

    if data.len() < LOG_HEADER_SIZE {
        return Err(TelloError::TruncatedData {
            expected: LOG_HEADER_SIZE,
            actual: data.len(),
        });
    }

    let mut buf = &data[1..LOG_HEADER_SIZE];
    let record_length = buf.get_u16_le();
    let crc8 = buf.get_u8();
    let record_type = buf.get_u16_le();
    let xor_key = buf.get_u8();
    let reserved = [buf.get_u8(), buf.get_u8(), buf.get_u8()];

    let calculated_crc8 = checksum8(&data[..LOG_CRC8_SPAN]);
    if calculated_crc8 != crc8 {
        debug!("Log record CRC8 mismatch: 0x{:02X} != 0x{:02X}", calculated_crc8, crc8);
        return Err(TelloError::Checksum {
            kind: ChecksumKind::Crc8,
            expected: calculated_crc8 as u16,
            actual: crc8 as u16,
        });
    }

    let length = record_length as usize;
    if length < LOG_HEADER_SIZE {
        return Err(TelloError::Format(format!("Invalid log record length: {}", length)));
    }

    if data.len() < length + LOG_CRC16_SIZE {
        return Err(TelloError::TruncatedData {
            expected: length + LOG_CRC16_SIZE,
            actual: data.len(),
        });
    }

    let received_crc16 = u16::from_le_bytes([data[length], data[length + 1]]);
    let calculated_crc16 = checksum16(&data[..length]);
    if calculated_crc16 != received_crc16 {
        debug!(
            "Log record type {} CRC16 mismatch: 0x{:04X} != 0x{:04X}",
            record_type, calculated_crc16, received_crc16
        );
        return Err(TelloError::Checksum {
            kind: ChecksumKind::Crc16,
            expected: calculated_crc16,
            actual: received_crc16,
        });
    }

    Ok(LogRecord {
        header: LogRecordHeader {
            record_length,
            crc8,
            record_type,
            xor_key,
            reserved,
        },
        payload: descramble(xor_key, &data[LOG_HEADER_SIZE..length]),
    })
}

/// Frame a plain payload as a log record
///
/// The payload is scrambled with `xor_key`; reserved bytes are zero.
///
/// # Errors
///
/// Returns [`TelloError::Encoding`] if the record length would overflow 16 bits
pub fn encode_log_record(record_type: u16, xor_key: u8, payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > LOG_MAX_PAYLOAD_SIZE {
        return Err(TelloError::Encoding(format!(
            "Log payload size {} exceeds maximum {}",
            payload.len(),
            LOG_MAX_PAYLOAD_SIZE
        )));
    }

    let length = LOG_HEADER_SIZE + payload.len();

    let mut record = Vec::with_capacity(length + LOG_CRC16_SIZE);
    record.put_u8(LOG_RECORD_HEADER);
    record.put_u16_le(length as u16);
    let crc8 = checksum8(&record);
    record.put_u8(crc8);
    record.put_u16_le(record_type);
    record.put_u8(xor_key);
    record.put_bytes(0, 3);
    record.extend_from_slice(&descramble(xor_key, payload));

    let crc16 = checksum16(&record);
    record.put_u16_le(crc16);

    Ok(record)
}
