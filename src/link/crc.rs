//! # Link Checksums
//!
//! The two checksums shared by the command/telemetry link and the flight-log
//! container. Both are reflected (LSB-first) CRCs with device-specific seeds.
//!
//! | | Polynomial (reflected) | Initial Value | Final XOR |
//! |---|---|---|---|
//! | CRC8  | 0x8C (0x31)   | 0x77   | none |
//! | CRC16 | 0x8408 (0x1021) | 0x3692 | none |

/// CRC8 reflected polynomial
const CRC8_POLY: u8 = 0x8C;

/// CRC8 seed
pub const CRC8_INIT: u8 = 0x77;

/// CRC16 reflected polynomial
const CRC16_POLY: u16 = 0x8408;

/// CRC16 seed
pub const CRC16_INIT: u16 = 0x3692;

/// Precomputed CRC8 lookup table for fast calculation
const CRC8_TABLE: [u8; 256] = generate_crc8_table();

/// Precomputed CRC16 lookup table for fast calculation
const CRC16_TABLE: [u16; 256] = generate_crc16_table();

/// Generate CRC8 lookup table at compile time
const fn generate_crc8_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u8;
        let mut j = 0;

        while j < 8 {
            if (crc & 0x01) != 0 {
                crc = (crc >> 1) ^ CRC8_POLY;
            } else {
                crc >>= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Generate CRC16 lookup table at compile time
const fn generate_crc16_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u16;
        let mut j = 0;

        while j < 8 {
            if (crc & 0x0001) != 0 {
                crc = (crc >> 1) ^ CRC16_POLY;
            } else {
                crc >>= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Calculate the 8-bit link checksum
///
/// Covers the header byte and the size field of a packet, or the first
/// three bytes of a log record.
///
/// # Examples
///
/// ```
/// use tello_codec::link::crc::checksum8;
///
/// // Header of a captured takeoff command
/// assert_eq!(checksum8(&[0xCC, 0x58, 0x00]), 0x7C);
/// ```
pub fn checksum8(data: &[u8]) -> u8 {
    let mut crc = CRC8_INIT;

    for &byte in data {
        crc = CRC8_TABLE[(crc ^ byte) as usize];
    }

    crc
}

/// Calculate the 16-bit link checksum
///
/// # Examples
///
/// ```
/// use tello_codec::link::crc::checksum16;
///
/// assert_eq!(checksum16(&[]), 0x3692);
/// ```
pub fn checksum16(data: &[u8]) -> u16 {
    let mut crc = CRC16_INIT;

    for &byte in data {
        crc = CRC16_TABLE[((crc ^ byte as u16) & 0xFF) as usize] ^ (crc >> 8);
    }

    crc
}

/// Bitwise CRC8 (slow, for verifying the lookup table)
#[allow(dead_code)]
fn checksum8_slow(data: &[u8]) -> u8 {
    let mut crc = CRC8_INIT;

    for &byte in data {
        crc ^= byte;

        for _ in 0..8 {
            if (crc & 0x01) != 0 {
                crc = (crc >> 1) ^ CRC8_POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}

/// Bitwise CRC16 (slow, for verifying the lookup table)
#[allow(dead_code)]
fn checksum16_slow(data: &[u8]) -> u16 {
    let mut crc = CRC16_INIT;

    for &byte in data {
        crc ^= byte as u16;

        for _ in 0..8 {
            if (crc & 0x0001) != 0 {
                crc = (crc >> 1) ^ CRC16_POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
