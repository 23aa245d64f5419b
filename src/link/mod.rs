//! # Link Protocol Module
//!
//! Command/telemetry link between the ground station and the drone.
//!
//! This module handles:
//! - Packet framing with CRC8 header and CRC16 trailer checks
//! - Flight status telemetry decoding
//! - Stick command packing (four 11-bit axes + one switch bit)

pub mod protocol;
pub mod encoder;
pub mod decoder;
pub mod crc;
