//! # Flight Log Module
//!
//! Decoding of the drone's onboard flight-log stream.
//!
//! This module handles:
//! - Log record framing with CRC8/CRC16 validation
//! - Payload descrambling with the per-record key
//! - Visual odometry, IMU and extended IMU sensor records
//! - Iteration over back-to-back records

pub mod record;
pub mod sensors;
pub mod stream;
