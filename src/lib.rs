//! # Tello Codec Library
//!
//! Binary codec for the Tello command/telemetry link and its onboard
//! flight-log stream.
//!
//! This library turns raw buffers from a transport into typed records and
//! typed commands into buffers ready to send. It performs no I/O: every
//! function borrows its input and returns an owned result.

pub mod config;
pub mod error;
pub mod link;
pub mod flight_log;
pub mod telemetry;
