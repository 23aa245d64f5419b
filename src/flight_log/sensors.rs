//! # Sensor Record Decoders
//!
//! Fixed-layout sensor snapshots carried in flight-log record payloads.
//! All fields are little-endian at fixed offsets; the decoders never rely
//! on struct layout.

use bytes::Buf;
use serde::Serialize;
use tracing::debug;

use super::record::LogRecord;
use crate::error::{Result, TelloError};
use crate::link::protocol::bit;

/// Visual odometry (MVO) record type
pub const RECORD_TYPE_MVO: u16 = 29;

/// IMU attitude record type
pub const RECORD_TYPE_IMU: u16 = 0x0800;

/// Extended IMU record type
pub const RECORD_TYPE_IMU_EX: u16 = 0x0810;

/// MVO payload size
pub const MVO_RECORD_SIZE: usize = 80;

/// IMU payload size
pub const IMU_RECORD_SIZE: usize = 108;

/// Extended IMU payload size
pub const IMU_EX_RECORD_SIZE: usize = 76;

/// Three-axis vector
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    fn read(buf: &mut &[u8]) -> Self {
        Self {
            x: buf.get_f32_le(),
            y: buf.get_f32_le(),
            z: buf.get_f32_le(),
        }
    }
}

/// Attitude quaternion
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// MVO field validity (byte 76, bits 3 and 7 unused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MvoValidity {
    pub vel_x: bool,
    pub vel_y: bool,
    pub vel_z: bool,
    pub pos_x: bool,
    pub pos_y: bool,
    pub pos_z: bool,
}

impl MvoValidity {
    pub fn from_byte(byte: u8) -> Self {
        Self {
            vel_x: bit(byte, 0),
            vel_y: bit(byte, 1),
            vel_z: bit(byte, 2),
            pos_x: bit(byte, 4),
            pos_y: bit(byte, 5),
            pos_z: bit(byte, 6),
        }
    }
}

/// Visual odometry (position/velocity estimator) output
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MvoRecord {
    pub observation_count: i16,
    /// Raw velocity components
    pub vel_x: i16,
    pub vel_y: i16,
    pub vel_z: i16,
    pub position: Vec3,
    /// Upper triangle of the position covariance matrix
    pub position_covariance: [f32; 6],
    /// Upper triangle of the velocity covariance matrix
    pub velocity_covariance: [f32; 6],
    pub height: f32,
    pub height_variance: f32,
    pub valid: MvoValidity,
}

/// IMU attitude output
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImuRecord {
    pub longitude: f64,
    pub latitude: f64,
    pub barometer_raw: f32,
    pub accel: Vec3,
    pub gyro: Vec3,
    pub barometer_smooth: f32,
    pub quaternion: Quaternion,
    /// Acceleration in the inertial frame
    pub accel_ground: Vec3,
    pub velocity_north: f32,
    pub velocity_east: f32,
    pub velocity_down: f32,
    /// Gyro in the body frame
    pub gyro_body: Vec3,
    pub mag_x: u16,
    pub mag_y: u16,
    pub mag_z: u16,
    pub temperature: u16,
}

/// Extended IMU field validity (bytes 52-53)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ImuExValidity {
    pub vel_x: bool,
    pub vel_y: bool,
    pub vel_z: bool,
    pub pos_x: bool,
    pub pos_y: bool,
    pub pos_z: bool,
    pub us_velocity: bool,
    pub us_position: bool,
}

impl ImuExValidity {
    pub fn from_word(word: u16) -> Self {
        let byte = word as u8;
        Self {
            vel_x: bit(byte, 0),
            vel_y: bit(byte, 1),
            vel_z: bit(byte, 2),
            pos_x: bit(byte, 3),
            pos_y: bit(byte, 4),
            pos_z: bit(byte, 5),
            us_velocity: bit(byte, 6),
            us_position: bit(byte, 7),
        }
    }
}

/// Extended IMU subsystem errors (bytes 54-55)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ImuExErrors {
    pub vg_large: bool,
    pub gps_yaw: bool,
    pub mag_yaw: bool,
    pub gps_consist: bool,
    pub us_fail: bool,
    pub init_ok: bool,
}

impl ImuExErrors {
    pub fn from_word(word: u16) -> Self {
        let byte = word as u8;
        Self {
            vg_large: bit(byte, 0),
            gps_yaw: bit(byte, 1),
            mag_yaw: bit(byte, 2),
            gps_consist: bit(byte, 3),
            us_fail: bit(byte, 4),
            init_ok: bit(byte, 5),
        }
    }
}

/// Extended IMU output
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImuExRecord {
    pub velocity: Vec3,
    pub position: Vec3,
    /// Range finder (ultrasonic) velocity
    pub us_velocity: f32,
    /// Range finder (ultrasonic) distance
    pub us_position: f32,
    pub rtk_longitude: f64,
    pub rtk_latitude: f64,
    pub rtk_altitude: f32,
    pub valid: ImuExValidity,
    pub errors: ImuExErrors,
    pub count: u16,
    /// Bytes 64-75; meaning not yet identified
    pub unresolved: [f32; 3],
}

fn check_len(payload: &[u8], expected: usize, layout: usize) -> Result<()> {
    if expected < layout {
        return Err(TelloError::Format(format!(
            "expected length {} is below the {}-byte record layout",
            expected, layout
        )));
    }
    if payload.len() < expected {
        return Err(TelloError::TruncatedData {
            expected,
            actual: payload.len(),
        });
    }
    Ok(())
}

/// Decode a visual odometry payload
///
/// Only the first [`MVO_RECORD_SIZE`] bytes are read; anything past them is
/// ignored.
///
/// # Arguments
///
/// * `payload` - Descrambled log record payload
/// * `expected_len` - Fixed byte length for this record type, normally
///   [`MVO_RECORD_SIZE`]
///
/// # Returns
///
/// * `Ok(MvoRecord)` - Decoded visual odometry snapshot
///
/// # Errors
///
/// * [`TelloError::Format`] - `expected_len` is shorter than the 80-byte layout
/// * [`TelloError::TruncatedData`] - `payload` is shorter than `expected_len`
pub fn decode_mvo(payload: &[u8], expected_len: usize) -> Result<MvoRecord> {
    check_len(payload, expected_len, MVO_RECORD_SIZE)?;
    let mut buf = &payload[..MVO_RECORD_SIZE];

    let observation_count = buf.get_i16_le();
    let vel_x = buf.get_i16_le();
    let vel_y = buf.get_i16_le();
    let vel_z = buf.get_i16_le();
    let position = Vec3::read(&mut buf);

    let mut position_covariance = [0f32; 6];
    for value in position_covariance.iter_mut() {
        *value = buf.get_f32_le();
    }
    let mut velocity_covariance = [0f32; 6];
    for value in velocity_covariance.iter_mut() {
        *value = buf.get_f32_le();
    }

    let height = buf.get_f32_le();
    let height_variance = buf.get_f32_le();
    let valid = MvoValidity::from_byte(buf.get_u8());
    // bytes 77-79 reserved

    Ok(MvoRecord {
        observation_count,
        vel_x,
        vel_y,
        vel_z,
        position,
        position_covariance,
        velocity_covariance,
        height,
        height_variance,
        valid,
    })
}

/// Decode an IMU attitude payload
///
/// # Arguments
///
/// * `payload` - Descrambled log record payload
/// * `expected_len` - Fixed byte length for this record type, normally
///   [`IMU_RECORD_SIZE`]
///
/// # Errors
///
/// * [`TelloError::Format`] - `expected_len` is shorter than the 108-byte layout
/// * [`TelloError::TruncatedData`] - `payload` is shorter than `expected_len`
pub fn decode_imu(payload: &[u8], expected_len: usize) -> Result<ImuRecord> {
    check_len(payload, expected_len, IMU_RECORD_SIZE)?;
    let mut buf = &payload[..IMU_RECORD_SIZE];

    Ok(ImuRecord {
        longitude: buf.get_f64_le(),
        latitude: buf.get_f64_le(),
        barometer_raw: buf.get_f32_le(),
        accel: Vec3::read(&mut buf),
        gyro: Vec3::read(&mut buf),
        barometer_smooth: buf.get_f32_le(),
        quaternion: Quaternion {
            w: buf.get_f32_le(),
            x: buf.get_f32_le(),
            y: buf.get_f32_le(),
            z: buf.get_f32_le(),
        },
        accel_ground: Vec3::read(&mut buf),
        velocity_north: buf.get_f32_le(),
        velocity_east: buf.get_f32_le(),
        velocity_down: buf.get_f32_le(),
        gyro_body: Vec3::read(&mut buf),
        mag_x: buf.get_u16_le(),
        mag_y: buf.get_u16_le(),
        mag_z: buf.get_u16_le(),
        temperature: buf.get_u16_le(),
    })
}

/// Decode an extended IMU payload
///
/// Devices have been seen sending payloads longer than 76 bytes under this
/// record type. The extra bytes are not decoded.
///
/// # Arguments
///
/// * `payload` - Descrambled log record payload
/// * `expected_len` - Fixed byte length for this record type, normally
///   [`IMU_EX_RECORD_SIZE`]
///
/// # Returns
///
/// * `Ok(ImuExRecord)` - Decoded snapshot, with bytes 64-75 left in
///   `unresolved`
///
/// # Errors
///
/// * [`TelloError::Format`] - `expected_len` is shorter than the 76-byte layout
/// * [`TelloError::TruncatedData`] - `payload` is shorter than `expected_len`
pub fn decode_imu_ex(payload: &[u8], expected_len: usize) -> Result<ImuExRecord> {
    check_len(payload, expected_len, IMU_EX_RECORD_SIZE)?;
    if payload.len() > IMU_EX_RECORD_SIZE {
        debug!(
            "Extended IMU payload has {} undecoded trailing bytes",
            payload.len() - IMU_EX_RECORD_SIZE
        );
    }
    let mut buf = &payload[..IMU_EX_RECORD_SIZE];

    let velocity = Vec3::read(&mut buf);
    let position = Vec3::read(&mut buf);
    let us_velocity = buf.get_f32_le();
    let us_position = buf.get_f32_le();
    let rtk_longitude = buf.get_f64_le();
    let rtk_latitude = buf.get_f64_le();
    let rtk_altitude = buf.get_f32_le();
    let valid = ImuExValidity::from_word(buf.get_u16_le());
    let errors = ImuExErrors::from_word(buf.get_u16_le());
    buf.advance(2); // reserved
    let count = buf.get_u16_le();
    buf.advance(4); // reserved
    let unresolved = [buf.get_f32_le(), buf.get_f32_le(), buf.get_f32_le()];

    Ok(ImuExRecord {
        velocity,
        position,
        us_velocity,
        us_position,
        rtk_longitude,
        rtk_latitude,
        rtk_altitude,
        valid,
        errors,
        count,
        unresolved,
    })
}

/// A decoded sensor snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum SensorRecord {
    Mvo(MvoRecord),
    Imu(ImuRecord),
    ImuEx(ImuExRecord),
}

impl SensorRecord {
    /// Short name used in logs and JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            SensorRecord::Mvo(_) => "mvo",
            SensorRecord::Imu(_) => "imu",
            SensorRecord::ImuEx(_) => "imu_ex",
        }
    }
}

/// Maps log record types to sensor decoders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordTypeMap {
    pub mvo: u16,
    pub imu: u16,
    pub imu_ex: u16,
}

impl Default for RecordTypeMap {
    fn default() -> Self {
        Self {
            mvo: RECORD_TYPE_MVO,
            imu: RECORD_TYPE_IMU,
            imu_ex: RECORD_TYPE_IMU_EX,
        }
    }
}

impl RecordTypeMap {
    /// Decode the record's payload with the decoder its type maps to
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - Record type is not mapped to any decoder
    /// * `Ok(Some(record))` - Decoded sensor snapshot
    ///
    /// # Errors
    ///
    /// Returns [`TelloError::TruncatedData`] if the payload is shorter than
    /// the mapped record's fixed size
    pub fn decode(&self, record: &LogRecord) -> Result<Option<SensorRecord>> {
        let record_type = record.header.record_type;
        let payload = &record.payload;

        let decoded = if record_type == self.mvo {
            SensorRecord::Mvo(decode_mvo(payload, MVO_RECORD_SIZE)?)
        } else if record_type == self.imu {
            SensorRecord::Imu(decode_imu(payload, IMU_RECORD_SIZE)?)
        } else if record_type == self.imu_ex {
            SensorRecord::ImuEx(decode_imu_ex(payload, IMU_EX_RECORD_SIZE)?)
        } else {
            return Ok(None);
        };

        Ok(Some(decoded))
    }
}
