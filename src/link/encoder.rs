//! # Link Packet Encoder
//!
//! Encodes preambles, stick commands and flight status records into link bytes.

use bytes::BufMut;

use super::crc::{checksum16, checksum8};
use super::protocol::*;
use crate::error::{Result, TelloError};

/// Encode a complete link packet
///
/// The size and CRC8 fields of `preambula` are ignored; both are derived
/// from the payload.
///
/// # Arguments
///
/// * `preambula` - Type info, message ID and sequence number
/// * `payload` - Payload bytes (may be empty)
///
/// # Returns
///
/// * `Result<Vec<u8>>` - Packet: header + size + crc8 + type info + ID + sequence + payload + crc16
///
/// # Errors
///
/// Returns [`TelloError::Encoding`] if the packet size would overflow the
/// 16-bit size field, or [`TelloError::Range`] if the type info is invalid.
///
/// # Examples
///
/// ```
/// use tello_codec::link::encoder::encode_packet;
/// use tello_codec::link::protocol::{PacketPreambula, PacketTypeInfo, MSG_TAKEOFF_CMD};
///
/// let preambula = PacketPreambula::new(PacketTypeInfo::from_byte(0x68), MSG_TAKEOFF_CMD, 1);
/// let packet = encode_packet(&preambula, &[]).unwrap();
/// assert_eq!(packet.len(), 11);
/// ```
pub fn encode_packet(preambula: &PacketPreambula, payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > PACKET_MAX_PAYLOAD_SIZE {
        return Err(TelloError::Encoding(format!(
            "Payload size {} exceeds maximum {}",
            payload.len(),
            PACKET_MAX_PAYLOAD_SIZE
        )));
    }

    let type_info = preambula.type_info.to_byte()?;
    let size = PACKET_MIN_SIZE + payload.len();

    let mut packet = Vec::with_capacity(size);
    packet.put_u8(PACKET_HEADER);
    packet.put_u16_le(size as u16);
    let crc8 = checksum8(&packet);
    packet.put_u8(crc8);
    packet.put_u8(type_info);
    packet.put_u16_le(preambula.message_id);
    packet.put_u16_le(preambula.sequence_no);
    packet.extend_from_slice(payload);

    // CRC16 over everything so far
    let crc16 = checksum16(&packet);
    packet.put_u16_le(crc16);

    Ok(packet)
}

/// Encode stick axes into the 6-byte stick command buffer
///
/// Axes are packed as a continuous bitstream, LSB first:
/// ```text
/// bits  0-10  axis1
/// bits 11-21  axis2
/// bits 22-32  axis3
/// bits 33-43  axis4
/// bit  44     axis5
/// bits 45-47  zero
/// ```
///
/// # Errors
///
/// Returns [`TelloError::Range`] if axis 1-4 exceeds 2047 or axis 5 exceeds 1.
///
/// # Examples
///
/// ```
/// use tello_codec::link::encoder::encode_sticks;
/// use tello_codec::link::protocol::SticksData;
///
/// let bytes = encode_sticks(&SticksData { axis1: 2047, axis2: 0, axis3: 0, axis4: 0, axis5: 0 }).unwrap();
/// assert_eq!(bytes, [0xFF, 0x07, 0x00, 0x00, 0x00, 0x00]);
/// ```
pub fn encode_sticks(sticks: &SticksData) -> Result<[u8; STICKS_DATA_SIZE]> {
    let axis_max = STICK_AXIS_WIRE_MAX as u32;
    let axes = [
        ("axis1", sticks.axis1 as u32, axis_max),
        ("axis2", sticks.axis2 as u32, axis_max),
        ("axis3", sticks.axis3 as u32, axis_max),
        ("axis4", sticks.axis4 as u32, axis_max),
        ("axis5", sticks.axis5 as u32, STICK_SWITCH_MAX as u32),
    ];

    let mut payload = [0u8; STICKS_DATA_SIZE];
    let mut bit_index = 0;

    for &(field, value, max) in axes.iter() {
        if value > max {
            return Err(TelloError::Range { field, value, max });
        }

        // Wire width is the bit length of the field's maximum
        let width = u32::BITS - max.leading_zeros();

        for bit in 0..width {
            if (value >> bit) & 1 == 1 {
                payload[bit_index / 8] |= 1 << (bit_index % 8);
            }
            bit_index += 1;
        }
    }

    Ok(payload)
}

/// Map a normalized stick deflection to a wire axis value
///
/// `-1.0` maps to [`STICK_AXIS_MIN`], `0.0` to [`STICK_AXIS_CENTER`] and
/// `1.0` to [`STICK_AXIS_MAX`]. Inputs outside `[-1.0, 1.0]` are clamped;
/// NaN maps to center.
pub fn axis_from_normalized(value: f32) -> u16 {
    if value.is_nan() {
        return STICK_AXIS_CENTER;
    }

    let span = (STICK_AXIS_MAX - STICK_AXIS_CENTER) as f32;
    let raw = STICK_AXIS_CENTER as f32 + value.clamp(-1.0, 1.0) * span;
    (raw.round() as u16).clamp(STICK_AXIS_MIN, STICK_AXIS_MAX)
}

/// Encode a flight status record into its 24-byte wire form
///
/// Inverse of [`decode_flight_data`](super::decoder::decode_flight_data).
/// Unused status bits are written as zero.
pub fn encode_flight_data(data: &FlightData) -> [u8; FLIGHT_DATA_SIZE] {
    let mut buf = Vec::with_capacity(FLIGHT_DATA_SIZE);

    buf.put_i16_le(data.height);
    buf.put_i16_le(data.north_speed);
    buf.put_i16_le(data.east_speed);
    buf.put_i16_le(data.ground_speed);
    buf.put_u16_le(data.fly_time);
    buf.put_u8(data.system.to_byte());
    buf.put_u8(data.imu_calibration_state);
    buf.put_u8(data.battery_percentage);
    buf.put_u16_le(data.drone_battery_left);
    buf.put_u16_le(data.drone_fly_time_left);
    buf.put_u8(data.emergency.to_byte());
    buf.put_u8(data.fly_mode);
    buf.put_u8(data.throw_fly_timer);
    buf.put_u8(data.camera_state);
    buf.put_u8(data.motor_state);
    buf.put_u8(data.front_sensor.to_byte());
    buf.put_u8(data.error.to_byte());

    let mut out = [0u8; FLIGHT_DATA_SIZE];
    out.copy_from_slice(&buf);
    out
}
