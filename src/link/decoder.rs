//! # Link Packet Decoder
//!
//! Decodes link packets, flight status records and stick commands.

use bytes::Buf;
use tracing::debug;

use super::crc::{checksum16, checksum8};
use super::protocol::*;
use crate::error::{ChecksumKind, Result, TelloError};

/// Decode a complete link packet
///
/// # Arguments
///
/// * `packet` - Complete packet bytes (header through trailing CRC16)
///
/// # Returns
///
/// * `Result<(PacketPreambula, Vec<u8>)>` - Preamble and an owned copy of the payload
///
/// # Errors
///
/// Returns error if:
/// - Buffer is shorter than the preamble, header byte is wrong, or the size
///   field is smaller than an empty packet ([`TelloError::Format`])
/// - CRC8 or CRC16 check fails ([`TelloError::Checksum`])
/// - Size field does not match the buffer length ([`TelloError::TruncatedData`])
pub fn decode_packet(packet: &[u8]) -> Result<(PacketPreambula, Vec<u8>)> {
    if packet.len() < PACKET_PREAMBLE_SIZE {
        return Err(TelloError::Format(format!(
            "Packet too short for preamble: {} bytes",
            packet.len()
        )));
    }

    if packet[0] != PACKET_HEADER {
        return Err(TelloError::Format(format!("Invalid packet header: 0x{:02X}", packet[0])));
    }

    let received_crc8 = packet[3];
    let calculated_crc8 = checksum8(&packet[..PACKET_CRC8_SPAN]);
    if calculated_crc8 != received_crc8 {
        debug!("Packet CRC8 mismatch: 0x{:02X} != 0x{:02X}", calculated_crc8, received_crc8);
        return Err(TelloError::Checksum {
            kind: ChecksumKind::Crc8,
            expected: calculated_crc8 as u16,
            actual: received_crc8 as u16,
        });
    }

    let mut preamble = &packet[1..PACKET_PREAMBLE_SIZE];
    let size = preamble.get_u16_le();
    let crc8 = preamble.get_u8();
    let type_info = PacketTypeInfo::from_byte(preamble.get_u8());
    let message_id = preamble.get_u16_le();
    let sequence_no = preamble.get_u16_le();

    if (size as usize) < PACKET_MIN_SIZE {
        return Err(TelloError::Format(format!("Invalid packet size field: {}", size)));
    }

    if size as usize != packet.len() {
        return Err(TelloError::TruncatedData {
            expected: size as usize,
            actual: packet.len(),
        });
    }

    let crc_offset = packet.len() - PACKET_CRC16_SIZE;
    let received_crc16 = u16::from_le_bytes([packet[crc_offset], packet[crc_offset + 1]]);
    let calculated_crc16 = checksum16(&packet[..crc_offset]);
    if calculated_crc16 != received_crc16 {
        debug!("Packet CRC16 mismatch: 0x{:04X} != 0x{:04X}", calculated_crc16, received_crc16);
        return Err(TelloError::Checksum {
            kind: ChecksumKind::Crc16,
            expected: calculated_crc16,
            actual: received_crc16,
        });
    }

    let preambula = PacketPreambula {
        size,
        crc8,
        type_info,
        message_id,
        sequence_no,
    };
    let payload = packet[PACKET_PREAMBLE_SIZE..crc_offset].to_vec();

    Ok((preambula, payload))
}

/// Decode a flight status record
///
/// # Arguments
///
/// * `payload` - Flight status payload (at least 24 bytes, extra bytes ignored)
///
/// # Returns
///
/// * `Result<FlightData>` - Decoded flight status
///
/// # Errors
///
/// Returns [`TelloError::TruncatedData`] if `payload` is shorter than
/// [`FLIGHT_DATA_SIZE`]
pub fn decode_flight_data(payload: &[u8]) -> Result<FlightData> {
    if payload.len() < FLIGHT_DATA_SIZE {
        return Err(TelloError::TruncatedData {
            expected: FLIGHT_DATA_SIZE,
            actual: payload.len(),
        });
    }

    let mut buf = &payload[..FLIGHT_DATA_SIZE];

    Ok(FlightData {
        height: buf.get_i16_le(),
        north_speed: buf.get_i16_le(),
        east_speed: buf.get_i16_le(),
        ground_speed: buf.get_i16_le(),
        fly_time: buf.get_u16_le(),
        system: SystemFlags::from_byte(buf.get_u8()),
        imu_calibration_state: buf.get_u8(),
        battery_percentage: buf.get_u8(),
        drone_battery_left: buf.get_u16_le(),
        drone_fly_time_left: buf.get_u16_le(),
        emergency: EmergencyFlags::from_byte(buf.get_u8()),
        fly_mode: buf.get_u8(),
        throw_fly_timer: buf.get_u8(),
        camera_state: buf.get_u8(),
        motor_state: buf.get_u8(),
        front_sensor: FrontSensorFlags::from_byte(buf.get_u8()),
        error: ErrorFlags::from_byte(buf.get_u8()),
    })
}

/// Decode a 6-byte stick command buffer
///
/// Inverse of [`encode_sticks`](super::encoder::encode_sticks). Padding bits
/// 45-47 are ignored, as is anything past the sixth byte.
///
/// # Arguments
///
/// * `payload` - Packed stick bytes, LSB-first
///
/// # Returns
///
/// * `Result<SticksData>` - Axes 1-4 in `0..=2047`, axis 5 in `0..=1`
///
/// # Errors
///
/// Returns [`TelloError::TruncatedData`] if `payload` is shorter than
/// [`STICKS_DATA_SIZE`]
pub fn decode_sticks(payload: &[u8]) -> Result<SticksData> {
    if payload.len() < STICKS_DATA_SIZE {
        return Err(TelloError::TruncatedData {
            expected: STICKS_DATA_SIZE,
            actual: payload.len(),
        });
    }

    let mut raw = [0u8; 8];
    raw[..STICKS_DATA_SIZE].copy_from_slice(&payload[..STICKS_DATA_SIZE]);
    let bits = u64::from_le_bytes(raw);

    let axis = |offset: u32| ((bits >> offset) & STICK_AXIS_WIRE_MAX as u64) as u16;

    Ok(SticksData {
        axis1: axis(0),
        axis2: axis(11),
        axis3: axis(22),
        axis4: axis(33),
        axis5: ((bits >> 44) & STICK_SWITCH_MAX as u64) as u8,
    })
}
