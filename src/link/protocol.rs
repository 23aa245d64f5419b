//! # Link Protocol Constants and Types
//!
//! Core definitions for the drone's command/telemetry link.

use serde::Serialize;

use crate::error::{Result, TelloError};

/// Packet header byte (always 0xCC)
pub const PACKET_HEADER: u8 = 0xCC;

/// Preamble size: header(1) + size(2) + crc8(1) + type info(1) + message ID(2) + sequence(2)
pub const PACKET_PREAMBLE_SIZE: usize = 9;

/// Trailing CRC16 size
pub const PACKET_CRC16_SIZE: usize = 2;

/// Smallest possible packet (empty payload)
pub const PACKET_MIN_SIZE: usize = PACKET_PREAMBLE_SIZE + PACKET_CRC16_SIZE;

/// Largest payload whose packet size still fits the 16-bit size field
pub const PACKET_MAX_PAYLOAD_SIZE: usize = u16::MAX as usize - PACKET_MIN_SIZE;

/// Number of leading bytes covered by the CRC8 (header + size)
pub const PACKET_CRC8_SPAN: usize = 3;

/// Stick command message
pub const MSG_STICK_CMD: u16 = 0x0050;

/// Takeoff command message
pub const MSG_TAKEOFF_CMD: u16 = 0x0054;

/// Land command message
pub const MSG_LAND_CMD: u16 = 0x0055;

/// Flight status telemetry message
pub const MSG_FLIGHT_DATA: u16 = 0x0056;

/// Flight telemetry record size
pub const FLIGHT_DATA_SIZE: usize = 24;

/// Packed stick command size (45 bits + 3 padding bits)
pub const STICKS_DATA_SIZE: usize = 6;

/// Stick axis wire range (11-bit: 0-2047)
pub const STICK_AXIS_WIRE_MAX: u16 = 2047;

/// Stick switch (axis 5) wire range (1-bit)
pub const STICK_SWITCH_MAX: u8 = 1;

/// Published stick axis range the device acts on
pub const STICK_AXIS_MIN: u16 = 364;
pub const STICK_AXIS_CENTER: u16 = 1024;
pub const STICK_AXIS_MAX: u16 = 1684;

/// Largest value of a 3-bit packet class/subclass
const PACKET_CLASS_MAX: u8 = 0x07;

/// Returns bit `n` of `byte`
pub(crate) fn bit(byte: u8, n: u8) -> bool {
    (byte >> n) & 1 == 1
}

/// Packet type information byte
///
/// ```text
/// bit 0     from drone
/// bit 1     to drone
/// bits 2-4  packet class
/// bits 5-7  packet subclass
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PacketTypeInfo {
    pub from_drone: bool,
    pub to_drone: bool,
    /// 3-bit packet class
    pub packet_class: u8,
    /// 3-bit packet subclass
    pub packet_subclass: u8,
}

impl PacketTypeInfo {
    /// Unpack a type information byte
    pub fn from_byte(byte: u8) -> Self {
        Self {
            from_drone: bit(byte, 0),
            to_drone: bit(byte, 1),
            packet_class: (byte >> 2) & PACKET_CLASS_MAX,
            packet_subclass: (byte >> 5) & PACKET_CLASS_MAX,
        }
    }

    /// Pack into a type information byte
    ///
    /// # Errors
    ///
    /// Returns [`TelloError::Range`] if class or subclass does not fit 3 bits
    pub fn to_byte(&self) -> Result<u8> {
        if self.packet_class > PACKET_CLASS_MAX {
            return Err(TelloError::Range {
                field: "packet_class",
                value: self.packet_class as u32,
                max: PACKET_CLASS_MAX as u32,
            });
        }
        if self.packet_subclass > PACKET_CLASS_MAX {
            return Err(TelloError::Range {
                field: "packet_subclass",
                value: self.packet_subclass as u32,
                max: PACKET_CLASS_MAX as u32,
            });
        }

        Ok((self.from_drone as u8)
            | (self.to_drone as u8) << 1
            | self.packet_class << 2
            | self.packet_subclass << 5)
    }
}

/// Fixed-format packet header preceding the payload
///
/// `size` and `crc8` are filled in by the decoder. The encoder derives both
/// and ignores whatever the caller put there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PacketPreambula {
    /// Whole packet length including preamble and trailing CRC16
    pub size: u16,
    pub crc8: u8,
    pub type_info: PacketTypeInfo,
    pub message_id: u16,
    pub sequence_no: u16,
}

impl PacketPreambula {
    /// Create a preamble for encoding
    pub fn new(type_info: PacketTypeInfo, message_id: u16, sequence_no: u16) -> Self {
        Self {
            size: 0,
            crc8: 0,
            type_info,
            message_id,
            sequence_no,
        }
    }
}

/// Sensor/system health flags (status byte 10)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SystemFlags {
    pub imu_state: bool,
    pub pressure_state: bool,
    pub down_visual_state: bool,
    pub power_state: bool,
    pub battery_state: bool,
    pub gravity_state: bool,
    // bit 6 unused
    pub wind_state: bool,
}

impl SystemFlags {
    pub fn from_byte(byte: u8) -> Self {
        Self {
            imu_state: bit(byte, 0),
            pressure_state: bit(byte, 1),
            down_visual_state: bit(byte, 2),
            power_state: bit(byte, 3),
            battery_state: bit(byte, 4),
            gravity_state: bit(byte, 5),
            wind_state: bit(byte, 7),
        }
    }

    pub fn to_byte(&self) -> u8 {
        (self.imu_state as u8)
            | (self.pressure_state as u8) << 1
            | (self.down_visual_state as u8) << 2
            | (self.power_state as u8) << 3
            | (self.battery_state as u8) << 4
            | (self.gravity_state as u8) << 5
            | (self.wind_state as u8) << 7
    }
}

/// Emergency, hover and recording flags (status byte 17)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EmergencyFlags {
    pub em_sky: bool,
    pub em_ground: bool,
    pub em_open: bool,
    pub drone_hover: bool,
    pub outage_recording: bool,
    pub battery_low: bool,
    pub battery_lower: bool,
    pub factory_mode: bool,
}

impl EmergencyFlags {
    pub fn from_byte(byte: u8) -> Self {
        Self {
            em_sky: bit(byte, 0),
            em_ground: bit(byte, 1),
            em_open: bit(byte, 2),
            drone_hover: bit(byte, 3),
            outage_recording: bit(byte, 4),
            battery_low: bit(byte, 5),
            battery_lower: bit(byte, 6),
            factory_mode: bit(byte, 7),
        }
    }

    pub fn to_byte(&self) -> u8 {
        (self.em_sky as u8)
            | (self.em_ground as u8) << 1
            | (self.em_open as u8) << 2
            | (self.drone_hover as u8) << 3
            | (self.outage_recording as u8) << 4
            | (self.battery_low as u8) << 5
            | (self.battery_lower as u8) << 6
            | (self.factory_mode as u8) << 7
    }
}

/// Front sensor flags (status byte 22, bits 3-7 unused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FrontSensorFlags {
    pub front_in: bool,
    pub front_out: bool,
    pub front_lsc: bool,
}

impl FrontSensorFlags {
    pub fn from_byte(byte: u8) -> Self {
        Self {
            front_in: bit(byte, 0),
            front_out: bit(byte, 1),
            front_lsc: bit(byte, 2),
        }
    }

    pub fn to_byte(&self) -> u8 {
        (self.front_in as u8) | (self.front_out as u8) << 1 | (self.front_lsc as u8) << 2
    }
}

/// Error flag (status byte 23, bits 1-7 unused)
///
/// Some ground-station tools label this bit `temperature_height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ErrorFlags {
    pub error_state: bool,
}

impl ErrorFlags {
    pub fn from_byte(byte: u8) -> Self {
        Self {
            error_state: bit(byte, 0),
        }
    }

    pub fn to_byte(&self) -> u8 {
        self.error_state as u8
    }
}

/// Flight status telemetry snapshot (24 bytes on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FlightData {
    /// Height in decimeters
    pub height: i16,
    pub north_speed: i16,
    pub east_speed: i16,
    pub ground_speed: i16,
    pub fly_time: u16,

    pub system: SystemFlags,

    pub imu_calibration_state: u8,
    pub battery_percentage: u8,
    pub drone_battery_left: u16,
    pub drone_fly_time_left: u16,

    pub emergency: EmergencyFlags,

    pub fly_mode: u8,
    pub throw_fly_timer: u8,
    pub camera_state: u8,
    pub motor_state: u8,

    pub front_sensor: FrontSensorFlags,
    pub error: ErrorFlags,
}

/// Five stick axes of a stick command
///
/// Axes 1-4 are 11-bit values, axis 5 is a single bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SticksData {
    pub axis1: u16,
    pub axis2: u16,
    pub axis3: u16,
    pub axis4: u16,
    pub axis5: u8,
}

impl Default for SticksData {
    /// All sticks centered, switch off
    fn default() -> Self {
        Self {
            axis1: STICK_AXIS_CENTER,
            axis2: STICK_AXIS_CENTER,
            axis3: STICK_AXIS_CENTER,
            axis4: STICK_AXIS_CENTER,
            axis5: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_constants() {
        assert_eq!(PACKET_HEADER, 0xCC);
        assert_eq!(PACKET_MIN_SIZE, 11);
        assert_eq!(PACKET_MAX_PAYLOAD_SIZE, 65524);
    }

    #[test]
    fn test_stick_axis_ranges() {
        assert_eq!(STICK_AXIS_WIRE_MAX, 2047);
        assert_eq!(STICK_SWITCH_MAX, 1);
        assert!(STICK_AXIS_MIN < STICK_AXIS_CENTER && STICK_AXIS_CENTER < STICK_AXIS_MAX);
        assert_eq!(STICK_AXIS_CENTER - STICK_AXIS_MIN, STICK_AXIS_MAX - STICK_AXIS_CENTER);
    }

    #[test]
    fn test_type_info_bit_positions() {
        let info = PacketTypeInfo::from_byte(0b101_011_1_0);
        assert!(!info.from_drone);
        assert!(info.to_drone);
        assert_eq!(info.packet_class, 0b011);
        assert_eq!(info.packet_subclass, 0b101);
    }

    #[test]
    fn test_type_info_captured_command_byte() {
        let info = PacketTypeInfo::from_byte(0x68);
        assert_eq!(info.packet_class, 2);
        assert_eq!(info.packet_subclass, 3);
        assert_eq!(info.to_byte().unwrap(), 0x68);
    }

    #[test]
    fn test_type_info_all_bytes_roundtrip() {
        for byte in 0..=255u8 {
            assert_eq!(PacketTypeInfo::from_byte(byte).to_byte().unwrap(), byte);
        }
    }

    #[test]
    fn test_type_info_class_out_of_range() {
        let info = PacketTypeInfo {
            packet_class: 8,
            ..Default::default()
        };
        assert!(matches!(
            info.to_byte(),
            Err(TelloError::Range { field: "packet_class", value: 8, max: 7 })
        ));

        let info = PacketTypeInfo {
            packet_subclass: 0xFF,
            ..Default::default()
        };
        assert!(matches!(info.to_byte(), Err(TelloError::Range { field: "packet_subclass", .. })));
    }

    #[test]
    fn test_system_flags_skip_bit_six() {
        let flags = SystemFlags::from_byte(0b0100_0000);
        assert_eq!(flags, SystemFlags::default());

        let flags = SystemFlags::from_byte(0b1000_0001);
        assert!(flags.imu_state);
        assert!(flags.wind_state);
        assert!(!flags.gravity_state);
        assert_eq!(flags.to_byte(), 0b1000_0001);
    }

    #[test]
    fn test_emergency_flags_ascending_order() {
        for n in 0..8 {
            let flags = EmergencyFlags::from_byte(1 << n);
            let set = [
                flags.em_sky,
                flags.em_ground,
                flags.em_open,
                flags.drone_hover,
                flags.outage_recording,
                flags.battery_low,
                flags.battery_lower,
                flags.factory_mode,
            ];
            for (i, &value) in set.iter().enumerate() {
                assert_eq!(value, i == n as usize, "bit {} flag {}", n, i);
            }
            assert_eq!(flags.to_byte(), 1 << n);
        }
    }

    #[test]
    fn test_front_and_error_flags_ignore_unused_bits() {
        let front = FrontSensorFlags::from_byte(0xF8);
        assert_eq!(front, FrontSensorFlags::default());
        assert!(FrontSensorFlags::from_byte(0x04).front_lsc);

        let error = ErrorFlags::from_byte(0xFE);
        assert!(!error.error_state);
        assert!(ErrorFlags::from_byte(0x01).error_state);
    }

    #[test]
    fn test_sticks_default_centered() {
        let sticks = SticksData::default();
        assert_eq!(sticks.axis1, STICK_AXIS_CENTER);
        assert_eq!(sticks.axis4, STICK_AXIS_CENTER);
        assert_eq!(sticks.axis5, 0);
    }
}
