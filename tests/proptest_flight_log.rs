//! Property-based tests for log record framing and sensor decoding.

use proptest::prelude::*;
use tello_codec::error::TelloError;
use tello_codec::flight_log::record::{decode_log_record, encode_log_record, LOG_HEADER_SIZE};
use tello_codec::flight_log::sensors::{
    decode_imu, decode_imu_ex, decode_mvo, IMU_EX_RECORD_SIZE, IMU_RECORD_SIZE, MVO_RECORD_SIZE,
};
use tello_codec::flight_log::stream::LogRecordIter;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Framing then decoding returns the plain payload for any key.
    #[test]
    fn prop_log_record_round_trip(
        record_type: u16,
        key: u8,
        payload in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let bytes = encode_log_record(record_type, key, &payload).map_err(|e| {
            TestCaseError::fail(format!("encode should succeed: {e:?}"))
        })?;
        prop_assert_eq!(bytes.len(), LOG_HEADER_SIZE + payload.len() + 2);

        let record = decode_log_record(&bytes).map_err(|e| {
            TestCaseError::fail(format!("decode should succeed: {e:?}"))
        })?;
        prop_assert_eq!(record.header.record_type, record_type);
        prop_assert_eq!(record.header.xor_key, key);
        prop_assert_eq!(record.header.record_length as usize, LOG_HEADER_SIZE + payload.len());
        prop_assert_eq!(record.payload, payload);
    }

    /// Any single bit flip in a valid record is rejected.
    #[test]
    fn prop_log_record_bit_flip_detected(
        record_type: u16,
        key: u8,
        payload in prop::collection::vec(any::<u8>(), 0..64),
        bit_seed in any::<usize>(),
    ) {
        let mut bytes = encode_log_record(record_type, key, &payload).map_err(|e| {
            TestCaseError::fail(format!("encode should succeed: {e:?}"))
        })?;
        let bit = bit_seed % (bytes.len() * 8);
        bytes[bit / 8] ^= 1 << (bit % 8);

        prop_assert!(decode_log_record(&bytes).is_err());
    }

    /// Every strict prefix of a valid record is rejected as truncated.
    #[test]
    fn prop_log_record_truncation(
        key: u8,
        payload in prop::collection::vec(any::<u8>(), 0..64),
        cut in any::<usize>(),
    ) {
        let bytes = encode_log_record(29, key, &payload).map_err(|e| {
            TestCaseError::fail(format!("encode should succeed: {e:?}"))
        })?;
        let len = cut % bytes.len();

        let result = decode_log_record(&bytes[..len]);
        prop_assert!(
            matches!(result, Err(TelloError::TruncatedData { .. })),
            "length {} gave {:?}", len, result
        );
    }

    /// The stream iterator yields every record of a concatenated buffer in order.
    #[test]
    fn prop_stream_yields_all(
        records in prop::collection::vec(
            (any::<u16>(), any::<u8>(), prop::collection::vec(any::<u8>(), 0..32)),
            0..8,
        ),
    ) {
        let mut data = Vec::new();
        for (record_type, key, payload) in &records {
            let bytes = encode_log_record(*record_type, *key, payload).map_err(|e| {
                TestCaseError::fail(format!("encode should succeed: {e:?}"))
            })?;
            data.extend(bytes);
        }

        let decoded: Vec<_> = LogRecordIter::new(&data).collect();
        prop_assert_eq!(decoded.len(), records.len());
        for (result, (record_type, _, payload)) in decoded.iter().zip(records.iter()) {
            match result {
                Ok(record) => {
                    prop_assert_eq!(record.header.record_type, *record_type);
                    prop_assert_eq!(&record.payload, payload);
                }
                Err(e) => return Err(TestCaseError::fail(format!("decode failed: {e:?}"))),
            }
        }
    }

    /// Sensor decoders accept any buffer at least their fixed size and reject
    /// shorter ones without panicking.
    #[test]
    fn prop_sensor_decoder_lengths(data in prop::collection::vec(any::<u8>(), 0..128)) {
        prop_assert_eq!(decode_mvo(&data, MVO_RECORD_SIZE).is_ok(), data.len() >= MVO_RECORD_SIZE);
        prop_assert_eq!(decode_imu(&data, IMU_RECORD_SIZE).is_ok(), data.len() >= IMU_RECORD_SIZE);
        prop_assert_eq!(
            decode_imu_ex(&data, IMU_EX_RECORD_SIZE).is_ok(),
            data.len() >= IMU_EX_RECORD_SIZE
        );
    }

    /// A larger expected length raises the minimum payload a decoder accepts.
    #[test]
    fn prop_sensor_decoder_expected_len(
        data in prop::collection::vec(any::<u8>(), 0..160),
        extra in 0usize..32,
    ) {
        let expected = IMU_EX_RECORD_SIZE + extra;
        let result = decode_imu_ex(&data, expected);
        if data.len() >= expected {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(
                matches!(result, Err(TelloError::TruncatedData { .. })),
                "length {} with expected {} gave {:?}", data.len(), expected, result
            );
        }
    }
}
