//! # Log Record Stream
//!
//! Iterates over back-to-back log records, as carried in a flight-log data
//! message or a capture file.

use super::record::{decode_log_record, LogRecord};
use crate::error::Result;

/// Iterator over consecutive log records in a buffer
///
/// Stops at the end of the buffer. On the first decode error the error is
/// yielded once and iteration ends; the bytes after a bad record cannot be
/// located without resynchronizing, which is left to the caller.
///
/// # Examples
///
/// ```
/// use tello_codec::flight_log::record::encode_log_record;
/// use tello_codec::flight_log::stream::LogRecordIter;
///
/// let mut data = encode_log_record(29, 0x10, &[1, 2, 3]).unwrap();
/// data.extend(encode_log_record(2048, 0x20, &[4, 5]).unwrap());
///
/// let types: Vec<u16> = LogRecordIter::new(&data)
///     .map(|r| r.unwrap().header.record_type)
///     .collect();
/// assert_eq!(types, vec![29, 2048]);
/// ```
#[derive(Debug, Clone)]
pub struct LogRecordIter<'a> {
    data: &'a [u8],
    position: usize,
    failed: bool,
}

impl<'a> LogRecordIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            failed: false,
        }
    }

    /// Byte offset of the next record
    pub fn position(&self) -> usize {
        self.position
    }
}

impl<'a> Iterator for LogRecordIter<'a> {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.position >= self.data.len() {
            return None;
        }

        match decode_log_record(&self.data[self.position..]) {
            Ok(record) => {
                self.position += record.wire_len();
                Some(Ok(record))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TelloError;
    use crate::flight_log::record::encode_log_record;

    #[test]
    fn test_empty_buffer_yields_nothing() {
        assert_eq!(LogRecordIter::new(&[]).count(), 0);
    }

    #[test]
    fn test_iterates_all_records() {
        let mut data = Vec::new();
        for i in 0..5u8 {
            data.extend(encode_log_record(i as u16, i, &vec![i; i as usize * 3]).unwrap());
        }

        let mut iter = LogRecordIter::new(&data);
        for i in 0..5u8 {
            let record = iter.next().unwrap().unwrap();
            assert_eq!(record.header.record_type, i as u16);
            assert_eq!(record.payload, vec![i; i as usize * 3]);
        }
        assert!(iter.next().is_none());
        assert_eq!(iter.position(), data.len());
    }

    #[test]
    fn test_stops_after_first_error() {
        let mut data = encode_log_record(1, 0, &[1]).unwrap();
        let good_len = data.len();
        data.push(0x00); // garbage where a header is expected
        data.extend(encode_log_record(2, 0, &[2]).unwrap());

        let mut iter = LogRecordIter::new(&data);
        assert!(iter.next().unwrap().is_ok());
        assert!(matches!(iter.next(), Some(Err(TelloError::Format(_)))));
        assert!(iter.next().is_none());
        assert_eq!(iter.position(), good_len);
    }

    #[test]
    fn test_truncated_tail() {
        let mut data = encode_log_record(1, 0, &[1, 2]).unwrap();
        let second = encode_log_record(2, 0, &[3, 4]).unwrap();
        data.extend_from_slice(&second[..second.len() - 1]);

        let results: Vec<_> = LogRecordIter::new(&data).collect();
        assert_eq!(results.len(), 2);
        assert!(matches!(results[1], Err(TelloError::TruncatedData { .. })));
    }
}
