use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::constants::TIMESTAMP_SIZE;
use crate::error::DexcomError;

/// Seconds between the Unix epoch and the receiver's epoch (2009-01-01 00:00:00 UTC)
const EPOCH_UNIX_SECONDS: i64 = 1_230_768_000;

/// The instant the receiver counts seconds from.
pub fn device_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(EPOCH_UNIX_SECONDS)
}

/// Convert a device-epoch second count to UTC wall time.
pub fn from_device_seconds(seconds: u32) -> DateTime<Utc> {
    device_epoch() + Duration::seconds(seconds as i64)
}

/// Decode a 4-byte little-endian device-epoch second count.
pub fn unmarshal_time(v: [u8; 4]) -> DateTime<Utc> {
    from_device_seconds(u32::from_le_bytes(v))
}

/// Timestamp prefix shared by every record layout (8 bytes on the wire)
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct TimestampRaw {
    pub system_seconds: U32,
    pub display_seconds: U32,
}

/// Decoded record timestamp.
///
/// `display_time - system_time` is the receiver's clock-adjustment offset at
/// the moment the record was written; calibration entry timestamps are
/// shifted by the same offset when decoded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Timestamp {
    pub system_time: DateTime<Utc>,
    pub display_time: DateTime<Utc>,
}

impl From<TimestampRaw> for Timestamp {
    fn from(raw: TimestampRaw) -> Self {
        Timestamp {
            system_time: from_device_seconds(raw.system_seconds.get()),
            display_time: from_device_seconds(raw.display_seconds.get()),
        }
    }
}

impl Timestamp {
    /// Split the leading 8-byte timestamp off a record payload.
    pub(crate) fn unmarshal_prefix(v: &[u8]) -> Result<(Timestamp, &[u8]), DexcomError> {
        let (raw, body) =
            TimestampRaw::read_from_prefix(v).map_err(|_| DexcomError::InsufficientData {
                expected: TIMESTAMP_SIZE,
                actual: v.len(),
            })?;
        Ok((Timestamp::from(raw), body))
    }

    /// Clock-adjustment offset in effect when the record was written.
    pub fn offset(&self) -> Duration {
        self.display_time - self.system_time
    }
}
