use bytes::Bytes;
use chrono::{DateTime, Utc};
use num_enum::{FromPrimitive, IntoPrimitive};
use serde::Serialize;
use strum_macros::Display;
use tracing::trace;
use zerocopy::byteorder::little_endian::{F64, I32, U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::constants::{
    CALIBRATION_ENTRY_SIZE, CALIBRATION_HEADER_SIZE, EGV_DISPLAY_ONLY, EGV_NOISE_MASK,
    EGV_NOISE_SHIFT, EGV_RECORD_SIZE, EGV_TREND_MASK, EGV_VALUE_MASK, INSERTION_RECORD_SIZE,
    INVALID_TIME, METER_RECORD_SIZE, SENSOR_RECORD_SIZE, TIMESTAMP_SIZE,
};
use crate::error::DexcomError;
use crate::glucose::Trend;
use crate::time::{Timestamp, from_device_seconds, unmarshal_time};

/// Tag identifying which on-device log layout a page payload encodes.
///
/// The transport layer supplies the tag out-of-band; it is not carried in the
/// payload itself. Tags without a decoder dispatch to the fallback arm of
/// [`Record::unmarshal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum PageType {
    ManufacturingData = 0,
    FirmwareParameterData = 1,
    PcSoftwareParameter = 2,
    SensorData = 3,
    EgvData = 4,
    CalSet = 5,
    Deviation = 6,
    InsertionTime = 7,
    ReceiverLogData = 8,
    ReceiverErrorData = 9,
    MeterData = 10,
    UserEventData = 11,
    UserSettingData = 12,
    #[num_enum(catch_all)]
    Unknown(u8),
}

impl PageType {
    /// Expected payload length for the fixed-size layouts.
    fn fixed_length(self) -> Option<usize> {
        match self {
            PageType::SensorData => Some(SENSOR_RECORD_SIZE),
            PageType::EgvData => Some(EGV_RECORD_SIZE),
            PageType::InsertionTime => Some(INSERTION_RECORD_SIZE),
            PageType::MeterData => Some(METER_RECORD_SIZE),
            _ => None,
        }
    }
}

/// Sensor record body (10 bytes after the timestamp prefix)
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct SensorRaw {
    unfiltered: U32,
    filtered: U32,
    rssi: i8,
    unknown: u8,
}

/// EGV record body (3 bytes after the timestamp prefix)
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct EgvRaw {
    /// Bit 15 flags display-only, low 10 bits are the glucose value
    glucose: U16,
    /// Noise in bits 4-6, trend arrow code in bits 0-3
    status: u8,
}

/// Fixed part of a calibration record body (36 bytes after the timestamp prefix)
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct CalibrationHeadRaw {
    slope: F64,
    intercept: F64,
    scale: F64,
    reserved: [u8; 3],
    decay: F64,
    count: u8,
}

/// One calibration entry (17 bytes)
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct CalibrationEntryRaw {
    entered_seconds: U32,
    glucose: I32,
    raw: I32,
    applied_seconds: U32,
    reserved: u8,
}

/// Insertion record body (5 bytes after the timestamp prefix)
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct InsertionRaw {
    system_time: [u8; 4],
    event: u8,
}

/// Meter record body (6 bytes after the timestamp prefix)
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct MeterRaw {
    glucose: U16,
    meter_seconds: U32,
}

/// Raw sensor counts as logged by the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorInfo {
    pub unfiltered: u32,
    pub filtered: u32,
    pub rssi: i8,
    /// Trailing byte of the layout, meaning unknown; preserved verbatim
    pub unknown: u8,
}

impl From<SensorRaw> for SensorInfo {
    fn from(raw: SensorRaw) -> Self {
        SensorInfo {
            unfiltered: raw.unfiltered.get(),
            filtered: raw.filtered.get(),
            rssi: raw.rssi,
            unknown: raw.unknown,
        }
    }
}

/// Estimated glucose value reading.
///
/// `glucose` may encode a special condition rather than a measurement; check
/// [`crate::glucose::is_special`] before interpreting it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EgvInfo {
    pub glucose: u16,
    pub display_only: bool,
    pub noise: u8,
    pub trend: Trend,
}

impl From<EgvRaw> for EgvInfo {
    fn from(raw: EgvRaw) -> Self {
        let word = raw.glucose.get();
        EgvInfo {
            glucose: word & EGV_VALUE_MASK,
            display_only: word & EGV_DISPLAY_ONLY != 0,
            noise: (raw.status & EGV_NOISE_MASK) >> EGV_NOISE_SHIFT,
            trend: Trend::from_primitive(raw.status & EGV_TREND_MASK),
        }
    }
}

/// Calibration curve parameters plus the entries they were fit from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationInfo {
    pub slope: f64,
    pub intercept: f64,
    pub scale: f64,
    pub decay: f64,
    pub data: Vec<CalibrationData>,
}

/// One calibration measurement.
///
/// Entry timestamps are recorded in system-clock time; the decoder shifts
/// them by the record's display offset so they line up with
/// [`Record::time`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationData {
    pub time_entered: DateTime<Utc>,
    pub glucose: i32,
    pub raw: i32,
    pub time_applied: DateTime<Utc>,
}

/// Sensor session state change reported by an insertion record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum SensorChange {
    Stopped = 1,
    Started = 7,
    #[num_enum(catch_all)]
    Unknown(u8),
}

/// Sensor insertion / removal event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InsertionInfo {
    /// System-clock time of the event; the device writes an all-ones
    /// sentinel when none was recorded
    pub system_time: Option<DateTime<Utc>>,
    pub event: SensorChange,
}

impl From<InsertionRaw> for InsertionInfo {
    fn from(raw: InsertionRaw) -> Self {
        let system_time = if raw.system_time == INVALID_TIME {
            None
        } else {
            Some(unmarshal_time(raw.system_time))
        };
        InsertionInfo {
            system_time,
            event: SensorChange::from_primitive(raw.event),
        }
    }
}

/// Fingerstick meter entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeterInfo {
    pub glucose: u16,
    pub meter_time: DateTime<Utc>,
}

impl From<MeterRaw> for MeterInfo {
    fn from(raw: MeterRaw) -> Self {
        MeterInfo {
            glucose: raw.glucose.get(),
            meter_time: from_device_seconds(raw.meter_seconds.get()),
        }
    }
}

/// Decoded payload of a log page record; exactly one variant per record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RecordData {
    Sensor(SensorInfo),
    Egv(EgvInfo),
    Calibration(CalibrationInfo),
    Insertion(InsertionInfo),
    Meter(MeterInfo),
    /// Manufacturing, firmware-parameter and PC-software pages; their text
    /// format is not decoded here, the payload past the timestamp is kept
    /// verbatim
    Metadata(Bytes),
}

/// One record from an on-device log page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub timestamp: Timestamp,
    pub data: RecordData,
}

impl Record {
    /// Wall-clock time of the record.
    pub fn time(&self) -> DateTime<Utc> {
        self.timestamp.display_time
    }

    /// Decode a raw page payload according to `page_type`.
    ///
    /// Every payload starts with the 8-byte timestamp prefix; the rest is
    /// layout-specific. Fixed-size layouts reject payloads of the wrong
    /// length before anything is decoded.
    pub fn unmarshal(page_type: PageType, v: &[u8]) -> Result<Record, DexcomError> {
        trace!(%page_type, len = v.len(), "unmarshaling record");
        if let Some(expected) = page_type.fixed_length() {
            if v.len() != expected {
                return Err(DexcomError::LengthMismatch {
                    page_type,
                    expected,
                    actual: v.len(),
                    raw: v.to_vec(),
                });
            }
        }
        let (timestamp, body) = Timestamp::unmarshal_prefix(v)?;
        let data = match page_type {
            PageType::SensorData => {
                let raw = SensorRaw::read_from_bytes(body).map_err(|_| {
                    DexcomError::InsufficientData {
                        expected: SENSOR_RECORD_SIZE,
                        actual: v.len(),
                    }
                })?;
                RecordData::Sensor(SensorInfo::from(raw))
            }
            PageType::EgvData => {
                let raw =
                    EgvRaw::read_from_bytes(body).map_err(|_| DexcomError::InsufficientData {
                        expected: EGV_RECORD_SIZE,
                        actual: v.len(),
                    })?;
                RecordData::Egv(EgvInfo::from(raw))
            }
            PageType::CalSet => RecordData::Calibration(unmarshal_calibration(&timestamp, body)?),
            PageType::InsertionTime => {
                let raw = InsertionRaw::read_from_bytes(body).map_err(|_| {
                    DexcomError::InsufficientData {
                        expected: INSERTION_RECORD_SIZE,
                        actual: v.len(),
                    }
                })?;
                RecordData::Insertion(InsertionInfo::from(raw))
            }
            PageType::MeterData => {
                let raw =
                    MeterRaw::read_from_bytes(body).map_err(|_| DexcomError::InsufficientData {
                        expected: METER_RECORD_SIZE,
                        actual: v.len(),
                    })?;
                RecordData::Meter(MeterInfo::from(raw))
            }
            PageType::ManufacturingData
            | PageType::FirmwareParameterData
            | PageType::PcSoftwareParameter => RecordData::Metadata(Bytes::copy_from_slice(body)),
            _ => {
                return Err(DexcomError::UnsupportedPageType {
                    page_type,
                    raw: v.to_vec(),
                });
            }
        };
        Ok(Record { timestamp, data })
    }
}

/// Decode a variable-length calibration body: curve parameters, an entry
/// count, then `count` 17-byte entries. Trailing bytes past the last entry
/// are ignored.
fn unmarshal_calibration(
    timestamp: &Timestamp,
    body: &[u8],
) -> Result<CalibrationInfo, DexcomError> {
    let (head, entries) =
        CalibrationHeadRaw::read_from_prefix(body).map_err(|_| DexcomError::InsufficientData {
            expected: CALIBRATION_HEADER_SIZE,
            actual: TIMESTAMP_SIZE + body.len(),
        })?;
    let count = head.count as usize;
    if entries.len() < count * CALIBRATION_ENTRY_SIZE {
        return Err(DexcomError::InsufficientData {
            expected: CALIBRATION_HEADER_SIZE + count * CALIBRATION_ENTRY_SIZE,
            actual: TIMESTAMP_SIZE + body.len(),
        });
    }
    // Entry timestamps are in system-clock time; reapply the record's own
    // clock-adjustment offset.
    let offset = timestamp.offset();
    let mut data = Vec::with_capacity(count);
    for chunk in entries.chunks_exact(CALIBRATION_ENTRY_SIZE).take(count) {
        let entry =
            CalibrationEntryRaw::read_from_bytes(chunk).map_err(|_| {
                DexcomError::InsufficientData {
                    expected: CALIBRATION_ENTRY_SIZE,
                    actual: chunk.len(),
                }
            })?;
        data.push(CalibrationData {
            time_entered: from_device_seconds(entry.entered_seconds.get()) + offset,
            glucose: entry.glucose.get(),
            raw: entry.raw.get(),
            time_applied: from_device_seconds(entry.applied_seconds.get()) + offset,
        });
    }
    Ok(CalibrationInfo {
        slope: head.slope.get(),
        intercept: head.intercept.get(),
        scale: head.scale.get(),
        decay: head.decay.get(),
        data,
    })
}
