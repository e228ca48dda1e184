//! Common test utilities and shared imports

// Allow unused imports and dead code since this is a shared module
// used across multiple test files - not all items are used in every test file
#[allow(unused_imports)]
pub use bytes::Bytes;
#[allow(unused_imports)]
pub use chrono::Duration;
#[allow(unused_imports)]
pub use dexcom_protocol::error::DexcomError;
#[allow(unused_imports)]
pub use dexcom_protocol::glucose::{SpecialGlucose, Trend, is_special};
#[allow(unused_imports)]
pub use dexcom_protocol::packet::{Command, marshal_packet, unmarshal_packet};
#[allow(unused_imports)]
pub use dexcom_protocol::record::{PageType, Record, RecordData, SensorChange};
#[allow(unused_imports)]
pub use dexcom_protocol::time::device_epoch;

/// Decode hex string to bytes for testing
#[allow(dead_code)]
pub fn hex_to_bytes(hex_data: &str) -> Vec<u8> {
    hex::decode(hex_data).expect("Failed to decode hex")
}

/// Build a record payload: 8-byte timestamp prefix followed by the layout body
#[allow(dead_code)]
pub fn payload(system_seconds: u32, display_seconds: u32, body: &[u8]) -> Vec<u8> {
    let mut v = Vec::with_capacity(8 + body.len());
    v.extend_from_slice(&system_seconds.to_le_bytes());
    v.extend_from_slice(&display_seconds.to_le_bytes());
    v.extend_from_slice(body);
    v
}

/// Build a calibration record payload with the given curve parameters and
/// `(entered, glucose, raw, applied)` entries
#[allow(dead_code)]
pub fn calibration_payload(
    system_seconds: u32,
    display_seconds: u32,
    curve: (f64, f64, f64, f64),
    entries: &[(u32, i32, i32, u32)],
) -> Vec<u8> {
    let (slope, intercept, scale, decay) = curve;
    let mut body = Vec::new();
    body.extend_from_slice(&slope.to_le_bytes());
    body.extend_from_slice(&intercept.to_le_bytes());
    body.extend_from_slice(&scale.to_le_bytes());
    body.extend_from_slice(&[0u8; 3]);
    body.extend_from_slice(&decay.to_le_bytes());
    body.push(entries.len() as u8);
    for &(entered, glucose, raw, applied) in entries {
        body.extend_from_slice(&entered.to_le_bytes());
        body.extend_from_slice(&glucose.to_le_bytes());
        body.extend_from_slice(&raw.to_le_bytes());
        body.extend_from_slice(&applied.to_le_bytes());
        body.push(0);
    }
    payload(system_seconds, display_seconds, &body)
}
