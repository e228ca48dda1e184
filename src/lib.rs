pub mod constants;
pub mod error;
pub mod glucose;
pub mod packet;
pub mod record;
pub mod time;

// Re-export the protocol surface for easy access
pub use error::DexcomError;
pub use glucose::{SpecialGlucose, Trend, is_special};
pub use packet::{Command, marshal_packet, unmarshal_packet};
pub use record::{
    CalibrationData, CalibrationInfo, EgvInfo, InsertionInfo, MeterInfo, PageType, Record,
    RecordData, SensorChange, SensorInfo,
};
pub use time::{Timestamp, device_epoch};
