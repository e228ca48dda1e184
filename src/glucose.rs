use num_enum::{FromPrimitive, IntoPrimitive, TryFromPrimitive};
use serde::Serialize;
use strum_macros::Display;

/// Exceptional sensor conditions the receiver encodes in the glucose field
/// instead of a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum SpecialGlucose {
    SensorNotActive = 1,
    MinimalDeviation = 2,
    NoAntenna = 3,
    SensorNotCalibrated = 5,
    CountsDeviation = 6,
    AbsoluteDeviation = 9,
    PowerDeviation = 10,
    BadRf = 12,
}

/// Check whether a raw glucose value encodes one of the special conditions.
///
/// Callers must apply this before treating the value as a measurement.
pub fn is_special(glucose: u16) -> bool {
    SpecialGlucose::try_from(glucose).is_ok()
}

/// Trend arrow displayed by the receiver alongside an EGV reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum Trend {
    UpUp = 1,
    Up = 2,
    Up45 = 3,
    Flat = 4,
    Down45 = 5,
    Down = 6,
    DownDown = 7,
    NotComputable = 8,
    OutOfRange = 9,
    #[num_enum(catch_all)]
    Unknown(u8),
}

impl Trend {
    /// Single-glyph rendering of the arrow; codes outside the known set map
    /// to the empty string.
    pub fn symbol(&self) -> &'static str {
        match self {
            Trend::UpUp => "⇈",
            Trend::Up => "↑",
            Trend::Up45 => "↗",
            Trend::Flat => "→",
            Trend::Down45 => "↘",
            Trend::Down => "↓",
            Trend::DownDown => "⇊",
            Trend::NotComputable => "⁇",
            Trend::OutOfRange => "⋯",
            Trend::Unknown(_) => "",
        }
    }
}
