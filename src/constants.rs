// Protocol constants for the Dexcom receiver wire format

/// Leading marker byte of every framed packet
pub const PACKET_MARKER: u8 = 0x01;

/// Framing bytes around the parameters: marker(1) + length(2) + command(1) + crc(2)
pub const PACKET_OVERHEAD: usize = 6;

/// Size of the device timestamp prefix shared by all record layouts (8 bytes)
pub const TIMESTAMP_SIZE: usize = 8;

/// Size of a sensor record payload (18 bytes)
pub const SENSOR_RECORD_SIZE: usize = 18;

/// Size of an EGV record payload (11 bytes)
pub const EGV_RECORD_SIZE: usize = 11;

/// Size of an insertion record payload (13 bytes)
pub const INSERTION_RECORD_SIZE: usize = 13;

/// Size of a meter record payload (14 bytes)
pub const METER_RECORD_SIZE: usize = 14;

/// Fixed part of a calibration record, entry count byte included (44 bytes)
pub const CALIBRATION_HEADER_SIZE: usize = 44;

/// Size of one calibration entry (17 bytes)
pub const CALIBRATION_ENTRY_SIZE: usize = 17;

/// EGV glucose word: bit 15 flags a display-only reading
pub const EGV_DISPLAY_ONLY: u16 = 1 << 15;

/// EGV glucose word: low 10 bits carry the glucose value
pub const EGV_VALUE_MASK: u16 = 0x3FF;

/// EGV status byte: bits 4-6 carry the noise level
pub const EGV_NOISE_MASK: u8 = 0x70;

/// Shift to bring the noise bits down to a value
pub const EGV_NOISE_SHIFT: u32 = 4;

/// EGV status byte: low 4 bits carry the trend arrow code
pub const EGV_TREND_MASK: u8 = 0x0F;

/// All-ones insertion timestamp meaning "no timestamp recorded"
pub const INVALID_TIME: [u8; 4] = [0xFF; 4];
