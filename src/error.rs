use thiserror::Error;

use crate::record::PageType;

/// The primary error type for the `dexcom-protocol` library.
#[derive(Error, Debug)]
pub enum DexcomError {
    #[error("unmarshaling of {page_type} records is unimplemented: {raw:02X?}")]
    UnsupportedPageType { page_type: PageType, raw: Vec<u8> },

    #[error("wrong length for {expected}-byte {page_type} record, got {actual} bytes: {raw:02X?}")]
    LengthMismatch {
        page_type: PageType,
        expected: usize,
        actual: usize,
        raw: Vec<u8>,
    },

    #[error("insufficient data: expected at least {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    #[error("invalid packet: {0}")]
    InvalidPacket(String),

    #[error("checksum mismatch: computed {computed:#06X}, frame carries {received:#06X}")]
    ChecksumMismatch { computed: u16, received: u16 },
}
