use bytes::{BufMut, Bytes, BytesMut};
use crc::{CRC_16_XMODEM, Crc};
use num_enum::{FromPrimitive, IntoPrimitive};
use serde::Serialize;
use strum_macros::Display;
use tracing::trace;

use crate::constants::{PACKET_MARKER, PACKET_OVERHEAD};
use crate::error::DexcomError;

/// Checksum over everything before the 2-byte trailer. The receiver uses
/// CRC-16/XMODEM: poly 0x1021, init 0x0000, unreflected, no final xor.
const PACKET_CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Commands understood by the receiver. Codes 0-7 only appear in responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum Command {
    Null = 0,
    Ack = 1,
    Nak = 2,
    InvalidCommand = 3,
    InvalidParam = 4,
    IncompletePacketReceived = 5,
    ReceiverError = 6,
    InvalidMode = 7,
    Ping = 10,
    ReadFirmwareHeader = 11,
    ReadDatabasePartitionInfo = 15,
    ReadDatabasePageRange = 16,
    ReadDatabasePages = 17,
    ReadDatabasePageHeader = 18,
    ReadTransmitterId = 25,
    WriteTransmitterId = 26,
    ReadLanguage = 27,
    WriteLanguage = 28,
    ReadDisplayTimeOffset = 29,
    WriteDisplayTimeOffset = 30,
    ReadRtc = 31,
    ResetReceiver = 32,
    ReadBatteryLevel = 33,
    ReadSystemTime = 34,
    ReadSystemTimeOffset = 35,
    ReadGlucoseUnit = 37,
    ReadBlindedMode = 39,
    ReadClockMode = 41,
    EraseDatabase = 45,
    ShutdownReceiver = 46,
    ReadBatteryState = 48,
    ReadHardwareBoardId = 49,
    ReadFirmwareSettings = 54,
    ReadEnableSetupWizardFlag = 55,
    ReadSetupWizardState = 57,
    #[num_enum(catch_all)]
    Unknown(u8),
}

/// Frame a command and its parameter bytes for the receiver.
///
/// Wire layout: `marker(0x01) ‖ length u16le ‖ command ‖ params ‖ crc u16le`,
/// where `length` counts the whole packet, trailer included. Cannot fail for
/// well-formed inputs; the caller keeps `params` within the 16-bit length
/// field.
pub fn marshal_packet(command: Command, params: &[u8]) -> Bytes {
    let length = PACKET_OVERHEAD + params.len();
    let mut buf = BytesMut::with_capacity(length);
    buf.put_u8(PACKET_MARKER);
    buf.put_u16_le(length as u16);
    buf.put_u8(command.into());
    buf.put_slice(params);
    let crc = PACKET_CRC.checksum(&buf);
    buf.put_u16_le(crc);
    trace!(%command, length, "framed packet");
    buf.freeze()
}

/// Validate an inbound frame and split it into command and parameter bytes.
///
/// Checks the marker byte, the length field against the buffer, and the CRC
/// trailer. Unknown command codes are passed through as `Command::Unknown`.
pub fn unmarshal_packet(frame: &[u8]) -> Result<(Command, Bytes), DexcomError> {
    if frame.len() < PACKET_OVERHEAD {
        return Err(DexcomError::InvalidPacket(format!(
            "frame too short: {} bytes",
            frame.len()
        )));
    }
    if frame[0] != PACKET_MARKER {
        return Err(DexcomError::InvalidPacket(format!(
            "bad marker byte {:#04X}",
            frame[0]
        )));
    }
    let length = u16::from_le_bytes([frame[1], frame[2]]) as usize;
    if length != frame.len() {
        return Err(DexcomError::InvalidPacket(format!(
            "length field says {length} bytes, frame has {}",
            frame.len()
        )));
    }
    let (body, trailer) = frame.split_at(frame.len() - 2);
    let computed = PACKET_CRC.checksum(body);
    let received = u16::from_le_bytes([trailer[0], trailer[1]]);
    if computed != received {
        return Err(DexcomError::ChecksumMismatch { computed, received });
    }
    Ok((
        Command::from_primitive(body[3]),
        Bytes::copy_from_slice(&body[4..]),
    ))
}
