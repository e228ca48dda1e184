//! Tests for outbound packet framing and inbound frame validation

mod common;

use common::*;

#[test]
fn test_marshal_packet_conformance_vectors() {
    // Byte-exact frames captured from the receiver protocol
    let cases: Vec<(Command, &[u8], &str)> = vec![
        (Command::Ping, &[], "0106000a5e65"),
        (Command::ReadTransmitterId, &[], "010600190c47"),
        (Command::ReadDatabasePageRange, &[0x04], "01070010048bb8"),
        (
            Command::ReadDatabasePages,
            &[0x05, 0x26, 0x00, 0x00, 0x00, 0x01],
            "010c00110526000000015ec3",
        ),
    ];
    for (command, params, expected) in cases {
        let msg = marshal_packet(command, params);
        assert_eq!(
            msg.as_ref(),
            hex_to_bytes(expected).as_slice(),
            "Command({:?}, {:02X?}) framed incorrectly",
            command,
            params
        );
    }
}

#[test]
fn test_length_field_counts_whole_packet() {
    for n in [0usize, 1, 6, 32, 200] {
        let params = vec![0xA5; n];
        let msg = marshal_packet(Command::ReadDatabasePages, &params);
        assert_eq!(msg.len(), 6 + n);
        let length = u16::from_le_bytes([msg[1], msg[2]]) as usize;
        assert_eq!(length, 6 + n, "length field must count the whole packet");
    }
}

#[test]
fn test_unmarshal_packet_roundtrip() {
    let params = [0x05, 0x26, 0x00, 0x00, 0x00, 0x01];
    let msg = marshal_packet(Command::ReadDatabasePages, &params);
    let (command, parsed) = unmarshal_packet(&msg).expect("frame should validate");
    assert_eq!(command, Command::ReadDatabasePages);
    assert_eq!(parsed.as_ref(), &params);
}

#[test]
fn test_unmarshal_packet_empty_params() {
    let msg = marshal_packet(Command::Ping, &[]);
    let (command, parsed) = unmarshal_packet(&msg).expect("frame should validate");
    assert_eq!(command, Command::Ping);
    assert!(parsed.is_empty());
}

#[test]
fn test_unknown_command_byte_survives_unframing() {
    let msg = marshal_packet(Command::Unknown(0x7E), &[]);
    let (command, parsed) = unmarshal_packet(&msg).expect("frame should validate");
    assert_eq!(command, Command::Unknown(0x7E));
    assert!(parsed.is_empty());
}

#[test]
fn test_bit_flips_are_detected() {
    // Flipping any single bit of the command or parameter bytes must trip
    // the CRC check
    let msg = marshal_packet(Command::ReadDatabasePages, &[0x05, 0x26, 0x00, 0x00, 0x00, 0x01]);
    for byte in 3..msg.len() - 2 {
        for bit in 0..8 {
            let mut corrupted = msg.to_vec();
            corrupted[byte] ^= 1 << bit;
            match unmarshal_packet(&corrupted) {
                Err(DexcomError::ChecksumMismatch { computed, received }) => {
                    assert_ne!(computed, received)
                }
                other => panic!(
                    "corrupted frame (byte {byte}, bit {bit}) was not rejected: {other:?}"
                ),
            }
        }
    }
}

#[test]
fn test_corrupted_trailer_is_detected() {
    let mut msg = marshal_packet(Command::Ping, &[]).to_vec();
    let last = msg.len() - 1;
    msg[last] ^= 0x01;
    assert!(matches!(
        unmarshal_packet(&msg),
        Err(DexcomError::ChecksumMismatch { .. })
    ));
}

#[test]
fn test_unmarshal_rejects_bad_marker() {
    let mut msg = marshal_packet(Command::Ping, &[]).to_vec();
    msg[0] = 0x02;
    match unmarshal_packet(&msg) {
        Err(DexcomError::InvalidPacket(text)) => assert!(text.contains("marker")),
        other => panic!("expected InvalidPacket, got {other:?}"),
    }
}

#[test]
fn test_unmarshal_rejects_short_frames() {
    for len in 0..6 {
        let frame = vec![0x01; len];
        match unmarshal_packet(&frame) {
            Err(DexcomError::InvalidPacket(text)) => assert!(text.contains("short")),
            other => panic!("{len}-byte frame was not rejected: {other:?}"),
        }
    }
}

#[test]
fn test_unmarshal_rejects_length_field_mismatch() {
    let mut msg = marshal_packet(Command::ReadDatabasePageRange, &[0x04]).to_vec();
    // Truncate a parameter byte without fixing up the length field
    msg.remove(4);
    match unmarshal_packet(&msg) {
        Err(DexcomError::InvalidPacket(text)) => assert!(text.contains("length")),
        other => panic!("expected InvalidPacket, got {other:?}"),
    }
}
