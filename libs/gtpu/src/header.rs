#![allow(clippy::unusual_byte_groupings)]
use crate::Teid;
use thiserror::Error;

/// Length of the mandatory GTP-U header - TS29.281, 5.1.
pub const HEADER_LEN: usize = 8;

/// G-PDU message type, meaning the payload is a tunnelled user packet - TS29.281, table 6.1-1.
pub const MESSAGE_TYPE_GPDU: u8 = 255;

/// Registered GTP-U port - TS29.281, 4.4.2.
pub const GTPU_PORT: u16 = 2152;

/// Largest payload whose length fits the 16-bit length field.
pub const MAX_PAYLOAD: usize = u16::MAX as usize - HEADER_LEN;

// Version=1, PT=1 (GTP), E, S and PN all clear.  With these flags the header
// is exactly HEADER_LEN bytes and the length field equals the payload length.
const FLAGS_V1_GPDU: u8 = 0b001_1_0_0_0_0;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("payload of {0} bytes does not fit the 16-bit GTP length field")]
    PayloadTooBig(usize),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("datagram of {0} bytes is shorter than the mandatory GTP header")]
    Truncated(usize),
    #[error("unhandled GTP flags {0:#04x} - want version 1, GTP prime off, no optional fields")]
    UnsupportedFlags(u8),
    #[error("unhandled GTP message type {0} - only G-PDU is carried on this path")]
    UnexpectedMessageType(u8),
    #[error("GTP length field says {declared} bytes but {actual} follow the header")]
    LengthMismatch { declared: u16, actual: usize },
}

/// Whether decode checks the length field against the bytes actually received.
///
/// UDP already delimits the datagram, so the field is redundant on this
/// transport and some senders fill it carelessly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LengthCheck {
    Strict,
    Lenient,
}

/// Prepend the mandatory 8-byte G-PDU header to an inner packet.
///
/// The length field counts the bytes following the mandatory header, which
/// for a header with no optional fields is the payload length - TS29.281, 5.1.
pub fn encode(payload: &[u8], teid: Teid) -> Result<Vec<u8>, EncodeError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(EncodeError::PayloadTooBig(payload.len()));
    }
    let mut datagram = Vec::with_capacity(HEADER_LEN + payload.len());
    datagram.push(FLAGS_V1_GPDU);
    datagram.push(MESSAGE_TYPE_GPDU);
    datagram.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    datagram.extend_from_slice(&teid.0.to_be_bytes());
    datagram.extend_from_slice(payload);
    Ok(datagram)
}

/// Strip the G-PDU header from a received datagram, returning the TEID and a
/// view of the tunnelled inner packet.
pub fn decode(datagram: &[u8], length_check: LengthCheck) -> Result<(Teid, &[u8]), DecodeError> {
    if datagram.len() < HEADER_LEN {
        return Err(DecodeError::Truncated(datagram.len()));
    }

    // Check the flags before trusting any offset.  Optional fields would move
    // the start of the inner packet.
    if datagram[0] != FLAGS_V1_GPDU {
        return Err(DecodeError::UnsupportedFlags(datagram[0]));
    }
    if datagram[1] != MESSAGE_TYPE_GPDU {
        return Err(DecodeError::UnexpectedMessageType(datagram[1]));
    }

    let payload = &datagram[HEADER_LEN..];
    let declared = u16::from_be_bytes([datagram[2], datagram[3]]);
    if length_check == LengthCheck::Strict && declared as usize != payload.len() {
        return Err(DecodeError::LengthMismatch {
            declared,
            actual: payload.len(),
        });
    }

    let teid = Teid(u32::from_be_bytes([
        datagram[4],
        datagram[5],
        datagram[6],
        datagram[7],
    ]));
    Ok((teid, payload))
}
