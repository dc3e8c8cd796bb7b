//! Transport envelopes.
//!
//! Every UDP datagram carries exactly one envelope; there is no other framing.
//! Field byte order is mixed, and deliberately so: lengths and sequence numbers
//! of outbound envelopes are little-endian, while the sequence fragment of an
//! inbound response is read big-endian.
use crate::{Error, Result};
use binrw::{binrw, BinRead, BinWrite};
use std::io::Cursor;

/// Header of a [CommandPacket] when none is given.
pub const DEFAULT_COMMAND_HEADER: [u8; 2] = [0x01, 0x00];

/// Control payload which resets the camera's session.
pub const CONTROL_RESET: [u8; 1] = [0x01];

/// Session control envelope, sent by a camera reset.
///
/// ## Packet format
///
/// * `02 00`: magic
/// * `u16` LE: payload length
/// * `u32` LE: sequence number
/// * payload
#[binrw]
#[derive(Debug, Clone, PartialEq, Eq)]
#[brw(little, magic = b"\x02\x00")]
pub struct ControlPacket {
    #[br(temp)]
    #[bw(try_calc = u16::try_from(payload.len()))]
    length: u16,

    pub sequence_number: u32,

    #[br(count = length)]
    pub payload: Vec<u8>,
}

impl ControlPacket {
    pub fn new(sequence_number: u32, payload: Vec<u8>) -> Result<Self> {
        if payload.len() > usize::from(u16::MAX) {
            error!("control payload too long: {} bytes", payload.len());
            return Err(Error::InvalidLength);
        }

        Ok(Self {
            sequence_number,
            payload,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::with_capacity(8 + self.payload.len()));
        self.write(&mut out)?;
        Ok(out.into_inner())
    }

    pub fn from_bytes(b: &[u8]) -> Result<Self> {
        Ok(Self::read(&mut Cursor::new(b))?)
    }
}

/// Envelope for a VISCA command.
///
/// ## Packet format
///
/// * 2 bytes: [header][Self::header], usually [DEFAULT_COMMAND_HEADER]
/// * `00`
/// * `u8`: payload length
/// * `u32` LE: sequence number
/// * payload, including its `FF` terminator
#[binrw]
#[derive(Debug, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct CommandPacket {
    pub header: [u8; 2],

    #[br(temp)]
    #[bw(try_calc = u8::try_from(payload.len()))]
    #[brw(magic = 0x00u8)]
    length: u8,

    pub sequence_number: u32,

    #[br(count = length)]
    pub payload: Vec<u8>,
}

impl CommandPacket {
    /// Largest payload that fits the single-byte length field.
    pub const MAX_PAYLOAD_LENGTH: usize = u8::MAX as usize;

    /// Creates a packet, with [DEFAULT_COMMAND_HEADER] if `header` is `None`.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidLength] when `payload` is longer than
    ///   [MAX_PAYLOAD_LENGTH][Self::MAX_PAYLOAD_LENGTH]
    pub fn new(header: Option<[u8; 2]>, sequence_number: u32, payload: Vec<u8>) -> Result<Self> {
        if payload.len() > Self::MAX_PAYLOAD_LENGTH {
            error!("command payload too long: {} bytes", payload.len());
            return Err(Error::InvalidLength);
        }

        Ok(Self {
            header: header.unwrap_or(DEFAULT_COMMAND_HEADER),
            sequence_number,
            payload,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::with_capacity(8 + self.payload.len()));
        self.write(&mut out)?;
        Ok(out.into_inner())
    }

    pub fn from_bytes(b: &[u8]) -> Result<Self> {
        Ok(Self::read(&mut Cursor::new(b))?)
    }
}

/// Fixed-position fields at the start of a response.
#[derive(BinRead)]
#[br(big)]
struct ResponsePrefix {
    header: [u8; 2],

    #[br(map = |b: [u8; 3]| u32::from_be_bytes([0, b[0], b[1], b[2]]))]
    sequence_fragment: u32,
}

/// Datagram received from the camera.
///
/// Only the sequence fragment is decoded; everything else is kept as raw bytes
/// for diagnostics.
///
/// Observed examples:
///
/// * `0111 0003d3 0000009041ff`: command accepted
/// * `0200 0002ba 0000000f01`: command rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDatagram {
    /// Bytes 0-1, not interpreted.
    pub header: [u8; 2],
    /// Bytes 2-4 as a big-endian 24-bit integer.
    pub sequence_fragment: u32,
    /// The entire datagram.
    pub raw: Vec<u8>,
}

impl ResponseDatagram {
    pub const MIN_LENGTH: usize = 5;

    /// Parses a datagram.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidLength] when `raw` is shorter than
    ///   [MIN_LENGTH][Self::MIN_LENGTH]
    pub fn parse(raw: &[u8]) -> Result<Self> {
        if raw.len() < Self::MIN_LENGTH {
            return Err(Error::InvalidLength);
        }

        let prefix = ResponsePrefix::read(&mut Cursor::new(raw))?;
        Ok(Self {
            header: prefix.header,
            sequence_fragment: prefix.sequence_fragment,
            raw: raw.to_vec(),
        })
    }

    /// Bytes after the sequence fragment, empty if `raw` is too short.
    pub fn trailer(&self) -> &[u8] {
        self.raw.get(Self::MIN_LENGTH..).unwrap_or_default()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn control_reset() -> Result<()> {
        let expected = hex::decode("020001000100000001")?;
        let pkt = ControlPacket::new(1, CONTROL_RESET.to_vec())?;
        assert_eq!(expected, pkt.to_bytes()?);
        assert_eq!(pkt, ControlPacket::from_bytes(&expected)?);
        Ok(())
    }

    #[test]
    fn control_little_endian() -> Result<()> {
        let pkt = ControlPacket::new(0x0403_0201, vec![0xaa, 0xbb])?;
        assert_eq!(hex::decode("0200020001020304aabb")?, pkt.to_bytes()?);
        Ok(())
    }

    #[test]
    fn command() -> Result<()> {
        let payload = hex::decode("8101043f0107ff")?;
        let pkt = CommandPacket::new(None, 0x0102, payload.clone())?;
        let expected = hex::decode(concat!("0100000702010000", "8101043f0107ff"))?;
        assert_eq!(expected, pkt.to_bytes()?);

        let read = CommandPacket::from_bytes(&expected)?;
        assert_eq!(DEFAULT_COMMAND_HEADER, read.header);
        assert_eq!(0x0102, read.sequence_number);
        assert_eq!(payload, read.payload);
        Ok(())
    }

    #[test]
    fn command_header() -> Result<()> {
        let pkt = CommandPacket::new(Some([0x01, 0x10]), 1, vec![0x81, 0x09, 0x00, 0x02, 0xff])?;
        assert_eq!(hex::decode("011000050100000081090002ff")?, pkt.to_bytes()?);
        Ok(())
    }

    #[test]
    fn command_too_long() {
        assert!(matches!(
            CommandPacket::new(None, 1, vec![0; 256]),
            Err(Error::InvalidLength)
        ));
        assert!(CommandPacket::new(None, 1, vec![0; 255]).is_ok());
    }

    #[test]
    fn command_bad_padding() -> Result<()> {
        let cmd = hex::decode(concat!("0100010501000000", "81010604ff"))?;
        assert!(CommandPacket::from_bytes(&cmd).is_err());
        Ok(())
    }

    #[test]
    fn responses() -> Result<()> {
        let ok = ResponseDatagram::parse(&hex::decode("01110003d30000009041ff")?)?;
        assert_eq!([0x01, 0x11], ok.header);
        assert_eq!(0x3d3, ok.sequence_fragment);
        assert_eq!(hex::decode("0000009041ff")?, ok.trailer());

        let nack = ResponseDatagram::parse(&hex::decode("02000002ba0000000f01")?)?;
        assert_eq!(0x2ba, nack.sequence_fragment);

        let max = ResponseDatagram::parse(&hex::decode("0000ffffff")?)?;
        assert_eq!(0xff_ffff, max.sequence_fragment);
        assert!(max.trailer().is_empty());

        assert!(matches!(
            ResponseDatagram::parse(&[0x01, 0x11, 0x00, 0x03]),
            Err(Error::InvalidLength)
        ));
        Ok(())
    }

    #[test]
    fn short_trailer() {
        let resp = ResponseDatagram {
            header: [0x01, 0x11],
            sequence_fragment: 0,
            raw: vec![0x01, 0x11],
        };
        assert!(resp.trailer().is_empty());
    }
}
