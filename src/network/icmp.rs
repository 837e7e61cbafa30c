//! ICMP echo framing
//!
//! This module builds the crafted echo packets the channel sends and pulls
//! the identifier, sequence number and payload back out of received
//! datagrams.

use super::checksum;
use super::ipv4::IPV4_HEADER_LEN;
use byteorder::{BigEndian, ByteOrder};

/// ICMP header length in bytes
pub const ICMP_HEADER_LEN: usize = 8;

/// ICMP message types
pub const ICMP_TYPE_ECHO_REPLY: u8 = 0;
pub const ICMP_TYPE_ECHO_REQUEST: u8 = 8;

/// Offsets into a full received datagram. A 20-byte IPv4 header without
/// options always precedes the ICMP header.
pub const DATAGRAM_IDENTIFIER_OFFSET: usize = IPV4_HEADER_LEN + 4;
pub const DATAGRAM_SEQUENCE_OFFSET: usize = IPV4_HEADER_LEN + 6;
pub const DATAGRAM_PAYLOAD_OFFSET: usize = IPV4_HEADER_LEN + ICMP_HEADER_LEN;

/// ICMP echo header
///
/// Represents the standard 8-byte echo header as defined in RFC 792
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpHeader {
    pub msg_type: u8,  // ICMP message type
    pub msg_code: u8,  // Always 0 for echo
    pub checksum: u16, // ICMP checksum
    pub identifier: u16,
    pub sequence: u16,
}

impl IcmpHeader {
    /// Create an echo header with a zeroed checksum
    pub fn echo(msg_type: u8, identifier: u16, sequence: u16) -> Self {
        IcmpHeader {
            msg_type,
            msg_code: 0,
            checksum: 0,
            identifier,
            sequence,
        }
    }

    /// Parse ICMP header from byte slice
    ///
    /// Returns None if the data is too short to contain a header
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < ICMP_HEADER_LEN {
            return None;
        }

        Some(IcmpHeader {
            msg_type: data[0],
            msg_code: data[1],
            checksum: BigEndian::read_u16(&data[2..4]),
            identifier: BigEndian::read_u16(&data[4..6]),
            sequence: BigEndian::read_u16(&data[6..8]),
        })
    }

    /// Convert ICMP header to bytes
    pub fn to_bytes(&self) -> [u8; ICMP_HEADER_LEN] {
        let mut bytes = [0u8; ICMP_HEADER_LEN];
        bytes[0] = self.msg_type;
        bytes[1] = self.msg_code;
        BigEndian::write_u16(&mut bytes[2..4], self.checksum);
        BigEndian::write_u16(&mut bytes[4..6], self.identifier);
        BigEndian::write_u16(&mut bytes[6..8], self.sequence);
        bytes
    }
}

/// Build a complete ICMP message ready for a raw socket
///
/// The checksum is computed over the header (checksum field zeroed) and the
/// payload, then spliced into bytes 2-3.
pub fn build_packet(msg_type: u8, identifier: u16, sequence: u16, payload: &[u8]) -> Vec<u8> {
    let header = IcmpHeader::echo(msg_type, identifier, sequence);

    let mut packet = Vec::with_capacity(ICMP_HEADER_LEN + payload.len());
    packet.extend_from_slice(&header.to_bytes());
    packet.extend_from_slice(payload);

    let sum = checksum(&packet);
    BigEndian::write_u16(&mut packet[2..4], sum);
    packet
}

/// An echo message as seen inside a received IPv4 datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoDatagram<'a> {
    pub identifier: u16,
    pub sequence: u16,
    pub payload: &'a [u8],
    header: IcmpHeader,
    icmp: &'a [u8],
}

impl<'a> EchoDatagram<'a> {
    pub fn header(&self) -> &IcmpHeader {
        &self.header
    }

    /// The ICMP portion of the datagram, header included
    pub fn icmp_bytes(&self) -> &'a [u8] {
        self.icmp
    }

    pub fn msg_type(&self) -> u8 {
        self.header.msg_type
    }

    /// Whether the ICMP checksum of the message is intact
    pub fn checksum_valid(&self) -> bool {
        super::verify_checksum(self.icmp)
    }
}

/// Parse a full datagram as delivered by a raw ICMP socket
///
/// Fields are read at fixed offsets, so IP options are not supported.
/// Returns None if the datagram cannot hold both headers.
pub fn parse_datagram(datagram: &[u8]) -> Option<EchoDatagram<'_>> {
    if datagram.len() < DATAGRAM_PAYLOAD_OFFSET {
        return None;
    }
    let icmp = &datagram[IPV4_HEADER_LEN..];
    let header = IcmpHeader::from_bytes(icmp)?;

    Some(EchoDatagram {
        identifier: header.identifier,
        sequence: header.sequence,
        payload: &datagram[DATAGRAM_PAYLOAD_OFFSET..],
        header,
        icmp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::verify_checksum;

    #[test]
    fn test_build_echo_request() {
        let packet = build_packet(ICMP_TYPE_ECHO_REQUEST, 0x1234, 7, b"abcd");

        assert_eq!(packet.len(), ICMP_HEADER_LEN + 4);
        assert_eq!(packet[0], ICMP_TYPE_ECHO_REQUEST);
        assert_eq!(packet[1], 0);
        assert_eq!(&packet[4..6], &[0x12, 0x34]);
        assert_eq!(&packet[6..8], &[0x00, 0x07]);
        assert_eq!(&packet[8..], b"abcd");
        assert!(verify_checksum(&packet));
    }

    #[test]
    fn test_checksum_matches_zeroed_header() {
        let packet = build_packet(ICMP_TYPE_ECHO_REQUEST, 1, 1, &[0u8; 32]);
        let header = IcmpHeader::from_bytes(&packet).unwrap();

        let mut zeroed = packet.clone();
        zeroed[2] = 0;
        zeroed[3] = 0;
        assert_eq!(header.checksum, checksum(&zeroed));
    }

    #[test]
    fn test_header_roundtrip() {
        let header = IcmpHeader {
            msg_type: ICMP_TYPE_ECHO_REPLY,
            msg_code: 0,
            checksum: 0xBEEF,
            identifier: 9,
            sequence: 65535,
        };
        let parsed = IcmpHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
        assert!(IcmpHeader::from_bytes(&[0u8; ICMP_HEADER_LEN - 1]).is_none());
    }

    #[test]
    fn test_parse_datagram_fixed_offsets() {
        let mut datagram = vec![0u8; IPV4_HEADER_LEN];
        datagram[0] = 0x45;
        datagram.extend_from_slice(&build_packet(ICMP_TYPE_ECHO_REQUEST, 42, 3, b"hell"));

        assert_eq!(&datagram[DATAGRAM_IDENTIFIER_OFFSET..DATAGRAM_SEQUENCE_OFFSET], &[0, 42]);
        assert_eq!(&datagram[DATAGRAM_SEQUENCE_OFFSET..DATAGRAM_PAYLOAD_OFFSET], &[0, 3]);

        let echo = parse_datagram(&datagram).unwrap();
        assert_eq!(echo.identifier, 42);
        assert_eq!(echo.sequence, 3);
        assert_eq!(echo.payload, b"hell");
        assert_eq!(echo.msg_type(), ICMP_TYPE_ECHO_REQUEST);
        assert_eq!(echo.header().msg_code, 0);
        assert!(echo.checksum_valid());
    }

    #[test]
    fn test_parse_datagram_too_short() {
        assert!(parse_datagram(&[0u8; DATAGRAM_PAYLOAD_OFFSET - 1]).is_none());

        let echo = parse_datagram(&[0u8; DATAGRAM_PAYLOAD_OFFSET]).unwrap();
        assert!(echo.payload.is_empty());
    }

    #[test]
    fn test_corrupted_payload_fails_checksum() {
        let mut datagram = vec![0u8; IPV4_HEADER_LEN];
        datagram.extend_from_slice(&build_packet(ICMP_TYPE_ECHO_REQUEST, 1, 1, b"data"));
        let last = datagram.len() - 1;
        datagram[last] ^= 0xFF;

        assert!(!parse_datagram(&datagram).unwrap().checksum_valid());
    }
}
