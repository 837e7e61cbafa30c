//! IPv4 header model
//!
//! Raw ICMP sockets hand the receiver whole IPv4 datagrams. The channel only
//! needs the 20-byte, option-free layout: the fixed offsets in
//! [`super::icmp`] are derived from it, and the in-memory socket uses it to
//! frame outgoing ICMP messages the way the kernel would.

use super::checksum;
use byteorder::{BigEndian, ByteOrder};
use std::net::Ipv4Addr;

pub const IPV4_HEADER_LEN: usize = 20;
const IPV4_VERSION: u8 = 4;
const DEFAULT_IHL: u8 = 5; // 5 * 4 = 20 bytes, no options
const DEFAULT_TTL: u8 = 64;

/// IPv4 packet header structure
///
/// Represents the standard 20-byte IPv4 header as defined in RFC 791
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Header {
    pub version: u8,
    pub ihl: u8, // Internet Header Length in 32-bit words
    pub tos: u8,
    pub total_len: u16,
    pub id: u16,
    pub flags_frag_offset: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub checksum: u16,
    pub src_addr: Ipv4Addr,
    pub dst_addr: Ipv4Addr,
}

impl Ipv4Header {
    /// Create an option-free header for `payload_len` bytes of payload
    ///
    /// The checksum is left at zero until [`Ipv4Header::frame`] fills it in.
    pub fn new_simple(
        protocol: u8,
        src_addr: Ipv4Addr,
        dst_addr: Ipv4Addr,
        payload_len: u16,
    ) -> Self {
        Ipv4Header {
            version: IPV4_VERSION,
            ihl: DEFAULT_IHL,
            tos: 0,
            total_len: IPV4_HEADER_LEN as u16 + payload_len,
            id: 0,
            flags_frag_offset: flags::DONT_FRAGMENT,
            ttl: DEFAULT_TTL,
            protocol,
            checksum: 0,
            src_addr,
            dst_addr,
        }
    }

    /// Parse IPv4 header from byte slice
    ///
    /// Returns None if the data is too short or if the version field is not 4
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < IPV4_HEADER_LEN {
            return None;
        }

        let version = (data[0] & 0xF0) >> 4;
        if version != IPV4_VERSION {
            return None;
        }

        Some(Ipv4Header {
            version,
            ihl: data[0] & 0x0F,
            tos: data[1],
            total_len: BigEndian::read_u16(&data[2..4]),
            id: BigEndian::read_u16(&data[4..6]),
            flags_frag_offset: BigEndian::read_u16(&data[6..8]),
            ttl: data[8],
            protocol: data[9],
            checksum: BigEndian::read_u16(&data[10..12]),
            src_addr: Ipv4Addr::new(data[12], data[13], data[14], data[15]),
            dst_addr: Ipv4Addr::new(data[16], data[17], data[18], data[19]),
        })
    }

    /// Convert IPv4 header to bytes
    pub fn to_bytes(&self) -> [u8; IPV4_HEADER_LEN] {
        let mut bytes = [0u8; IPV4_HEADER_LEN];
        bytes[0] = (self.version << 4) | self.ihl;
        bytes[1] = self.tos;
        BigEndian::write_u16(&mut bytes[2..4], self.total_len);
        BigEndian::write_u16(&mut bytes[4..6], self.id);
        BigEndian::write_u16(&mut bytes[6..8], self.flags_frag_offset);
        bytes[8] = self.ttl;
        bytes[9] = self.protocol;
        BigEndian::write_u16(&mut bytes[10..12], self.checksum);
        bytes[12..16].copy_from_slice(&self.src_addr.octets());
        bytes[16..20].copy_from_slice(&self.dst_addr.octets());
        bytes
    }

    /// Build a complete datagram carrying `payload`
    ///
    /// Total length and header checksum are recomputed.
    pub fn frame(&self, payload: &[u8]) -> Vec<u8> {
        let mut header = self.clone();
        header.total_len = (IPV4_HEADER_LEN + payload.len()) as u16;
        header.checksum = 0;
        header.checksum = checksum(&header.to_bytes());

        let mut datagram = Vec::with_capacity(header.total_len as usize);
        datagram.extend_from_slice(&header.to_bytes());
        datagram.extend_from_slice(payload);
        datagram
    }
}

/// IPv4 protocol constants
pub mod protocol {
    pub const ICMP: u8 = 1;
}

/// IPv4 flags constants
pub mod flags {
    pub const DONT_FRAGMENT: u16 = 0x4000;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::verify_checksum;

    #[test]
    fn test_frame_datagram() {
        let src = Ipv4Addr::new(10, 0, 0, 1);
        let dst = Ipv4Addr::new(10, 0, 0, 2);
        let header = Ipv4Header::new_simple(protocol::ICMP, src, dst, 0);

        let datagram = header.frame(&[1, 2, 3, 4]);
        assert_eq!(datagram.len(), IPV4_HEADER_LEN + 4);
        assert!(verify_checksum(&datagram[..IPV4_HEADER_LEN]));

        let parsed = Ipv4Header::from_bytes(&datagram).unwrap();
        assert_eq!(parsed.ihl, 5);
        assert_eq!(parsed.total_len, 24);
        assert_eq!(parsed.protocol, protocol::ICMP);
        assert_eq!(parsed.src_addr, src);
        assert_eq!(parsed.dst_addr, dst);
        assert_eq!(&datagram[IPV4_HEADER_LEN..], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_rejects_non_ipv4() {
        let mut data = [0u8; IPV4_HEADER_LEN];
        data[0] = 0x65;
        assert!(Ipv4Header::from_bytes(&data).is_none());
        assert!(Ipv4Header::from_bytes(&data[..10]).is_none());
    }
}
