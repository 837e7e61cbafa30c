use super::block;
use super::session::Session;
use crate::error::{ChannelError, Result};
use crate::iface::resolve_ipv4;
use crate::network::icmp::{build_packet, ICMP_TYPE_ECHO_REQUEST};
use std::net::Ipv4Addr;
use std::thread;
use std::time::Duration;

/// Summary of a completed [`Sender::transfer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReport {
    /// Payload length after transport encoding, before padding
    pub encoded_len: usize,
    /// Data blocks sent, not counting the size block
    pub blocks: usize,
    /// Sequence number of the size block
    pub first_sequence: u16,
    pub last_sequence: u16,
}

/// Sending role
///
/// Sends are fire-and-forget: nothing waits for the receiver's echo replies,
/// and a lost block is neither detected nor resent.
pub struct Sender<'s> {
    session: &'s mut Session,
}

impl<'s> Sender<'s> {
    pub fn new(session: &'s mut Session) -> Self {
        Sender { session }
    }

    pub fn session(&self) -> &Session {
        self.session
    }

    /// Send one block as an echo request stamped with the next sequence
    ///
    /// Short blocks are zero-padded to the block size. Returns the sequence
    /// number used.
    pub fn send_block(&mut self, data: &[u8], dst: Ipv4Addr) -> Result<u16> {
        let block_size = self.session.block_size();
        if data.len() > block_size {
            return Err(ChannelError::OversizedBlock {
                len: data.len(),
                block_size,
            });
        }
        // Fail before consuming a sequence slot.
        self.session.socket_mut()?;

        let padded;
        let payload = if data.len() == block_size {
            data
        } else {
            padded = block::pad(data, block_size);
            &padded[..]
        };

        let identifier = self.session.identifier();
        let sequence = self.session.next_sequence();
        let packet = build_packet(ICMP_TYPE_ECHO_REQUEST, identifier, sequence, payload);
        self.session.socket_mut()?.send_to(&packet, dst)?;

        self.session.logger().debug(format_args!(
            "Sent echo request id={} seq={} to {}",
            identifier, sequence, dst
        ));
        Ok(sequence)
    }

    /// Resolve `dst` and run [`Sender::transfer_to`]
    pub fn transfer(
        &mut self,
        payload: &[u8],
        dst: &str,
        inter_block_delay: Duration,
    ) -> Result<TransferReport> {
        let dst = resolve_ipv4(dst)?;
        self.transfer_to(payload, dst, inter_block_delay)
    }

    /// Encode, announce the size, then send every block in order
    ///
    /// `inter_block_delay` is slept between consecutive sends.
    pub fn transfer_to(
        &mut self,
        payload: &[u8],
        dst: Ipv4Addr,
        inter_block_delay: Duration,
    ) -> Result<TransferReport> {
        let block_size = self.session.block_size();
        let encoded = self.session.codec().encode(payload);

        let size_block = block::encode_size(encoded.len() as u64, block_size)?;
        let first_sequence = self.send_block(&size_block, dst)?;
        self.session.logger().debug(format_args!(
            "Announced {} bytes ({} codec)",
            encoded.len(),
            self.session.codec().name()
        ));

        let blocks = block::fragment(&encoded, block_size);
        let block_count = blocks.len();
        let mut last_sequence = first_sequence;
        for (i, data) in blocks.iter().enumerate() {
            if !inter_block_delay.is_zero() {
                thread::sleep(inter_block_delay);
            }
            last_sequence = self.send_block(data, dst)?;
            self.session
                .logger()
                .info(format_args!("Sent block {}/{}", i + 1, block_count));
        }

        Ok(TransferReport {
            encoded_len: encoded.len(),
            blocks: block_count,
            first_sequence,
            last_sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChannelConfig;
    use crate::iface::MemorySocket;
    use crate::logging::Logger;
    use crate::network::icmp::{parse_datagram, DATAGRAM_PAYLOAD_OFFSET};

    const LOCAL: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
    const PEER: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);

    fn open_session(config: ChannelConfig) -> (Session, MemorySocket) {
        let (local, peer) = MemorySocket::pair(LOCAL, PEER);
        let mut session = Session::new(config, Logger::discard()).unwrap();
        session.attach(Box::new(local)).unwrap();
        (session, peer)
    }

    #[test]
    fn test_send_block_stamps_next_sequence() {
        let (mut session, peer) = open_session(ChannelConfig::new().block_size(4).identifier(3));
        let mut sender = Sender::new(&mut session);

        assert_eq!(sender.send_block(b"abcd", PEER).unwrap(), 1);
        assert_eq!(sender.send_block(b"ef", PEER).unwrap(), 2);

        let datagrams = peer.drain();
        assert_eq!(datagrams.len(), 2);

        let first = parse_datagram(&datagrams[0]).unwrap();
        assert_eq!(first.msg_type(), ICMP_TYPE_ECHO_REQUEST);
        assert_eq!((first.identifier, first.sequence), (3, 1));
        assert_eq!(first.payload, b"abcd");
        assert!(first.checksum_valid());

        let second = parse_datagram(&datagrams[1]).unwrap();
        assert_eq!(second.sequence, 2);
        assert_eq!(second.payload, b"ef\x00\x00");
    }

    #[test]
    fn test_oversized_block_rejected_without_consuming_sequence() {
        let (mut session, _peer) = open_session(ChannelConfig::new().block_size(4));
        let mut sender = Sender::new(&mut session);

        assert!(matches!(
            sender.send_block(b"too long", PEER),
            Err(ChannelError::OversizedBlock {
                len: 8,
                block_size: 4
            })
        ));
        assert_eq!(session.sequence(), 0);
    }

    #[test]
    fn test_send_after_close_is_rejected() {
        let (mut session, _peer) = open_session(ChannelConfig::default());
        session.close();

        let mut sender = Sender::new(&mut session);
        assert!(matches!(sender.send_block(b"x", PEER), Err(ChannelError::Closed)));
        assert_eq!(session.sequence(), 0);
    }

    #[test]
    fn test_transfer_frames_size_then_blocks() {
        let (mut session, peer) = open_session(ChannelConfig::new().block_size(4));
        let report = Sender::new(&mut session)
            .transfer_to(b"hello", PEER, Duration::ZERO)
            .unwrap();

        assert_eq!(
            report,
            TransferReport {
                encoded_len: 5,
                blocks: 2,
                first_sequence: 1,
                last_sequence: 3,
            }
        );

        let payloads: Vec<Vec<u8>> = peer
            .drain()
            .iter()
            .map(|d| d[DATAGRAM_PAYLOAD_OFFSET..].to_vec())
            .collect();
        assert_eq!(
            payloads,
            vec![
                vec![0, 0, 0, 5],
                b"hell".to_vec(),
                b"o\x00\x00\x00".to_vec()
            ]
        );
    }

    #[test]
    fn test_transfer_encodes_before_sizing() {
        let config = ChannelConfig::new()
            .block_size(8)
            .codec("base64".parse().unwrap());
        let (mut session, peer) = open_session(config);
        let report = Sender::new(&mut session)
            .transfer_to(b"hello", PEER, Duration::ZERO)
            .unwrap();

        // "aGVsbG8=" is 8 bytes: one data block
        assert_eq!(report.encoded_len, 8);
        assert_eq!(report.blocks, 1);

        let datagrams = peer.drain();
        assert_eq!(parse_datagram(&datagrams[1]).unwrap().payload, b"aGVsbG8=");
    }

    #[test]
    fn test_size_overflow_is_precondition_failure() {
        let (mut session, peer) = open_session(ChannelConfig::new().block_size(1));
        let result = Sender::new(&mut session).transfer_to(&[1u8; 300], PEER, Duration::ZERO);

        assert!(matches!(result, Err(ChannelError::SizeOverflow { size: 300, .. })));
        assert!(peer.drain().is_empty());
    }
}
