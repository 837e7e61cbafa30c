//! In-memory linked sockets
//!
//! Two endpoints joined by channels. Each outgoing ICMP message is framed
//! in an option-free IPv4 header carrying the sender's address, so the
//! receiving end sees exactly what a raw socket would hand it and reads the
//! source back out of that header.

use super::IcmpSocket;
use crate::network::ipv4::{protocol, Ipv4Header};
use std::io;
use std::net::Ipv4Addr;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

#[derive(Debug)]
pub struct MemorySocket {
    local_addr: Ipv4Addr,
    peer_addr: Ipv4Addr,
    peer_tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
    sent: usize,
}

impl MemorySocket {
    /// Create two sockets addressed `a` and `b` that deliver to each other
    pub fn pair(a: Ipv4Addr, b: Ipv4Addr) -> (MemorySocket, MemorySocket) {
        let (a_tx, a_rx) = mpsc::channel();
        let (b_tx, b_rx) = mpsc::channel();

        let sock_a = MemorySocket {
            local_addr: a,
            peer_addr: b,
            peer_tx: b_tx,
            rx: a_rx,
            sent: 0,
        };
        let sock_b = MemorySocket {
            local_addr: b,
            peer_addr: a,
            peer_tx: a_tx,
            rx: b_rx,
            sent: 0,
        };
        (sock_a, sock_b)
    }

    pub fn local_addr(&self) -> Ipv4Addr {
        self.local_addr
    }

    /// Number of messages this endpoint has sent
    pub fn sent(&self) -> usize {
        self.sent
    }

    /// Datagrams waiting to be received, without blocking
    pub fn drain(&self) -> Vec<Vec<u8>> {
        self.rx.try_iter().collect()
    }
}

impl IcmpSocket for MemorySocket {
    fn send_to(&mut self, packet: &[u8], dst: Ipv4Addr) -> io::Result<usize> {
        self.sent += 1;
        if dst != self.peer_addr {
            // No route: the message is silently lost, as on a real network.
            return Ok(packet.len());
        }

        let header = Ipv4Header::new_simple(protocol::ICMP, self.local_addr, dst, 0);
        self.peer_tx
            .send(header.frame(packet))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "peer socket dropped"))?;
        Ok(packet.len())
    }

    fn recv_from(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> io::Result<Option<(usize, Ipv4Addr)>> {
        match self.rx.recv_timeout(timeout) {
            Ok(datagram) => {
                let header = Ipv4Header::from_bytes(&datagram).ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidData, "datagram without IPv4 header")
                })?;
                let len = datagram.len().min(buf.len());
                buf[..len].copy_from_slice(&datagram[..len]);
                Ok(Some((len, header.src_addr)))
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::ipv4::IPV4_HEADER_LEN;

    const A: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
    const B: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);

    #[test]
    fn test_delivers_framed_datagram() {
        let (mut a, mut b) = MemorySocket::pair(A, B);
        a.send_to(&[8, 0, 0, 0, 0, 1, 0, 1], B).unwrap();

        let mut buf = [0u8; 64];
        let (len, src) = b.recv_from(&mut buf, Duration::from_millis(10)).unwrap().unwrap();
        assert_eq!(src, A);
        assert_eq!(len, IPV4_HEADER_LEN + 8);

        let header = Ipv4Header::from_bytes(&buf[..len]).unwrap();
        assert_eq!(header.src_addr, A);
        assert_eq!(header.dst_addr, B);
        assert_eq!(&buf[IPV4_HEADER_LEN..len], &[8, 0, 0, 0, 0, 1, 0, 1]);
    }

    #[test]
    fn test_timeout_returns_none() {
        let (_a, mut b) = MemorySocket::pair(A, B);
        let mut buf = [0u8; 64];
        assert!(b.recv_from(&mut buf, Duration::from_millis(5)).unwrap().is_none());
    }

    #[test]
    fn test_unrouted_destination_is_dropped() {
        let (mut a, b) = MemorySocket::pair(A, B);
        a.send_to(&[0u8; 8], Ipv4Addr::new(192, 0, 2, 1)).unwrap();
        assert_eq!(a.sent(), 1);
        assert!(b.drain().is_empty());
    }
}
