//! Socket abstraction layer
//!
//! The channel talks to the network through [`IcmpSocket`]:
//! - [`raw::RawIcmpSocket`]: a kernel raw ICMP socket (needs CAP_NET_RAW)
//! - [`memory::MemorySocket`]: a linked in-process pair for tests and dry runs

pub mod memory;
pub mod raw;

pub use memory::MemorySocket;
pub use raw::RawIcmpSocket;

use crate::error::{ChannelError, Result};
use std::io;
use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};
use std::time::Duration;

/// Largest datagram a receive will read
pub const RECV_BUF_LEN: usize = 65535;

/// A socket that sends ICMP messages and receives whole IPv4 datagrams
pub trait IcmpSocket {
    /// Send one ICMP message (header included) to `dst`
    fn send_to(&mut self, packet: &[u8], dst: Ipv4Addr) -> io::Result<usize>;

    /// Wait up to `timeout` for one datagram
    ///
    /// Returns `Ok(None)` when the timeout elapses. A signal arriving during
    /// the wait surfaces as `ErrorKind::Interrupted`.
    fn recv_from(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> io::Result<Option<(usize, Ipv4Addr)>>;
}

impl<T: IcmpSocket + ?Sized> IcmpSocket for Box<T> {
    fn send_to(&mut self, packet: &[u8], dst: Ipv4Addr) -> io::Result<usize> {
        (**self).send_to(packet, dst)
    }

    fn recv_from(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> io::Result<Option<(usize, Ipv4Addr)>> {
        (**self).recv_from(buf, timeout)
    }
}

/// Resolve a host name or dotted quad to an IPv4 address
///
/// ICMP has no ports, so only the address part of the lookup is used.
pub fn resolve_ipv4(host: &str) -> Result<Ipv4Addr> {
    if let Ok(addr) = host.parse::<Ipv4Addr>() {
        return Ok(addr);
    }

    let addrs = (host, 0)
        .to_socket_addrs()
        .map_err(|_| ChannelError::Unresolvable(host.to_string()))?;

    addrs
        .filter_map(|addr| match addr.ip() {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(|| ChannelError::Unresolvable(host.to_string()))
}
