use super::IcmpSocket;
use std::io;
use std::mem;
use std::net::Ipv4Addr;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::time::Duration;

use libc::{
    bind, c_void, recvfrom, sendto, setsockopt, sockaddr, sockaddr_in, socket, socklen_t, timeval,
    AF_INET, IPPROTO_ICMP, SOCK_RAW, SOL_SOCKET, SO_RCVTIMEO,
};

/// Kernel raw ICMP socket
///
/// Sends bare ICMP messages (the kernel adds the IPv4 header) and receives
/// every inbound ICMP datagram with its IPv4 header still attached. The fd
/// is closed on drop.
#[derive(Debug)]
pub struct RawIcmpSocket {
    fd: OwnedFd,
    read_timeout: Option<Duration>,
}

impl RawIcmpSocket {
    /// Open a raw socket, optionally bound to a local address
    pub fn open(bind_addr: Option<Ipv4Addr>) -> io::Result<Self> {
        let fd = unsafe { socket(AF_INET, SOCK_RAW, IPPROTO_ICMP) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };

        if let Some(addr) = bind_addr {
            let sa = to_sockaddr(addr);
            let ret = unsafe {
                bind(
                    fd.as_raw_fd(),
                    &sa as *const sockaddr_in as *const sockaddr,
                    mem::size_of::<sockaddr_in>() as socklen_t,
                )
            };
            if ret < 0 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok(RawIcmpSocket {
            fd,
            read_timeout: None,
        })
    }

    pub fn fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        if self.read_timeout == Some(timeout) {
            return Ok(());
        }

        // A zero timeval means "block forever", so round up to 1us.
        let timeout = timeout.max(Duration::from_micros(1));
        let tv = timeval {
            tv_sec: timeout.as_secs() as libc::time_t,
            tv_usec: timeout.subsec_micros() as libc::suseconds_t,
        };
        let ret = unsafe {
            setsockopt(
                self.fd(),
                SOL_SOCKET,
                SO_RCVTIMEO,
                &tv as *const timeval as *const c_void,
                mem::size_of::<timeval>() as socklen_t,
            )
        };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }

        self.read_timeout = Some(timeout);
        Ok(())
    }
}

impl IcmpSocket for RawIcmpSocket {
    fn send_to(&mut self, packet: &[u8], dst: Ipv4Addr) -> io::Result<usize> {
        let sa = to_sockaddr(dst);
        let ret = unsafe {
            sendto(
                self.fd(),
                packet.as_ptr() as *const c_void,
                packet.len(),
                0,
                &sa as *const sockaddr_in as *const sockaddr,
                mem::size_of::<sockaddr_in>() as socklen_t,
            )
        };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(ret as usize)
    }

    fn recv_from(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> io::Result<Option<(usize, Ipv4Addr)>> {
        self.set_read_timeout(timeout)?;

        let mut sa: sockaddr_in = unsafe { mem::zeroed() };
        let mut len = mem::size_of::<sockaddr_in>() as socklen_t;
        let ret = unsafe {
            recvfrom(
                self.fd(),
                buf.as_mut_ptr() as *mut c_void,
                buf.len(),
                0,
                &mut sa as *mut sockaddr_in as *mut sockaddr,
                &mut len,
            )
        };
        if ret < 0 {
            let err = io::Error::last_os_error();
            return match err.kind() {
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Ok(None),
                _ => Err(err),
            };
        }

        let src = Ipv4Addr::from(u32::from_be(sa.sin_addr.s_addr));
        Ok(Some((ret as usize, src)))
    }
}

fn to_sockaddr(addr: Ipv4Addr) -> sockaddr_in {
    let mut sa: sockaddr_in = unsafe { mem::zeroed() };
    sa.sin_family = AF_INET as libc::sa_family_t;
    sa.sin_port = 0;
    sa.sin_addr.s_addr = u32::from(addr).to_be();
    sa
}
