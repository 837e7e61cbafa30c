use super::block;
use super::session::Session;
use crate::error::Result;
use crate::iface::RECV_BUF_LEN;
use crate::network::icmp::{build_packet, parse_datagram, ICMP_TYPE_ECHO_REPLY};
use std::io;
use std::thread;
use std::time::{Duration, Instant};

/// Receiving role
///
/// Accepts only echo packets carrying the session identifier and the next
/// expected sequence number, acknowledging each with an echo reply. There
/// is no recovery from a lost block: the expected sequence never arrives
/// and every later poll times out.
pub struct Receiver<'s> {
    session: &'s mut Session,
    last_accept: Option<Instant>,
    buf: Vec<u8>,
}

impl<'s> Receiver<'s> {
    pub fn new(session: &'s mut Session) -> Self {
        Receiver {
            session,
            last_accept: None,
            buf: vec![0u8; RECV_BUF_LEN],
        }
    }

    pub fn session(&self) -> &Session {
        self.session
    }

    /// Wait for the next in-sequence block
    ///
    /// Returns an empty Vec when `timeout` passes without a packet, or when
    /// the session's interrupt is raised (which also closes the session).
    /// Mismatched packets are logged and skipped without a reply. At most
    /// one block is accepted per `timeout` interval. If the echo reply
    /// cannot be sent the block is not accepted and the sequence is left
    /// where it was.
    pub fn receive_block(&mut self, timeout: Duration) -> Result<Vec<u8>> {
        loop {
            if self.close_if_interrupted() {
                return Ok(Vec::new());
            }
            self.wait_cooldown(timeout);
            if self.close_if_interrupted() {
                return Ok(Vec::new());
            }

            let polled = self.session.socket_mut()?.recv_from(&mut self.buf, timeout);
            let (len, src) = match polled {
                Ok(Some(received)) => received,
                Ok(None) => {
                    self.session
                        .logger()
                        .debug(format_args!("No packet within {:?}", timeout));
                    return Ok(Vec::new());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            let echo = match parse_datagram(&self.buf[..len]) {
                Some(echo) => echo,
                None => {
                    self.session.logger().debug(format_args!(
                        "Discarding {}-byte datagram from {}",
                        len, src
                    ));
                    continue;
                }
            };

            if self.session.config().verify_checksum && !echo.checksum_valid() {
                self.session.logger().warn(format_args!(
                    "Bad checksum on seq {} from {}",
                    echo.sequence, src
                ));
                continue;
            }

            let identifier = self.session.identifier();
            if echo.identifier != identifier {
                self.session.logger().warn(format_args!(
                    "Identifier mismatch: expected {}, got {} from {}",
                    identifier, echo.identifier, src
                ));
                continue;
            }

            let expected = self.session.peek_next_sequence();
            if echo.sequence != expected {
                self.session.logger().warn(format_args!(
                    "Sequence mismatch: expected {}, got {} from {}",
                    expected, echo.sequence, src
                ));
                continue;
            }

            // Advance only once the reply is out.
            let payload = echo.payload.to_vec();
            let reply = build_packet(ICMP_TYPE_ECHO_REPLY, identifier, expected, &payload);
            self.session.socket_mut()?.send_to(&reply, src)?;
            self.session.next_sequence();
            self.last_accept = Some(Instant::now());

            self.session.logger().debug(format_args!(
                "Accepted seq {} ({} bytes) from {}",
                expected,
                payload.len(),
                src
            ));
            return Ok(payload);
        }
    }

    fn close_if_interrupted(&mut self) -> bool {
        if !self.session.interrupt().is_raised() {
            return false;
        }
        self.session
            .logger()
            .info(format_args!("Interrupted, closing channel"));
        self.session.close();
        true
    }

    fn wait_cooldown(&self, cooldown: Duration) {
        if let Some(last) = self.last_accept {
            let elapsed = last.elapsed();
            if elapsed < cooldown {
                thread::sleep(cooldown - elapsed);
            }
        }
    }

    /// Receive the size block that opens a transfer
    ///
    /// Returns None if nothing arrived in time.
    pub fn receive_size(&mut self, timeout: Duration) -> Result<Option<u64>> {
        let size_block = self.receive_block(timeout)?;
        if size_block.is_empty() {
            return Ok(None);
        }

        let size = block::decode_size(&size_block)?;
        self.session
            .logger()
            .debug(format_args!("Expecting {} bytes", size));
        Ok(Some(size))
    }

    /// Collect blocks until `expected_size` bytes arrived or a poll comes
    /// back empty, then strip padding and undo the transport codec
    pub fn transfer(&mut self, expected_size: u64, timeout: Duration) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        while (data.len() as u64) < expected_size {
            let received = self.receive_block(timeout)?;
            if received.is_empty() {
                self.session.logger().warn(format_args!(
                    "Transfer stopped after {} of {} bytes",
                    data.len(),
                    expected_size
                ));
                break;
            }
            data.extend_from_slice(&received);
        }

        let decoded = self.session.codec().decode(block::unpad(&data))?;
        self.session
            .logger()
            .info(format_args!("Received {} bytes", decoded.len()));
        Ok(decoded)
    }

    /// Receive a whole transfer: size block first, then the data
    ///
    /// Returns an empty Vec if no size block arrived.
    pub fn receive(&mut self, timeout: Duration) -> Result<Vec<u8>> {
        match self.receive_size(timeout)? {
            Some(size) => self.transfer(size, timeout),
            None => Ok(Vec::new()),
        }
    }

    /// [`Receiver::receive`], interpreted in the codec's text encoding
    pub fn receive_text(&mut self, timeout: Duration) -> Result<String> {
        let data = self.receive(timeout)?;
        Ok(self.session.codec().text_encoding().decode(data)?)
    }
}
