use super::sequence::SequenceCounter;
use crate::config::ChannelConfig;
use crate::error::{ChannelError, Result};
use crate::iface::{IcmpSocket, RawIcmpSocket};
use crate::logging::Logger;
use crate::signal::Interrupt;
use crate::transport::TransportCodec;
use std::io;

/// Lifecycle of a session's socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    SocketOpen,
    /// Terminal
    Closed,
}

/// Shared channel state for one process
///
/// Owns the socket exclusively, along with the identifier, the sequence
/// counter and the transport codec. [`super::Sender`] and
/// [`super::Receiver`] borrow a session to act on it.
pub struct Session {
    config: ChannelConfig,
    socket: Option<Box<dyn IcmpSocket>>,
    state: SessionState,
    sequence: SequenceCounter,
    codec: Box<dyn TransportCodec>,
    interrupt: Interrupt,
    log: Logger,
}

impl Session {
    pub fn new(config: ChannelConfig, log: Logger) -> Result<Self> {
        config.validate()?;
        let codec = config.codec.build();

        Ok(Session {
            config,
            socket: None,
            state: SessionState::Uninitialized,
            sequence: SequenceCounter::new(),
            codec,
            interrupt: Interrupt::new(),
            log,
        })
    }

    /// Open a kernel raw ICMP socket bound to the configured address
    pub fn open_raw(&mut self) -> Result<()> {
        let socket = RawIcmpSocket::open(Some(self.config.bind_addr)).map_err(|e| {
            match e.kind() {
                io::ErrorKind::PermissionDenied => ChannelError::PermissionDenied,
                _ => ChannelError::Io(e),
            }
        })?;
        self.attach(Box::new(socket))
    }

    /// Take exclusive ownership of an already open socket
    pub fn attach(&mut self, socket: Box<dyn IcmpSocket>) -> Result<()> {
        match self.state {
            SessionState::Closed => return Err(ChannelError::Closed),
            SessionState::SocketOpen => {
                return Err(ChannelError::InvalidConfiguration(
                    "session already owns a socket".to_string(),
                ))
            }
            SessionState::Uninitialized => {}
        }

        self.socket = Some(socket);
        self.state = SessionState::SocketOpen;
        self.log.info(format_args!("Socket initialized"));
        Ok(())
    }

    /// Release the socket; the session accepts no further I/O
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        let had_socket = self.socket.take().is_some();
        self.state = SessionState::Closed;
        if had_socket {
            self.log.info(format_args!("Socket closed"));
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::SocketOpen
    }

    pub(crate) fn socket_mut(&mut self) -> Result<&mut dyn IcmpSocket> {
        match self.state {
            SessionState::Uninitialized => Err(ChannelError::NotOpen),
            SessionState::Closed => Err(ChannelError::Closed),
            SessionState::SocketOpen => match self.socket.as_mut() {
                Some(socket) => Ok(&mut **socket),
                None => Err(ChannelError::NotOpen),
            },
        }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn identifier(&self) -> u16 {
        self.config.identifier
    }

    pub fn block_size(&self) -> usize {
        self.config.block_size as usize
    }

    /// Current sequence value, without advancing
    pub fn sequence(&self) -> u16 {
        self.sequence.current()
    }

    /// The sequence value the next block will carry
    pub fn peek_next_sequence(&self) -> u16 {
        self.sequence.peek_next()
    }

    /// Advance the sequence counter and return the new value
    pub fn next_sequence(&mut self) -> u16 {
        self.sequence.next()
    }

    pub fn codec(&self) -> &dyn TransportCodec {
        self.codec.as_ref()
    }

    /// Replace the codec selected by the configuration
    pub fn set_codec(&mut self, codec: Box<dyn TransportCodec>) {
        self.codec = codec;
    }

    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    pub fn set_interrupt(&mut self, interrupt: Interrupt) {
        self.interrupt = interrupt;
    }

    pub fn logger(&self) -> &Logger {
        &self.log
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
