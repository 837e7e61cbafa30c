use crate::error::{ChannelError, Result};
use crate::transport::{CodecSelection, TextEncoding};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Largest ICMP payload a single IPv4 datagram can carry
pub const MAX_BLOCK_SIZE: u32 = 65535 - 20 - 8;

pub const DEFAULT_BLOCK_SIZE: u32 = 32;
pub const DEFAULT_IDENTIFIER: u16 = 1;
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(1);

/// Per-session channel settings
///
/// Sender and receiver must agree on `block_size`, `identifier` and `codec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub block_size: u32,
    /// 0 is reserved for "unset"
    pub identifier: u16,
    pub inter_block_delay: Duration,
    pub recv_timeout: Duration,
    pub bind_addr: Ipv4Addr,
    pub codec: CodecSelection,
    /// Discard received packets whose ICMP checksum does not verify
    pub verify_checksum: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            identifier: DEFAULT_IDENTIFIER,
            inter_block_delay: Duration::ZERO,
            recv_timeout: DEFAULT_RECV_TIMEOUT,
            bind_addr: Ipv4Addr::UNSPECIFIED,
            codec: CodecSelection::None,
            verify_checksum: false,
        }
    }
}

impl ChannelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block_size(mut self, size: u32) -> Self {
        self.block_size = size;
        self
    }

    pub fn identifier(mut self, id: u16) -> Self {
        self.identifier = id;
        self
    }

    pub fn inter_block_delay(mut self, delay: Duration) -> Self {
        self.inter_block_delay = delay;
        self
    }

    pub fn recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = timeout;
        self
    }

    pub fn bind_addr(mut self, addr: Ipv4Addr) -> Self {
        self.bind_addr = addr;
        self
    }

    pub fn codec(mut self, codec: CodecSelection) -> Self {
        self.codec = codec;
        self
    }

    /// Set the decode target of a base64 codec; ignored for identity
    pub fn text_encoding(mut self, encoding: TextEncoding) -> Self {
        if let CodecSelection::Base64 { text_encoding } = &mut self.codec {
            *text_encoding = encoding;
        }
        self
    }

    pub fn verify_checksum(mut self, verify: bool) -> Self {
        self.verify_checksum = verify;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.identifier == 0 {
            return Err(ChannelError::InvalidIdentifier(self.identifier));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(ChannelError::InvalidConfiguration(format!(
                "block size {} outside 1..={}",
                self.block_size, MAX_BLOCK_SIZE
            )));
        }
        if self.recv_timeout.is_zero() {
            return Err(ChannelError::InvalidConfiguration(
                "receive timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
