//! A covert point-to-point data channel carried inside ICMP echo packets
//!
//! This library provides:
//! - Internet checksum and ICMP echo packet construction/parsing
//! - Block padding, fragmentation and the size-prefixed transfer framing
//! - Sender and receiver roles sharing one session (identifier, sequence, socket)
//! - Pluggable transport codecs (identity, base64)
//! - Raw and in-memory ICMP sockets

pub mod channel;
pub mod config;
pub mod error;
pub mod iface;
pub mod logging;
pub mod network;
pub mod signal;
pub mod transport;

// Re-export commonly used types
pub use channel::{Receiver, Sender, Session, SessionState, TransferReport};
pub use config::ChannelConfig;
pub use error::{ChannelError, CodecError};
pub use iface::{IcmpSocket, MemorySocket, RawIcmpSocket};
pub use logging::Logger;
pub use network::checksum;
pub use signal::Interrupt;
pub use transport::{Base64Codec, CodecSelection, Identity, TextEncoding, TransportCodec};
