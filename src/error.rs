use std::io;
use thiserror::Error;

use crate::transport::TextEncoding;

#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Channel socket is closed")]
    Closed,

    #[error("Channel socket has not been opened")]
    NotOpen,

    #[error("Invalid identifier {0} (must be 1..=65535)")]
    InvalidIdentifier(u16),

    #[error("Size {size} does not fit in a {block_size}-byte block")]
    SizeOverflow { size: u64, block_size: usize },

    #[error("Size block carries a {0}-byte integer")]
    MalformedSize(usize),

    #[error("Block of {len} bytes exceeds the {block_size}-byte block size")]
    OversizedBlock { len: usize, block_size: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Cannot resolve IPv4 destination '{0}'")]
    Unresolvable(String),

    #[error("Permission denied (raw sockets require CAP_NET_RAW)")]
    PermissionDenied,

    #[error("Data corruption: {0}")]
    Corrupt(#[from] CodecError),

    #[error("IO Error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("malformed base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not valid {encoding} text")]
    Text { encoding: TextEncoding },
}

pub type Result<T> = std::result::Result<T, ChannelError>;
