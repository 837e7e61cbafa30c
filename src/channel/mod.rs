//! Covert channel protocol
//!
//! A [`Session`] owns the socket and the per-session identifier, sequence
//! counter and transport codec. [`Sender`] and [`Receiver`] borrow it to
//! play one side of a transfer:
//!
//! ```text
//! sender:   payload -> codec encode -> [size block] -> fragment -> echo requests
//! receiver: echo requests -> validate id/seq -> echo reply -> reassemble -> unpad -> codec decode
//! ```

pub mod block;
pub mod receiver;
pub mod sender;
pub mod sequence;
pub mod session;

pub use receiver::Receiver;
pub use sender::{Sender, TransferReport};
pub use sequence::SequenceCounter;
pub use session::{Session, SessionState};
