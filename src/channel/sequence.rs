use std::num::Wrapping;

/// Per-session echo sequence counter
///
/// Starts at 0. Every block sent or expected consumes one slot, so a
/// sender and receiver that start together stay in lock-step as long as no
/// block is lost.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct SequenceCounter {
    n: Wrapping<u16>,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_u16(n: u16) -> Self {
        SequenceCounter { n: Wrapping(n) }
    }

    /// The last value handed out
    pub fn current(&self) -> u16 {
        self.n.0
    }

    /// The value the next call to [`Self::next`] will return
    pub fn peek_next(&self) -> u16 {
        (self.n + Wrapping(1)).0
    }

    /// Advance by one and return the new value
    pub fn next(&mut self) -> u16 {
        self.n += Wrapping(1);
        self.n.0
    }
}
