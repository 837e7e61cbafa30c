//! Utility functions for the channel demos
//!
//! Argument parsing shared by the sender and receiver programs.

pub mod args;

pub use args::*;
