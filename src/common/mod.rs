//! Hashing wrappers, the byte codec shared by all messages and small helpers.
pub mod codec;
pub mod digest;
pub mod util;
