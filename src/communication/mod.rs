//! This module provides utility traits and wrappers
//! for basic communication needed by our protocols.
//! While TCP, Websocket (courtesy of tungstenite) and in-memory
//! implementations of these traits are provided it should
//! be trivial to implement them for other means of communications.
//!
//! Every call to `send` is delivered as exactly one frame by `receive` on the other side,
//! in order.
use crate::errors::*;

pub mod corrupted;
pub mod memory;
pub mod tcp;
pub mod websockets;

pub trait BinarySend {
    fn send(&mut self, data: &[u8]) -> Result<()>;
}

pub trait BinaryReceive {
    fn receive(&mut self) -> Result<Vec<u8>>;
}

/// A point-to-point connection to exactly one peer.
pub trait BinaryChannel: BinarySend + BinaryReceive {
    /// Sends `data` and blocks for exactly one reply.
    fn send_wait(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        self.send(data)?;
        self.receive()
    }
}

impl<T: BinarySend + BinaryReceive> BinaryChannel for T {}
