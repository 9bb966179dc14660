//! # Base OT
//!
//! 1-out-of-2 oblivious transfer of equal-length byte strings, one wire at a time.
//! The session picks one strategy when it starts: [`diffie_hellman::DiffieHellmanOt`] for
//! the real protocol, or [`plaintext::PlaintextTransfer`] which sends both secrets in the
//! clear and exists for testing and debugging only.
use crate::common::digest::sha3::SHAKE_256;
use crate::common::digest::ArbitraryDigest;
use crate::communication::BinaryChannel;
use crate::errors::*;
use crate::group::Group;

pub mod diffie_hellman;
pub mod plaintext;

/// Derives a `msg_length` byte mask from a group element.
///
/// The element is absorbed in the group's canonical hash encoding (the minimal big-endian
/// integer for modular groups) and SHAKE-256 is squeezed for exactly `msg_length` bytes.
pub fn ot_hash<G: Group>(group: &G, element: &G::Element, msg_length: usize) -> Vec<u8> {
    let mut hasher = SHAKE_256::default();
    hasher.input(&group.kdf_input(element));
    hasher.result(msg_length)
}

/// The garbler's half: offers two secrets of which the peer obtains exactly one.
pub trait ObliviousSender {
    fn send<C: BinaryChannel>(&mut self, conn: &mut C, m0: &[u8], m1: &[u8]) -> Result<()>;
}

/// The evaluator's half: obtains the secret at index `choice` and nothing about the other.
pub trait ObliviousReceiver {
    fn receive<C: BinaryChannel>(&mut self, conn: &mut C, choice: bool) -> Result<Vec<u8>>;
}
