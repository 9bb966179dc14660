use crate::errors::*;
use rand::{CryptoRng, RngCore};
use std::fmt;

/// Names one bit-carrying line of a circuit, identically on both parties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WireId(pub u32);

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

pub const KEY_LENGTH: usize = 16;
/// Key followed by one byte holding the permute bit.
pub const LABEL_LENGTH: usize = KEY_LENGTH + 1;

/// The label standing for one value of a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireLabel {
    key: [u8; KEY_LENGTH],
    pbit: bool,
}

impl WireLabel {
    pub fn new(key: [u8; KEY_LENGTH], pbit: bool) -> Self {
        WireLabel { key, pbit }
    }

    pub fn random<R: RngCore + CryptoRng>(rng: &mut R, pbit: bool) -> Self {
        let mut key = [0u8; KEY_LENGTH];
        rng.fill_bytes(&mut key);
        WireLabel { key, pbit }
    }

    pub fn key(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }

    /// Point-and-permute bit, tells the evaluator which table row to open.
    pub fn pbit(&self) -> bool {
        self.pbit
    }

    pub fn to_bytes(&self) -> [u8; LABEL_LENGTH] {
        let mut bytes = [0u8; LABEL_LENGTH];
        bytes[..KEY_LENGTH].copy_from_slice(&self.key);
        bytes[KEY_LENGTH] = self.pbit as u8;
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != LABEL_LENGTH {
            return Err(ErrorKind::MalformedMessage(format!(
                "wire label of {} bytes, expected {}",
                bytes.len(),
                LABEL_LENGTH
            ))
            .into());
        }
        let pbit = match bytes[KEY_LENGTH] {
            0 => false,
            1 => true,
            b => {
                return Err(
                    ErrorKind::MalformedMessage(format!("invalid permute bit {}", b)).into(),
                )
            }
        };
        let mut key = [0u8; KEY_LENGTH];
        key.copy_from_slice(&bytes[..KEY_LENGTH]);
        Ok(WireLabel { key, pbit })
    }
}

/// Both labels of an evaluator-owned input wire, held by the garbler until the transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPair {
    pub zero: WireLabel,
    pub one: WireLabel,
}

impl KeyPair {
    pub fn select(&self, bit: bool) -> &WireLabel {
        if bit {
            &self.one
        } else {
            &self.zero
        }
    }
}
