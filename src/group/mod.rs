//! # Groups
//!
//! Prime-order cyclic groups the Diffie-Hellman OT runs in, written multiplicatively.
//! The garbler picks the group and ships its descriptor to the evaluator, both then use
//! the exact same parameters for the rest of the session.
use crate::common::codec::Writer;
use crate::common::digest::sha3::SHA3_256;
use crate::common::digest::Digest;
use crate::errors::*;
use rand::{CryptoRng, RngCore};
use std::fmt;
use std::str::FromStr;

pub mod modp;
pub mod ristretto;

pub use self::modp::ModPGroup;
pub use self::ristretto::RistrettoGroup;

/// SHA3-256 over a group descriptor.
pub type Fingerprint = [u8; 32];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Quadratic residues modulo a safe prime.
    ModP,
    /// The Ristretto group over Curve25519.
    Ristretto,
}

impl GroupKind {
    pub fn tag(self) -> u8 {
        match self {
            GroupKind::ModP => 1,
            GroupKind::Ristretto => 2,
        }
    }
}

impl FromStr for GroupKind {
    type Err = String;

    fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "modp" => Ok(GroupKind::ModP),
            "ristretto" => Ok(GroupKind::Ristretto),
            other => Err(format!("unknown group kind '{}'", other)),
        }
    }
}

/// A cyclic group of prime order with a fixed generator.
///
/// Elements travel in a fixed-width encoding so that message lengths never depend on the
/// values sent. The key-derivation hash uses [`Group::kdf_input`] instead, which for integer
/// groups is the minimal big-endian representation.
pub trait Group: Clone + Sized {
    type Element: Clone + PartialEq + fmt::Debug;
    type Exponent;

    const KIND: GroupKind;

    /// The default parameter set of this group, used when the garbler wasn't given one.
    fn generate() -> Self;

    fn random_exponent<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Self::Exponent;
    fn pow_generator(&self, exponent: &Self::Exponent) -> Self::Element;
    fn pow(&self, base: &Self::Element, exponent: &Self::Exponent) -> Self::Element;
    fn multiply(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn invert(&self, a: &Self::Element) -> Self::Element;

    fn encode_element(&self, element: &Self::Element) -> Vec<u8>;
    /// Decodes a received element and checks that it lies in the group.
    fn decode_element(&self, bytes: &[u8]) -> Result<Self::Element>;
    fn kdf_input(&self, element: &Self::Element) -> Vec<u8>;

    fn parameters(&self) -> Vec<u8>;
    fn from_parameters(bytes: &[u8]) -> Result<Self>;

    /// Kind tag followed by the parameters.
    fn descriptor(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.put_u8(Self::KIND.tag()).put_raw(&self.parameters());
        w.into_inner()
    }

    fn from_descriptor(bytes: &[u8]) -> Result<Self> {
        match bytes.split_first() {
            Some((&tag, parameters)) if tag == Self::KIND.tag() => Self::from_parameters(parameters),
            Some(_) => Err(ErrorKind::GroupMismatch.into()),
            None => Err(ErrorKind::MalformedMessage("empty group descriptor".to_owned()).into()),
        }
    }

    fn fingerprint(&self) -> Fingerprint {
        fingerprint(&self.descriptor())
    }
}

pub fn fingerprint(descriptor: &[u8]) -> Fingerprint {
    let mut hasher = SHA3_256::default();
    hasher.input(descriptor);
    let mut fp = [0u8; 32];
    fp.copy_from_slice(&hasher.result());
    fp
}
