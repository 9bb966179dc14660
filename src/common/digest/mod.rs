use generic_array::{ArrayLength, GenericArray};

pub mod sha3;

/// A simple trait to generalize fixed-length hashing functions used by this library.
/// It is very similiar to the trait from the crate digest but customized to fit this library's needs.
///
/// Group fingerprints are computed with it, a wrapper around tiny-keccaks SHA3-256 is provided.
pub trait Digest {
    type OutputSize: ArrayLength<u8>;
    fn input(&mut self, data: &[u8]);
    fn result(self) -> GenericArray<u8, Self::OutputSize>;
}

/// Generalizes variable-length (extendable output) hashing functions.
///
/// Used to stretch group elements into masks of arbitrary length for the oblivious transfer
/// and to encrypt garbled table rows. Any flaw in the chosen function transitively harms the
/// security of both, a wrapper around tiny-keccaks SHAKE-256 is provided.
pub trait ArbitraryDigest {
    fn input(&mut self, data: &[u8]);
    fn result(self, output_size: usize) -> Vec<u8>;
}
