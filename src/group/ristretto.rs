//! The Ristretto prime-order group over Curve25519, written multiplicatively:
//! "multiply" is point addition, "pow" scalar multiplication, "invert" negation.
use super::{Group, GroupKind};
use crate::errors::*;
use curve25519_dalek::constants::RISTRETTO_BASEPOINT_TABLE;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use rand::{CryptoRng, RngCore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RistrettoGroup;

impl Group for RistrettoGroup {
    type Element = RistrettoPoint;
    type Exponent = Scalar;

    const KIND: GroupKind = GroupKind::Ristretto;

    fn generate() -> Self {
        RistrettoGroup
    }

    fn random_exponent<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Scalar {
        Scalar::random(rng)
    }

    fn pow_generator(&self, exponent: &Scalar) -> RistrettoPoint {
        exponent * RISTRETTO_BASEPOINT_TABLE
    }

    fn pow(&self, base: &RistrettoPoint, exponent: &Scalar) -> RistrettoPoint {
        base * exponent
    }

    fn multiply(&self, a: &RistrettoPoint, b: &RistrettoPoint) -> RistrettoPoint {
        a + b
    }

    fn invert(&self, a: &RistrettoPoint) -> RistrettoPoint {
        -a
    }

    fn encode_element(&self, element: &RistrettoPoint) -> Vec<u8> {
        element.compress().to_bytes().to_vec()
    }

    fn decode_element(&self, bytes: &[u8]) -> Result<RistrettoPoint> {
        if bytes.len() != 32 {
            return Err(ErrorKind::InvalidElement.into());
        }
        let mut buf = [0u8; 32];
        buf.copy_from_slice(bytes);
        CompressedRistretto(buf)
            .decompress()
            .ok_or_else(|| ErrorKind::InvalidElement.into())
    }

    fn kdf_input(&self, element: &RistrettoPoint) -> Vec<u8> {
        self.encode_element(element)
    }

    fn parameters(&self) -> Vec<u8> {
        Vec::new()
    }

    fn from_parameters(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            Ok(RistrettoGroup)
        } else {
            Err(ErrorKind::InvalidGroup("ristretto takes no parameters".to_owned()).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_encodings_are_rejected() {
        let group = RistrettoGroup;
        assert!(group.decode_element(&[0u8; 31]).is_err());
        // not a canonical field element encoding
        assert!(group.decode_element(&[0xffu8; 32]).is_err());
        assert!(RistrettoGroup::from_parameters(&[1]).is_err());
    }
}
