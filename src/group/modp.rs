//! The subgroup of quadratic residues modulo a safe prime `p = 2q + 1`.
//!
//! It has prime order `q`. The default parameters are the 2048-bit MODP group of RFC 3526,
//! whose prime is `7 mod 8`, so 2 is a quadratic residue and generates the order `q` subgroup.
//! Moduli are not tested for primality, only those in [`KNOWN_SAFE_PRIMES`] are accepted.
use super::{Group, GroupKind};
use crate::common::codec::{Reader, Writer};
use crate::errors::*;
use num_bigint::{BigUint, RandBigInt};
use rand::{CryptoRng, RngCore};
use std::convert::TryFrom;

const RFC3526_2048_PRIME: [u8; 256] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xc9, 0x0f, 0xda, 0xa2,
    0x21, 0x68, 0xc2, 0x34, 0xc4, 0xc6, 0x62, 0x8b, 0x80, 0xdc, 0x1c, 0xd1,
    0x29, 0x02, 0x4e, 0x08, 0x8a, 0x67, 0xcc, 0x74, 0x02, 0x0b, 0xbe, 0xa6,
    0x3b, 0x13, 0x9b, 0x22, 0x51, 0x4a, 0x08, 0x79, 0x8e, 0x34, 0x04, 0xdd,
    0xef, 0x95, 0x19, 0xb3, 0xcd, 0x3a, 0x43, 0x1b, 0x30, 0x2b, 0x0a, 0x6d,
    0xf2, 0x5f, 0x14, 0x37, 0x4f, 0xe1, 0x35, 0x6d, 0x6d, 0x51, 0xc2, 0x45,
    0xe4, 0x85, 0xb5, 0x76, 0x62, 0x5e, 0x7e, 0xc6, 0xf4, 0x4c, 0x42, 0xe9,
    0xa6, 0x37, 0xed, 0x6b, 0x0b, 0xff, 0x5c, 0xb6, 0xf4, 0x06, 0xb7, 0xed,
    0xee, 0x38, 0x6b, 0xfb, 0x5a, 0x89, 0x9f, 0xa5, 0xae, 0x9f, 0x24, 0x11,
    0x7c, 0x4b, 0x1f, 0xe6, 0x49, 0x28, 0x66, 0x51, 0xec, 0xe4, 0x5b, 0x3d,
    0xc2, 0x00, 0x7c, 0xb8, 0xa1, 0x63, 0xbf, 0x05, 0x98, 0xda, 0x48, 0x36,
    0x1c, 0x55, 0xd3, 0x9a, 0x69, 0x16, 0x3f, 0xa8, 0xfd, 0x24, 0xcf, 0x5f,
    0x83, 0x65, 0x5d, 0x23, 0xdc, 0xa3, 0xad, 0x96, 0x1c, 0x62, 0xf3, 0x56,
    0x20, 0x85, 0x52, 0xbb, 0x9e, 0xd5, 0x29, 0x07, 0x70, 0x96, 0x96, 0x6d,
    0x67, 0x0c, 0x35, 0x4e, 0x4a, 0xbc, 0x98, 0x04, 0xf1, 0x74, 0x6c, 0x08,
    0xca, 0x18, 0x21, 0x7c, 0x32, 0x90, 0x5e, 0x46, 0x2e, 0x36, 0xce, 0x3b,
    0xe3, 0x9e, 0x77, 0x2c, 0x18, 0x0e, 0x86, 0x03, 0x9b, 0x27, 0x83, 0xa2,
    0xec, 0x07, 0xa2, 0x8f, 0xb5, 0xc5, 0x5d, 0xf0, 0x6f, 0x4c, 0x52, 0xc9,
    0xde, 0x2b, 0xcb, 0xf6, 0x95, 0x58, 0x17, 0x18, 0x39, 0x95, 0x49, 0x7c,
    0xea, 0x95, 0x6a, 0xe5, 0x15, 0xd2, 0x26, 0x18, 0x98, 0xfa, 0x05, 0x10,
    0x15, 0x72, 0x8e, 0x5a, 0x8a, 0xac, 0xaa, 0x68, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff,
];

const RFC3526_2048_GENERATOR: u8 = 2;

/// Smallest modulus for which discrete logs are out of reach.
pub const MIN_MODULUS_BITS: u64 = 2048;

/// Safe primes `p = 2q + 1` a group may be built on.
pub const KNOWN_SAFE_PRIMES: [&[u8]; 1] = [&RFC3526_2048_PRIME];

fn invalid(reason: &str) -> Error {
    ErrorKind::InvalidGroup(reason.to_owned()).into()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModPGroup {
    modulus: BigUint,
    order: BigUint,
    generator: BigUint,
    width: u32,
}

impl ModPGroup {
    /// Builds the group from a safe prime and a generator of its quadratic residues.
    ///
    /// `modulus` must be at least [`MIN_MODULUS_BITS`] long and one of [`KNOWN_SAFE_PRIMES`],
    /// `generator` must have order `(modulus - 1) / 2`.
    pub fn new(modulus: BigUint, generator: BigUint) -> Result<Self> {
        if modulus.bits() < MIN_MODULUS_BITS {
            return Err(ErrorKind::InvalidGroup(format!(
                "modulus has {} bits, at least {} are required",
                modulus.bits(),
                MIN_MODULUS_BITS
            ))
            .into());
        }
        if !KNOWN_SAFE_PRIMES
            .iter()
            .any(|p| BigUint::from_bytes_be(p) == modulus)
        {
            return Err(invalid("modulus is not a known safe prime"));
        }
        let one = BigUint::from(1u8);
        let order = (&modulus - &one) >> 1;
        if generator <= one || generator >= modulus {
            return Err(invalid("generator out of range"));
        }
        if generator.modpow(&order, &modulus) != one {
            return Err(invalid("generator is not a quadratic residue"));
        }
        let width = u32::try_from((modulus.bits() + 7) / 8)
            .map_err(|_| invalid("modulus too large"))?;
        Ok(ModPGroup {
            modulus,
            order,
            generator,
            width,
        })
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    pub fn order(&self) -> &BigUint {
        &self.order
    }

    pub fn generator(&self) -> &BigUint {
        &self.generator
    }
}

impl Group for ModPGroup {
    type Element = BigUint;
    type Exponent = BigUint;

    const KIND: GroupKind = GroupKind::ModP;

    fn generate() -> Self {
        let modulus = BigUint::from_bytes_be(&RFC3526_2048_PRIME);
        let order = (&modulus - BigUint::from(1u8)) >> 1;
        ModPGroup {
            modulus,
            order,
            generator: BigUint::from(RFC3526_2048_GENERATOR),
            width: RFC3526_2048_PRIME.len() as u32,
        }
    }

    fn random_exponent<R: RngCore + CryptoRng>(&self, rng: &mut R) -> BigUint {
        rng.gen_biguint_range(&BigUint::from(1u8), &self.order)
    }

    fn pow_generator(&self, exponent: &BigUint) -> BigUint {
        self.generator.modpow(exponent, &self.modulus)
    }

    fn pow(&self, base: &BigUint, exponent: &BigUint) -> BigUint {
        base.modpow(exponent, &self.modulus)
    }

    fn multiply(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.modulus
    }

    fn invert(&self, a: &BigUint) -> BigUint {
        // Fermat: a^(p-2) == a^-1 mod p
        let exponent = &self.modulus - BigUint::from(2u8);
        a.modpow(&exponent, &self.modulus)
    }

    fn encode_element(&self, element: &BigUint) -> Vec<u8> {
        let bytes = element.to_bytes_be();
        let mut v = vec![0u8; (self.width as usize).saturating_sub(bytes.len())];
        v.extend_from_slice(&bytes);
        v
    }

    fn decode_element(&self, bytes: &[u8]) -> Result<BigUint> {
        if bytes.len() != self.width as usize {
            return Err(ErrorKind::InvalidElement.into());
        }
        let element = BigUint::from_bytes_be(bytes);
        let one = BigUint::from(1u8);
        if element < one || element >= self.modulus {
            return Err(ErrorKind::InvalidElement.into());
        }
        // only quadratic residues are members
        if element.modpow(&self.order, &self.modulus) != one {
            return Err(ErrorKind::InvalidElement.into());
        }
        Ok(element)
    }

    fn kdf_input(&self, element: &BigUint) -> Vec<u8> {
        element.to_bytes_be()
    }

    /// Element width, then modulus and generator in that width.
    fn parameters(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.put_u32(self.width)
            .put_raw(&self.encode_element(&self.modulus))
            .put_raw(&self.encode_element(&self.generator));
        w.into_inner()
    }

    fn from_parameters(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes, "modp group parameters");
        let width = r.read_u32()? as usize;
        let modulus = BigUint::from_bytes_be(r.read_raw(width)?);
        let generator = BigUint::from_bytes_be(r.read_raw(width)?);
        r.finish()?;
        ModPGroup::new(modulus, generator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parameters_are_consistent() {
        let group = ModPGroup::generate();
        assert_eq!(group.modulus().bits(), 2048);
        // revalidates the generator against the order
        let checked = ModPGroup::new(group.modulus().clone(), group.generator().clone()).unwrap();
        assert_eq!(checked, group);
    }

    #[test]
    fn elements_have_fixed_width() {
        let group = ModPGroup::generate();
        let small = BigUint::from(4u8);
        let encoded = group.encode_element(&small);
        assert_eq!(encoded.len(), 256);
        assert_eq!(group.decode_element(&encoded).unwrap(), small);
        // the hash input stays minimal
        assert_eq!(group.kdf_input(&small), vec![4u8]);
    }

    #[test]
    fn non_members_are_rejected() {
        let group = ModPGroup::generate();
        let zero = vec![0u8; 256];
        assert!(group.decode_element(&zero).is_err());
        assert!(group.decode_element(&group.modulus().to_bytes_be()).is_err());
        assert!(group.decode_element(&[2u8]).is_err());

        // p - 1 has order 2, it is not a quadratic residue
        let minus_one = group.modulus() - BigUint::from(1u8);
        assert!(group
            .decode_element(&group.encode_element(&minus_one))
            .is_err());
    }

    #[test]
    fn bad_generator_is_rejected() {
        let group = ModPGroup::generate();
        let minus_one = group.modulus() - BigUint::from(1u8);
        assert!(ModPGroup::new(group.modulus().clone(), minus_one).is_err());
    }

    fn expect_invalid_group(result: Result<ModPGroup>) {
        match result.unwrap_err().kind() {
            ErrorKind::InvalidGroup(_) => (),
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn small_modulus_is_rejected() {
        // 23 = 2 * 11 + 1 is a safe prime, 2 generates its order 11 subgroup
        expect_invalid_group(ModPGroup::new(BigUint::from(23u8), BigUint::from(2u8)));
        expect_invalid_group(ModPGroup::new(BigUint::from(4u8), BigUint::from(2u8)));
    }

    #[test]
    fn composite_modulus_is_rejected() {
        // 341 = 11 * 31, and 2^170 == 1 mod 341
        let small = BigUint::from(341u16);
        assert_eq!(
            BigUint::from(2u8).modpow(&BigUint::from(170u8), &small),
            BigUint::from(1u8)
        );
        expect_invalid_group(ModPGroup::new(small, BigUint::from(2u8)));

        // p is 2 mod 3, so p + 4 is a 2048-bit multiple of 3
        let p = ModPGroup::generate().modulus().clone();
        let composite = &p + BigUint::from(4u8);
        assert_eq!(composite.bits(), 2048);
        assert_eq!(&composite % BigUint::from(3u8), BigUint::from(0u8));
        expect_invalid_group(ModPGroup::new(composite, BigUint::from(4u8)));
    }

    #[test]
    fn weak_parameters_are_rejected_on_decode() {
        let mut w = Writer::new();
        w.put_u32(1).put_raw(&[23]).put_raw(&[2]);
        expect_invalid_group(ModPGroup::from_parameters(&w.into_inner()));

        let group = ModPGroup::generate();
        let decoded = ModPGroup::from_parameters(&group.parameters()).unwrap();
        assert_eq!(decoded, group);
    }
}
