//! Diffie-Hellman based 1-out-of-2 OT in a prime-order group.
//!
//! Garbler                                    Evaluator (choice b)
//! c = g^a                  ---- c ---->
//!                                            x random, h = (g^x, c / g^x)
//!                          <--- h[b] ---
//! h0 = h[b], h1 = c / h0
//! k random, c1 = g^k
//! e_i = m_i ^ H(h_i^k)     -- c1,e0,e1 ->
//!                                            m_b = e_b ^ H(c1^x)
//!
//! Only one of h0, h1 has a discrete log known to the evaluator, namely the one at index b,
//! so it can strip exactly one mask. Both look uniformly random to the garbler.
use super::{ot_hash, ObliviousReceiver, ObliviousSender};
use crate::common::codec::{Reader, Writer};
use crate::common::util::xor_bytes;
use crate::communication::BinaryChannel;
use crate::errors::*;
use crate::group::Group;
use rand::{CryptoRng, RngCore};
use tracing::trace;

/// Runs the OT core with the group agreed for the session.
pub struct DiffieHellmanOt<'a, G: Group, R: RngCore + CryptoRng> {
    group: &'a G,
    rng: &'a mut R,
}

impl<'a, G: Group, R: RngCore + CryptoRng> DiffieHellmanOt<'a, G, R> {
    pub fn new(group: &'a G, rng: &'a mut R) -> Self {
        DiffieHellmanOt { group, rng }
    }
}

impl<'a, G: Group, R: RngCore + CryptoRng> ObliviousSender for DiffieHellmanOt<'a, G, R> {
    fn send<C: BinaryChannel>(&mut self, conn: &mut C, m0: &[u8], m1: &[u8]) -> Result<()> {
        garbler_side(self.group, conn, self.rng, m0, m1)
    }
}

impl<'a, G: Group, R: RngCore + CryptoRng> ObliviousReceiver for DiffieHellmanOt<'a, G, R> {
    fn receive<C: BinaryChannel>(&mut self, conn: &mut C, choice: bool) -> Result<Vec<u8>> {
        evaluator_side(self.group, conn, self.rng, choice)
    }
}

/// Obliviously sends one of `m0`, `m1`, which must have the same length.
pub fn garbler_side<G, C, R>(
    group: &G,
    conn: &mut C,
    rng: &mut R,
    m0: &[u8],
    m1: &[u8],
) -> Result<()>
where
    G: Group,
    C: BinaryChannel,
    R: RngCore + CryptoRng,
{
    if m0.len() != m1.len() {
        return Err(ErrorKind::LengthMismatch(m0.len(), m1.len()).into());
    }
    trace!("OT protocol started");

    let c = group.pow_generator(&group.random_exponent(rng));
    let reply = conn.send_wait(&group.encode_element(&c))?;
    let h0 = group.decode_element(&reply)?;
    let h1 = group.multiply(&c, &group.invert(&h0));

    let k = group.random_exponent(rng);
    let c1 = group.pow_generator(&k);
    let e0 = xor_bytes(m0, &ot_hash(group, &group.pow(&h0, &k), m0.len()))?;
    let e1 = xor_bytes(m1, &ot_hash(group, &group.pow(&h1, &k), m1.len()))?;

    let mut w = Writer::new();
    w.put_bytes(&group.encode_element(&c1))?
        .put_bytes(&e0)?
        .put_bytes(&e1)?;
    conn.send(&w.into_inner())?;

    trace!("OT protocol ended");
    Ok(())
}

/// Obliviously receives the secret at index `choice`.
pub fn evaluator_side<G, C, R>(
    group: &G,
    conn: &mut C,
    rng: &mut R,
    choice: bool,
) -> Result<Vec<u8>>
where
    G: Group,
    C: BinaryChannel,
    R: RngCore + CryptoRng,
{
    trace!("OT protocol started");
    let c = group.decode_element(&conn.receive()?)?;

    let x = group.random_exponent(rng);
    let x_pow = group.pow_generator(&x);
    // both candidates are computed whatever the choice is
    let h = [x_pow.clone(), group.multiply(&c, &group.invert(&x_pow))];
    let reply = conn.send_wait(&group.encode_element(&h[choice as usize]))?;

    let mut r = Reader::new(&reply, "ot payload");
    let c1 = group.decode_element(r.read_bytes()?)?;
    let e = [r.read_bytes()?, r.read_bytes()?];
    r.finish()?;
    if e[0].len() != e[1].len() {
        return Err(ErrorKind::LengthMismatch(e[0].len(), e[1].len()).into());
    }

    let e_b = e[choice as usize];
    let m_b = xor_bytes(e_b, &ot_hash(group, &group.pow(&c1, &x), e_b.len()))?;
    trace!("OT protocol ended");
    Ok(m_b)
}
