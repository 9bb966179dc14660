use crate::errors::*;
use rand::distributions::Standard;
use rand::{thread_rng, Rng};

/// XORs two byte strings of equal length.
pub fn xor_bytes(a: &[u8], b: &[u8]) -> Result<Vec<u8>> {
    if a.len() != b.len() {
        return Err(ErrorKind::LengthMismatch(a.len(), b.len()).into());
    }
    Ok(a.iter().zip(b).map(|(x, y)| x ^ y).collect())
}

pub fn generate_random_secret_pairs(n: usize, l: usize) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut rng = thread_rng();
    let mut values = Vec::with_capacity(n);
    for _ in 0..n {
        let s1: Vec<u8> = (&mut rng).sample_iter(Standard).take(l).collect();
        let s2: Vec<u8> = (&mut rng).sample_iter(Standard).take(l).collect();
        values.push((s1, s2));
    }
    values
}

pub fn generate_random_choices(num: usize) -> Vec<bool> {
    let mut rng = thread_rng();
    (0..num).map(|_| rng.gen()).collect()
}
