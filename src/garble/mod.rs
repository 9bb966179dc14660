//! # Garbling
//!
//! A minimal classical Yao garbler: every wire gets two random labels, every gate a table of
//! encrypted output labels. Rows are ordered by the point-and-permute bits of the input labels,
//! so the evaluator decrypts exactly one row per gate without learning which values it holds.
use crate::common::digest::sha3::SHAKE_256;
use crate::common::digest::ArbitraryDigest;

pub mod circuit;
pub mod evaluator;
pub mod generator;
pub mod wire;

pub use self::circuit::{Circuit, Gate, GateKind};
pub use self::evaluator::evaluate;
pub use self::generator::{GarbledCircuit, GarbledTables};
pub use self::wire::{KeyPair, WireId, WireLabel, KEY_LENGTH, LABEL_LENGTH};

/// Mask for one table row, keyed by the input label keys and tweaked by the gate's output wire.
fn row_mask(inputs: &[&WireLabel], gate: WireId) -> Vec<u8> {
    let mut hasher = SHAKE_256::default();
    for label in inputs {
        hasher.input(label.key());
    }
    hasher.input(&gate.0.to_be_bytes());
    hasher.result(LABEL_LENGTH)
}

/// Index of the row selected by the input labels' permute bits.
fn row_index(inputs: &[&WireLabel]) -> usize {
    inputs
        .iter()
        .fold(0, |index, label| (index << 1) | label.pbit() as usize)
}
