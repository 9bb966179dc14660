use super::{row_index, row_mask, Circuit, KeyPair, WireId, WireLabel, LABEL_LENGTH};
use crate::common::util::xor_bytes;
use crate::errors::*;
use rand::{CryptoRng, Rng, RngCore};
use std::collections::BTreeMap;
use tracing::debug;

/// Encrypted rows of every gate, keyed by the gate's output wire.
pub type GarbledTables = BTreeMap<WireId, Vec<[u8; LABEL_LENGTH]>>;

/// The garbler's view of a garbled circuit: both labels of every wire plus the tables
/// handed to the evaluator.
pub struct GarbledCircuit {
    circuit: Circuit,
    labels: BTreeMap<WireId, KeyPair>,
    tables: GarbledTables,
    output_pbits: BTreeMap<WireId, bool>,
}

fn random_pair<R: RngCore + CryptoRng>(rng: &mut R) -> KeyPair {
    let p: bool = rng.gen();
    KeyPair {
        zero: WireLabel::random(rng, p),
        one: WireLabel::random(rng, !p),
    }
}

impl GarbledCircuit {
    pub fn garble<R: RngCore + CryptoRng>(circuit: &Circuit, rng: &mut R) -> Result<Self> {
        circuit.validate()?;
        let mut labels = BTreeMap::new();
        for wire in circuit.garbler_inputs.iter().chain(&circuit.evaluator_inputs) {
            labels.insert(*wire, random_pair(rng));
        }

        let mut tables = GarbledTables::new();
        for gate in &circuit.gates {
            let out = random_pair(rng);
            let inputs = gate
                .inputs
                .iter()
                .map(|w| labels.get(w).cloned().ok_or_else(|| ErrorKind::MissingWire(*w).into()))
                .collect::<Result<Vec<KeyPair>>>()?;

            let mut rows = vec![[0u8; LABEL_LENGTH]; 1 << inputs.len()];
            for values in 0..rows.len() {
                let bits: Vec<bool> = (0..inputs.len())
                    .map(|i| (values >> (inputs.len() - 1 - i)) & 1 == 1)
                    .collect();
                let selected: Vec<&WireLabel> = inputs
                    .iter()
                    .zip(&bits)
                    .map(|(pair, bit)| pair.select(*bit))
                    .collect();
                let result = gate.kind.apply(bits[0], bits.get(1).cloned().unwrap_or(false));
                let row = xor_bytes(
                    &out.select(result).to_bytes(),
                    &row_mask(&selected, gate.output),
                )?;
                rows[row_index(&selected)].copy_from_slice(&row);
            }
            tables.insert(gate.output, rows);
            labels.insert(gate.output, out);
        }

        let output_pbits: BTreeMap<WireId, bool> = circuit
            .outputs
            .iter()
            .map(|w| {
                labels
                    .get(w)
                    .map(|pair| (*w, pair.zero.pbit()))
                    .ok_or_else(|| ErrorKind::MissingWire(*w).into())
            })
            .collect::<Result<_>>()?;
        debug!(
            "garbled circuit '{}' with {} gates",
            circuit.name,
            circuit.gates.len()
        );

        Ok(GarbledCircuit {
            circuit: circuit.clone(),
            labels,
            tables,
            output_pbits,
        })
    }

    pub fn tables(&self) -> &GarbledTables {
        &self.tables
    }

    /// Permute bit of the zero label of every output wire. A decrypted output label
    /// means 1 exactly when its permute bit differs from this one.
    pub fn output_pbits(&self) -> &BTreeMap<WireId, bool> {
        &self.output_pbits
    }

    /// The labels encoding the garbler's own input bits, revealed to the evaluator as is.
    pub fn garbler_inputs(
        &self,
        bits: &BTreeMap<WireId, bool>,
    ) -> Result<BTreeMap<WireId, WireLabel>> {
        self.circuit
            .garbler_inputs
            .iter()
            .map(|w| -> Result<(WireId, WireLabel)> {
                let bit = bits.get(w).ok_or(ErrorKind::MissingWire(*w))?;
                let pair = self.labels.get(w).ok_or(ErrorKind::MissingWire(*w))?;
                Ok((*w, *pair.select(*bit)))
            })
            .collect()
    }

    /// Both labels of every evaluator input wire, to be handed over obliviously.
    pub fn evaluator_key_pairs(&self) -> BTreeMap<WireId, KeyPair> {
        self.circuit
            .evaluator_inputs
            .iter()
            .filter_map(|w| self.labels.get(w).map(|pair| (*w, *pair)))
            .collect()
    }
}
