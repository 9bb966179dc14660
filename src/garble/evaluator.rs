use super::{row_index, row_mask, Circuit, GarbledTables, WireId, WireLabel};
use crate::common::util::xor_bytes;
use crate::errors::*;
use std::collections::BTreeMap;
use tracing::trace;

fn input_labels(
    wires: &[WireId],
    labels: &BTreeMap<WireId, WireLabel>,
    known: &mut BTreeMap<WireId, WireLabel>,
) -> Result<()> {
    for wire in wires {
        let label = labels.get(wire).ok_or(ErrorKind::MissingWire(*wire))?;
        known.insert(*wire, *label);
    }
    Ok(())
}

/// Evaluates a garbled circuit from one label per input wire and returns the cleartext
/// value of every output wire.
///
/// A wrong label is not detected as such: it opens the wrong row and either fails to decode
/// or yields garbage outputs.
pub fn evaluate(
    circuit: &Circuit,
    tables: &GarbledTables,
    pbits_out: &BTreeMap<WireId, bool>,
    garbler_inputs: &BTreeMap<WireId, WireLabel>,
    evaluator_inputs: &BTreeMap<WireId, WireLabel>,
) -> Result<BTreeMap<WireId, bool>> {
    circuit.validate()?;
    let mut known = BTreeMap::new();
    input_labels(&circuit.garbler_inputs, garbler_inputs, &mut known)?;
    input_labels(&circuit.evaluator_inputs, evaluator_inputs, &mut known)?;

    for gate in &circuit.gates {
        let inputs = gate
            .inputs
            .iter()
            .map(|w| known.get(w).ok_or_else(|| ErrorKind::MissingWire(*w).into()))
            .collect::<Result<Vec<&WireLabel>>>()?;
        let rows = tables.get(&gate.output).ok_or_else(|| {
            ErrorKind::InvalidCircuit(format!("no garbled table for gate {}", gate.output))
        })?;
        if rows.len() != 1 << inputs.len() {
            return Err(ErrorKind::InvalidCircuit(format!(
                "garbled table of gate {} has {} rows",
                gate.output,
                rows.len()
            ))
            .into());
        }
        let row = &rows[row_index(&inputs)];
        let label = WireLabel::from_bytes(&xor_bytes(row, &row_mask(&inputs, gate.output))?)?;
        trace!("opened gate {}", gate.output);
        known.insert(gate.output, label);
    }

    circuit
        .outputs
        .iter()
        .map(|w| -> Result<(WireId, bool)> {
            let label = known.get(w).ok_or(ErrorKind::MissingWire(*w))?;
            let pbit = pbits_out.get(w).ok_or(ErrorKind::MissingWire(*w))?;
            Ok((*w, label.pbit() ^ *pbit))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garble::{GarbledCircuit, GateKind};
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    fn and_setup() -> (Circuit, GarbledCircuit, BTreeMap<WireId, WireLabel>, BTreeMap<WireId, WireLabel>) {
        let circuit = Circuit::single_gate(GateKind::And);
        let mut rng = ChaChaRng::seed_from_u64(11);
        let garbled = GarbledCircuit::garble(&circuit, &mut rng).unwrap();
        let mut bits = BTreeMap::new();
        bits.insert(WireId(1), true);
        let garbler = garbled.garbler_inputs(&bits).unwrap();
        let mut evaluator = BTreeMap::new();
        evaluator.insert(WireId(2), garbled.evaluator_key_pairs()[&WireId(2)].one);
        (circuit, garbled, garbler, evaluator)
    }

    #[test]
    fn evaluates_and_gate() {
        let (circuit, garbled, garbler, evaluator) = and_setup();
        let out = evaluate(&circuit, garbled.tables(), garbled.output_pbits(), &garbler, &evaluator)
            .unwrap();
        assert_eq!(out[&WireId(3)], true);
    }

    #[test]
    fn missing_label_is_reported() {
        let (circuit, garbled, garbler, _) = and_setup();
        let err = evaluate(
            &circuit,
            garbled.tables(),
            garbled.output_pbits(),
            &garbler,
            &BTreeMap::new(),
        )
        .unwrap_err();
        match err.kind() {
            ErrorKind::MissingWire(WireId(2)) => (),
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn truncated_table_is_rejected() {
        let (circuit, garbled, garbler, evaluator) = and_setup();
        let mut tables = garbled.tables().clone();
        tables.get_mut(&WireId(3)).unwrap().pop();
        let err = evaluate(&circuit, &tables, garbled.output_pbits(), &garbler, &evaluator)
            .unwrap_err();
        match err.kind() {
            ErrorKind::InvalidCircuit(msg) => assert!(msg.contains("3 rows")),
            e => panic!("unexpected error {:?}", e),
        }
    }
}
