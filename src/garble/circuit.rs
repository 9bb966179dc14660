//! Boolean circuits over single-output gates, stored in topological order.
use super::WireId;
use crate::errors::*;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
    Not,
}

impl GateKind {
    pub fn arity(self) -> usize {
        match self {
            GateKind::Not => 1,
            _ => 2,
        }
    }

    /// Truth function of the gate. `b` is ignored by unary gates.
    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            GateKind::And => a & b,
            GateKind::Or => a | b,
            GateKind::Xor => a ^ b,
            GateKind::Nand => !(a & b),
            GateKind::Nor => !(a | b),
            GateKind::Xnor => !(a ^ b),
            GateKind::Not => !a,
        }
    }

    fn eval(self, inputs: &[bool]) -> bool {
        self.apply(inputs[0], inputs.get(1).cloned().unwrap_or(false))
    }
}

impl FromStr for GateKind {
    type Err = String;

    fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "and" => Ok(GateKind::And),
            "or" => Ok(GateKind::Or),
            "xor" => Ok(GateKind::Xor),
            "nand" => Ok(GateKind::Nand),
            "nor" => Ok(GateKind::Nor),
            "xnor" => Ok(GateKind::Xnor),
            "not" => Ok(GateKind::Not),
            other => Err(format!("unknown gate '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
    pub output: WireId,
    pub kind: GateKind,
    pub inputs: Vec<WireId>,
}

impl Gate {
    pub fn new(output: WireId, kind: GateKind, inputs: Vec<WireId>) -> Self {
        Gate {
            output,
            kind,
            inputs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circuit {
    pub name: String,
    pub garbler_inputs: Vec<WireId>,
    pub evaluator_inputs: Vec<WireId>,
    pub outputs: Vec<WireId>,
    pub gates: Vec<Gate>,
}

impl Circuit {
    pub fn new(
        name: &str,
        garbler_inputs: Vec<WireId>,
        evaluator_inputs: Vec<WireId>,
        outputs: Vec<WireId>,
        gates: Vec<Gate>,
    ) -> Result<Self> {
        let circuit = Circuit {
            name: name.to_owned(),
            garbler_inputs,
            evaluator_inputs,
            outputs,
            gates,
        };
        circuit.validate()?;
        Ok(circuit)
    }

    /// One gate fed by both parties: wire 1 belongs to the garbler, wire 2 to the evaluator
    /// and wire 3 is the output. A NOT gate only reads the evaluator's wire 1 into wire 2.
    pub fn single_gate(kind: GateKind) -> Self {
        let name = format!("{:?}", kind).to_lowercase();
        if kind.arity() == 1 {
            Circuit {
                name,
                garbler_inputs: vec![],
                evaluator_inputs: vec![WireId(1)],
                outputs: vec![WireId(2)],
                gates: vec![Gate::new(WireId(2), kind, vec![WireId(1)])],
            }
        } else {
            Circuit {
                name,
                garbler_inputs: vec![WireId(1)],
                evaluator_inputs: vec![WireId(2)],
                outputs: vec![WireId(3)],
                gates: vec![Gate::new(WireId(3), kind, vec![WireId(1), WireId(2)])],
            }
        }
    }

    /// Checks that every wire is defined once and before it is read, and that every gate
    /// has as many inputs as its kind takes.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| -> Error { ErrorKind::InvalidCircuit(reason).into() };
        let mut defined = BTreeSet::new();
        for wire in self.garbler_inputs.iter().chain(&self.evaluator_inputs) {
            if !defined.insert(*wire) {
                return Err(invalid(format!("input wire {} declared twice", wire)));
            }
        }
        for gate in &self.gates {
            if gate.inputs.len() != gate.kind.arity() {
                return Err(invalid(format!(
                    "gate {} takes {} inputs, got {}",
                    gate.output,
                    gate.kind.arity(),
                    gate.inputs.len()
                )));
            }
            if let Some(wire) = gate.inputs.iter().find(|w| !defined.contains(*w)) {
                return Err(invalid(format!(
                    "gate {} reads undefined wire {}",
                    gate.output, wire
                )));
            }
            if !defined.insert(gate.output) {
                return Err(invalid(format!("wire {} driven twice", gate.output)));
            }
        }
        if let Some(wire) = self.outputs.iter().find(|w| !defined.contains(*w)) {
            return Err(invalid(format!("output wire {} is never driven", wire)));
        }
        Ok(())
    }

    /// Evaluates the circuit on cleartext bits.
    pub fn evaluate_plain(
        &self,
        garbler_bits: &BTreeMap<WireId, bool>,
        evaluator_bits: &BTreeMap<WireId, bool>,
    ) -> Result<BTreeMap<WireId, bool>> {
        let mut values = BTreeMap::new();
        for (wires, bits) in &[
            (&self.garbler_inputs, garbler_bits),
            (&self.evaluator_inputs, evaluator_bits),
        ] {
            for wire in wires.iter() {
                let bit = bits.get(wire).ok_or(ErrorKind::MissingWire(*wire))?;
                values.insert(*wire, *bit);
            }
        }
        for gate in &self.gates {
            let inputs = gate
                .inputs
                .iter()
                .map(|w| values.get(w).cloned().ok_or_else(|| ErrorKind::MissingWire(*w).into()))
                .collect::<Result<Vec<bool>>>()?;
            values.insert(gate.output, gate.kind.eval(&inputs));
        }
        self.outputs
            .iter()
            .map(|w| {
                values
                    .get(w)
                    .map(|bit| (*w, *bit))
                    .ok_or_else(|| ErrorKind::MissingWire(*w).into())
            })
            .collect()
    }
}
