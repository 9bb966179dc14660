use super::messages::{
    decode_input_labels, encode_outputs, encode_wire_id, SessionSetup, ACK,
};
use super::{SessionConfig, SessionContext};
use crate::base_ot::diffie_hellman::DiffieHellmanOt;
use crate::base_ot::plaintext::PlaintextTransfer;
use crate::base_ot::ObliviousReceiver;
use crate::communication::BinaryChannel;
use crate::errors::*;
use crate::garble::{evaluate, Circuit, GarbledTables, WireId, WireLabel};
use crate::group::{fingerprint, Group};
use rand::{CryptoRng, RngCore};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use tracing::{debug, warn};

/// The evaluator's side of the label transfer.
pub struct TransferResponder<G: Group, R: RngCore + CryptoRng> {
    config: SessionConfig,
    rng: R,
    group: PhantomData<G>,
}

impl<G: Group, R: RngCore + CryptoRng> TransferResponder<G, R> {
    pub fn new(config: SessionConfig, rng: R) -> Self {
        TransferResponder {
            config,
            rng,
            group: PhantomData,
        }
    }

    /// Obtains one label per entry of `bits`, evaluates the garbled circuit and reports the
    /// outputs back to the garbler.
    pub fn send_result<C: BinaryChannel>(
        &mut self,
        conn: &mut C,
        circuit: &Circuit,
        tables: &GarbledTables,
        pbits_out: &BTreeMap<WireId, bool>,
        bits: &BTreeMap<WireId, bool>,
    ) -> Result<BTreeMap<WireId, bool>> {
        let garbler_inputs = decode_input_labels(&conn.receive()?)?;
        conn.send(&[ACK])?;
        debug!("received {} garbler input labels", garbler_inputs.len());

        let setup = SessionSetup::decode(&conn.receive()?)?;
        let context = self.adopt(setup, bits.len())?;
        let evaluator_inputs = match context.group() {
            Some(group) => {
                receive_keys(conn, &mut DiffieHellmanOt::new(group, &mut self.rng), bits)?
            }
            None => receive_keys(conn, &mut PlaintextTransfer, bits)?,
        };

        let outputs = evaluate(
            circuit,
            tables,
            pbits_out,
            &garbler_inputs,
            &evaluator_inputs,
        )?;
        conn.send(&encode_outputs(&outputs)?)?;
        debug!("evaluated '{}', sent {} outputs", circuit.name, outputs.len());
        Ok(outputs)
    }

    /// Checks the garbler's announcement against the local configuration.
    fn adopt(&self, setup: SessionSetup, wire_count: usize) -> Result<SessionContext<G>> {
        if setup.mode != self.config.mode {
            warn!(
                "garbler runs in {:?} mode, we are configured for {:?}",
                setup.mode, self.config.mode
            );
            return Err(ErrorKind::ModeMismatch(self.config.mode, setup.mode).into());
        }
        if setup.wire_count != wire_count {
            warn!(
                "garbler transfers {} wires, we own {}",
                setup.wire_count, wire_count
            );
            return Err(ErrorKind::WireCountMismatch(wire_count, setup.wire_count).into());
        }
        let announced = match setup.group {
            Some(announced) => announced,
            None => return Ok(SessionContext::plaintext(wire_count)),
        };
        if fingerprint(&announced.descriptor) != announced.fingerprint {
            warn!("group descriptor does not match its fingerprint");
            return Err(ErrorKind::GroupMismatch.into());
        }
        if let Some(expected) = self.config.expected_group {
            if expected != announced.fingerprint {
                warn!("garbler announced an unexpected group");
                return Err(ErrorKind::GroupMismatch.into());
            }
        }
        let group = G::from_descriptor(&announced.descriptor)?;
        debug!("adopted {:?} group", G::KIND);
        Ok(SessionContext::oblivious(group, wire_count))
    }
}

/// Asks for every wire in `bits`, in key order, and collects the received labels.
fn receive_keys<S, C>(
    conn: &mut C,
    receiver: &mut S,
    bits: &BTreeMap<WireId, bool>,
) -> Result<BTreeMap<WireId, WireLabel>>
where
    S: ObliviousReceiver,
    C: BinaryChannel,
{
    let mut labels = BTreeMap::new();
    for (wire, bit) in bits {
        debug!("requesting label of wire {}", wire);
        conn.send(&encode_wire_id(*wire))?;
        let label = WireLabel::from_bytes(&receiver.receive(conn, *bit)?)?;
        labels.insert(*wire, label);
    }
    Ok(labels)
}
