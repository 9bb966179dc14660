use super::messages::{
    check_ack, decode_outputs, decode_wire_id, encode_input_labels, GroupAnnouncement,
    SessionSetup,
};
use super::{SessionConfig, SessionContext, TransferMode};
use crate::base_ot::diffie_hellman::DiffieHellmanOt;
use crate::base_ot::plaintext::PlaintextTransfer;
use crate::base_ot::ObliviousSender;
use crate::communication::BinaryChannel;
use crate::errors::*;
use crate::garble::{KeyPair, WireId, WireLabel};
use crate::group::{fingerprint, Group};
use rand::{CryptoRng, RngCore};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// The garbler's side of the label transfer.
pub struct TransferCoordinator<G: Group, R: RngCore + CryptoRng> {
    config: SessionConfig,
    group: Option<G>,
    rng: R,
}

impl<G: Group, R: RngCore + CryptoRng> TransferCoordinator<G, R> {
    pub fn new(config: SessionConfig, rng: R) -> Self {
        TransferCoordinator {
            config,
            group: None,
            rng,
        }
    }

    /// Uses `group` instead of `G::generate()`. Each session works on its own copy.
    pub fn with_group(mut self, group: G) -> Self {
        self.group = Some(group);
        self
    }

    /// Hands over the garbler's own input labels, obliviously transfers one label of every
    /// pair in `key_pairs` and returns the outputs reported by the evaluator.
    pub fn get_result<C: BinaryChannel>(
        &mut self,
        conn: &mut C,
        garbler_inputs: &BTreeMap<WireId, WireLabel>,
        key_pairs: &BTreeMap<WireId, KeyPair>,
    ) -> Result<BTreeMap<WireId, bool>> {
        debug!("sending {} garbler input labels", garbler_inputs.len());
        let reply = conn.send_wait(&encode_input_labels(garbler_inputs)?)?;
        check_ack(&reply)?;

        let context = self.setup(conn, key_pairs.len())?;
        match context.group() {
            Some(group) => transfer_keys(
                conn,
                &mut DiffieHellmanOt::new(group, &mut self.rng),
                key_pairs,
            )?,
            None => transfer_keys(conn, &mut PlaintextTransfer, key_pairs)?,
        }

        let outputs = decode_outputs(&conn.receive()?)?;
        debug!("evaluator reported {} outputs", outputs.len());
        Ok(outputs)
    }

    fn setup<C: BinaryChannel>(
        &self,
        conn: &mut C,
        wire_count: usize,
    ) -> Result<SessionContext<G>> {
        let context = match self.config.mode {
            TransferMode::Oblivious => {
                let group = match self.group {
                    Some(ref group) => group.clone(),
                    None => G::generate(),
                };
                if let Some(expected) = self.config.expected_group {
                    if group.fingerprint() != expected {
                        warn!("configured group does not have the expected fingerprint");
                        return Err(ErrorKind::GroupMismatch.into());
                    }
                }
                SessionContext::oblivious(group, wire_count)
            }
            TransferMode::Plaintext => SessionContext::plaintext(wire_count),
        };

        let setup = SessionSetup {
            mode: context.mode(),
            wire_count,
            group: context.group().map(|group| {
                let descriptor = group.descriptor();
                GroupAnnouncement {
                    fingerprint: fingerprint(&descriptor),
                    descriptor,
                }
            }),
        };
        conn.send(&setup.encode()?)?;
        debug!(
            "session set up: {:?} mode, {} wires",
            context.mode(),
            context.wire_count()
        );
        Ok(context)
    }
}

/// Serves exactly `key_pairs.len()` transfers, in whatever order the evaluator asks.
fn transfer_keys<S, C>(
    conn: &mut C,
    sender: &mut S,
    key_pairs: &BTreeMap<WireId, KeyPair>,
) -> Result<()>
where
    S: ObliviousSender,
    C: BinaryChannel,
{
    let mut seen = BTreeSet::new();
    for _ in 0..key_pairs.len() {
        let wire = decode_wire_id(&conn.receive()?)?;
        if !seen.insert(wire) {
            warn!("wire {} requested twice", wire);
            return Err(ErrorKind::DuplicateWire(wire).into());
        }
        let pair = match key_pairs.get(&wire) {
            Some(pair) => pair,
            None => {
                warn!("wire {} has no key pair", wire);
                return Err(ErrorKind::UnknownWire(wire).into());
            }
        };
        debug!("transferring label of wire {}", wire);
        sender.send(conn, &pair.zero.to_bytes(), &pair.one.to_bytes())?;
    }
    Ok(())
}
