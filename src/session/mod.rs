//! # Session
//!
//! Drives one garbled-circuit session between the garbler ([`TransferCoordinator`]) and the
//! evaluator ([`TransferResponder`]). The message order is fixed, see [`messages`].
//!
//! Both sides agree on the transfer mode, the number of evaluator wires and the group before
//! the per-wire loop starts, and fail with a dedicated error kind if they don't. All errors
//! are terminal for the session.
use crate::communication::BinaryChannel;
use crate::errors::*;
use crate::garble::{Circuit, GarbledCircuit, WireId};
use crate::group::{Fingerprint, Group};
use rand::{CryptoRng, RngCore};
use std::collections::BTreeMap;
use tracing::debug;

pub mod coordinator;
pub mod messages;
pub mod responder;

pub use self::coordinator::TransferCoordinator;
pub use self::responder::TransferResponder;

/// How the evaluator's labels are handed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Diffie-Hellman oblivious transfer.
    Oblivious,
    /// Both labels in the clear, for testing and debugging only.
    Plaintext,
}

impl Default for TransferMode {
    fn default() -> Self {
        TransferMode::Oblivious
    }
}

impl TransferMode {
    pub fn to_byte(self) -> u8 {
        match self {
            TransferMode::Plaintext => 0,
            TransferMode::Oblivious => 1,
        }
    }

    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            0 => Ok(TransferMode::Plaintext),
            1 => Ok(TransferMode::Oblivious),
            _ => Err(ErrorKind::MalformedMessage(format!("unknown transfer mode {}", b)).into()),
        }
    }
}

/// Per-party settings, fixed before the session starts.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub mode: TransferMode,
    /// If set, the session aborts unless the agreed group has this fingerprint.
    pub expected_group: Option<Fingerprint>,
}

impl SessionConfig {
    pub fn plaintext() -> Self {
        SessionConfig::default().with_mode(TransferMode::Plaintext)
    }

    pub fn with_mode(mut self, mode: TransferMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_expected_group(mut self, fingerprint: Fingerprint) -> Self {
        self.expected_group = Some(fingerprint);
        self
    }
}

/// What both parties agreed on at setup. Never changes for the rest of the session.
#[derive(Debug, Clone)]
pub struct SessionContext<G: Group> {
    mode: TransferMode,
    group: Option<G>,
    wire_count: usize,
}

impl<G: Group> SessionContext<G> {
    pub fn oblivious(group: G, wire_count: usize) -> Self {
        SessionContext {
            mode: TransferMode::Oblivious,
            group: Some(group),
            wire_count,
        }
    }

    pub fn plaintext(wire_count: usize) -> Self {
        SessionContext {
            mode: TransferMode::Plaintext,
            group: None,
            wire_count,
        }
    }

    pub fn mode(&self) -> TransferMode {
        self.mode
    }

    /// The agreed group, `None` in plaintext mode.
    pub fn group(&self) -> Option<&G> {
        self.group.as_ref()
    }

    pub fn wire_count(&self) -> usize {
        self.wire_count
    }
}

/// Runs the garbler's side of a whole session: garbles `circuit`, ships the tables and
/// then acts as coordinator. Uses `group` if given, a default one otherwise.
pub fn run_garbler<G, C, R>(
    conn: &mut C,
    circuit: &Circuit,
    bits: &BTreeMap<WireId, bool>,
    config: SessionConfig,
    group: Option<G>,
    mut rng: R,
) -> Result<BTreeMap<WireId, bool>>
where
    G: Group,
    C: BinaryChannel,
    R: RngCore + CryptoRng,
{
    let garbled = GarbledCircuit::garble(circuit, &mut rng)?;
    conn.send(&messages::encode_garbled_tables(
        garbled.tables(),
        garbled.output_pbits(),
    )?)?;
    debug!("sent garbled tables of '{}'", circuit.name);

    let garbler_inputs = garbled.garbler_inputs(bits)?;
    let mut coordinator = TransferCoordinator::new(config, rng);
    if let Some(group) = group {
        coordinator = coordinator.with_group(group);
    }
    coordinator.get_result(conn, &garbler_inputs, &garbled.evaluator_key_pairs())
}

/// Runs the evaluator's side of a whole session, see [`run_garbler`].
pub fn run_evaluator<G, C, R>(
    conn: &mut C,
    circuit: &Circuit,
    bits: &BTreeMap<WireId, bool>,
    config: SessionConfig,
    rng: R,
) -> Result<BTreeMap<WireId, bool>>
where
    G: Group,
    C: BinaryChannel,
    R: RngCore + CryptoRng,
{
    let (tables, pbits_out) = messages::decode_garbled_tables(&conn.receive()?)?;
    debug!("received garbled tables of '{}'", circuit.name);
    TransferResponder::<G, R>::new(config, rng).send_result(conn, circuit, &tables, &pbits_out, bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::corrupted::CorruptedChannel;
    use crate::communication::memory::MemoryChannel;
    use crate::garble::{GateKind, KeyPair, WireLabel};
    use crate::group::{ModPGroup, RistrettoGroup};
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use std::time::Duration;

    type Outputs = BTreeMap<WireId, bool>;

    fn bits(pairs: &[(u32, bool)]) -> Outputs {
        pairs.iter().map(|&(w, b)| (WireId(w), b)).collect()
    }

    fn pair() -> (MemoryChannel, MemoryChannel) {
        let (a, b) = MemoryChannel::pair();
        let timeout = Duration::from_secs(10);
        (a.with_timeout(timeout), b.with_timeout(timeout))
    }

    /// Runs a single-gate session, garbler input `a` on wire 1, evaluator input `b` on wire 2.
    fn run_gate<G>(
        kind: GateKind,
        a: bool,
        b: bool,
        garbler_config: SessionConfig,
        evaluator_config: SessionConfig,
        group: Option<G>,
    ) -> (Result<Outputs>, Result<Outputs>)
    where
        G: Group + Send + 'static,
    {
        let circuit = Circuit::single_gate(kind);
        let (mut garbler_conn, mut evaluator_conn) = pair();
        let garbler_circuit = circuit.clone();
        let garbler = thread::spawn(move || {
            run_garbler(
                &mut garbler_conn,
                &garbler_circuit,
                &bits(&[(1, a)]),
                garbler_config,
                group,
                ChaChaRng::seed_from_u64(1),
            )
        });
        let evaluated = run_evaluator::<G, _, _>(
            &mut evaluator_conn,
            &circuit,
            &bits(&[(2, b)]),
            evaluator_config,
            ChaChaRng::seed_from_u64(2),
        );
        drop(evaluator_conn);
        (garbler.join().unwrap(), evaluated)
    }

    fn expected(kind: GateKind, a: bool, b: bool) -> Outputs {
        Circuit::single_gate(kind)
            .evaluate_plain(&bits(&[(1, a)]), &bits(&[(2, b)]))
            .unwrap()
    }

    const INPUTS: [(bool, bool); 4] = [(false, false), (false, true), (true, false), (true, true)];

    #[test]
    fn plaintext_session_matches_truth_table() {
        for &(a, b) in &INPUTS {
            let (garbler, evaluator) = run_gate::<RistrettoGroup>(
                GateKind::And,
                a,
                b,
                SessionConfig::plaintext(),
                SessionConfig::plaintext(),
                None,
            );
            let out = evaluator.unwrap();
            assert_eq!(out, bits(&[(3, a && b)]));
            assert_eq!(garbler.unwrap(), out);
        }
    }

    #[test]
    fn oblivious_session_matches_plaintext_session() {
        for &(a, b) in &INPUTS {
            let (_, plain) = run_gate::<RistrettoGroup>(
                GateKind::And,
                a,
                b,
                SessionConfig::plaintext(),
                SessionConfig::plaintext(),
                None,
            );
            let (garbler, evaluator) = run_gate::<RistrettoGroup>(
                GateKind::And,
                a,
                b,
                SessionConfig::default(),
                SessionConfig::default(),
                None,
            );
            let out = evaluator.unwrap();
            assert_eq!(out, plain.unwrap());
            assert_eq!(garbler.unwrap(), out);
        }
    }

    #[test]
    fn oblivious_session_over_modp() {
        let group = ModPGroup::generate();
        let config = SessionConfig::default().with_expected_group(group.fingerprint());
        for &(a, b) in &[(true, true), (true, false)] {
            let (garbler, evaluator) =
                run_gate(GateKind::Xor, a, b, config.clone(), config.clone(), Some(group.clone()));
            assert_eq!(evaluator.unwrap(), expected(GateKind::Xor, a, b));
            assert_eq!(garbler.unwrap(), expected(GateKind::Xor, a, b));
        }
    }

    #[test]
    fn not_gate_without_garbler_inputs() {
        let circuit = Circuit::single_gate(GateKind::Not);
        let (mut garbler_conn, mut evaluator_conn) = pair();
        let garbler_circuit = circuit.clone();
        let garbler = thread::spawn(move || {
            run_garbler::<RistrettoGroup, _, _>(
                &mut garbler_conn,
                &garbler_circuit,
                &BTreeMap::new(),
                SessionConfig::default(),
                None,
                ChaChaRng::seed_from_u64(3),
            )
        });
        let out = run_evaluator::<RistrettoGroup, _, _>(
            &mut evaluator_conn,
            &circuit,
            &bits(&[(1, false)]),
            SessionConfig::default(),
            ChaChaRng::seed_from_u64(4),
        )
        .unwrap();
        assert_eq!(out, bits(&[(2, true)]));
        assert_eq!(garbler.join().unwrap().unwrap(), out);
    }

    #[test]
    fn mode_mismatch_aborts_both_sides() {
        let (garbler, evaluator) = run_gate::<RistrettoGroup>(
            GateKind::Or,
            true,
            false,
            SessionConfig::plaintext(),
            SessionConfig::default(),
            None,
        );
        match evaluator.unwrap_err().kind() {
            ErrorKind::ModeMismatch(TransferMode::Oblivious, TransferMode::Plaintext) => (),
            e => panic!("unexpected error {:?}", e),
        }
        match garbler.unwrap_err().kind() {
            ErrorKind::ChannelClosed => (),
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn unexpected_group_is_rejected() {
        let evaluator_config =
            SessionConfig::default().with_expected_group(RistrettoGroup.fingerprint());
        let (garbler, evaluator) = run_gate(
            GateKind::And,
            true,
            true,
            SessionConfig::default(),
            evaluator_config,
            Some(ModPGroup::generate()),
        );
        match evaluator.unwrap_err().kind() {
            ErrorKind::GroupMismatch => (),
            e => panic!("unexpected error {:?}", e),
        }
        assert!(garbler.is_err());
    }

    /// Labels for evaluator wires 2..2+n, garbler input on wire 1.
    fn labels(n: u32) -> (BTreeMap<WireId, WireLabel>, BTreeMap<WireId, KeyPair>) {
        let mut rng = ChaChaRng::seed_from_u64(50);
        let mut garbler = BTreeMap::new();
        garbler.insert(WireId(1), WireLabel::random(&mut rng, false));
        let pairs = (2..2 + n)
            .map(|w| {
                let pair = KeyPair {
                    zero: WireLabel::random(&mut rng, true),
                    one: WireLabel::random(&mut rng, false),
                };
                (WireId(w), pair)
            })
            .collect();
        (garbler, pairs)
    }

    #[test]
    fn responder_with_more_wires_detects_desync() {
        // the garbler transfers one wire, the evaluator owns two
        let circuit = Circuit::new(
            "two",
            vec![WireId(1)],
            vec![WireId(2), WireId(3)],
            vec![WireId(4)],
            vec![crate::garble::Gate::new(
                WireId(4),
                GateKind::And,
                vec![WireId(2), WireId(3)],
            )],
        )
        .unwrap();
        let (mut garbler_conn, mut evaluator_conn) = pair();
        let garbler = thread::spawn(move || {
            let (inputs, pairs) = labels(1);
            TransferCoordinator::<RistrettoGroup, _>::new(
                SessionConfig::default(),
                ChaChaRng::seed_from_u64(5),
            )
            .get_result(&mut garbler_conn, &inputs, &pairs)
        });
        let err = TransferResponder::<RistrettoGroup, _>::new(
            SessionConfig::default(),
            ChaChaRng::seed_from_u64(6),
        )
        .send_result(
            &mut evaluator_conn,
            &circuit,
            &Default::default(),
            &Default::default(),
            &bits(&[(2, true), (3, false)]),
        )
        .unwrap_err();
        match err.kind() {
            ErrorKind::WireCountMismatch(2, 1) => (),
            e => panic!("unexpected error {:?}", e),
        }
        drop(evaluator_conn);
        match garbler.join().unwrap().unwrap_err().kind() {
            ErrorKind::ChannelClosed => (),
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn unknown_wire_is_rejected_by_coordinator() {
        let circuit = Circuit::single_gate(GateKind::And);
        let (mut garbler_conn, mut evaluator_conn) = pair();
        let garbler = thread::spawn(move || {
            let (inputs, pairs) = labels(1);
            TransferCoordinator::<RistrettoGroup, _>::new(
                SessionConfig::plaintext(),
                ChaChaRng::seed_from_u64(7),
            )
            .get_result(&mut garbler_conn, &inputs, &pairs)
        });
        // same count, but the evaluator asks for wire 9
        let evaluated = TransferResponder::<RistrettoGroup, _>::new(
            SessionConfig::plaintext(),
            ChaChaRng::seed_from_u64(8),
        )
        .send_result(
            &mut evaluator_conn,
            &circuit,
            &Default::default(),
            &Default::default(),
            &bits(&[(9, true)]),
        );
        match garbler.join().unwrap().unwrap_err().kind() {
            ErrorKind::UnknownWire(WireId(9)) => (),
            e => panic!("unexpected error {:?}", e),
        }
        match evaluated.unwrap_err().kind() {
            ErrorKind::ChannelClosed => (),
            e => panic!("unexpected error {:?}", e),
        }
    }

    fn flip_label_pbit(count: &mut usize, frame: &mut Vec<u8>) {
        *count += 1;
        // frames: tables, input labels, setup, c, then the masked labels
        if *count == 5 {
            if let Some(last) = frame.last_mut() {
                *last ^= 2;
            }
        }
    }

    #[test]
    fn corrupted_label_fails_evaluation() {
        let circuit = Circuit::single_gate(GateKind::And);
        let (mut garbler_conn, evaluator_conn) = pair();
        let garbler_circuit = circuit.clone();
        let garbler = thread::spawn(move || {
            run_garbler::<RistrettoGroup, _, _>(
                &mut garbler_conn,
                &garbler_circuit,
                &bits(&[(1, true)]),
                SessionConfig::default(),
                None,
                ChaChaRng::seed_from_u64(9),
            )
        });
        let mut conn = CorruptedChannel::new_corrupt(evaluator_conn, 0, flip_label_pbit);
        // choosing 1 makes the evaluator unmask the last field of the payload
        let err = run_evaluator::<RistrettoGroup, _, _>(
            &mut conn,
            &circuit,
            &bits(&[(2, true)]),
            SessionConfig::default(),
            ChaChaRng::seed_from_u64(10),
        )
        .unwrap_err();
        match err.kind() {
            ErrorKind::MalformedMessage(msg) => assert!(msg.contains("permute bit")),
            e => panic!("unexpected error {:?}", e),
        }
        drop(conn);
        assert!(garbler.join().unwrap().is_err());
    }

    #[test]
    fn session_over_loopback_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let circuit = Circuit::single_gate(GateKind::Nand);
        let evaluator_circuit = circuit.clone();
        let evaluator = thread::spawn(move || {
            let mut stream = listener.accept().unwrap().0;
            stream
                .set_read_timeout(Some(Duration::from_secs(10)))
                .unwrap();
            run_evaluator::<RistrettoGroup, _, _>(
                &mut stream,
                &evaluator_circuit,
                &bits(&[(2, true)]),
                SessionConfig::default(),
                ChaChaRng::seed_from_u64(11),
            )
        });
        let mut stream = TcpStream::connect(addr).unwrap();
        let out = run_garbler::<RistrettoGroup, _, _>(
            &mut stream,
            &circuit,
            &bits(&[(1, true)]),
            SessionConfig::default(),
            None,
            ChaChaRng::seed_from_u64(12),
        )
        .unwrap();
        assert_eq!(out, bits(&[(3, false)]));
        assert_eq!(evaluator.join().unwrap().unwrap(), out);
    }
}
