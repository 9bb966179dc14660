use rand::SeedableRng;
use rand_chacha::ChaChaRng;
use std::collections::BTreeMap;
use std::net::{TcpListener, TcpStream};
use std::str::FromStr;
use std::time::Duration;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tungstenite::stream::MaybeTlsStream;
use yao_ot::errors::*;
use yao_ot::garble::{Circuit, GateKind, WireId};
use yao_ot::group::{Group, GroupKind, ModPGroup, RistrettoGroup};
use yao_ot::session::{run_evaluator, run_garbler, SessionConfig};

#[derive(Debug, Clone, Copy)]
enum Role {
    Garbler,
    Evaluator,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
        match s {
            "garbler" => Ok(Role::Garbler),
            "evaluator" => Ok(Role::Evaluator),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

fn parse_bit(s: &str) -> ::std::result::Result<bool, String> {
    match s {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(format!("input bit must be 0 or 1, got '{}'", other)),
    }
}

#[derive(StructOpt, Debug)]
#[structopt(name = "yao_party", about = "Runs one party of a single-gate Yao session")]
struct Opt {
    #[structopt(name = "role", help = "garbler (listens) or evaluator (connects)")]
    role: Role,
    #[structopt(name = "bit", help = "Private input bit, 0 or 1", parse(try_from_str = parse_bit))]
    bit: bool,
    #[structopt(short, long, default_value = "127.0.0.1:8123", help = "Address to listen on or connect to")]
    address: String,
    #[structopt(short, long, default_value = "and", help = "and, or, xor, nand, nor, xnor or not")]
    gate: GateKind,
    #[structopt(long, default_value = "ristretto", help = "Group for the oblivious transfer: ristretto or modp")]
    group: GroupKind,
    #[structopt(long, help = "Send both labels in the clear, for debugging only")]
    plaintext: bool,
    #[structopt(long, help = "Talk over a websocket instead of plain TCP")]
    websocket: bool,
    #[structopt(long, default_value = "30", help = "Receive timeout in seconds, 0 waits forever")]
    timeout: u64,
}

/// Assigns `bit` to every wire of `wires`.
fn inputs(wires: &[WireId], bit: bool) -> BTreeMap<WireId, bool> {
    wires.iter().map(|w| (*w, bit)).collect()
}

fn handshake_error<E: ::std::fmt::Display>(e: E) -> Error {
    Error::from(format!("websocket handshake failed: {}", e))
}

fn run_party<G: Group>(
    opt: &Opt,
    circuit: &Circuit,
    config: SessionConfig,
    timeout: Option<Duration>,
) -> Result<BTreeMap<WireId, bool>> {
    let rng = ChaChaRng::from_entropy();
    match opt.role {
        Role::Garbler => {
            let bits = inputs(&circuit.garbler_inputs, opt.bit);
            let listener = TcpListener::bind(&opt.address)?;
            info!("waiting for the evaluator on {}", opt.address);
            let (mut stream, peer) = listener.accept()?;
            info!("evaluator connected from {}", peer);
            stream.set_read_timeout(timeout)?;
            if opt.websocket {
                let mut ws = tungstenite::accept(stream).map_err(handshake_error)?;
                run_garbler::<G, _, _>(&mut ws, circuit, &bits, config, None, rng)
            } else {
                run_garbler::<G, _, _>(&mut stream, circuit, &bits, config, None, rng)
            }
        }
        Role::Evaluator => {
            let bits = inputs(&circuit.evaluator_inputs, opt.bit);
            if opt.websocket {
                let url = format!("ws://{}/yao", opt.address);
                let (mut ws, _) = tungstenite::connect(url.as_str())?;
                if let MaybeTlsStream::Plain(ref stream) = *ws.get_ref() {
                    stream.set_read_timeout(timeout)?;
                }
                run_evaluator::<G, _, _>(&mut ws, circuit, &bits, config, rng)
            } else {
                let mut stream = TcpStream::connect(&opt.address)?;
                stream.set_read_timeout(timeout)?;
                run_evaluator::<G, _, _>(&mut stream, circuit, &bits, config, rng)
            }
        }
    }
}

fn run(opt: Opt) -> Result<()> {
    let circuit = Circuit::single_gate(opt.gate);
    let config = if opt.plaintext {
        SessionConfig::plaintext()
    } else {
        SessionConfig::default()
    };
    let timeout = match opt.timeout {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    info!("running {:?} of '{}' circuit", opt.role, circuit.name);

    let outputs = match opt.group {
        GroupKind::ModP => run_party::<ModPGroup>(&opt, &circuit, config, timeout)?,
        GroupKind::Ristretto => run_party::<RistrettoGroup>(&opt, &circuit, config, timeout)?,
    };
    for (wire, bit) in &outputs {
        println!("{} = {}", wire, *bit as u8);
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(ref e) = run(Opt::from_args()) {
        eprintln!("error: {}", e);
        for e in e.iter().skip(1) {
            eprintln!("caused by: {}", e);
        }
        ::std::process::exit(1);
    }
}
