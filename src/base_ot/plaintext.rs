//! Cleartext stand-in for the OT: the sender ships both secrets and the receiver keeps
//! one. No security whatsoever, only meant for testing and debugging sessions.
use super::{ObliviousReceiver, ObliviousSender};
use crate::common::codec::{Reader, Writer};
use crate::communication::BinaryChannel;
use crate::errors::*;

#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextTransfer;

impl ObliviousSender for PlaintextTransfer {
    fn send<C: BinaryChannel>(&mut self, conn: &mut C, m0: &[u8], m1: &[u8]) -> Result<()> {
        if m0.len() != m1.len() {
            return Err(ErrorKind::LengthMismatch(m0.len(), m1.len()).into());
        }
        let mut w = Writer::new();
        w.put_bytes(m0)?.put_bytes(m1)?;
        conn.send(&w.into_inner())
    }
}

impl ObliviousReceiver for PlaintextTransfer {
    fn receive<C: BinaryChannel>(&mut self, conn: &mut C, choice: bool) -> Result<Vec<u8>> {
        let frame = conn.receive()?;
        let mut r = Reader::new(&frame, "plaintext pair");
        let pair = [r.read_bytes()?, r.read_bytes()?];
        r.finish()?;
        Ok(pair[choice as usize].to_vec())
    }
}
