//! Encoding of every message exchanged in a session, in protocol order:
//!
//! 0. garbler -> evaluator: garbled tables and output permute bits (`run_garbler` only)
//! 1. garbler -> evaluator: the garbler's input labels
//! 2. evaluator -> garbler: acknowledgement
//! 3. garbler -> evaluator: [`SessionSetup`]
//! 4. per wire: evaluator -> garbler: wire id, then one transfer
//! 5. evaluator -> garbler: outputs
use super::TransferMode;
use crate::common::codec::{length_prefix, Reader, Writer};
use crate::errors::*;
use crate::garble::{GarbledTables, WireId, WireLabel, LABEL_LENGTH};
use crate::group::Fingerprint;
use std::collections::BTreeMap;
use std::convert::TryFrom;

pub const ACK: u8 = 1;

fn put_count(w: &mut Writer, count: usize) -> Result<()> {
    w.put_u32(length_prefix(count)?);
    Ok(())
}

/// Adds a decoded entry. A wire may appear only once per message.
fn insert_once<V>(
    map: &mut BTreeMap<WireId, V>,
    wire: WireId,
    value: V,
    what: &str,
) -> Result<()> {
    if map.insert(wire, value).is_some() {
        return Err(
            ErrorKind::MalformedMessage(format!("{}: {} appears twice", what, wire)).into(),
        );
    }
    Ok(())
}

pub fn encode_input_labels(labels: &BTreeMap<WireId, WireLabel>) -> Result<Vec<u8>> {
    let mut w = Writer::new();
    put_count(&mut w, labels.len())?;
    for (wire, label) in labels {
        w.put_u32(wire.0).put_raw(&label.to_bytes());
    }
    Ok(w.into_inner())
}

pub fn decode_input_labels(frame: &[u8]) -> Result<BTreeMap<WireId, WireLabel>> {
    let mut r = Reader::new(frame, "input labels");
    let count = r.read_u32()?;
    let mut labels = BTreeMap::new();
    for _ in 0..count {
        let wire = WireId(r.read_u32()?);
        let label = WireLabel::from_bytes(r.read_raw(LABEL_LENGTH)?)?;
        insert_once(&mut labels, wire, label, "input labels")?;
    }
    r.finish()?;
    Ok(labels)
}

pub fn check_ack(frame: &[u8]) -> Result<()> {
    if frame.len() == 1 && frame[0] == ACK {
        Ok(())
    } else {
        Err(ErrorKind::MalformedMessage("expected acknowledgement".to_owned()).into())
    }
}

/// The group as announced by the garbler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAnnouncement {
    pub descriptor: Vec<u8>,
    pub fingerprint: Fingerprint,
}

/// Everything the evaluator checks before the per-wire loop starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSetup {
    pub mode: TransferMode,
    pub wire_count: usize,
    /// Present exactly in oblivious mode.
    pub group: Option<GroupAnnouncement>,
}

impl SessionSetup {
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut w = Writer::new();
        w.put_u8(self.mode.to_byte());
        put_count(&mut w, self.wire_count)?;
        match self.group {
            Some(ref group) => {
                w.put_u8(1)
                    .put_bytes(&group.descriptor)?
                    .put_raw(&group.fingerprint);
            }
            None => {
                w.put_u8(0);
            }
        }
        Ok(w.into_inner())
    }

    pub fn decode(frame: &[u8]) -> Result<Self> {
        let mut r = Reader::new(frame, "session setup");
        let mode = TransferMode::from_byte(r.read_u8()?)?;
        let wire_count = r.read_u32()? as usize;
        let group = if r.read_bool()? {
            let descriptor = r.read_bytes()?.to_vec();
            let mut fingerprint = [0u8; 32];
            fingerprint.copy_from_slice(r.read_raw(32)?);
            Some(GroupAnnouncement {
                descriptor,
                fingerprint,
            })
        } else {
            None
        };
        r.finish()?;
        if group.is_some() != (mode == TransferMode::Oblivious) {
            return Err(ErrorKind::MalformedMessage(
                "session setup: group must be announced exactly in oblivious mode".to_owned(),
            )
            .into());
        }
        Ok(SessionSetup {
            mode,
            wire_count,
            group,
        })
    }
}

pub fn encode_wire_id(wire: WireId) -> Vec<u8> {
    wire.0.to_be_bytes().to_vec()
}

pub fn decode_wire_id(frame: &[u8]) -> Result<WireId> {
    let mut r = Reader::new(frame, "wire id");
    let wire = WireId(r.read_u32()?);
    r.finish()?;
    Ok(wire)
}

pub fn encode_outputs(outputs: &BTreeMap<WireId, bool>) -> Result<Vec<u8>> {
    let mut w = Writer::new();
    put_count(&mut w, outputs.len())?;
    for (wire, bit) in outputs {
        w.put_u32(wire.0).put_u8(*bit as u8);
    }
    Ok(w.into_inner())
}

pub fn decode_outputs(frame: &[u8]) -> Result<BTreeMap<WireId, bool>> {
    let mut r = Reader::new(frame, "outputs");
    let count = r.read_u32()?;
    let mut outputs = BTreeMap::new();
    for _ in 0..count {
        let wire = WireId(r.read_u32()?);
        let bit = r.read_bool()?;
        insert_once(&mut outputs, wire, bit, "outputs")?;
    }
    r.finish()?;
    Ok(outputs)
}

pub fn encode_garbled_tables(
    tables: &GarbledTables,
    pbits_out: &BTreeMap<WireId, bool>,
) -> Result<Vec<u8>> {
    let mut w = Writer::new();
    put_count(&mut w, tables.len())?;
    for (wire, rows) in tables {
        let count = u8::try_from(rows.len()).map_err(|_| {
            Error::from(ErrorKind::MalformedMessage(format!(
                "garbled tables: gate {} has {} rows",
                wire,
                rows.len()
            )))
        })?;
        w.put_u32(wire.0).put_u8(count);
        for row in rows {
            w.put_raw(row);
        }
    }
    encode_pbits(&mut w, pbits_out)?;
    Ok(w.into_inner())
}

fn encode_pbits(w: &mut Writer, pbits: &BTreeMap<WireId, bool>) -> Result<()> {
    put_count(w, pbits.len())?;
    for (wire, bit) in pbits {
        w.put_u32(wire.0).put_u8(*bit as u8);
    }
    Ok(())
}

pub fn decode_garbled_tables(frame: &[u8]) -> Result<(GarbledTables, BTreeMap<WireId, bool>)> {
    let mut r = Reader::new(frame, "garbled tables");
    let mut tables = GarbledTables::new();
    for _ in 0..r.read_u32()? {
        let wire = WireId(r.read_u32()?);
        let count = r.read_u8()?;
        let mut rows = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let mut row = [0u8; LABEL_LENGTH];
            row.copy_from_slice(r.read_raw(LABEL_LENGTH)?);
            rows.push(row);
        }
        insert_once(&mut tables, wire, rows, "garbled tables")?;
    }
    let mut pbits = BTreeMap::new();
    for _ in 0..r.read_u32()? {
        let wire = WireId(r.read_u32()?);
        let bit = r.read_bool()?;
        insert_once(&mut pbits, wire, bit, "output permute bits")?;
    }
    r.finish()?;
    Ok((tables, pbits))
}
