/// corrupted communication channel to simulate a curious or faulty peer
/// it wraps around an existing implementation of BinarySend and BinaryReceive,
/// lets a hook observe every outgoing frame and another one tamper with every incoming frame
use super::{BinaryReceive, BinarySend};
use crate::errors::*;

fn ignore_sent<S>(_: &mut S, _: &[u8]) {}
fn keep_received<S>(_: &mut S, _: &mut Vec<u8>) {}

pub struct CorruptedChannel<S, C: BinaryReceive + BinarySend> {
    pub state: S,
    conn: C,
    pub on_send: fn(&mut S, &[u8]),
    pub on_receive: fn(&mut S, &mut Vec<u8>),
}

impl<S, C: BinaryReceive + BinarySend> CorruptedChannel<S, C> {
    pub fn new(
        conn: C,
        initial_state: S,
        on_send: fn(&mut S, &[u8]),
        on_receive: fn(&mut S, &mut Vec<u8>),
    ) -> Self {
        CorruptedChannel {
            state: initial_state,
            conn,
            on_send,
            on_receive,
        }
    }

    /// Returns a CorruptedChannel which only looks at outgoing frames
    pub fn new_eavesdrop(conn: C, initial_state: S, on_send: fn(&mut S, &[u8])) -> Self {
        CorruptedChannel::new(conn, initial_state, on_send, keep_received)
    }

    /// Returns a CorruptedChannel which only rewrites incoming frames
    pub fn new_corrupt(conn: C, initial_state: S, on_receive: fn(&mut S, &mut Vec<u8>)) -> Self {
        CorruptedChannel::new(conn, initial_state, ignore_sent, on_receive)
    }

    pub fn into_parts(self) -> (S, C) {
        (self.state, self.conn)
    }
}

impl<S, C: BinaryReceive + BinarySend> BinaryReceive for CorruptedChannel<S, C> {
    fn receive(&mut self) -> Result<Vec<u8>> {
        let mut v = self.conn.receive()?;
        (self.on_receive)(&mut self.state, &mut v);
        Ok(v)
    }
}

impl<S, C: BinaryReceive + BinarySend> BinarySend for CorruptedChannel<S, C> {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        (self.on_send)(&mut self.state, data);
        self.conn.send(data)
    }
}
