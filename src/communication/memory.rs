//! In-process transport, one end per party. Mostly used to run both roles on
//! separate threads of the same process.
use super::{BinaryReceive, BinarySend};
use crate::errors::*;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

pub struct MemoryChannel {
    sender: Sender<Vec<u8>>,
    receiver: Receiver<Vec<u8>>,
    timeout: Option<Duration>,
}

impl MemoryChannel {
    /// Returns two connected ends.
    pub fn pair() -> (MemoryChannel, MemoryChannel) {
        let (send_a, recv_a) = channel();
        let (send_b, recv_b) = channel();
        (
            MemoryChannel {
                sender: send_a,
                receiver: recv_b,
                timeout: None,
            },
            MemoryChannel {
                sender: send_b,
                receiver: recv_a,
                timeout: None,
            },
        )
    }

    /// Makes `receive` fail with `ErrorKind::Timeout` instead of blocking forever.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl BinarySend for MemoryChannel {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.sender
            .send(data.to_vec())
            .map_err(|_| ErrorKind::ChannelClosed.into())
    }
}

impl BinaryReceive for MemoryChannel {
    fn receive(&mut self) -> Result<Vec<u8>> {
        match self.timeout {
            Some(timeout) => self.receiver.recv_timeout(timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => ErrorKind::Timeout.into(),
                RecvTimeoutError::Disconnected => ErrorKind::ChannelClosed.into(),
            }),
            None => self
                .receiver
                .recv()
                .map_err(|_| ErrorKind::ChannelClosed.into()),
        }
    }
}
