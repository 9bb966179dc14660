//! simple protocol: data gets it's length prepended and send
use super::{BinaryReceive, BinarySend};
use crate::errors::*;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};
use std::net::TcpStream;

/// Upper bound for a single frame, protects against allocating a garbage length.
pub const MAX_FRAME_LEN: u64 = 64 * 1024 * 1024;

fn io_error(err: io::Error) -> Error {
    match err.kind() {
        // a read timeout surfaces as either, depending on the platform
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => ErrorKind::Timeout.into(),
        io::ErrorKind::UnexpectedEof => ErrorKind::ChannelClosed.into(),
        _ => err.into(),
    }
}

impl BinarySend for TcpStream {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.write_u64::<BigEndian>(data.len() as u64)
            .map_err(io_error)?;
        self.write_all(data).map_err(io_error)?;
        self.flush().map_err(io_error)
    }
}

impl BinaryReceive for TcpStream {
    fn receive(&mut self) -> Result<Vec<u8>> {
        let len = self.read_u64::<BigEndian>().map_err(io_error)?;
        if len > MAX_FRAME_LEN {
            return Err(ErrorKind::MalformedMessage(format!("frame of {} bytes", len)).into());
        }
        let mut v = vec![0u8; len as usize];
        self.read_exact(&mut v).map_err(io_error)?;
        Ok(v)
    }
}
