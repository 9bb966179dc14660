use super::{BinaryReceive, BinarySend};
use crate::errors::*;
use std::io::{Read, Write};
use tungstenite::{protocol::WebSocket, Message};

impl<S: Read + Write> BinarySend for WebSocket<S> {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        WebSocket::send(self, Message::binary(data.to_owned()))?;
        Ok(())
    }
}

impl<S: Read + Write> BinaryReceive for WebSocket<S> {
    fn receive(&mut self) -> Result<Vec<u8>> {
        loop {
            match self.read()? {
                Message::Binary(v) => return Ok(v),
                // answered by tungstenite on the next write
                Message::Ping(_) | Message::Pong(_) => continue,
                Message::Close(_) => return Err(ErrorKind::ChannelClosed.into()),
                _ => return Err(ErrorKind::CommunicationError.into()),
            }
        }
    }
}
