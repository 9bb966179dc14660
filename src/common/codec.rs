//! Fixed-format byte encoding used for every protocol message.
//!
//! Integers are big-endian, byte strings carry a 4 byte big-endian length prefix.
use crate::errors::*;
use byteorder::{BigEndian, ByteOrder};
use std::convert::TryFrom;

/// Converts a length or count to its 4 byte wire form.
pub fn length_prefix(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        Error::from(ErrorKind::MalformedMessage(format!(
            "length {} does not fit in 4 bytes",
            len
        )))
    })
}

#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Writer::default()
    }

    pub fn put_u8(&mut self, val: u8) -> &mut Self {
        self.buf.push(val);
        self
    }

    pub fn put_u32(&mut self, val: u32) -> &mut Self {
        let mut bytes = [0u8; 4];
        BigEndian::write_u32(&mut bytes, val);
        self.buf.extend_from_slice(&bytes);
        self
    }

    /// Appends `data` without a length prefix, for fields of agreed fixed width.
    pub fn put_raw(&mut self, data: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(data);
        self
    }

    pub fn put_bytes(&mut self, data: &[u8]) -> Result<&mut Self> {
        let len = length_prefix(data.len())?;
        Ok(self.put_u32(len).put_raw(data))
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Reads fields back from a received frame. Every read checks the remaining length.
pub struct Reader<'a> {
    buf: &'a [u8],
    what: &'static str,
}

impl<'a> Reader<'a> {
    /// `what` names the message in errors.
    pub fn new(buf: &'a [u8], what: &'static str) -> Self {
        Reader { buf, what }
    }

    fn malformed(&self, reason: &str) -> Error {
        ErrorKind::MalformedMessage(format!("{}: {}", self.what, reason)).into()
    }

    pub fn read_raw(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.buf.len() < len {
            return Err(self.malformed("truncated"));
        }
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_raw(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.read_raw(4)?))
    }

    pub fn read_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32()? as usize;
        self.read_raw(len)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(self.malformed(&format!("invalid boolean byte {}", b))),
        }
    }

    /// Fails if any bytes are left over.
    pub fn finish(self) -> Result<()> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(self.malformed(&format!("{} trailing bytes", self.buf.len())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_back_mixed_fields() {
        let mut w = Writer::new();
        w.put_u8(7)
            .put_u32(0xdead_beef)
            .put_bytes(b"label")
            .unwrap()
            .put_raw(&[1, 0]);
        let bytes = w.into_inner();
        assert_eq!(bytes.len(), 1 + 4 + 4 + 5 + 2);

        let mut r = Reader::new(&bytes, "test");
        assert_eq!(r.read_u8().unwrap(), 7);
        assert_eq!(r.read_u32().unwrap(), 0xdead_beef);
        assert_eq!(r.read_bytes().unwrap(), b"label");
        assert!(r.read_bool().unwrap());
        assert!(!r.read_bool().unwrap());
        r.finish().unwrap();
    }

    #[test]
    fn truncated_length_prefix_is_rejected() {
        let mut w = Writer::new();
        w.put_u32(100).put_raw(b"short");
        let bytes = w.into_inner();
        let err = Reader::new(&bytes, "test").read_bytes().unwrap_err();
        match err.kind() {
            ErrorKind::MalformedMessage(msg) => assert!(msg.contains("truncated")),
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn length_prefix_keeps_four_byte_lengths() {
        assert_eq!(length_prefix(0).unwrap(), 0);
        assert_eq!(length_prefix(u32::max_value() as usize).unwrap(), u32::max_value());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn oversized_length_is_rejected() {
        match length_prefix(u32::max_value() as usize + 1).unwrap_err().kind() {
            ErrorKind::MalformedMessage(msg) => assert!(msg.contains("4294967296")),
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let bytes = [0u8, 1, 2];
        let mut r = Reader::new(&bytes, "test");
        r.read_u8().unwrap();
        assert!(r.finish().is_err());
    }
}
