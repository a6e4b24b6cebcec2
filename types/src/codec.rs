use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};

use crate::MAX_PAYLOAD_SIZE;

/// Helper to write a string as length-prefixed UTF-8 bytes.
pub fn write_string(s: &str, writer: &mut impl BufMut) {
    let bytes = s.as_bytes();
    (bytes.len() as u32).write(writer);
    writer.put_slice(bytes);
}

/// Helper to read a string from length-prefixed UTF-8 bytes.
pub fn read_string(reader: &mut impl Buf, max_len: usize) -> Result<String, Error> {
    let len = u32::read(reader)? as usize;
    if len > max_len {
        return Err(Error::Invalid("String", "too long"));
    }
    if reader.remaining() < len {
        return Err(Error::EndOfBuffer);
    }
    let mut bytes = vec![0u8; len];
    reader.copy_to_slice(&mut bytes);
    String::from_utf8(bytes).map_err(|_| Error::Invalid("String", "invalid UTF-8"))
}

/// Helper to get encode size of a string.
pub fn string_encode_size(s: &str) -> usize {
    4 + s.len()
}

/// One raw response payload inside a [crate::ResponseEnvelope].
///
/// Length-prefixed like strings so a batch of payloads can be framed without
/// knowing their message kinds.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Payload(pub Vec<u8>);

impl Write for Payload {
    fn write(&self, writer: &mut impl BufMut) {
        (self.0.len() as u32).write(writer);
        writer.put_slice(&self.0);
    }
}

impl Read for Payload {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let len = u32::read(reader)? as usize;
        if len > MAX_PAYLOAD_SIZE {
            return Err(Error::Invalid("Payload", "too long"));
        }
        if reader.remaining() < len {
            return Err(Error::EndOfBuffer);
        }
        let mut bytes = vec![0u8; len];
        reader.copy_to_slice(&mut bytes);
        Ok(Self(bytes))
    }
}

impl EncodeSize for Payload {
    fn encode_size(&self) -> usize {
        4 + self.0.len()
    }
}
