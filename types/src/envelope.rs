use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadRangeExt, Write};

use super::{Payload, Request, MAX_BATCH_REQUESTS};

/// A batch of requests as sent over a transport.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RequestEnvelope {
    pub requests: Vec<Request>,
}

impl Write for RequestEnvelope {
    fn write(&self, writer: &mut impl BufMut) {
        self.requests.write(writer);
    }
}

impl Read for RequestEnvelope {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            requests: Vec::<Request>::read_range(reader, 1..=MAX_BATCH_REQUESTS)?,
        })
    }
}

impl EncodeSize for RequestEnvelope {
    fn encode_size(&self) -> usize {
        self.requests.encode_size()
    }
}

/// One framed payload per request, in request order.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ResponseEnvelope {
    pub payloads: Vec<Payload>,
}

impl ResponseEnvelope {
    pub fn into_payloads(self) -> Vec<Vec<u8>> {
        self.payloads.into_iter().map(|payload| payload.0).collect()
    }
}

impl From<Vec<Vec<u8>>> for ResponseEnvelope {
    fn from(payloads: Vec<Vec<u8>>) -> Self {
        Self {
            payloads: payloads.into_iter().map(Payload).collect(),
        }
    }
}

impl Write for ResponseEnvelope {
    fn write(&self, writer: &mut impl BufMut) {
        self.payloads.write(writer);
    }
}

impl Read for ResponseEnvelope {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            payloads: Vec::<Payload>::read_range(reader, 0..=MAX_BATCH_REQUESTS)?,
        })
    }
}

impl EncodeSize for ResponseEnvelope {
    fn encode_size(&self) -> usize {
        self.payloads.encode_size()
    }
}
