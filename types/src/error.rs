use thiserror::Error;

use crate::RequestKind;

/// Failure to turn a raw payload into the response that was asked for.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed {kind:?} response: {source}")]
    Malformed {
        kind: RequestKind,
        #[source]
        source: commonware_codec::Error,
    },
    #[error("expected {expected:?} response, got tag {got}")]
    UnexpectedKind { expected: RequestKind, got: u8 },
    #[error("no payload in slot {slot} for {kind:?}")]
    MissingSlot { slot: usize, kind: RequestKind },
    #[error("{kind:?} response reported failure")]
    Unsuccessful { kind: RequestKind },
}
