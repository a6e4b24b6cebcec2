//! Wire messages exchanged between a wildlink client and the game server.
//!
//! Every request is tagged with a [RequestKind]. Responses travel as raw
//! payloads framed with the same tag; [decode_response] checks the tag before
//! decoding the body so a payload read from the wrong batch slot is rejected
//! instead of misinterpreted.

mod codec;
mod constants;
mod envelope;
mod error;
mod items;
mod player;
mod requests;
mod responses;
mod settings;

pub use codec::{read_string, string_encode_size, write_string, Payload};
pub use constants::*;
pub use envelope::{RequestEnvelope, ResponseEnvelope};
pub use error::DecodeError;
pub use items::*;
pub use player::*;
pub use requests::{Request, RequestKind};
pub use responses::*;
pub use settings::{AvatarCatalog, GlobalSettings, WardrobeCatalog};

#[cfg(test)]
mod tests;
