use std::{future::Future, sync::Arc};

use thiserror::Error;
use wildlink_types::{
    decode_response, CheckAwardedBadgesResponse, DecodeError, DownloadSettingsResponse,
    GetHatchedEggsResponse, GetInventoryResponse, Message, Request, RequestKind,
};

/// Slot of the primary request in a standard batch.
pub const PRIMARY_SLOT: usize = 0;
/// Slot of the hatched-eggs companion.
pub const HATCHED_EGGS_SLOT: usize = 1;
/// Slot of the inventory companion.
pub const INVENTORY_SLOT: usize = 2;
/// Slot of the awarded-badges companion.
pub const AWARDED_BADGES_SLOT: usize = 3;
/// Slot of the settings companion.
pub const SETTINGS_SLOT: usize = 4;

/// Failure to deliver a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("authentication rejected: {0}")]
    Auth(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("batch of {got} requests exceeds the limit of {max}")]
    TooManyRequests { got: usize, max: usize },
}

/// Sends an ordered batch of requests and returns one raw payload per request.
///
/// Implementations may append requests of their own after the caller's; the
/// payloads for the caller's requests keep their positions.
pub trait Dispatcher: Send + Sync {
    fn send(
        &self,
        batch: Vec<Request>,
    ) -> impl Future<Output = Result<Vec<Vec<u8>>, DispatchError>> + Send;
}

impl<D: Dispatcher> Dispatcher for Arc<D> {
    fn send(
        &self,
        batch: Vec<Request>,
    ) -> impl Future<Output = Result<Vec<Vec<u8>>, DispatchError>> + Send {
        (**self).send(batch)
    }
}

/// A mutating request followed by the four companions that keep the local
/// mirrors fresh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StandardBatch {
    requests: Vec<Request>,
}

impl StandardBatch {
    pub fn new(primary: Request, inventory_timestamp_ms: u64, settings_hash: &str) -> Self {
        Self {
            requests: vec![
                primary,
                Request::GetHatchedEggs,
                Request::GetInventory {
                    last_timestamp_ms: inventory_timestamp_ms,
                },
                Request::CheckAwardedBadges,
                Request::DownloadSettings {
                    hash: settings_hash.to_string(),
                },
            ],
        }
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn into_requests(self) -> Vec<Request> {
        self.requests
    }

    /// Decode every slot of a standard batch. Nothing is returned unless all
    /// five payloads decode; payloads past the last slot are ignored.
    pub fn decode<P: Message>(payloads: &[Vec<u8>]) -> Result<StandardResponses<P>, DecodeError> {
        Ok(StandardResponses {
            primary: decode_slot(payloads, PRIMARY_SLOT)?,
            hatched_eggs: decode_slot(payloads, HATCHED_EGGS_SLOT)?,
            inventory: decode_slot(payloads, INVENTORY_SLOT)?,
            awarded_badges: decode_slot(payloads, AWARDED_BADGES_SLOT)?,
            settings: decode_slot(payloads, SETTINGS_SLOT)?,
        })
    }
}

/// Decoded responses of a standard batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StandardResponses<P> {
    pub primary: P,
    pub hatched_eggs: GetHatchedEggsResponse,
    pub inventory: GetInventoryResponse,
    pub awarded_badges: CheckAwardedBadgesResponse,
    pub settings: DownloadSettingsResponse,
}

/// Decode the payload at `slot` as the response type `M`.
pub fn decode_slot<M: Message>(payloads: &[Vec<u8>], slot: usize) -> Result<M, DecodeError> {
    let payload = payloads.get(slot).ok_or(DecodeError::MissingSlot {
        slot,
        kind: M::KIND,
    })?;
    decode_response(payload)
}

/// Kinds of a batch, for logging.
pub(crate) fn kinds(requests: &[Request]) -> Vec<RequestKind> {
    requests.iter().map(Request::kind).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wildlink_types::{encode_response, GetPlayerResponse, PlayerData, PlayerLocale};

    fn standard_payloads() -> Vec<Vec<u8>> {
        vec![
            encode_response(&GetPlayerResponse {
                success: true,
                player_data: PlayerData::default(),
            }),
            encode_response(&GetHatchedEggsResponse::default()),
            encode_response(&GetInventoryResponse::default()),
            encode_response(&CheckAwardedBadgesResponse::default()),
            encode_response(&DownloadSettingsResponse::default()),
        ]
    }

    #[test]
    fn test_standard_batch_slots() {
        let batch = StandardBatch::new(
            Request::GetPlayer {
                locale: PlayerLocale::default(),
            },
            42,
            "abc",
        );
        assert_eq!(
            kinds(batch.requests()),
            vec![
                RequestKind::GetPlayer,
                RequestKind::GetHatchedEggs,
                RequestKind::GetInventory,
                RequestKind::CheckAwardedBadges,
                RequestKind::DownloadSettings,
            ]
        );
        assert_eq!(
            batch.requests()[INVENTORY_SLOT],
            Request::GetInventory {
                last_timestamp_ms: 42
            }
        );
        assert_eq!(
            batch.requests()[SETTINGS_SLOT],
            Request::DownloadSettings {
                hash: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_decode_ignores_extra_payloads() {
        let mut payloads = standard_payloads();
        payloads.push(vec![0xFF, 0xFF]);
        let responses = StandardBatch::decode::<GetPlayerResponse>(&payloads).unwrap();
        assert!(responses.primary.success);
    }

    #[test]
    fn test_decode_missing_slot() {
        let mut payloads = standard_payloads();
        payloads.truncate(3);
        let err = StandardBatch::decode::<GetPlayerResponse>(&payloads).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MissingSlot {
                slot: AWARDED_BADGES_SLOT,
                kind: RequestKind::CheckAwardedBadges
            }
        ));
    }

    #[test]
    fn test_decode_rejects_swapped_slots() {
        let mut payloads = standard_payloads();
        payloads.swap(HATCHED_EGGS_SLOT, INVENTORY_SLOT);
        let err = StandardBatch::decode::<GetPlayerResponse>(&payloads).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnexpectedKind {
                expected: RequestKind::GetHatchedEggs,
                ..
            }
        ));
    }
}
