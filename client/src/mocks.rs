//! In-process game server for tests and the demo binary.

use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    sync::Mutex,
};

use tracing::debug;
use wildlink_types::{
    encode_response, AvatarCatalog, AwardedBadge, BadgeType, CheckAwardedBadgesResponse,
    CheckChallengeResponse, ClaimCodenameResponse, CodenameStatus, CurrencyBalance,
    DownloadSettingsResponse, EncounterResult, EncounterTutorialCompleteResponse,
    EquipBadgeResponse, EquipBadgeResult, EquippedBadge, GetHatchedEggsResponse,
    GetInventoryResponse, GetPlayerResponse, GlobalSettings, ItemCount, ItemId,
    LevelUpRewardsResponse, LevelUpRewardsResult, MarkTutorialCompleteResponse, Milestone,
    PlayerData, PlayerStats, Request, RequestKind, SetAvatarResponse, SetAvatarStatus,
    MAX_BATCH_REQUESTS, MAX_CODENAME_LENGTH,
};

use crate::dispatch::{DispatchError, Dispatcher};

/// Shortest codename the mock server accepts.
pub const MIN_CODENAME_LENGTH: usize = 4;

/// Hash of the settings the mock server starts with.
pub const SETTINGS_HASH: &str = "settings-v1";

/// Server-side account state plus fault injection knobs.
#[derive(Clone, Debug)]
pub struct ServerState {
    pub player: PlayerData,
    pub items: BTreeMap<ItemId, u32>,
    pub stats: PlayerStats,
    pub inventory_timestamp_ms: u64,
    pub settings_hash: String,
    pub settings: GlobalSettings,
    pub hatched: Vec<u64>,
    pub taken_codenames: HashSet<String>,
    pub level_rewards: BTreeMap<u32, Vec<ItemCount>>,
    pub claimed_levels: BTreeSet<u32>,
    pub awarded_badges: Vec<AwardedBadge>,
    pub refused_badges: HashSet<BadgeType>,
    pub equipped_badge: Option<EquippedBadge>,
    pub captured: u64,

    /// Statuses returned for avatar submissions instead of success.
    pub avatar_status: Option<SetAvatarStatus>,
    /// Encounter result returned instead of success.
    pub encounter_result: Option<EncounterResult>,
    /// Milestones the server refuses to mark.
    pub refused_milestones: HashSet<Milestone>,
    /// Keep the claim counter from ever reaching zero.
    pub unlimited_claims: bool,
    /// Append a challenge check to every batch, as a middleware would.
    pub inject_challenge: bool,
    /// Responses of these kinds are truncated to their tag.
    pub corrupt: HashSet<RequestKind>,
    /// Fail the nth dispatch (1-based) with the given error.
    pub fail_calls: BTreeMap<usize, DispatchError>,
    /// Required bearer token, checked by the HTTP front.
    pub auth_token: Option<String>,

    pub calls: usize,
    pub batches: Vec<Vec<RequestKind>>,
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            player: PlayerData {
                creation_timestamp_ms: 1_468_000_000_000,
                max_pokemon_storage: 250,
                max_item_storage: 350,
                currencies: vec![
                    CurrencyBalance::new("STARDUST", 0),
                    CurrencyBalance::new("POKECOIN", 0),
                ],
                remaining_codename_claims: 3,
                ..Default::default()
            },
            items: BTreeMap::from([(ItemId(1), 20)]),
            stats: PlayerStats {
                level: 1,
                experience: 0,
                next_level_experience: 1_000,
                pokemons_captured: 0,
            },
            inventory_timestamp_ms: 1,
            settings_hash: SETTINGS_HASH.to_string(),
            settings: GlobalSettings {
                minimum_client_version: "0.31.0".to_string(),
                avatar_catalog: AvatarCatalog::default(),
            },
            hatched: Vec::new(),
            taken_codenames: HashSet::new(),
            level_rewards: BTreeMap::new(),
            claimed_levels: BTreeSet::new(),
            awarded_badges: Vec::new(),
            refused_badges: HashSet::new(),
            equipped_badge: None,
            captured: 0,
            avatar_status: None,
            encounter_result: None,
            refused_milestones: HashSet::new(),
            unlimited_claims: false,
            inject_challenge: false,
            corrupt: HashSet::new(),
            fail_calls: BTreeMap::new(),
            auth_token: None,
            calls: 0,
            batches: Vec::new(),
        }
    }
}

impl ServerState {
    fn process(&mut self, request: &Request) -> Vec<u8> {
        match request {
            Request::GetPlayer { .. } => encode_response(&GetPlayerResponse {
                success: true,
                player_data: self.player.clone(),
            }),
            Request::GetInventory { .. } => encode_response(&GetInventoryResponse {
                success: true,
                timestamp_ms: self.inventory_timestamp_ms,
                items: self
                    .items
                    .iter()
                    .map(|(item_id, count)| ItemCount::new(*item_id, *count))
                    .collect(),
                stats: Some(self.stats),
            }),
            Request::DownloadSettings { hash } => encode_response(&DownloadSettingsResponse {
                hash: self.settings_hash.clone(),
                settings: (*hash != self.settings_hash).then(|| self.settings.clone()),
            }),
            Request::GetHatchedEggs => encode_response(&GetHatchedEggsResponse {
                success: true,
                pokemon_ids: std::mem::take(&mut self.hatched),
            }),
            Request::CheckAwardedBadges => encode_response(&CheckAwardedBadgesResponse {
                success: true,
                awarded: self.awarded_badges.clone(),
            }),
            Request::CheckChallenge { .. } => encode_response(&CheckChallengeResponse::default()),
            Request::SetAvatar { avatar } => {
                let status = self.avatar_status.unwrap_or(SetAvatarStatus::Success);
                if status == SetAvatarStatus::Success {
                    self.player.avatar = *avatar;
                }
                encode_response(&SetAvatarResponse {
                    status,
                    player_data: self.player.clone(),
                })
            }
            Request::EncounterTutorialComplete { species } => {
                let result = self.encounter_result.unwrap_or(EncounterResult::Success);
                let mut captured_pokemon_id = 0;
                if result == EncounterResult::Success {
                    self.captured += 1;
                    self.stats.pokemons_captured += 1;
                    self.mark(Milestone::PokemonCapture);
                    captured_pokemon_id = *species as u64 * 1_000 + self.captured;
                }
                encode_response(&EncounterTutorialCompleteResponse {
                    result,
                    captured_pokemon_id,
                })
            }
            Request::ClaimCodename { codename } => self.claim(codename),
            Request::MarkTutorialComplete {
                milestones,
                send_marketing_emails,
                send_push_notifications,
            } => {
                let success = milestones
                    .iter()
                    .all(|milestone| !self.refused_milestones.contains(milestone));
                if success {
                    for milestone in milestones {
                        self.mark(*milestone);
                    }
                    self.player.contact_settings.send_marketing_emails = *send_marketing_emails;
                    self.player.contact_settings.send_push_notifications =
                        *send_push_notifications;
                }
                encode_response(&MarkTutorialCompleteResponse {
                    success,
                    player_data: self.player.clone(),
                })
            }
            Request::LevelUpRewards { level } => {
                let response = if *level > self.stats.level {
                    LevelUpRewardsResponse::default()
                } else if !self.claimed_levels.insert(*level) {
                    LevelUpRewardsResponse {
                        result: LevelUpRewardsResult::AwardedAlready,
                        ..Default::default()
                    }
                } else {
                    let items_awarded = self.level_rewards.get(level).cloned().unwrap_or_default();
                    for award in &items_awarded {
                        *self.items.entry(award.item_id).or_default() += award.count;
                    }
                    LevelUpRewardsResponse {
                        result: LevelUpRewardsResult::Success,
                        items_unlocked: items_awarded.iter().map(|award| award.item_id).collect(),
                        items_awarded,
                    }
                };
                encode_response(&response)
            }
            Request::EquipBadge { badge } => {
                let response = if self.refused_badges.contains(&badge.badge_type) {
                    EquipBadgeResponse {
                        result: EquipBadgeResult::NotQualified,
                        ..Default::default()
                    }
                } else {
                    let equipped = EquippedBadge {
                        badge_type: badge.badge_type,
                        level: badge.level,
                        next_equip_change_allowed_timestamp_ms: 86_400_000,
                    };
                    self.equipped_badge = Some(equipped);
                    self.awarded_badges.retain(|awarded| awarded != badge);
                    EquipBadgeResponse {
                        result: EquipBadgeResult::Success,
                        equipped,
                    }
                };
                encode_response(&response)
            }
        }
    }

    fn claim(&mut self, codename: &str) -> Vec<u8> {
        let status = if self.player.remaining_codename_claims == 0 && !self.unlimited_claims {
            CodenameStatus::ChangeNotAllowed
        } else if codename.len() < MIN_CODENAME_LENGTH
            || codename.len() > MAX_CODENAME_LENGTH
            || !codename.chars().all(|c| c.is_ascii_alphanumeric())
        {
            CodenameStatus::NotValid
        } else if codename == self.player.username {
            CodenameStatus::CurrentOwner
        } else if self.taken_codenames.contains(codename) {
            CodenameStatus::NotAvailable
        } else {
            CodenameStatus::Success
        };

        if status != CodenameStatus::ChangeNotAllowed && !self.unlimited_claims {
            self.player.remaining_codename_claims =
                self.player.remaining_codename_claims.saturating_sub(1);
        }
        if status == CodenameStatus::Success {
            self.player.username = codename.to_string();
            self.taken_codenames.insert(codename.to_string());
        }
        encode_response(&ClaimCodenameResponse {
            codename: if status == CodenameStatus::Success {
                codename.to_string()
            } else {
                String::new()
            },
            user_message: format!("{status:?}"),
            is_assignable: status == CodenameStatus::Success,
            status,
            updated_player: self.player.clone(),
        })
    }

    fn mark(&mut self, milestone: Milestone) {
        if !self.player.tutorial_state.contains(&milestone) {
            self.player.tutorial_state.push(milestone);
        }
    }
}

/// A [Dispatcher] backed by [ServerState].
#[derive(Debug, Default)]
pub struct MockServer {
    state: Mutex<ServerState>,
}

impl MockServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: ServerState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Mutate the server state between calls.
    pub fn update(&self, f: impl FnOnce(&mut ServerState)) {
        let mut state = self.state.lock().expect("mock server poisoned");
        f(&mut *state);
    }

    /// Copy of the server state.
    pub fn state(&self) -> ServerState {
        self.state.lock().expect("mock server poisoned").clone()
    }

    /// Kinds of every batch received, in order.
    pub fn batches(&self) -> Vec<Vec<RequestKind>> {
        self.state.lock().expect("mock server poisoned").batches.clone()
    }

    pub fn auth_token(&self) -> Option<String> {
        self.state
            .lock()
            .expect("mock server poisoned")
            .auth_token
            .clone()
    }

    /// Process a batch and return one framed payload per request.
    pub fn handle(&self, mut batch: Vec<Request>) -> Result<Vec<Vec<u8>>, DispatchError> {
        let mut state = self.state.lock().expect("mock server poisoned");
        state.calls += 1;
        let call = state.calls;

        if batch.len() > MAX_BATCH_REQUESTS {
            return Err(DispatchError::TooManyRequests {
                got: batch.len(),
                max: MAX_BATCH_REQUESTS,
            });
        }
        if state.inject_challenge {
            batch.push(Request::CheckChallenge {
                debug_request: false,
            });
        }
        let kinds: Vec<RequestKind> = batch.iter().map(Request::kind).collect();
        debug!(call, ?kinds, "mock server received batch");
        state.batches.push(kinds);
        if let Some(err) = state.fail_calls.remove(&call) {
            return Err(err);
        }

        let mut payloads = Vec::with_capacity(batch.len());
        for request in &batch {
            let mut payload = state.process(request);
            if state.corrupt.contains(&request.kind()) {
                payload.truncate(1);
            }
            payloads.push(payload);
        }
        Ok(payloads)
    }
}

impl Dispatcher for MockServer {
    async fn send(&self, batch: Vec<Request>) -> Result<Vec<Vec<u8>>, DispatchError> {
        self.handle(batch)
    }
}
