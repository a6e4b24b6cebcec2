use bytes::{Buf, BufMut};
use commonware_codec::{DecodeExt, EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};

use super::{
    read_string, string_encode_size, write_string, AwardedBadge, DecodeError, EquippedBadge,
    GlobalSettings, ItemCount, ItemId, PlayerData, PlayerStats, RequestKind, MAX_CODENAME_LENGTH,
    MAX_LIST_ENTRIES, MAX_TEXT_LENGTH,
};

/// A response body bound to the request kind that produces it.
pub trait Message: Write + EncodeSize + Read<Cfg = ()> {
    const KIND: RequestKind;
}

/// Frame a response as `[kind:u8] [body]`.
pub fn encode_response<M: Message>(message: &M) -> Vec<u8> {
    let mut payload = Vec::with_capacity(RequestKind::SIZE + message.encode_size());
    M::KIND.write(&mut payload);
    message.write(&mut payload);
    payload
}

/// Decode a framed response, rejecting payloads framed for another kind.
pub fn decode_response<M: Message>(payload: &[u8]) -> Result<M, DecodeError> {
    let mut reader = payload;
    let tag = u8::read(&mut reader).map_err(|source| DecodeError::Malformed {
        kind: M::KIND,
        source,
    })?;
    if tag != M::KIND as u8 {
        return Err(DecodeError::UnexpectedKind {
            expected: M::KIND,
            got: tag,
        });
    }
    M::decode(reader).map_err(|source| DecodeError::Malformed {
        kind: M::KIND,
        source,
    })
}

// Single-byte status enums shared by several responses.
macro_rules! status_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
        #[repr(u8)]
        pub enum $name {
            #[default]
            $($variant = $value),+
        }

        impl Write for $name {
            fn write(&self, writer: &mut impl BufMut) {
                (*self as u8).write(writer);
            }
        }

        impl Read for $name {
            type Cfg = ();

            fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
                match u8::read(reader)? {
                    $($value => Ok(Self::$variant),)+
                    i => Err(Error::InvalidEnum(i)),
                }
            }
        }

        impl FixedSize for $name {
            const SIZE: usize = 1;
        }
    };
}

status_enum!(
    /// Outcome of a set-avatar request.
    SetAvatarStatus {
        Unset = 0,
        Success = 1,
        AvatarAlreadySet = 2,
        Failure = 3,
    }
);

status_enum!(
    /// Outcome of the starter encounter.
    EncounterResult {
        Unset = 0,
        Success = 1,
        InvalidPokemon = 2,
    }
);

status_enum!(
    /// Outcome of a codename claim.
    CodenameStatus {
        Unset = 0,
        Success = 1,
        NotAvailable = 2,
        NotValid = 3,
        CurrentOwner = 4,
        ChangeNotAllowed = 5,
    }
);

status_enum!(
    /// Outcome of a level-up rewards claim.
    LevelUpRewardsResult {
        Unset = 0,
        Success = 1,
        AwardedAlready = 2,
    }
);

status_enum!(
    /// Outcome of equipping a badge.
    EquipBadgeResult {
        Unset = 0,
        Success = 1,
        CooldownActive = 2,
        NotQualified = 3,
    }
);

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct GetPlayerResponse {
    pub success: bool,
    pub player_data: PlayerData,
}

impl Message for GetPlayerResponse {
    const KIND: RequestKind = RequestKind::GetPlayer;
}

impl Write for GetPlayerResponse {
    fn write(&self, writer: &mut impl BufMut) {
        self.success.write(writer);
        self.player_data.write(writer);
    }
}

impl Read for GetPlayerResponse {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            success: bool::read(reader)?,
            player_data: PlayerData::read(reader)?,
        })
    }
}

impl EncodeSize for GetPlayerResponse {
    fn encode_size(&self) -> usize {
        self.success.encode_size() + self.player_data.encode_size()
    }
}

/// Inventory delta since the requested timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct GetInventoryResponse {
    pub success: bool,
    pub timestamp_ms: u64,
    pub items: Vec<ItemCount>,
    pub stats: Option<PlayerStats>,
}

impl Message for GetInventoryResponse {
    const KIND: RequestKind = RequestKind::GetInventory;
}

impl Write for GetInventoryResponse {
    fn write(&self, writer: &mut impl BufMut) {
        self.success.write(writer);
        self.timestamp_ms.write(writer);
        self.items.write(writer);
        self.stats.write(writer);
    }
}

impl Read for GetInventoryResponse {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            success: bool::read(reader)?,
            timestamp_ms: u64::read(reader)?,
            items: Vec::<ItemCount>::read_range(reader, 0..=MAX_LIST_ENTRIES)?,
            stats: Option::<PlayerStats>::read(reader)?,
        })
    }
}

impl EncodeSize for GetInventoryResponse {
    fn encode_size(&self) -> usize {
        self.success.encode_size()
            + self.timestamp_ms.encode_size()
            + self.items.encode_size()
            + self.stats.encode_size()
    }
}

/// Settings are only included when the client's hash is stale.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DownloadSettingsResponse {
    pub hash: String,
    pub settings: Option<GlobalSettings>,
}

impl Message for DownloadSettingsResponse {
    const KIND: RequestKind = RequestKind::DownloadSettings;
}

impl Write for DownloadSettingsResponse {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.hash, writer);
        self.settings.write(writer);
    }
}

impl Read for DownloadSettingsResponse {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            hash: read_string(reader, MAX_TEXT_LENGTH)?,
            settings: Option::<GlobalSettings>::read(reader)?,
        })
    }
}

impl EncodeSize for DownloadSettingsResponse {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.hash) + self.settings.encode_size()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct GetHatchedEggsResponse {
    pub success: bool,
    pub pokemon_ids: Vec<u64>,
}

impl Message for GetHatchedEggsResponse {
    const KIND: RequestKind = RequestKind::GetHatchedEggs;
}

impl Write for GetHatchedEggsResponse {
    fn write(&self, writer: &mut impl BufMut) {
        self.success.write(writer);
        self.pokemon_ids.write(writer);
    }
}

impl Read for GetHatchedEggsResponse {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            success: bool::read(reader)?,
            pokemon_ids: Vec::<u64>::read_range(reader, 0..=MAX_LIST_ENTRIES)?,
        })
    }
}

impl EncodeSize for GetHatchedEggsResponse {
    fn encode_size(&self) -> usize {
        self.success.encode_size() + self.pokemon_ids.encode_size()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CheckAwardedBadgesResponse {
    pub success: bool,
    pub awarded: Vec<AwardedBadge>,
}

impl Message for CheckAwardedBadgesResponse {
    const KIND: RequestKind = RequestKind::CheckAwardedBadges;
}

impl Write for CheckAwardedBadgesResponse {
    fn write(&self, writer: &mut impl BufMut) {
        self.success.write(writer);
        self.awarded.write(writer);
    }
}

impl Read for CheckAwardedBadgesResponse {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            success: bool::read(reader)?,
            awarded: Vec::<AwardedBadge>::read_range(reader, 0..=MAX_LIST_ENTRIES)?,
        })
    }
}

impl EncodeSize for CheckAwardedBadgesResponse {
    fn encode_size(&self) -> usize {
        self.success.encode_size() + self.awarded.encode_size()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CheckChallengeResponse {
    pub show_challenge: bool,
    pub challenge_url: String,
}

impl Message for CheckChallengeResponse {
    const KIND: RequestKind = RequestKind::CheckChallenge;
}

impl Write for CheckChallengeResponse {
    fn write(&self, writer: &mut impl BufMut) {
        self.show_challenge.write(writer);
        write_string(&self.challenge_url, writer);
    }
}

impl Read for CheckChallengeResponse {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            show_challenge: bool::read(reader)?,
            challenge_url: read_string(reader, MAX_TEXT_LENGTH)?,
        })
    }
}

impl EncodeSize for CheckChallengeResponse {
    fn encode_size(&self) -> usize {
        self.show_challenge.encode_size() + string_encode_size(&self.challenge_url)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SetAvatarResponse {
    pub status: SetAvatarStatus,
    pub player_data: PlayerData,
}

impl Message for SetAvatarResponse {
    const KIND: RequestKind = RequestKind::SetAvatar;
}

impl Write for SetAvatarResponse {
    fn write(&self, writer: &mut impl BufMut) {
        self.status.write(writer);
        self.player_data.write(writer);
    }
}

impl Read for SetAvatarResponse {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            status: SetAvatarStatus::read(reader)?,
            player_data: PlayerData::read(reader)?,
        })
    }
}

impl EncodeSize for SetAvatarResponse {
    fn encode_size(&self) -> usize {
        self.status.encode_size() + self.player_data.encode_size()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct EncounterTutorialCompleteResponse {
    pub result: EncounterResult,
    pub captured_pokemon_id: u64,
}

impl Message for EncounterTutorialCompleteResponse {
    const KIND: RequestKind = RequestKind::EncounterTutorialComplete;
}

impl Write for EncounterTutorialCompleteResponse {
    fn write(&self, writer: &mut impl BufMut) {
        self.result.write(writer);
        self.captured_pokemon_id.write(writer);
    }
}

impl Read for EncounterTutorialCompleteResponse {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            result: EncounterResult::read(reader)?,
            captured_pokemon_id: u64::read(reader)?,
        })
    }
}

impl FixedSize for EncounterTutorialCompleteResponse {
    const SIZE: usize = EncounterResult::SIZE + u64::SIZE;
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ClaimCodenameResponse {
    pub codename: String,
    pub user_message: String,
    pub is_assignable: bool,
    pub status: CodenameStatus,
    pub updated_player: PlayerData,
}

impl Message for ClaimCodenameResponse {
    const KIND: RequestKind = RequestKind::ClaimCodename;
}

impl Write for ClaimCodenameResponse {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.codename, writer);
        write_string(&self.user_message, writer);
        self.is_assignable.write(writer);
        self.status.write(writer);
        self.updated_player.write(writer);
    }
}

impl Read for ClaimCodenameResponse {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            codename: read_string(reader, MAX_CODENAME_LENGTH)?,
            user_message: read_string(reader, MAX_TEXT_LENGTH)?,
            is_assignable: bool::read(reader)?,
            status: CodenameStatus::read(reader)?,
            updated_player: PlayerData::read(reader)?,
        })
    }
}

impl EncodeSize for ClaimCodenameResponse {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.codename)
            + string_encode_size(&self.user_message)
            + self.is_assignable.encode_size()
            + self.status.encode_size()
            + self.updated_player.encode_size()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct MarkTutorialCompleteResponse {
    pub success: bool,
    pub player_data: PlayerData,
}

impl Message for MarkTutorialCompleteResponse {
    const KIND: RequestKind = RequestKind::MarkTutorialComplete;
}

impl Write for MarkTutorialCompleteResponse {
    fn write(&self, writer: &mut impl BufMut) {
        self.success.write(writer);
        self.player_data.write(writer);
    }
}

impl Read for MarkTutorialCompleteResponse {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            success: bool::read(reader)?,
            player_data: PlayerData::read(reader)?,
        })
    }
}

impl EncodeSize for MarkTutorialCompleteResponse {
    fn encode_size(&self) -> usize {
        self.success.encode_size() + self.player_data.encode_size()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct LevelUpRewardsResponse {
    pub result: LevelUpRewardsResult,
    pub items_awarded: Vec<ItemCount>,
    pub items_unlocked: Vec<ItemId>,
}

impl Message for LevelUpRewardsResponse {
    const KIND: RequestKind = RequestKind::LevelUpRewards;
}

impl Write for LevelUpRewardsResponse {
    fn write(&self, writer: &mut impl BufMut) {
        self.result.write(writer);
        self.items_awarded.write(writer);
        self.items_unlocked.write(writer);
    }
}

impl Read for LevelUpRewardsResponse {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            result: LevelUpRewardsResult::read(reader)?,
            items_awarded: Vec::<ItemCount>::read_range(reader, 0..=MAX_LIST_ENTRIES)?,
            items_unlocked: Vec::<ItemId>::read_range(reader, 0..=MAX_LIST_ENTRIES)?,
        })
    }
}

impl EncodeSize for LevelUpRewardsResponse {
    fn encode_size(&self) -> usize {
        self.result.encode_size()
            + self.items_awarded.encode_size()
            + self.items_unlocked.encode_size()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct EquipBadgeResponse {
    pub result: EquipBadgeResult,
    pub equipped: EquippedBadge,
}

impl Message for EquipBadgeResponse {
    const KIND: RequestKind = RequestKind::EquipBadge;
}

impl Write for EquipBadgeResponse {
    fn write(&self, writer: &mut impl BufMut) {
        self.result.write(writer);
        self.equipped.write(writer);
    }
}

impl Read for EquipBadgeResponse {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            result: EquipBadgeResult::read(reader)?,
            equipped: EquippedBadge::read(reader)?,
        })
    }
}

impl FixedSize for EquipBadgeResponse {
    const SIZE: usize = EquipBadgeResult::SIZE + EquippedBadge::SIZE;
}
