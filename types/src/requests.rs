use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};

use super::{
    read_string, string_encode_size, write_string, AwardedBadge, Milestone, PlayerAvatar,
    PlayerLocale, StarterSpecies, MAX_CODENAME_LENGTH, MAX_TEXT_LENGTH, MAX_TUTORIAL_STATES,
};

/// Message kinds understood by the server. The tag frames both the request
/// and its response payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RequestKind {
    GetPlayer = 0,
    GetInventory = 1,
    DownloadSettings = 2,
    GetHatchedEggs = 3,
    CheckAwardedBadges = 4,
    CheckChallenge = 5,
    SetAvatar = 6,
    EncounterTutorialComplete = 7,
    ClaimCodename = 8,
    MarkTutorialComplete = 9,
    LevelUpRewards = 10,
    EquipBadge = 11,
}

impl RequestKind {
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => Self::GetPlayer,
            1 => Self::GetInventory,
            2 => Self::DownloadSettings,
            3 => Self::GetHatchedEggs,
            4 => Self::CheckAwardedBadges,
            5 => Self::CheckChallenge,
            6 => Self::SetAvatar,
            7 => Self::EncounterTutorialComplete,
            8 => Self::ClaimCodename,
            9 => Self::MarkTutorialComplete,
            10 => Self::LevelUpRewards,
            11 => Self::EquipBadge,
            _ => return None,
        })
    }

    /// True when sending the request twice leaves the account as sending it
    /// once would.
    pub fn is_idempotent(&self) -> bool {
        !matches!(
            self,
            Self::SetAvatar
                | Self::EncounterTutorialComplete
                | Self::ClaimCodename
                | Self::LevelUpRewards
                | Self::EquipBadge
        )
    }
}

impl Write for RequestKind {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for RequestKind {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let tag = u8::read(reader)?;
        Self::from_tag(tag).ok_or(Error::InvalidEnum(tag))
    }
}

impl FixedSize for RequestKind {
    const SIZE: usize = 1;
}

/// An outgoing request descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    /// Binary: [0] [locale]
    GetPlayer { locale: PlayerLocale },
    /// Binary: [1] [lastTimestampMs:u64]
    GetInventory { last_timestamp_ms: u64 },
    /// Binary: [2] [hashLen:u32] [hash...]
    DownloadSettings { hash: String },
    /// Binary: [3]
    GetHatchedEggs,
    /// Binary: [4]
    CheckAwardedBadges,
    /// Binary: [5] [debug:bool]
    CheckChallenge { debug_request: bool },
    /// Binary: [6] [avatar]
    SetAvatar { avatar: PlayerAvatar },
    /// Binary: [7] [species:u16]
    EncounterTutorialComplete { species: StarterSpecies },
    /// Binary: [8] [nameLen:u32] [name...]
    ClaimCodename { codename: String },
    /// Binary: [9] [milestones] [marketing:bool] [push:bool]
    MarkTutorialComplete {
        milestones: Vec<Milestone>,
        send_marketing_emails: bool,
        send_push_notifications: bool,
    },
    /// Binary: [10] [level:u32]
    LevelUpRewards { level: u32 },
    /// Binary: [11] [badgeType:u16] [level:u32]
    EquipBadge { badge: AwardedBadge },
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::GetPlayer { .. } => RequestKind::GetPlayer,
            Self::GetInventory { .. } => RequestKind::GetInventory,
            Self::DownloadSettings { .. } => RequestKind::DownloadSettings,
            Self::GetHatchedEggs => RequestKind::GetHatchedEggs,
            Self::CheckAwardedBadges => RequestKind::CheckAwardedBadges,
            Self::CheckChallenge { .. } => RequestKind::CheckChallenge,
            Self::SetAvatar { .. } => RequestKind::SetAvatar,
            Self::EncounterTutorialComplete { .. } => RequestKind::EncounterTutorialComplete,
            Self::ClaimCodename { .. } => RequestKind::ClaimCodename,
            Self::MarkTutorialComplete { .. } => RequestKind::MarkTutorialComplete,
            Self::LevelUpRewards { .. } => RequestKind::LevelUpRewards,
            Self::EquipBadge { .. } => RequestKind::EquipBadge,
        }
    }
}

impl Write for Request {
    fn write(&self, writer: &mut impl BufMut) {
        self.kind().write(writer);
        match self {
            Self::GetPlayer { locale } => locale.write(writer),
            Self::GetInventory { last_timestamp_ms } => last_timestamp_ms.write(writer),
            Self::DownloadSettings { hash } => write_string(hash, writer),
            Self::GetHatchedEggs | Self::CheckAwardedBadges => {}
            Self::CheckChallenge { debug_request } => debug_request.write(writer),
            Self::SetAvatar { avatar } => avatar.write(writer),
            Self::EncounterTutorialComplete { species } => species.write(writer),
            Self::ClaimCodename { codename } => write_string(codename, writer),
            Self::MarkTutorialComplete {
                milestones,
                send_marketing_emails,
                send_push_notifications,
            } => {
                milestones.write(writer);
                send_marketing_emails.write(writer);
                send_push_notifications.write(writer);
            }
            Self::LevelUpRewards { level } => level.write(writer),
            Self::EquipBadge { badge } => badge.write(writer),
        }
    }
}

impl Read for Request {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let request = match RequestKind::read(reader)? {
            RequestKind::GetPlayer => Self::GetPlayer {
                locale: PlayerLocale::read(reader)?,
            },
            RequestKind::GetInventory => Self::GetInventory {
                last_timestamp_ms: u64::read(reader)?,
            },
            RequestKind::DownloadSettings => Self::DownloadSettings {
                hash: read_string(reader, MAX_TEXT_LENGTH)?,
            },
            RequestKind::GetHatchedEggs => Self::GetHatchedEggs,
            RequestKind::CheckAwardedBadges => Self::CheckAwardedBadges,
            RequestKind::CheckChallenge => Self::CheckChallenge {
                debug_request: bool::read(reader)?,
            },
            RequestKind::SetAvatar => Self::SetAvatar {
                avatar: PlayerAvatar::read(reader)?,
            },
            RequestKind::EncounterTutorialComplete => Self::EncounterTutorialComplete {
                species: StarterSpecies::read(reader)?,
            },
            RequestKind::ClaimCodename => Self::ClaimCodename {
                codename: read_string(reader, MAX_CODENAME_LENGTH)?,
            },
            RequestKind::MarkTutorialComplete => Self::MarkTutorialComplete {
                milestones: Vec::<Milestone>::read_range(reader, 0..=MAX_TUTORIAL_STATES)?,
                send_marketing_emails: bool::read(reader)?,
                send_push_notifications: bool::read(reader)?,
            },
            RequestKind::LevelUpRewards => Self::LevelUpRewards {
                level: u32::read(reader)?,
            },
            RequestKind::EquipBadge => Self::EquipBadge {
                badge: AwardedBadge::read(reader)?,
            },
        };
        Ok(request)
    }
}

impl EncodeSize for Request {
    fn encode_size(&self) -> usize {
        RequestKind::SIZE
            + match self {
                Self::GetPlayer { locale } => locale.encode_size(),
                Self::GetInventory { last_timestamp_ms } => last_timestamp_ms.encode_size(),
                Self::DownloadSettings { hash } => string_encode_size(hash),
                Self::GetHatchedEggs | Self::CheckAwardedBadges => 0,
                Self::CheckChallenge { debug_request } => debug_request.encode_size(),
                Self::SetAvatar { avatar } => avatar.encode_size(),
                Self::EncounterTutorialComplete { species } => species.encode_size(),
                Self::ClaimCodename { codename } => string_encode_size(codename),
                Self::MarkTutorialComplete {
                    milestones,
                    send_marketing_emails,
                    send_push_notifications,
                } => {
                    milestones.encode_size()
                        + send_marketing_emails.encode_size()
                        + send_push_notifications.encode_size()
                }
                Self::LevelUpRewards { level } => level.encode_size(),
                Self::EquipBadge { badge } => badge.encode_size(),
            }
    }
}
