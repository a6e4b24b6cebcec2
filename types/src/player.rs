use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};
use serde::{Deserialize, Serialize};

use super::{
    read_string, string_encode_size, write_string, MAX_CODENAME_LENGTH, MAX_LABEL_LENGTH,
    MAX_LIST_ENTRIES, MAX_TUTORIAL_STATES,
};

/// Avatar body type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Gender {
    #[default]
    Male = 0,
    Female = 1,
}

impl Write for Gender {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for Gender {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Male),
            1 => Ok(Self::Female),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for Gender {
    const SIZE: usize = 1;
}

/// Tutorial states tracked by the server, in protocol order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Milestone {
    LegalScreen = 0,
    AvatarSelection = 1,
    AccountCreation = 2,
    PokemonCapture = 3,
    NameSelection = 4,
    PokemonBerry = 5,
    UseItem = 6,
    FirstTimeExperienceComplete = 7,
    PokestopTutorial = 8,
    GymTutorial = 9,
}

impl Milestone {
    /// Milestones a fresh account walks through before it is playable.
    pub const BOOTSTRAP_ORDER: [Milestone; 5] = [
        Milestone::LegalScreen,
        Milestone::AvatarSelection,
        Milestone::NameSelection,
        Milestone::PokemonCapture,
        Milestone::FirstTimeExperienceComplete,
    ];
}

impl Write for Milestone {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for Milestone {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        match value {
            0 => Ok(Self::LegalScreen),
            1 => Ok(Self::AvatarSelection),
            2 => Ok(Self::AccountCreation),
            3 => Ok(Self::PokemonCapture),
            4 => Ok(Self::NameSelection),
            5 => Ok(Self::PokemonBerry),
            6 => Ok(Self::UseItem),
            7 => Ok(Self::FirstTimeExperienceComplete),
            8 => Ok(Self::PokestopTutorial),
            9 => Ok(Self::GymTutorial),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for Milestone {
    const SIZE: usize = 1;
}

/// Visual customization: a body type plus eight cosmetic slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PlayerAvatar {
    pub gender: Gender,
    pub skin: u8,
    pub hair: u8,
    pub shirt: u8,
    pub pants: u8,
    pub hat: u8,
    pub shoes: u8,
    pub eyes: u8,
    pub backpack: u8,
}

impl Write for PlayerAvatar {
    fn write(&self, writer: &mut impl BufMut) {
        self.gender.write(writer);
        self.skin.write(writer);
        self.hair.write(writer);
        self.shirt.write(writer);
        self.pants.write(writer);
        self.hat.write(writer);
        self.shoes.write(writer);
        self.eyes.write(writer);
        self.backpack.write(writer);
    }
}

impl Read for PlayerAvatar {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            gender: Gender::read(reader)?,
            skin: u8::read(reader)?,
            hair: u8::read(reader)?,
            shirt: u8::read(reader)?,
            pants: u8::read(reader)?,
            hat: u8::read(reader)?,
            shoes: u8::read(reader)?,
            eyes: u8::read(reader)?,
            backpack: u8::read(reader)?,
        })
    }
}

impl FixedSize for PlayerAvatar {
    const SIZE: usize = Gender::SIZE + 8;
}

/// Daily bonus collection timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DailyBonus {
    pub next_collect_timestamp_ms: u64,
    pub next_defender_bonus_collect_timestamp_ms: u64,
}

impl Write for DailyBonus {
    fn write(&self, writer: &mut impl BufMut) {
        self.next_collect_timestamp_ms.write(writer);
        self.next_defender_bonus_collect_timestamp_ms.write(writer);
    }
}

impl Read for DailyBonus {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            next_collect_timestamp_ms: u64::read(reader)?,
            next_defender_bonus_collect_timestamp_ms: u64::read(reader)?,
        })
    }
}

impl FixedSize for DailyBonus {
    const SIZE: usize = u64::SIZE * 2;
}

/// Marketing and notification preferences.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ContactSettings {
    pub send_marketing_emails: bool,
    pub send_push_notifications: bool,
}

impl Write for ContactSettings {
    fn write(&self, writer: &mut impl BufMut) {
        self.send_marketing_emails.write(writer);
        self.send_push_notifications.write(writer);
    }
}

impl Read for ContactSettings {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            send_marketing_emails: bool::read(reader)?,
            send_push_notifications: bool::read(reader)?,
        })
    }
}

impl FixedSize for ContactSettings {
    const SIZE: usize = 2;
}

/// A currency balance as reported by the server.
///
/// The name is kept as a string on the wire so newer servers can introduce
/// currencies older clients do not know about.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CurrencyBalance {
    pub name: String,
    pub amount: u64,
}

impl CurrencyBalance {
    pub fn new(name: impl Into<String>, amount: u64) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }
}

impl Write for CurrencyBalance {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.name, writer);
        self.amount.write(writer);
    }
}

impl Read for CurrencyBalance {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            name: read_string(reader, MAX_LABEL_LENGTH)?,
            amount: u64::read(reader)?,
        })
    }
}

impl EncodeSize for CurrencyBalance {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.name) + self.amount.encode_size()
    }
}

/// Locale sent with every profile fetch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLocale {
    pub country: String,
    pub language: String,
    pub timezone: String,
}

impl Default for PlayerLocale {
    fn default() -> Self {
        Self {
            country: "US".to_string(),
            language: "en".to_string(),
            timezone: "America/Los_Angeles".to_string(),
        }
    }
}

impl Write for PlayerLocale {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.country, writer);
        write_string(&self.language, writer);
        write_string(&self.timezone, writer);
    }
}

impl Read for PlayerLocale {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            country: read_string(reader, MAX_LABEL_LENGTH)?,
            language: read_string(reader, MAX_LABEL_LENGTH)?,
            timezone: read_string(reader, MAX_LABEL_LENGTH)?,
        })
    }
}

impl EncodeSize for PlayerLocale {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.country)
            + string_encode_size(&self.language)
            + string_encode_size(&self.timezone)
    }
}

/// Server-issued player record.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PlayerData {
    pub creation_timestamp_ms: u64,
    pub username: String,
    pub team: u8,
    pub tutorial_state: Vec<Milestone>,
    pub avatar: PlayerAvatar,
    pub max_pokemon_storage: u32,
    pub max_item_storage: u32,
    pub daily_bonus: DailyBonus,
    pub contact_settings: ContactSettings,
    pub currencies: Vec<CurrencyBalance>,
    pub remaining_codename_claims: u32,
}

impl Write for PlayerData {
    fn write(&self, writer: &mut impl BufMut) {
        self.creation_timestamp_ms.write(writer);
        write_string(&self.username, writer);
        self.team.write(writer);
        self.tutorial_state.write(writer);
        self.avatar.write(writer);
        self.max_pokemon_storage.write(writer);
        self.max_item_storage.write(writer);
        self.daily_bonus.write(writer);
        self.contact_settings.write(writer);
        self.currencies.write(writer);
        self.remaining_codename_claims.write(writer);
    }
}

impl Read for PlayerData {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            creation_timestamp_ms: u64::read(reader)?,
            username: read_string(reader, MAX_CODENAME_LENGTH)?,
            team: u8::read(reader)?,
            tutorial_state: Vec::<Milestone>::read_range(reader, 0..=MAX_TUTORIAL_STATES)?,
            avatar: PlayerAvatar::read(reader)?,
            max_pokemon_storage: u32::read(reader)?,
            max_item_storage: u32::read(reader)?,
            daily_bonus: DailyBonus::read(reader)?,
            contact_settings: ContactSettings::read(reader)?,
            currencies: Vec::<CurrencyBalance>::read_range(reader, 0..=MAX_LIST_ENTRIES)?,
            remaining_codename_claims: u32::read(reader)?,
        })
    }
}

impl EncodeSize for PlayerData {
    fn encode_size(&self) -> usize {
        self.creation_timestamp_ms.encode_size()
            + string_encode_size(&self.username)
            + self.team.encode_size()
            + self.tutorial_state.encode_size()
            + self.avatar.encode_size()
            + self.max_pokemon_storage.encode_size()
            + self.max_item_storage.encode_size()
            + self.daily_bonus.encode_size()
            + self.contact_settings.encode_size()
            + self.currencies.encode_size()
            + self.remaining_codename_claims.encode_size()
    }
}

/// Trainer progression, delivered with inventory refreshes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PlayerStats {
    pub level: u32,
    pub experience: u64,
    pub next_level_experience: u64,
    pub pokemons_captured: u32,
}

impl Write for PlayerStats {
    fn write(&self, writer: &mut impl BufMut) {
        self.level.write(writer);
        self.experience.write(writer);
        self.next_level_experience.write(writer);
        self.pokemons_captured.write(writer);
    }
}

impl Read for PlayerStats {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            level: u32::read(reader)?,
            experience: u64::read(reader)?,
            next_level_experience: u64::read(reader)?,
            pokemons_captured: u32::read(reader)?,
        })
    }
}

impl FixedSize for PlayerStats {
    const SIZE: usize = u32::SIZE * 2 + u64::SIZE * 2;
}
