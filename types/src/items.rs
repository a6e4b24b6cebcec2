use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, Read, ReadExt, Write};

/// Identifier of an item kind in the player's bag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ItemId(pub u16);

impl Write for ItemId {
    fn write(&self, writer: &mut impl BufMut) {
        self.0.write(writer);
    }
}

impl Read for ItemId {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self(u16::read(reader)?))
    }
}

impl FixedSize for ItemId {
    const SIZE: usize = u16::SIZE;
}

/// Item count, used both for inventory deltas and reward awards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ItemCount {
    pub item_id: ItemId,
    pub count: u32,
}

impl ItemCount {
    pub fn new(item_id: ItemId, count: u32) -> Self {
        Self { item_id, count }
    }
}

impl Write for ItemCount {
    fn write(&self, writer: &mut impl BufMut) {
        self.item_id.write(writer);
        self.count.write(writer);
    }
}

impl Read for ItemCount {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            item_id: ItemId::read(reader)?,
            count: u32::read(reader)?,
        })
    }
}

impl FixedSize for ItemCount {
    const SIZE: usize = ItemId::SIZE + u32::SIZE;
}

/// Badge kind. The server's badge catalog grows over time, so this stays open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct BadgeType(pub u16);

impl Write for BadgeType {
    fn write(&self, writer: &mut impl BufMut) {
        self.0.write(writer);
    }
}

impl Read for BadgeType {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self(u16::read(reader)?))
    }
}

impl FixedSize for BadgeType {
    const SIZE: usize = u16::SIZE;
}

/// A badge awarded to the player, with the level it was awarded at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct AwardedBadge {
    pub badge_type: BadgeType,
    pub level: u32,
}

impl Write for AwardedBadge {
    fn write(&self, writer: &mut impl BufMut) {
        self.badge_type.write(writer);
        self.level.write(writer);
    }
}

impl Read for AwardedBadge {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            badge_type: BadgeType::read(reader)?,
            level: u32::read(reader)?,
        })
    }
}

impl FixedSize for AwardedBadge {
    const SIZE: usize = BadgeType::SIZE + u32::SIZE;
}

/// Badge currently shown on the player's profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct EquippedBadge {
    pub badge_type: BadgeType,
    pub level: u32,
    pub next_equip_change_allowed_timestamp_ms: u64,
}

impl Write for EquippedBadge {
    fn write(&self, writer: &mut impl BufMut) {
        self.badge_type.write(writer);
        self.level.write(writer);
        self.next_equip_change_allowed_timestamp_ms.write(writer);
    }
}

impl Read for EquippedBadge {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            badge_type: BadgeType::read(reader)?,
            level: u32::read(reader)?,
            next_equip_change_allowed_timestamp_ms: u64::read(reader)?,
        })
    }
}

impl FixedSize for EquippedBadge {
    const SIZE: usize = BadgeType::SIZE + u32::SIZE + u64::SIZE;
}

/// Species offered as the first catch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum StarterSpecies {
    Bulbasaur = 1,
    Charmander = 4,
    Squirtle = 7,
}

impl StarterSpecies {
    pub const ALL: [StarterSpecies; 3] = [
        StarterSpecies::Bulbasaur,
        StarterSpecies::Charmander,
        StarterSpecies::Squirtle,
    ];
}

impl Write for StarterSpecies {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u16).write(writer);
    }
}

impl Read for StarterSpecies {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u16::read(reader)? {
            1 => Ok(Self::Bulbasaur),
            4 => Ok(Self::Charmander),
            7 => Ok(Self::Squirtle),
            _ => Err(Error::Invalid("StarterSpecies", "not a starter")),
        }
    }
}

impl FixedSize for StarterSpecies {
    const SIZE: usize = u16::SIZE;
}
