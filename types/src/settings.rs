use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};

use super::{read_string, string_encode_size, write_string, Gender, MAX_LABEL_LENGTH};

/// Gender-specific clothing ranges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WardrobeCatalog {
    pub shirts: u8,
    pub pants: u8,
    pub backpacks: u8,
}

impl Write for WardrobeCatalog {
    fn write(&self, writer: &mut impl BufMut) {
        self.shirts.write(writer);
        self.pants.write(writer);
        self.backpacks.write(writer);
    }
}

impl Read for WardrobeCatalog {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            shirts: u8::read(reader)?,
            pants: u8::read(reader)?,
            backpacks: u8::read(reader)?,
        })
    }
}

impl FixedSize for WardrobeCatalog {
    const SIZE: usize = 3;
}

/// Number of options the server offers for each avatar slot.
///
/// A slot value is valid when it is strictly below the matching count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AvatarCatalog {
    pub skins: u8,
    pub hair: u8,
    pub eyes: u8,
    pub hats: u8,
    pub shoes: u8,
    pub male: WardrobeCatalog,
    pub female: WardrobeCatalog,
}

impl AvatarCatalog {
    pub fn wardrobe(&self, gender: Gender) -> &WardrobeCatalog {
        match gender {
            Gender::Male => &self.male,
            Gender::Female => &self.female,
        }
    }
}

impl Default for AvatarCatalog {
    fn default() -> Self {
        Self {
            skins: 4,
            hair: 6,
            eyes: 5,
            hats: 5,
            shoes: 7,
            male: WardrobeCatalog {
                shirts: 4,
                pants: 3,
                backpacks: 6,
            },
            female: WardrobeCatalog {
                shirts: 9,
                pants: 6,
                backpacks: 6,
            },
        }
    }
}

impl Write for AvatarCatalog {
    fn write(&self, writer: &mut impl BufMut) {
        self.skins.write(writer);
        self.hair.write(writer);
        self.eyes.write(writer);
        self.hats.write(writer);
        self.shoes.write(writer);
        self.male.write(writer);
        self.female.write(writer);
    }
}

impl Read for AvatarCatalog {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            skins: u8::read(reader)?,
            hair: u8::read(reader)?,
            eyes: u8::read(reader)?,
            hats: u8::read(reader)?,
            shoes: u8::read(reader)?,
            male: WardrobeCatalog::read(reader)?,
            female: WardrobeCatalog::read(reader)?,
        })
    }
}

impl FixedSize for AvatarCatalog {
    const SIZE: usize = 5 + WardrobeCatalog::SIZE * 2;
}

/// Global settings distributed by the server.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct GlobalSettings {
    pub minimum_client_version: String,
    pub avatar_catalog: AvatarCatalog,
}

impl Write for GlobalSettings {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.minimum_client_version, writer);
        self.avatar_catalog.write(writer);
    }
}

impl Read for GlobalSettings {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            minimum_client_version: read_string(reader, MAX_LABEL_LENGTH)?,
            avatar_catalog: AvatarCatalog::read(reader)?,
        })
    }
}

impl EncodeSize for GlobalSettings {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.minimum_client_version) + self.avatar_catalog.encode_size()
    }
}
