//! Random choices used when no listener provides one.
//!
//! Callers pass a cryptographically secure generator; tests seed one.

use std::ops::Range;

use rand::{distributions::Alphanumeric, CryptoRng, Rng, RngCore};
use wildlink_types::{AvatarCatalog, Gender, PlayerAvatar, StarterSpecies};

/// Length range of generated codenames.
pub const CODENAME_LENGTH: Range<usize> = 10..15;

/// Avatar with every slot drawn uniformly from `catalog`.
pub fn avatar<R: RngCore + CryptoRng>(rng: &mut R, catalog: &AvatarCatalog) -> PlayerAvatar {
    let gender = if rng.gen_bool(0.5) {
        Gender::Female
    } else {
        Gender::Male
    };
    let wardrobe = catalog.wardrobe(gender);
    PlayerAvatar {
        gender,
        skin: pick(rng, catalog.skins),
        hair: pick(rng, catalog.hair),
        shirt: pick(rng, wardrobe.shirts),
        pants: pick(rng, wardrobe.pants),
        hat: pick(rng, catalog.hats),
        shoes: pick(rng, catalog.shoes),
        eyes: pick(rng, catalog.eyes),
        backpack: pick(rng, wardrobe.backpacks),
    }
}

pub fn starter<R: RngCore + CryptoRng>(rng: &mut R) -> StarterSpecies {
    StarterSpecies::ALL[rng.gen_range(0..StarterSpecies::ALL.len())]
}

/// Alphanumeric codename with a length in [CODENAME_LENGTH].
pub fn codename<R: RngCore + CryptoRng>(rng: &mut R) -> String {
    let len = rng.gen_range(CODENAME_LENGTH);
    (0..len)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}

fn pick<R: Rng + ?Sized>(rng: &mut R, options: u8) -> u8 {
    if options == 0 {
        return 0;
    }
    rng.gen_range(0..options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use wildlink_types::WardrobeCatalog;

    #[test]
    fn test_avatar_within_catalog() {
        let mut rng = StdRng::seed_from_u64(0);
        let catalog = AvatarCatalog::default();
        for _ in 0..200 {
            let avatar = avatar(&mut rng, &catalog);
            let wardrobe = catalog.wardrobe(avatar.gender);
            assert!(avatar.skin < catalog.skins);
            assert!(avatar.hair < catalog.hair);
            assert!(avatar.eyes < catalog.eyes);
            assert!(avatar.hat < catalog.hats);
            assert!(avatar.shoes < catalog.shoes);
            assert!(avatar.shirt < wardrobe.shirts);
            assert!(avatar.pants < wardrobe.pants);
            assert!(avatar.backpack < wardrobe.backpacks);
        }
    }

    #[test]
    fn test_avatar_with_empty_slots() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty = WardrobeCatalog {
            shirts: 0,
            pants: 0,
            backpacks: 0,
        };
        let catalog = AvatarCatalog {
            skins: 0,
            hair: 0,
            eyes: 0,
            hats: 0,
            shoes: 0,
            male: empty,
            female: empty,
        };
        let avatar = avatar(&mut rng, &catalog);
        assert_eq!(avatar.skin, 0);
        assert_eq!(avatar.backpack, 0);
    }

    #[test]
    fn test_codename_shape() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..100 {
            let name = codename(&mut rng);
            assert!(CODENAME_LENGTH.contains(&name.len()));
            assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_starter_covers_all_species() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            seen.insert(starter(&mut rng));
        }
        assert_eq!(seen.len(), StarterSpecies::ALL.len());
    }
}
