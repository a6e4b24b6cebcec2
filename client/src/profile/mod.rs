//! Local mirror of the server-authoritative player record.
//!
//! Every accepted snapshot replaces the mirror wholesale. The derived views
//! (avatar, daily bonus, contact settings, currencies and tutorial progress)
//! are rebuilt from the snapshot before any of them is swapped in, so readers
//! never observe a mix of two snapshots.

mod currency;
mod tutorial;

pub use currency::{Currency, CurrencyLedger};
pub use tutorial::TutorialProgress;

use wildlink_types::{
    ContactSettings, DailyBonus, EquippedBadge, Milestone, PlayerAvatar, PlayerData, PlayerStats,
};

/// The last accepted player record with its derived sub-records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub player_data: PlayerData,
    pub avatar: PlayerAvatar,
    pub daily_bonus: DailyBonus,
    pub contact_settings: ContactSettings,
}

impl From<PlayerData> for Snapshot {
    fn from(player_data: PlayerData) -> Self {
        Self {
            avatar: player_data.avatar,
            daily_bonus: player_data.daily_bonus,
            contact_settings: player_data.contact_settings,
            player_data,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileMirror {
    snapshot: Option<Snapshot>,
    currencies: CurrencyLedger,
    tutorial: TutorialProgress,
    equipped_badge: Option<EquippedBadge>,
    stats: Option<PlayerStats>,
}

impl ProfileMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the mirror with `player_data`.
    pub fn apply_snapshot(&mut self, player_data: PlayerData) {
        let currencies = CurrencyLedger::from_balances(&player_data.currencies);
        let tutorial = TutorialProgress::from_states(&player_data.tutorial_state);
        let snapshot = Snapshot::from(player_data);

        self.snapshot = Some(snapshot);
        self.currencies = currencies;
        self.tutorial = tutorial;
    }

    /// Record a milestone the server acknowledged.
    pub fn mark_milestone(&mut self, milestone: Milestone) -> bool {
        self.tutorial.mark(milestone)
    }

    pub(crate) fn set_equipped_badge(&mut self, badge: EquippedBadge) {
        self.equipped_badge = Some(badge);
    }

    pub(crate) fn set_stats(&mut self, stats: PlayerStats) {
        self.stats = Some(stats);
    }

    pub fn is_populated(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn player_data(&self) -> Option<&PlayerData> {
        self.snapshot.as_ref().map(|snapshot| &snapshot.player_data)
    }

    pub fn username(&self) -> Option<&str> {
        self.player_data().map(|data| data.username.as_str())
    }

    pub fn avatar(&self) -> Option<&PlayerAvatar> {
        self.snapshot.as_ref().map(|snapshot| &snapshot.avatar)
    }

    pub fn daily_bonus(&self) -> Option<&DailyBonus> {
        self.snapshot.as_ref().map(|snapshot| &snapshot.daily_bonus)
    }

    pub fn contact_settings(&self) -> Option<&ContactSettings> {
        self.snapshot
            .as_ref()
            .map(|snapshot| &snapshot.contact_settings)
    }

    pub fn currencies(&self) -> &CurrencyLedger {
        &self.currencies
    }

    pub fn tutorial(&self) -> &TutorialProgress {
        &self.tutorial
    }

    pub fn equipped_badge(&self) -> Option<&EquippedBadge> {
        self.equipped_badge.as_ref()
    }

    pub fn stats(&self) -> Option<&PlayerStats> {
        self.stats.as_ref()
    }

    /// Trainer level from the last inventory refresh, zero before any.
    pub fn current_level(&self) -> u32 {
        self.stats.map(|stats| stats.level).unwrap_or_default()
    }
}
