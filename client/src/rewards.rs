use tracing::{debug, info};
use wildlink_types::{ItemCount, ItemId, LevelUpRewardsResponse, LevelUpRewardsResult, Request};

use crate::{
    dispatch::{decode_slot, Dispatcher},
    session::Session,
    Result,
};

/// Result of [Session::accept_level_rewards].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LevelRewards {
    /// The mirrored level is below the requested one; nothing was sent.
    NotYetUnlocked,
    Accepted {
        result: LevelUpRewardsResult,
        items_awarded: Vec<ItemCount>,
        items_unlocked: Vec<ItemId>,
    },
}

impl<D: Dispatcher> Session<D> {
    /// Collect the rewards for reaching `level` and add them to the inventory.
    pub async fn accept_level_rewards(&self, level: u32) -> Result<LevelRewards> {
        let mut state = self.state.lock().await;
        let current = state.profile.current_level();
        if level > current {
            debug!(level, current, "level rewards not yet unlocked");
            return Ok(LevelRewards::NotYetUnlocked);
        }

        let payloads = self.dispatch(vec![Request::LevelUpRewards { level }]).await?;
        let response: LevelUpRewardsResponse = decode_slot(&payloads, 0)?;
        for award in &response.items_awarded {
            let total = state.inventories.add(award.item_id, award.count);
            debug!(item = award.item_id.0, count = award.count, total, "item awarded");
        }
        info!(
            level,
            result = ?response.result,
            awarded = response.items_awarded.len(),
            unlocked = response.items_unlocked.len(),
            "level rewards accepted"
        );
        Ok(LevelRewards::Accepted {
            result: response.result,
            items_awarded: response.items_awarded,
            items_unlocked: response.items_unlocked,
        })
    }
}
