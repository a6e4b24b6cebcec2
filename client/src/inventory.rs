use std::collections::BTreeMap;

use tracing::debug;
use wildlink_types::{GetInventoryResponse, ItemId, PlayerStats};

/// Item counts mirrored from inventory refreshes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inventories {
    items: BTreeMap<ItemId, u32>,
    last_timestamp_ms: u64,
}

impl Inventories {
    pub fn count(&self, item_id: ItemId) -> u32 {
        self.items.get(&item_id).copied().unwrap_or_default()
    }

    pub fn items(&self) -> impl Iterator<Item = (ItemId, u32)> + '_ {
        self.items.iter().map(|(item_id, count)| (*item_id, *count))
    }

    /// Timestamp of the last applied refresh, sent back so the server only
    /// returns newer deltas.
    pub fn last_timestamp_ms(&self) -> u64 {
        self.last_timestamp_ms
    }

    /// Apply an inventory refresh. Listed items overwrite their counts; the
    /// returned stats belong to the profile mirror.
    pub(crate) fn update(&mut self, response: &GetInventoryResponse) -> Option<PlayerStats> {
        if !response.success {
            debug!("inventory refresh unsuccessful, keeping previous state");
            return None;
        }
        for item in &response.items {
            if item.count == 0 {
                self.items.remove(&item.item_id);
            } else {
                self.items.insert(item.item_id, item.count);
            }
        }
        self.last_timestamp_ms = self.last_timestamp_ms.max(response.timestamp_ms);
        response.stats
    }

    /// Add `count` of `item_id` and return the new total.
    pub(crate) fn add(&mut self, item_id: ItemId, count: u32) -> u32 {
        let total = self.items.entry(item_id).or_default();
        *total = total.saturating_add(count);
        *total
    }
}
