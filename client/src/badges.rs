use tracing::{debug, info, warn};
use wildlink_types::{
    AwardedBadge, CheckAwardedBadgesResponse, EquipBadgeResponse, EquipBadgeResult,
    EquippedBadge, Request,
};

use crate::{
    dispatch::{decode_slot, Dispatcher},
    session::Session,
    Result,
};

/// Result of [Session::sync_awarded_badges].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BadgeSync {
    pub awarded: Vec<AwardedBadge>,
    /// Last badge the server equipped, if any.
    pub equipped: Option<EquippedBadge>,
    pub refused: Vec<(AwardedBadge, EquipBadgeResult)>,
}

impl<D: Dispatcher> Session<D> {
    /// Equip every newly awarded badge, one request at a time.
    pub async fn sync_awarded_badges(&self) -> Result<BadgeSync> {
        let mut state = self.state.lock().await;
        let payloads = self.dispatch(vec![Request::CheckAwardedBadges]).await?;
        let response: CheckAwardedBadgesResponse = decode_slot(&payloads, 0)?;

        let mut sync = BadgeSync::default();
        if !response.success {
            debug!("awarded badge check unsuccessful");
            return Ok(sync);
        }
        for badge in response.awarded {
            let payloads = self.dispatch(vec![Request::EquipBadge { badge }]).await?;
            let equip: EquipBadgeResponse = decode_slot(&payloads, 0)?;
            if equip.result == EquipBadgeResult::Success {
                state.profile.set_equipped_badge(equip.equipped);
                sync.equipped = Some(equip.equipped);
            } else {
                warn!(badge = badge.badge_type.0, result = ?equip.result, "badge not equipped");
                sync.refused.push((badge, equip.result));
            }
            sync.awarded.push(badge);
        }
        info!(
            awarded = sync.awarded.len(),
            refused = sync.refused.len(),
            "awarded badges synced"
        );
        Ok(sync)
    }
}
