use rand::rngs::OsRng;
use tracing::{info, warn};
use wildlink_types::{ClaimCodenameResponse, CodenameStatus, Milestone, Request};

use crate::{
    dispatch::Dispatcher,
    random,
    session::{Session, SessionState, StepOutcome},
    CommittedAction, Error, Result,
};

/// Result of a codename claim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CodenameClaim {
    /// The server assigned `codename` to the player.
    Claimed { codename: String },
    /// The server has no claims left for this account.
    Exhausted {
        status: CodenameStatus,
        last_attempt: String,
    },
}

impl<D: Dispatcher> Session<D> {
    /// Claim a codename, retrying with fresh candidates until one is accepted.
    ///
    /// Candidates come from the listeners and fall back to a random name.
    /// The loop ends when the server reports no claims remaining, or with
    /// [Error::CodenameExhausted] once the configured attempt limit is spent.
    /// After a claim is accepted, name selection is marked and the profile
    /// refreshed; a failure there surfaces as [Error::PartialSync].
    pub async fn claim_codename(&self, last_failure: Option<String>) -> Result<CodenameClaim> {
        let mut state = self.state.lock().await;
        let max_attempts = self.config().max_codename_attempts;
        let mut last_failure = last_failure;

        for attempt in 1..=max_attempts {
            let candidate = self
                .listeners()
                .codename(last_failure.as_deref())
                .unwrap_or_else(|| random::codename(&mut OsRng));
            let responses = self
                .send_standard::<ClaimCodenameResponse>(
                    &state,
                    Request::ClaimCodename {
                        codename: candidate.clone(),
                    },
                )
                .await?;
            Self::apply_companions(&mut state, &responses);

            let response = responses.primary;
            if response.status == CodenameStatus::Success {
                let codename = if response.codename.is_empty() {
                    candidate
                } else {
                    response.codename
                };
                state.profile.apply_snapshot(response.updated_player);
                info!(%codename, attempt, "codename claimed");

                self.finish_claim(&mut state)
                    .await
                    .map_err(|source| Error::PartialSync {
                        action: CommittedAction::ClaimCodename,
                        source: Box::new(source),
                    })?;
                return Ok(CodenameClaim::Claimed { codename });
            }

            let remaining = response.updated_player.remaining_codename_claims;
            warn!(
                codename = %candidate,
                status = ?response.status,
                message = %response.user_message,
                remaining,
                attempt,
                "codename rejected"
            );
            if remaining == 0 {
                return Ok(CodenameClaim::Exhausted {
                    status: response.status,
                    last_attempt: candidate,
                });
            }
            last_failure = Some(candidate);
        }

        Err(Error::CodenameExhausted {
            attempts: max_attempts,
            last_attempt: last_failure.unwrap_or_default(),
        })
    }

    async fn finish_claim(&self, state: &mut SessionState) -> Result<()> {
        if let StepOutcome::Rejected(rejection) = self
            .mark_milestone_locked(state, Milestone::NameSelection)
            .await?
        {
            warn!(?rejection, "name selection not recorded");
        }
        self.resync_locked(state).await
    }
}
