//! Bootstrap orchestration over a [Dispatcher].
//!
//! Every mutating call goes out as a [StandardBatch] and is applied only after
//! all five of its payloads decode. Operations hold the session lock for their
//! whole span, so a multi-step operation is never interleaved with another.

use std::sync::Arc;

use rand::rngs::OsRng;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use wildlink_types::{
    CheckChallengeResponse, DecodeError, EncounterResult, EncounterTutorialCompleteResponse,
    GetPlayerResponse, MarkTutorialCompleteResponse, Message, Milestone, Request, RequestKind,
    SetAvatarResponse, SetAvatarStatus,
};

use crate::{
    codename::CodenameClaim,
    dispatch::{decode_slot, kinds, Dispatcher, StandardBatch, StandardResponses},
    inventory::Inventories,
    listener::{BootstrapListener, Listeners},
    profile::ProfileMirror,
    random,
    settings::Settings,
    CommittedAction, Error, Result, ValidatedConfig,
};

/// Outcome of a bootstrap step the server may decline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    /// The mirror already showed the milestone; nothing was sent.
    AlreadyComplete,
    Rejected(Rejection),
}

/// Why the server declined a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    Avatar(SetAvatarStatus),
    Encounter(EncounterResult),
    Milestone(Milestone),
}

/// Steps taken by [Session::bootstrap], in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub steps: Vec<(Milestone, StepOutcome)>,
    pub codename: Option<CodenameClaim>,
}

impl BootstrapReport {
    /// True when no step was declined.
    pub fn is_complete(&self) -> bool {
        let steps_ok = self
            .steps
            .iter()
            .all(|(_, outcome)| !matches!(outcome, StepOutcome::Rejected(_)));
        let codename_ok = !matches!(self.codename, Some(CodenameClaim::Exhausted { .. }));
        steps_ok && codename_ok
    }
}

#[derive(Default)]
pub(crate) struct SessionState {
    pub(crate) profile: ProfileMirror,
    pub(crate) inventories: Inventories,
    pub(crate) settings: Settings,
}

pub struct Session<D: Dispatcher> {
    dispatcher: D,
    config: ValidatedConfig,
    listeners: Listeners,
    pub(crate) state: Mutex<SessionState>,
}

impl<D: Dispatcher> Session<D> {
    pub fn new(dispatcher: D, config: ValidatedConfig) -> Self {
        Self {
            dispatcher,
            config,
            listeners: Listeners::default(),
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn BootstrapListener>) -> Self {
        self.listeners.register(listener);
        self
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    pub(crate) fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    /// Copy of the profile mirror.
    pub async fn profile(&self) -> ProfileMirror {
        self.state.lock().await.profile.clone()
    }

    pub async fn inventories(&self) -> Inventories {
        self.state.lock().await.inventories.clone()
    }

    pub async fn settings(&self) -> Settings {
        self.state.lock().await.settings.clone()
    }

    /// Fetch the player record and replace the mirror with it.
    pub async fn fetch_profile(&self) -> Result<()> {
        let mut state = self.state.lock().await;

        let mut requests = vec![Request::GetPlayer {
            locale: self.config.locale.clone(),
        }];
        if self.config.check_challenge {
            requests.push(Request::CheckChallenge {
                debug_request: false,
            });
        }
        let payloads = self.dispatch(requests).await?;

        let response: GetPlayerResponse = decode_slot(&payloads, 0)?;
        if !response.success {
            return Err(DecodeError::Unsuccessful {
                kind: RequestKind::GetPlayer,
            }
            .into());
        }
        if self.config.check_challenge {
            match decode_slot::<CheckChallengeResponse>(&payloads, 1) {
                Ok(challenge) if challenge.show_challenge => {
                    warn!(url = %challenge.challenge_url, "server requested a challenge")
                }
                Ok(_) => {}
                Err(err) => debug!(?err, "ignoring challenge response"),
            }
        }

        state.profile.apply_snapshot(response.player_data);
        info!(username = ?state.profile.username(), "profile fetched");
        Ok(())
    }

    /// Refresh the mirror and companions with a standard batch around a
    /// profile fetch.
    pub async fn resync(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.resync_locked(&mut state).await
    }

    /// Mark `milestone` complete unless the mirror already shows it.
    pub async fn mark_milestone(&self, milestone: Milestone) -> Result<StepOutcome> {
        let mut state = self.state.lock().await;
        self.mark_milestone_locked(&mut state, milestone).await
    }

    /// Accept the legal screen.
    pub async fn activate_account(&self) -> Result<StepOutcome> {
        self.mark_milestone(Milestone::LegalScreen).await
    }

    pub async fn complete_first_time_experience(&self) -> Result<StepOutcome> {
        self.mark_milestone(Milestone::FirstTimeExperienceComplete)
            .await
    }

    /// Submit an avatar, then mark avatar selection complete.
    ///
    /// An avatar the server already holds counts as committed and goes
    /// straight to the mark. Once the avatar is committed, a failed mark
    /// surfaces as [Error::PartialSync]; calling
    /// [Session::mark_milestone] with [Milestone::AvatarSelection] recovers.
    pub async fn setup_avatar(&self) -> Result<StepOutcome> {
        let mut state = self.state.lock().await;
        if state
            .profile
            .tutorial()
            .is_complete(Milestone::AvatarSelection)
        {
            return Ok(StepOutcome::AlreadyComplete);
        }

        let catalog = state.settings.avatar_catalog();
        let avatar = self
            .listeners
            .avatar(&catalog)
            .unwrap_or_else(|| random::avatar(&mut OsRng, &catalog));
        let responses = self
            .send_standard::<SetAvatarResponse>(&state, Request::SetAvatar { avatar })
            .await?;
        Self::apply_companions(&mut state, &responses);

        let response = responses.primary;
        match response.status {
            SetAvatarStatus::Success => info!(?avatar, "avatar set"),
            SetAvatarStatus::AvatarAlreadySet => {
                info!(avatar = ?response.player_data.avatar, "avatar already set")
            }
            status => {
                warn!(?status, "avatar rejected");
                return Ok(StepOutcome::Rejected(Rejection::Avatar(status)));
            }
        }
        state.profile.apply_snapshot(response.player_data);

        let outcome = self
            .mark_milestone_locked(&mut state, Milestone::AvatarSelection)
            .await
            .map_err(|source| Error::PartialSync {
                action: CommittedAction::AvatarSelection,
                source: Box::new(source),
            })?;
        match outcome {
            StepOutcome::Rejected(rejection) => Ok(StepOutcome::Rejected(rejection)),
            _ => Ok(StepOutcome::Completed),
        }
    }

    /// Catch the first creature, then refresh the profile.
    ///
    /// Once the server has accepted the encounter, a failed refresh surfaces
    /// as [Error::PartialSync]; calling [Session::resync] recovers.
    pub async fn complete_starter_encounter(&self) -> Result<StepOutcome> {
        let mut state = self.state.lock().await;
        if state
            .profile
            .tutorial()
            .is_complete(Milestone::PokemonCapture)
        {
            return Ok(StepOutcome::AlreadyComplete);
        }

        let species = self
            .listeners
            .starter()
            .unwrap_or_else(|| random::starter(&mut OsRng));
        let responses = self
            .send_standard::<EncounterTutorialCompleteResponse>(
                &state,
                Request::EncounterTutorialComplete { species },
            )
            .await?;
        Self::apply_companions(&mut state, &responses);

        let response = responses.primary;
        if response.result != EncounterResult::Success {
            warn!(result = ?response.result, ?species, "starter encounter rejected");
            return Ok(StepOutcome::Rejected(Rejection::Encounter(response.result)));
        }
        info!(
            ?species,
            pokemon_id = response.captured_pokemon_id,
            "starter captured"
        );

        self.resync_locked(&mut state)
            .await
            .map_err(|source| Error::PartialSync {
                action: CommittedAction::StarterEncounter,
                source: Box::new(source),
            })?;
        Ok(StepOutcome::Completed)
    }

    /// Walk an account through every bootstrap milestone it has not reached.
    ///
    /// Stops at the first declined step; the report says which.
    pub async fn bootstrap(&self) -> Result<BootstrapReport> {
        if !self.state.lock().await.profile.is_populated() {
            self.fetch_profile().await?;
        }

        let mut report = BootstrapReport::default();
        for milestone in Milestone::BOOTSTRAP_ORDER {
            let outcome = match milestone {
                Milestone::LegalScreen => self.activate_account().await?,
                Milestone::AvatarSelection => self.setup_avatar().await?,
                Milestone::NameSelection => {
                    if self
                        .state
                        .lock()
                        .await
                        .profile
                        .tutorial()
                        .is_complete(Milestone::NameSelection)
                    {
                        StepOutcome::AlreadyComplete
                    } else {
                        let claim = self.claim_codename(None).await?;
                        let exhausted = matches!(claim, CodenameClaim::Exhausted { .. });
                        report.codename = Some(claim);
                        if exhausted {
                            break;
                        }
                        StepOutcome::Completed
                    }
                }
                Milestone::PokemonCapture => self.complete_starter_encounter().await?,
                Milestone::FirstTimeExperienceComplete => {
                    self.complete_first_time_experience().await?
                }
                _ => continue,
            };
            report.steps.push((milestone, outcome));
            if matches!(outcome, StepOutcome::Rejected(_)) {
                break;
            }
        }
        info!(complete = report.is_complete(), "bootstrap finished");
        Ok(report)
    }

    pub(crate) async fn mark_milestone_locked(
        &self,
        state: &mut SessionState,
        milestone: Milestone,
    ) -> Result<StepOutcome> {
        if state.profile.tutorial().is_complete(milestone) {
            debug!(?milestone, "milestone already complete");
            return Ok(StepOutcome::AlreadyComplete);
        }

        let responses = self
            .send_standard::<MarkTutorialCompleteResponse>(
                state,
                Request::MarkTutorialComplete {
                    milestones: vec![milestone],
                    send_marketing_emails: false,
                    send_push_notifications: false,
                },
            )
            .await?;
        Self::apply_companions(state, &responses);

        let response = responses.primary;
        if !response.success {
            warn!(?milestone, "milestone rejected");
            return Ok(StepOutcome::Rejected(Rejection::Milestone(milestone)));
        }
        state.profile.apply_snapshot(response.player_data);
        state.profile.mark_milestone(milestone);
        info!(?milestone, "milestone marked");
        Ok(StepOutcome::Completed)
    }

    pub(crate) async fn resync_locked(&self, state: &mut SessionState) -> Result<()> {
        let responses = self
            .send_standard::<GetPlayerResponse>(
                state,
                Request::GetPlayer {
                    locale: self.config.locale.clone(),
                },
            )
            .await?;
        if !responses.primary.success {
            return Err(DecodeError::Unsuccessful {
                kind: RequestKind::GetPlayer,
            }
            .into());
        }
        Self::apply_companions(state, &responses);
        state.profile.apply_snapshot(responses.primary.player_data);
        debug!("profile resynced");
        Ok(())
    }

    /// Send `primary` with the standard companions and decode all five slots.
    pub(crate) async fn send_standard<P: Message>(
        &self,
        state: &SessionState,
        primary: Request,
    ) -> Result<StandardResponses<P>> {
        let batch = StandardBatch::new(
            primary,
            state.inventories.last_timestamp_ms(),
            state.settings.hash(),
        );
        let payloads = self.dispatch(batch.into_requests()).await?;
        Ok(StandardBatch::decode(&payloads)?)
    }

    /// Fold the companion responses into the mirrors.
    pub(crate) fn apply_companions<P>(state: &mut SessionState, responses: &StandardResponses<P>) {
        if let Some(stats) = state.inventories.update(&responses.inventory) {
            state.profile.set_stats(stats);
        }
        state.settings.update(&responses.settings);
        if !responses.hatched_eggs.pokemon_ids.is_empty() {
            info!(count = responses.hatched_eggs.pokemon_ids.len(), "eggs hatched");
        }
        if !responses.awarded_badges.awarded.is_empty() {
            debug!(
                count = responses.awarded_badges.awarded.len(),
                "badges awaiting equip"
            );
        }
    }

    pub(crate) async fn dispatch(&self, requests: Vec<Request>) -> Result<Vec<Vec<u8>>> {
        let expected = requests.len();
        debug!(kinds = ?kinds(&requests), "dispatching batch");
        let payloads = self.dispatcher.send(requests).await?;
        if payloads.len() > expected {
            debug!(
                extra = payloads.len() - expected,
                "dispatcher appended responses"
            );
        }
        Ok(payloads)
    }
}
