use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use commonware_codec::{DecodeExt, Encode};
use tokio::time::sleep;
use wildlink_types::{
    AvatarCatalog, AwardedBadge, BadgeType, CodenameStatus, CurrencyBalance, EncounterResult,
    EquipBadgeResult, Gender, ItemCount, ItemId, Milestone, PlayerAvatar, PlayerStats,
    RequestEnvelope, RequestKind, ResponseEnvelope, SetAvatarStatus, StarterSpecies,
};

use super::*;
use crate::{
    mocks::{MockServer, ServerState, SETTINGS_HASH},
    random::CODENAME_LENGTH,
};

fn session(server: &Arc<MockServer>) -> Session<Arc<MockServer>> {
    Session::new(server.clone(), ValidatedConfig::default())
}

fn session_with(server: &Arc<MockServer>, config: ValidatedConfig) -> Session<Arc<MockServer>> {
    Session::new(server.clone(), config)
}

fn count_batches(server: &MockServer, kind: RequestKind) -> usize {
    server
        .batches()
        .iter()
        .filter(|batch| batch.first() == Some(&kind))
        .count()
}

/// Answers every hook with a fixed choice.
struct Scripted {
    avatar: Option<PlayerAvatar>,
    starter: Option<StarterSpecies>,
    names: Vec<&'static str>,
}

impl BootstrapListener for Scripted {
    fn select_avatar(&self, _catalog: &AvatarCatalog) -> Option<PlayerAvatar> {
        self.avatar
    }

    fn select_starter(&self) -> Option<StarterSpecies> {
        self.starter
    }

    fn claim_name(&self, last_failure: Option<&str>) -> Option<String> {
        let next = match last_failure {
            None => 0,
            Some(previous) => self.names.iter().position(|name| *name == previous)? + 1,
        };
        self.names.get(next).map(|name| name.to_string())
    }
}

/// Always proposes the same codename.
struct Stubborn(&'static str);

impl BootstrapListener for Stubborn {
    fn claim_name(&self, _last_failure: Option<&str>) -> Option<String> {
        Some(self.0.to_string())
    }
}

#[tokio::test]
async fn test_fetch_profile_drops_unknown_currency() {
    let server = Arc::new(MockServer::new());
    server.update(|state| {
        state.player.currencies = vec![
            CurrencyBalance::new("STARDUST", 500),
            CurrencyBalance::new("POKECOIN", 10),
            CurrencyBalance::new("UNKNOWN_COIN", 3),
        ];
    });
    let session = session(&server);

    session.fetch_profile().await.unwrap();

    let profile = session.profile().await;
    assert!(profile.is_populated());
    assert_eq!(
        profile.currencies().iter().collect::<Vec<_>>(),
        vec![(Currency::Stardust, 500), (Currency::Pokecoin, 10)]
    );
    assert_eq!(server.batches(), vec![vec![RequestKind::GetPlayer]]);
}

#[tokio::test]
async fn test_fetch_profile_appends_challenge() {
    let server = Arc::new(MockServer::new());
    let config = ValidatedConfig {
        check_challenge: true,
        ..Default::default()
    };
    let session = session_with(&server, config);

    session.fetch_profile().await.unwrap();
    assert_eq!(
        server.batches(),
        vec![vec![RequestKind::GetPlayer, RequestKind::CheckChallenge]]
    );
}

#[tokio::test]
async fn test_fetch_profile_errors() {
    let server = Arc::new(MockServer::new());
    server.update(|state| {
        state
            .fail_calls
            .insert(1, DispatchError::Auth("expired token".to_string()));
        state
            .fail_calls
            .insert(2, DispatchError::Transport("reset".to_string()));
        state.corrupt.insert(RequestKind::GetPlayer);
    });
    let session = session(&server);

    assert!(matches!(
        session.fetch_profile().await,
        Err(Error::Session(reason)) if reason == "expired token"
    ));
    assert!(matches!(
        session.fetch_profile().await,
        Err(Error::Dispatch(DispatchError::Transport(_)))
    ));
    assert!(matches!(
        session.fetch_profile().await,
        Err(Error::RemoteServer(_))
    ));
    assert!(!session.profile().await.is_populated());
}

#[tokio::test]
async fn test_mark_milestone_is_idempotent() {
    let server = Arc::new(MockServer::new());
    let session = session(&server);
    session.fetch_profile().await.unwrap();

    assert_eq!(
        session.activate_account().await.unwrap(),
        StepOutcome::Completed
    );
    assert_eq!(
        session.activate_account().await.unwrap(),
        StepOutcome::AlreadyComplete
    );
    assert_eq!(count_batches(&server, RequestKind::MarkTutorialComplete), 1);

    let profile = session.profile().await;
    assert!(profile.tutorial().is_complete(Milestone::LegalScreen));
    let contact = profile.contact_settings().unwrap();
    assert!(!contact.send_marketing_emails);
    assert!(!contact.send_push_notifications);
}

#[tokio::test]
async fn test_mark_milestone_rejected() {
    let server = Arc::new(MockServer::new());
    server.update(|state| {
        state.refused_milestones.insert(Milestone::LegalScreen);
    });
    let session = session(&server);
    session.fetch_profile().await.unwrap();

    assert_eq!(
        session.activate_account().await.unwrap(),
        StepOutcome::Rejected(Rejection::Milestone(Milestone::LegalScreen))
    );
    assert!(!session
        .profile()
        .await
        .tutorial()
        .is_complete(Milestone::LegalScreen));
}

#[tokio::test]
async fn test_standard_batch_refreshes_companions() {
    let server = Arc::new(MockServer::new());
    server.update(|state| state.hatched = vec![11, 12]);
    let session = session(&server);
    session.fetch_profile().await.unwrap();
    assert_eq!(session.settings().await.hash(), "");

    session.activate_account().await.unwrap();

    let inventories = session.inventories().await;
    assert_eq!(inventories.count(ItemId(1)), 20);
    assert_eq!(inventories.last_timestamp_ms(), 1);
    assert_eq!(session.settings().await.hash(), SETTINGS_HASH);
    assert_eq!(session.profile().await.current_level(), 1);
    assert_eq!(
        server.batches()[1],
        vec![
            RequestKind::MarkTutorialComplete,
            RequestKind::GetHatchedEggs,
            RequestKind::GetInventory,
            RequestKind::CheckAwardedBadges,
            RequestKind::DownloadSettings,
        ]
    );
}

#[tokio::test]
async fn test_setup_avatar_random() {
    let server = Arc::new(MockServer::new());
    let session = session(&server);
    session.fetch_profile().await.unwrap();

    assert_eq!(session.setup_avatar().await.unwrap(), StepOutcome::Completed);

    let profile = session.profile().await;
    let avatar = *profile.avatar().unwrap();
    let catalog = AvatarCatalog::default();
    assert!(avatar.shirt < catalog.wardrobe(avatar.gender).shirts);
    assert_eq!(avatar, server.state().player.avatar);
    assert!(profile.tutorial().is_complete(Milestone::AvatarSelection));
    assert_eq!(
        session.setup_avatar().await.unwrap(),
        StepOutcome::AlreadyComplete
    );
}

#[tokio::test]
async fn test_setup_avatar_listener_override() {
    let server = Arc::new(MockServer::new());
    let chosen = PlayerAvatar {
        gender: Gender::Female,
        skin: 1,
        hair: 5,
        shirt: 8,
        pants: 2,
        hat: 3,
        shoes: 4,
        eyes: 2,
        backpack: 1,
    };
    let session = session(&server).with_listener(Arc::new(Scripted {
        avatar: Some(chosen),
        starter: None,
        names: Vec::new(),
    }));
    session.fetch_profile().await.unwrap();

    session.setup_avatar().await.unwrap();
    assert_eq!(session.profile().await.avatar(), Some(&chosen));
}

#[tokio::test]
async fn test_setup_avatar_corrupt_settings_slot() {
    let server = Arc::new(MockServer::new());
    let session = session(&server);
    session.fetch_profile().await.unwrap();
    server.update(|state| {
        state.corrupt.insert(RequestKind::DownloadSettings);
    });

    let result = session.setup_avatar().await;
    assert!(matches!(result, Err(Error::RemoteServer(_))));

    let profile = session.profile().await;
    assert_eq!(profile.avatar(), Some(&PlayerAvatar::default()));
    assert!(!profile.tutorial().is_complete(Milestone::AvatarSelection));
    assert_eq!(session.inventories().await, Inventories::default());
    assert_eq!(session.settings().await, Settings::default());
}

#[tokio::test]
async fn test_setup_avatar_rejected() {
    let server = Arc::new(MockServer::new());
    server.update(|state| state.avatar_status = Some(SetAvatarStatus::Failure));
    let session = session(&server);
    session.fetch_profile().await.unwrap();

    assert_eq!(
        session.setup_avatar().await.unwrap(),
        StepOutcome::Rejected(Rejection::Avatar(SetAvatarStatus::Failure))
    );
    assert_eq!(count_batches(&server, RequestKind::MarkTutorialComplete), 0);
    assert_eq!(session.inventories().await.last_timestamp_ms(), 1);
}

#[tokio::test]
async fn test_setup_avatar_already_set_marks_milestone() {
    let server = Arc::new(MockServer::new());
    let existing = PlayerAvatar {
        gender: Gender::Female,
        hair: 5,
        ..Default::default()
    };
    server.update(|state| {
        state.player.avatar = existing;
        state.avatar_status = Some(SetAvatarStatus::AvatarAlreadySet);
    });
    let session = session(&server);
    session.fetch_profile().await.unwrap();

    assert_eq!(session.setup_avatar().await.unwrap(), StepOutcome::Completed);

    let profile = session.profile().await;
    assert_eq!(profile.avatar(), Some(&existing));
    assert!(profile.tutorial().is_complete(Milestone::AvatarSelection));
    assert_eq!(server.state().player.avatar, existing);
    assert_eq!(count_batches(&server, RequestKind::MarkTutorialComplete), 1);
}

#[tokio::test]
async fn test_setup_avatar_partial_sync_recovers_with_mark() {
    let server = Arc::new(MockServer::new());
    let session = session(&server);
    session.fetch_profile().await.unwrap();
    server.update(|state| {
        state
            .fail_calls
            .insert(3, DispatchError::Transport("reset".to_string()));
    });

    let err = session.setup_avatar().await.unwrap_err();
    assert!(matches!(
        err,
        Error::PartialSync {
            action: CommittedAction::AvatarSelection,
            ..
        }
    ));
    let profile = session.profile().await;
    assert_eq!(profile.avatar(), Some(&server.state().player.avatar));
    assert!(!profile.tutorial().is_complete(Milestone::AvatarSelection));

    assert_eq!(
        session
            .mark_milestone(Milestone::AvatarSelection)
            .await
            .unwrap(),
        StepOutcome::Completed
    );
    assert_eq!(
        session.setup_avatar().await.unwrap(),
        StepOutcome::AlreadyComplete
    );
    assert_eq!(count_batches(&server, RequestKind::SetAvatar), 1);
}

#[tokio::test]
async fn test_bootstrap_resumes_after_avatar_partial_sync() {
    let server = Arc::new(MockServer::new());
    let session = session(&server);
    session.fetch_profile().await.unwrap();
    session.activate_account().await.unwrap();
    server.update(|state| {
        state
            .fail_calls
            .insert(4, DispatchError::Transport("reset".to_string()));
    });
    assert!(matches!(
        session.setup_avatar().await,
        Err(Error::PartialSync {
            action: CommittedAction::AvatarSelection,
            ..
        })
    ));
    let committed = server.state().player.avatar;

    // The server now refuses a second avatar.
    server.update(|state| state.avatar_status = Some(SetAvatarStatus::AvatarAlreadySet));
    let report = session.bootstrap().await.unwrap();
    assert!(report.is_complete());
    assert_eq!(
        report.steps[1],
        (Milestone::AvatarSelection, StepOutcome::Completed)
    );
    let profile = session.profile().await;
    assert!(profile.tutorial().is_bootstrapped());
    assert_eq!(profile.avatar(), Some(&committed));
}

#[tokio::test]
async fn test_starter_encounter() {
    let server = Arc::new(MockServer::new());
    let session = session(&server).with_listener(Arc::new(Scripted {
        avatar: None,
        starter: Some(StarterSpecies::Squirtle),
        names: Vec::new(),
    }));
    session.fetch_profile().await.unwrap();

    assert_eq!(
        session.complete_starter_encounter().await.unwrap(),
        StepOutcome::Completed
    );
    assert!(session
        .profile()
        .await
        .tutorial()
        .is_complete(Milestone::PokemonCapture));
    assert_eq!(server.state().stats.pokemons_captured, 1);
    assert_eq!(count_batches(&server, RequestKind::GetPlayer), 2);
    assert_eq!(
        session.complete_starter_encounter().await.unwrap(),
        StepOutcome::AlreadyComplete
    );
}

#[tokio::test]
async fn test_starter_encounter_rejected() {
    let server = Arc::new(MockServer::new());
    server.update(|state| state.encounter_result = Some(EncounterResult::InvalidPokemon));
    let session = session(&server);
    session.fetch_profile().await.unwrap();

    assert_eq!(
        session.complete_starter_encounter().await.unwrap(),
        StepOutcome::Rejected(Rejection::Encounter(EncounterResult::InvalidPokemon))
    );
    assert_eq!(count_batches(&server, RequestKind::GetPlayer), 1);
}

#[tokio::test]
async fn test_starter_partial_sync_recovers_with_resync() {
    let server = Arc::new(MockServer::new());
    let session = session(&server);
    session.fetch_profile().await.unwrap();
    server.update(|state| {
        state
            .fail_calls
            .insert(3, DispatchError::Transport("timeout".to_string()));
    });

    let err = session.complete_starter_encounter().await.unwrap_err();
    assert!(matches!(
        err,
        Error::PartialSync {
            action: CommittedAction::StarterEncounter,
            ..
        }
    ));
    assert!(!session
        .profile()
        .await
        .tutorial()
        .is_complete(Milestone::PokemonCapture));

    session.resync().await.unwrap();
    assert!(session
        .profile()
        .await
        .tutorial()
        .is_complete(Milestone::PokemonCapture));
    assert_eq!(
        session.complete_starter_encounter().await.unwrap(),
        StepOutcome::AlreadyComplete
    );
    assert_eq!(server.state().captured, 1);
}

#[tokio::test]
async fn test_claim_codename_retries_with_last_failure() {
    let server = Arc::new(MockServer::new());
    server.update(|state| {
        state.taken_codenames.insert("Gary".to_string());
    });
    let session = session(&server).with_listener(Arc::new(Scripted {
        avatar: None,
        starter: None,
        names: vec!["Gary", "GaryOak"],
    }));
    session.fetch_profile().await.unwrap();

    let claim = session.claim_codename(None).await.unwrap();
    assert_eq!(
        claim,
        CodenameClaim::Claimed {
            codename: "GaryOak".to_string()
        }
    );
    assert_eq!(count_batches(&server, RequestKind::ClaimCodename), 2);

    let profile = session.profile().await;
    assert_eq!(profile.username(), Some("GaryOak"));
    assert!(profile.tutorial().is_complete(Milestone::NameSelection));
    assert_eq!(profile.player_data().unwrap().remaining_codename_claims, 1);
}

#[tokio::test]
async fn test_claim_codename_random() {
    let server = Arc::new(MockServer::new());
    let session = session(&server);
    session.fetch_profile().await.unwrap();

    let CodenameClaim::Claimed { codename } = session.claim_codename(None).await.unwrap() else {
        panic!("expected a claimed codename");
    };
    assert!(CODENAME_LENGTH.contains(&codename.len()));
    assert!(codename.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(session.profile().await.username(), Some(codename.as_str()));
}

#[tokio::test]
async fn test_claim_codename_exhausted_claims() {
    let server = Arc::new(MockServer::new());
    server.update(|state| {
        state.player.remaining_codename_claims = 1;
        state.taken_codenames.insert("Gary".to_string());
    });
    let session = session(&server).with_listener(Arc::new(Stubborn("Gary")));
    session.fetch_profile().await.unwrap();

    assert_eq!(
        session.claim_codename(None).await.unwrap(),
        CodenameClaim::Exhausted {
            status: CodenameStatus::NotAvailable,
            last_attempt: "Gary".to_string(),
        }
    );
    assert_eq!(count_batches(&server, RequestKind::ClaimCodename), 1);
    assert!(!session
        .profile()
        .await
        .tutorial()
        .is_complete(Milestone::NameSelection));
}

#[tokio::test]
async fn test_claim_codename_attempt_cap() {
    let server = Arc::new(MockServer::new());
    server.update(|state| {
        state.unlimited_claims = true;
        state.taken_codenames.insert("Gary".to_string());
    });
    let config = ValidatedConfig {
        max_codename_attempts: 3,
        ..Default::default()
    };
    let session = session_with(&server, config).with_listener(Arc::new(Stubborn("Gary")));
    session.fetch_profile().await.unwrap();

    let err = session.claim_codename(None).await.unwrap_err();
    assert!(matches!(
        err,
        Error::CodenameExhausted { attempts: 3, ref last_attempt } if last_attempt == "Gary"
    ));
    assert_eq!(count_batches(&server, RequestKind::ClaimCodename), 3);
}

#[tokio::test]
async fn test_claim_codename_partial_sync() {
    let server = Arc::new(MockServer::new());
    let session = session(&server).with_listener(Arc::new(Stubborn("Misty")));
    session.fetch_profile().await.unwrap();
    server.update(|state| {
        state
            .fail_calls
            .insert(3, DispatchError::Transport("reset".to_string()));
    });

    let err = session.claim_codename(None).await.unwrap_err();
    assert!(matches!(
        err,
        Error::PartialSync {
            action: CommittedAction::ClaimCodename,
            ..
        }
    ));
    assert_eq!(server.state().player.username, "Misty");
    assert_eq!(session.profile().await.username(), Some("Misty"));

    assert_eq!(
        session
            .mark_milestone(Milestone::NameSelection)
            .await
            .unwrap(),
        StepOutcome::Completed
    );
    session.resync().await.unwrap();
    assert!(session
        .profile()
        .await
        .tutorial()
        .is_complete(Milestone::NameSelection));
}

#[tokio::test]
async fn test_level_rewards_not_yet_unlocked() {
    let server = Arc::new(MockServer::new());
    let session = session(&server);
    session.fetch_profile().await.unwrap();

    assert_eq!(
        session.accept_level_rewards(1).await.unwrap(),
        LevelRewards::NotYetUnlocked
    );
    assert_eq!(count_batches(&server, RequestKind::LevelUpRewards), 0);
    assert_eq!(session.inventories().await, Inventories::default());
}

#[tokio::test]
async fn test_level_rewards_increment_inventory() {
    let server = Arc::new(MockServer::new());
    let awards = vec![ItemCount::new(ItemId(1), 3), ItemCount::new(ItemId(2), 1)];
    server.update(|state| {
        state.stats = PlayerStats {
            level: 5,
            ..Default::default()
        };
        state.level_rewards.insert(5, awards.clone());
    });
    let session = session(&server);
    session.resync().await.unwrap();
    assert_eq!(session.profile().await.current_level(), 5);

    let rewards = session.accept_level_rewards(5).await.unwrap();
    assert!(matches!(
        rewards,
        LevelRewards::Accepted { ref items_awarded, .. } if *items_awarded == awards
    ));
    let inventories = session.inventories().await;
    assert_eq!(inventories.count(ItemId(1)), 23);
    assert_eq!(inventories.count(ItemId(2)), 1);

    assert_eq!(
        session.accept_level_rewards(6).await.unwrap(),
        LevelRewards::NotYetUnlocked
    );
}

#[tokio::test]
async fn test_sync_awarded_badges() {
    let server = Arc::new(MockServer::new());
    let first = AwardedBadge {
        badge_type: BadgeType(3),
        level: 1,
    };
    let refused = AwardedBadge {
        badge_type: BadgeType(9),
        level: 2,
    };
    let last = AwardedBadge {
        badge_type: BadgeType(4),
        level: 3,
    };
    server.update(|state| {
        state.awarded_badges = vec![first, refused, last];
        state.refused_badges.insert(BadgeType(9));
    });
    let session = session(&server);

    let sync = session.sync_awarded_badges().await.unwrap();
    assert_eq!(sync.awarded, vec![first, refused, last]);
    assert_eq!(sync.refused, vec![(refused, EquipBadgeResult::NotQualified)]);
    let equipped = sync.equipped.unwrap();
    assert_eq!(equipped.badge_type, BadgeType(4));
    assert_eq!(session.profile().await.equipped_badge(), Some(&equipped));
    assert_eq!(count_batches(&server, RequestKind::EquipBadge), 3);
}

#[tokio::test]
async fn test_bootstrap_fresh_account() {
    let server = Arc::new(MockServer::new());
    let session = session(&server);

    let report = session.bootstrap().await.unwrap();
    assert!(report.is_complete());
    assert_eq!(
        report
            .steps
            .iter()
            .map(|(milestone, _)| *milestone)
            .collect::<Vec<_>>(),
        Milestone::BOOTSTRAP_ORDER.to_vec()
    );
    assert!(report
        .steps
        .iter()
        .all(|(_, outcome)| *outcome == StepOutcome::Completed));
    assert!(matches!(report.codename, Some(CodenameClaim::Claimed { .. })));
    assert!(session.profile().await.tutorial().is_bootstrapped());

    let batches = server.batches().len();
    let again = session.bootstrap().await.unwrap();
    assert!(again
        .steps
        .iter()
        .all(|(_, outcome)| *outcome == StepOutcome::AlreadyComplete));
    assert_eq!(again.codename, None);
    assert_eq!(server.batches().len(), batches);
}

#[tokio::test]
async fn test_bootstrap_stops_at_rejection() {
    let server = Arc::new(MockServer::new());
    server.update(|state| state.avatar_status = Some(SetAvatarStatus::Failure));
    let session = session(&server);

    let report = session.bootstrap().await.unwrap();
    assert!(!report.is_complete());
    assert_eq!(
        report.steps,
        vec![
            (Milestone::LegalScreen, StepOutcome::Completed),
            (
                Milestone::AvatarSelection,
                StepOutcome::Rejected(Rejection::Avatar(SetAvatarStatus::Failure))
            ),
        ]
    );
    assert_eq!(count_batches(&server, RequestKind::ClaimCodename), 0);
}

#[tokio::test]
async fn test_dispatcher_appended_requests_are_ignored() {
    let server = Arc::new(MockServer::new());
    server.update(|state| state.inject_challenge = true);
    let session = session(&server);

    let report = session.bootstrap().await.unwrap();
    assert!(report.is_complete());
    assert!(server
        .batches()
        .iter()
        .all(|batch| batch.last() == Some(&RequestKind::CheckChallenge)));
}

struct TestContext {
    server: Arc<MockServer>,
    base_url: String,
    server_handle: tokio::task::JoinHandle<()>,
}

async fn rpc(
    State(server): State<Arc<MockServer>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(token) = server.auth_token() {
        let expected = format!("Bearer {token}");
        let provided = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        if provided != Some(expected.as_str()) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }
    let Ok(envelope) = RequestEnvelope::decode(body.as_ref()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    match server.handle(envelope.requests) {
        Ok(payloads) => (
            StatusCode::OK,
            ResponseEnvelope::from(payloads).encode().to_vec(),
        )
            .into_response(),
        Err(DispatchError::Auth(_)) => StatusCode::FORBIDDEN.into_response(),
        Err(_) => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

impl TestContext {
    async fn new(state: ServerState) -> Self {
        let server = Arc::new(MockServer::with_state(state));
        let router = Router::new()
            .route("/rpc", post(rpc))
            .with_state(server.clone());

        // Start server on random port
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
        let actual_addr = listener.local_addr().unwrap();
        let base_url = format!("http://{actual_addr}");

        let server_handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        // Give server time to start
        sleep(Duration::from_millis(100)).await;

        Self {
            server,
            base_url,
            server_handle,
        }
    }

    fn create_dispatcher(&self) -> HttpDispatcher {
        HttpDispatcher::new(&self.base_url).unwrap()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

#[tokio::test]
async fn test_http_bootstrap() {
    let ctx = TestContext::new(ServerState {
        auth_token: Some("secret".to_string()),
        ..Default::default()
    })
    .await;
    let dispatcher = ctx.create_dispatcher().with_auth_token("secret");
    let session = Session::new(dispatcher, ValidatedConfig::default());

    let report = session.bootstrap().await.unwrap();
    assert!(report.is_complete());
    assert!(session.profile().await.tutorial().is_bootstrapped());
    assert_eq!(
        session.profile().await.username(),
        Some(ctx.server.state().player.username.as_str())
    );
}

#[tokio::test]
async fn test_http_rejected_token() {
    let ctx = TestContext::new(ServerState {
        auth_token: Some("secret".to_string()),
        ..Default::default()
    })
    .await;
    let session = Session::new(
        ctx.create_dispatcher().with_auth_token("wrong"),
        ValidatedConfig::default(),
    );

    assert!(matches!(
        session.fetch_profile().await,
        Err(Error::Session(_))
    ));
    assert!(ctx.server.batches().is_empty());
}

#[tokio::test]
async fn test_http_retries_unavailable() {
    let mut state = ServerState::default();
    state
        .fail_calls
        .insert(1, DispatchError::Transport("overloaded".to_string()));
    let ctx = TestContext::new(state).await;

    let session = Session::new(ctx.create_dispatcher(), ValidatedConfig::default());
    assert!(matches!(
        session.fetch_profile().await,
        Err(Error::Dispatch(DispatchError::Transport(_)))
    ));

    ctx.server.update(|state| {
        state
            .fail_calls
            .insert(2, DispatchError::Transport("overloaded".to_string()));
    });
    let dispatcher = ctx.create_dispatcher().with_retry_policy(RetryPolicy {
        max_attempts: 2,
        initial_backoff: Duration::ZERO,
        max_backoff: Duration::ZERO,
        retry_non_idempotent: false,
    });
    let session = Session::new(dispatcher, ValidatedConfig::default());
    session.fetch_profile().await.unwrap();
    assert_eq!(ctx.server.state().calls, 3);
}

#[tokio::test]
async fn test_http_committing_batch_retried_only_when_allowed() {
    let ctx = TestContext::new(ServerState::default()).await;
    let policy = RetryPolicy {
        max_attempts: 2,
        initial_backoff: Duration::ZERO,
        max_backoff: Duration::ZERO,
        retry_non_idempotent: false,
    };
    let session = Session::new(
        ctx.create_dispatcher().with_retry_policy(policy),
        ValidatedConfig::default(),
    );
    session.fetch_profile().await.unwrap();

    ctx.server.update(|state| {
        state
            .fail_calls
            .insert(2, DispatchError::Transport("overloaded".to_string()));
    });
    assert!(matches!(
        session.setup_avatar().await,
        Err(Error::Dispatch(DispatchError::Transport(_)))
    ));
    assert_eq!(ctx.server.state().calls, 2);

    let session = Session::new(
        ctx.create_dispatcher().with_retry_policy(RetryPolicy {
            retry_non_idempotent: true,
            ..policy
        }),
        ValidatedConfig::default(),
    );
    session.fetch_profile().await.unwrap();
    ctx.server.update(|state| {
        state
            .fail_calls
            .insert(4, DispatchError::Transport("overloaded".to_string()));
    });
    assert_eq!(session.setup_avatar().await.unwrap(), StepOutcome::Completed);
    assert_eq!(count_batches(&ctx.server, RequestKind::SetAvatar), 3);
}
