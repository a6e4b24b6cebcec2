use super::*;
use commonware_codec::{DecodeExt, Encode, ReadExt};

fn sample_player() -> PlayerData {
    PlayerData {
        creation_timestamp_ms: 1_468_000_000_000,
        username: "AshKetchum42".to_string(),
        team: 0,
        tutorial_state: vec![Milestone::LegalScreen, Milestone::AvatarSelection],
        avatar: PlayerAvatar {
            gender: Gender::Female,
            skin: 2,
            hair: 3,
            shirt: 8,
            pants: 5,
            hat: 1,
            shoes: 6,
            eyes: 4,
            backpack: 2,
        },
        max_pokemon_storage: 250,
        max_item_storage: 350,
        daily_bonus: DailyBonus {
            next_collect_timestamp_ms: 10,
            next_defender_bonus_collect_timestamp_ms: 20,
        },
        contact_settings: ContactSettings::default(),
        currencies: vec![
            CurrencyBalance::new("STARDUST", 500),
            CurrencyBalance::new("POKECOIN", 10),
        ],
        remaining_codename_claims: 3,
    }
}

#[test]
fn test_player_data_roundtrip() {
    let player = sample_player();
    let encoded = player.encode();
    let decoded = PlayerData::read(&mut &encoded[..]).unwrap();
    assert_eq!(player, decoded);
}

#[test]
fn test_request_kind_matches_tag() {
    let requests = [
        Request::GetPlayer {
            locale: PlayerLocale::default(),
        },
        Request::ClaimCodename {
            codename: "Misty".to_string(),
        },
        Request::MarkTutorialComplete {
            milestones: vec![Milestone::NameSelection],
            send_marketing_emails: false,
            send_push_notifications: false,
        },
        Request::EquipBadge {
            badge: AwardedBadge {
                badge_type: BadgeType(12),
                level: 2,
            },
        },
    ];
    for request in requests {
        let encoded = request.encode();
        assert_eq!(encoded[0], request.kind() as u8);
        let decoded = Request::decode(&encoded[..]).unwrap();
        assert_eq!(request, decoded);
    }
}

#[test]
fn test_committing_kinds_are_not_idempotent() {
    for kind in [
        RequestKind::GetPlayer,
        RequestKind::GetInventory,
        RequestKind::DownloadSettings,
        RequestKind::MarkTutorialComplete,
    ] {
        assert!(kind.is_idempotent(), "{kind:?}");
    }
    for kind in [
        RequestKind::SetAvatar,
        RequestKind::EncounterTutorialComplete,
        RequestKind::ClaimCodename,
        RequestKind::LevelUpRewards,
        RequestKind::EquipBadge,
    ] {
        assert!(!kind.is_idempotent(), "{kind:?}");
    }
}

#[test]
fn test_response_frame_roundtrip() {
    let response = GetPlayerResponse {
        success: true,
        player_data: sample_player(),
    };
    let payload = encode_response(&response);
    assert_eq!(payload[0], RequestKind::GetPlayer as u8);
    let decoded: GetPlayerResponse = decode_response(&payload).unwrap();
    assert_eq!(decoded, response);
}

#[test]
fn test_decode_rejects_wrong_kind() {
    let payload = encode_response(&GetInventoryResponse::default());
    let err = decode_response::<DownloadSettingsResponse>(&payload).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::UnexpectedKind {
            expected: RequestKind::DownloadSettings,
            got: 1
        }
    ));
}

#[test]
fn test_decode_rejects_truncated_payload() {
    let payload = encode_response(&MarkTutorialCompleteResponse {
        success: true,
        player_data: sample_player(),
    });
    let truncated = &payload[..payload.len() - 3];
    let err = decode_response::<MarkTutorialCompleteResponse>(truncated).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Malformed {
            kind: RequestKind::MarkTutorialComplete,
            ..
        }
    ));

    assert!(matches!(
        decode_response::<GetPlayerResponse>(&[]),
        Err(DecodeError::Malformed { .. })
    ));
}

#[test]
fn test_decode_rejects_trailing_bytes() {
    let mut payload = encode_response(&CheckChallengeResponse::default());
    payload.push(0xFF);
    assert!(decode_response::<CheckChallengeResponse>(&payload).is_err());
}

#[test]
fn test_unknown_status_is_rejected() {
    let mut payload = encode_response(&EquipBadgeResponse::default());
    payload[1] = 42;
    assert!(matches!(
        decode_response::<EquipBadgeResponse>(&payload),
        Err(DecodeError::Malformed { .. })
    ));
}

#[test]
fn test_envelopes_preserve_order() {
    let envelope = RequestEnvelope {
        requests: vec![
            Request::GetHatchedEggs,
            Request::GetInventory {
                last_timestamp_ms: 7,
            },
            Request::CheckAwardedBadges,
        ],
    };
    let decoded = RequestEnvelope::decode(envelope.encode()).unwrap();
    let kinds: Vec<_> = decoded.requests.iter().map(Request::kind).collect();
    assert_eq!(
        kinds,
        vec![
            RequestKind::GetHatchedEggs,
            RequestKind::GetInventory,
            RequestKind::CheckAwardedBadges
        ]
    );

    let responses = ResponseEnvelope::from(vec![vec![1, 2], vec![], vec![3]]);
    let decoded = ResponseEnvelope::decode(responses.encode()).unwrap();
    assert_eq!(decoded.into_payloads(), vec![vec![1, 2], vec![], vec![3]]);
}

#[test]
fn test_empty_request_envelope_is_rejected() {
    let envelope = RequestEnvelope::default();
    assert!(RequestEnvelope::decode(envelope.encode()).is_err());
}

#[test]
fn test_avatar_catalog_wardrobe() {
    let catalog = AvatarCatalog::default();
    assert_eq!(catalog.wardrobe(Gender::Male).shirts, 4);
    assert_eq!(catalog.wardrobe(Gender::Female).shirts, 9);
}
