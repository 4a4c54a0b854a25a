//! Integration tests for the Hexclaim engine.
//!
//! These tests drive complete levels through the public API only.

use hexclaim_core::*;
use pretty_assertions::assert_eq;

fn quiet_config(seed: u64) -> EngineConfig {
    EngineConfig {
        seed: Some(seed),
        powerups: false,
        ..Default::default()
    }
}

/// A tiny open level with a naive enemy and an unreachable coverage goal
fn corridor_catalog() -> LevelCatalog {
    LevelCatalog::new(vec![LevelDefinition {
        size: 2,
        player_start: HexCoord::new(-2, 0),
        enemy_start: HexCoord::new(2, 0),
        rocks: vec![],
        win_threshold: 0.9,
        agent_strength: 0,
    }])
    .unwrap()
}

/// First neighbor the engine accepts for the player, if any
fn first_legal_move(game: &mut GameEngine) -> Option<Vec<GameEvent>> {
    let from = game.player_pos();
    for target in game.board().walkable_neighbors(&from) {
        if let Ok(events) = game.move_player(target) {
            return Some(events);
        }
    }
    None
}

fn check_invariants(game: &GameEngine) {
    let counts = game.counts();
    assert_eq!(counts.total, game.board().len());
    assert_eq!(counts.player + counts.enemy + counts.neutral, counts.total);
    assert!(game.player_pos().is_adjacent(&game.prev_player_pos())
        || game.player_pos() == game.prev_player_pos());
    assert!(game.enemy_pos().is_adjacent(&game.prev_enemy_pos())
        || game.enemy_pos() == game.prev_enemy_pos());
    for cell in game.board().cells() {
        assert!(cell.coord.within(game.level().size));
    }
}

#[test]
fn test_first_move_claims_cell_and_hands_over() {
    let mut game = GameEngine::new(LevelCatalog::builtin(), quiet_config(7)).unwrap();
    assert_eq!(game.board().len(), 61);

    let events = game.move_player(HexCoord::new(-2, 0)).unwrap();
    assert_eq!(game.phase(), TurnPhase::EnemyTurn);
    assert_eq!(
        game.board().owner_at(&HexCoord::new(-2, 0)),
        Some(Owner::Player)
    );
    assert_eq!(
        events[0].kind,
        EventKind::MoveAccepted {
            side: Side::Player,
            from: HexCoord::new(-3, 0),
            to: HexCoord::new(-2, 0),
        }
    );

    let enemy_events = game.run_enemy_turns();
    assert_eq!(game.phase(), TurnPhase::PlayerTurn);
    assert!(!enemy_events.is_empty());
    assert_ne!(game.enemy_pos(), HexCoord::new(3, 0));
}

#[test]
fn test_rejections() {
    let mut game = GameEngine::new(corridor_catalog(), quiet_config(1)).unwrap();

    // Off the board to the west
    assert_eq!(
        game.move_player(HexCoord::new(-3, 0)),
        Err(MoveRejection::CellBlocked)
    );
    assert_eq!(
        game.move_player(HexCoord::new(0, 0)),
        Err(MoveRejection::NotAdjacent)
    );
    assert_eq!(game.move_enemy(), Err(MoveRejection::WrongTurn));
    assert_eq!(game.phase(), TurnPhase::PlayerTurn);

    game.move_player(HexCoord::new(-1, 0)).unwrap();
    assert_eq!(
        game.move_player(HexCoord::new(0, 0)),
        Err(MoveRejection::WrongTurn)
    );
}

#[test]
fn test_rock_blocks_movement() {
    let catalog = LevelCatalog::new(vec![LevelDefinition {
        size: 3,
        player_start: HexCoord::new(-3, 0),
        enemy_start: HexCoord::new(3, 0),
        rocks: vec![HexCoord::new(-2, 0)],
        win_threshold: 0.8,
        agent_strength: 0,
    }])
    .unwrap();
    let mut game = GameEngine::new(catalog, quiet_config(1)).unwrap();
    let before = game.snapshot();

    assert_eq!(
        game.move_player(HexCoord::new(-2, 0)),
        Err(MoveRejection::CellBlocked)
    );
    assert_eq!(game.snapshot(), before);
}

#[test]
fn test_walking_onto_enemy_base_wins() {
    let mut game = GameEngine::new(corridor_catalog(), quiet_config(3)).unwrap();
    let path = [
        HexCoord::new(-1, 0),
        HexCoord::new(0, 0),
        HexCoord::new(1, 0),
        HexCoord::new(2, 0),
    ];

    let mut last = Vec::new();
    for step in path {
        assert_eq!(game.phase(), TurnPhase::PlayerTurn);
        last = game.move_player(step).unwrap();
        game.run_enemy_turns();
    }

    assert_eq!(game.phase(), TurnPhase::Won);
    assert_eq!(game.outcome(), Some(Outcome::Won));
    assert_eq!(
        last.last().map(|e| e.kind.clone()),
        Some(EventKind::Won {
            reason: VictoryReason::BaseCaptured
        })
    );
    // Finished levels accept no further moves
    assert_eq!(
        game.move_player(HexCoord::new(1, 0)),
        Err(MoveRejection::WrongTurn)
    );
}

#[test]
fn test_simulated_games_keep_invariants() {
    for seed in 0..8 {
        let config = EngineConfig {
            seed: Some(seed),
            ..Default::default()
        };
        let mut game = GameEngine::new(LevelCatalog::builtin(), config).unwrap();
        let mut last_id = 0;

        for _ in 0..300 {
            if game.is_finished() {
                break;
            }
            let events = match game.phase() {
                TurnPhase::PlayerTurn => match first_legal_move(&mut game) {
                    Some(events) => events,
                    None => break,
                },
                _ => game.run_enemy_turns(),
            };
            for event in &events {
                assert!(event.id > last_id);
                last_id = event.id;
            }
            check_invariants(&game);
        }

        if game.is_finished() {
            assert!(game.outcome().is_some());
        }
    }
}

#[test]
fn test_level_progression_wraps() {
    let mut game = GameEngine::new(LevelCatalog::builtin(), quiet_config(11)).unwrap();

    let events = game.init_level(2).unwrap();
    assert_eq!(game.level_index(), 2);
    assert_eq!(game.board().len(), 127);
    assert_eq!(
        events[0].kind,
        EventKind::LevelStarted {
            level_index: 2,
            epoch: 2
        }
    );

    game.init_level(3).unwrap();
    assert_eq!(game.level_index(), 0);
    assert_eq!(game.epoch(), 3);
}

#[test]
fn test_stale_enemy_callback_is_dropped() {
    let mut game = GameEngine::new(LevelCatalog::builtin(), quiet_config(2)).unwrap();
    game.move_player(HexCoord::new(-2, 0)).unwrap();
    let scheduled_for = game.epoch();

    // Player restarts before the delayed enemy move fires
    game.init_level(0).unwrap();
    let fresh = game.snapshot();
    assert!(game.run_enemy_turns_for(scheduled_for).is_empty());
    assert_eq!(game.snapshot(), fresh);
}

#[test]
fn test_catalog_from_json() {
    let json = r#"[
        {
            "size": 3,
            "player_start": {"q": -3, "r": 0},
            "enemy_start": {"q": 3, "r": 0},
            "win_threshold": 0.5,
            "agent_strength": 40
        }
    ]"#;
    let catalog = LevelCatalog::from_json(json).unwrap();
    assert_eq!(catalog.len(), 1);
    assert!(catalog.get(0).rocks.is_empty());

    let game = GameEngine::new(catalog, quiet_config(0)).unwrap();
    assert_eq!(game.board().len(), 37);
}

#[test]
fn test_bad_level_tables_are_refused() {
    assert_eq!(LevelCatalog::new(vec![]), Err(LevelError::EmptyCatalog));
    assert!(matches!(
        LevelCatalog::from_json("not json"),
        Err(LevelError::Parse(_))
    ));

    let rock_outside = r#"[{
        "size": 2,
        "player_start": {"q": -2, "r": 0},
        "enemy_start": {"q": 2, "r": 0},
        "rocks": [{"q": 5, "r": 0}],
        "win_threshold": 0.5,
        "agent_strength": 0
    }]"#;
    assert_eq!(
        LevelCatalog::from_json(rock_outside),
        Err(LevelError::RockOutOfRange(HexCoord::new(5, 0)))
    );
}

#[test]
fn test_snapshot_serializes() {
    let game = GameEngine::new(LevelCatalog::builtin(), quiet_config(5)).unwrap();
    let json = serde_json::to_value(game.snapshot()).unwrap();

    assert_eq!(json["level_index"], 0);
    assert_eq!(json["turn"]["phase"], "PlayerTurn");
    assert_eq!(json["cells"].as_array().map(|c| c.len()), Some(61));
    assert_eq!(json["counts"]["player"], 1);
    assert_eq!(json["player_base"]["q"], -3);
}

#[test]
fn test_events_serialize_with_type_tag() {
    let mut game = GameEngine::new(LevelCatalog::builtin(), quiet_config(5)).unwrap();
    let events = game.move_player(HexCoord::new(-2, 0)).unwrap();
    let json = serde_json::to_value(&events[0]).unwrap();

    assert_eq!(json["type"], "MoveAccepted");
    assert_eq!(json["side"], "Player");
    assert_eq!(json["to"]["q"], -2);
    assert!(json["id"].as_u64().is_some());
}
