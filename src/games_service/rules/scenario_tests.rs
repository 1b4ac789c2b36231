use super::actions::GameAction;
use super::test_support::*;
use super::{apply, CITY_COST};
use crate::games_service::buildings::BuildingKind;
use crate::games_service::dev_cards::{DevCard, DevCardKind};
use crate::games_service::game::game_enums::{GamePhase, GameStatus, TurnPhase};
use crate::games_service::game::resources::{Resource, ResourceCount};
use crate::games_service::hex::{Corner, HexKey};

//  longer flows stitched from the same entry point the actor uses

//  a monopoly funds a city upgrade that ends the game on the spot
#[test]
fn test_winner_via_monopoly_funded_city() {
    let mut state = playing_state();
    state.turn_phase = TurnPhase::Main;

    //  a sits at nine public points with a settlement ready to upgrade
    let v = HexKey::new(1, 0).vertex(Corner::North);
    place_building_raw(&mut state, "a", v, BuildingKind::Settlement);
    state.player_mut("a").unwrap().public_victory_points = 9;
    state
        .player_mut("a")
        .unwrap()
        .dev_cards
        .push(DevCard::new("mono", DevCardKind::Monopoly, 1));
    state.dev_card_deck_count -= 1;
    give(&mut state, "a", ResourceCount::single(Resource::Grain, 2));
    give(&mut state, "b", ResourceCount::single(Resource::Ore, 4));

    let (state, _) = apply(
        &state,
        "a",
        &GameAction::PlayMonopoly {
            resource: Resource::Ore,
        },
        &mut ctx(1),
    )
    .unwrap();
    assert_eq!(state.player("a").unwrap().resources.ore, 4);
    assert!(state.winner_id.is_none(), "nine points is not a win");
    assert!(state.player("a").unwrap().resources.contains(&CITY_COST));

    let (state, events) = apply(
        &state,
        "a",
        &GameAction::BuildCity { vertex_id: v.id() },
        &mut ctx(1),
    )
    .unwrap();
    assert_eq!(state.winner_id.as_deref(), Some("a"));
    assert_eq!(state.status, GameStatus::Finished);
    assert_eq!(state.phase, GamePhase::Finished);
    assert!(state.finished_at.is_some());
    use crate::games_service::game_container::game_messages::GameEvent;
    assert!(events
        .iter()
        .any(|e| matches!(&e.event, GameEvent::GameEnded { winner_id } if winner_id == "a")));

    //  the table is closed
    let err = apply(&state, "b", &GameAction::RollDice, &mut ctx(1)).unwrap_err();
    assert_eq!(err.kind, crate::shared::shared_models::GameError::WrongPhase);
}

//  turns rotate through the order and the round counter follows the wrap
#[test]
fn test_end_turn_rotation_and_round_counter() {
    let mut state = playing_state();
    state.turn_phase = TurnPhase::Main;
    state.last_dice_roll = Some((3, 3));
    assert_eq!(state.turn_number, 2);

    let (state, _) = apply(&state, "a", &GameAction::EndTurn, &mut ctx(1)).unwrap();
    assert!(state.is_current_player("b"));
    assert_eq!(state.turn_number, 2, "no wrap yet");
    assert_eq!(state.turn_phase, TurnPhase::PreRoll);
    assert_eq!(state.last_dice_roll, None);

    let mut state = state;
    state.turn_phase = TurnPhase::Main;
    let (state, _) = apply(&state, "b", &GameAction::EndTurn, &mut ctx(1)).unwrap();
    assert!(state.is_current_player("a"));
    assert_eq!(state.turn_number, 3, "wrapped back to the first seat");
}

//  ending a turn also kills the proposer's dangling trade
#[test]
fn test_end_turn_clears_active_trade() {
    let mut state = playing_state();
    state.turn_phase = TurnPhase::Main;
    give(&mut state, "a", ResourceCount::single(Resource::Brick, 1));

    let (state, _) = apply(
        &state,
        "a",
        &GameAction::ProposeTrade {
            offering: ResourceCount::single(Resource::Brick, 1),
            requesting: ResourceCount::single(Resource::Wool, 1),
            target_id: None,
        },
        &mut ctx(1),
    )
    .unwrap();
    assert!(state.active_trade.is_some());

    let (state, events) = apply(&state, "a", &GameAction::EndTurn, &mut ctx(1)).unwrap();
    assert!(state.active_trade.is_none());
    use crate::games_service::game_container::game_messages::GameEvent;
    assert!(events
        .iter()
        .any(|e| matches!(e.event, GameEvent::TradeCancelled { .. })));
}

//  a fresh game walks the whole pre-game pipeline under engine control
#[test]
fn test_game_reaches_playing_through_rolls_and_setup() {
    let mut ctx = ctx(123);
    let mut state = crate::games_service::game::game_state::GameState::new(
        "FLOWAA",
        two_players(),
        test_board(),
        25,
    );
    assert_eq!(state.phase, GamePhase::RollForOrder);

    for player in ["a", "b"] {
        let (next, _) = apply(&state, player, &GameAction::RollForOrder, &mut ctx).unwrap();
        state = next;
    }
    assert_eq!(state.phase, GamePhase::SetupFirst);
    let order = state.turn_order.clone();
    assert_eq!(order.len(), 2);

    //  four placement pairs: forward round then reverse round
    let spots = [
        HexKey::new(-1, 0).vertex(Corner::North),
        HexKey::new(1, -1).vertex(Corner::North),
        HexKey::new(1, 0).vertex(Corner::South),
        HexKey::new(-1, 1).vertex(Corner::South),
    ];
    let placers = [
        order[0].clone(),
        order[1].clone(),
        order[1].clone(),
        order[0].clone(),
    ];
    for (vertex, placer) in spots.iter().zip(&placers) {
        let (next, _) = apply(
            &state,
            placer,
            &GameAction::BuildSettlement {
                vertex_id: vertex.id(),
            },
            &mut ctx,
        )
        .unwrap();
        let (next, _) = apply(
            &next,
            placer,
            &GameAction::BuildRoad {
                edge_id: vertex.incident_edges()[0].id(),
            },
            &mut ctx,
        )
        .unwrap();
        state = next;
        assert_invariants(&state);
    }

    assert_eq!(state.phase, GamePhase::Playing);
    assert_eq!(state.status, GameStatus::Playing);
    assert!(state.is_current_player(&order[0]));
    assert_eq!(state.turn_phase, TurnPhase::PreRoll);
    //  both second settlements paid out their starting hands
    for player in &state.players {
        assert!(player.resources.total() >= 2);
    }
}
