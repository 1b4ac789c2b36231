use super::{achievements, building, push_phase_changed, push_resources_updated, GameContext};
use crate::games_service::game::game_enums::{GamePhase, GameStatus, SetupPiece, TurnPhase};
use crate::games_service::game::game_state::{GameState, SetupState};
use crate::games_service::game_container::game_messages::{EngineEvent, GameEvent};
use crate::shared::shared_models::ServiceError;
use rand::Rng;

/**
 *  pre-game sequencing: one opening roll per seat decides turn order, then
 *  two placement rounds -- forward, then the same players in reverse.  the
 *  second settlement pays out one card per adjacent producing tile.
 */

pub fn roll_for_order(
    state: &mut GameState,
    player_id: &str,
    ctx: &mut GameContext,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    let dice: (u8, u8) = (ctx.rng.gen_range(1..=6), ctx.rng.gen_range(1..=6));
    let total = dice.0 + dice.1;
    state.roll_for_order_state.insert(player_id.to_owned(), total);
    events.push(EngineEvent::all(GameEvent::RollForOrderResult {
        player_id: player_id.to_owned(),
        dice,
        total,
    }));

    if state.roll_for_order_state.len() < state.players.len() {
        return Ok(());
    }

    //  all seats have rolled: descending totals, seating breaks ties (the
    //  sort is stable over the seating-ordered player list)
    let mut order: Vec<String> = state.players.iter().map(|p| p.id.clone()).collect();
    order.sort_by(|a, b| {
        let ta = state.roll_for_order_state.get(a).copied().unwrap_or(0);
        let tb = state.roll_for_order_state.get(b).copied().unwrap_or(0);
        tb.cmp(&ta)
    });
    state.turn_order = order;
    state.phase = GamePhase::SetupFirst;
    state.setup_state = Some(SetupState {
        index: 0,
        expecting: SetupPiece::Settlement,
        last_settlement: None,
    });

    log::info!(
        "game {}: turn order decided: {:?}",
        state.code,
        state.turn_order
    );
    push_phase_changed(state, events);
    events.push(EngineEvent::all(GameEvent::TurnChanged {
        current_player_id: state.turn_order[0].clone(),
        turn_number: state.turn_number,
    }));
    Ok(())
}

/// Settlement placement during either setup round: free, no connectivity,
/// distance rule still applies.
pub fn place_setup_settlement(
    state: &mut GameState,
    player_id: &str,
    vertex_id: &str,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    let vertex = building::check_settlement_site(state, vertex_id)?;

    building::put_settlement(state, player_id, vertex, events);

    //  the second-round settlement earns its initial production
    if state.phase == GamePhase::SetupSecond {
        let payout: Vec<_> = state
            .board
            .land_tiles_at(&vertex)
            .iter()
            .filter_map(|t| t.terrain.produces())
            .collect();
        for resource in payout {
            if state.bank.remove(resource, 1) {
                state.player_mut(player_id)?.resources.add(resource, 1);
            }
        }
        push_resources_updated(state, player_id, events);
    }

    let setup = state
        .setup_state
        .as_mut()
        .ok_or_else(|| ServiceError::internal("setup phase without setup state"))?;
    setup.expecting = SetupPiece::Road;
    setup.last_settlement = Some(vertex);
    Ok(())
}

/// Road placement during setup: free, but it must touch the settlement this
/// player just placed.
pub fn place_setup_road(
    state: &mut GameState,
    player_id: &str,
    edge_id: &str,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    let setup = state
        .setup_state
        .as_ref()
        .ok_or_else(|| ServiceError::internal("setup phase without setup state"))?;
    let anchor = setup
        .last_settlement
        .ok_or_else(|| ServiceError::internal("setup road without a settlement"))?;

    let edge = building::check_road_site(state, edge_id)?;
    if !edge.touches(&anchor) {
        return Err(ServiceError::illegal_placement(
            "the setup road must touch the settlement you just placed",
        ));
    }

    building::put_road(state, player_id, edge, events);
    achievements::recompute_longest_road(state, events);

    advance_setup(state, events);
    Ok(())
}

fn advance_setup(state: &mut GameState, events: &mut Vec<EngineEvent>) {
    let player_count = state.turn_order.len();
    let setup = state.setup_state.as_mut().expect("checked by caller");
    setup.index += 1;
    setup.expecting = SetupPiece::Settlement;
    setup.last_settlement = None;

    if setup.index < player_count {
        let next_id = state.current_player_id().unwrap_or_default().to_owned();
        events.push(EngineEvent::all(GameEvent::TurnChanged {
            current_player_id: next_id,
            turn_number: state.turn_number,
        }));
        return;
    }

    match state.phase {
        GamePhase::SetupFirst => {
            //  same players again, reverse order
            setup.index = 0;
            state.phase = GamePhase::SetupSecond;
            push_phase_changed(state, events);
            let next_id = state.current_player_id().unwrap_or_default().to_owned();
            events.push(EngineEvent::all(GameEvent::TurnChanged {
                current_player_id: next_id,
                turn_number: state.turn_number,
            }));
        }
        GamePhase::SetupSecond => {
            state.setup_state = None;
            state.phase = GamePhase::Playing;
            state.status = GameStatus::Playing;
            state.current_player_index = 0;
            state.turn_number = 1;
            state.turn_phase = TurnPhase::PreRoll;
            log::info!("game {}: setup complete, play begins", state.code);
            push_phase_changed(state, events);
            events.push(EngineEvent::all(GameEvent::TurnChanged {
                current_player_id: state.turn_order[0].clone(),
                turn_number: 1,
            }));
        }
        _ => {}
    }
}
