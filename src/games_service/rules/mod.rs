pub mod achievements;
pub mod actions;
pub mod building;
pub mod dev_card_plays;
pub mod production;
pub mod robber;
#[cfg(test)]
mod scenario_tests;
pub mod setup;
pub mod state_machine;
#[cfg(test)]
pub mod test_support;
pub mod trading;

use crate::games_service::dev_cards::DevCardDeck;
use crate::games_service::game::game_state::GameState;
use crate::games_service::game::resources::ResourceCount;
use crate::games_service::game::{GamePhase, TurnPhase};
use crate::games_service::game_container::game_messages::{EngineEvent, GameEvent};
use crate::shared::shared_models::ServiceError;
use actions::GameAction;
use rand::rngs::StdRng;
use rand::SeedableRng;

/**
 *  the rules engine.  every operation is apply(state, player, action) ->
 *  (state', events) or an error that leaves state untouched.  all
 *  randomness -- dice, deck draws, steal picks -- flows through the
 *  GameContext the owning actor injects, so a game replays from its seed.
 */

pub const SETTLEMENT_COST: ResourceCount = ResourceCount {
    brick: 1,
    lumber: 1,
    ore: 0,
    grain: 1,
    wool: 1,
};

pub const CITY_COST: ResourceCount = ResourceCount {
    brick: 0,
    lumber: 0,
    ore: 3,
    grain: 2,
    wool: 0,
};

pub const ROAD_COST: ResourceCount = ResourceCount {
    brick: 1,
    lumber: 1,
    ore: 0,
    grain: 0,
    wool: 0,
};

pub const DEV_CARD_COST: ResourceCount = ResourceCount {
    brick: 0,
    lumber: 0,
    ore: 1,
    grain: 1,
    wool: 1,
};

//  per-game randomness and the private dev-card draw pile.  owned by the
//  game actor; never part of a snapshot.
pub struct GameContext {
    pub rng: StdRng,
    pub deck: DevCardDeck,
}

impl GameContext {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let deck = DevCardDeck::new(&mut rng);
        Self { rng, deck }
    }
}

pub fn apply(
    state: &GameState,
    player_id: &str,
    action: &GameAction,
    ctx: &mut GameContext,
) -> Result<(GameState, Vec<EngineEvent>), ServiceError> {
    state_machine::ensure_legal(state, player_id, action)?;

    let mut next = state.clone();
    let mut events = Vec::new();

    match action {
        GameAction::RollForOrder => setup::roll_for_order(&mut next, player_id, ctx, &mut events)?,
        GameAction::RollDice => production::roll_dice(&mut next, player_id, ctx, &mut events)?,
        GameAction::EndTurn => end_turn(&mut next, player_id, &mut events)?,
        //  build actions serve both setup placement and normal play; the
        //  gate already confirmed the phase fits
        GameAction::BuildSettlement { vertex_id } => match next.phase {
            GamePhase::SetupFirst | GamePhase::SetupSecond => {
                setup::place_setup_settlement(&mut next, player_id, vertex_id, &mut events)?
            }
            _ => building::build_settlement(&mut next, player_id, vertex_id, &mut events)?,
        },
        GameAction::BuildCity { vertex_id } => {
            building::build_city(&mut next, player_id, vertex_id, &mut events)?
        }
        GameAction::BuildRoad { edge_id } => match next.phase {
            GamePhase::SetupFirst | GamePhase::SetupSecond => {
                setup::place_setup_road(&mut next, player_id, edge_id, &mut events)?
            }
            _ if next.turn_phase == TurnPhase::RoadBuilding => {
                building::build_free_road(&mut next, player_id, edge_id, &mut events)?
            }
            _ => building::build_road(&mut next, player_id, edge_id, &mut events)?,
        },
        GameAction::BuyDevCard => {
            dev_card_plays::buy_dev_card(&mut next, player_id, ctx, &mut events)?
        }
        GameAction::MoveRobber { hex_id } => {
            robber::move_robber(&mut next, player_id, hex_id, &mut events)?
        }
        GameAction::StealResource { victim_id } => {
            robber::steal_resource(&mut next, player_id, victim_id, ctx, &mut events)?
        }
        GameAction::DiscardResources { resources } => {
            robber::discard_resources(&mut next, player_id, resources, &mut events)?
        }
        GameAction::ProposeTrade {
            offering,
            requesting,
            target_id,
        } => trading::propose(
            &mut next,
            player_id,
            offering,
            requesting,
            target_id.as_deref(),
            &mut events,
        )?,
        GameAction::AcceptTrade { trade_id } => {
            trading::accept(&mut next, player_id, trade_id, &mut events)?
        }
        GameAction::RejectTrade { trade_id } => {
            trading::reject(&mut next, player_id, trade_id, &mut events)?
        }
        GameAction::CancelTrade { trade_id } => {
            trading::cancel(&mut next, player_id, trade_id, &mut events)?
        }
        GameAction::BankTrade { give, receive } => {
            trading::bank_trade(&mut next, player_id, *give, *receive, &mut events)?
        }
        GameAction::PortTrade { give, receive } => {
            trading::port_trade(&mut next, player_id, *give, *receive, &mut events)?
        }
        GameAction::PlayKnight => {
            dev_card_plays::play_knight(&mut next, player_id, &mut events)?
        }
        GameAction::PlayRoadBuilding => {
            dev_card_plays::play_road_building(&mut next, player_id, &mut events)?
        }
        GameAction::PlayYearOfPlenty { first, second } => {
            dev_card_plays::play_year_of_plenty(&mut next, player_id, *first, *second, &mut events)?
        }
        GameAction::PlayMonopoly { resource } => {
            dev_card_plays::play_monopoly(&mut next, player_id, *resource, &mut events)?
        }
        GameAction::FinishRoadBuilding => {
            building::finish_road_building(&mut next, player_id, &mut events)?
        }
    }

    achievements::check_winner(&mut next, &mut events);

    Ok((next, events))
}

/// Expires the active trade if it still matches.  Driven by the actor's
/// timer, not by a client, so it bypasses the turn gates.
pub fn expire_trade(state: &GameState, trade_id: &str) -> Option<(GameState, Vec<EngineEvent>)> {
    let trade = state.active_trade.as_ref()?;
    if trade.id != trade_id {
        return None;
    }
    let mut next = state.clone();
    next.active_trade = None;
    let events = vec![EngineEvent::all(GameEvent::TradeCancelled {
        trade_id: trade_id.to_owned(),
    })];
    Some((next, events))
}

fn end_turn(
    state: &mut GameState,
    player_id: &str,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    //  an unanswered trade dies with the turn that proposed it
    if let Some(trade) = state.active_trade.take() {
        events.push(EngineEvent::all(GameEvent::TradeCancelled {
            trade_id: trade.id,
        }));
    }

    let player_count = state.turn_order.len();
    state.current_player_index = (state.current_player_index + 1) % player_count;
    if state.current_player_index == 0 {
        state.turn_number += 1;
    }
    state.turn_phase = TurnPhase::PreRoll;
    state.last_dice_roll = None;
    state.road_building_roads_placed = 0;

    log::debug!(
        "game {}: {} ended turn, {} is up (turn {})",
        state.code,
        player_id,
        state.current_player_id().unwrap_or("?"),
        state.turn_number
    );

    events.push(EngineEvent::all(GameEvent::TurnChanged {
        current_player_id: state
            .current_player_id()
            .unwrap_or_default()
            .to_owned(),
        turn_number: state.turn_number,
    }));
    push_phase_changed(state, events);
    Ok(())
}

pub(crate) fn push_phase_changed(state: &GameState, events: &mut Vec<EngineEvent>) {
    events.push(EngineEvent::all(GameEvent::PhaseChanged {
        phase: state.phase,
        turn_phase: state.turn_phase,
    }));
}

pub(crate) fn push_resources_updated(
    state: &GameState,
    player_id: &str,
    events: &mut Vec<EngineEvent>,
) {
    if let Ok(player) = state.player(player_id) {
        events.push(EngineEvent::all(GameEvent::ResourcesUpdated {
            player_id: player_id.to_owned(),
            resources: player.resources,
        }));
    }
}

pub(crate) fn push_victory_points(
    state: &GameState,
    player_id: &str,
    events: &mut Vec<EngineEvent>,
) {
    if let Ok(player) = state.player(player_id) {
        events.push(EngineEvent::all(GameEvent::VictoryPoints {
            player_id: player_id.to_owned(),
            public_victory_points: player.public_victory_points,
        }));
    }
}
