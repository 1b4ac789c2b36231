#![allow(dead_code)]

use super::{
    achievements, push_phase_changed, push_resources_updated, GameContext, DEV_CARD_COST,
};
use crate::games_service::dev_cards::{DevCard, DevCardKind};
use crate::games_service::game::game_enums::TurnPhase;
use crate::games_service::game::game_state::GameState;
use crate::games_service::game::resources::Resource;
use crate::games_service::game_container::game_messages::{EngineEvent, GameEvent};
use crate::shared::shared_models::{GameError, ServiceError};
use crate::shared::utility::get_id;

/**
 *  buying and playing development cards.  the five kinds are dispatched by
 *  tag; the shared preconditions live in take_playable_card: not bought
 *  this turn, not already played, at most one card played per turn.
 */

pub fn buy_dev_card(
    state: &mut GameState,
    player_id: &str,
    ctx: &mut GameContext,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    if ctx.deck.is_empty() {
        return Err(ServiceError::new(
            GameError::DeckEmpty,
            "the development deck is exhausted",
        ));
    }
    {
        let player = state.player_mut(player_id)?;
        if !player.resources.subtract(&DEV_CARD_COST) {
            return Err(ServiceError::cannot_afford(
                "a development card costs ore, grain and wool",
            ));
        }
    }
    state.bank += DEV_CARD_COST;

    let kind = ctx
        .deck
        .draw()
        .ok_or_else(|| ServiceError::internal("deck drained concurrently"))?;
    let card = DevCard::new(&get_id(), kind, state.turn_number);
    state.player_mut(player_id)?.dev_cards.push(card.clone());
    state.dev_card_deck_count = ctx.deck.len();

    events.push(EngineEvent::all(GameEvent::DevCardPurchased {
        player_id: player_id.to_owned(),
        deck_count: ctx.deck.len(),
    }));
    //  only the buyer learns what was drawn
    events.push(EngineEvent::to(player_id, GameEvent::DevCardDrawn { card }));
    push_resources_updated(state, player_id, events);
    Ok(())
}

/// Finds a playable card of the kind, marks it played, and burns the
/// player's once-per-turn allowance.
fn take_playable_card(
    state: &mut GameState,
    player_id: &str,
    kind: DevCardKind,
) -> Result<(), ServiceError> {
    let turn = state.turn_number;
    let player = state.player_mut(player_id)?;

    if player.dev_card_played_on_turn == Some(turn) {
        return Err(ServiceError::bad_payload(
            "only one development card per turn",
        ));
    }
    let card = player
        .dev_cards
        .iter_mut()
        .find(|c| c.kind == kind && !c.played && c.purchased_on_turn < turn)
        .ok_or_else(|| {
            ServiceError::bad_payload(&format!("no playable {} in hand", kind))
        })?;
    card.played = true;
    player.dev_card_played_on_turn = Some(turn);
    Ok(())
}

pub fn play_knight(
    state: &mut GameState,
    player_id: &str,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    take_playable_card(state, player_id, DevCardKind::Knight)?;
    state.player_mut(player_id)?.knights_played += 1;

    events.push(EngineEvent::all(GameEvent::DevCardPlayed {
        player_id: player_id.to_owned(),
        kind: DevCardKind::Knight,
    }));
    achievements::recompute_largest_army(state, events);

    //  straight to the robber, no discard fence on a knight
    state.turn_phase = TurnPhase::RobberMove;
    push_phase_changed(state, events);
    Ok(())
}

pub fn play_road_building(
    state: &mut GameState,
    player_id: &str,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    take_playable_card(state, player_id, DevCardKind::RoadBuilding)?;
    events.push(EngineEvent::all(GameEvent::DevCardPlayed {
        player_id: player_id.to_owned(),
        kind: DevCardKind::RoadBuilding,
    }));
    state.road_building_roads_placed = 0;
    state.turn_phase = TurnPhase::RoadBuilding;
    push_phase_changed(state, events);
    Ok(())
}

pub fn play_year_of_plenty(
    state: &mut GameState,
    player_id: &str,
    first: Resource,
    second: Resource,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    //  the bank must cover both picks before the card is spent
    let mut wanted = crate::games_service::game::resources::ResourceCount::new();
    wanted.add(first, 1);
    wanted.add(second, 1);
    if !state.bank.contains(&wanted) {
        return Err(ServiceError::new(
            GameError::BankShortage,
            "the bank cannot supply those resources",
        ));
    }

    take_playable_card(state, player_id, DevCardKind::YearOfPlenty)?;
    events.push(EngineEvent::all(GameEvent::DevCardPlayed {
        player_id: player_id.to_owned(),
        kind: DevCardKind::YearOfPlenty,
    }));
    state.turn_phase = TurnPhase::YearOfPlenty;
    push_phase_changed(state, events);

    state.bank.subtract(&wanted);
    state.player_mut(player_id)?.resources += wanted;
    push_resources_updated(state, player_id, events);

    state.turn_phase = TurnPhase::Main;
    push_phase_changed(state, events);
    Ok(())
}

pub fn play_monopoly(
    state: &mut GameState,
    player_id: &str,
    resource: Resource,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    take_playable_card(state, player_id, DevCardKind::Monopoly)?;
    events.push(EngineEvent::all(GameEvent::DevCardPlayed {
        player_id: player_id.to_owned(),
        kind: DevCardKind::Monopoly,
    }));
    state.turn_phase = TurnPhase::Monopoly;
    push_phase_changed(state, events);

    //  every other player surrenders every card of the named resource
    let victims: Vec<String> = state
        .players
        .iter()
        .filter(|p| p.id != player_id)
        .map(|p| p.id.clone())
        .collect();
    let mut collected = 0;
    for victim_id in victims {
        let victim = state.player_mut(&victim_id)?;
        let count = victim.resources.get(resource);
        if count > 0 {
            victim.resources.set(resource, 0);
            collected += count;
        }
        push_resources_updated(state, &victim_id, events);
    }
    state.player_mut(player_id)?.resources.add(resource, collected);
    push_resources_updated(state, player_id, events);
    log::debug!(
        "game {}: monopoly on {} nets {} cards for {}",
        state.code,
        resource,
        collected,
        player_id
    );

    state.turn_phase = TurnPhase::Main;
    push_phase_changed(state, events);
    Ok(())
}

/// True when the player could legally play the kind right now; drives the
/// action hints some clients render.
pub fn is_playable(state: &GameState, player_id: &str, kind: DevCardKind) -> bool {
    if !kind.is_playable_kind() {
        return false;
    }
    let player = match state.player(player_id) {
        Ok(p) => p,
        Err(_) => return false,
    };
    if player.dev_card_played_on_turn == Some(state.turn_number) {
        return false;
    }
    let has_card = player
        .dev_cards
        .iter()
        .any(|c| c.kind == kind && !c.played && c.purchased_on_turn < state.turn_number);
    let phase_ok = match kind {
        //  the knight may also preempt the roll
        DevCardKind::Knight => matches!(state.turn_phase, TurnPhase::PreRoll | TurnPhase::Main),
        _ => state.turn_phase == TurnPhase::Main,
    };
    has_card && phase_ok
}
