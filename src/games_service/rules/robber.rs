use super::{push_phase_changed, push_resources_updated, GameContext};
use crate::games_service::game::game_enums::TurnPhase;
use crate::games_service::game::game_state::GameState;
use crate::games_service::game::resources::ResourceCount;
use crate::games_service::game_container::game_messages::{EngineEvent, GameEvent};
use crate::games_service::hex::HexKey;
use crate::shared::shared_models::ServiceError;
use rand::Rng;

/**
 *  the robber sequence: discard fence, then move, then steal.  entered from
 *  a rolled seven (with the fence) or a played knight (without).  the fence
 *  is a barrier -- the active player cannot move the robber until every
 *  oversized hand has discarded.
 */

const DISCARD_THRESHOLD: u32 = 7;

pub fn activate_robber(state: &mut GameState, triggered_by: &str, events: &mut Vec<EngineEvent>) {
    events.push(EngineEvent::all(GameEvent::RobberActivated {
        triggered_by: triggered_by.to_owned(),
    }));

    state.pending_discards = state
        .players
        .iter()
        .filter(|p| p.hand_size() > DISCARD_THRESHOLD)
        .map(|p| (p.id.clone(), p.hand_size() / 2))
        .collect();

    if state.pending_discards.is_empty() {
        state.turn_phase = TurnPhase::RobberMove;
    } else {
        for (player_id, count) in &state.pending_discards {
            events.push(EngineEvent::all(GameEvent::DiscardRequired {
                player_id: player_id.clone(),
                count: *count,
            }));
        }
        state.turn_phase = TurnPhase::Discard;
    }
    push_phase_changed(state, events);
}

/// One player satisfying their half of the discard fence.  Exactly
/// floor(hand/2) cards, and only cards they hold.
pub fn discard_resources(
    state: &mut GameState,
    player_id: &str,
    resources: &ResourceCount,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    let required = *state
        .pending_discards
        .get(player_id)
        .ok_or_else(|| ServiceError::wrong_turn_phase("you owe no discard"))?;
    if resources.total() != required {
        return Err(ServiceError::bad_payload(&format!(
            "you must discard exactly {} cards",
            required
        )));
    }

    let player = state.player_mut(player_id)?;
    if !player.resources.subtract(resources) {
        return Err(ServiceError::cannot_afford(
            "you cannot discard cards you do not hold",
        ));
    }
    state.bank += *resources;
    state.pending_discards.remove(player_id);

    events.push(EngineEvent::all(GameEvent::PlayerDiscarded {
        player_id: player_id.to_owned(),
        count: required,
    }));
    push_resources_updated(state, player_id, events);

    if state.pending_discards.is_empty() {
        state.turn_phase = TurnPhase::RobberMove;
        push_phase_changed(state, events);
    }
    Ok(())
}

pub fn move_robber(
    state: &mut GameState,
    player_id: &str,
    hex_id: &str,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    let hex = HexKey::from_id(hex_id)?;
    if !state.board.contains(&hex) {
        return Err(ServiceError::illegal_placement(
            "the robber stays on land tiles",
        ));
    }
    if hex == state.board.robber_hex {
        return Err(ServiceError::illegal_placement(
            "the robber must move to a different tile",
        ));
    }

    state.board.robber_hex = hex;
    events.push(EngineEvent::all(GameEvent::RobberMoved {
        player_id: player_id.to_owned(),
        hex_id: hex.id(),
    }));

    //  nobody to rob: skip the steal step entirely
    if state.building_owners_on_hex(&hex, player_id).is_empty() {
        finish_robber_sequence(state, events);
    } else {
        state.turn_phase = TurnPhase::RobberSteal;
        push_phase_changed(state, events);
    }
    Ok(())
}

pub fn steal_resource(
    state: &mut GameState,
    thief_id: &str,
    victim_id: &str,
    ctx: &mut GameContext,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    let robber_hex = state.board.robber_hex;
    let eligible = state.building_owners_on_hex(&robber_hex, thief_id);
    if !eligible.iter().any(|id| id == victim_id) {
        return Err(ServiceError::bad_payload(
            "that player has no building on the robber's tile",
        ));
    }

    let victim_hand = state.player(victim_id)?.resources;
    if victim_hand.total() > 0 {
        //  uniform over the victim's cards, not over the five types
        let cards = victim_hand.to_multiset();
        let stolen = cards[ctx.rng.gen_range(0..cards.len())];
        state.player_mut(victim_id)?.resources.remove(stolen, 1);
        state.player_mut(thief_id)?.resources.add(stolen, 1);

        //  the type travels only to the two parties involved
        events.push(EngineEvent::to(
            thief_id,
            GameEvent::StolenResource { resource: stolen },
        ));
        events.push(EngineEvent::to(
            victim_id,
            GameEvent::StolenResource { resource: stolen },
        ));
    }
    events.push(EngineEvent::all(GameEvent::RobberStole {
        thief_id: thief_id.to_owned(),
        victim_id: victim_id.to_owned(),
    }));

    finish_robber_sequence(state, events);
    Ok(())
}

//  where the turn resumes: a knight played before rolling goes back to
//  pre_roll (the dice still have to be thrown); anything else lands in main
fn finish_robber_sequence(state: &mut GameState, events: &mut Vec<EngineEvent>) {
    state.turn_phase = if state.last_dice_roll.is_none() {
        TurnPhase::PreRoll
    } else {
        TurnPhase::Main
    };
    push_phase_changed(state, events);
}
