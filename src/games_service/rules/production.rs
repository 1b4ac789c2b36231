use super::{push_phase_changed, robber, GameContext};
use crate::games_service::game::game_enums::TurnPhase;
use crate::games_service::game::game_state::GameState;
use crate::games_service::game::resources::{Resource, ResourceCount};
use crate::games_service::game_container::game_messages::{EngineEvent, GameEvent};
use crate::shared::shared_models::ServiceError;
use rand::Rng;
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

/**
 *  the dice roll and its payout.  two independent d6 through the game rng;
 *  a seven starts the robber sequence, anything else pays every building
 *  adjacent to a matching, un-robbed tile.
 *
 *  bank scarcity follows the standard rule: per resource, if the bank
 *  cannot pay every recipient in full and more than one player is owed,
 *  nobody receives that resource this roll; a sole recipient takes
 *  whatever is left.
 */

pub fn roll_dice(
    state: &mut GameState,
    player_id: &str,
    ctx: &mut GameContext,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    let dice: (u8, u8) = (ctx.rng.gen_range(1..=6), ctx.rng.gen_range(1..=6));
    resolve_roll(state, player_id, dice, events)
}

/// The deterministic tail of a roll, split out so scenarios can pin dice.
pub fn resolve_roll(
    state: &mut GameState,
    player_id: &str,
    dice: (u8, u8),
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    let total = dice.0 + dice.1;
    state.last_dice_roll = Some(dice);
    events.push(EngineEvent::all(GameEvent::DiceRolled {
        player_id: player_id.to_owned(),
        dice,
        total,
    }));
    log::debug!("game {}: {} rolled {} + {}", state.code, player_id, dice.0, dice.1);

    if total == 7 {
        robber::activate_robber(state, player_id, events);
        return Ok(());
    }

    distribute(state, total, events);
    state.turn_phase = TurnPhase::Main;
    push_phase_changed(state, events);
    Ok(())
}

fn distribute(state: &mut GameState, total: u8, events: &mut Vec<EngineEvent>) {
    let mut gains: BTreeMap<String, ResourceCount> = BTreeMap::new();

    for tile in state.board.tiles_with_token(total) {
        if tile.key == state.board.robber_hex {
            continue;
        }
        let resource = match tile.terrain.produces() {
            Some(r) => r,
            None => continue,
        };
        for vertex in tile.key.vertices() {
            if let Some(building) = state.building_at(&vertex) {
                gains
                    .entry(building.player_id.clone())
                    .or_default()
                    .add(resource, building.kind.production());
            }
        }
    }

    //  apply the scarcity rule per resource
    for resource in Resource::iter() {
        let owed: u32 = gains.values().map(|g| g.get(resource)).sum();
        let recipients = gains.values().filter(|g| g.get(resource) > 0).count();
        let available = state.bank.get(resource);
        if owed <= available || recipients == 0 {
            continue;
        }
        if recipients > 1 {
            log::info!(
                "game {}: bank short of {} ({} owed, {} left), nobody is paid",
                state.code,
                resource,
                owed,
                available
            );
            for gain in gains.values_mut() {
                gain.set(resource, 0);
            }
        } else {
            for gain in gains.values_mut() {
                if gain.get(resource) > 0 {
                    gain.set(resource, available);
                }
            }
        }
    }

    gains.retain(|_, g| !g.is_empty());

    for (player_id, gain) in &gains {
        state.bank.subtract(gain);
        if let Ok(player) = state.player_mut(player_id) {
            player.resources += *gain;
        }
    }

    events.push(EngineEvent::all(GameEvent::ResourcesDistributed {
        gains,
    }));
}
