use super::push_victory_points;
use crate::games_service::game::game_enums::{GamePhase, GameStatus};
use crate::games_service::game::game_state::GameState;
use crate::games_service::game_container::game_messages::{EngineEvent, GameEvent};
use crate::games_service::hex::{EdgeKey, VertexKey};
use crate::shared::utility::now_ms;
use std::collections::HashSet;

/**
 *  the two transferable 2-vp awards and the winner check.  both recomputes
 *  are idempotent: running them twice in a row changes nothing.
 *
 *  longest road is the longest simple (edge-disjoint) path through a
 *  player's road graph.  an opponent's building cuts the path at its
 *  vertex: a chain may end there but never continue through.  awards
 *  transfer only on a strict excess -- ties leave the holder alone.
 */

pub const LONGEST_ROAD_MINIMUM: u32 = 5;
pub const LARGEST_ARMY_MINIMUM: u32 = 3;

/// Longest simple path, in edges, through one player's roads.
pub fn longest_road_length(state: &GameState, player_id: &str) -> u32 {
    let player = match state.player(player_id) {
        Ok(p) => p,
        Err(_) => return 0,
    };
    let edges: HashSet<EdgeKey> = player.roads.iter().copied().collect();
    if edges.is_empty() {
        return 0;
    }

    let mut starts: HashSet<VertexKey> = HashSet::new();
    for edge in &edges {
        starts.extend(edge.endpoints());
    }

    let mut best = 0;
    let mut used: HashSet<EdgeKey> = HashSet::new();
    for start in starts {
        best = best.max(dfs(state, player_id, &edges, start, &mut used));
        debug_assert!(used.is_empty());
    }
    best
}

fn dfs(
    state: &GameState,
    player_id: &str,
    edges: &HashSet<EdgeKey>,
    at: VertexKey,
    used: &mut HashSet<EdgeKey>,
) -> u32 {
    let mut best = 0;
    for edge in at.incident_edges() {
        if !edges.contains(&edge) || used.contains(&edge) {
            continue;
        }
        let next = edge
            .endpoints()
            .into_iter()
            .find(|v| *v != at)
            .expect("an edge has two distinct endpoints");

        used.insert(edge);
        //  an opponent's building ends the chain at that corner
        let len = if is_enemy_vertex(state, player_id, &next) {
            1
        } else {
            1 + dfs(state, player_id, edges, next, used)
        };
        best = best.max(len);
        used.remove(&edge);
    }
    best
}

fn is_enemy_vertex(state: &GameState, player_id: &str, vertex: &VertexKey) -> bool {
    state
        .building_at(vertex)
        .map(|b| b.player_id != player_id)
        .unwrap_or(false)
}

/// Refreshes every player's road length and settles who holds the award.
pub fn recompute_longest_road(state: &mut GameState, events: &mut Vec<EngineEvent>) {
    let lengths: Vec<(String, u32)> = state
        .players
        .iter()
        .map(|p| (p.id.clone(), longest_road_length(state, &p.id)))
        .collect();
    for (player_id, length) in &lengths {
        if let Ok(player) = state.player_mut(player_id) {
            player.longest_road_length = *length;
        }
    }

    let length_of = |id: &str| {
        lengths
            .iter()
            .find(|(pid, _)| pid == id)
            .map(|(_, l)| *l)
            .unwrap_or(0)
    };

    let previous = state.longest_road_holder.clone();
    let new_holder = match &previous {
        Some(holder) => {
            let holder_len = length_of(holder);
            match unique_leader(
                lengths
                    .iter()
                    .filter(|(pid, len)| pid != holder && *len >= LONGEST_ROAD_MINIMUM && *len > holder_len),
            ) {
                //  a strictly longer rival takes the award
                Some(rival) => Some(rival),
                None => {
                    //  vacate only when the holder fell below the floor and
                    //  below every rival
                    let max_other = lengths
                        .iter()
                        .filter(|(pid, _)| pid != holder)
                        .map(|(_, l)| *l)
                        .max()
                        .unwrap_or(0);
                    if holder_len < LONGEST_ROAD_MINIMUM && holder_len < max_other {
                        None
                    } else {
                        Some(holder.clone())
                    }
                }
            }
        }
        None => unique_leader(
            lengths
                .iter()
                .filter(|(_, len)| *len >= LONGEST_ROAD_MINIMUM),
        ),
    };

    if new_holder != previous {
        transfer_award(
            state,
            events,
            previous.as_deref(),
            new_holder.as_deref(),
            AwardKind::LongestRoad,
        );
    }
    state.longest_road_length = new_holder.as_deref().map(length_of).unwrap_or(0);
    state.longest_road_holder = new_holder;
}

/// Largest army: strictly more played knights than the holder, minimum
/// three.  Knights never come back, so there is no vacate case.
pub fn recompute_largest_army(state: &mut GameState, events: &mut Vec<EngineEvent>) {
    let armies: Vec<(String, u32)> = state
        .players
        .iter()
        .map(|p| (p.id.clone(), p.knights_played))
        .collect();
    let army_of = |id: &str| {
        armies
            .iter()
            .find(|(pid, _)| pid == id)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    };

    let previous = state.largest_army_holder.clone();
    let new_holder = match &previous {
        Some(holder) => {
            let holder_army = army_of(holder);
            unique_leader(
                armies
                    .iter()
                    .filter(|(pid, n)| pid != holder && *n >= LARGEST_ARMY_MINIMUM && *n > holder_army),
            )
            .or_else(|| Some(holder.clone()))
        }
        None => unique_leader(armies.iter().filter(|(_, n)| *n >= LARGEST_ARMY_MINIMUM)),
    };

    if new_holder != previous {
        transfer_award(
            state,
            events,
            previous.as_deref(),
            new_holder.as_deref(),
            AwardKind::LargestArmy,
        );
    }
    state.largest_army_size = new_holder.as_deref().map(army_of).unwrap_or(0);
    state.largest_army_holder = new_holder;
}

//  the single owner of the maximum, or None on a tie for first
fn unique_leader<'a>(candidates: impl Iterator<Item = &'a (String, u32)>) -> Option<String> {
    let candidates: Vec<_> = candidates.collect();
    let max = candidates.iter().map(|(_, v)| *v).max()?;
    let mut leaders = candidates.iter().filter(|(_, v)| *v == max);
    let first = leaders.next()?;
    if leaders.next().is_some() {
        return None;
    }
    Some(first.0.clone())
}

enum AwardKind {
    LongestRoad,
    LargestArmy,
}

fn transfer_award(
    state: &mut GameState,
    events: &mut Vec<EngineEvent>,
    from: Option<&str>,
    to: Option<&str>,
    kind: AwardKind,
) {
    if let Some(loser) = from {
        if let Ok(player) = state.player_mut(loser) {
            match kind {
                AwardKind::LongestRoad => player.has_longest_road = false,
                AwardKind::LargestArmy => player.has_largest_army = false,
            }
            player.public_victory_points -= 2;
        }
        push_victory_points(state, loser, events);
    }
    if let Some(winner) = to {
        if let Ok(player) = state.player_mut(winner) {
            match kind {
                AwardKind::LongestRoad => player.has_longest_road = true,
                AwardKind::LargestArmy => player.has_largest_army = true,
            }
            player.public_victory_points += 2;
        }
        push_victory_points(state, winner, events);
    }
    let holder_id = to.map(str::to_owned);
    match kind {
        AwardKind::LongestRoad => {
            let length = holder_id
                .as_deref()
                .map(|id| state.player(id).map(|p| p.longest_road_length).unwrap_or(0))
                .unwrap_or(0);
            events.push(EngineEvent::all(GameEvent::LongestRoad {
                holder_id,
                length,
            }));
        }
        AwardKind::LargestArmy => {
            let size = holder_id
                .as_deref()
                .map(|id| state.player(id).map(|p| p.knights_played).unwrap_or(0))
                .unwrap_or(0);
            events.push(EngineEvent::all(GameEvent::LargestArmy { holder_id, size }));
        }
    }
}

/// Declares a winner the moment any player's public points plus hidden
/// victory cards reach ten.  Runs after every successful command; the
/// check also catches a player pushed over the line by an award change on
/// someone else's turn.
pub fn check_winner(state: &mut GameState, events: &mut Vec<EngineEvent>) {
    if state.winner_id.is_some() || state.phase != GamePhase::Playing {
        return;
    }

    //  prefer the active player if several qualify at once
    let active = state.current_player_id().map(str::to_owned);
    let winner = active
        .filter(|id| {
            state
                .player(id)
                .map(|p| p.total_victory_points() >= 10)
                .unwrap_or(false)
        })
        .or_else(|| {
            state
                .players
                .iter()
                .find(|p| p.total_victory_points() >= 10)
                .map(|p| p.id.clone())
        });

    if let Some(winner_id) = winner {
        log::info!("game {}: {} wins", state.code, winner_id);
        state.winner_id = Some(winner_id.clone());
        state.status = GameStatus::Finished;
        state.phase = GamePhase::Finished;
        state.finished_at = Some(now_ms());
        events.push(EngineEvent::all(GameEvent::GameEnded { winner_id }));
        events.push(EngineEvent::all(GameEvent::PhaseChanged {
            phase: state.phase,
            turn_phase: state.turn_phase,
        }));
    }
}
