use super::{
    achievements, push_phase_changed, push_resources_updated, push_victory_points, CITY_COST,
    ROAD_COST, SETTLEMENT_COST,
};
use crate::games_service::buildings::{Building, BuildingKind, Road};
use crate::games_service::game::game_enums::TurnPhase;
use crate::games_service::game::game_state::GameState;
use crate::games_service::game_container::game_messages::{EngineEvent, GameEvent};
use crate::games_service::hex::{EdgeKey, VertexKey};
use crate::shared::shared_models::ServiceError;
use std::collections::BTreeSet;

/**
 *  placement legality and execution for settlements, cities and roads.
 *  check_* helpers validate a site without touching state; put_* helpers
 *  mutate and emit.  setup placement reuses the same pieces with its own
 *  rules layered on top.
 */

/// Site checks shared by setup and normal play: the vertex must parse, be
/// on the board, be empty, and respect the distance rule.
pub fn check_settlement_site(
    state: &GameState,
    vertex_id: &str,
) -> Result<VertexKey, ServiceError> {
    let vertex = VertexKey::from_id(vertex_id)?;
    if !state.board.vertex_on_board(&vertex) {
        return Err(ServiceError::illegal_placement("that corner is not on the board"));
    }
    if state.building_at(&vertex).is_some() {
        return Err(ServiceError::illegal_placement("that corner is already occupied"));
    }
    //  distance rule: no building on any edge-connected neighbor vertex
    if vertex
        .adjacent_vertices()
        .iter()
        .any(|v| state.building_at(v).is_some())
    {
        return Err(ServiceError::illegal_placement(
            "too close to another settlement or city",
        ));
    }
    Ok(vertex)
}

pub fn check_road_site(state: &GameState, edge_id: &str) -> Result<EdgeKey, ServiceError> {
    let edge = EdgeKey::from_id(edge_id)?;
    if !state.board.edge_on_board(&edge) {
        return Err(ServiceError::illegal_placement("that edge is not on the board"));
    }
    if state.road_at(&edge).is_some() {
        return Err(ServiceError::illegal_placement("that edge already has a road"));
    }
    Ok(edge)
}

pub fn put_settlement(
    state: &mut GameState,
    player_id: &str,
    vertex: VertexKey,
    events: &mut Vec<EngineEvent>,
) {
    state.buildings.insert(
        vertex.id(),
        Building {
            vertex,
            player_id: player_id.to_owned(),
            kind: BuildingKind::Settlement,
        },
    );
    if let Ok(player) = state.player_mut(player_id) {
        player.settlements.push(vertex);
        player.public_victory_points += 1;
    }
    events.push(EngineEvent::all(GameEvent::SettlementPlaced {
        player_id: player_id.to_owned(),
        vertex_id: vertex.id(),
    }));
    push_victory_points(state, player_id, events);
}

pub fn put_road(
    state: &mut GameState,
    player_id: &str,
    edge: EdgeKey,
    events: &mut Vec<EngineEvent>,
) {
    state.roads.insert(
        edge.id(),
        Road {
            edge,
            player_id: player_id.to_owned(),
        },
    );
    if let Ok(player) = state.player_mut(player_id) {
        player.roads.push(edge);
    }
    events.push(EngineEvent::all(GameEvent::RoadPlaced {
        player_id: player_id.to_owned(),
        edge_id: edge.id(),
    }));
}

pub fn build_settlement(
    state: &mut GameState,
    player_id: &str,
    vertex_id: &str,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    let vertex = check_settlement_site(state, vertex_id)?;

    if !state.player_has_road_at(player_id, &vertex) {
        return Err(ServiceError::illegal_placement(
            "a settlement must connect to one of your roads",
        ));
    }
    let player = state.player(player_id)?;
    if player.settlements_left() == 0 {
        return Err(ServiceError::new(
            crate::shared::shared_models::GameError::PieceExhausted,
            "all five settlements are on the board",
        ));
    }
    if !player.resources.contains(&SETTLEMENT_COST) {
        return Err(ServiceError::cannot_afford(
            "a settlement costs brick, lumber, grain and wool",
        ));
    }

    pay(state, player_id, &SETTLEMENT_COST)?;
    put_settlement(state, player_id, vertex, events);
    push_resources_updated(state, player_id, events);
    //  a new settlement can cut an opponent's chain
    achievements::recompute_longest_road(state, events);
    Ok(())
}

pub fn build_city(
    state: &mut GameState,
    player_id: &str,
    vertex_id: &str,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    let vertex = VertexKey::from_id(vertex_id)?;
    match state.building_at(&vertex) {
        Some(b) if b.player_id == player_id && b.kind == BuildingKind::Settlement => {}
        Some(b) if b.player_id == player_id => {
            return Err(ServiceError::illegal_placement("that is already a city"))
        }
        _ => {
            return Err(ServiceError::illegal_placement(
                "a city must upgrade your own settlement",
            ))
        }
    }
    let player = state.player(player_id)?;
    if player.cities_left() == 0 {
        return Err(ServiceError::new(
            crate::shared::shared_models::GameError::PieceExhausted,
            "all four cities are on the board",
        ));
    }
    if !player.resources.contains(&CITY_COST) {
        return Err(ServiceError::cannot_afford("a city costs three ore and two grain"));
    }

    pay(state, player_id, &CITY_COST)?;
    if let Some(building) = state.buildings.get_mut(&vertex.id()) {
        building.kind = BuildingKind::City;
    }
    let player = state.player_mut(player_id)?;
    player.settlements.retain(|v| *v != vertex);
    player.cities.push(vertex);
    player.public_victory_points += 1;

    events.push(EngineEvent::all(GameEvent::CityPlaced {
        player_id: player_id.to_owned(),
        vertex_id: vertex.id(),
    }));
    push_victory_points(state, player_id, events);
    push_resources_updated(state, player_id, events);
    Ok(())
}

pub fn build_road(
    state: &mut GameState,
    player_id: &str,
    edge_id: &str,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    let edge = check_road_site(state, edge_id)?;
    ensure_road_connects(state, player_id, &edge)?;
    ensure_road_piece(state, player_id)?;
    let player = state.player(player_id)?;
    if !player.resources.contains(&ROAD_COST) {
        return Err(ServiceError::cannot_afford("a road costs brick and lumber"));
    }

    pay(state, player_id, &ROAD_COST)?;
    put_road(state, player_id, edge, events);
    push_resources_updated(state, player_id, events);
    achievements::recompute_longest_road(state, events);
    Ok(())
}

/// One of the two free placements granted by a road-building card.
pub fn build_free_road(
    state: &mut GameState,
    player_id: &str,
    edge_id: &str,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    let edge = check_road_site(state, edge_id)?;
    ensure_road_connects(state, player_id, &edge)?;
    ensure_road_piece(state, player_id)?;

    put_road(state, player_id, edge, events);
    achievements::recompute_longest_road(state, events);

    state.road_building_roads_placed += 1;
    if state.road_building_roads_placed >= 2 {
        state.road_building_roads_placed = 0;
        state.turn_phase = TurnPhase::Main;
        push_phase_changed(state, events);
    }
    Ok(())
}

/// Ends the road-building phase early.  Only legal when the player truly
/// cannot place: no pieces left, or no legal edge remains.
pub fn finish_road_building(
    state: &mut GameState,
    player_id: &str,
    events: &mut Vec<EngineEvent>,
) -> Result<(), ServiceError> {
    let player = state.player(player_id)?;
    if player.roads_left() > 0 && has_legal_road_placement(state, player_id) {
        return Err(ServiceError::illegal_placement(
            "legal road placements remain",
        ));
    }
    state.road_building_roads_placed = 0;
    state.turn_phase = TurnPhase::Main;
    push_phase_changed(state, events);
    Ok(())
}

fn ensure_road_piece(state: &GameState, player_id: &str) -> Result<(), ServiceError> {
    if state.player(player_id)?.roads_left() == 0 {
        return Err(ServiceError::new(
            crate::shared::shared_models::GameError::PieceExhausted,
            "all fifteen roads are on the board",
        ));
    }
    Ok(())
}

/// Connectivity: the edge must meet the player's network at an endpoint --
/// through the player's own building, or through an incident road at a
/// vertex not occupied by an opponent's building (an opponent's building
/// severs the connection at that vertex).
fn ensure_road_connects(
    state: &GameState,
    player_id: &str,
    edge: &EdgeKey,
) -> Result<(), ServiceError> {
    if road_connects(state, player_id, edge) {
        Ok(())
    } else {
        Err(ServiceError::illegal_placement(
            "a road must connect to your network",
        ))
    }
}

pub fn road_connects(state: &GameState, player_id: &str, edge: &EdgeKey) -> bool {
    for vertex in edge.endpoints() {
        match state.building_at(&vertex) {
            Some(b) if b.player_id == player_id => return true,
            //  an opponent building blocks any connection through here
            Some(_) => continue,
            None => {
                let has_incident_road = vertex
                    .incident_edges()
                    .iter()
                    .filter(|e| *e != edge)
                    .filter_map(|e| state.road_at(e))
                    .any(|r| r.player_id == player_id);
                if has_incident_road {
                    return true;
                }
            }
        }
    }
    false
}

/// Whether any unoccupied on-board edge would accept this player's road.
pub fn has_legal_road_placement(state: &GameState, player_id: &str) -> bool {
    let player = match state.player(player_id) {
        Ok(p) => p,
        Err(_) => return false,
    };

    let mut candidates: BTreeSet<EdgeKey> = BTreeSet::new();
    for road in &player.roads {
        candidates.extend(road.adjacent_edges());
    }
    for vertex in player.settlements.iter().chain(player.cities.iter()) {
        candidates.extend(vertex.incident_edges());
    }

    candidates.into_iter().any(|edge| {
        state.board.edge_on_board(&edge)
            && state.road_at(&edge).is_none()
            && road_connects(state, player_id, &edge)
    })
}

fn pay(
    state: &mut GameState,
    player_id: &str,
    cost: &crate::games_service::game::resources::ResourceCount,
) -> Result<(), ServiceError> {
    let player = state.player_mut(player_id)?;
    if !player.resources.subtract(cost) {
        return Err(ServiceError::cannot_afford("insufficient resources"));
    }
    state.bank += *cost;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games_service::hex::{Corner, Direction, HexKey};
    use crate::games_service::rules::actions::GameAction;
    use crate::games_service::rules::test_support::*;
    use crate::games_service::rules::{apply, SETTLEMENT_COST};
    use crate::shared::shared_models::GameError;

    //  a built-out fixture: "a" holds a settlement on the north corner of
    //  the forest-8 and a two-road chain running toward the desert.  the
    //  chain ends at a free vertex two steps from the settlement, so a
    //  follow-up settlement there passes the distance rule.
    fn state_with_a_network() -> crate::games_service::game::game_state::GameState {
        let mut state = playing_state();
        state.turn_phase = crate::games_service::game::game_enums::TurnPhase::Main;
        let v = HexKey::new(1, 0).vertex(Corner::North);
        let w = HexKey::new(1, 0).vertex(Corner::NorthWest);
        place_building_raw(&mut state, "a", v, crate::games_service::buildings::BuildingKind::Settlement);
        place_road_raw(&mut state, "a", EdgeKey::from_hexes(HexKey::new(1, -1), HexKey::new(1, 0)));
        place_road_raw(&mut state, "a", EdgeKey::from_hexes(HexKey::new(0, 0), HexKey::new(1, 0)));
        assert!(w.incident_edges().iter().filter(|e| state.road_at(e).is_some()).count() == 2);
        state
    }

    //  the open end of a's chain: the far endpoint of the second road
    fn chain_end(state: &crate::games_service::game::game_state::GameState) -> crate::games_service::hex::VertexKey {
        let second = state.player("a").unwrap().roads[1];
        let w = HexKey::new(1, 0).vertex(Corner::NorthWest);
        second.endpoints().into_iter().find(|x| *x != w).unwrap()
    }

    #[test]
    fn test_settlement_distance_rule() {
        //  scenario: vertex V is free but an adjacent vertex U holds b's
        //  settlement; building at V must fail and leave state untouched
        let mut state = state_with_a_network();
        let u = HexKey::new(-1, 0).vertex(Corner::North);
        place_building_raw(&mut state, "b", u, crate::games_service::buildings::BuildingKind::Settlement);
        give(&mut state, "a", SETTLEMENT_COST);

        let v = u.adjacent_vertices()[0];
        let before = state.clone();
        let err = apply(
            &state,
            "a",
            &GameAction::BuildSettlement { vertex_id: v.id() },
            &mut ctx(1),
        )
        .unwrap_err();
        assert_eq!(err.kind, GameError::IllegalPlacement);
        assert_eq!(state, before, "failed command must not mutate");
    }

    #[test]
    fn test_settlement_requires_connection_and_payment() {
        let state = state_with_a_network();
        //  a free vertex two steps along a's road -- but a cannot afford it
        let far = HexKey::new(0, -2).vertex(Corner::North);
        let err = apply(
            &state,
            "a",
            &GameAction::BuildSettlement { vertex_id: far.id() },
            &mut ctx(1),
        )
        .unwrap_err();
        //  disconnected comes first
        assert_eq!(err.kind, GameError::IllegalPlacement);

        //  connected but broke
        let road_end = chain_end(&state);
        let err = apply(
            &state,
            "a",
            &GameAction::BuildSettlement { vertex_id: road_end.id() },
            &mut ctx(1),
        )
        .unwrap_err();
        assert_eq!(err.kind, GameError::CannotAfford);

        //  funded and connected: succeeds, costs the bank nothing net
        let mut state = state;
        give(&mut state, "a", SETTLEMENT_COST);
        let (next, _) = apply(
            &state,
            "a",
            &GameAction::BuildSettlement { vertex_id: road_end.id() },
            &mut ctx(1),
        )
        .unwrap();
        assert_invariants(&next);
        assert_eq!(next.player("a").unwrap().settlements.len(), 2);
        assert_eq!(next.player("a").unwrap().resources.total(), 0);
    }

    #[test]
    fn test_city_upgrade_returns_settlement_slot() {
        let mut state = state_with_a_network();
        give(&mut state, "a", crate::games_service::rules::CITY_COST);
        let v = state.player("a").unwrap().settlements[0];

        let (next, _) = apply(
            &state,
            "a",
            &GameAction::BuildCity { vertex_id: v.id() },
            &mut ctx(1),
        )
        .unwrap();
        assert_invariants(&next);
        let a = next.player("a").unwrap();
        assert_eq!(a.settlements.len(), 0);
        assert_eq!(a.cities.len(), 1);
        assert_eq!(a.public_victory_points, 2);
        //  upgrading again is illegal
        let err = apply(
            &next,
            "a",
            &GameAction::BuildCity { vertex_id: v.id() },
            &mut ctx(1),
        )
        .unwrap_err();
        assert_eq!(err.kind, GameError::IllegalPlacement);
    }

    #[test]
    fn test_city_requires_own_settlement() {
        let mut state = state_with_a_network();
        give(&mut state, "b", crate::games_service::rules::CITY_COST);
        let v = state.player("a").unwrap().settlements[0];
        state.current_player_index = 1; // b's turn
        let err = apply(
            &state,
            "b",
            &GameAction::BuildCity { vertex_id: v.id() },
            &mut ctx(1),
        )
        .unwrap_err();
        assert_eq!(err.kind, GameError::IllegalPlacement);
    }

    #[test]
    fn test_road_connectivity_and_opponent_block() {
        let mut state = state_with_a_network();
        give(&mut state, "a", ROAD_COST);

        let junction = chain_end(&state);

        //  an edge continuing past the open end of a's chain is connected
        let extension = junction
            .incident_edges()
            .into_iter()
            .find(|e| state.road_at(e).is_none() && state.board.edge_on_board(e))
            .unwrap();
        assert!(road_connects(&state, "a", &extension));

        //  an opponent settlement on that junction severs it
        place_building_raw(
            &mut state,
            "b",
            junction,
            crate::games_service::buildings::BuildingKind::Settlement,
        );
        assert!(!road_connects(&state, "a", &extension));
        let err = apply(
            &state,
            "a",
            &GameAction::BuildRoad { edge_id: extension.id() },
            &mut ctx(1),
        )
        .unwrap_err();
        assert_eq!(err.kind, GameError::IllegalPlacement);
    }

    #[test]
    fn test_occupied_edge_rejected() {
        let mut state = state_with_a_network();
        give(&mut state, "a", ROAD_COST);
        let owned = state.player("a").unwrap().roads[0];
        let err = apply(
            &state,
            "a",
            &GameAction::BuildRoad { edge_id: owned.id() },
            &mut ctx(1),
        )
        .unwrap_err();
        assert_eq!(err.kind, GameError::IllegalPlacement);
    }

    #[test]
    fn test_malformed_ids_are_invalid_id_errors() {
        let state = state_with_a_network();
        for action in [
            GameAction::BuildSettlement { vertex_id: "nope".into() },
            GameAction::BuildCity { vertex_id: "e_hex_0_0_hex_1_0".into() },
            GameAction::BuildRoad { edge_id: "v_x".into() },
        ] {
            let err = apply(&state, "a", &action, &mut ctx(1)).unwrap_err();
            assert_eq!(err.kind, GameError::InvalidId);
        }
    }

    #[test]
    fn test_free_roads_return_to_main_after_two() {
        let mut state = state_with_a_network();
        state.turn_phase = crate::games_service::game::game_enums::TurnPhase::RoadBuilding;

        let junction = chain_end(&state);
        let first = junction
            .incident_edges()
            .into_iter()
            .find(|e| state.road_at(e).is_none() && state.board.edge_on_board(e))
            .unwrap();

        let (state, _) = apply(
            &state,
            "a",
            &GameAction::BuildRoad { edge_id: first.id() },
            &mut ctx(1),
        )
        .unwrap();
        assert_eq!(
            state.turn_phase,
            crate::games_service::game::game_enums::TurnPhase::RoadBuilding
        );

        let second_anchor = first.endpoints().into_iter().find(|v| *v != junction).unwrap();
        let second = second_anchor
            .incident_edges()
            .into_iter()
            .find(|e| *e != first && state.board.edge_on_board(e) && state.road_at(e).is_none())
            .unwrap();
        let (state, _) = apply(
            &state,
            "a",
            &GameAction::BuildRoad { edge_id: second.id() },
            &mut ctx(1),
        )
        .unwrap();
        assert_eq!(
            state.turn_phase,
            crate::games_service::game::game_enums::TurnPhase::Main
        );
        assert_eq!(state.player("a").unwrap().resources.total(), 0, "free roads cost nothing");
        assert_invariants(&state);
    }

    #[test]
    fn test_finish_road_building_blocked_while_placements_remain() {
        let mut state = state_with_a_network();
        state.turn_phase = crate::games_service::game::game_enums::TurnPhase::RoadBuilding;
        let err = apply(&state, "a", &GameAction::FinishRoadBuilding, &mut ctx(1)).unwrap_err();
        assert_eq!(err.kind, GameError::IllegalPlacement);
    }

    #[test]
    fn test_edge_direction_helper() {
        //  sanity: the edge east of the origin is shared with (1,0)
        let e = HexKey::origin().edge(Direction::East);
        assert!(e.hexes().contains(&HexKey::new(1, 0)));
    }
}
