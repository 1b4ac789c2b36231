use crate::games_service::board::generator::place_ports;
use crate::games_service::board::{Board, HexTile, Terrain};
use crate::games_service::buildings::{Building, BuildingKind, Road};
use crate::games_service::game::game_enums::{GamePhase, GameStatus, SetupPiece, TurnPhase};
use crate::games_service::game::game_state::{GameState, SetupState};
use crate::games_service::game::resources::ResourceCount;
use crate::games_service::hex::{EdgeKey, HexKey, VertexKey};
use crate::games_service::player::{PlayerColor, PlayerState};
use crate::games_service::rules::GameContext;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;

/**
 *  fixtures for the rules tests.  the board layout is fixed so scenarios
 *  can talk about "the forest with the 8 token" and mean the tile at (1,0).
 */

//  spiral-order layout: canonical terrain/token multisets, desert centered,
//  no adjacent 6/8
const TEST_LAYOUT: [(i32, i32, Terrain, Option<u8>); 19] = [
    (0, 0, Terrain::Desert, None),
    (1, 0, Terrain::Forest, Some(8)),
    (1, -1, Terrain::Hills, Some(5)),
    (0, -1, Terrain::Mountains, Some(4)),
    (-1, 0, Terrain::Pasture, Some(10)),
    (-1, 1, Terrain::Fields, Some(9)),
    (0, 1, Terrain::Forest, Some(3)),
    (2, 0, Terrain::Fields, Some(11)),
    (2, -1, Terrain::Pasture, Some(2)),
    (2, -2, Terrain::Forest, Some(6)),
    (1, -2, Terrain::Hills, Some(10)),
    (0, -2, Terrain::Mountains, Some(12)),
    (-1, -1, Terrain::Fields, Some(5)),
    (-2, 0, Terrain::Pasture, Some(6)),
    (-2, 1, Terrain::Pasture, Some(3)),
    (-2, 2, Terrain::Hills, Some(8)),
    (-1, 2, Terrain::Forest, Some(9)),
    (0, 2, Terrain::Mountains, Some(11)),
    (1, 1, Terrain::Fields, Some(4)),
];

pub fn test_board() -> Board {
    let mut tiles = BTreeMap::new();
    for (q, r, terrain, token) in TEST_LAYOUT {
        let tile = HexTile::new(HexKey::new(q, r), terrain, token);
        tiles.insert(tile.id.clone(), tile);
    }
    Board {
        tiles,
        ports: place_ports(&mut StdRng::seed_from_u64(0)),
        robber_hex: HexKey::origin(),
    }
}

pub fn two_players() -> Vec<PlayerState> {
    vec![
        PlayerState::new("a", "user-a", "alice", PlayerColor::Red),
        PlayerState::new("b", "user-b", "bob", PlayerColor::Blue),
    ]
}

/// A game in the playing phase, pre-roll, player "a" to act.
pub fn playing_state() -> GameState {
    let mut state = GameState::new("TSTGME", two_players(), test_board(), 25);
    state.status = GameStatus::Playing;
    state.phase = GamePhase::Playing;
    state.turn_order = vec!["a".to_owned(), "b".to_owned()];
    state.current_player_index = 0;
    state.turn_number = 2;
    state.turn_phase = TurnPhase::PreRoll;
    state
}

/// A game at the very start of the first setup round, "a" placing.
pub fn setup_state_fixture() -> GameState {
    let mut state = GameState::new("TSTGME", two_players(), test_board(), 25);
    state.phase = GamePhase::SetupFirst;
    state.turn_order = vec!["a".to_owned(), "b".to_owned()];
    state.setup_state = Some(SetupState {
        index: 0,
        expecting: SetupPiece::Settlement,
        last_settlement: None,
    });
    state
}

pub fn ctx(seed: u64) -> GameContext {
    GameContext::new(seed)
}

/// Moves resources from the bank into a player's hand.
pub fn give(state: &mut GameState, player_id: &str, resources: ResourceCount) {
    assert!(state.bank.subtract(&resources), "bank fixture underflow");
    state.player_mut(player_id).unwrap().resources += resources;
}

/// Drops a building onto the board without engine checks, for fixtures.
pub fn place_building_raw(
    state: &mut GameState,
    player_id: &str,
    vertex: VertexKey,
    kind: BuildingKind,
) {
    state.buildings.insert(
        vertex.id(),
        Building {
            vertex,
            player_id: player_id.to_owned(),
            kind,
        },
    );
    let player = state.player_mut(player_id).unwrap();
    match kind {
        BuildingKind::Settlement => player.settlements.push(vertex),
        BuildingKind::City => player.cities.push(vertex),
    }
    player.public_victory_points += kind.victory_points();
}

pub fn place_road_raw(state: &mut GameState, player_id: &str, edge: EdgeKey) {
    state.roads.insert(
        edge.id(),
        Road {
            edge,
            player_id: player_id.to_owned(),
        },
    );
    state.player_mut(player_id).unwrap().roads.push(edge);
}

/// Asserts the cross-cutting invariants that must hold after every
/// successful command.
pub fn assert_invariants(state: &GameState) {
    use crate::games_service::player::{MAX_CITIES, MAX_ROADS, MAX_SETTLEMENTS};

    let mut public_vp_sum = 0;
    for player in &state.players {
        assert!(player.settlements.len() <= MAX_SETTLEMENTS);
        assert!(player.cities.len() <= MAX_CITIES);
        assert!(player.roads.len() <= MAX_ROADS);
        public_vp_sum += player.public_victory_points;
    }

    //  vp bookkeeping: settlements + 2*cities + 2 per held achievement
    let settlements = state
        .buildings
        .values()
        .filter(|b| b.kind == BuildingKind::Settlement)
        .count() as u32;
    let cities = state
        .buildings
        .values()
        .filter(|b| b.kind == BuildingKind::City)
        .count() as u32;
    let achievement_vp = 2 * (state.longest_road_holder.is_some() as u32)
        + 2 * (state.largest_army_holder.is_some() as u32);
    assert_eq!(public_vp_sum, settlements + 2 * cities + achievement_vp);

    //  building and road tables agree with the per-player lists
    for player in &state.players {
        for v in &player.settlements {
            let b = state.building_at(v).expect("listed settlement exists");
            assert_eq!(b.player_id, player.id);
            assert_eq!(b.kind, BuildingKind::Settlement);
        }
        for v in &player.cities {
            let b = state.building_at(v).expect("listed city exists");
            assert_eq!(b.player_id, player.id);
            assert_eq!(b.kind, BuildingKind::City);
        }
        for e in &player.roads {
            assert_eq!(state.road_at(e).expect("listed road exists").player_id, player.id);
        }
    }

    //  the distance rule holds globally: no two adjacent vertices built
    for building in state.buildings.values() {
        for neighbor in building.vertex.adjacent_vertices() {
            assert!(
                state.building_at(&neighbor).is_none(),
                "adjacent buildings at {} and {}",
                building.vertex,
                neighbor
            );
        }
    }

    //  discard fence shape
    assert_eq!(
        !state.pending_discards.is_empty(),
        state.turn_phase == TurnPhase::Discard
    );

    //  card conservation: deck + hands = 25
    let held: usize = state.players.iter().map(|p| p.dev_cards.len()).sum();
    assert_eq!(state.dev_card_deck_count + held, 25);

    //  finished iff winner
    assert_eq!(
        state.phase == GamePhase::Finished,
        state.winner_id.is_some()
    );

    //  resource conservation against the bank
    let in_hands: u32 = state.players.iter().map(|p| p.resources.total()).sum();
    assert_eq!(state.bank.total() + in_hands, 5 * 19);
}
