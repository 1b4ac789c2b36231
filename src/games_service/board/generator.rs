use super::board::Board;
use super::port::{Port, PortKind};
use super::tile::{HexTile, Terrain};
use crate::games_service::hex::{Direction, HexKey};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

/**
 *  random board layout.  19 hexes in the canonical spiral around the origin,
 *  terrain and number tokens shuffled onto them, re-rolled until no two
 *  high-value tokens (6 or 8) sit on adjacent tiles.  generation never fails
 *  hard: after the attempt budget the last layout ships with a warning.
 */

pub const BOARD_RADIUS: u32 = 2;
const MAX_SHUFFLE_ATTEMPTS: u32 = 100;

//  1 desert, 3 hills, 3 mountains, 4 forest, 4 pasture, 4 fields
const TERRAIN_POOL: [Terrain; 19] = [
    Terrain::Desert,
    Terrain::Hills,
    Terrain::Hills,
    Terrain::Hills,
    Terrain::Mountains,
    Terrain::Mountains,
    Terrain::Mountains,
    Terrain::Forest,
    Terrain::Forest,
    Terrain::Forest,
    Terrain::Forest,
    Terrain::Pasture,
    Terrain::Pasture,
    Terrain::Pasture,
    Terrain::Pasture,
    Terrain::Fields,
    Terrain::Fields,
    Terrain::Fields,
    Terrain::Fields,
];

//  one 2, one 12, two of everything else (no 7)
const NUMBER_POOL: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

//  4 generic 3:1 ports plus one 2:1 port per resource
const PORT_KIND_POOL: [PortKind; 9] = [
    PortKind::Generic,
    PortKind::Generic,
    PortKind::Generic,
    PortKind::Generic,
    PortKind::Brick,
    PortKind::Lumber,
    PortKind::Ore,
    PortKind::Grain,
    PortKind::Wool,
];

//  which positions of the 12-hex outer ring carry a port, in ring order
const PORT_RING_SLOTS: [usize; 9] = [0, 1, 3, 4, 6, 7, 9, 10, 11];

pub fn generate_board<R: Rng>(rng: &mut R) -> Board {
    let coords = HexKey::origin().spiral(BOARD_RADIUS);
    let mut terrain: Vec<Terrain> = TERRAIN_POOL.to_vec();
    let mut numbers: Vec<u8> = NUMBER_POOL.to_vec();

    let mut tiles = BTreeMap::new();
    for attempt in 1..=MAX_SHUFFLE_ATTEMPTS {
        terrain.shuffle(rng);
        numbers.shuffle(rng);
        tiles = assign_tiles(&coords, &terrain, &numbers);
        if high_value_tokens_separated(&tiles) {
            break;
        }
        if attempt == MAX_SHUFFLE_ATTEMPTS {
            log::warn!(
                "board kept adjacent 6/8 tokens after {} shuffles; shipping degraded layout",
                MAX_SHUFFLE_ATTEMPTS
            );
        }
    }

    let robber_hex = tiles
        .values()
        .find(|t| t.terrain == Terrain::Desert)
        .map(|t| t.key)
        .expect("terrain pool always contains the desert");

    Board {
        ports: place_ports(rng),
        tiles,
        robber_hex,
    }
}

fn assign_tiles(coords: &[HexKey], terrain: &[Terrain], numbers: &[u8]) -> BTreeMap<String, HexTile> {
    let mut tiles = BTreeMap::new();
    let mut number_index = 0;
    for (i, key) in coords.iter().enumerate() {
        let token = if terrain[i] == Terrain::Desert {
            None
        } else {
            let token = numbers[number_index];
            number_index += 1;
            Some(token)
        };
        let tile = HexTile::new(*key, terrain[i], token);
        tiles.insert(tile.id.clone(), tile);
    }
    tiles
}

fn high_value_tokens_separated(tiles: &BTreeMap<String, HexTile>) -> bool {
    let is_high = |t: &HexTile| matches!(t.number_token, Some(6) | Some(8));
    for tile in tiles.values().filter(|t| is_high(t)) {
        for neighbor in tile.key.neighbors() {
            if let Some(other) = tiles.get(&neighbor.id()) {
                if is_high(other) {
                    return false;
                }
            }
        }
    }
    true
}

pub(crate) fn place_ports<R: Rng>(rng: &mut R) -> Vec<Port> {
    let ring = HexKey::origin().ring(BOARD_RADIUS);
    let mut kinds: Vec<PortKind> = PORT_KIND_POOL.to_vec();
    kinds.shuffle(rng);

    PORT_RING_SLOTS
        .iter()
        .zip(kinds)
        .enumerate()
        .map(|(i, (slot, kind))| {
            let anchor = ring[*slot];
            let edge = anchor.edge(outward_direction(&anchor));
            Port {
                id: format!("port_{}", i),
                kind,
                vertices: edge.endpoints(),
                angle: bearing_degrees(&anchor),
            }
        })
        .collect()
}

//  the coastal direction of a ring hex: the first neighbor direction that
//  moves farther from the center
fn outward_direction(hex: &HexKey) -> Direction {
    let center = HexKey::origin();
    let own = hex.distance(&center);
    let mut best = Direction::East;
    let mut best_dist = own;
    for dir in Direction::iter() {
        let dist = hex.neighbor(dir).distance(&center);
        if dist > best_dist {
            best_dist = dist;
            best = dir;
        }
    }
    best
}

fn bearing_degrees(hex: &HexKey) -> f32 {
    //  pointy-top axial to planar
    let x = 3f64.sqrt() * (hex.q as f64 + hex.r as f64 / 2.0);
    let y = 1.5 * hex.r as f64;
    y.atan2(x).to_degrees() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn counts<T: Eq + std::hash::Hash>(items: impl Iterator<Item = T>) -> std::collections::HashMap<T, usize> {
        let mut map = std::collections::HashMap::new();
        for item in items {
            *map.entry(item).or_insert(0) += 1;
        }
        map
    }

    #[test]
    fn test_canonical_terrain_distribution() {
        let mut rng = StdRng::seed_from_u64(42);
        let board = generate_board(&mut rng);
        assert_eq!(board.tiles.len(), 19);

        let by_terrain = counts(board.tiles.values().map(|t| t.terrain));
        assert_eq!(by_terrain[&Terrain::Desert], 1);
        assert_eq!(by_terrain[&Terrain::Hills], 3);
        assert_eq!(by_terrain[&Terrain::Mountains], 3);
        assert_eq!(by_terrain[&Terrain::Forest], 4);
        assert_eq!(by_terrain[&Terrain::Pasture], 4);
        assert_eq!(by_terrain[&Terrain::Fields], 4);
    }

    #[test]
    fn test_canonical_number_distribution() {
        let mut rng = StdRng::seed_from_u64(43);
        let board = generate_board(&mut rng);

        let tokens = counts(board.tiles.values().filter_map(|t| t.number_token));
        assert_eq!(tokens[&2], 1);
        assert_eq!(tokens[&12], 1);
        for value in [3u8, 4, 5, 6, 8, 9, 10, 11] {
            assert_eq!(tokens[&value], 2, "token {}", value);
        }
        assert!(!tokens.contains_key(&7));
    }

    #[test]
    fn test_desert_has_no_token_and_hosts_robber() {
        let mut rng = StdRng::seed_from_u64(44);
        let board = generate_board(&mut rng);
        let desert = board
            .tiles
            .values()
            .find(|t| t.terrain == Terrain::Desert)
            .unwrap();
        assert!(desert.number_token.is_none());
        assert_eq!(board.robber_hex, desert.key);
        //  every non-desert tile carries a token
        assert!(board
            .tiles
            .values()
            .filter(|t| t.terrain != Terrain::Desert)
            .all(|t| t.number_token.is_some()));
    }

    #[test]
    fn test_high_value_tokens_separated_across_seeds() {
        for seed in 0..25u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let board = generate_board(&mut rng);
            assert!(
                high_value_tokens_separated(&board.tiles),
                "seed {} produced adjacent 6/8",
                seed
            );
        }
    }

    #[test]
    fn test_nine_ports_with_canonical_mix() {
        let mut rng = StdRng::seed_from_u64(45);
        let board = generate_board(&mut rng);
        assert_eq!(board.ports.len(), 9);

        let by_kind = counts(board.ports.iter().map(|p| p.kind));
        assert_eq!(by_kind[&PortKind::Generic], 4);
        for kind in [
            PortKind::Brick,
            PortKind::Lumber,
            PortKind::Ore,
            PortKind::Grain,
            PortKind::Wool,
        ] {
            assert_eq!(by_kind[&kind], 1);
        }

        //  port vertices are coastal board vertices, and no vertex carries two ports
        let mut seen = std::collections::HashSet::new();
        for port in &board.ports {
            for v in &port.vertices {
                assert!(board.vertex_on_board(v));
                assert!(board.land_tiles_at(v).len() < 3, "port vertex must be coastal");
                assert!(seen.insert(*v), "vertex {} carries two ports", v);
            }
        }
    }

    #[test]
    fn test_same_seed_same_board() {
        let board_a = generate_board(&mut StdRng::seed_from_u64(99));
        let board_b = generate_board(&mut StdRng::seed_from_u64(99));
        assert_eq!(board_a, board_b);
    }
}
