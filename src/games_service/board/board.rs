#![allow(dead_code)]

use super::port::Port;
use super::tile::HexTile;
use crate::games_service::hex::{EdgeKey, HexKey, VertexKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/**
 *  the board is flat tables keyed by derived string ids -- no pointer graph.
 *  vertex and edge adjacency is recomputed from the keys on demand; at 19
 *  tiles the recompute is cheaper than keeping caches coherent.
 */
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub tiles: BTreeMap<String, HexTile>,
    pub ports: Vec<Port>,
    pub robber_hex: HexKey,
}

impl Board {
    pub fn tile(&self, key: &HexKey) -> Option<&HexTile> {
        self.tiles.get(&key.id())
    }

    pub fn contains(&self, key: &HexKey) -> bool {
        self.tiles.contains_key(&key.id())
    }

    /// A vertex is on the board when at least one of its member hexes is a
    /// land tile.
    pub fn vertex_on_board(&self, vertex: &VertexKey) -> bool {
        vertex.hexes().iter().any(|h| self.contains(h))
    }

    pub fn edge_on_board(&self, edge: &EdgeKey) -> bool {
        edge.hexes().iter().any(|h| self.contains(h))
    }

    /// The land tiles touching a vertex (1..=3 of them).
    pub fn land_tiles_at(&self, vertex: &VertexKey) -> Vec<&HexTile> {
        vertex.hexes().iter().filter_map(|h| self.tile(h)).collect()
    }

    pub fn tiles_with_token(&self, token: u8) -> Vec<&HexTile> {
        self.tiles
            .values()
            .filter(|t| t.number_token == Some(token))
            .collect()
    }

    /// Every distinct vertex of the board, for placement scans.
    pub fn all_vertices(&self) -> BTreeSet<VertexKey> {
        self.tiles
            .values()
            .flat_map(|t| t.key.vertices())
            .collect()
    }

    pub fn port_at_vertex(&self, vertex: &VertexKey) -> Option<&Port> {
        self.ports.iter().find(|p| p.touches(vertex))
    }
}

#[cfg(test)]
mod tests {
    use super::super::generator::generate_board;
    use crate::games_service::hex::{Direction, HexKey, VertexKey};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_vertex_and_edge_membership() {
        let mut rng = StdRng::seed_from_u64(7);
        let board = generate_board(&mut rng);

        let center = HexKey::origin();
        assert!(board.contains(&center));
        for v in center.vertices() {
            assert!(board.vertex_on_board(&v));
            assert_eq!(board.land_tiles_at(&v).len(), 3);
        }

        //  a corner made only of far-away hexes is off the board
        let far = HexKey::new(5, 5);
        let off = VertexKey::from_hexes(
            far,
            far.neighbor(Direction::East),
            far.neighbor(Direction::NorthEast),
        );
        assert!(!board.vertex_on_board(&off));
    }

    #[test]
    fn test_all_vertices_count() {
        //  a radius-2 board has 54 distinct corners
        let mut rng = StdRng::seed_from_u64(7);
        let board = generate_board(&mut rng);
        assert_eq!(board.all_vertices().len(), 54);
    }
}
