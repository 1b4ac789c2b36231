#![allow(dead_code)]

use crate::shared::shared_models::{GameError, ServiceError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::Error as SerdeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/**
 *  axial coordinates for pointy-top hexes.  q runs east, r runs south-east;
 *  the cube s coordinate is derived (s = -q - r).  everything above this
 *  module addresses hexes by the derived string id "hex_q_r", never by
 *  coordinates -- the id is the wire format and the state key.
 */

//  fixed neighbor order.  direction indices on the wire map to this order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Copy, EnumIter)]
pub enum Direction {
    East,
    NorthEast,
    NorthWest,
    West,
    SouthWest,
    SouthEast,
}

static DIRECTIONS: Lazy<HashMap<Direction, HexKey>> = Lazy::new(|| {
    let mut directions = HashMap::new();
    directions.insert(Direction::East, HexKey::new(1, 0));
    directions.insert(Direction::NorthEast, HexKey::new(1, -1));
    directions.insert(Direction::NorthWest, HexKey::new(0, -1));
    directions.insert(Direction::West, HexKey::new(-1, 0));
    directions.insert(Direction::SouthWest, HexKey::new(-1, 1));
    directions.insert(Direction::SouthEast, HexKey::new(0, 1));
    directions
});

impl Direction {
    pub fn delta(&self) -> HexKey {
        *DIRECTIONS.get(self).expect("direction table is total")
    }

    pub fn from_index(index: usize) -> Result<Self, ServiceError> {
        Direction::iter().nth(index).ok_or_else(|| {
            ServiceError::new(
                GameError::InvalidDirection,
                &format!("direction index {} out of range", index),
            )
        })
    }
}

//  the six corners of a pointy-top hex.  each corner is flanked by two
//  neighbor directions; the corner vertex is shared with those two neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Corner {
    North,
    NorthEast,
    SouthEast,
    South,
    SouthWest,
    NorthWest,
}

impl Corner {
    pub fn flanking(&self) -> (Direction, Direction) {
        match self {
            Corner::North => (Direction::NorthEast, Direction::NorthWest),
            Corner::NorthEast => (Direction::East, Direction::NorthEast),
            Corner::SouthEast => (Direction::East, Direction::SouthEast),
            Corner::South => (Direction::SouthEast, Direction::SouthWest),
            Corner::SouthWest => (Direction::West, Direction::SouthWest),
            Corner::NorthWest => (Direction::West, Direction::NorthWest),
        }
    }
}

static HEX_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^hex_(-?\d+)_(-?\d+)$").expect("hex id regex compiles"));

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, PartialOrd, Ord)]
pub struct HexKey {
    pub q: i32,
    pub r: i32,
}

impl HexKey {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    pub fn id(&self) -> String {
        format!("hex_{}_{}", self.q, self.r)
    }

    pub fn from_id(id: &str) -> Result<Self, ServiceError> {
        let caps = HEX_ID_RE.captures(id).ok_or_else(|| ServiceError::bad_id(id))?;
        let q = caps[1].parse().map_err(|_| ServiceError::bad_id(id))?;
        let r = caps[2].parse().map_err(|_| ServiceError::bad_id(id))?;
        Ok(Self::new(q, r))
    }

    pub fn neighbor(&self, dir: Direction) -> Self {
        let delta = dir.delta();
        Self::new(self.q + delta.q, self.r + delta.r)
    }

    //  all six adjacent keys in the fixed direction order.  some of these may
    //  fall outside the board; callers look them up in the tile table.
    pub fn neighbors(&self) -> Vec<HexKey> {
        Direction::iter().map(|dir| self.neighbor(dir)).collect()
    }

    /// Nearest hex to fractional axial coordinates, via cube rounding:
    /// round all three cube components, then fix the one with the largest
    /// rounding error so q + r + s stays zero.  Used by clients translating
    /// pointer positions; kept here so both sides round identically.
    pub fn round(q: f64, r: f64) -> HexKey {
        let s = -q - r;
        let mut rq = q.round();
        let mut rr = r.round();
        let rs = s.round();

        let dq = (rq - q).abs();
        let dr = (rr - r).abs();
        let ds = (rs - s).abs();

        if dq > dr && dq > ds {
            rq = -rr - rs;
        } else if dr > ds {
            rr = -rq - rs;
        }
        HexKey::new(rq as i32, rr as i32)
    }

    pub fn distance(&self, other: &HexKey) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    pub fn is_adjacent(&self, other: &HexKey) -> bool {
        self.distance(other) == 1
    }

    /// The ring of hexes at exactly `radius` from self, in canonical order:
    /// start at self + East * radius, then walk NW, W, SW, SE, E, NE for
    /// `radius` steps each.
    pub fn ring(&self, radius: u32) -> Vec<HexKey> {
        if radius == 0 {
            return vec![*self];
        }
        let walk = [
            Direction::NorthWest,
            Direction::West,
            Direction::SouthWest,
            Direction::SouthEast,
            Direction::East,
            Direction::NorthEast,
        ];
        let mut results = Vec::with_capacity(6 * radius as usize);
        let mut hex = HexKey::new(self.q + radius as i32, self.r);
        for dir in walk {
            for _ in 0..radius {
                results.push(hex);
                hex = hex.neighbor(dir);
            }
        }
        results
    }

    /// Center followed by rings 1..=radius; 19 hexes for radius 2.
    pub fn spiral(&self, radius: u32) -> Vec<HexKey> {
        let mut results = vec![*self];
        for r in 1..=radius {
            results.extend(self.ring(r));
        }
        results
    }

    /// The vertex at one of this hex's six corners, identified by the three
    /// hexes that geometrically meet there (off-board neighbors included).
    pub fn vertex(&self, corner: Corner) -> super::VertexKey {
        let (a, b) = corner.flanking();
        super::VertexKey::from_hexes(*self, self.neighbor(a), self.neighbor(b))
    }

    pub fn vertices(&self) -> Vec<super::VertexKey> {
        Corner::iter().map(|c| self.vertex(c)).collect()
    }

    pub fn edge(&self, dir: Direction) -> super::EdgeKey {
        super::EdgeKey::from_hexes(*self, self.neighbor(dir))
    }
}

impl fmt::Display for HexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

//  hex keys serialize as their string id so they can key JSON maps and ride
//  the wire unchanged
impl Serialize for HexKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.id())
    }
}

impl<'de> Deserialize<'de> for HexKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = String::deserialize(deserializer)?;
        HexKey::from_id(&id).map_err(D::Error::custom)
    }
}
