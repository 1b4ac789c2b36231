#![allow(dead_code)]

use super::hex_key::HexKey;
use super::EdgeKey;
use crate::shared::shared_models::ServiceError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::Error as SerdeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/**
 *  a vertex (settlement/city site) is identified by the three hexes that
 *  geometrically meet at the corner, sorted by (q, r).  off-board hexes take
 *  part in the identity, which keeps coastal vertices unique without a
 *  separate coordinate scheme.  the id "v_<hex ids joined by _>" is the only
 *  form the protocol and state ever use.
 */

static VERTEX_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^v_(hex_-?\d+_-?\d+)_(hex_-?\d+_-?\d+)_(hex_-?\d+_-?\d+)$")
        .expect("vertex id regex compiles")
});

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, PartialOrd, Ord)]
pub struct VertexKey {
    hexes: [HexKey; 3],
}

impl VertexKey {
    pub fn from_hexes(a: HexKey, b: HexKey, c: HexKey) -> Self {
        let mut hexes = [a, b, c];
        hexes.sort();
        Self { hexes }
    }

    pub fn hexes(&self) -> &[HexKey; 3] {
        &self.hexes
    }

    pub fn touches(&self, hex: &HexKey) -> bool {
        self.hexes.contains(hex)
    }

    pub fn id(&self) -> String {
        format!(
            "v_{}_{}_{}",
            self.hexes[0].id(),
            self.hexes[1].id(),
            self.hexes[2].id()
        )
    }

    pub fn from_id(id: &str) -> Result<Self, ServiceError> {
        let caps = VERTEX_ID_RE
            .captures(id)
            .ok_or_else(|| ServiceError::bad_id(id))?;
        let a = HexKey::from_id(&caps[1])?;
        let b = HexKey::from_id(&caps[2])?;
        let c = HexKey::from_id(&caps[3])?;
        //  the three members must pairwise share an edge and arrive sorted,
        //  otherwise the string does not name a real corner
        if !a.is_adjacent(&b) || !a.is_adjacent(&c) || !b.is_adjacent(&c) {
            return Err(ServiceError::bad_id(id));
        }
        let key = Self::from_hexes(a, b, c);
        if key.id() != id {
            return Err(ServiceError::bad_id(id));
        }
        Ok(key)
    }

    /// The three edges meeting at this vertex.
    pub fn incident_edges(&self) -> [EdgeKey; 3] {
        let [a, b, c] = self.hexes;
        [
            EdgeKey::from_hexes(a, b),
            EdgeKey::from_hexes(a, c),
            EdgeKey::from_hexes(b, c),
        ]
    }

    /// The three vertices one road-length away (edge-connected).
    pub fn adjacent_vertices(&self) -> [VertexKey; 3] {
        let [a, b, c] = self.hexes;
        [
            Self::across(a, b, c),
            Self::across(a, c, b),
            Self::across(b, c, a),
        ]
    }

    //  the vertex on the far side of edge (x, y) from z: the other hex
    //  adjacent to both x and y
    fn across(x: HexKey, y: HexKey, z: HexKey) -> VertexKey {
        let other = x
            .neighbors()
            .into_iter()
            .find(|h| h.is_adjacent(&y) && *h != z)
            .expect("two adjacent hexes always share exactly two neighbors");
        VertexKey::from_hexes(x, y, other)
    }
}

impl fmt::Display for VertexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl Serialize for VertexKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.id())
    }
}

impl<'de> Deserialize<'de> for VertexKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = String::deserialize(deserializer)?;
        VertexKey::from_id(&id).map_err(D::Error::custom)
    }
}
