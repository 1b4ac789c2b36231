use super::hex_key::HexKey;
use super::VertexKey;
use crate::shared::shared_models::ServiceError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::Error as SerdeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/**
 *  an edge (road site) is the sorted pair of hexes that share it.  same
 *  identity scheme as vertices: the derived id "e_<pair joined by _>" is the
 *  only addressing the protocol and state use.
 */

static EDGE_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^e_(hex_-?\d+_-?\d+)_(hex_-?\d+_-?\d+)$").expect("edge id regex compiles")
});

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, PartialOrd, Ord)]
pub struct EdgeKey {
    hexes: [HexKey; 2],
}

impl EdgeKey {
    pub fn from_hexes(a: HexKey, b: HexKey) -> Self {
        let mut hexes = [a, b];
        hexes.sort();
        Self { hexes }
    }

    pub fn hexes(&self) -> &[HexKey; 2] {
        &self.hexes
    }

    pub fn id(&self) -> String {
        format!("e_{}_{}", self.hexes[0].id(), self.hexes[1].id())
    }

    pub fn from_id(id: &str) -> Result<Self, ServiceError> {
        let caps = EDGE_ID_RE
            .captures(id)
            .ok_or_else(|| ServiceError::bad_id(id))?;
        let a = HexKey::from_id(&caps[1])?;
        let b = HexKey::from_id(&caps[2])?;
        if !a.is_adjacent(&b) {
            return Err(ServiceError::bad_id(id));
        }
        let key = Self::from_hexes(a, b);
        if key.id() != id {
            return Err(ServiceError::bad_id(id));
        }
        Ok(key)
    }

    /// The two vertices this edge runs between: the two corners shared by
    /// both member hexes.
    pub fn endpoints(&self) -> [VertexKey; 2] {
        let [a, b] = self.hexes;
        let mut commons = a
            .neighbors()
            .into_iter()
            .filter(|h| h.is_adjacent(&b))
            .map(|h| VertexKey::from_hexes(a, b, h));
        let first = commons.next().expect("adjacent hexes share two neighbors");
        let second = commons.next().expect("adjacent hexes share two neighbors");
        [first, second]
    }

    /// The four edges sharing exactly one endpoint with this one.
    pub fn adjacent_edges(&self) -> Vec<EdgeKey> {
        self.endpoints()
            .iter()
            .flat_map(|v| v.incident_edges())
            .filter(|e| e != self)
            .collect()
    }

    pub fn touches(&self, vertex: &VertexKey) -> bool {
        self.endpoints().contains(vertex)
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl Serialize for EdgeKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.id())
    }
}

impl<'de> Deserialize<'de> for EdgeKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = String::deserialize(deserializer)?;
        EdgeKey::from_id(&id).map_err(D::Error::custom)
    }
}
