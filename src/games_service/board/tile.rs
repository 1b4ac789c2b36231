use crate::games_service::game::resources::Resource;
use crate::games_service::hex::HexKey;
use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

//  terrain kinds are not the same as Resource because of the desert
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq, Hash, Copy, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Desert,
    Hills,
    Mountains,
    Forest,
    Pasture,
    Fields,
}

impl Terrain {
    pub fn produces(&self) -> Option<Resource> {
        match self {
            Terrain::Desert => None,
            Terrain::Hills => Some(Resource::Brick),
            Terrain::Mountains => Some(Resource::Ore),
            Terrain::Forest => Some(Resource::Lumber),
            Terrain::Pasture => Some(Resource::Wool),
            Terrain::Fields => Some(Resource::Grain),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HexTile {
    pub id: String,
    pub key: HexKey,
    pub terrain: Terrain,
    //  2..6 or 8..12; None exactly when the terrain is desert
    pub number_token: Option<u8>,
}

impl HexTile {
    pub fn new(key: HexKey, terrain: Terrain, number_token: Option<u8>) -> Self {
        Self {
            id: key.id(),
            key,
            terrain,
            number_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_desert_produces_nothing() {
        use strum::IntoEnumIterator;
        for terrain in Terrain::iter() {
            assert_eq!(terrain.produces().is_none(), terrain == Terrain::Desert);
        }
    }

    #[test]
    fn test_tile_serialization() {
        let tile = HexTile::new(HexKey::new(1, -1), Terrain::Forest, Some(8));
        let json = serde_json::to_string(&tile).unwrap();
        let back: HexTile = serde_json::from_str(&json).unwrap();
        assert_eq!(tile, back);
        assert_eq!(back.id, "hex_1_-1");
    }
}
