use crate::games_service::hex::{EdgeKey, VertexKey};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

//  at most one building per vertex and one road per edge, across all
//  players; the GameState tables keyed by id own those invariants

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    Settlement,
    City,
}

impl BuildingKind {
    pub fn victory_points(&self) -> u32 {
        match self {
            BuildingKind::Settlement => 1,
            BuildingKind::City => 2,
        }
    }

    /// Cards produced per adjacent hex on a matching roll.
    pub fn production(&self) -> u32 {
        match self {
            BuildingKind::Settlement => 1,
            BuildingKind::City => 2,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub vertex: VertexKey,
    pub player_id: String,
    pub kind: BuildingKind,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Road {
    pub edge: EdgeKey,
    pub player_id: String,
}
