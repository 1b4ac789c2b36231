use super::game_enums::{GamePhase, GameStatus, SetupPiece, TurnPhase};
use super::resources::ResourceCount;
use crate::games_service::board::Board;
use crate::games_service::buildings::{Building, Road};
use crate::games_service::hex::{EdgeKey, VertexKey};
use crate::games_service::player::PlayerState;
use crate::shared::shared_models::ServiceError;
use crate::shared::utility::{get_id, now_ms};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/**
 *  the authoritative state of one game.  every map is keyed by a derived
 *  string id and every map is a BTreeMap so snapshots serialize with stable
 *  key order.  the rules engine works on clones of this struct; the game
 *  actor swaps the clone in after a successful command.
 */

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetupState {
    //  position within the current setup round, 0-based
    pub index: usize,
    pub expecting: SetupPiece,
    //  the settlement placed in this player's current setup step; the road
    //  that follows must touch it
    pub last_settlement: Option<VertexKey>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradeProposal {
    pub id: String,
    pub proposer_id: String,
    //  None is an open offer any other player may accept
    pub target_id: Option<String>,
    pub offering: ResourceCount,
    pub requesting: ResourceCount,
    pub created_at: u64,
}

pub const TRADE_EXPIRY_SECONDS: u64 = 60;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub id: String,
    pub code: String,
    pub status: GameStatus,
    pub phase: GamePhase,
    pub board: Board,
    //  seating order; turn_order is derived from the opening rolls
    pub players: Vec<PlayerState>,
    pub buildings: BTreeMap<String, Building>,
    pub roads: BTreeMap<String, Road>,
    pub turn_order: Vec<String>,
    pub current_player_index: usize,
    pub turn_number: u32,
    pub turn_phase: TurnPhase,
    pub last_dice_roll: Option<(u8, u8)>,
    pub dev_card_deck_count: usize,
    pub bank: ResourceCount,
    //  player id -> opening roll total, filled during roll_for_order
    pub roll_for_order_state: BTreeMap<String, u8>,
    pub setup_state: Option<SetupState>,
    pub active_trade: Option<TradeProposal>,
    //  player id -> cards still owed; non-empty exactly while turn_phase
    //  is Discard
    pub pending_discards: BTreeMap<String, u32>,
    pub road_building_roads_placed: u8,
    pub longest_road_holder: Option<String>,
    pub longest_road_length: u32,
    pub largest_army_holder: Option<String>,
    pub largest_army_size: u32,
    pub winner_id: Option<String>,
    pub created_at: u64,
    pub started_at: Option<u64>,
    pub finished_at: Option<u64>,
}

impl GameState {
    pub fn new(code: &str, players: Vec<PlayerState>, board: Board, deck_count: usize) -> Self {
        Self {
            id: get_id(),
            code: code.to_owned(),
            status: GameStatus::Setup,
            phase: GamePhase::RollForOrder,
            board,
            players,
            buildings: BTreeMap::new(),
            roads: BTreeMap::new(),
            turn_order: Vec::new(),
            current_player_index: 0,
            turn_number: 0,
            turn_phase: TurnPhase::PreRoll,
            last_dice_roll: None,
            dev_card_deck_count: deck_count,
            bank: ResourceCount::full_bank(),
            roll_for_order_state: BTreeMap::new(),
            setup_state: None,
            active_trade: None,
            pending_discards: BTreeMap::new(),
            road_building_roads_placed: 0,
            longest_road_holder: None,
            longest_road_length: 0,
            largest_army_holder: None,
            largest_army_size: 0,
            winner_id: None,
            created_at: now_ms(),
            started_at: Some(now_ms()),
            finished_at: None,
        }
    }

    pub fn player(&self, player_id: &str) -> Result<&PlayerState, ServiceError> {
        self.players
            .iter()
            .find(|p| p.id == player_id)
            .ok_or_else(|| ServiceError::not_in_game(player_id))
    }

    pub fn player_mut(&mut self, player_id: &str) -> Result<&mut PlayerState, ServiceError> {
        self.players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or_else(|| ServiceError::not_in_game(player_id))
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    /// The id of the player whose turn it is.  During setup the snake order
    /// is tracked by setup_state; during roll_for_order there is no current
    /// player.
    pub fn current_player_id(&self) -> Option<&str> {
        match self.phase {
            GamePhase::RollForOrder => None,
            GamePhase::SetupFirst => {
                let setup = self.setup_state.as_ref()?;
                self.turn_order.get(setup.index).map(String::as_str)
            }
            GamePhase::SetupSecond => {
                let setup = self.setup_state.as_ref()?;
                let n = self.turn_order.len();
                self.turn_order.get(n - 1 - setup.index).map(String::as_str)
            }
            GamePhase::Playing | GamePhase::Finished => self
                .turn_order
                .get(self.current_player_index)
                .map(String::as_str),
        }
    }

    pub fn is_current_player(&self, player_id: &str) -> bool {
        self.current_player_id() == Some(player_id)
    }

    pub fn building_at(&self, vertex: &VertexKey) -> Option<&Building> {
        self.buildings.get(&vertex.id())
    }

    pub fn road_at(&self, edge: &EdgeKey) -> Option<&Road> {
        self.roads.get(&edge.id())
    }

    /// True when the player owns a road touching the vertex.
    pub fn player_has_road_at(&self, player_id: &str, vertex: &VertexKey) -> bool {
        vertex
            .incident_edges()
            .iter()
            .filter_map(|e| self.road_at(e))
            .any(|r| r.player_id == player_id)
    }

    /// Owners of buildings on the given hex's corners, excluding `except`.
    pub fn building_owners_on_hex(&self, hex: &crate::games_service::hex::HexKey, except: &str) -> Vec<String> {
        let mut owners: Vec<String> = self
            .board
            .tiles
            .get(&hex.id())
            .map(|tile| {
                tile.key
                    .vertices()
                    .iter()
                    .filter_map(|v| self.building_at(v))
                    .map(|b| b.player_id.clone())
                    .filter(|id| id != except)
                    .collect()
            })
            .unwrap_or_default();
        owners.sort();
        owners.dedup();
        owners
    }
}
