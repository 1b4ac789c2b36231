use super::player_enums::PlayerColor;
use crate::games_service::dev_cards::DevCard;
use crate::games_service::game::resources::ResourceCount;
use crate::games_service::hex::{EdgeKey, VertexKey};
use serde::{Deserialize, Serialize};

/**
 *  everything the server tracks per seat.  placements are stored as key
 *  lists; the authoritative building/road tables live on GameState so the
 *  one-per-vertex and one-per-edge invariants have a single owner.
 */

pub const MAX_SETTLEMENTS: usize = 5;
pub const MAX_CITIES: usize = 4;
pub const MAX_ROADS: usize = 15;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub color: PlayerColor,
    pub resources: ResourceCount,
    pub dev_cards: Vec<DevCard>,
    pub settlements: Vec<VertexKey>,
    pub cities: Vec<VertexKey>,
    pub roads: Vec<EdgeKey>,
    pub knights_played: u32,
    pub longest_road_length: u32,
    pub has_longest_road: bool,
    pub has_largest_army: bool,
    pub public_victory_points: u32,
    //  the turn on which this player last played a dev card (once per turn)
    pub dev_card_played_on_turn: Option<u32>,
    pub is_connected: bool,
}

impl PlayerState {
    pub fn new(id: &str, user_id: &str, username: &str, color: PlayerColor) -> Self {
        Self {
            id: id.to_owned(),
            user_id: user_id.to_owned(),
            username: username.to_owned(),
            color,
            resources: ResourceCount::new(),
            dev_cards: Vec::new(),
            settlements: Vec::new(),
            cities: Vec::new(),
            roads: Vec::new(),
            knights_played: 0,
            longest_road_length: 0,
            has_longest_road: false,
            has_largest_army: false,
            public_victory_points: 0,
            dev_card_played_on_turn: None,
            is_connected: true,
        }
    }

    pub fn hand_size(&self) -> u32 {
        self.resources.total()
    }

    pub fn hidden_victory_points(&self) -> u32 {
        self.dev_cards
            .iter()
            .filter(|c| c.kind == crate::games_service::dev_cards::DevCardKind::VictoryPoint)
            .count() as u32
    }

    /// Public points plus hidden victory-point cards; the winner check runs
    /// against this total.
    pub fn total_victory_points(&self) -> u32 {
        self.public_victory_points + self.hidden_victory_points()
    }

    pub fn settlements_left(&self) -> usize {
        MAX_SETTLEMENTS - self.settlements.len()
    }

    pub fn cities_left(&self) -> usize {
        MAX_CITIES - self.cities.len()
    }

    pub fn roads_left(&self) -> usize {
        MAX_ROADS - self.roads.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games_service::dev_cards::{DevCard, DevCardKind};

    fn test_player() -> PlayerState {
        PlayerState::new("p1", "u1", "alice", PlayerColor::Red)
    }

    #[test]
    fn test_hidden_vp_cards_count_toward_total() {
        let mut player = test_player();
        player.public_victory_points = 8;
        player.dev_cards.push(DevCard::new("d1", DevCardKind::VictoryPoint, 3));
        player.dev_cards.push(DevCard::new("d2", DevCardKind::Knight, 3));
        assert_eq!(player.hidden_victory_points(), 1);
        assert_eq!(player.total_victory_points(), 9);
    }

    #[test]
    fn test_piece_budgets() {
        let player = test_player();
        assert_eq!(player.settlements_left(), MAX_SETTLEMENTS);
        assert_eq!(player.cities_left(), MAX_CITIES);
        assert_eq!(player.roads_left(), MAX_ROADS);
    }
}
