pub mod player;
pub mod player_enums;

pub use player::{PlayerState, MAX_CITIES, MAX_ROADS, MAX_SETTLEMENTS};
pub use player_enums::PlayerColor;
