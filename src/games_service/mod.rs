pub mod board;
pub mod buildings;
pub mod catanws;
pub mod dev_cards;
pub mod game;
pub mod game_container;
pub mod hex;
pub mod lobby;
pub mod player;
pub mod rules;
pub mod storage;
