pub mod game_container;
pub mod game_messages;

pub use game_container::{GameHandle, SessionManager};
