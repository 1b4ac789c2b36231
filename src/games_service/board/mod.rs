pub mod board;
pub mod generator;
pub mod port;
pub mod tile;

pub use board::Board;
pub use generator::generate_board;
pub use port::{Port, PortKind};
pub use tile::{HexTile, Terrain};
