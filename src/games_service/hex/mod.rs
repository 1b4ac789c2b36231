pub mod edge_key;
pub mod hex_key;
pub mod vertex_key;

pub use edge_key::EdgeKey;
pub use hex_key::{Corner, Direction, HexKey};
pub use vertex_key::VertexKey;
