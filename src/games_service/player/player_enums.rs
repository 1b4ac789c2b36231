use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

//  one color per seat; uniqueness is enforced by the lobby
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    Red,
    Blue,
    Orange,
    White,
}
