use crate::games_service::game::resources::Resource;
use crate::games_service::hex::VertexKey;
use serde::{Deserialize, Serialize};

/**
 *  maritime trade sites on the coast.  a player "owns" a port while one of
 *  their buildings sits on either of its two vertices.
 */

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    Generic,
    Brick,
    Lumber,
    Ore,
    Grain,
    Wool,
}

impl PortKind {
    pub fn ratio(&self) -> u32 {
        match self {
            PortKind::Generic => 3,
            _ => 2,
        }
    }

    /// True when this port trades the given resource at its ratio.
    pub fn accepts(&self, resource: Resource) -> bool {
        match self {
            PortKind::Generic => true,
            PortKind::Brick => resource == Resource::Brick,
            PortKind::Lumber => resource == Resource::Lumber,
            PortKind::Ore => resource == Resource::Ore,
            PortKind::Grain => resource == Resource::Grain,
            PortKind::Wool => resource == Resource::Wool,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    pub id: String,
    pub kind: PortKind,
    pub vertices: [VertexKey; 2],
    //  bearing of the port's anchor hex from the board center, for the client
    pub angle: f32,
}

impl Port {
    pub fn touches(&self, vertex: &VertexKey) -> bool {
        self.vertices.contains(vertex)
    }
}
