//! Hex grid query layer
//!
//! Distance, neighbor and movement-cost primitives over axial coordinates.

pub mod hex;
pub mod map;
pub mod terrain;
pub mod tile;
pub mod yields;

pub use hex::HexCoord;
pub use map::{GridProvider, WorldGrid};
pub use terrain::{
    Feature, Improvement, ResourceClass, ResourceKind, Terrain, ROAD_BUILD_TURNS, ROAD_MOVEMENT_COST,
};
pub use tile::Tile;
pub use yields::Yields;
