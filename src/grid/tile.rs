//! A single tile of the world grid

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::types::{EmpireId, SettlementId};
use crate::grid::hex::HexCoord;
use crate::grid::terrain::{
    Feature, Improvement, ResourceClass, ResourceKind, Terrain, ROAD_MOVEMENT_COST,
};
use crate::grid::yields::Yields;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub coord: HexCoord,
    pub terrain: Terrain,
    pub feature: Option<Feature>,
    pub resource: Option<ResourceKind>,
    pub improvement: Option<Improvement>,
    pub road: bool,
    /// Owning empire (weak reference, the grid does not own empires)
    pub owner: Option<EmpireId>,
    pub settlement: Option<SettlementId>,
    /// Edge indices (see `HexCoord::DIRECTIONS`) that carry a river
    pub river_edges: BTreeSet<u8>,
    /// One-shot village reward still unclaimed
    pub village: bool,
}

impl Tile {
    pub fn new(coord: HexCoord, terrain: Terrain) -> Self {
        Self {
            coord,
            terrain,
            feature: None,
            resource: None,
            improvement: None,
            road: false,
            owner: None,
            settlement: None,
            river_edges: BTreeSet::new(),
            village: false,
        }
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.feature = Some(feature);
        self
    }

    pub fn with_resource(mut self, resource: ResourceKind) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn with_river(mut self, edge: u8) -> Self {
        self.river_edges.insert(edge % 6);
        self
    }

    pub fn with_village(mut self) -> Self {
        self.village = true;
        self
    }

    /// Food / production / gold this tile yields when worked
    pub fn yields(&self) -> Yields {
        let mut y = self.terrain.yields();
        if let Some(feature) = self.feature {
            y += feature.yield_modifier();
        }
        if let Some(resource) = self.resource {
            y += resource.yields();
        }
        if let Some(improvement) = self.improvement {
            y += improvement.yields();
        }
        if self.has_river() && !self.is_water() {
            y.gold += 1.0;
        }
        y.floored()
    }

    /// Cost for a unit to enter this tile
    pub fn movement_cost(&self) -> f32 {
        if self.road {
            return ROAD_MOVEMENT_COST;
        }
        let feature_cost = self.feature.map(|f| f.movement_cost()).unwrap_or(0.0);
        self.terrain.movement_cost().max(feature_cost).max(1.0)
    }

    pub fn has_river(&self) -> bool {
        !self.river_edges.is_empty()
    }

    pub fn is_water(&self) -> bool {
        self.terrain.is_water()
    }

    pub fn is_impassable(&self) -> bool {
        self.terrain.is_impassable()
    }

    /// Hills and dense vegetation count as rough ground for promotions
    pub fn is_rough(&self) -> bool {
        self.terrain == Terrain::Hills
            || matches!(self.feature, Some(Feature::Forest) | Some(Feature::Jungle))
    }

    pub fn is_open(&self) -> bool {
        !self.is_rough() && !self.is_water()
    }

    /// A settlement could be founded here (ignoring spacing)
    pub fn is_habitable(&self) -> bool {
        !self.is_water() && !self.is_impassable() && self.settlement.is_none()
    }

    /// Terrain plus feature defense bonus
    pub fn defense_bonus(&self) -> f32 {
        self.terrain.defense_bonus() + self.feature.map(|f| f.defense_bonus()).unwrap_or(0.0)
    }

    pub fn resource_class(&self) -> Option<ResourceClass> {
        self.resource.map(|r| r.class())
    }

    /// The improvement a worker would build here, if any
    pub fn suggested_improvement(&self) -> Option<Improvement> {
        if self.is_water() || self.is_impassable() {
            return None;
        }
        match self.resource {
            Some(ResourceKind::Iron) => return Some(Improvement::Mine),
            Some(r) if r.class() == ResourceClass::Luxury => return Some(Improvement::Plantation),
            _ => {}
        }
        if self.terrain == Terrain::Hills {
            return Some(Improvement::Mine);
        }
        if matches!(self.terrain, Terrain::Grassland | Terrain::Plains) && self.feature.is_none() {
            return Some(Improvement::Farm);
        }
        None
    }

    /// Not improved yet and something can be built
    pub fn is_improvable(&self) -> bool {
        self.improvement.is_none() && self.settlement.is_none() && self.suggested_improvement().is_some()
    }
}
