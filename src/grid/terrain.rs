//! Terrain categories, features, resources and improvements

use serde::{Deserialize, Serialize};

use crate::grid::yields::Yields;

/// Base terrain category of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Terrain {
    #[default]
    Grassland,
    Plains,
    Desert,
    Tundra,
    Snow,
    Hills,
    Mountains, // Impassable land
    Coast,     // Shallow water
    Lake,      // Shallow water
    Ocean,     // Deep water, impassable to land units
}

impl Terrain {
    /// Base food / production / gold
    pub fn yields(&self) -> Yields {
        match self {
            Terrain::Grassland => Yields::new(2.0, 0.0, 0.0),
            Terrain::Plains => Yields::new(1.0, 1.0, 0.0),
            Terrain::Desert => Yields::new(0.0, 0.0, 0.0),
            Terrain::Tundra => Yields::new(1.0, 0.0, 0.0),
            Terrain::Snow => Yields::new(0.0, 0.0, 0.0),
            Terrain::Hills => Yields::new(0.0, 2.0, 0.0),
            Terrain::Mountains => Yields::new(0.0, 0.0, 0.0),
            Terrain::Coast => Yields::new(1.0, 0.0, 1.0),
            Terrain::Lake => Yields::new(2.0, 0.0, 1.0),
            Terrain::Ocean => Yields::new(1.0, 0.0, 0.0),
        }
    }

    /// Cost to enter, before features and roads
    pub fn movement_cost(&self) -> f32 {
        match self {
            Terrain::Hills => 2.0,
            _ => 1.0,
        }
    }

    pub fn is_water(&self) -> bool {
        matches!(self, Terrain::Coast | Terrain::Lake | Terrain::Ocean)
    }

    pub fn is_deep_water(&self) -> bool {
        matches!(self, Terrain::Ocean)
    }

    /// Impassable for land units
    pub fn is_impassable(&self) -> bool {
        matches!(self, Terrain::Mountains | Terrain::Ocean)
    }

    /// Additive defense bonus (0.25 = +25%)
    pub fn defense_bonus(&self) -> f32 {
        match self {
            Terrain::Hills => 0.25,
            _ => 0.0,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'g' => Some(Terrain::Grassland),
            'p' => Some(Terrain::Plains),
            'd' => Some(Terrain::Desert),
            't' => Some(Terrain::Tundra),
            's' => Some(Terrain::Snow),
            'h' => Some(Terrain::Hills),
            'm' => Some(Terrain::Mountains),
            'c' => Some(Terrain::Coast),
            'l' => Some(Terrain::Lake),
            'o' => Some(Terrain::Ocean),
            _ => None,
        }
    }
}

/// Optional vegetation/wetland layered over the terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    Forest,
    Jungle,
    Marsh,
}

impl Feature {
    /// Modifies the terrain's yields; results are floored at zero by the tile
    pub fn yield_modifier(&self) -> Yields {
        match self {
            Feature::Forest => Yields::new(0.0, 1.0, 0.0),
            Feature::Jungle => Yields::new(1.0, -1.0, 0.0),
            Feature::Marsh => Yields::new(0.0, -1.0, 0.0),
        }
    }

    pub fn defense_bonus(&self) -> f32 {
        match self {
            Feature::Forest => 0.25,
            Feature::Jungle => 0.25,
            Feature::Marsh => -0.15,
        }
    }

    pub fn movement_cost(&self) -> f32 {
        2.0
    }
}

/// Resource classes gate different things: strategic resources gate units,
/// luxuries feed happiness, bonus resources only add yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceClass {
    Bonus,
    Strategic,
    Luxury,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Wheat,
    Cattle,
    Fish,
    Iron,
    Horses,
    Silk,
    Gems,
    Wine,
    Spices,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 9] = [
        ResourceKind::Wheat,
        ResourceKind::Cattle,
        ResourceKind::Fish,
        ResourceKind::Iron,
        ResourceKind::Horses,
        ResourceKind::Silk,
        ResourceKind::Gems,
        ResourceKind::Wine,
        ResourceKind::Spices,
    ];

    pub fn class(&self) -> ResourceClass {
        match self {
            ResourceKind::Wheat | ResourceKind::Cattle | ResourceKind::Fish => ResourceClass::Bonus,
            ResourceKind::Iron | ResourceKind::Horses => ResourceClass::Strategic,
            ResourceKind::Silk | ResourceKind::Gems | ResourceKind::Wine | ResourceKind::Spices => {
                ResourceClass::Luxury
            }
        }
    }

    pub fn yields(&self) -> Yields {
        match self {
            ResourceKind::Wheat | ResourceKind::Cattle => Yields::new(1.0, 0.0, 0.0),
            ResourceKind::Fish => Yields::new(2.0, 0.0, 0.0),
            ResourceKind::Iron | ResourceKind::Horses => Yields::new(0.0, 1.0, 0.0),
            ResourceKind::Silk | ResourceKind::Gems | ResourceKind::Wine | ResourceKind::Spices => {
                Yields::new(0.0, 0.0, 2.0)
            }
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| format!("{:?}", r).eq_ignore_ascii_case(name))
    }
}

/// Tile improvements built by workers (roads are tracked separately)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Improvement {
    Farm,
    Mine,
    Plantation,
}

impl Improvement {
    pub fn yields(&self) -> Yields {
        match self {
            Improvement::Farm => Yields::new(1.0, 0.0, 0.0),
            Improvement::Mine => Yields::new(0.0, 1.0, 0.0),
            Improvement::Plantation => Yields::new(0.0, 0.0, 1.0),
        }
    }

    /// Worker turns needed to finish
    pub fn build_turns(&self) -> u32 {
        match self {
            Improvement::Farm => 5,
            Improvement::Mine => 6,
            Improvement::Plantation => 5,
        }
    }
}

/// Worker turns needed to lay a road
pub const ROAD_BUILD_TURNS: u32 = 3;

/// Movement cost of any road tile
pub const ROAD_MOVEMENT_COST: f32 = 0.5;
