//! Buildings and world wonders

use serde::{Deserialize, Serialize};

use crate::grid::Yields;
use crate::rules::techs::TechId;
use crate::rules::units::GreatPersonKind;

/// Static properties shared by buildings and wonders
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingStats {
    pub name: &'static str,
    pub cost: f32,
    /// Gold per turn
    pub maintenance: f32,
    pub tech: Option<TechId>,
    pub requires: Option<BuildingKind>,
    pub yields: Yields,
    pub happiness: i32,
    /// Added to settlement defense strength
    pub defense: f32,
    /// Great-person points per turn
    pub great_person: Option<(GreatPersonKind, f32)>,
}

const fn stats(name: &'static str, cost: f32, maintenance: f32, tech: Option<TechId>) -> BuildingStats {
    BuildingStats {
        name,
        cost,
        maintenance,
        tech,
        requires: None,
        yields: Yields::ZERO,
        happiness: 0,
        defense: 0.0,
        great_person: None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    Monument,
    Granary,
    Library,
    Walls,
    Barracks,
    Market,
    Temple,
    Workshop,
    University,
    Observatory,
    Colosseum,
    Castle,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 12] = [
        BuildingKind::Monument,
        BuildingKind::Granary,
        BuildingKind::Library,
        BuildingKind::Walls,
        BuildingKind::Barracks,
        BuildingKind::Market,
        BuildingKind::Temple,
        BuildingKind::Workshop,
        BuildingKind::University,
        BuildingKind::Observatory,
        BuildingKind::Colosseum,
        BuildingKind::Castle,
    ];

    pub fn stats(&self) -> BuildingStats {
        match self {
            BuildingKind::Monument => BuildingStats {
                yields: Yields::ZERO.with_culture(2.0),
                great_person: Some((GreatPersonKind::Artist, 1.0)),
                ..stats("Monument", 40.0, 1.0, None)
            },
            BuildingKind::Granary => BuildingStats {
                yields: Yields::new(2.0, 0.0, 0.0),
                ..stats("Granary", 60.0, 1.0, Some(TechId::Pottery))
            },
            BuildingKind::Library => BuildingStats {
                yields: Yields::ZERO.with_science(2.0),
                great_person: Some((GreatPersonKind::Scientist, 1.0)),
                ..stats("Library", 75.0, 1.0, Some(TechId::Writing))
            },
            BuildingKind::Walls => BuildingStats {
                defense: 5.0,
                ..stats("Walls", 60.0, 1.0, Some(TechId::Masonry))
            },
            BuildingKind::Barracks => stats("Barracks", 60.0, 1.0, Some(TechId::BronzeWorking)),
            BuildingKind::Market => BuildingStats {
                yields: Yields::new(0.0, 0.0, 2.0),
                great_person: Some((GreatPersonKind::Merchant, 1.0)),
                ..stats("Market", 100.0, 0.0, Some(TechId::Currency))
            },
            BuildingKind::Temple => BuildingStats {
                requires: Some(BuildingKind::Monument),
                yields: Yields::ZERO.with_culture(1.0),
                happiness: 2,
                great_person: Some((GreatPersonKind::Artist, 1.0)),
                ..stats("Temple", 90.0, 2.0, Some(TechId::Philosophy))
            },
            BuildingKind::Workshop => BuildingStats {
                yields: Yields::new(0.0, 2.0, 0.0),
                great_person: Some((GreatPersonKind::Engineer, 1.0)),
                ..stats("Workshop", 100.0, 2.0, Some(TechId::Construction))
            },
            BuildingKind::University => BuildingStats {
                requires: Some(BuildingKind::Library),
                yields: Yields::ZERO.with_science(4.0),
                great_person: Some((GreatPersonKind::Scientist, 1.0)),
                ..stats("University", 160.0, 3.0, Some(TechId::Education))
            },
            BuildingKind::Observatory => BuildingStats {
                yields: Yields::ZERO.with_science(3.0),
                ..stats("Observatory", 150.0, 1.0, Some(TechId::Astronomy))
            },
            BuildingKind::Colosseum => BuildingStats {
                happiness: 3,
                ..stats("Colosseum", 100.0, 1.0, Some(TechId::Construction))
            },
            BuildingKind::Castle => BuildingStats {
                requires: Some(BuildingKind::Walls),
                defense: 7.0,
                ..stats("Castle", 160.0, 2.0, Some(TechId::Chivalry))
            },
        }
    }

    /// Buildings that produce science, in build order
    pub const SCIENCE: [BuildingKind; 3] = [BuildingKind::Library, BuildingKind::University, BuildingKind::Observatory];
}

/// One per game; the first empire to finish it claims it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WonderKind {
    Pyramids,
    Stonehenge,
    GreatLibrary,
    Colossus,
    HangingGardens,
    GreatWall,
}

impl WonderKind {
    pub const ALL: [WonderKind; 6] = [
        WonderKind::Pyramids,
        WonderKind::Stonehenge,
        WonderKind::GreatLibrary,
        WonderKind::Colossus,
        WonderKind::HangingGardens,
        WonderKind::GreatWall,
    ];

    pub fn stats(&self) -> BuildingStats {
        match self {
            WonderKind::Pyramids => BuildingStats {
                yields: Yields::new(0.0, 3.0, 0.0),
                great_person: Some((GreatPersonKind::Engineer, 2.0)),
                ..stats("Pyramids", 185.0, 0.0, Some(TechId::Masonry))
            },
            WonderKind::Stonehenge => BuildingStats {
                yields: Yields::ZERO.with_culture(4.0),
                happiness: 1,
                ..stats("Stonehenge", 185.0, 0.0, Some(TechId::Calendar))
            },
            WonderKind::GreatLibrary => BuildingStats {
                yields: Yields::ZERO.with_science(3.0),
                great_person: Some((GreatPersonKind::Scientist, 2.0)),
                ..stats("Great Library", 185.0, 0.0, Some(TechId::Writing))
            },
            WonderKind::Colossus => BuildingStats {
                yields: Yields::new(0.0, 0.0, 3.0),
                great_person: Some((GreatPersonKind::Merchant, 2.0)),
                ..stats("Colossus", 185.0, 0.0, Some(TechId::BronzeWorking))
            },
            WonderKind::HangingGardens => BuildingStats {
                yields: Yields::new(3.0, 0.0, 0.0),
                happiness: 3,
                ..stats("Hanging Gardens", 250.0, 0.0, Some(TechId::Mathematics))
            },
            WonderKind::GreatWall => BuildingStats {
                defense: 10.0,
                great_person: Some((GreatPersonKind::General, 2.0)),
                ..stats("Great Wall", 250.0, 0.0, Some(TechId::Construction))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_buildings_exist_earlier() {
        for kind in BuildingKind::ALL {
            if let Some(req) = kind.stats().requires {
                assert!(req < kind, "{:?} requires later building {:?}", kind, req);
            }
        }
    }

    #[test]
    fn test_wonders_cost_more_than_buildings() {
        let max_building = BuildingKind::ALL
            .iter()
            .map(|b| b.stats().cost)
            .fold(0.0_f32, f32::max);
        for wonder in WonderKind::ALL {
            assert!(wonder.stats().cost > max_building);
            assert_eq!(wonder.stats().maintenance, 0.0);
        }
    }
}
