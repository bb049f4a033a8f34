//! Unit type table

use serde::{Deserialize, Serialize};

use crate::grid::ResourceKind;
use crate::pathfinding::MovementProfile;
use crate::rules::techs::TechId;

/// Kinds of great person
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GreatPersonKind {
    General,
    Scientist,
    Engineer,
    Merchant,
    Artist,
}

impl GreatPersonKind {
    pub const ALL: [GreatPersonKind; 5] = [
        GreatPersonKind::General,
        GreatPersonKind::Scientist,
        GreatPersonKind::Engineer,
        GreatPersonKind::Merchant,
        GreatPersonKind::Artist,
    ];

    pub fn unit_type(&self) -> UnitType {
        match self {
            GreatPersonKind::General => UnitType::GreatGeneral,
            GreatPersonKind::Scientist => UnitType::GreatScientist,
            GreatPersonKind::Engineer => UnitType::GreatEngineer,
            GreatPersonKind::Merchant => UnitType::GreatMerchant,
            GreatPersonKind::Artist => UnitType::GreatArtist,
        }
    }
}

/// What the decision engine does with a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitRole {
    Settler,
    Worker,
    Scout,
    Military,
    GreatPerson(GreatPersonKind),
}

/// Broad category for combat and upkeep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitCategory {
    Civilian,
    Military,
    GreatPerson,
}

/// Which promotions a unit may take
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PromotionClass {
    Recon,
    Melee,
    Ranged,
    Mounted,
    Siege,
    Naval,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangedProfile {
    pub strength: f32,
    pub range: i32,
}

/// Movement domain of a unit type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Land,
    Coastal,
    Ocean,
}

/// One row of the unit table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitStats {
    pub name: &'static str,
    pub role: UnitRole,
    pub class: Option<PromotionClass>,
    pub strength: f32,
    pub ranged: Option<RangedProfile>,
    pub movement: f32,
    /// Production cost; zero means the type cannot be trained
    pub cost: f32,
    /// Gold per turn
    pub maintenance: f32,
    pub tech: Option<TechId>,
    pub resource: Option<ResourceKind>,
    pub max_attacks: u32,
    pub domain: Domain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitType {
    Settler,
    Worker,
    Scout,
    Warrior,
    Archer,
    Spearman,
    Horseman,
    Swordsman,
    Catapult,
    Knight,
    Musketman,
    Trireme,
    Galleon,
    GreatGeneral,
    GreatScientist,
    GreatEngineer,
    GreatMerchant,
    GreatArtist,
}

impl UnitType {
    /// Trainable military types, weakest first
    pub const MILITARY: [UnitType; 10] = [
        UnitType::Warrior,
        UnitType::Archer,
        UnitType::Spearman,
        UnitType::Horseman,
        UnitType::Swordsman,
        UnitType::Catapult,
        UnitType::Knight,
        UnitType::Musketman,
        UnitType::Trireme,
        UnitType::Galleon,
    ];

    pub fn stats(&self) -> UnitStats {
        use Domain::*;
        use PromotionClass::*;

        match self {
            UnitType::Settler => row("Settler", UnitRole::Settler, None, 0.0, 2.0, 60.0, 0.5, None),
            UnitType::Worker => row("Worker", UnitRole::Worker, None, 0.0, 2.0, 40.0, 0.5, None),
            UnitType::Scout => row("Scout", UnitRole::Scout, Some(Recon), 5.0, 3.0, 25.0, 0.5, None),
            UnitType::Warrior => row("Warrior", UnitRole::Military, Some(Melee), 8.0, 2.0, 40.0, 0.5, None),
            UnitType::Archer => UnitStats {
                ranged: Some(RangedProfile { strength: 7.0, range: 2 }),
                ..row("Archer", UnitRole::Military, Some(Ranged), 5.0, 2.0, 50.0, 1.0, Some(TechId::Archery))
            },
            UnitType::Spearman => row(
                "Spearman",
                UnitRole::Military,
                Some(Melee),
                11.0,
                2.0,
                55.0,
                1.0,
                Some(TechId::BronzeWorking),
            ),
            UnitType::Horseman => UnitStats {
                resource: Some(ResourceKind::Horses),
                ..row(
                    "Horseman",
                    UnitRole::Military,
                    Some(Mounted),
                    12.0,
                    4.0,
                    65.0,
                    1.0,
                    Some(TechId::HorsebackRiding),
                )
            },
            UnitType::Swordsman => UnitStats {
                resource: Some(ResourceKind::Iron),
                ..row(
                    "Swordsman",
                    UnitRole::Military,
                    Some(Melee),
                    14.0,
                    2.0,
                    75.0,
                    1.0,
                    Some(TechId::IronWorking),
                )
            },
            UnitType::Catapult => UnitStats {
                ranged: Some(RangedProfile { strength: 14.0, range: 2 }),
                ..row(
                    "Catapult",
                    UnitRole::Military,
                    Some(Siege),
                    7.0,
                    2.0,
                    90.0,
                    1.0,
                    Some(TechId::Mathematics),
                )
            },
            UnitType::Knight => UnitStats {
                resource: Some(ResourceKind::Horses),
                ..row(
                    "Knight",
                    UnitRole::Military,
                    Some(Mounted),
                    20.0,
                    4.0,
                    120.0,
                    1.5,
                    Some(TechId::Chivalry),
                )
            },
            UnitType::Musketman => row(
                "Musketman",
                UnitRole::Military,
                Some(Melee),
                24.0,
                2.0,
                150.0,
                1.5,
                Some(TechId::Gunpowder),
            ),
            UnitType::Trireme => UnitStats {
                domain: Coastal,
                ..row("Trireme", UnitRole::Military, Some(Naval), 10.0, 4.0, 55.0, 1.0, Some(TechId::Sailing))
            },
            UnitType::Galleon => UnitStats {
                domain: Ocean,
                ..row(
                    "Galleon",
                    UnitRole::Military,
                    Some(Naval),
                    18.0,
                    5.0,
                    120.0,
                    1.5,
                    Some(TechId::Navigation),
                )
            },
            UnitType::GreatGeneral => great_person("Great General", GreatPersonKind::General),
            UnitType::GreatScientist => great_person("Great Scientist", GreatPersonKind::Scientist),
            UnitType::GreatEngineer => great_person("Great Engineer", GreatPersonKind::Engineer),
            UnitType::GreatMerchant => great_person("Great Merchant", GreatPersonKind::Merchant),
            UnitType::GreatArtist => great_person("Great Artist", GreatPersonKind::Artist),
        }
    }

    pub fn role(&self) -> UnitRole {
        self.stats().role
    }

    pub fn category(&self) -> UnitCategory {
        match self.role() {
            UnitRole::Settler | UnitRole::Worker => UnitCategory::Civilian,
            UnitRole::Scout | UnitRole::Military => UnitCategory::Military,
            UnitRole::GreatPerson(_) => UnitCategory::GreatPerson,
        }
    }

    pub fn is_trainable(&self) -> bool {
        self.stats().cost > 0.0
    }

    pub fn is_naval(&self) -> bool {
        self.stats().domain != Domain::Land
    }

    /// Movement profile; land units may cross shallow water once `can_embark`
    pub fn movement_profile(&self, can_embark: bool) -> MovementProfile {
        match self.stats().domain {
            Domain::Land => MovementProfile::Land { can_embark },
            Domain::Coastal => MovementProfile::Naval { ocean_capable: false },
            Domain::Ocean => MovementProfile::Naval { ocean_capable: true },
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn row(
    name: &'static str,
    role: UnitRole,
    class: Option<PromotionClass>,
    strength: f32,
    movement: f32,
    cost: f32,
    maintenance: f32,
    tech: Option<TechId>,
) -> UnitStats {
    UnitStats {
        name,
        role,
        class,
        strength,
        ranged: None,
        movement,
        cost,
        maintenance,
        tech,
        resource: None,
        max_attacks: 1,
        domain: Domain::Land,
    }
}

fn great_person(name: &'static str, kind: GreatPersonKind) -> UnitStats {
    UnitStats {
        name,
        role: UnitRole::GreatPerson(kind),
        class: None,
        strength: 0.0,
        ranged: None,
        movement: 2.0,
        cost: 0.0,
        maintenance: 0.0,
        tech: None,
        resource: None,
        max_attacks: 0,
        domain: Domain::Land,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_military_list_is_military() {
        for kind in UnitType::MILITARY {
            assert_eq!(kind.role(), UnitRole::Military);
            assert!(kind.is_trainable());
            assert!(kind.stats().strength > 0.0);
        }
    }

    #[test]
    fn test_great_people_are_not_trainable() {
        for kind in GreatPersonKind::ALL {
            let unit = kind.unit_type();
            assert!(!unit.is_trainable());
            assert_eq!(unit.role(), UnitRole::GreatPerson(kind));
            assert_eq!(unit.category(), UnitCategory::GreatPerson);
        }
    }

    #[test]
    fn test_resource_gates() {
        assert_eq!(UnitType::Horseman.stats().resource, Some(ResourceKind::Horses));
        assert_eq!(UnitType::Swordsman.stats().resource, Some(ResourceKind::Iron));
        assert_eq!(UnitType::Warrior.stats().resource, None);
    }

    #[test]
    fn test_naval_profiles() {
        assert_eq!(
            UnitType::Galleon.movement_profile(false),
            MovementProfile::Naval { ocean_capable: true }
        );
        assert!(UnitType::Trireme.is_naval());
        assert_eq!(
            UnitType::Warrior.movement_profile(true),
            MovementProfile::Land { can_embark: true }
        );
    }
}
