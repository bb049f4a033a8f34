//! Promotion records
//!
//! Each promotion is a flat record: id, optional prerequisite, eligible unit
//! classes, the situation it applies in, and its numeric effect. The table is
//! immutable and looked up by id.

use serde::{Deserialize, Serialize};

use crate::rules::units::PromotionClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PromotionId {
    Shock1,
    Shock2,
    Drill1,
    Drill2,
    Cover,
    Accuracy,
    Barrage,
    Charge,
    Formation,
    Siege,
    Blitz,
    Mobility,
    Medic,
    Targeting,
}

/// When a combat effect applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Always,
    OpenTerrain,
    RoughTerrain,
    VsRanged,
    VsWounded,
    VsClass(PromotionClass),
    VsSettlement,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Additive strength bonus (0.15 = +15%)
    Combat(f32),
    ExtraAttack,
    ExtraMovement(f32),
    HealBonus(i32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Promotion {
    pub id: PromotionId,
    pub name: &'static str,
    pub prerequisite: Option<PromotionId>,
    pub classes: &'static [PromotionClass],
    pub condition: Condition,
    pub effect: Effect,
}

/// Situation a combat bonus is checked against
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CombatSituation {
    /// The tile the fight takes place on (defender's tile)
    pub open_terrain: bool,
    pub rough_terrain: bool,
    pub target_ranged: bool,
    pub target_wounded: bool,
    pub target_class: Option<PromotionClass>,
    pub target_settlement: bool,
}

impl Condition {
    pub fn holds(&self, situation: &CombatSituation) -> bool {
        match *self {
            Condition::Always => true,
            Condition::OpenTerrain => situation.open_terrain,
            Condition::RoughTerrain => situation.rough_terrain,
            Condition::VsRanged => situation.target_ranged,
            Condition::VsWounded => situation.target_wounded,
            Condition::VsClass(class) => situation.target_class == Some(class),
            Condition::VsSettlement => situation.target_settlement,
        }
    }
}

use PromotionClass::*;

static PROMOTIONS: [Promotion; 14] = [
    Promotion {
        id: PromotionId::Shock1,
        name: "Shock I",
        prerequisite: None,
        classes: &[Melee, Mounted],
        condition: Condition::OpenTerrain,
        effect: Effect::Combat(0.15),
    },
    Promotion {
        id: PromotionId::Shock2,
        name: "Shock II",
        prerequisite: Some(PromotionId::Shock1),
        classes: &[Melee, Mounted],
        condition: Condition::OpenTerrain,
        effect: Effect::Combat(0.15),
    },
    Promotion {
        id: PromotionId::Drill1,
        name: "Drill I",
        prerequisite: None,
        classes: &[Melee, Recon],
        condition: Condition::RoughTerrain,
        effect: Effect::Combat(0.15),
    },
    Promotion {
        id: PromotionId::Drill2,
        name: "Drill II",
        prerequisite: Some(PromotionId::Drill1),
        classes: &[Melee, Recon],
        condition: Condition::RoughTerrain,
        effect: Effect::Combat(0.15),
    },
    Promotion {
        id: PromotionId::Cover,
        name: "Cover",
        prerequisite: None,
        classes: &[Melee, Ranged, Recon],
        condition: Condition::VsRanged,
        effect: Effect::Combat(0.33),
    },
    Promotion {
        id: PromotionId::Accuracy,
        name: "Accuracy",
        prerequisite: None,
        classes: &[Ranged, Siege],
        condition: Condition::OpenTerrain,
        effect: Effect::Combat(0.15),
    },
    Promotion {
        id: PromotionId::Barrage,
        name: "Barrage",
        prerequisite: None,
        classes: &[Ranged, Siege],
        condition: Condition::RoughTerrain,
        effect: Effect::Combat(0.15),
    },
    Promotion {
        id: PromotionId::Charge,
        name: "Charge",
        prerequisite: Some(PromotionId::Shock1),
        classes: &[Mounted],
        condition: Condition::VsWounded,
        effect: Effect::Combat(0.33),
    },
    Promotion {
        id: PromotionId::Formation,
        name: "Formation",
        prerequisite: None,
        classes: &[Melee],
        condition: Condition::VsClass(Mounted),
        effect: Effect::Combat(0.33),
    },
    Promotion {
        id: PromotionId::Siege,
        name: "Siege",
        prerequisite: None,
        classes: &[Siege, Melee],
        condition: Condition::VsSettlement,
        effect: Effect::Combat(0.5),
    },
    Promotion {
        id: PromotionId::Blitz,
        name: "Blitz",
        prerequisite: Some(PromotionId::Shock2),
        classes: &[Melee, Mounted],
        condition: Condition::Always,
        effect: Effect::ExtraAttack,
    },
    Promotion {
        id: PromotionId::Mobility,
        name: "Mobility",
        prerequisite: None,
        classes: &[Mounted, Recon, Naval],
        condition: Condition::Always,
        effect: Effect::ExtraMovement(1.0),
    },
    Promotion {
        id: PromotionId::Medic,
        name: "Medic",
        prerequisite: None,
        classes: &[Melee, Ranged, Mounted, Siege, Recon],
        condition: Condition::Always,
        effect: Effect::HealBonus(5),
    },
    Promotion {
        id: PromotionId::Targeting,
        name: "Targeting",
        prerequisite: None,
        classes: &[Naval],
        condition: Condition::Always,
        effect: Effect::Combat(0.15),
    },
];

/// Experience needed for each level; one promotion pick per level reached
pub const LEVEL_THRESHOLDS: [u32; 5] = [10, 30, 60, 100, 150];

pub fn all() -> &'static [Promotion] {
    &PROMOTIONS
}

pub fn lookup(id: PromotionId) -> Option<&'static Promotion> {
    PROMOTIONS.iter().find(|p| p.id == id)
}

/// Number of levels reached with `xp` experience
pub fn level_for_xp(xp: u32) -> usize {
    LEVEL_THRESHOLDS.iter().filter(|&&t| xp >= t).count()
}

/// Promotions a unit of `class` holding `taken` may pick next, in table order
pub fn eligible(class: PromotionClass, taken: &[PromotionId]) -> Vec<&'static Promotion> {
    PROMOTIONS
        .iter()
        .filter(|p| p.classes.contains(&class))
        .filter(|p| !taken.contains(&p.id))
        .filter(|p| p.prerequisite.map_or(true, |req| taken.contains(&req)))
        .collect()
}

/// Sum of combat bonuses from `taken` that apply in `situation`
pub fn combat_bonus(taken: &[PromotionId], situation: &CombatSituation) -> f32 {
    taken
        .iter()
        .filter_map(|id| lookup(*id))
        .filter(|p| p.condition.holds(situation))
        .map(|p| match p.effect {
            Effect::Combat(bonus) => bonus,
            _ => 0.0,
        })
        .sum()
}
