//! Strength modifiers and damage
//!
//! Everything here is a pure function over snapshots taken before a fight,
//! so a rejected attack can never leave a half-applied modifier behind.
//!
//! Each side's strength goes through the same fixed pipeline:
//! health scaling (with ranged substitution for a ranged attacker), embark
//! penalty, terrain and river defense, fortification, the settlement
//! override, promotions, empire-wide combat bonuses and the general aura.

use crate::core::config::CombatConfig;
use crate::entities::{Settlement, Unit, MAX_HEALTH};
use crate::grid::Tile;
use crate::rules::promotions::{self, CombatSituation};
use crate::rules::{PromotionClass, PromotionId};

#[derive(Debug, Clone, PartialEq)]
pub enum FighterKind {
    Unit {
        strength: f32,
        ranged_strength: Option<f32>,
        health: i32,
        class: Option<PromotionClass>,
        embarked: bool,
        fortified: bool,
        promotions: Vec<PromotionId>,
    },
    Settlement {
        defense: f32,
        hp: i32,
        max_hp: i32,
    },
}

/// One side of a fight, captured before any mutation
#[derive(Debug, Clone, PartialEq)]
pub struct Fighter {
    pub kind: FighterKind,
    /// Government and policy combat bonus of the owner (0.1 = +10%)
    pub empire_bonus: f32,
    /// A friendly great general stands close enough to lend its aura
    pub general_nearby: bool,
}

impl Fighter {
    pub fn from_unit(unit: &Unit, empire_bonus: f32, general_nearby: bool) -> Self {
        let stats = unit.stats();
        Self {
            kind: FighterKind::Unit {
                strength: stats.strength,
                ranged_strength: stats.ranged.map(|r| r.strength),
                health: unit.health,
                class: stats.class,
                embarked: unit.embarked,
                fortified: unit.fortified,
                promotions: unit.promotions.clone(),
            },
            empire_bonus,
            general_nearby,
        }
    }

    pub fn from_settlement(settlement: &Settlement, empire_bonus: f32, general_nearby: bool) -> Self {
        Self {
            kind: FighterKind::Settlement {
                defense: settlement.defense(),
                hp: settlement.hp,
                max_hp: settlement.max_hp,
            },
            empire_bonus,
            general_nearby,
        }
    }

    pub fn is_settlement(&self) -> bool {
        matches!(self.kind, FighterKind::Settlement { .. })
    }

    pub fn is_ranged(&self) -> bool {
        matches!(
            self.kind,
            FighterKind::Unit {
                ranged_strength: Some(_),
                ..
            }
        )
    }

    pub fn is_wounded(&self) -> bool {
        match self.kind {
            FighterKind::Unit { health, .. } => health < MAX_HEALTH,
            FighterKind::Settlement { hp, max_hp, .. } => hp < max_hp,
        }
    }

    pub fn class(&self) -> Option<PromotionClass> {
        match self.kind {
            FighterKind::Unit { class, .. } => class,
            FighterKind::Settlement { .. } => None,
        }
    }

    fn promotions(&self) -> &[PromotionId] {
        match &self.kind {
            FighterKind::Unit { promotions, .. } => promotions,
            FighterKind::Settlement { .. } => &[],
        }
    }
}

/// The defender's tile as far as combat cares
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Battleground {
    /// Terrain plus feature defense bonus (0.25 = +25%)
    pub defense_bonus: f32,
    pub river: bool,
    pub open: bool,
    pub rough: bool,
}

impl Battleground {
    /// Flat open ground with no bonuses
    pub const OPEN: Battleground = Battleground {
        defense_bonus: 0.0,
        river: false,
        open: true,
        rough: false,
    };

    pub fn from_tile(tile: &Tile) -> Self {
        Self {
            defense_bonus: tile.defense_bonus(),
            river: tile.has_river() && !tile.is_water(),
            open: tile.is_open(),
            rough: tile.is_rough(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Attacker,
    Defender,
}

/// Final (attacker, defender) strengths
pub fn effective_strengths(
    attacker: &Fighter,
    defender: &Fighter,
    ground: &Battleground,
    ranged: bool,
    config: &CombatConfig,
) -> (f32, f32) {
    (
        side_strength(attacker, defender, ground, Side::Attacker, ranged, config),
        side_strength(defender, attacker, ground, Side::Defender, ranged, config),
    )
}

fn side_strength(
    me: &Fighter,
    opponent: &Fighter,
    ground: &Battleground,
    side: Side,
    ranged: bool,
    config: &CombatConfig,
) -> f32 {
    let mut strength = match &me.kind {
        FighterKind::Unit {
            strength,
            ranged_strength,
            health,
            embarked,
            fortified,
            ..
        } => {
            let base = match (side, ranged, ranged_strength) {
                (Side::Attacker, true, Some(r)) => *r,
                _ => *strength,
            };
            let mut s = base * (*health).clamp(0, MAX_HEALTH) as f32 / MAX_HEALTH as f32;
            if *embarked {
                s *= config.embark_multiplier;
            }
            if side == Side::Defender {
                let mut terrain = ground.defense_bonus;
                if ground.river && !ranged {
                    terrain += config.river_defense_bonus;
                }
                s *= (1.0 + terrain).max(0.0);
                if *fortified {
                    s *= 1.0 + config.fortify_bonus;
                }
            }
            s
        }
        FighterKind::Settlement { defense, hp, max_hp } => {
            let ratio = if *max_hp > 0 {
                (*hp).max(0) as f32 / *max_hp as f32
            } else {
                0.0
            };
            defense * ratio
        }
    };

    let situation = CombatSituation {
        open_terrain: ground.open,
        rough_terrain: ground.rough,
        target_ranged: opponent.is_ranged(),
        target_wounded: opponent.is_wounded(),
        target_class: opponent.class(),
        target_settlement: opponent.is_settlement(),
    };
    strength *= 1.0 + promotions::combat_bonus(me.promotions(), &situation);
    strength *= 1.0 + me.empire_bonus;
    if me.general_nearby {
        strength *= 1.0 + config.great_general_bonus;
    }
    strength.max(0.0)
}

/// Damage each side takes, before rounding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Damage {
    pub to_attacker: f32,
    pub to_defender: f32,
}

/// Each side takes `max(min_damage, other / total * damage_scale)`
pub fn compute_damage(attacker_strength: f32, defender_strength: f32, config: &CombatConfig) -> Damage {
    let total = attacker_strength + defender_strength;
    if total <= 0.0 {
        return Damage {
            to_attacker: config.min_damage,
            to_defender: config.min_damage,
        };
    }
    Damage {
        to_attacker: (defender_strength / total * config.damage_scale).max(config.min_damage),
        to_defender: (attacker_strength / total * config.damage_scale).max(config.min_damage),
    }
}
