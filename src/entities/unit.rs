//! Units and their multi-turn state

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::types::{EmpireId, UnitId};
use crate::grid::{HexCoord, Improvement};
use crate::pathfinding::MovementProfile;
use crate::rules::promotions::{self, Effect, PromotionId};
use crate::rules::units::{RangedProfile, UnitCategory, UnitRole, UnitStats, UnitType};

pub const MAX_HEALTH: i32 = 100;

/// What a finished work order does to its tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingEffect {
    Improvement { at: HexCoord, improvement: Improvement },
    Road { at: HexCoord },
}

impl PendingEffect {
    pub fn target(&self) -> HexCoord {
        match *self {
            PendingEffect::Improvement { at, .. } | PendingEffect::Road { at } => at,
        }
    }
}

/// Multi-turn worker job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub remaining_turns: u32,
    pub effect: PendingEffect,
}

/// Settler search memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlerMemory {
    pub origin: HexCoord,
    pub turns_searching: u32,
    pub visited: BTreeSet<HexCoord>,
}

impl SettlerMemory {
    pub fn new(origin: HexCoord) -> Self {
        Self {
            origin,
            turns_searching: 0,
            visited: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub owner: EmpireId,
    pub kind: UnitType,
    pub position: HexCoord,
    pub movement_left: f32,
    pub health: i32,
    pub fortified: bool,
    /// Land unit currently standing on water
    pub embarked: bool,
    pub xp: u32,
    pub promotions: Vec<PromotionId>,
    pub attacks_this_turn: u32,
    pub work_order: Option<WorkOrder>,
    pub settler: Option<SettlerMemory>,
    /// Moved, attacked or worked this turn; idle units heal
    pub acted: bool,
}

impl Unit {
    pub fn new(id: UnitId, owner: EmpireId, kind: UnitType, position: HexCoord) -> Self {
        let settler = match kind.role() {
            UnitRole::Settler => Some(SettlerMemory::new(position)),
            _ => None,
        };
        let mut unit = Self {
            id,
            owner,
            kind,
            position,
            movement_left: 0.0,
            health: MAX_HEALTH,
            fortified: false,
            embarked: false,
            xp: 0,
            promotions: Vec::new(),
            attacks_this_turn: 0,
            work_order: None,
            settler,
            acted: false,
        };
        unit.movement_left = unit.max_movement();
        unit
    }

    pub fn stats(&self) -> UnitStats {
        self.kind.stats()
    }

    pub fn role(&self) -> UnitRole {
        self.kind.role()
    }

    pub fn category(&self) -> UnitCategory {
        self.kind.category()
    }

    pub fn is_military(&self) -> bool {
        self.category() == UnitCategory::Military
    }

    /// Can fight at all (military with nonzero strength)
    pub fn is_combatant(&self) -> bool {
        self.is_military() && self.stats().strength > 0.0
    }

    pub fn ranged(&self) -> Option<RangedProfile> {
        self.stats().ranged
    }

    pub fn is_wounded(&self) -> bool {
        self.health < MAX_HEALTH
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    pub fn max_movement(&self) -> f32 {
        let extra: f32 = self
            .promotion_effects()
            .filter_map(|e| match e {
                Effect::ExtraMovement(m) => Some(m),
                _ => None,
            })
            .sum();
        self.stats().movement + extra
    }

    pub fn max_attacks(&self) -> u32 {
        let extra = self
            .promotion_effects()
            .filter(|e| matches!(e, Effect::ExtraAttack))
            .count() as u32;
        self.stats().max_attacks + extra
    }

    pub fn heal_bonus(&self) -> i32 {
        self.promotion_effects()
            .filter_map(|e| match e {
                Effect::HealBonus(h) => Some(h),
                _ => None,
            })
            .sum()
    }

    fn promotion_effects(&self) -> impl Iterator<Item = Effect> + '_ {
        self.promotions
            .iter()
            .filter_map(|id| promotions::lookup(*id))
            .map(|p| p.effect)
    }

    pub fn can_attack(&self) -> bool {
        self.is_combatant() && self.attacks_this_turn < self.max_attacks() && self.movement_left > 0.0
    }

    pub fn level(&self) -> usize {
        promotions::level_for_xp(self.xp)
    }

    /// Levels reached but not yet spent on a promotion
    pub fn pending_promotions(&self) -> usize {
        self.level().saturating_sub(self.promotions.len())
    }

    pub fn movement_profile(&self, can_embark: bool) -> MovementProfile {
        self.kind.movement_profile(can_embark)
    }

    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount).min(MAX_HEALTH);
    }

    /// Reset per-turn budgets
    pub fn refresh(&mut self) {
        self.movement_left = self.max_movement();
        self.attacks_this_turn = 0;
        self.acted = false;
    }

    /// Spend movement, flooring at zero
    pub fn spend_movement(&mut self, cost: f32) {
        self.movement_left = (self.movement_left - cost).max(0.0);
        self.acted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warrior() -> Unit {
        Unit::new(UnitId(1), EmpireId(0), UnitType::Warrior, HexCoord::new(0, 0))
    }

    #[test]
    fn test_new_unit_has_full_budget() {
        let u = warrior();
        assert_eq!(u.health, MAX_HEALTH);
        assert_eq!(u.movement_left, 2.0);
        assert!(u.can_attack());
        assert!(u.settler.is_none());
    }

    #[test]
    fn test_settler_remembers_origin() {
        let u = Unit::new(UnitId(2), EmpireId(0), UnitType::Settler, HexCoord::new(3, 4));
        assert_eq!(u.settler.as_ref().map(|s| s.origin), Some(HexCoord::new(3, 4)));
        assert!(!u.is_military());
    }

    #[test]
    fn test_movement_floors_at_zero() {
        let mut u = warrior();
        u.spend_movement(5.0);
        assert_eq!(u.movement_left, 0.0);
        assert!(u.acted);
        u.refresh();
        assert_eq!(u.movement_left, 2.0);
        assert!(!u.acted);
    }

    #[test]
    fn test_promotion_effects() {
        let mut u = Unit::new(UnitId(3), EmpireId(0), UnitType::Horseman, HexCoord::new(0, 0));
        u.promotions.push(PromotionId::Mobility);
        assert_eq!(u.max_movement(), 5.0);

        u.promotions.extend([PromotionId::Shock1, PromotionId::Shock2, PromotionId::Blitz]);
        assert_eq!(u.max_attacks(), 2);
    }

    #[test]
    fn test_pending_promotions_follow_xp() {
        let mut u = warrior();
        u.xp = 35;
        assert_eq!(u.pending_promotions(), 2);
        u.promotions.push(PromotionId::Shock1);
        assert_eq!(u.pending_promotions(), 1);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut u = warrior();
        u.health = 95;
        u.heal(20);
        assert_eq!(u.health, MAX_HEALTH);
    }
}
