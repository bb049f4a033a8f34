//! Empire-wide percentage modifiers shared by governments, policies and golden ages

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Additive percentages (0.1 = +10%) plus flat happiness
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    pub food: f32,
    pub production: f32,
    pub gold: f32,
    pub science: f32,
    pub culture: f32,
    pub combat: f32,
    /// Fraction of unit maintenance waived
    pub maintenance_reduction: f32,
    pub happiness: i32,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        food: 0.0,
        production: 0.0,
        gold: 0.0,
        science: 0.0,
        culture: 0.0,
        combat: 0.0,
        maintenance_reduction: 0.0,
        happiness: 0,
    };
}

impl AddAssign for Modifiers {
    fn add_assign(&mut self, rhs: Self) {
        self.food += rhs.food;
        self.production += rhs.production;
        self.gold += rhs.gold;
        self.science += rhs.science;
        self.culture += rhs.culture;
        self.combat += rhs.combat;
        self.maintenance_reduction += rhs.maintenance_reduction;
        self.happiness += rhs.happiness;
    }
}
