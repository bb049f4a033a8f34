//! Per-turn output of a tile, building or settlement

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Yields {
    pub food: f32,
    pub production: f32,
    pub gold: f32,
    pub science: f32,
    pub culture: f32,
}

impl Yields {
    pub const ZERO: Yields = Yields {
        food: 0.0,
        production: 0.0,
        gold: 0.0,
        science: 0.0,
        culture: 0.0,
    };

    pub const fn new(food: f32, production: f32, gold: f32) -> Self {
        Self {
            food,
            production,
            gold,
            science: 0.0,
            culture: 0.0,
        }
    }

    pub const fn with_science(mut self, science: f32) -> Self {
        self.science = science;
        self
    }

    pub const fn with_culture(mut self, culture: f32) -> Self {
        self.culture = culture;
        self
    }

    /// Clamp every component at zero
    pub fn floored(self) -> Self {
        Self {
            food: self.food.max(0.0),
            production: self.production.max(0.0),
            gold: self.gold.max(0.0),
            science: self.science.max(0.0),
            culture: self.culture.max(0.0),
        }
    }
}

impl std::ops::Add for Yields {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            food: self.food + rhs.food,
            production: self.production + rhs.production,
            gold: self.gold + rhs.gold,
            science: self.science + rhs.science,
            culture: self.culture + rhs.culture,
        }
    }
}

impl std::ops::AddAssign for Yields {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::ops::Mul<f32> for Yields {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self {
            food: self.food * rhs,
            production: self.production * rhs,
            gold: self.gold * rhs,
            science: self.science * rhs,
            culture: self.culture * rhs,
        }
    }
}

impl std::iter::Sum for Yields {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Yields::ZERO, |acc, y| acc + y)
    }
}
