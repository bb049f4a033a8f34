//! Settlements, their production queue and territory

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

use crate::core::types::{EmpireId, SettlementId};
use crate::grid::{HexCoord, Yields};
use crate::rules::buildings::{BuildingKind, BuildingStats, WonderKind};
use crate::rules::units::UnitType;

/// One entry of a settlement's production queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductionItem {
    Unit(UnitType),
    Building(BuildingKind),
    Wonder(WonderKind),
    /// Converts the turn's production into gold
    Wealth,
}

impl ProductionItem {
    pub fn cost(&self) -> f32 {
        match self {
            ProductionItem::Unit(kind) => kind.stats().cost,
            ProductionItem::Building(kind) => kind.stats().cost,
            ProductionItem::Wonder(kind) => kind.stats().cost,
            ProductionItem::Wealth => 0.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProductionItem::Unit(kind) => kind.stats().name,
            ProductionItem::Building(kind) => kind.stats().name,
            ProductionItem::Wonder(kind) => kind.stats().name,
            ProductionItem::Wealth => "Wealth",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub owner: EmpireId,
    pub name: String,
    pub position: HexCoord,
    pub population: u32,
    /// Stored food toward the next population
    pub food: f32,
    /// Production stored toward the head of the queue
    pub production: f32,
    pub buildings: BTreeSet<BuildingKind>,
    pub wonders: BTreeSet<WonderKind>,
    pub queue: VecDeque<ProductionItem>,
    /// Always contains `position`
    pub territory: BTreeSet<HexCoord>,
    pub hp: i32,
    pub max_hp: i32,
    pub is_capital: bool,
    /// Already bombarded this turn
    pub has_attacked: bool,
}

impl Settlement {
    pub fn new(id: SettlementId, owner: EmpireId, name: String, position: HexCoord, max_hp: i32) -> Self {
        Self {
            id,
            owner,
            name,
            position,
            population: 1,
            food: 0.0,
            production: 0.0,
            buildings: BTreeSet::new(),
            wonders: BTreeSet::new(),
            queue: VecDeque::new(),
            territory: BTreeSet::from([position]),
            hp: max_hp,
            max_hp,
            is_capital: false,
            has_attacked: false,
        }
    }

    pub fn has_building(&self, kind: BuildingKind) -> bool {
        self.buildings.contains(&kind)
    }

    /// Stats of every building and wonder standing here
    pub fn structures(&self) -> impl Iterator<Item = BuildingStats> + '_ {
        self.buildings
            .iter()
            .map(|b| b.stats())
            .chain(self.wonders.iter().map(|w| w.stats()))
    }

    pub fn building_yields(&self) -> Yields {
        self.structures().map(|s| s.yields).sum()
    }

    pub fn building_happiness(&self) -> i32 {
        self.structures().map(|s| s.happiness).sum()
    }

    pub fn building_maintenance(&self) -> f32 {
        self.structures().map(|s| s.maintenance).sum()
    }

    /// Base defense strength before the HP ratio is applied
    pub fn defense(&self) -> f32 {
        8.0 + 2.0 * self.population as f32 + self.structures().map(|s| s.defense).sum::<f32>()
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        (self.hp.max(0) as f32) / self.max_hp as f32
    }

    /// Food needed for the next population point
    pub fn growth_threshold(&self, base: f32, per_pop: f32) -> f32 {
        base + per_pop * self.population as f32
    }

    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    pub fn current_item(&self) -> Option<ProductionItem> {
        self.queue.front().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settlement() -> Settlement {
        Settlement::new(SettlementId(1), EmpireId(0), "Ur".to_string(), HexCoord::new(2, 2), 200)
    }

    #[test]
    fn test_new_settlement_owns_its_tile() {
        let s = settlement();
        assert!(s.territory.contains(&s.position));
        assert_eq!(s.population, 1);
        assert_eq!(s.hp, 200);
    }

    #[test]
    fn test_defense_grows_with_population_and_walls() {
        let mut s = settlement();
        assert_eq!(s.defense(), 10.0);
        s.population = 3;
        s.buildings.insert(BuildingKind::Walls);
        assert_eq!(s.defense(), 8.0 + 6.0 + 5.0);
    }

    #[test]
    fn test_hp_ratio() {
        let mut s = settlement();
        s.hp = 50;
        assert_eq!(s.hp_ratio(), 0.25);
        s.hp = -10;
        assert_eq!(s.hp_ratio(), 0.0);
    }

    #[test]
    fn test_growth_threshold() {
        let mut s = settlement();
        assert_eq!(s.growth_threshold(15.0, 6.0), 21.0);
        s.population = 4;
        assert_eq!(s.growth_threshold(15.0, 6.0), 39.0);
    }

    #[test]
    fn test_structure_yields_include_wonders() {
        let mut s = settlement();
        s.buildings.insert(BuildingKind::Library);
        s.wonders.insert(WonderKind::GreatLibrary);
        assert_eq!(s.building_yields().science, 5.0);
    }
}
