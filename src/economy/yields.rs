//! Settlement yields and empire happiness

use crate::core::config::EconomyConfig;
use crate::core::types::{EmpireId, SettlementId};
use crate::entities::Settlement;
use crate::game::GameState;
use crate::grid::{GridProvider, Yields};
use crate::rules::Modifiers;

/// How an empire's mood shapes this turn's output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Unhappy,
    Content,
    VeryHappy,
}

impl Mood {
    pub fn from_happiness(happiness: i32, config: &EconomyConfig) -> Self {
        if happiness <= 0 {
            Mood::Unhappy
        } else if happiness >= config.very_happy_threshold {
            Mood::VeryHappy
        } else {
            Mood::Content
        }
    }
}

/// A settlement's raw output: base yields, every territory tile, and its
/// buildings and wonders
pub fn raw_yields<G: GridProvider + ?Sized>(grid: &G, settlement: &Settlement, config: &EconomyConfig) -> Yields {
    let pop = settlement.population as f32;
    let base = Yields::new(config.base_food, config.base_production, config.base_gold)
        .with_science(config.science_per_pop * pop);
    let tiles: Yields = settlement
        .territory
        .iter()
        .filter_map(|c| grid.tile_at(*c))
        .map(|t| t.yields())
        .sum();
    base + tiles + settlement.building_yields()
}

/// Output after upkeep, mood, empire modifiers and anarchy.
///
/// `food` in the result is the surplus after feeding the population, so it
/// may be negative.
pub fn adjusted_yields(
    raw: Yields,
    population: u32,
    mood: Mood,
    modifiers: &Modifiers,
    in_anarchy: bool,
    config: &EconomyConfig,
) -> Yields {
    let mut surplus = raw.food * (1.0 + modifiers.food) - config.food_per_pop * population as f32;
    let mut production = raw.production * (1.0 + modifiers.production);
    let mut gold = raw.gold * (1.0 + modifiers.gold);
    let mut science = raw.science * (1.0 + modifiers.science);
    let mut culture = raw.culture * (1.0 + modifiers.culture);

    match mood {
        Mood::Unhappy => {
            if surplus > 0.0 {
                surplus *= config.unhappy_growth_factor;
            }
            production *= config.unhappy_yield_factor;
            gold *= config.unhappy_yield_factor;
        }
        Mood::VeryHappy => {
            if surplus > 0.0 {
                surplus *= 1.0 + config.very_happy_food_bonus;
            }
        }
        Mood::Content => {}
    }

    if in_anarchy {
        production *= config.anarchy_factor;
        gold *= config.anarchy_factor;
        science *= config.anarchy_factor;
        culture *= config.anarchy_factor;
    }

    Yields {
        food: surplus,
        production,
        gold,
        science,
        culture,
    }
}

impl GameState {
    /// Empire happiness: a base, distinct luxuries, buildings, wonders and
    /// policies, minus population and a flat cost per settlement
    pub fn happiness(&self, id: EmpireId) -> i32 {
        let Some(empire) = self.empires.get(&id) else {
            return 0;
        };
        let config = &self.config.economy;
        let buildings: i32 = empire.settlements.values().map(|s| s.building_happiness()).sum();
        let modifiers = empire.modifiers(config.golden_age_bonus);
        config.base_happiness + config.luxury_happiness * empire.luxuries.len() as i32 + buildings + modifiers.happiness
            - empire.total_population() as i32
            - config.settlement_unhappiness * empire.settlements.len() as i32
    }

    pub fn mood(&self, id: EmpireId) -> Mood {
        Mood::from_happiness(self.happiness(id), &self.config.economy)
    }

    /// What a settlement will produce this turn under its empire's `mood`
    pub fn settlement_yields(&self, id: SettlementId, mood: Mood) -> Option<Yields> {
        let owner = self.settlement_owner(id)?;
        let empire = self.empires.get(&owner)?;
        let settlement = empire.settlements.get(&id)?;
        let config = &self.config.economy;
        Some(adjusted_yields(
            raw_yields(&self.grid, settlement, config),
            settlement.population,
            mood,
            &empire.modifiers(config.golden_age_bonus),
            empire.in_anarchy(),
            config,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::core::types::Controller;
    use crate::grid::{HexCoord, ResourceKind, Terrain, WorldGrid};
    use crate::rules::{BuildingKind, UnitType};

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn founded() -> (GameState, EmpireId, SettlementId) {
        let mut game = GameState::new(WorldGrid::filled(10, 10, Terrain::Grassland), GameConfig::default(), 1);
        let a = game.add_empire("Red", Controller::Ai);
        let settler = game
            .spawn_unit(a, UnitType::Settler, HexCoord::new(4, 4), &mut Vec::new())
            .unwrap();
        let s = game.found_settlement(settler, &mut Vec::new()).unwrap();
        (game, a, s)
    }

    #[test]
    fn test_raw_yields_sum_base_tiles_and_buildings() {
        let (mut game, _, s) = founded();
        let config = game.config.economy.clone();
        let raw = raw_yields(&game.grid, game.settlement(s).unwrap(), &config);
        // 7 grassland tiles at 2 food
        assert!(close(raw.food, 2.0 + 14.0));
        assert!(close(raw.production, 2.0));
        assert!(close(raw.gold, 2.0));
        assert!(close(raw.science, 1.5));

        game.settlement_mut(s).unwrap().buildings.insert(BuildingKind::Library);
        let raw = raw_yields(&game.grid, game.settlement(s).unwrap(), &config);
        assert!(close(raw.science, 3.5));
    }

    #[test]
    fn test_happiness_formula() {
        let (mut game, a, s) = founded();
        // 9 - 1 pop - 3 per settlement
        assert_eq!(game.happiness(a), 5);

        game.grid.tile_at_mut(HexCoord::new(5, 4)).unwrap().resource = Some(ResourceKind::Silk);
        game.refresh_resources(a);
        assert_eq!(game.happiness(a), 9);

        game.settlement_mut(s).unwrap().population = 12;
        assert_eq!(game.happiness(a), -2);
    }

    #[test]
    fn test_unhappy_penalties() {
        let config = EconomyConfig::default();
        let raw = Yields::new(10.0, 10.0, 10.0);
        let y = adjusted_yields(raw, 1, Mood::Unhappy, &Modifiers::NONE, false, &config);
        assert!(close(y.food, 2.0));
        assert!(close(y.production, 9.0));
        assert!(close(y.gold, 9.0));

        let y = adjusted_yields(raw, 1, Mood::VeryHappy, &Modifiers::NONE, false, &config);
        assert!(close(y.food, 8.8));
    }

    #[test]
    fn test_starving_surplus_not_softened() {
        let config = EconomyConfig::default();
        let y = adjusted_yields(Yields::new(2.0, 0.0, 0.0), 3, Mood::Unhappy, &Modifiers::NONE, false, &config);
        assert!(close(y.food, -4.0));
    }

    #[test]
    fn test_anarchy_and_modifiers() {
        let config = EconomyConfig::default();
        let raw = Yields::new(4.0, 8.0, 8.0).with_science(8.0);
        let modifiers = Modifiers {
            science: 0.5,
            ..Modifiers::NONE
        };
        let y = adjusted_yields(raw, 1, Mood::Content, &modifiers, true, &config);
        assert!(close(y.production, 2.0));
        assert!(close(y.science, 3.0));
        assert!(close(y.food, 2.0));
    }
}
