//! Unit movement, sight and village rewards

use rand::Rng;
use std::collections::BTreeSet;
use tracing::debug;

use crate::core::error::{GameError, Result};
use crate::core::types::{EmpireId, UnitId};
use crate::events::{EventSink, GameEvent, VillageReward};
use crate::game::GameState;
use crate::grid::{GridProvider, HexCoord, Terrain};
use crate::pathfinding::find_path_avoiding;
use crate::rules::UnitRole;

pub const UNIT_SIGHT: i32 = 2;
pub const SETTLEMENT_SIGHT: i32 = 3;
const VILLAGE_REVEAL_RADIUS: i32 = 3;
const VILLAGE_SCIENCE: u32 = 20;
const VILLAGE_XP: u32 = 10;

impl GameState {
    /// Walk a unit along its best path toward `destination` while it has
    /// movement left. Any tile may be entered with movement above zero;
    /// the step cost is then spent and movement floors at zero. Tiles held
    /// by another empire are never entered.
    ///
    /// Returns the position the unit ended on.
    pub fn move_unit(&mut self, id: UnitId, destination: HexCoord, sink: &mut dyn EventSink) -> Result<HexCoord> {
        let unit = self.unit(id).ok_or(GameError::UnitNotFound(id))?.clone();
        if unit.movement_left <= 0.0 {
            return Err(GameError::NoMovementLeft(id));
        }
        if !self.grid.contains(destination) {
            return Err(GameError::TileNotFound(destination));
        }
        if unit.work_order.is_some() {
            return Err(GameError::InvalidAction(format!("{} is busy working", id)));
        }

        let owner = unit.owner;
        let profile = self.unit_profile(&unit);
        let blocked = self.foreign_positions(owner);
        let path = find_path_avoiding(&self.grid, unit.position, destination, profile, &|c: HexCoord| blocked.contains(&c));
        if path.is_empty() {
            return Err(GameError::InvalidAction(format!(
                "{} cannot reach {:?}",
                id, destination
            )));
        }

        let from = unit.position;
        let mut position = from;
        for next in path.into_iter().skip(1) {
            let movement_left = self.unit(id).map_or(0.0, |u| u.movement_left);
            if movement_left <= 0.0 || blocked.contains(&next) {
                break;
            }
            let Some(tile) = self.grid.tile_at(next) else {
                break;
            };
            let cost = profile.step_cost(tile);
            let on_water = tile.is_water();
            let village = tile.village;

            if let Some(u) = self.unit_mut(id) {
                u.position = next;
                u.spend_movement(cost);
                u.fortified = false;
                u.embarked = !u.kind.is_naval() && on_water;
            }
            position = next;

            if village {
                self.claim_village(id, next, sink);
            }
            self.refresh_visibility(owner, sink);
        }

        if position != from {
            debug!("{} moved {:?} -> {:?}", id, from, position);
            sink.emit(GameEvent::UnitMoved {
                owner,
                unit: id,
                from,
                to: position,
            });
        }
        Ok(position)
    }

    /// Spend the rest of the turn fortified in place
    pub fn fortify_unit(&mut self, id: UnitId, sink: &mut dyn EventSink) -> Result<()> {
        let unit = self.unit_mut(id).ok_or(GameError::UnitNotFound(id))?;
        if !unit.is_military() {
            return Err(GameError::InvalidAction(format!("{} cannot fortify", id)));
        }
        let owner = unit.owner;
        unit.movement_left = 0.0;
        if !unit.fortified {
            unit.fortified = true;
            sink.emit(GameEvent::UnitFortified { owner, unit: id });
        }
        Ok(())
    }

    /// Sight radius of a unit standing on `at`
    pub fn unit_sight(&self, role: UnitRole, at: HexCoord) -> i32 {
        let mut sight = UNIT_SIGHT;
        if role == UnitRole::Scout {
            sight += 1;
        }
        if self.grid.tile_at(at).is_some_and(|t| t.terrain == Terrain::Hills) {
            sight += 1;
        }
        sight
    }

    /// Recompute what `owner` can see, extend its discovered set and meet
    /// every empire whose units, settlements or territory come into view.
    pub fn refresh_visibility(&mut self, owner: EmpireId, sink: &mut dyn EventSink) {
        let Some(empire) = self.empires.get(&owner) else {
            return;
        };

        let mut visible = BTreeSet::new();
        for unit in empire.units.values() {
            let radius = self.unit_sight(unit.role(), unit.position);
            visible.extend(unit.position.range(radius).into_iter().filter(|c| self.grid.contains(*c)));
        }
        for settlement in empire.settlements.values() {
            visible.extend(
                settlement
                    .position
                    .range(SETTLEMENT_SIGHT)
                    .into_iter()
                    .filter(|c| self.grid.contains(*c)),
            );
        }

        let mut seen = BTreeSet::new();
        for other in self.empires.values().filter(|e| e.id != owner && !e.eliminated) {
            let spotted = other.units.values().any(|u| visible.contains(&u.position))
                || other
                    .settlements
                    .values()
                    .any(|s| s.territory.iter().any(|c| visible.contains(c)));
            if spotted {
                seen.insert(other.id);
            }
        }

        if let Some(empire) = self.empires.get_mut(&owner) {
            empire.discovered.extend(visible.iter().copied());
            empire.visible = visible;
        }
        for other in seen {
            self.diplomacy.meet(owner, other, sink);
        }
    }

    /// Consume the one-shot reward on `at` for the unit standing there
    pub fn claim_village(&mut self, id: UnitId, at: HexCoord, sink: &mut dyn EventSink) {
        let Some(owner) = self.unit_owner(id) else {
            return;
        };
        match self.grid.tile_at_mut(at) {
            Some(tile) if tile.village => tile.village = false,
            _ => return,
        }

        let is_military = self.unit(id).is_some_and(|u| u.is_military());
        let has_settlement = self.empires.get(&owner).is_some_and(|e| !e.settlements.is_empty());

        let roll = self.rng.gen_range(0..100);
        let reward = match roll {
            0..=29 => VillageReward::Gold(self.rng.gen_range(25..=75)),
            30..=49 => VillageReward::Science(VILLAGE_SCIENCE),
            50..=69 => VillageReward::MapReveal,
            70..=84 if is_military => VillageReward::Experience(VILLAGE_XP),
            85..=99 if has_settlement => VillageReward::Population,
            _ => VillageReward::Gold(self.rng.gen_range(25..=75)),
        };

        match reward {
            VillageReward::Gold(amount) => {
                if let Some(e) = self.empires.get_mut(&owner) {
                    e.gold += amount as f32;
                }
            }
            VillageReward::Science(amount) => {
                if let Some(e) = self.empires.get_mut(&owner) {
                    e.research.progress += amount as f32;
                    e.science_total += amount as f32;
                }
            }
            VillageReward::MapReveal => {
                let revealed: Vec<HexCoord> = at
                    .range(VILLAGE_REVEAL_RADIUS)
                    .into_iter()
                    .filter(|c| self.grid.contains(*c))
                    .collect();
                if let Some(e) = self.empires.get_mut(&owner) {
                    e.discovered.extend(revealed);
                }
            }
            VillageReward::Experience(xp) => {
                if let Some(u) = self.unit_mut(id) {
                    u.xp += xp;
                }
            }
            VillageReward::Population => {
                let nearest = self.empires.get(&owner).and_then(|e| {
                    e.settlements
                        .values()
                        .min_by_key(|s| (s.position.distance(&at), s.id))
                        .map(|s| s.id)
                });
                if let Some(settlement) = nearest {
                    self.grow_settlement(settlement, sink);
                }
            }
        }

        debug!("{} claimed village at {:?}: {:?}", owner, at, reward);
        sink.emit(GameEvent::VillageClaimed { owner, at, reward });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::core::types::Controller;
    use crate::grid::{Feature, WorldGrid};
    use crate::rules::UnitType;

    fn game(grid: WorldGrid) -> (GameState, EmpireId, EmpireId) {
        let mut game = GameState::new(grid, GameConfig::default(), 11);
        let a = game.add_empire("Red", Controller::Ai);
        let b = game.add_empire("Blue", Controller::Ai);
        (game, a, b)
    }

    #[test]
    fn test_move_spends_movement() {
        let (mut game, a, _) = game(WorldGrid::filled(10, 10, Terrain::Plains));
        let id = game
            .spawn_unit(a, UnitType::Warrior, HexCoord::new(0, 0), &mut Vec::new())
            .unwrap();
        let end = game.move_unit(id, HexCoord::new(5, 0), &mut Vec::new()).unwrap();
        assert_eq!(end, HexCoord::new(2, 0));
        assert_eq!(game.unit(id).unwrap().movement_left, 0.0);

        let again = game.move_unit(id, HexCoord::new(5, 0), &mut Vec::new());
        assert!(matches!(again, Err(GameError::NoMovementLeft(_))));
    }

    #[test]
    fn test_expensive_tile_entered_with_partial_movement() {
        let mut grid = WorldGrid::filled(5, 1, Terrain::Plains);
        grid.tile_at_mut(HexCoord::new(2, 0)).unwrap().feature = Some(Feature::Forest);
        let (mut game, a, _) = game(grid);
        let id = game
            .spawn_unit(a, UnitType::Warrior, HexCoord::new(0, 0), &mut Vec::new())
            .unwrap();
        game.unit_mut(id).unwrap().movement_left = 2.0;
        let end = game.move_unit(id, HexCoord::new(3, 0), &mut Vec::new()).unwrap();
        // 1 for plains, then forest entered with 1 left
        assert_eq!(end, HexCoord::new(2, 0));
        assert_eq!(game.unit(id).unwrap().movement_left, 0.0);
    }

    #[test]
    fn test_never_enters_foreign_tile() {
        let (mut game, a, b) = game(WorldGrid::filled(6, 1, Terrain::Plains));
        let id = game
            .spawn_unit(a, UnitType::Horseman, HexCoord::new(0, 0), &mut Vec::new())
            .unwrap();
        game.spawn_unit(b, UnitType::Warrior, HexCoord::new(3, 0), &mut Vec::new())
            .unwrap();
        let end = game.move_unit(id, HexCoord::new(3, 0), &mut Vec::new()).unwrap();
        assert_eq!(end, HexCoord::new(2, 0));
    }

    #[test]
    fn test_unreachable_move_is_rejected_without_change() {
        let mut grid = WorldGrid::filled(3, 1, Terrain::Plains);
        grid.tile_at_mut(HexCoord::new(1, 0)).unwrap().terrain = Terrain::Mountains;
        let (mut game, a, _) = game(grid);
        let id = game
            .spawn_unit(a, UnitType::Warrior, HexCoord::new(0, 0), &mut Vec::new())
            .unwrap();
        assert!(game.move_unit(id, HexCoord::new(2, 0), &mut Vec::new()).is_err());
        let unit = game.unit(id).unwrap();
        assert_eq!(unit.position, HexCoord::new(0, 0));
        assert_eq!(unit.movement_left, 2.0);
    }

    #[test]
    fn test_sight_meets_other_empire() {
        let (mut game, a, b) = game(WorldGrid::filled(12, 1, Terrain::Plains));
        game.spawn_unit(a, UnitType::Scout, HexCoord::new(0, 0), &mut Vec::new())
            .unwrap();
        game.spawn_unit(b, UnitType::Warrior, HexCoord::new(6, 0), &mut Vec::new())
            .unwrap();
        assert!(!game.diplomacy.has_met(a, b));

        let scout = game.empire(a).unwrap().units.keys().next().copied().unwrap();
        let mut events = Vec::new();
        game.move_unit(scout, HexCoord::new(3, 0), &mut events).unwrap();
        assert!(game.diplomacy.has_met(a, b));
        assert!(events.iter().any(|e| matches!(e, GameEvent::EmpiresMet { .. })));

        let empire = game.empire(a).unwrap();
        assert!(empire.visible.is_subset(&empire.discovered));
    }

    #[test]
    fn test_village_is_one_shot() {
        let mut grid = WorldGrid::filled(4, 1, Terrain::Plains);
        grid.tile_at_mut(HexCoord::new(1, 0)).unwrap().village = true;
        let (mut game, a, _) = game(grid);
        let id = game
            .spawn_unit(a, UnitType::Scout, HexCoord::new(0, 0), &mut Vec::new())
            .unwrap();
        let mut events = Vec::new();
        game.move_unit(id, HexCoord::new(1, 0), &mut events).unwrap();
        assert!(!game.grid.tile_at(HexCoord::new(1, 0)).unwrap().village);
        let claims = events
            .iter()
            .filter(|e| matches!(e, GameEvent::VillageClaimed { .. }))
            .count();
        assert_eq!(claims, 1);

        game.claim_village(id, HexCoord::new(1, 0), &mut events);
        let claims = events
            .iter()
            .filter(|e| matches!(e, GameEvent::VillageClaimed { .. }))
            .count();
        assert_eq!(claims, 1);
    }

    #[test]
    fn test_village_population_claims_territory() {
        let mut granted = 0;
        for seed in 0..200 {
            let mut grid = WorldGrid::filled(10, 10, Terrain::Plains);
            grid.tile_at_mut(HexCoord::new(7, 7)).unwrap().village = true;
            let mut game = GameState::new(grid, GameConfig::default(), seed);
            let a = game.add_empire("Red", Controller::Ai);
            let settler = game
                .spawn_unit(a, UnitType::Settler, HexCoord::new(3, 3), &mut Vec::new())
                .unwrap();
            let s = game.found_settlement(settler, &mut Vec::new()).unwrap();
            let scout = game
                .spawn_unit(a, UnitType::Scout, HexCoord::new(7, 7), &mut Vec::new())
                .unwrap();
            let territory = game.settlement(s).unwrap().territory.len();

            let mut events = Vec::new();
            game.claim_village(scout, HexCoord::new(7, 7), &mut events);
            let population = events.iter().any(|e| {
                matches!(e, GameEvent::VillageClaimed { reward: VillageReward::Population, .. })
            });
            if !population {
                continue;
            }
            granted += 1;
            let settlement = game.settlement(s).unwrap();
            assert_eq!(settlement.population, 2);
            assert_eq!(settlement.territory.len(), territory + 1);
            assert!(events
                .iter()
                .any(|e| matches!(e, GameEvent::SettlementGrew { population: 2, .. })));
        }
        assert!(granted > 0);
    }

    #[test]
    fn test_fortify() {
        let (mut game, a, _) = game(WorldGrid::filled(3, 3, Terrain::Plains));
        let id = game
            .spawn_unit(a, UnitType::Warrior, HexCoord::new(1, 1), &mut Vec::new())
            .unwrap();
        game.fortify_unit(id, &mut Vec::new()).unwrap();
        assert!(game.unit(id).unwrap().fortified);
        let settler = game
            .spawn_unit(a, UnitType::Settler, HexCoord::new(0, 0), &mut Vec::new())
            .unwrap();
        assert!(game.fortify_unit(settler, &mut Vec::new()).is_err());
    }
}
