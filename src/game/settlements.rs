//! Founding and capturing settlements

use tracing::info;

use crate::core::error::{GameError, Result};
use crate::core::types::{EmpireId, SettlementId, UnitId};
use crate::entities::Settlement;
use crate::events::{EventSink, GameEvent};
use crate::game::GameState;
use crate::grid::{GridProvider, HexCoord};
use crate::rules::UnitRole;

/// Founding closer than this to any settlement is refused
pub const MIN_SETTLEMENT_SPACING: i32 = 3;

/// Share of max HP a captured settlement keeps
const CAPTURED_HP_SHARE: f32 = 0.25;

impl GameState {
    /// Consume a settler to found a population-1 settlement on its tile.
    ///
    /// The new territory is the tile plus every unowned neighbour. An
    /// empire's first settlement becomes its capital.
    pub fn found_settlement(&mut self, settler: UnitId, sink: &mut dyn EventSink) -> Result<SettlementId> {
        let unit = self.unit(settler).ok_or(GameError::UnitNotFound(settler))?;
        if unit.role() != UnitRole::Settler {
            return Err(GameError::InvalidAction(format!("{} cannot found settlements", settler)));
        }
        let owner = unit.owner;
        let at = unit.position;

        let tile = self.grid.tile_at(at).ok_or(GameError::TileNotFound(at))?;
        if !tile.is_habitable() {
            return Err(GameError::InvalidAction(format!("{:?} is not habitable", at)));
        }
        if tile.owner.is_some_and(|o| o != owner) {
            return Err(GameError::InvalidAction(format!("{:?} belongs to another empire", at)));
        }
        if let Some(d) = self.nearest_settlement_distance(at) {
            if d < MIN_SETTLEMENT_SPACING {
                return Err(GameError::InvalidAction(format!(
                    "{:?} is {} tiles from a settlement",
                    at, d
                )));
            }
        }

        let id = SettlementId(self.next_settlement_id);
        self.next_settlement_id += 1;

        let empire = self.empires.get(&owner).ok_or(GameError::EmpireNotFound(owner))?;
        let name = format!("{} {}", empire.name, empire.settlements.len() + 1);
        let is_capital = empire.settlements.is_empty();

        let mut settlement = Settlement::new(id, owner, name.clone(), at, self.config.economy.settlement_max_hp);
        settlement.is_capital = is_capital;
        for neighbor in at.neighbors() {
            if self.grid.tile_at(neighbor).is_some_and(|t| t.owner.is_none()) {
                settlement.territory.insert(neighbor);
            }
        }
        for coord in &settlement.territory {
            if let Some(tile) = self.grid.tile_at_mut(*coord) {
                tile.owner = Some(owner);
            }
        }
        if let Some(tile) = self.grid.tile_at_mut(at) {
            tile.settlement = Some(id);
        }

        self.remove_unit(settler);
        if let Some(empire) = self.empires.get_mut(&owner) {
            empire.settlements.insert(id, settlement);
        }

        info!("{} founded {} at {:?}", owner, name, at);
        sink.emit(GameEvent::SettlementFounded {
            owner,
            settlement: id,
            name,
            at,
        });
        self.refresh_resources(owner);
        self.refresh_visibility(owner, sink);
        Ok(id)
    }

    /// Take over a settlement whose HP has fallen to zero with an adjacent
    /// melee unit. Population drops by one, HP resets to a quarter, and the
    /// territory and production queue move to the new owner.
    pub fn capture_settlement(
        &mut self,
        capturer: UnitId,
        target: SettlementId,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        let unit = self.unit(capturer).ok_or(GameError::UnitNotFound(capturer))?;
        let settlement = self.settlement(target).ok_or(GameError::SettlementNotFound(target))?;
        let new_owner = unit.owner;
        let old_owner = settlement.owner;
        let at = settlement.position;

        if new_owner == old_owner || !self.diplomacy.is_at_war(new_owner, old_owner) {
            return Err(GameError::NotHostile(new_owner, old_owner));
        }
        if !unit.is_combatant() || unit.ranged().is_some() || unit.kind.is_naval() {
            return Err(GameError::InvalidAction(format!("{} cannot capture settlements", capturer)));
        }
        let distance = unit.position.distance(&at);
        if distance > 1 {
            return Err(GameError::OutOfRange { distance, range: 1 });
        }
        if settlement.hp > 0 {
            return Err(GameError::InvalidAction(format!("{} still has {} HP", target, settlement.hp)));
        }

        // Garrisoned defenders fall with the walls
        let garrison: Vec<UnitId> = self
            .units_at(at)
            .filter(|u| u.owner == old_owner)
            .map(|u| u.id)
            .collect();
        for id in garrison {
            self.kill_unit(id, Some(new_owner), sink);
        }

        let Some(mut settlement) = self
            .empires
            .get_mut(&old_owner)
            .and_then(|e| e.settlements.remove(&target))
        else {
            return Err(GameError::SettlementNotFound(target));
        };
        let was_capital = settlement.is_capital;
        settlement.owner = new_owner;
        settlement.population = settlement.population.saturating_sub(1).max(1);
        settlement.hp = (settlement.max_hp as f32 * CAPTURED_HP_SHARE).round() as i32;
        settlement.is_capital = false;
        settlement.food = 0.0;
        for coord in &settlement.territory {
            if let Some(tile) = self.grid.tile_at_mut(*coord) {
                tile.owner = Some(new_owner);
            }
        }

        if let Some(loser) = self.empires.get_mut(&old_owner) {
            if was_capital {
                if let Some(next) = loser.settlements.values_mut().next() {
                    next.is_capital = true;
                }
            }
        }
        if let Some(winner) = self.empires.get_mut(&new_owner) {
            if winner.settlements.is_empty() {
                settlement.is_capital = true;
            }
            winner.settlements.insert(target, settlement);
        }

        if let Some(u) = self.unit_mut(capturer) {
            u.position = at;
            u.movement_left = 0.0;
            u.fortified = false;
            u.acted = true;
        }

        info!("{} captured {} from {}", new_owner, target, old_owner);
        sink.emit(GameEvent::SettlementCaptured {
            settlement: target,
            from: old_owner,
            to: new_owner,
        });

        self.refresh_resources(old_owner);
        self.refresh_resources(new_owner);
        self.refresh_visibility(new_owner, sink);
        self.check_elimination(old_owner, sink);
        Ok(())
    }

    /// Unclaimed tile within `radius` of `settlement` that
    /// touches existing territory and has the best yields
    pub fn best_expansion_tile(&self, settlement: SettlementId, radius: i32) -> Option<HexCoord> {
        let s = self.settlement(settlement)?;
        s.position
            .range(radius)
            .into_iter()
            .filter(|c| !s.territory.contains(c))
            .filter(|c| c.neighbors().iter().any(|n| s.territory.contains(n)))
            .filter_map(|c| self.grid.tile_at(c))
            .filter(|t| t.owner.is_none())
            .max_by(|a, b| {
                let score = |t: &crate::grid::Tile| {
                    let y = t.yields();
                    2.0 * y.food + 1.5 * y.production + y.gold
                };
                score(a)
                    .total_cmp(&score(b))
                    .then_with(|| b.coord.cmp(&a.coord))
            })
            .map(|t| t.coord)
    }

    /// Claim one more tile for a settlement's territory
    pub fn expand_territory(&mut self, settlement: SettlementId, radius: i32) -> Option<HexCoord> {
        let coord = self.best_expansion_tile(settlement, radius)?;
        let owner = self.settlement_owner(settlement)?;
        if let Some(tile) = self.grid.tile_at_mut(coord) {
            tile.owner = Some(owner);
        }
        if let Some(s) = self.settlement_mut(settlement) {
            s.territory.insert(coord);
        }
        self.refresh_resources(owner);
        Some(coord)
    }

    /// Whose territory `coord` is in
    pub fn territory_owner(&self, coord: HexCoord) -> Option<EmpireId> {
        self.grid.tile_at(coord).and_then(|t| t.owner)
    }
}
