//! The explicit game context passed into every operation
//!
//! `GameState` owns the grid, every empire, the diplomacy table, the tuning
//! and the seeded RNG. Nothing in the core reaches for global state.

pub mod actions;
pub mod movement;
pub mod scenario;
pub mod settlements;

pub use scenario::{EmpireSetup, Scenario};

use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::core::config::GameConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::{Controller, EmpireId, EmpirePair, GameRng, SettlementId, UnitId};
use crate::diplomacy::Diplomacy;
use crate::entities::{Empire, Settlement, Unit};
use crate::events::{EventSink, GameEvent};
use crate::grid::{GridProvider, HexCoord, ResourceClass, WorldGrid};
use crate::pathfinding::MovementProfile;
use crate::rules::{TechId, UnitType, WonderKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub grid: WorldGrid,
    pub empires: BTreeMap<EmpireId, Empire>,
    pub diplomacy: Diplomacy,
    /// Wonders already completed somewhere, with their builder
    pub wonders_built: BTreeMap<WonderKind, EmpireId>,
    pub config: GameConfig,
    pub rng: GameRng,
    /// Rounds completed so far
    pub turn: u32,
    next_empire_id: u32,
    next_unit_id: u32,
    next_settlement_id: u32,
}

impl GameState {
    pub fn new(grid: WorldGrid, config: GameConfig, seed: u64) -> Self {
        Self {
            grid,
            empires: BTreeMap::new(),
            diplomacy: Diplomacy::new(),
            wonders_built: BTreeMap::new(),
            config,
            rng: GameRng::seed_from_u64(seed),
            turn: 0,
            next_empire_id: 0,
            next_unit_id: 0,
            next_settlement_id: 0,
        }
    }

    pub fn add_empire(&mut self, name: impl Into<String>, controller: Controller) -> EmpireId {
        let id = EmpireId::new(self.next_empire_id);
        self.next_empire_id += 1;
        let empire = Empire::new(
            id,
            name,
            controller,
            self.config.economy.golden_age_threshold,
            self.config.economy.great_person_threshold,
        );
        self.empires.insert(id, empire);
        id
    }

    pub fn empire(&self, id: EmpireId) -> Result<&Empire> {
        self.empires.get(&id).ok_or(GameError::EmpireNotFound(id))
    }

    pub fn empire_mut(&mut self, id: EmpireId) -> Result<&mut Empire> {
        self.empires.get_mut(&id).ok_or(GameError::EmpireNotFound(id))
    }

    /// Empires still in the game, in id order
    pub fn living_empires(&self) -> Vec<EmpireId> {
        self.empires
            .values()
            .filter(|e| !e.eliminated)
            .map(|e| e.id)
            .collect()
    }

    pub fn unit_owner(&self, id: UnitId) -> Option<EmpireId> {
        self.empires
            .values()
            .find(|e| e.units.contains_key(&id))
            .map(|e| e.id)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.empires.values().find_map(|e| e.units.get(&id))
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.empires.values_mut().find_map(|e| e.units.get_mut(&id))
    }

    pub fn units_at(&self, coord: HexCoord) -> impl Iterator<Item = &Unit> {
        self.empires
            .values()
            .flat_map(|e| e.units.values())
            .filter(move |u| u.position == coord)
    }

    pub fn settlement_owner(&self, id: SettlementId) -> Option<EmpireId> {
        self.empires
            .values()
            .find(|e| e.settlements.contains_key(&id))
            .map(|e| e.id)
    }

    pub fn settlement(&self, id: SettlementId) -> Option<&Settlement> {
        self.empires.values().find_map(|e| e.settlements.get(&id))
    }

    pub fn settlement_mut(&mut self, id: SettlementId) -> Option<&mut Settlement> {
        self.empires.values_mut().find_map(|e| e.settlements.get_mut(&id))
    }

    pub fn settlement_at(&self, coord: HexCoord) -> Option<&Settlement> {
        let id = self.grid.tile_at(coord)?.settlement?;
        self.settlement(id)
    }

    pub fn all_settlements(&self) -> impl Iterator<Item = &Settlement> {
        self.empires.values().flat_map(|e| e.settlements.values())
    }

    /// Distance to the closest settlement of any empire
    pub fn nearest_settlement_distance(&self, coord: HexCoord) -> Option<i32> {
        self.all_settlements().map(|s| s.position.distance(&coord)).min()
    }

    /// Land units may cross shallow water once their empire knows sailing
    pub fn can_embark(&self, owner: EmpireId) -> bool {
        self.empires
            .get(&owner)
            .is_some_and(|e| e.research.has(TechId::Sailing))
    }

    pub fn unit_profile(&self, unit: &Unit) -> MovementProfile {
        unit.movement_profile(self.can_embark(unit.owner))
    }

    /// Tiles holding a unit or settlement that does not belong to `owner`
    pub fn foreign_positions(&self, owner: EmpireId) -> BTreeSet<HexCoord> {
        self.empires
            .values()
            .filter(|e| e.id != owner)
            .flat_map(|e| {
                e.units
                    .values()
                    .map(|u| u.position)
                    .chain(e.settlements.values().map(|s| s.position))
            })
            .collect()
    }

    pub fn is_foreign_occupied(&self, coord: HexCoord, owner: EmpireId) -> bool {
        self.empires
            .values()
            .filter(|e| e.id != owner)
            .any(|e| e.units.values().any(|u| u.position == coord) || e.settlement_at(coord).is_some())
    }

    pub fn military_strength(&self, id: EmpireId) -> f32 {
        self.empires.get(&id).map_or(0.0, |e| e.military_strength())
    }

    /// Create a unit on `at` for `owner`
    pub fn spawn_unit(
        &mut self,
        owner: EmpireId,
        kind: UnitType,
        at: HexCoord,
        sink: &mut dyn EventSink,
    ) -> Result<UnitId> {
        if !self.grid.contains(at) {
            return Err(GameError::TileNotFound(at));
        }
        let id = UnitId(self.next_unit_id);
        let empire = self.empires.get_mut(&owner).ok_or(GameError::EmpireNotFound(owner))?;
        self.next_unit_id += 1;

        let mut unit = Unit::new(id, owner, kind, at);
        unit.embarked = !kind.is_naval() && self.grid.tile_at(at).is_some_and(|t| t.is_water());
        empire.units.insert(id, unit);

        debug!("{} spawned {:?} {} at {:?}", owner, kind, id, at);
        sink.emit(GameEvent::UnitCreated { owner, unit: id, kind, at });
        self.refresh_visibility(owner, sink);
        Ok(id)
    }

    /// Take a unit out of its empire; returns it if it existed
    pub fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        self.empires.values_mut().find_map(|e| e.units.remove(&id))
    }

    /// Remove a destroyed unit exactly once and report it
    pub fn kill_unit(&mut self, id: UnitId, by: Option<EmpireId>, sink: &mut dyn EventSink) -> Option<Unit> {
        let unit = self.remove_unit(id)?;
        debug!("{} of {} was destroyed", id, unit.owner);
        sink.emit(GameEvent::UnitKilled {
            owner: unit.owner,
            unit: id,
            by,
        });
        self.check_elimination(unit.owner, sink);
        Some(unit)
    }

    /// Mark an empire with nothing left as eliminated
    pub fn check_elimination(&mut self, id: EmpireId, sink: &mut dyn EventSink) -> bool {
        let Some(empire) = self.empires.get_mut(&id) else {
            return false;
        };
        if empire.eliminated || !empire.is_defeated() {
            return false;
        }
        empire.eliminated = true;
        self.diplomacy.remove_empire(id);
        tracing::info!("{} has been eliminated", id);
        sink.emit(GameEvent::EmpireEliminated { empire: id });
        true
    }

    /// Recount strategic and luxury resources from territory and trade deals
    pub fn refresh_resources(&mut self, id: EmpireId) {
        let received = self.diplomacy.resources_received(id);
        let Some(empire) = self.empires.get(&id) else {
            return;
        };

        let mut strategic = BTreeMap::new();
        let mut luxuries = BTreeSet::new();
        let territory = empire.settlements.values().flat_map(|s| s.territory.iter());
        let owned = territory.filter_map(|c| self.grid.tile_at(*c)).filter_map(|t| t.resource);
        for resource in owned.chain(received) {
            match resource.class() {
                ResourceClass::Strategic => *strategic.entry(resource).or_insert(0) += 1,
                ResourceClass::Luxury => {
                    luxuries.insert(resource);
                }
                ResourceClass::Bonus => {}
            }
        }

        if let Some(empire) = self.empires.get_mut(&id) {
            empire.strategic = strategic;
            empire.luxuries = luxuries;
        }
    }

    /// Pairs of empires whose territories share an edge
    pub fn touching_pairs(&self) -> BTreeSet<EmpirePair> {
        let mut pairs = BTreeSet::new();
        for tile in self.grid.tiles() {
            let Some(owner) = tile.owner else {
                continue;
            };
            for neighbor in self.grid.neighbors(tile.coord) {
                if let Some(other) = neighbor.owner {
                    if let Some(pair) = EmpirePair::new(owner, other) {
                        pairs.insert(pair);
                    }
                }
            }
        }
        pairs
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
