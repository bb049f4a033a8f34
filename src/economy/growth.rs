//! Food storage, growth and starvation

use tracing::debug;

use crate::core::types::SettlementId;
use crate::events::{EventSink, GameEvent};
use crate::game::GameState;
use crate::rules::BuildingKind;

/// Radius within which a growing settlement claims new tiles
pub const TERRITORY_CLAIM_RADIUS: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthResult {
    Stable,
    Grew(u32),
    Starved(u32),
}

impl GameState {
    /// Add a population point and claim a tile for it
    pub fn grow_settlement(&mut self, id: SettlementId, sink: &mut dyn EventSink) -> Option<u32> {
        let s = self.settlement_mut(id)?;
        s.population += 1;
        let owner = s.owner;
        let population = s.population;
        debug!("{} grew to {}", id, population);
        sink.emit(GameEvent::SettlementGrew {
            owner,
            settlement: id,
            population,
        });
        self.expand_territory(id, TERRITORY_CLAIM_RADIUS);
        Some(population)
    }

    /// Store this turn's food surplus and grow or starve the settlement
    pub fn apply_food(&mut self, id: SettlementId, surplus: f32, sink: &mut dyn EventSink) -> GrowthResult {
        let base = self.config.economy.growth_base;
        let per_pop = self.config.economy.growth_per_pop;
        let retention = self.config.economy.granary_retention;

        let Some(s) = self.settlement_mut(id) else {
            return GrowthResult::Stable;
        };
        let owner = s.owner;
        s.food += surplus;

        let result = if s.food < 0.0 {
            s.food = 0.0;
            if s.population > 1 {
                s.population -= 1;
                GrowthResult::Starved(s.population)
            } else {
                GrowthResult::Stable
            }
        } else if s.food >= s.growth_threshold(base, per_pop) {
            let kept = if s.has_building(BuildingKind::Granary) {
                s.food * retention
            } else {
                0.0
            };
            s.food = kept;
            GrowthResult::Grew(s.population + 1)
        } else {
            GrowthResult::Stable
        };

        match result {
            GrowthResult::Grew(_) => {
                self.grow_settlement(id, sink);
            }
            GrowthResult::Starved(population) => {
                debug!("{} starved to {}", id, population);
                sink.emit(GameEvent::SettlementStarved {
                    owner,
                    settlement: id,
                    population,
                });
            }
            GrowthResult::Stable => {}
        }
        result
    }
}
