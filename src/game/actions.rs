//! Unit actions beyond moving and fighting: worker jobs, great people and
//! promotions

use tracing::{debug, info};

use crate::core::error::{GameError, Result};
use crate::core::types::{EmpireId, UnitId};
use crate::entities::{PendingEffect, WorkOrder};
use crate::events::{EventSink, GameEvent};
use crate::game::GameState;
use crate::grid::{GridProvider, ROAD_BUILD_TURNS};
use crate::rules::promotions;
use crate::rules::{GreatPersonKind, PromotionId, UnitRole};

/// Share of the current tech's cost a great scientist contributes
pub const SCIENTIST_RESEARCH_SHARE: f32 = 0.5;
pub const ENGINEER_PRODUCTION: f32 = 150.0;
pub const MERCHANT_GOLD: f32 = 150.0;

impl GameState {
    /// Start a multi-turn job on the worker's own tile. The worker spends
    /// the rest of its turn and stays put until the job completes.
    pub fn start_work(&mut self, id: UnitId, effect: PendingEffect, sink: &mut dyn EventSink) -> Result<()> {
        let unit = self.unit(id).ok_or(GameError::UnitNotFound(id))?;
        if unit.role() != UnitRole::Worker {
            return Err(GameError::InvalidAction(format!("{} is not a worker", id)));
        }
        if unit.work_order.is_some() {
            return Err(GameError::InvalidAction(format!("{} is already working", id)));
        }
        let at = effect.target();
        if unit.position != at {
            return Err(GameError::OutOfRange {
                distance: unit.position.distance(&at),
                range: 0,
            });
        }
        let owner = unit.owner;
        let tile = self.grid.tile_at(at).ok_or(GameError::TileNotFound(at))?;

        let turns = match effect {
            PendingEffect::Improvement { improvement, .. } => {
                if tile.owner != Some(owner) {
                    return Err(GameError::InvalidAction(format!("{:?} is outside {}'s territory", at, owner)));
                }
                if !tile.is_improvable() || tile.suggested_improvement() != Some(improvement) {
                    return Err(GameError::InvalidAction(format!("{:?} cannot take a {:?}", at, improvement)));
                }
                improvement.build_turns()
            }
            PendingEffect::Road { .. } => {
                if tile.road || tile.is_water() || tile.is_impassable() {
                    return Err(GameError::InvalidAction(format!("no road can be built on {:?}", at)));
                }
                ROAD_BUILD_TURNS
            }
        };

        if let Some(u) = self.unit_mut(id) {
            u.work_order = Some(WorkOrder {
                remaining_turns: turns,
                effect,
            });
            u.fortified = false;
            u.spend_movement(u.movement_left);
        }
        debug!("{} starts {:?} for {} turns", id, effect, turns);
        sink.emit(GameEvent::ImprovementStarted { owner, unit: id, effect });
        Ok(())
    }

    /// Count down every work order of `owner`, applying finished ones
    pub fn advance_work_orders(&mut self, owner: EmpireId, sink: &mut dyn EventSink) {
        let mut finished = Vec::new();
        if let Some(empire) = self.empires.get_mut(&owner) {
            for unit in empire.units.values_mut() {
                let Some(order) = unit.work_order.as_mut() else {
                    continue;
                };
                unit.acted = true;
                order.remaining_turns = order.remaining_turns.saturating_sub(1);
                if order.remaining_turns == 0 {
                    let effect = order.effect;
                    unit.work_order = None;
                    if unit.position == effect.target() {
                        finished.push(effect);
                    }
                }
            }
        }

        for effect in finished {
            let Some(tile) = self.grid.tile_at_mut(effect.target()) else {
                continue;
            };
            match effect {
                PendingEffect::Improvement { improvement, .. } => tile.improvement = Some(improvement),
                PendingEffect::Road { .. } => tile.road = true,
            }
            debug!("{} finished {:?}", owner, effect);
            sink.emit(GameEvent::ImprovementCompleted { owner, effect });
        }
    }

    /// Spend a great person standing in its empire's capital.
    /// Great generals have no such action; their aura is their use.
    pub fn use_great_person(&mut self, id: UnitId, sink: &mut dyn EventSink) -> Result<GreatPersonKind> {
        let unit = self.unit(id).ok_or(GameError::UnitNotFound(id))?;
        let UnitRole::GreatPerson(kind) = unit.role() else {
            return Err(GameError::InvalidAction(format!("{} is not a great person", id)));
        };
        let owner = unit.owner;
        let position = unit.position;
        let empire = self.empire(owner)?;
        let capital = empire
            .capital()
            .ok_or_else(|| GameError::InvalidAction(format!("{} has no capital", owner)))?;
        if capital.position != position {
            return Err(GameError::OutOfRange {
                distance: position.distance(&capital.position),
                range: 0,
            });
        }
        let capital_id = capital.id;

        match kind {
            GreatPersonKind::General => {
                return Err(GameError::InvalidAction("great generals lead armies instead".into()));
            }
            GreatPersonKind::Scientist => {
                let tech = empire
                    .research
                    .current
                    .ok_or_else(|| GameError::PrerequisiteMissing(format!("{} is not researching", owner)))?;
                self.advance_research(owner, tech.cost() * SCIENTIST_RESEARCH_SHARE, sink);
            }
            GreatPersonKind::Engineer => {
                if let Some(s) = self.settlement_mut(capital_id) {
                    s.production += ENGINEER_PRODUCTION;
                }
            }
            GreatPersonKind::Merchant => {
                self.empire_mut(owner)?.gold += MERCHANT_GOLD;
            }
            GreatPersonKind::Artist => self.start_golden_age(owner, sink),
        }

        self.remove_unit(id);
        info!("{} used a great {:?}", owner, kind);
        sink.emit(GameEvent::GreatPersonUsed { empire: owner, kind });
        Ok(kind)
    }

    /// Spend one earned level on `promotion`
    pub fn promote_unit(&mut self, id: UnitId, promotion: PromotionId, sink: &mut dyn EventSink) -> Result<()> {
        let unit = self.unit(id).ok_or(GameError::UnitNotFound(id))?;
        if unit.pending_promotions() == 0 {
            return Err(GameError::InvalidAction(format!("{} has no promotion to spend", id)));
        }
        let Some(class) = unit.stats().class else {
            return Err(GameError::InvalidAction(format!("{} cannot be promoted", id)));
        };
        if !promotions::eligible(class, &unit.promotions).iter().any(|p| p.id == promotion) {
            return Err(GameError::PrerequisiteMissing(format!("{} cannot take {:?}", id, promotion)));
        }
        let owner = unit.owner;
        if let Some(u) = self.unit_mut(id) {
            u.promotions.push(promotion);
        }
        debug!("{} promoted with {:?}", id, promotion);
        sink.emit(GameEvent::UnitPromoted {
            owner,
            unit: id,
            promotion,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::core::types::{Controller, SettlementId};
    use crate::grid::{HexCoord, Improvement, Terrain, WorldGrid};
    use crate::rules::{TechId, UnitType};

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
    fn test_farm_completes_after_build_turns() {
        let (mut game, a, _) = founded();
        let at = HexCoord::new(5, 4);
        let worker = game.spawn_unit(a, UnitType::Worker, at, &mut Vec::new()).unwrap();
        let effect = PendingEffect::Improvement {
            at,
            improvement: Improvement::Farm,
        };
        game.start_work(worker, effect, &mut Vec::new()).unwrap();
        assert_eq!(game.unit(worker).unwrap().movement_left, 0.0);
        assert!(game.move_unit(worker, HexCoord::new(6, 4), &mut Vec::new()).is_err());

        let mut events = Vec::new();
        for _ in 0..4 {
            game.advance_work_orders(a, &mut events);
        }
        assert!(game.grid.tile_at(at).unwrap().improvement.is_none());
        game.advance_work_orders(a, &mut events);
        assert_eq!(game.grid.tile_at(at).unwrap().improvement, Some(Improvement::Farm));
        assert!(game.unit(worker).unwrap().work_order.is_none());
        assert_eq!(events, vec![GameEvent::ImprovementCompleted { owner: a, effect }]);
    }

    #[test]
    fn test_work_needs_owned_matching_tile() {
        let (mut game, a, _) = founded();
        let outside = HexCoord::new(8, 8);
        let worker = game.spawn_unit(a, UnitType::Worker, outside, &mut Vec::new()).unwrap();
        let farm = PendingEffect::Improvement {
            at: outside,
            improvement: Improvement::Farm,
        };
        assert!(game.start_work(worker, farm, &mut Vec::new()).is_err());

        // Roads do not need territory
        game.start_work(worker, PendingEffect::Road { at: outside }, &mut Vec::new())
            .unwrap();
        for _ in 0..3 {
            game.advance_work_orders(a, &mut Vec::new());
        }
        assert!(game.grid.tile_at(outside).unwrap().road);
    }

    #[test]
    fn test_great_people_act_only_in_capital() {
        let (mut game, a, s) = founded();
        let merchant = game
            .spawn_unit(a, UnitType::GreatMerchant, HexCoord::new(1, 1), &mut Vec::new())
            .unwrap();
        assert!(game.use_great_person(merchant, &mut Vec::new()).is_err());

        game.unit_mut(merchant).unwrap().position = HexCoord::new(4, 4);
        let mut events = Vec::new();
        assert_eq!(game.use_great_person(merchant, &mut events).unwrap(), GreatPersonKind::Merchant);
        assert_eq!(game.empire(a).unwrap().gold, 150.0);
        assert!(game.unit(merchant).is_none());

        let engineer = game
            .spawn_unit(a, UnitType::GreatEngineer, HexCoord::new(4, 4), &mut Vec::new())
            .unwrap();
        game.use_great_person(engineer, &mut Vec::new()).unwrap();
        assert_eq!(game.settlement(s).unwrap().production, 150.0);

        let artist = game
            .spawn_unit(a, UnitType::GreatArtist, HexCoord::new(4, 4), &mut Vec::new())
            .unwrap();
        game.use_great_person(artist, &mut Vec::new()).unwrap();
        assert!(game.empire(a).unwrap().golden_age.active);

        let general = game
            .spawn_unit(a, UnitType::GreatGeneral, HexCoord::new(4, 4), &mut Vec::new())
            .unwrap();
        assert!(game.use_great_person(general, &mut Vec::new()).is_err());
        assert!(game.unit(general).is_some());
    }

    #[test]
    fn test_scientist_pays_half_the_tech() {
        let (mut game, a, _) = founded();
        game.set_research(a, TechId::Agriculture).unwrap();
        let scientist = game
            .spawn_unit(a, UnitType::GreatScientist, HexCoord::new(4, 4), &mut Vec::new())
            .unwrap();
        game.use_great_person(scientist, &mut Vec::new()).unwrap();
        assert_eq!(game.empire(a).unwrap().research.progress, 10.0);
    }

    #[test]
    fn test_promotion_rules() {
        let (mut game, a, _) = founded();
        let warrior = game
            .spawn_unit(a, UnitType::Warrior, HexCoord::new(1, 1), &mut Vec::new())
            .unwrap();
        assert!(game.promote_unit(warrior, PromotionId::Shock1, &mut Vec::new()).is_err());

        game.unit_mut(warrior).unwrap().xp = 10;
        assert!(game.promote_unit(warrior, PromotionId::Shock2, &mut Vec::new()).is_err());
        game.promote_unit(warrior, PromotionId::Shock1, &mut Vec::new()).unwrap();
        assert_eq!(game.unit(warrior).unwrap().promotions, vec![PromotionId::Shock1]);
        assert!(game.promote_unit(warrior, PromotionId::Shock2, &mut Vec::new()).is_err());
    }
}
