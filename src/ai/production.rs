//! What each settlement builds next

use rand::Rng;
use tracing::{debug, warn};

use crate::ai::personality::Personality;
use crate::core::types::{EmpireId, SettlementId};
use crate::entities::{Empire, ProductionItem};
use crate::game::GameState;
use crate::rules::{BuildingKind, UnitRole, UnitType, WonderKind};

/// Shared building order once personality wants are met
pub const BUILDING_PRIORITY: [BuildingKind; 12] = [
    BuildingKind::Monument,
    BuildingKind::Granary,
    BuildingKind::Library,
    BuildingKind::Market,
    BuildingKind::Temple,
    BuildingKind::Workshop,
    BuildingKind::Walls,
    BuildingKind::Barracks,
    BuildingKind::University,
    BuildingKind::Observatory,
    BuildingKind::Colosseum,
    BuildingKind::Castle,
];

/// Units of an empire plus the ones already queued, counted by `counts`
fn planned(empire: &Empire, counts: impl Fn(UnitType) -> bool) -> usize {
    let fielded = empire.units.values().filter(|u| counts(u.kind)).count();
    let queued = empire
        .settlements
        .values()
        .flat_map(|s| s.queue.iter())
        .filter(|item| matches!(item, ProductionItem::Unit(kind) if counts(*kind)))
        .count();
    fielded + queued
}

fn is_military(kind: UnitType) -> bool {
    kind.role() == UnitRole::Military
}

/// Strongest land unit the settlement can train
fn best_military(game: &GameState, settlement: SettlementId) -> Option<UnitType> {
    UnitType::MILITARY
        .into_iter()
        .filter(|kind| !kind.is_naval())
        .filter(|kind| game.can_produce(settlement, ProductionItem::Unit(*kind)))
        .max_by(|a, b| power(*a).total_cmp(&power(*b)))
}

fn power(kind: UnitType) -> f32 {
    let stats = kind.stats();
    stats.ranged.map_or(stats.strength, |r| r.strength.max(stats.strength))
}

fn unit_if(game: &GameState, settlement: SettlementId, kind: UnitType) -> Option<ProductionItem> {
    let item = ProductionItem::Unit(kind);
    game.can_produce(settlement, item).then_some(item)
}

fn first_building(game: &GameState, settlement: SettlementId, order: &[BuildingKind]) -> Option<ProductionItem> {
    order
        .iter()
        .map(|b| ProductionItem::Building(*b))
        .find(|item| game.can_produce(settlement, *item))
}

fn personality_pick(game: &GameState, settlement: SettlementId, empire: &Empire) -> Option<ProductionItem> {
    let settlements = empire.settlements.len();
    let ai = &game.config.ai;
    match empire.personality {
        Personality::Aggressive => {
            if planned(empire, is_military) < ai.aggressive_military_per_settlement * settlements {
                return best_military(game, settlement).map(ProductionItem::Unit);
            }
            None
        }
        Personality::Builder => {
            if planned(empire, |k| k == UnitType::Worker) < settlements + 1 {
                return unit_if(game, settlement, UnitType::Worker);
            }
            None
        }
        Personality::Scientist => first_building(game, settlement, &BuildingKind::SCIENCE),
        Personality::Balanced => None,
    }
}

/// Next item for a settlement, by personality first and then the shared order
pub fn choose_production(game: &mut GameState, settlement: SettlementId) -> ProductionItem {
    let Some(owner) = game.settlement_owner(settlement) else {
        return ProductionItem::Wealth;
    };
    if let Some(item) = pick_without_wonder(game, owner, settlement) {
        return item;
    }

    let wonders: Vec<WonderKind> = WonderKind::ALL
        .into_iter()
        .filter(|w| game.can_produce(settlement, ProductionItem::Wonder(*w)))
        .collect();
    if !wonders.is_empty() && game.rng.gen::<f32>() < game.config.ai.wonder_chance {
        let pick = wonders[game.rng.gen_range(0..wonders.len())];
        return ProductionItem::Wonder(pick);
    }
    ProductionItem::Wealth
}

fn pick_without_wonder(game: &GameState, owner: EmpireId, settlement: SettlementId) -> Option<ProductionItem> {
    let empire = game.empires.get(&owner)?;
    if let Some(item) = personality_pick(game, settlement, empire) {
        return Some(item);
    }

    let ai = &game.config.ai;
    let settlements = empire.settlements.len();
    if planned(empire, |k| k == UnitType::Worker) < ai.max_workers.min(settlements) {
        if let Some(item) = unit_if(game, settlement, UnitType::Worker) {
            return Some(item);
        }
    }
    if planned(empire, |k| k == UnitType::Settler) == 0 && settlements < ai.expansion_settlement_cap {
        if let Some(item) = unit_if(game, settlement, UnitType::Settler) {
            return Some(item);
        }
    }
    if let Some(item) = first_building(game, settlement, &BUILDING_PRIORITY) {
        return Some(item);
    }
    if planned(empire, is_military) < ai.military_per_settlement * settlements {
        return best_military(game, settlement).map(ProductionItem::Unit);
    }
    None
}

/// Queue something in every settlement of `owner` whose queue ran dry
pub fn fill_queues(game: &mut GameState, owner: EmpireId) {
    let idle: Vec<SettlementId> = game
        .empires
        .get(&owner)
        .map(|e| {
            e.settlements
                .values()
                .filter(|s| s.queue.is_empty())
                .map(|s| s.id)
                .collect()
        })
        .unwrap_or_default();

    for settlement in idle {
        let item = choose_production(game, settlement);
        debug!("{} queues {}", settlement, item.name());
        if let Err(e) = game.enqueue(settlement, item) {
            warn!("{} could not queue {}: {}", settlement, item.name(), e);
        }
    }
}
