//! Turn driver primitives
//!
//! A round gives every living empire, in id order, `begin_turn`, then its
//! AI turn if it has one, then its economy. `end_round` ticks diplomacy
//! and advances the turn counter. Victory checks belong to the host.

use tracing::{debug, info};

use crate::ai;
use crate::core::types::EmpireId;
use crate::events::EventSink;
use crate::game::GameState;
use crate::grid::{GridProvider, Yields};

pub const HEAL_IN_SETTLEMENT: i32 = 15;
pub const HEAL_IN_TERRITORY: i32 = 10;
pub const HEAL_ELSEWHERE: i32 = 5;
pub const HEAL_FORTIFIED: i32 = 5;

/// Heal idle units and settlements, reset per-turn budgets, count down
/// work orders and recompute what the empire sees
pub fn begin_turn(game: &mut GameState, id: EmpireId, sink: &mut dyn EventSink) {
    let settlement_heal = game.config.economy.settlement_heal;
    let Some(empire) = game.empires.get_mut(&id) else {
        return;
    };
    if empire.eliminated {
        return;
    }

    let settlement_tiles: Vec<_> = empire.settlements.values().map(|s| s.position).collect();
    for unit in empire.units.values_mut() {
        if !unit.acted && unit.is_wounded() {
            let mut amount = if settlement_tiles.contains(&unit.position) {
                HEAL_IN_SETTLEMENT
            } else if game.grid.tile_at(unit.position).is_some_and(|t| t.owner == Some(id)) {
                HEAL_IN_TERRITORY
            } else {
                HEAL_ELSEWHERE
            };
            if unit.fortified {
                amount += HEAL_FORTIFIED;
            }
            amount += unit.heal_bonus();
            unit.heal(amount);
            debug!("{} heals {} to {}", unit.id, amount, unit.health);
        }
        unit.refresh();
    }
    for settlement in empire.settlements.values_mut() {
        settlement.heal(settlement_heal);
        settlement.has_attacked = false;
    }

    game.advance_work_orders(id, sink);
    game.refresh_visibility(id, sink);
}

/// The decision engine's turn for an AI empire; humans are skipped
pub fn run_ai_turn(game: &mut GameState, id: EmpireId, sink: &mut dyn EventSink) {
    ai::take_turn(game, id, sink);
}

pub fn run_economy(game: &mut GameState, id: EmpireId, sink: &mut dyn EventSink) -> Yields {
    game.update_economy(id, sink)
}

/// Close the round: diplomacy ages by a turn and the counter advances
pub fn end_round(game: &mut GameState, sink: &mut dyn EventSink) {
    let touching = game.touching_pairs();
    let config = game.config.diplomacy.clone();
    game.diplomacy.tick(&touching, &config, sink);
    game.turn += 1;
}

/// One full round for every living empire
pub fn play_round(game: &mut GameState, sink: &mut dyn EventSink) {
    for id in game.living_empires() {
        // Earlier empires may have eliminated this one during the round
        if game.empire(id).map_or(true, |e| e.eliminated) {
            continue;
        }
        begin_turn(game, id, sink);
        run_ai_turn(game, id, sink);
        run_economy(game, id, sink);
    }
    end_round(game, sink);
    info!("turn {} complete", game.turn);
}
