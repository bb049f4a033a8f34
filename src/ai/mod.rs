//! Empire decision engine
//!
//! Runs once per turn for every AI-controlled empire. Research and civics
//! come first so units and queues see this turn's choices, then every unit
//! acts in id order, then settlements fire and refill their queues, and
//! diplomacy closes the turn.

pub mod diplomacy;
pub mod explore;
pub mod great_person;
pub mod military;
pub mod personality;
pub mod production;
pub mod research;
pub mod settler;
pub mod worker;

pub use personality::Personality;

use tracing::debug;

use crate::core::types::{EmpireId, UnitId};
use crate::events::EventSink;
use crate::game::GameState;
use crate::rules::UnitRole;

/// Orders for one unit, chosen by its role
pub fn command_unit(game: &mut GameState, id: UnitId, sink: &mut dyn EventSink) {
    let Some(unit) = game.unit(id) else {
        return;
    };
    let role = unit.role();
    if unit.is_combatant() {
        military::auto_promote(game, id, sink);
    }
    if game.unit(id).map_or(true, |u| u.movement_left <= 0.0 || u.work_order.is_some()) {
        return;
    }

    match role {
        UnitRole::Settler => settler::act(game, id, sink),
        UnitRole::Worker => worker::act(game, id, sink),
        UnitRole::Scout => {
            explore::explore(game, id, true, sink);
        }
        UnitRole::Military => military::act(game, id, sink),
        UnitRole::GreatPerson(kind) => great_person::act(game, id, kind, sink),
    }
}

/// A full AI turn for `id`; does nothing for humans and eliminated empires
pub fn take_turn(game: &mut GameState, id: EmpireId, sink: &mut dyn EventSink) {
    let Ok(empire) = game.empire(id) else {
        return;
    };
    if !empire.is_ai() || empire.eliminated {
        return;
    }
    debug!("{} ({:?}) takes its turn", id, empire.personality);

    research::pick_research(game, id);
    research::manage_civics(game, id, sink);

    let units: Vec<UnitId> = game
        .empires
        .get(&id)
        .map(|e| e.units.keys().copied().collect())
        .unwrap_or_default();
    for unit in units {
        command_unit(game, unit, sink);
    }

    military::settlement_fire(game, id, sink);
    production::fill_queues(game, id);
    diplomacy::conduct_diplomacy(game, id, sink);
}
