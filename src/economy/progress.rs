//! Golden ages, great people and score

use tracing::{info, warn};

use crate::core::types::{EmpireId, UnitId};
use crate::entities::Empire;
use crate::events::{EventSink, GameEvent};
use crate::game::GameState;
use crate::rules::GreatPersonKind;

/// Derived score: settlements, population, techs, units, culture and gold
pub fn score(empire: &Empire) -> u32 {
    let total = 10.0 * empire.settlements.len() as f32
        + 3.0 * empire.total_population() as f32
        + 4.0 * empire.research.unlocked.len() as f32
        + empire.units.len() as f32
        + empire.culture_total / 10.0
        + empire.gold.max(0.0) / 20.0;
    total.floor() as u32
}

impl GameState {
    /// Begin a golden age now, raising the threshold for the next one
    pub fn start_golden_age(&mut self, id: EmpireId, sink: &mut dyn EventSink) {
        let turns = self.config.economy.golden_age_turns;
        let growth = self.config.economy.golden_age_growth;
        let Some(empire) = self.empires.get_mut(&id) else {
            return;
        };
        let state = &mut empire.golden_age;
        if state.active {
            state.turns_left += turns;
        } else {
            state.active = true;
            state.turns_left = turns;
            state.threshold *= growth;
        }
        info!("{} entered a golden age", id);
        sink.emit(GameEvent::GoldenAgeStarted { empire: id });
    }

    /// Count down an active golden age, or feed positive happiness toward
    /// the next one
    pub fn advance_golden_age(&mut self, id: EmpireId, happiness: i32, sink: &mut dyn EventSink) {
        let Some(empire) = self.empires.get_mut(&id) else {
            return;
        };
        let state = &mut empire.golden_age;
        if state.active {
            state.turns_left = state.turns_left.saturating_sub(1);
            if state.turns_left == 0 {
                state.active = false;
                info!("{}'s golden age ended", id);
                sink.emit(GameEvent::GoldenAgeEnded { empire: id });
            }
            return;
        }
        if happiness > 0 {
            state.progress += happiness as f32;
        }
        if state.progress >= state.threshold {
            state.progress -= state.threshold;
            self.start_golden_age(id, sink);
        }
    }

    /// Add this turn's great-person points from buildings and wonders
    pub fn accumulate_great_person_points(&mut self, id: EmpireId) {
        let Some(empire) = self.empires.get_mut(&id) else {
            return;
        };
        let earned: Vec<(GreatPersonKind, f32)> = empire
            .settlements
            .values()
            .flat_map(|s| s.structures())
            .filter_map(|b| b.great_person)
            .collect();
        for (kind, points) in earned {
            if let Some(pool) = empire.great_people.get_mut(&kind) {
                pool.points += points;
            }
        }
    }

    /// Spawn a great person at the capital for every pool past its
    /// threshold. Thresholds grow after each birth.
    pub fn check_great_people(&mut self, id: EmpireId, sink: &mut dyn EventSink) -> Vec<UnitId> {
        let growth = self.config.economy.great_person_growth;
        let Some(capital) = self
            .empires
            .get(&id)
            .and_then(|e| e.capital())
            .map(|s| s.position)
        else {
            return Vec::new();
        };

        let mut born = Vec::new();
        for kind in GreatPersonKind::ALL {
            let ready = self
                .empires
                .get_mut(&id)
                .and_then(|e| e.great_people.get_mut(&kind))
                .filter(|pool| pool.points >= pool.threshold)
                .map(|pool| {
                    pool.points -= pool.threshold;
                    pool.threshold *= growth;
                })
                .is_some();
            if !ready {
                continue;
            }
            match self.spawn_unit(id, kind.unit_type(), capital, sink) {
                Ok(unit) => {
                    info!("{} gained a great {:?}", id, kind);
                    sink.emit(GameEvent::GreatPersonBorn { empire: id, kind, unit });
                    born.push(unit);
                }
                Err(e) => warn!("{} could not place a great {:?}: {}", id, kind, e),
            }
        }
        born
    }
}
