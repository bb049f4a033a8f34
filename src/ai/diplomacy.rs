//! The AI's diplomatic pass over every empire it has met

use tracing::{debug, warn};

use crate::core::types::EmpireId;
use crate::diplomacy::{should_accept_peace, should_declare_war, Status};
use crate::events::{EventSink, GameEvent};
use crate::game::GameState;

/// War, peace and alliance decisions against each known empire, in id order
pub fn conduct_diplomacy(game: &mut GameState, id: EmpireId, sink: &mut dyn EventSink) {
    let config = game.config.diplomacy.clone();
    for other in game.diplomacy.known_empires(id) {
        let Ok(them) = game.empire(other) else {
            continue;
        };
        if them.eliminated {
            continue;
        }
        let other_is_ai = them.is_ai();
        let Some(rel) = game.diplomacy.relationship(id, other).cloned() else {
            continue;
        };
        let own = game.military_strength(id);
        let theirs = game.military_strength(other);

        if rel.is_at_war() {
            if !should_accept_peace(own, theirs, rel.turns_at_war, &config, &mut game.rng) {
                continue;
            }
            if !other_is_ai {
                debug!("{} offers peace to {}", id, other);
                sink.emit(GameEvent::PeaceProposed { from: id, to: other });
                continue;
            }
            if should_accept_peace(theirs, own, rel.turns_at_war, &config, &mut game.rng) {
                if let Err(e) = game.diplomacy.make_peace(id, other, &config, sink) {
                    warn!("{} could not make peace with {}: {}", id, other, e);
                }
            }
            continue;
        }

        if should_declare_war(own, theirs, rel.opinion, &config) && !game.diplomacy.has_peace_treaty(id, other) {
            debug!("{} ({:.1}) moves against {} ({:.1})", id, own, other, theirs);
            if let Err(e) = game.diplomacy.declare_war(id, other, &config, sink) {
                warn!("{} could not declare war on {}: {}", id, other, e);
            }
            continue;
        }

        let ready = matches!(rel.status, Status::Friendly | Status::Peace) && rel.opinion >= config.alliance_opinion;
        if ready && other_is_ai {
            if let Err(e) = game.diplomacy.propose_alliance(id, other, &config, sink) {
                warn!("{} could not ally with {}: {}", id, other, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::core::types::Controller;
    use crate::grid::{HexCoord, Terrain, WorldGrid};
    use crate::rules::UnitType;

    fn armies(red: usize, blue: usize, blue_controller: Controller) -> (GameState, EmpireId, EmpireId) {
        let mut game = GameState::new(WorldGrid::filled(30, 10, Terrain::Plains), GameConfig::default(), 6);
        let a = game.add_empire("Red", Controller::Ai);
        let b = game.add_empire("Blue", blue_controller);
        for i in 0..red {
            game.spawn_unit(a, UnitType::Warrior, HexCoord::new(i as i32, 0), &mut Vec::new())
                .unwrap();
        }
        for i in 0..blue {
            game.spawn_unit(b, UnitType::Warrior, HexCoord::new(29 - i as i32, 9), &mut Vec::new())
                .unwrap();
        }
        game.diplomacy.meet(a, b, &mut Vec::new());
        (game, a, b)
    }

    #[test]
    fn test_declares_only_when_strong_and_hostile() {
        let (mut game, a, b) = armies(2, 1, Controller::Ai);
        game.diplomacy.adjust_opinion(a, b, -25.0);
        conduct_diplomacy(&mut game, a, &mut Vec::new());
        assert!(game.diplomacy.is_at_war(a, b));

        let (mut game, a, b) = armies(6, 5, Controller::Ai);
        game.diplomacy.adjust_opinion(a, b, -25.0);
        conduct_diplomacy(&mut game, a, &mut Vec::new());
        assert!(!game.diplomacy.is_at_war(a, b));
    }

    #[test]
    fn test_losing_side_sues_for_peace() {
        let (mut game, a, b) = armies(1, 4, Controller::Ai);
        let config = game.config.diplomacy.clone();
        game.diplomacy.declare_war(b, a, &config, &mut Vec::new()).unwrap();
        conduct_diplomacy(&mut game, a, &mut Vec::new());
        assert!(game.diplomacy.is_at_war(a, b));

        // Blue accepts only once the war drags on
        for _ in 0..31 {
            game.diplomacy.tick(&Default::default(), &config, &mut Vec::new());
        }
        let mut events = Vec::new();
        conduct_diplomacy(&mut game, a, &mut events);
        assert!(!game.diplomacy.is_at_war(a, b));
        assert!(game.diplomacy.has_peace_treaty(a, b));
    }

    #[test]
    fn test_humans_receive_proposals() {
        let (mut game, a, b) = armies(1, 4, Controller::Human);
        let config = game.config.diplomacy.clone();
        game.diplomacy.declare_war(b, a, &config, &mut Vec::new()).unwrap();
        for _ in 0..10 {
            game.diplomacy.tick(&Default::default(), &config, &mut Vec::new());
        }
        let mut events = Vec::new();
        conduct_diplomacy(&mut game, a, &mut events);
        assert_eq!(events, vec![GameEvent::PeaceProposed { from: a, to: b }]);
        assert!(game.diplomacy.is_at_war(a, b));
    }
}
