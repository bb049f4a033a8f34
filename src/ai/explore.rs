//! Frontier-seeking exploration shared by scouts and idle military units

use rand::Rng;
use tracing::debug;

use crate::core::config::AiConfig;
use crate::core::types::UnitId;
use crate::entities::Empire;
use crate::events::EventSink;
use crate::game::GameState;
use crate::grid::{GridProvider, HexCoord, Terrain};

/// Upper bound on single steps per turn, whatever the movement budget
const MAX_STEPS: usize = 8;

/// Desirability of stepping onto `coord` for an explorer of `empire`.
/// Undiscovered ground pulls hard, already-visible surroundings push away.
pub fn explore_score<G: GridProvider + ?Sized>(
    grid: &G,
    empire: &Empire,
    coord: HexCoord,
    hills_bonus: bool,
    config: &AiConfig,
) -> f32 {
    let unknown = |c: &HexCoord| grid.tile_at(*c).is_some() && !empire.discovered.contains(c);

    let mut score = 0.0;
    if !empire.discovered.contains(&coord) {
        score += config.scout_undiscovered;
    }
    score += config.scout_near_undiscovered * coord.ring(1).iter().filter(|&c| unknown(c)).count() as f32;
    score += config.scout_far_undiscovered * coord.ring(2).iter().filter(|&c| unknown(c)).count() as f32;
    if hills_bonus && grid.tile_at(coord).is_some_and(|t| t.terrain == Terrain::Hills) {
        score += config.scout_hills;
    }
    let visible = coord
        .neighbors()
        .iter()
        .filter(|&c| empire.visible.contains(c))
        .count();
    score - config.scout_visible_penalty * visible as f32
}

/// Step an explorer toward the most promising neighbor until its movement
/// runs out. Returns true if it moved at all.
pub fn explore(game: &mut GameState, id: UnitId, hills_bonus: bool, sink: &mut dyn EventSink) -> bool {
    let mut moved = false;
    for _ in 0..MAX_STEPS {
        let Some(unit) = game.unit(id).cloned() else {
            break;
        };
        if unit.movement_left <= 0.0 || unit.work_order.is_some() {
            break;
        }
        let Ok(empire) = game.empire(unit.owner) else {
            break;
        };
        let profile = game.unit_profile(&unit);

        let scored: Vec<(HexCoord, f32)> = unit
            .position
            .neighbors()
            .into_iter()
            .filter(|c| game.grid.tile_at(*c).is_some_and(|t| profile.can_enter(t)))
            .filter(|c| !game.is_foreign_occupied(*c, unit.owner))
            .map(|c| (c, explore_score(&game.grid, empire, c, hills_bonus, &game.config.ai)))
            .collect();
        if scored.is_empty() {
            break;
        }

        let jitter = game.config.ai.scout_jitter;
        let mut best: Option<(HexCoord, f32)> = None;
        for (coord, score) in scored {
            let total = score + game.rng.gen::<f32>() * jitter;
            if best.map_or(true, |(_, b)| total > b) {
                best = Some((coord, total));
            }
        }
        let Some((target, score)) = best else {
            break;
        };

        match game.move_unit(id, target, sink) {
            Ok(at) if at != unit.position => {
                debug!("{} explores to {:?} ({:.1})", id, at, score);
                moved = true;
            }
            _ => break,
        }
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::core::types::{Controller, EmpireId};
    use crate::grid::WorldGrid;
    use crate::rules::UnitType;

    fn game() -> (GameState, EmpireId) {
        let mut game = GameState::new(WorldGrid::filled(16, 16, Terrain::Plains), GameConfig::default(), 9);
        let a = game.add_empire("Red", Controller::Ai);
        (game, a)
    }

    #[test]
    fn test_undiscovered_beats_known() {
        let (mut game, a) = game();
        let config = AiConfig::default();
        let empire = game.empire_mut(a).unwrap();
        empire.discovered.insert(HexCoord::new(5, 5));
        let empire = game.empire(a).unwrap();

        let known = explore_score(&game.grid, empire, HexCoord::new(5, 5), true, &config);
        let unknown = explore_score(&game.grid, empire, HexCoord::new(9, 9), true, &config);
        assert!(unknown > known);
        // 150 + 6 * 20 + 12 * 5
        assert_eq!(unknown, 330.0);
    }

    #[test]
    fn test_hills_bonus_only_when_asked() {
        let (mut game, a) = game();
        game.grid.tile_at_mut(HexCoord::new(3, 3)).unwrap().terrain = Terrain::Hills;
        let config = AiConfig::default();
        let empire = game.empire(a).unwrap();
        let scout = explore_score(&game.grid, empire, HexCoord::new(3, 3), true, &config);
        let soldier = explore_score(&game.grid, empire, HexCoord::new(3, 3), false, &config);
        assert_eq!(scout - soldier, 25.0);
    }

    #[test]
    fn test_scout_spends_its_movement_and_discovers() {
        let (mut game, a) = game();
        let scout = game
            .spawn_unit(a, UnitType::Scout, HexCoord::new(8, 8), &mut Vec::new())
            .unwrap();
        let before = game.empire(a).unwrap().discovered.len();
        assert!(explore(&mut game, scout, true, &mut Vec::new()));
        assert_eq!(game.unit(scout).unwrap().movement_left, 0.0);
        assert!(game.empire(a).unwrap().discovered.len() > before);
    }
}
