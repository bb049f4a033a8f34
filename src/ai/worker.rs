//! Worker jobs: improvements first, then roads, then wander

use rand::Rng;
use std::collections::BTreeSet;
use tracing::debug;

use crate::core::types::{EmpireId, UnitId};
use crate::entities::PendingEffect;
use crate::events::EventSink;
use crate::game::GameState;
use crate::grid::{GridProvider, HexCoord};

fn improvement_at(game: &GameState, owner: EmpireId, at: HexCoord) -> Option<PendingEffect> {
    let tile = game.grid.tile_at(at)?;
    if tile.owner != Some(owner) || !tile.is_improvable() {
        return None;
    }
    tile.suggested_improvement()
        .map(|improvement| PendingEffect::Improvement { at, improvement })
}

fn road_at(game: &GameState, owner: EmpireId, at: HexCoord) -> Option<PendingEffect> {
    let tile = game.grid.tile_at(at)?;
    (tile.owner == Some(owner) && !tile.road && !tile.is_water() && !tile.is_impassable())
        .then_some(PendingEffect::Road { at })
}

/// Tiles another worker of the same empire is already busy on
fn claimed_tiles(game: &GameState, owner: EmpireId, except: UnitId) -> BTreeSet<HexCoord> {
    game.empires
        .get(&owner)
        .map(|e| {
            e.units
                .values()
                .filter(|u| u.id != except)
                .filter_map(|u| u.work_order.map(|o| o.effect.target()))
                .collect()
        })
        .unwrap_or_default()
}

/// Closest owned tile, by distance then coordinate, where `job` applies
fn nearest_job(
    game: &GameState,
    id: UnitId,
    job: fn(&GameState, EmpireId, HexCoord) -> Option<PendingEffect>,
) -> Option<HexCoord> {
    let unit = game.unit(id)?;
    let owner = unit.owner;
    let profile = game.unit_profile(unit);
    let claimed = claimed_tiles(game, owner, id);
    let empire = game.empires.get(&owner)?;
    empire
        .settlements
        .values()
        .flat_map(|s| s.territory.iter().copied())
        .filter(|c| !claimed.contains(c) && job(game, owner, *c).is_some())
        .filter(|c| game.grid.tile_at(*c).is_some_and(|t| profile.can_enter(t)))
        .filter(|c| !game.is_foreign_occupied(*c, owner))
        .min_by_key(|c| (unit.position.distance(c), *c))
}

fn begin_job(game: &mut GameState, id: UnitId, effect: PendingEffect, sink: &mut dyn EventSink) -> bool {
    match game.start_work(id, effect, sink) {
        Ok(()) => true,
        Err(e) => {
            debug!("{} cannot start {:?}: {}", id, effect, e);
            false
        }
    }
}

/// Start `job` here, or walk to the nearest tile that takes it and start on
/// arrival. Returns false when no tile in the territory takes it.
fn pursue(
    game: &mut GameState,
    id: UnitId,
    job: fn(&GameState, EmpireId, HexCoord) -> Option<PendingEffect>,
    sink: &mut dyn EventSink,
) -> bool {
    let Some((owner, here)) = game.unit(id).map(|u| (u.owner, u.position)) else {
        return false;
    };
    if !claimed_tiles(game, owner, id).contains(&here) {
        if let Some(effect) = job(game, owner, here) {
            return begin_job(game, id, effect, sink);
        }
    }

    let Some(target) = nearest_job(game, id, job) else {
        return false;
    };
    debug!("{} heads for work at {:?}", id, target);
    match game.move_unit(id, target, sink) {
        Ok(at) if at == target => {
            if let Some(effect) = job(game, owner, at) {
                begin_job(game, id, effect, sink);
            }
            true
        }
        Ok(_) => true,
        Err(e) => {
            debug!("{} cannot reach {:?}: {}", id, target, e);
            false
        }
    }
}

fn wander(game: &mut GameState, id: UnitId, sink: &mut dyn EventSink) {
    let Some(unit) = game.unit(id).cloned() else {
        return;
    };
    let profile = game.unit_profile(&unit);
    let options: Vec<HexCoord> = unit
        .position
        .neighbors()
        .into_iter()
        .filter(|c| game.grid.tile_at(*c).is_some_and(|t| profile.can_enter(t)))
        .filter(|c| !game.is_foreign_occupied(*c, unit.owner))
        .collect();
    if options.is_empty() {
        return;
    }
    let pick = options[game.rng.gen_range(0..options.len())];
    if let Err(e) = game.move_unit(id, pick, sink) {
        debug!("{} cannot wander to {:?}: {}", id, pick, e);
    }
}

pub fn act(game: &mut GameState, id: UnitId, sink: &mut dyn EventSink) {
    if game.unit(id).map_or(true, |u| u.work_order.is_some()) {
        return;
    }
    if pursue(game, id, improvement_at, sink) {
        return;
    }
    if pursue(game, id, road_at, sink) {
        return;
    }
    debug!("{} has nothing to build", id);
    wander(game, id, sink);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::core::types::Controller;
    use crate::grid::{Improvement, Terrain, WorldGrid};
    use crate::rules::UnitType;

    fn founded() -> (GameState, EmpireId) {
        let mut game = GameState::new(WorldGrid::filled(12, 12, Terrain::Grassland), GameConfig::default(), 2);
        let a = game.add_empire("Red", Controller::Ai);
        let settler = game
            .spawn_unit(a, UnitType::Settler, HexCoord::new(5, 5), &mut Vec::new())
            .unwrap();
        game.found_settlement(settler, &mut Vec::new()).unwrap();
        (game, a)
    }

    #[test]
    fn test_rejected_job_leaves_worker_idle() {
        let (mut game, a) = founded();
        let worker = game
            .spawn_unit(a, UnitType::Worker, HexCoord::new(6, 5), &mut Vec::new())
            .unwrap();
        let elsewhere = PendingEffect::Road { at: HexCoord::new(7, 5) };
        assert!(!begin_job(&mut game, worker, elsewhere, &mut Vec::new()));
        let unit = game.unit(worker).unwrap();
        assert!(unit.work_order.is_none());
        assert!(unit.movement_left > 0.0);
    }

    #[test]
    fn test_improves_owned_tile_underfoot() {
        let (mut game, a) = founded();
        let at = HexCoord::new(6, 5);
        let worker = game.spawn_unit(a, UnitType::Worker, at, &mut Vec::new()).unwrap();
        act(&mut game, worker, &mut Vec::new());
        let order = game.unit(worker).unwrap().work_order.unwrap();
        assert_eq!(
            order.effect,
            PendingEffect::Improvement {
                at,
                improvement: Improvement::Farm
            }
        );
    }

    #[test]
    fn test_walks_into_territory() {
        let (mut game, a) = founded();
        let worker = game
            .spawn_unit(a, UnitType::Worker, HexCoord::new(9, 5), &mut Vec::new())
            .unwrap();
        act(&mut game, worker, &mut Vec::new());
        let unit = game.unit(worker).unwrap();
        assert!(unit.position.distance(&HexCoord::new(5, 5)) < 4);
    }

    #[test]
    fn test_roads_once_everything_is_improved() {
        let (mut game, a) = founded();
        let territory: Vec<HexCoord> = game
            .all_settlements()
            .flat_map(|s| s.territory.iter().copied())
            .collect();
        for c in &territory {
            let tile = game.grid.tile_at_mut(*c).unwrap();
            if tile.settlement.is_none() {
                tile.improvement = Some(Improvement::Farm);
            }
        }
        let at = HexCoord::new(6, 5);
        let worker = game.spawn_unit(a, UnitType::Worker, at, &mut Vec::new()).unwrap();
        act(&mut game, worker, &mut Vec::new());
        assert_eq!(
            game.unit(worker).unwrap().work_order.map(|o| o.effect),
            Some(PendingEffect::Road { at })
        );
    }

    #[test]
    fn test_two_workers_split_the_work() {
        let (mut game, a) = founded();
        let at = HexCoord::new(6, 5);
        let first = game.spawn_unit(a, UnitType::Worker, at, &mut Vec::new()).unwrap();
        let second = game.spawn_unit(a, UnitType::Worker, at, &mut Vec::new()).unwrap();
        act(&mut game, first, &mut Vec::new());
        act(&mut game, second, &mut Vec::new());
        let a_target = game.unit(first).unwrap().work_order.map(|o| o.effect.target());
        let b_target = game.unit(second).unwrap().work_order.map(|o| o.effect.target());
        assert_eq!(a_target, Some(at));
        assert_ne!(b_target, Some(at));
    }
}
