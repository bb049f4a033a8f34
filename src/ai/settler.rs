//! Settler site selection

use tracing::{debug, warn};

use crate::ai::explore::explore;
use crate::core::config::AiConfig;
use crate::core::types::{EmpireId, UnitId};
use crate::entities::SettlerMemory;
use crate::events::EventSink;
use crate::game::GameState;
use crate::grid::{GridProvider, HexCoord, ResourceClass, Tile};

fn neighbor_value(tile: &Tile) -> f32 {
    let y = tile.yields();
    let mut value = 2.0 * y.food + 1.5 * y.production + y.gold;
    if tile.has_river() {
        value += 3.0;
    }
    match tile.resource_class() {
        Some(ResourceClass::Luxury) => value += 5.0,
        Some(ResourceClass::Strategic) => value += 4.0,
        Some(ResourceClass::Bonus) => value += 2.0,
        None => {}
    }
    value
}

/// Worth of founding on `coord`, summed over its six neighbors
pub fn settle_score<G: GridProvider + ?Sized>(grid: &G, coord: HexCoord) -> f32 {
    coord
        .neighbors()
        .iter()
        .filter_map(|c| grid.tile_at(*c))
        .map(neighbor_value)
        .sum()
}

/// Score a site must reach; loosens the farther and longer a settler wanders
pub fn settle_threshold(memory: &SettlerMemory, position: HexCoord, config: &AiConfig) -> f32 {
    let distance = memory.origin.distance(&position);
    let [mid_distance, late_distance] = config.settle_distance_steps;
    let [mid_turns, late_turns] = config.settle_turn_steps;
    let [start, mid, late] = config.settle_thresholds;

    if distance >= late_distance || memory.turns_searching >= late_turns {
        late
    } else if distance >= mid_distance || memory.turns_searching >= mid_turns {
        mid
    } else {
        start
    }
}

/// Habitable, not someone else's land, and clear of every settlement
pub fn can_settle(game: &GameState, owner: EmpireId, coord: HexCoord) -> bool {
    let Some(tile) = game.grid.tile_at(coord) else {
        return false;
    };
    tile.is_habitable()
        && tile.owner.map_or(true, |o| o == owner)
        && game
            .nearest_settlement_distance(coord)
            .map_or(true, |d| d >= game.config.ai.settlement_spacing)
}

fn found(game: &mut GameState, id: UnitId, sink: &mut dyn EventSink) -> bool {
    match game.found_settlement(id, sink) {
        Ok(_) => true,
        Err(e) => {
            warn!("{} could not settle: {}", id, e);
            false
        }
    }
}

/// Threshold at `at` by the settler's search memory as it stands now
fn current_threshold(game: &GameState, id: UnitId, at: HexCoord, config: &AiConfig) -> f32 {
    game.unit(id)
        .and_then(|u| u.settler.as_ref())
        .map_or(config.settle_thresholds[0], |memory| settle_threshold(memory, at, config))
}

/// One turn of a settler: settle here, walk toward a better site, or keep
/// looking
pub fn act(game: &mut GameState, id: UnitId, sink: &mut dyn EventSink) {
    let Some(unit) = game.unit(id).cloned() else {
        return;
    };
    let owner = unit.owner;
    let here = unit.position;
    let config = game.config.ai.clone();
    let memory = unit.settler.clone().unwrap_or_else(|| SettlerMemory::new(here));

    let threshold = settle_threshold(&memory, here, &config);
    let here_score = settle_score(&game.grid, here);
    let here_valid = can_settle(game, owner, here);
    if here_valid && here_score >= threshold {
        debug!("{} settles at {:?} ({:.1} >= {:.1})", id, here, here_score, threshold);
        found(game, id, sink);
        return;
    }

    let own_distance = memory.origin.distance(&here);
    let radius = if own_distance <= config.near_origin_distance {
        config.search_radius_near
    } else {
        config.search_radius_far
    };
    let profile = game.unit_profile(&unit);
    let best = here
        .range(radius)
        .into_iter()
        .filter(|c| *c != here && !memory.visited.contains(c))
        .filter(|c| game.grid.tile_at(*c).is_some_and(|t| profile.can_enter(t)))
        .filter(|c| !game.is_foreign_occupied(*c, owner) && can_settle(game, owner, *c))
        .map(|c| {
            let mut value = settle_score(&game.grid, c);
            if memory.origin.distance(&c) > own_distance {
                value += config.farther_bonus;
            }
            (c, value)
        })
        .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)));

    if let Some(u) = game.unit_mut(id) {
        let memory = u.settler.get_or_insert_with(|| SettlerMemory::new(here));
        memory.turns_searching += 1;
        memory.visited.insert(here);
    }

    let here_value = if here_valid { here_score } else { f32::NEG_INFINITY };
    match best {
        Some((target, value)) if value > here_value => {
            debug!("{} heads for {:?} ({:.1})", id, target, value);
            match game.move_unit(id, target, sink) {
                Ok(at) => {
                    if let Some(memory) = game.unit_mut(id).and_then(|u| u.settler.as_mut()) {
                        memory.visited.insert(at);
                    }
                    let threshold = current_threshold(game, id, at, &config);
                    let score = settle_score(&game.grid, at);
                    if at == target && score >= threshold && can_settle(game, owner, at) {
                        debug!("{} settles on arrival at {:?} ({:.1} >= {:.1})", id, at, score, threshold);
                        found(game, id, sink);
                    }
                }
                Err(e) => {
                    debug!("{} cannot reach {:?}: {}", id, target, e);
                    explore(game, id, false, sink);
                }
            }
        }
        _ => {
            let threshold = current_threshold(game, id, here, &config);
            if here_valid && here_score >= threshold {
                debug!("{} settles in place at {:?} ({:.1} >= {:.1})", id, here, here_score, threshold);
                found(game, id, sink);
            } else {
                explore(game, id, false, sink);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::core::types::Controller;
    use crate::grid::{ResourceKind, Terrain, WorldGrid};
    use crate::rules::UnitType;

    fn desert() -> (GameState, EmpireId) {
        let mut game = GameState::new(WorldGrid::filled(14, 12, Terrain::Desert), GameConfig::default(), 5);
        let a = game.add_empire("Red", Controller::Ai);
        (game, a)
    }

    fn paint(game: &mut GameState, coord: HexCoord, terrain: Terrain) {
        game.grid.tile_at_mut(coord).unwrap().terrain = terrain;
    }

    #[test]
    fn test_score_weights() {
        let (mut game, _) = desert();
        let at = HexCoord::new(5, 5);
        paint(&mut game, at.neighbor(0), Terrain::Grassland);
        paint(&mut game, at.neighbor(1), Terrain::Hills);
        assert_eq!(settle_score(&game.grid, at), 7.0);

        let tile = game.grid.tile_at_mut(at.neighbor(2)).unwrap();
        tile.resource = Some(ResourceKind::Silk);
        // +2 gold from silk, +2 any resource, +3 luxury
        assert_eq!(settle_score(&game.grid, at), 14.0);
    }

    #[test]
    fn test_threshold_steps_down() {
        let config = AiConfig::default();
        let mut memory = SettlerMemory::new(HexCoord::new(0, 0));
        assert_eq!(settle_threshold(&memory, HexCoord::new(1, 0), &config), 8.0);
        assert_eq!(settle_threshold(&memory, HexCoord::new(4, 0), &config), 6.5);
        assert_eq!(settle_threshold(&memory, HexCoord::new(8, 0), &config), 5.0);
        memory.turns_searching = 5;
        assert_eq!(settle_threshold(&memory, HexCoord::new(1, 0), &config), 6.5);
        memory.turns_searching = 10;
        assert_eq!(settle_threshold(&memory, HexCoord::new(1, 0), &config), 5.0);
    }

    #[test]
    fn test_settles_at_once_on_good_ground() {
        let (mut game, a) = desert();
        let at = HexCoord::new(5, 5);
        paint(&mut game, at, Terrain::Grassland);
        paint(&mut game, at.neighbor(0), Terrain::Grassland);
        paint(&mut game, at.neighbor(1), Terrain::Tundra);
        paint(&mut game, at.neighbor(2), Terrain::Coast);
        assert_eq!(settle_score(&game.grid, at), 9.0);

        let settler = game.spawn_unit(a, UnitType::Settler, at, &mut Vec::new()).unwrap();
        act(&mut game, settler, &mut Vec::new());
        assert!(game.unit(settler).is_none());
        assert_eq!(game.settlement_at(at).map(|s| s.owner), Some(a));
    }

    #[test]
    fn test_spacing_blocks_site() {
        let (mut game, a) = desert();
        let first = game
            .spawn_unit(a, UnitType::Settler, HexCoord::new(2, 2), &mut Vec::new())
            .unwrap();
        game.found_settlement(first, &mut Vec::new()).unwrap();
        assert!(!can_settle(&game, a, HexCoord::new(5, 2)));
        assert!(can_settle(&game, a, HexCoord::new(7, 2)));
        assert!(!can_settle(&game, a, HexCoord::new(2, 2)));
    }

    #[test]
    fn test_poor_site_is_not_settled_on_arrival() {
        let (mut game, a) = desert();
        let settler = game
            .spawn_unit(a, UnitType::Settler, HexCoord::new(6, 6), &mut Vec::new())
            .unwrap();
        game.unit_mut(settler).unwrap().movement_left = 6.0;

        act(&mut game, settler, &mut Vec::new());
        let unit = game.unit(settler).unwrap();
        assert_ne!(unit.position, HexCoord::new(6, 6));
        assert!(unit.settler.as_ref().unwrap().visited.contains(&unit.position));
        assert!(game.empire(a).unwrap().settlements.is_empty());
    }

    #[test]
    fn test_medium_site_near_origin_is_not_settled() {
        let (mut game, a) = desert();
        let at = HexCoord::new(6, 6);
        paint(&mut game, at.neighbor(0), Terrain::Grassland);
        paint(&mut game, at.neighbor(1), Terrain::Tundra);
        assert_eq!(settle_score(&game.grid, at), 6.0);

        let settler = game.spawn_unit(a, UnitType::Settler, at, &mut Vec::new()).unwrap();
        let mut memory = SettlerMemory::new(at);
        memory.visited.extend(at.range(3));
        game.unit_mut(settler).unwrap().settler = Some(memory);

        act(&mut game, settler, &mut Vec::new());
        assert!(game.unit(settler).is_some());
        assert!(game.empire(a).unwrap().settlements.is_empty());

        // The same site passes once the search has dragged on
        let (mut game, a) = desert();
        paint(&mut game, at.neighbor(0), Terrain::Grassland);
        paint(&mut game, at.neighbor(1), Terrain::Tundra);
        let settler = game.spawn_unit(a, UnitType::Settler, at, &mut Vec::new()).unwrap();
        let mut memory = SettlerMemory::new(at);
        memory.visited.extend(at.range(3));
        memory.turns_searching = 9;
        game.unit_mut(settler).unwrap().settler = Some(memory);

        act(&mut game, settler, &mut Vec::new());
        assert!(game.unit(settler).is_none());
        assert_eq!(game.settlement_at(at).map(|s| s.owner), Some(a));
    }

    #[test]
    fn test_walks_toward_better_site() {
        let (mut game, a) = desert();
        for c in HexCoord::new(6, 5).range(1) {
            paint(&mut game, c, Terrain::Grassland);
        }
        let settler = game
            .spawn_unit(a, UnitType::Settler, HexCoord::new(2, 5), &mut Vec::new())
            .unwrap();

        act(&mut game, settler, &mut Vec::new());
        let unit = game.unit(settler).unwrap();
        assert_ne!(unit.position, HexCoord::new(2, 5));
        assert_eq!(unit.settler.as_ref().unwrap().turns_searching, 1);

        for _ in 0..3 {
            if let Some(u) = game.unit_mut(settler) {
                u.refresh();
            } else {
                break;
            }
            act(&mut game, settler, &mut Vec::new());
        }
        let s = game.empire(a).unwrap().settlements.values().next().unwrap();
        assert!(s.position.distance(&HexCoord::new(6, 5)) <= 2);
    }
}
