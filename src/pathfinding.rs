//! Movement-budget reachability (Dijkstra) and best-cost paths (A*)
//!
//! Both searches share the same passability rules, so a destination missing
//! from an unbounded `reachable_tiles` is exactly one `find_path` cannot reach.

use ahash::{AHashMap, AHashSet};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use crate::grid::{GridProvider, HexCoord, Tile, ROAD_MOVEMENT_COST};

/// Which tiles a unit may stand on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementProfile {
    /// Land unit; `can_embark` lets it cross shallow water
    Land { can_embark: bool },
    /// Ship; `ocean_capable` lets it leave shallow water
    Naval { ocean_capable: bool },
}

impl MovementProfile {
    pub const LAND: MovementProfile = MovementProfile::Land { can_embark: false };

    pub fn can_enter(&self, tile: &Tile) -> bool {
        match *self {
            MovementProfile::Land { can_embark } => {
                if tile.is_water() {
                    can_embark && !tile.terrain.is_deep_water()
                } else {
                    !tile.is_impassable()
                }
            }
            MovementProfile::Naval { ocean_capable } => {
                tile.is_water() && (ocean_capable || !tile.terrain.is_deep_water())
            }
        }
    }

    pub fn is_naval(&self) -> bool {
        matches!(self, MovementProfile::Naval { .. })
    }

    /// Cost to enter `tile` under this profile
    pub fn step_cost(&self, tile: &Tile) -> f32 {
        if tile.is_water() {
            1.0
        } else {
            tile.movement_cost()
        }
    }
}

/// Every tile reachable within `budget`, mapped to its cheapest cost.
///
/// The origin is included at cost 0. Tiles are settled in ascending cost order,
/// so the first pop of a tile is its true minimum.
pub fn reachable_tiles<G: GridProvider + ?Sized>(
    grid: &G,
    origin: HexCoord,
    budget: f32,
    profile: MovementProfile,
) -> BTreeMap<HexCoord, f32> {
    let mut settled = BTreeMap::new();
    if grid.tile_at(origin).is_none() {
        return settled;
    }

    let mut best: AHashMap<HexCoord, f32> = AHashMap::new();
    let mut frontier = BinaryHeap::new();
    best.insert(origin, 0.0);
    frontier.push(Reverse((OrderedFloat(0.0_f32), origin)));

    while let Some(Reverse((OrderedFloat(cost), coord))) = frontier.pop() {
        if settled.contains_key(&coord) {
            continue;
        }
        // Stale entry superseded by a cheaper route
        if best.get(&coord).is_some_and(|&b| cost > b) {
            continue;
        }
        settled.insert(coord, cost);

        for neighbor in coord.neighbors() {
            if settled.contains_key(&neighbor) {
                continue;
            }
            let Some(tile) = grid.tile_at(neighbor) else {
                continue;
            };
            if !profile.can_enter(tile) {
                continue;
            }

            let next = cost + profile.step_cost(tile);
            if next > budget {
                continue;
            }
            if next < *best.get(&neighbor).unwrap_or(&f32::INFINITY) {
                best.insert(neighbor, next);
                frontier.push(Reverse((OrderedFloat(next), neighbor)));
            }
        }
    }

    settled
}

/// Best-cost path from `origin` to `destination`, both inclusive.
///
/// Returns an empty vector when the destination is unreachable.
pub fn find_path<G: GridProvider + ?Sized>(
    grid: &G,
    origin: HexCoord,
    destination: HexCoord,
    profile: MovementProfile,
) -> Vec<HexCoord> {
    find_path_avoiding(grid, origin, destination, profile, &|_: HexCoord| false)
}

/// `find_path` that also refuses to route through tiles for which `blocked`
/// is true. The destination itself is never considered blocked.
pub fn find_path_avoiding<G: GridProvider + ?Sized>(
    grid: &G,
    origin: HexCoord,
    destination: HexCoord,
    profile: MovementProfile,
    blocked: &dyn Fn(HexCoord) -> bool,
) -> Vec<HexCoord> {
    if grid.tile_at(origin).is_none() {
        return Vec::new();
    }
    if origin == destination {
        return vec![origin];
    }
    match grid.tile_at(destination) {
        Some(tile) if profile.can_enter(tile) => {}
        _ => return Vec::new(),
    }

    // Hex distance scaled by the cheapest possible step stays admissible on roads
    let heuristic = |c: HexCoord| c.distance(&destination) as f32 * ROAD_MOVEMENT_COST;

    let mut open = BinaryHeap::new();
    let mut came_from: AHashMap<HexCoord, HexCoord> = AHashMap::new();
    let mut g_scores: AHashMap<HexCoord, f32> = AHashMap::new();
    let mut closed: AHashSet<HexCoord> = AHashSet::new();

    g_scores.insert(origin, 0.0);
    open.push(Reverse((OrderedFloat(heuristic(origin)), origin)));

    while let Some(Reverse((_, current))) = open.pop() {
        if current == destination {
            return reconstruct_path(&came_from, current);
        }
        if !closed.insert(current) {
            continue;
        }

        let current_g = *g_scores.get(&current).unwrap_or(&f32::INFINITY);

        for neighbor in current.neighbors() {
            if closed.contains(&neighbor) {
                continue;
            }
            let Some(tile) = grid.tile_at(neighbor) else {
                continue;
            };
            if !profile.can_enter(tile) {
                continue;
            }
            if neighbor != destination && blocked(neighbor) {
                continue;
            }

            let tentative_g = current_g + profile.step_cost(tile);
            if tentative_g < *g_scores.get(&neighbor).unwrap_or(&f32::INFINITY) {
                came_from.insert(neighbor, current);
                g_scores.insert(neighbor, tentative_g);
                open.push(Reverse((OrderedFloat(tentative_g + heuristic(neighbor)), neighbor)));
            }
        }
    }

    Vec::new()
}

fn reconstruct_path(came_from: &AHashMap<HexCoord, HexCoord>, mut current: HexCoord) -> Vec<HexCoord> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Cost of walking `path`, excluding the starting tile
pub fn path_cost<G: GridProvider + ?Sized>(grid: &G, path: &[HexCoord], profile: MovementProfile) -> f32 {
    path.iter()
        .skip(1)
        .filter_map(|coord| grid.tile_at(*coord))
        .map(|tile| profile.step_cost(tile))
        .sum()
}
