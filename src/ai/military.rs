//! Military unit behavior: fight, hunt, garrison, patrol, explore

use std::collections::BTreeSet;
use tracing::debug;

use crate::ai::explore::explore;
use crate::combat::SETTLEMENT_BOMBARD_RANGE;
use crate::core::types::{EmpireId, SettlementId, UnitId};
use crate::events::{Combatant, EventSink};
use crate::game::GameState;
use crate::grid::{Feature, GridProvider, HexCoord, Terrain};
use crate::rules::promotions;

/// Something an empire is at war with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Enemy {
    target: Combatant,
    position: HexCoord,
    health: i32,
}

fn enemies(game: &GameState, owner: EmpireId) -> Vec<Enemy> {
    let mut found = Vec::new();
    for other in game.empires.values() {
        if other.id == owner || other.eliminated || !game.diplomacy.is_at_war(owner, other.id) {
            continue;
        }
        found.extend(other.units.values().map(|u| Enemy {
            target: Combatant::Unit(u.id),
            position: u.position,
            health: u.health,
        }));
        found.extend(other.settlements.values().map(|s| Enemy {
            target: Combatant::Settlement(s.id),
            position: s.position,
            health: s.hp,
        }));
    }
    found
}

/// Melee units may walk into a fallen enemy settlement next to them
fn capture_adjacent(game: &mut GameState, id: UnitId, sink: &mut dyn EventSink) -> bool {
    let Some(unit) = game.unit(id).cloned() else {
        return false;
    };
    if unit.ranged().is_some() || unit.kind.is_naval() || !unit.is_combatant() {
        return false;
    }
    let fallen: Option<SettlementId> = enemies(game, unit.owner).into_iter().find_map(|e| match e.target {
        Combatant::Settlement(s) if e.health <= 0 && e.position.distance(&unit.position) <= 1 => Some(s),
        _ => None,
    });
    let Some(target) = fallen else {
        return false;
    };
    match game.capture_settlement(id, target, sink) {
        Ok(()) => true,
        Err(e) => {
            debug!("{} could not capture {}: {}", id, target, e);
            false
        }
    }
}

/// Attack whatever is in reach, weakest unit first, settlements after
/// units. Keeps swinging while attacks remain. Returns true if it fought.
pub fn try_attack(game: &mut GameState, id: UnitId, sink: &mut dyn EventSink) -> bool {
    if capture_adjacent(game, id, sink) {
        return true;
    }

    let mut fought = false;
    while let Some(unit) = game.unit(id).filter(|u| u.can_attack()).cloned() {
        let profile = game.unit_profile(&unit);
        let reach = unit.ranged().map_or(1, |r| r.range);
        let target = enemies(game, unit.owner)
            .into_iter()
            .filter(|e| e.health > 0)
            .filter(|e| unit.position.distance(&e.position) <= reach)
            .filter(|e| {
                unit.ranged().is_some() || game.grid.tile_at(e.position).is_some_and(|t| profile.can_enter(t))
            })
            .min_by_key(|e| (matches!(e.target, Combatant::Settlement(_)), e.health, e.position));
        let Some(enemy) = target else {
            break;
        };

        match game.attack(id, enemy.target, sink) {
            Ok(outcome) => {
                fought = true;
                if outcome.attacker_killed {
                    break;
                }
                if outcome.capturable && !outcome.ranged {
                    if let Combatant::Settlement(s) = enemy.target {
                        if game.capture_settlement(id, s, sink).is_ok() {
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                debug!("{} held its attack on {:?}: {}", id, enemy.target, e);
                break;
            }
        }
    }
    fought
}

/// Close in on the nearest visible enemy and strike if it is reached
fn advance(game: &mut GameState, id: UnitId, sink: &mut dyn EventSink) -> bool {
    let Some(unit) = game.unit(id).cloned() else {
        return false;
    };
    let Ok(empire) = game.empire(unit.owner) else {
        return false;
    };
    let radius = game.config.ai.enemy_search_radius;
    let profile = game.unit_profile(&unit);
    let Some(enemy) = enemies(game, unit.owner)
        .into_iter()
        .filter(|e| empire.visible.contains(&e.position))
        .filter(|e| unit.position.distance(&e.position) <= radius)
        .min_by_key(|e| (unit.position.distance(&e.position), e.position))
    else {
        return false;
    };

    let Some(approach) = enemy
        .position
        .neighbors()
        .into_iter()
        .filter(|c| game.grid.tile_at(*c).is_some_and(|t| profile.can_enter(t)))
        .filter(|c| *c == unit.position || !game.is_foreign_occupied(*c, unit.owner))
        .min_by_key(|c| (unit.position.distance(c), *c))
    else {
        return false;
    };

    debug!("{} advances on {:?} at {:?}", id, enemy.target, enemy.position);
    if approach != unit.position && game.move_unit(id, approach, sink).is_err() {
        return false;
    }
    try_attack(game, id, sink);
    true
}

/// First own settlement short of defenders, not counting `id` itself
fn settlement_needing(game: &GameState, id: UnitId) -> Option<(SettlementId, HexCoord)> {
    let unit = game.unit(id)?;
    let empire = game.empires.get(&unit.owner)?;
    let radius = game.config.ai.defender_radius;
    let needed = game.config.ai.min_defenders;
    empire
        .settlements
        .values()
        .find(|s| {
            let defenders = empire
                .units
                .values()
                .filter(|u| u.id != id && u.is_combatant() && u.position.distance(&s.position) <= radius)
                .count();
            defenders < needed
        })
        .map(|s| (s.id, s.position))
}

fn defensive_value(game: &GameState, owner: EmpireId, at: HexCoord) -> i32 {
    let Some(tile) = game.grid.tile_at(at) else {
        return i32::MIN;
    };
    let mut value = 0;
    if tile.terrain == Terrain::Hills {
        value += 10;
    }
    if tile.feature == Some(Feature::Forest) {
        value += 5;
    }
    if tile.has_river() {
        value += 3;
    }
    if tile.owner == Some(owner) {
        value += 5;
    }
    value
}

/// Best-scoring free tile around a settlement to hold
fn guard_tile(game: &GameState, id: UnitId, around: HexCoord) -> Option<HexCoord> {
    let unit = game.unit(id)?;
    let profile = game.unit_profile(unit);
    let taken: BTreeSet<HexCoord> = game
        .empires
        .get(&unit.owner)?
        .units
        .values()
        .filter(|u| u.id != id && u.is_military())
        .map(|u| u.position)
        .collect();
    around
        .range(game.config.ai.defender_radius)
        .into_iter()
        .filter(|c| game.grid.tile_at(*c).is_some_and(|t| profile.can_enter(t)))
        .filter(|c| !taken.contains(c) && !game.is_foreign_occupied(*c, unit.owner))
        .max_by_key(|c| {
            (
                defensive_value(game, unit.owner, *c),
                -unit.position.distance(c),
                std::cmp::Reverse(*c),
            )
        })
}

/// Garrison the first settlement that needs it. Fortifies once on post.
fn defend(game: &mut GameState, id: UnitId, sink: &mut dyn EventSink) -> bool {
    let Some((settlement, around)) = settlement_needing(game, id) else {
        return false;
    };
    let Some(post) = guard_tile(game, id, around) else {
        return false;
    };
    let Some(here) = game.unit(id).map(|u| u.position) else {
        return false;
    };

    debug!("{} guards {} from {:?}", id, settlement, post);
    let at = if post == here {
        here
    } else {
        match game.move_unit(id, post, sink) {
            Ok(at) => at,
            Err(e) => {
                debug!("{} cannot reach its post {:?}: {}", id, post, e);
                return false;
            }
        }
    };
    if at == post {
        hold(game, id, sink);
    }
    true
}

/// Fortify where the unit stands
fn hold(game: &mut GameState, id: UnitId, sink: &mut dyn EventSink) -> bool {
    match game.fortify_unit(id, sink) {
        Ok(()) => true,
        Err(e) => {
            debug!("{} cannot fortify: {}", id, e);
            false
        }
    }
}

/// Walk to the nearest own border tile that touches unseen ground
fn patrol(game: &mut GameState, id: UnitId, sink: &mut dyn EventSink) -> bool {
    let Some(unit) = game.unit(id).cloned() else {
        return false;
    };
    let Ok(empire) = game.empire(unit.owner) else {
        return false;
    };
    let profile = game.unit_profile(&unit);
    let target = empire
        .settlements
        .values()
        .flat_map(|s| s.territory.iter().copied())
        .filter(|c| *c != unit.position)
        .filter(|c| {
            c.neighbors()
                .iter()
                .any(|n| game.grid.contains(*n) && !empire.visible.contains(n))
        })
        .filter(|c| game.grid.tile_at(*c).is_some_and(|t| profile.can_enter(t)))
        .filter(|c| !game.is_foreign_occupied(*c, unit.owner))
        .min_by_key(|c| (unit.position.distance(c), *c));
    let Some(target) = target else {
        return false;
    };
    debug!("{} patrols to {:?}", id, target);
    game.move_unit(id, target, sink).is_ok()
}

/// Every settlement of `owner` fires on the weakest enemy unit in range
pub fn settlement_fire(game: &mut GameState, owner: EmpireId, sink: &mut dyn EventSink) {
    let ready: Vec<(SettlementId, HexCoord)> = game
        .empires
        .get(&owner)
        .map(|e| {
            e.settlements
                .values()
                .filter(|s| !s.has_attacked && s.hp > 0)
                .map(|s| (s.id, s.position))
                .collect()
        })
        .unwrap_or_default();

    for (settlement, at) in ready {
        let target = enemies(game, owner)
            .into_iter()
            .filter_map(|e| match e.target {
                Combatant::Unit(u) if e.position.distance(&at) <= SETTLEMENT_BOMBARD_RANGE => Some((e.health, u)),
                _ => None,
            })
            .min();
        if let Some((_, unit)) = target {
            if let Err(e) = game.bombard(settlement, unit, sink) {
                debug!("{} held fire on {}: {}", settlement, unit, e);
            }
        }
    }
}

/// Spend every earned level on the first promotion the unit qualifies for
pub fn auto_promote(game: &mut GameState, id: UnitId, sink: &mut dyn EventSink) {
    while let Some(unit) = game.unit(id).filter(|u| u.pending_promotions() > 0) {
        let Some(class) = unit.stats().class else {
            return;
        };
        let Some(pick) = promotions::eligible(class, &unit.promotions).first().map(|p| p.id) else {
            return;
        };
        if game.promote_unit(id, pick, sink).is_err() {
            return;
        }
    }
}

pub fn act(game: &mut GameState, id: UnitId, sink: &mut dyn EventSink) {
    let Some(unit) = game.unit(id).cloned() else {
        return;
    };
    if try_attack(game, id, sink) {
        return;
    }

    // A garrison holds its post
    let radius = game.config.ai.defender_radius;
    if unit.fortified && settlement_needing(game, id).is_some_and(|(_, at)| at.distance(&unit.position) <= radius) {
        hold(game, id, sink);
        return;
    }
    if game.unit(id).map_or(true, |u| u.movement_left <= 0.0) {
        return;
    }
    if advance(game, id, sink) {
        return;
    }
    if !unit.kind.is_naval() && defend(game, id, sink) {
        return;
    }
    if patrol(game, id, sink) {
        return;
    }
    explore(game, id, false, sink);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::core::types::Controller;
    use crate::grid::WorldGrid;
    use crate::rules::{PromotionId, UnitType};

    fn two_empires() -> (GameState, EmpireId, EmpireId) {
        let mut game = GameState::new(WorldGrid::filled(16, 12, Terrain::Plains), GameConfig::default(), 4);
        let a = game.add_empire("Red", Controller::Ai);
        let b = game.add_empire("Blue", Controller::Ai);
        (game, a, b)
    }

    fn at_war(game: &mut GameState, a: EmpireId, b: EmpireId) {
        let config = game.config.diplomacy.clone();
        game.diplomacy.meet(a, b, &mut Vec::new());
        game.diplomacy.declare_war(a, b, &config, &mut Vec::new()).unwrap();
    }

    #[test]
    fn test_hold_reports_civilians() {
        let (mut game, a, _) = two_empires();
        let worker = game
            .spawn_unit(a, UnitType::Worker, HexCoord::new(3, 3), &mut Vec::new())
            .unwrap();
        let warrior = game
            .spawn_unit(a, UnitType::Warrior, HexCoord::new(4, 3), &mut Vec::new())
            .unwrap();
        assert!(!hold(&mut game, worker, &mut Vec::new()));
        assert!(!game.unit(worker).unwrap().fortified);
        assert!(hold(&mut game, warrior, &mut Vec::new()));
        assert!(game.unit(warrior).unwrap().fortified);
    }

    #[test]
    fn test_attacks_weakest_adjacent() {
        let (mut game, a, b) = two_empires();
        let sword = game
            .spawn_unit(a, UnitType::Swordsman, HexCoord::new(5, 5), &mut Vec::new())
            .unwrap();
        let healthy = game
            .spawn_unit(b, UnitType::Warrior, HexCoord::new(6, 5), &mut Vec::new())
            .unwrap();
        let hurt = game
            .spawn_unit(b, UnitType::Warrior, HexCoord::new(5, 6), &mut Vec::new())
            .unwrap();
        game.unit_mut(hurt).unwrap().health = 40;
        at_war(&mut game, a, b);

        assert!(try_attack(&mut game, sword, &mut Vec::new()));
        assert_eq!(game.unit(healthy).unwrap().health, 100);
        assert!(game.unit(hurt).map_or(true, |u| u.health < 40));
    }

    #[test]
    fn test_no_attack_without_war() {
        let (mut game, a, b) = two_empires();
        let sword = game
            .spawn_unit(a, UnitType::Swordsman, HexCoord::new(5, 5), &mut Vec::new())
            .unwrap();
        game.spawn_unit(b, UnitType::Warrior, HexCoord::new(6, 5), &mut Vec::new())
            .unwrap();
        assert!(!try_attack(&mut game, sword, &mut Vec::new()));
    }

    #[test]
    fn test_advances_on_visible_enemy() {
        let (mut game, a, b) = two_empires();
        let sword = game
            .spawn_unit(a, UnitType::Swordsman, HexCoord::new(2, 5), &mut Vec::new())
            .unwrap();
        let warrior = game
            .spawn_unit(b, UnitType::Warrior, HexCoord::new(4, 5), &mut Vec::new())
            .unwrap();
        at_war(&mut game, a, b);
        game.refresh_visibility(a, &mut Vec::new());

        act(&mut game, sword, &mut Vec::new());
        assert_eq!(game.unit(sword).unwrap().position, HexCoord::new(3, 5));
        assert!(game.unit(warrior).map_or(true, |u| u.health < 100));
    }

    #[test]
    fn test_garrisons_undefended_settlement() {
        let (mut game, a, _) = two_empires();
        let settler = game
            .spawn_unit(a, UnitType::Settler, HexCoord::new(5, 5), &mut Vec::new())
            .unwrap();
        game.found_settlement(settler, &mut Vec::new()).unwrap();
        game.grid.tile_at_mut(HexCoord::new(6, 5)).unwrap().terrain = Terrain::Hills;

        let spear = game
            .spawn_unit(a, UnitType::Spearman, HexCoord::new(7, 5), &mut Vec::new())
            .unwrap();
        act(&mut game, spear, &mut Vec::new());
        let unit = game.unit(spear).unwrap();
        assert_eq!(unit.position, HexCoord::new(6, 5));
        assert!(unit.fortified);

        // Stays put next turn
        game.unit_mut(spear).unwrap().refresh();
        act(&mut game, spear, &mut Vec::new());
        assert_eq!(game.unit(spear).unwrap().position, HexCoord::new(6, 5));
    }

    #[test]
    fn test_captures_fallen_settlement() {
        let (mut game, a, b) = two_empires();
        let settler = game
            .spawn_unit(b, UnitType::Settler, HexCoord::new(8, 5), &mut Vec::new())
            .unwrap();
        let target = game.found_settlement(settler, &mut Vec::new()).unwrap();
        game.settlement_mut(target).unwrap().hp = 0;
        let sword = game
            .spawn_unit(a, UnitType::Swordsman, HexCoord::new(7, 5), &mut Vec::new())
            .unwrap();
        at_war(&mut game, a, b);

        assert!(try_attack(&mut game, sword, &mut Vec::new()));
        assert_eq!(game.settlement_owner(target), Some(a));
        assert_eq!(game.unit(sword).unwrap().position, HexCoord::new(8, 5));
    }

    #[test]
    fn test_settlement_fires_on_intruder() {
        let (mut game, a, b) = two_empires();
        let settler = game
            .spawn_unit(a, UnitType::Settler, HexCoord::new(5, 5), &mut Vec::new())
            .unwrap();
        let s = game.found_settlement(settler, &mut Vec::new()).unwrap();
        let raider = game
            .spawn_unit(b, UnitType::Warrior, HexCoord::new(7, 5), &mut Vec::new())
            .unwrap();
        at_war(&mut game, a, b);

        settlement_fire(&mut game, a, &mut Vec::new());
        assert!(game.unit(raider).map_or(true, |u| u.health < 100));
        assert!(game.settlement(s).unwrap().has_attacked);
    }

    #[test]
    fn test_auto_promote_spends_levels() {
        let (mut game, a, _) = two_empires();
        let warrior = game
            .spawn_unit(a, UnitType::Warrior, HexCoord::new(1, 1), &mut Vec::new())
            .unwrap();
        game.unit_mut(warrior).unwrap().xp = 35;
        auto_promote(&mut game, warrior, &mut Vec::new());
        let unit = game.unit(warrior).unwrap();
        assert_eq!(unit.promotions.len(), 2);
        assert_eq!(unit.pending_promotions(), 0);
        assert_eq!(unit.promotions[0], PromotionId::Shock1);
    }
}
