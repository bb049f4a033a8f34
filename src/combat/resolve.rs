//! Applying a fight to the game state
//!
//! Validation happens first and touches nothing; only a fully validated
//! pairing is resolved, and then every effect is applied in one pass.

use tracing::debug;

use crate::combat::modifiers::{compute_damage, effective_strengths, Battleground, Fighter};
use crate::core::error::{GameError, Result};
use crate::core::types::{EmpireId, SettlementId, UnitId};
use crate::entities::Unit;
use crate::events::{Combatant, EventSink, GameEvent};
use crate::game::GameState;
use crate::grid::{GridProvider, HexCoord};
use crate::rules::{GreatPersonKind, UnitRole};

/// Range of a settlement's own bombardment
pub const SETTLEMENT_BOMBARD_RANGE: i32 = 2;

/// What happened in one fight, damages as applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatOutcome {
    pub attacker_damage: i32,
    pub defender_damage: i32,
    pub ranged: bool,
    pub attacker_killed: bool,
    pub defender_killed: bool,
    /// The defending settlement is out of HP and may be captured
    pub capturable: bool,
}

impl GameState {
    /// Combat bonus from the owner's government, policies and golden age
    fn empire_combat_bonus(&self, owner: EmpireId) -> f32 {
        self.empires
            .get(&owner)
            .map_or(0.0, |e| e.modifiers(self.config.economy.golden_age_bonus).combat)
    }

    /// A friendly great general stands within the aura radius of `at`
    pub fn general_nearby(&self, owner: EmpireId, at: HexCoord) -> bool {
        let radius = self.config.combat.great_general_radius;
        self.empires.get(&owner).is_some_and(|e| {
            e.units.values().any(|u| {
                u.role() == UnitRole::GreatPerson(GreatPersonKind::General) && u.position.distance(&at) <= radius
            })
        })
    }

    fn unit_fighter(&self, unit: &Unit) -> Fighter {
        Fighter::from_unit(
            unit,
            self.empire_combat_bonus(unit.owner),
            self.general_nearby(unit.owner, unit.position),
        )
    }

    /// Attack `target` with a unit.
    ///
    /// Ranged units fire whenever the target is within range and take no
    /// damage; everything else must be adjacent and trades blows. A target
    /// settlement loses HP at a multiple of the computed damage and is never
    /// destroyed, only left capturable.
    pub fn attack(&mut self, attacker: UnitId, target: Combatant, sink: &mut dyn EventSink) -> Result<CombatOutcome> {
        let unit = self.unit(attacker).ok_or(GameError::UnitNotFound(attacker))?.clone();
        if !unit.is_combatant() {
            return Err(GameError::InvalidAction(format!("{} cannot fight", attacker)));
        }
        if unit.attacks_this_turn >= unit.max_attacks() {
            return Err(GameError::NoAttacksLeft(attacker));
        }
        if unit.movement_left <= 0.0 {
            return Err(GameError::NoMovementLeft(attacker));
        }

        let (defender_owner, target_pos, defender) = match target {
            Combatant::Unit(id) => {
                let target = self.unit(id).ok_or(GameError::UnitNotFound(id))?;
                (target.owner, target.position, self.unit_fighter(target))
            }
            Combatant::Settlement(id) => {
                let s = self.settlement(id).ok_or(GameError::SettlementNotFound(id))?;
                if s.hp <= 0 {
                    return Err(GameError::InvalidAction(format!("{} is already defenseless", id)));
                }
                let fighter = Fighter::from_settlement(
                    s,
                    self.empire_combat_bonus(s.owner),
                    self.general_nearby(s.owner, s.position),
                );
                (s.owner, s.position, fighter)
            }
        };

        if defender_owner == unit.owner || !self.diplomacy.is_at_war(unit.owner, defender_owner) {
            return Err(GameError::NotHostile(unit.owner, defender_owner));
        }

        let distance = unit.position.distance(&target_pos);
        let ranged = match unit.ranged() {
            Some(profile) if distance <= profile.range => true,
            Some(profile) => {
                return Err(GameError::OutOfRange {
                    distance,
                    range: profile.range,
                })
            }
            None if distance == 1 => false,
            None => return Err(GameError::OutOfRange { distance, range: 1 }),
        };

        let tile = self.grid.tile_at(target_pos).ok_or(GameError::TileNotFound(target_pos))?;
        if !ranged && !self.unit_profile(&unit).can_enter(tile) {
            return Err(GameError::InvalidAction(format!(
                "{} cannot reach {:?} to fight",
                attacker, target_pos
            )));
        }
        let ground = Battleground::from_tile(tile);
        let attacker_fighter = self.unit_fighter(&unit);

        // Everything below mutates; nothing below can fail
        let config = self.config.combat.clone();
        let (a_strength, d_strength) = effective_strengths(&attacker_fighter, &defender, &ground, ranged, &config);
        let damage = compute_damage(a_strength, d_strength, &config);
        debug!(
            "{} ({:.1}) attacks {:?} ({:.1}){}",
            attacker,
            a_strength,
            target,
            d_strength,
            if ranged { " at range" } else { "" }
        );

        let attacker_damage = if ranged { 0 } else { damage.to_attacker.round() as i32 };
        let mut defender_damage = damage.to_defender.round() as i32;
        let involves_settlement = matches!(target, Combatant::Settlement(_));
        let xp = if involves_settlement {
            config.settlement_xp
        } else {
            config.unit_xp
        };

        let mut outcome = CombatOutcome {
            attacker_damage,
            defender_damage: 0,
            ranged,
            attacker_killed: false,
            defender_killed: false,
            capturable: false,
        };

        match target {
            Combatant::Unit(id) => {
                let defender_xp = (xp as f32 * config.defender_xp_share).round() as u32;
                if let Some(d) = self.unit_mut(id) {
                    d.health -= defender_damage;
                    d.xp += defender_xp;
                    outcome.defender_killed = d.is_dead();
                }
                self.add_general_points(defender_owner, defender_xp);
            }
            Combatant::Settlement(id) => {
                let multiplier = if ranged {
                    config.settlement_ranged_multiplier
                } else {
                    config.settlement_melee_multiplier
                };
                defender_damage = (damage.to_defender * multiplier).round() as i32;
                if let Some(s) = self.settlement_mut(id) {
                    s.hp = (s.hp - defender_damage).max(0);
                    outcome.capturable = s.hp <= 0;
                }
            }
        }
        outcome.defender_damage = defender_damage;

        if let Some(a) = self.unit_mut(attacker) {
            a.health -= attacker_damage;
            a.xp += xp;
            a.attacks_this_turn += 1;
            a.fortified = false;
            a.spend_movement(1.0);
            outcome.attacker_killed = a.is_dead();
        }
        self.add_general_points(unit.owner, xp);

        sink.emit(GameEvent::CombatResolved {
            attacker: Combatant::Unit(attacker),
            defender: target,
            attacker_damage,
            defender_damage,
            ranged,
        });

        if outcome.defender_killed {
            if let Combatant::Unit(id) = target {
                self.kill_unit(id, Some(unit.owner), sink);
            }
        }
        if outcome.attacker_killed {
            self.kill_unit(attacker, Some(defender_owner), sink);
        }
        Ok(outcome)
    }

    /// A settlement fires on an enemy unit within range, once per turn.
    /// The settlement takes no damage and nobody gains experience.
    pub fn bombard(&mut self, settlement: SettlementId, target: UnitId, sink: &mut dyn EventSink) -> Result<CombatOutcome> {
        let s = self.settlement(settlement).ok_or(GameError::SettlementNotFound(settlement))?;
        if s.has_attacked {
            return Err(GameError::NoAttacksLeft(target));
        }
        if s.hp <= 0 {
            return Err(GameError::InvalidAction(format!("{} has no HP to fight with", settlement)));
        }
        let owner = s.owner;
        let origin = s.position;
        let attacker = Fighter::from_settlement(s, self.empire_combat_bonus(owner), self.general_nearby(owner, origin));

        let victim = self.unit(target).ok_or(GameError::UnitNotFound(target))?;
        if victim.owner == owner || !self.diplomacy.is_at_war(owner, victim.owner) {
            return Err(GameError::NotHostile(owner, victim.owner));
        }
        let distance = origin.distance(&victim.position);
        if distance > SETTLEMENT_BOMBARD_RANGE {
            return Err(GameError::OutOfRange {
                distance,
                range: SETTLEMENT_BOMBARD_RANGE,
            });
        }
        let victim_owner = victim.owner;
        let tile = self
            .grid
            .tile_at(victim.position)
            .ok_or(GameError::TileNotFound(victim.position))?;
        let ground = Battleground::from_tile(tile);
        let defender = self.unit_fighter(victim);

        let config = self.config.combat.clone();
        let (a_strength, d_strength) = effective_strengths(&attacker, &defender, &ground, true, &config);
        let defender_damage = compute_damage(a_strength, d_strength, &config).to_defender.round() as i32;
        debug!("{} bombards {} for {}", settlement, target, defender_damage);

        let mut outcome = CombatOutcome {
            attacker_damage: 0,
            defender_damage,
            ranged: true,
            attacker_killed: false,
            defender_killed: false,
            capturable: false,
        };
        if let Some(s) = self.settlement_mut(settlement) {
            s.has_attacked = true;
        }
        if let Some(u) = self.unit_mut(target) {
            u.health -= defender_damage;
            outcome.defender_killed = u.is_dead();
        }

        sink.emit(GameEvent::CombatResolved {
            attacker: Combatant::Settlement(settlement),
            defender: Combatant::Unit(target),
            attacker_damage: 0,
            defender_damage,
            ranged: true,
        });
        if outcome.defender_killed {
            self.kill_unit(target, Some(owner), sink);
        }
        debug!("{} now faces {} with {:?}", owner, victim_owner, outcome);
        Ok(outcome)
    }

    /// Combat experience also feeds the empire's great general pool
    fn add_general_points(&mut self, owner: EmpireId, xp: u32) {
        if let Some(pool) = self
            .empires
            .get_mut(&owner)
            .and_then(|e| e.great_people.get_mut(&GreatPersonKind::General))
        {
            pool.points += xp as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::core::types::Controller;
    use crate::grid::{Terrain, WorldGrid};
    use crate::rules::UnitType;

    struct Setup {
        game: GameState,
        a: EmpireId,
        b: EmpireId,
    }

    fn setup(at_war: bool) -> Setup {
        let mut game = GameState::new(WorldGrid::filled(12, 12, Terrain::Grassland), GameConfig::default(), 5);
        let a = game.add_empire("Red", Controller::Ai);
        let b = game.add_empire("Blue", Controller::Ai);
        game.diplomacy.meet(a, b, &mut Vec::new());
        if at_war {
            let config = game.config.diplomacy.clone();
            game.diplomacy.declare_war(a, b, &config, &mut Vec::new()).unwrap();
        }
        Setup { game, a, b }
    }

    fn spawn(game: &mut GameState, owner: EmpireId, kind: UnitType, q: i32, r: i32) -> UnitId {
        game.spawn_unit(owner, kind, HexCoord::new(q, r), &mut Vec::new()).unwrap()
    }

    #[test]
    fn test_equal_melee_trades_damage() {
        let Setup { mut game, a, b } = setup(true);
        let attacker = spawn(&mut game, a, UnitType::Warrior, 3, 3);
        let defender = spawn(&mut game, b, UnitType::Warrior, 4, 3);

        let mut events = Vec::new();
        let outcome = game.attack(attacker, Combatant::Unit(defender), &mut events).unwrap();
        assert_eq!(outcome.attacker_damage, 15);
        assert_eq!(outcome.defender_damage, 15);
        assert_eq!(game.unit(attacker).unwrap().health, 85);
        assert_eq!(game.unit(defender).unwrap().health, 85);
        assert_eq!(game.unit(attacker).unwrap().xp, 5);
        assert_eq!(game.unit(defender).unwrap().xp, 4);
        assert_eq!(game.unit(attacker).unwrap().attacks_this_turn, 1);
        assert!(events.iter().any(|e| matches!(e, GameEvent::CombatResolved { ranged: false, .. })));
    }

    #[test]
    fn test_ranged_attacker_is_untouched() {
        let Setup { mut game, a, b } = setup(true);
        game.empire_mut(a).unwrap().research.unlocked.insert(crate::rules::TechId::Archery);
        let archer = spawn(&mut game, a, UnitType::Archer, 3, 3);
        let target = spawn(&mut game, b, UnitType::Warrior, 5, 3);

        let outcome = game.attack(archer, Combatant::Unit(target), &mut Vec::new()).unwrap();
        assert!(outcome.ranged);
        assert_eq!(outcome.attacker_damage, 0);
        assert_eq!(game.unit(archer).unwrap().health, 100);
        // 7 vs 8 on open ground
        assert_eq!(outcome.defender_damage, 14);
    }

    #[test]
    fn test_invalid_pairings_mutate_nothing() {
        let Setup { mut game, a, b } = setup(false);
        let attacker = spawn(&mut game, a, UnitType::Warrior, 3, 3);
        let defender = spawn(&mut game, b, UnitType::Warrior, 4, 3);
        let before = game.empires.clone();

        let result = game.attack(attacker, Combatant::Unit(defender), &mut Vec::new());
        assert!(matches!(result, Err(GameError::NotHostile(_, _))));
        assert_eq!(game.empires, before);

        let config = game.config.diplomacy.clone();
        game.diplomacy.declare_war(a, b, &config, &mut Vec::new()).unwrap();
        let far = spawn(&mut game, b, UnitType::Warrior, 8, 8);
        let before_far = game.empires.clone();
        let result = game.attack(attacker, Combatant::Unit(far), &mut Vec::new());
        assert!(matches!(result, Err(GameError::OutOfRange { .. })));
        assert_eq!(game.empires, before_far);

        let result = game.attack(attacker, Combatant::Unit(UnitId(999)), &mut Vec::new());
        assert!(matches!(result, Err(GameError::UnitNotFound(_))));
        assert_eq!(game.empires, before_far);
    }

    #[test]
    fn test_attacks_are_capped() {
        let Setup { mut game, a, b } = setup(true);
        let attacker = spawn(&mut game, a, UnitType::Warrior, 3, 3);
        let defender = spawn(&mut game, b, UnitType::Warrior, 4, 3);
        game.attack(attacker, Combatant::Unit(defender), &mut Vec::new()).unwrap();
        let again = game.attack(attacker, Combatant::Unit(defender), &mut Vec::new());
        assert!(matches!(again, Err(GameError::NoAttacksLeft(_))));
    }

    #[test]
    fn test_killed_defender_removed_once() {
        let Setup { mut game, a, b } = setup(true);
        let attacker = spawn(&mut game, a, UnitType::Warrior, 3, 3);
        let defender = spawn(&mut game, b, UnitType::Warrior, 4, 3);
        spawn(&mut game, b, UnitType::Scout, 10, 10);
        game.unit_mut(defender).unwrap().health = 10;

        let mut events = Vec::new();
        let outcome = game.attack(attacker, Combatant::Unit(defender), &mut events).unwrap();
        assert!(outcome.defender_killed);
        assert!(game.unit(defender).is_none());
        let kills = events
            .iter()
            .filter(|e| matches!(e, GameEvent::UnitKilled { unit, .. } if *unit == defender))
            .count();
        assert_eq!(kills, 1);
        assert!(!game.empire(b).unwrap().eliminated);
    }

    #[test]
    fn test_settlement_takes_scaled_damage_and_becomes_capturable() {
        let Setup { mut game, a, b } = setup(true);
        let settler = spawn(&mut game, b, UnitType::Settler, 5, 5);
        let target = game.found_settlement(settler, &mut Vec::new()).unwrap();
        let attacker = spawn(&mut game, a, UnitType::Warrior, 4, 5);

        // Defense 10 at full HP vs 8: defender damage 8/18*30 = 13.3 -> 26.7 HP
        let outcome = game
            .attack(attacker, Combatant::Settlement(target), &mut Vec::new())
            .unwrap();
        assert_eq!(outcome.defender_damage, 27);
        assert_eq!(game.settlement(target).unwrap().hp, 173);
        assert_eq!(game.unit(attacker).unwrap().xp, 8);
        assert!(!outcome.capturable);

        game.settlement_mut(target).unwrap().hp = 10;
        game.unit_mut(attacker).unwrap().refresh();
        let outcome = game
            .attack(attacker, Combatant::Settlement(target), &mut Vec::new())
            .unwrap();
        assert!(outcome.capturable);
        assert_eq!(game.settlement(target).unwrap().hp, 0);
        assert!(game.settlement(target).is_some());
    }

    #[test]
    fn test_general_aura_and_points() {
        let Setup { mut game, a, b } = setup(true);
        let attacker = spawn(&mut game, a, UnitType::Warrior, 3, 3);
        let defender = spawn(&mut game, b, UnitType::Warrior, 4, 3);
        spawn(&mut game, a, UnitType::GreatGeneral, 2, 3);
        assert!(game.general_nearby(a, HexCoord::new(3, 3)));

        let outcome = game.attack(attacker, Combatant::Unit(defender), &mut Vec::new()).unwrap();
        // 9.2 vs 8
        assert_eq!(outcome.defender_damage, 16);
        assert_eq!(outcome.attacker_damage, 14);
        let pool = game.empire(a).unwrap().great_people[&GreatPersonKind::General];
        assert_eq!(pool.points, 5.0);
    }

    #[test]
    fn test_bombard_once_per_turn() {
        let Setup { mut game, a, b } = setup(true);
        let settler = spawn(&mut game, a, UnitType::Settler, 5, 5);
        let city = game.found_settlement(settler, &mut Vec::new()).unwrap();
        let target = spawn(&mut game, b, UnitType::Warrior, 7, 5);

        let outcome = game.bombard(city, target, &mut Vec::new()).unwrap();
        assert!(outcome.defender_damage >= 5);
        assert_eq!(game.unit(target).unwrap().health, 100 - outcome.defender_damage);
        assert!(game.bombard(city, target, &mut Vec::new()).is_err());
    }
}
