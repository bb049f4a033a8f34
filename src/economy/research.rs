//! Research, eras, policies and governments

use tracing::info;

use crate::core::error::{GameError, Result};
use crate::core::types::EmpireId;
use crate::events::{EventSink, GameEvent};
use crate::game::GameState;
use crate::rules::{era_of, policy_cost, Government, PolicyKind, TechId};

impl GameState {
    /// Pick the tech an empire researches next
    pub fn set_research(&mut self, id: EmpireId, tech: TechId) -> Result<()> {
        let empire = self.empire_mut(id)?;
        if empire.research.has(tech) {
            return Err(GameError::InvalidAction(format!("{} already knows {:?}", id, tech)));
        }
        if !tech.is_available(&empire.research.unlocked) {
            return Err(GameError::PrerequisiteMissing(format!("{:?} needs {:?}", tech, tech.prerequisites())));
        }
        empire.research.current = Some(tech);
        Ok(())
    }

    /// Add science; completes the current tech once its cost is paid.
    /// Leftover science carries into the next tech.
    pub fn advance_research(&mut self, id: EmpireId, science: f32, sink: &mut dyn EventSink) -> Option<TechId> {
        let empire = self.empires.get_mut(&id)?;
        empire.research.progress += science;
        empire.science_total += science;

        let tech = empire.research.current?;
        if empire.research.progress < tech.cost() {
            return None;
        }
        empire.research.progress -= tech.cost();
        empire.research.unlocked.insert(tech);
        empire.research.current = None;
        info!("{} discovered {:?}", id, tech);
        sink.emit(GameEvent::TechCompleted { empire: id, tech });

        let era = era_of(&empire.research.unlocked);
        if era > empire.era {
            empire.era = era;
            info!("{} entered the {:?} era", id, era);
            sink.emit(GameEvent::EraEntered { empire: id, era });
        }
        self.refresh_resources(id);
        Some(tech)
    }

    /// Culture needed for an empire's next policy
    pub fn next_policy_cost(&self, id: EmpireId) -> f32 {
        let adopted = self.empires.get(&id).map_or(0, |e| e.policies.len());
        policy_cost(
            adopted,
            self.config.economy.policy_base_cost,
            self.config.economy.policy_cost_growth,
        )
    }

    /// Policies the empire could adopt right now, ignoring cost
    pub fn adoptable_policies(&self, id: EmpireId) -> Vec<PolicyKind> {
        let Some(empire) = self.empires.get(&id) else {
            return Vec::new();
        };
        PolicyKind::ALL
            .into_iter()
            .filter(|p| !empire.policies.contains(p))
            .filter(|p| p.prerequisite().map_or(true, |req| empire.policies.contains(&req)))
            .collect()
    }

    /// Spend stored culture on a policy
    pub fn adopt_policy(&mut self, id: EmpireId, policy: PolicyKind, sink: &mut dyn EventSink) -> Result<()> {
        let cost = self.next_policy_cost(id);
        let empire = self.empire_mut(id)?;
        if empire.policies.contains(&policy) {
            return Err(GameError::InvalidAction(format!("{} already follows {:?}", id, policy)));
        }
        if let Some(req) = policy.prerequisite().filter(|req| !empire.policies.contains(req)) {
            return Err(GameError::PrerequisiteMissing(format!("{:?} needs {:?}", policy, req)));
        }
        if empire.culture < cost {
            return Err(GameError::PrerequisiteMissing(format!(
                "{:?} costs {} culture, {} stored",
                policy, cost, empire.culture
            )));
        }
        empire.culture -= cost;
        empire.policies.insert(policy);
        info!("{} adopted {:?}", id, policy);
        sink.emit(GameEvent::PolicyAdopted { empire: id, policy });
        Ok(())
    }

    /// Switch government; the empire falls into anarchy for a few turns
    pub fn change_government(&mut self, id: EmpireId, government: Government, sink: &mut dyn EventSink) -> Result<()> {
        let anarchy = self.config.economy.anarchy_turns;
        let empire = self.empire_mut(id)?;
        if empire.government == government {
            return Err(GameError::InvalidAction(format!("{} already has {:?}", id, government)));
        }
        if !empire.research.satisfies(government.tech()) {
            return Err(GameError::PrerequisiteMissing(format!("{:?} needs {:?}", government, government.tech())));
        }
        if empire.in_anarchy() {
            return Err(GameError::InvalidAction(format!("{} is in anarchy", id)));
        }
        empire.government = government;
        empire.anarchy_turns = anarchy;
        info!("{} switched to {:?}", id, government);
        sink.emit(GameEvent::GovernmentChanged { empire: id, government });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::core::types::Controller;
    use crate::grid::{Terrain, WorldGrid};
    use crate::rules::Era;

    fn game() -> (GameState, EmpireId) {
        let mut game = GameState::new(WorldGrid::filled(4, 4, Terrain::Plains), GameConfig::default(), 1);
        let a = game.add_empire("Red", Controller::Ai);
        (game, a)
    }

    #[test]
    fn test_research_completes_and_carries() {
        let (mut game, a) = game();
        game.set_research(a, TechId::Agriculture).unwrap();
        let mut events = Vec::new();
        assert_eq!(game.advance_research(a, 15.0, &mut events), None);
        assert_eq!(game.advance_research(a, 10.0, &mut events), Some(TechId::Agriculture));

        let empire = game.empire(a).unwrap();
        assert!(empire.research.has(TechId::Agriculture));
        assert_eq!(empire.research.current, None);
        assert_eq!(empire.research.progress, 5.0);
        assert_eq!(empire.science_total, 25.0);
        assert!(matches!(events[0], GameEvent::TechCompleted { tech: TechId::Agriculture, .. }));
    }

    #[test]
    fn test_research_requires_prerequisites() {
        let (mut game, a) = game();
        assert!(matches!(
            game.set_research(a, TechId::Education),
            Err(GameError::PrerequisiteMissing(_))
        ));
        assert_eq!(game.empire(a).unwrap().research.current, None);
    }

    #[test]
    fn test_era_advances_with_first_later_tech() {
        let (mut game, a) = game();
        let empire = game.empire_mut(a).unwrap();
        for tech in TechId::ALL.into_iter().filter(|t| t.era() == Era::Ancient) {
            empire.research.unlocked.insert(tech);
        }
        let next = TechId::ALL
            .into_iter()
            .find(|t| t.era() == Era::Classical && t.is_available(&empire.research.unlocked))
            .unwrap();
        game.set_research(a, next).unwrap();

        let mut events = Vec::new();
        game.advance_research(a, next.cost(), &mut events);
        assert_eq!(game.empire(a).unwrap().era, Era::Classical);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::EraEntered { era: Era::Classical, .. })));
    }

    #[test]
    fn test_policy_costs_rise() {
        let (mut game, a) = game();
        game.empire_mut(a).unwrap().culture = 100.0;
        assert!(game.adopt_policy(a, PolicyKind::Piety, &mut Vec::new()).is_err());

        game.adopt_policy(a, PolicyKind::Tradition, &mut Vec::new()).unwrap();
        assert_eq!(game.empire(a).unwrap().culture, 75.0);
        assert_eq!(game.next_policy_cost(a), 38.0);
        assert!(game.adoptable_policies(a).contains(&PolicyKind::Piety));
        assert!(game.adopt_policy(a, PolicyKind::Tradition, &mut Vec::new()).is_err());
    }

    #[test]
    fn test_government_change_starts_anarchy() {
        let (mut game, a) = game();
        assert!(game.change_government(a, Government::Monarchy, &mut Vec::new()).is_err());
        game.empire_mut(a).unwrap().research.unlocked.insert(TechId::Calendar);
        game.change_government(a, Government::Monarchy, &mut Vec::new()).unwrap();

        let empire = game.empire(a).unwrap();
        assert_eq!(empire.government, Government::Monarchy);
        assert_eq!(empire.anarchy_turns, 2);
        assert!(game.change_government(a, Government::Despotism, &mut Vec::new()).is_err());
    }
}
