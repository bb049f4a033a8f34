//! Research, policy and government choices

use tracing::{debug, warn};

use crate::ai::personality::Personality;
use crate::core::types::EmpireId;
use crate::entities::Empire;
use crate::events::EventSink;
use crate::game::GameState;
use crate::rules::{available_techs, BuildingKind, TechId, UnitType};

fn unlocks_science(tech: TechId) -> bool {
    BuildingKind::SCIENCE.iter().any(|b| b.stats().tech == Some(tech))
}

fn unlocks_military(tech: TechId) -> bool {
    UnitType::MILITARY.iter().any(|u| u.stats().tech == Some(tech))
}

fn cheapest(techs: impl Iterator<Item = TechId>) -> Option<TechId> {
    techs.min_by(|a, b| a.cost().total_cmp(&b.cost()))
}

/// Cheapest available tech, unless the personality has a favourite category
/// on offer
pub fn choose_research(empire: &Empire) -> Option<TechId> {
    let available = available_techs(&empire.research.unlocked);
    let favourite: Option<fn(TechId) -> bool> = match empire.personality {
        Personality::Scientist => Some(unlocks_science),
        Personality::Aggressive => Some(unlocks_military),
        Personality::Builder | Personality::Balanced => None,
    };
    favourite
        .and_then(|f| cheapest(available.iter().copied().filter(|t| f(*t))))
        .or_else(|| cheapest(available.into_iter()))
}

/// Start research when nothing is being studied
pub fn pick_research(game: &mut GameState, id: EmpireId) {
    let Ok(empire) = game.empire(id) else {
        return;
    };
    if empire.research.current.is_some() {
        return;
    }
    let Some(tech) = choose_research(empire) else {
        return;
    };
    debug!("{} starts researching {:?}", id, tech);
    if let Err(e) = game.set_research(id, tech) {
        warn!("{} could not research {:?}: {}", id, tech, e);
    }
}

/// Adopt the preferred affordable policy and move toward the preferred
/// government
pub fn manage_civics(game: &mut GameState, id: EmpireId, sink: &mut dyn EventSink) {
    let Ok(empire) = game.empire(id) else {
        return;
    };
    let personality = empire.personality;
    let culture = empire.culture;

    let cost = game.next_policy_cost(id);
    if culture >= cost {
        let adoptable = game.adoptable_policies(id);
        if let Some(policy) = personality
            .policy_preference()
            .iter()
            .copied()
            .find(|p| adoptable.contains(p))
        {
            if let Err(e) = game.adopt_policy(id, policy, sink) {
                warn!("{} could not adopt {:?}: {}", id, policy, e);
            }
        }
    }

    let Ok(empire) = game.empire(id) else {
        return;
    };
    if empire.in_anarchy() {
        return;
    }
    let current = empire.government;
    let target = personality
        .government_preference()
        .iter()
        .copied()
        .find(|g| empire.research.satisfies(g.tech()));
    if let Some(government) = target.filter(|g| *g != current) {
        if let Err(e) = game.change_government(id, government, sink) {
            warn!("{} could not switch to {:?}: {}", id, government, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::core::types::Controller;
    use crate::grid::{Terrain, WorldGrid};
    use crate::rules::{Government, PolicyKind};

    fn setup(personality: Personality) -> (GameState, EmpireId) {
        let mut game = GameState::new(WorldGrid::filled(4, 4, Terrain::Plains), GameConfig::default(), 1);
        let a = game.add_empire("Red", Controller::Ai);
        game.empire_mut(a).unwrap().personality = personality;
        (game, a)
    }

    #[test]
    fn test_first_tech_is_the_only_root() {
        let (mut game, a) = setup(Personality::Balanced);
        pick_research(&mut game, a);
        assert_eq!(game.empire(a).unwrap().research.current, Some(TechId::Agriculture));
    }

    #[test]
    fn test_personality_prefers_its_category() {
        let (mut game, a) = setup(Personality::Aggressive);
        game.empire_mut(a).unwrap().research.unlocked.insert(TechId::Agriculture);
        let choice = choose_research(game.empire(a).unwrap()).unwrap();
        assert!(unlocks_military(choice));

        let (mut game, a) = setup(Personality::Scientist);
        let unlocked = &mut game.empire_mut(a).unwrap().research.unlocked;
        unlocked.extend([TechId::Agriculture, TechId::Pottery]);
        assert_eq!(choose_research(game.empire(a).unwrap()), Some(TechId::Writing));
    }

    #[test]
    fn test_adopts_preferred_policy() {
        let (mut game, a) = setup(Personality::Aggressive);
        game.empire_mut(a).unwrap().culture = 30.0;
        manage_civics(&mut game, a, &mut Vec::new());
        let empire = game.empire(a).unwrap();
        assert!(empire.policies.contains(&PolicyKind::Honor));
        assert_eq!(empire.culture, 5.0);
    }

    #[test]
    fn test_switches_government_when_known() {
        let (mut game, a) = setup(Personality::Aggressive);
        manage_civics(&mut game, a, &mut Vec::new());
        assert_eq!(game.empire(a).unwrap().government, Government::Despotism);

        game.empire_mut(a).unwrap().research.unlocked.insert(TechId::Calendar);
        manage_civics(&mut game, a, &mut Vec::new());
        let empire = game.empire(a).unwrap();
        assert_eq!(empire.government, Government::Monarchy);
        assert!(empire.in_anarchy());
    }
}
