//! Great people: generals ride with the army, everyone else is spent at
//! the capital

use tracing::debug;

use crate::core::types::UnitId;
use crate::events::EventSink;
use crate::game::GameState;
use crate::rules::GreatPersonKind;

fn use_at_capital(game: &mut GameState, id: UnitId, sink: &mut dyn EventSink) {
    let Some(unit) = game.unit(id) else {
        return;
    };
    let Some(capital) = game
        .empires
        .get(&unit.owner)
        .and_then(|e| e.capital())
        .map(|s| s.position)
    else {
        return;
    };

    let mut at = unit.position;
    if at != capital {
        match game.move_unit(id, capital, sink) {
            Ok(reached) => at = reached,
            Err(e) => {
                debug!("{} cannot reach the capital: {}", id, e);
                return;
            }
        }
    }
    if at == capital {
        if let Err(e) = game.use_great_person(id, sink) {
            debug!("{} waits at the capital: {}", id, e);
        }
    }
}

fn follow_army(game: &mut GameState, id: UnitId, sink: &mut dyn EventSink) {
    let Some(unit) = game.unit(id) else {
        return;
    };
    let here = unit.position;
    let Some(escort) = game.empires.get(&unit.owner).and_then(|e| {
        e.units
            .values()
            .filter(|u| u.is_combatant() && !u.kind.is_naval())
            .min_by_key(|u| (u.position.distance(&here), u.id))
            .map(|u| u.position)
    }) else {
        return;
    };
    if escort != here {
        debug!("{} follows the army to {:?}", id, escort);
        if let Err(e) = game.move_unit(id, escort, sink) {
            debug!("{} cannot follow the army to {:?}: {}", id, escort, e);
        }
    }
}

pub fn act(game: &mut GameState, id: UnitId, kind: GreatPersonKind, sink: &mut dyn EventSink) {
    match kind {
        GreatPersonKind::General => follow_army(game, id, sink),
        GreatPersonKind::Scientist
        | GreatPersonKind::Engineer
        | GreatPersonKind::Merchant
        | GreatPersonKind::Artist => use_at_capital(game, id, sink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::core::types::{Controller, EmpireId};
    use crate::grid::{HexCoord, Terrain, WorldGrid};
    use crate::rules::UnitType;

    fn founded() -> (GameState, EmpireId) {
        let mut game = GameState::new(WorldGrid::filled(10, 10, Terrain::Grassland), GameConfig::default(), 3);
        let a = game.add_empire("Red", Controller::Ai);
        let settler = game
            .spawn_unit(a, UnitType::Settler, HexCoord::new(2, 2), &mut Vec::new())
            .unwrap();
        game.found_settlement(settler, &mut Vec::new()).unwrap();
        (game, a)
    }

    #[test]
    fn test_merchant_walks_home_and_pays_out() {
        let (mut game, a) = founded();
        let merchant = game
            .spawn_unit(a, UnitType::GreatMerchant, HexCoord::new(4, 2), &mut Vec::new())
            .unwrap();
        act(&mut game, merchant, GreatPersonKind::Merchant, &mut Vec::new());
        assert!(game.unit(merchant).is_none());
        assert_eq!(game.empire(a).unwrap().gold, 150.0);
    }

    #[test]
    fn test_general_joins_nearest_soldier() {
        let (mut game, a) = founded();
        let general = game
            .spawn_unit(a, UnitType::GreatGeneral, HexCoord::new(2, 2), &mut Vec::new())
            .unwrap();
        game.spawn_unit(a, UnitType::Warrior, HexCoord::new(3, 3), &mut Vec::new())
            .unwrap();
        act(&mut game, general, GreatPersonKind::General, &mut Vec::new());
        assert_eq!(game.unit(general).unwrap().position, HexCoord::new(3, 3));
    }
}
