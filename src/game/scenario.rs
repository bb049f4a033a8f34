//! Scenario files: an ASCII map, tuning overrides and starting empires
//!
//! ```toml
//! seed = 7
//! map = """
//! g g p hF
//! c g g:wheat m
//! """
//!
//! [[empires]]
//! name = "Red"
//! personality = "aggressive"
//! start = { q = 1, r = 0 }
//! units = ["Settler", "Warrior", "Scout"]
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::ai::Personality;
use crate::core::config::GameConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::Controller;
use crate::events::EventSink;
use crate::game::GameState;
use crate::grid::{GridProvider, HexCoord, WorldGrid};
use crate::rules::UnitType;

fn default_units() -> Vec<UnitType> {
    vec![UnitType::Settler, UnitType::Warrior, UnitType::Scout]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmpireSetup {
    pub name: String,
    /// Falls back to the rotation by empire id
    #[serde(default)]
    pub personality: Option<Personality>,
    pub start: HexCoord,
    #[serde(default = "default_units")]
    pub units: Vec<UnitType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub seed: u64,
    pub map: String,
    #[serde(default)]
    pub config: GameConfig,
    pub empires: Vec<EmpireSetup>,
}

impl Scenario {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(contents)?;
        scenario.config.validate().map_err(GameError::Config)?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Build the starting state with every empire under AI control
    pub fn build(&self, sink: &mut dyn EventSink) -> Result<GameState> {
        let grid = WorldGrid::from_ascii(&self.map)?;
        for setup in &self.empires {
            let tile = grid.tile_at(setup.start).ok_or(GameError::TileNotFound(setup.start))?;
            if tile.is_water() || tile.is_impassable() {
                return Err(GameError::InvalidAction(format!(
                    "{} cannot start on {:?}",
                    setup.name, setup.start
                )));
            }
        }

        let mut game = GameState::new(grid, self.config.clone(), self.seed);
        for setup in &self.empires {
            let id = game.add_empire(setup.name.clone(), Controller::Ai);
            if let Some(personality) = setup.personality {
                game.empire_mut(id)?.personality = personality;
            }
            for kind in &setup.units {
                game.spawn_unit(id, *kind, setup.start, sink)?;
            }
        }
        info!(
            "scenario ready: {} tiles, {} empires, seed {}",
            game.grid.len(),
            game.empires.len(),
            self.seed
        );
        Ok(game)
    }
}
