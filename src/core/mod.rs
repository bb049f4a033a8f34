pub mod config;
pub mod error;
pub mod serde_pairs;
pub mod types;

pub use config::{AiConfig, CombatConfig, DiplomacyConfig, EconomyConfig, GameConfig};
pub use error::{GameError, Result};
pub use types::{Controller, EmpireId, EmpirePair, GameRng, SettlementId, UnitId};
