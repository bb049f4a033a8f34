use thiserror::Error;

use crate::core::types::{EmpireId, SettlementId, UnitId};
use crate::grid::HexCoord;

/// Every failure in the core is local and recoverable; the caller picks another action.
#[derive(Error, Debug)]
pub enum GameError {
    // Invalid target
    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    #[error("Settlement not found: {0}")]
    SettlementNotFound(SettlementId),

    #[error("Empire not found: {0}")]
    EmpireNotFound(EmpireId),

    #[error("No tile at {0:?}")]
    TileNotFound(HexCoord),

    #[error("Target at distance {distance} is out of range {range}")]
    OutOfRange { distance: i32, range: i32 },

    #[error("{0} and {1} are not at war")]
    NotHostile(EmpireId, EmpireId),

    #[error("{0} has no attacks left this turn")]
    NoAttacksLeft(UnitId),

    #[error("{0} has no movement left this turn")]
    NoMovementLeft(UnitId),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    // Unsatisfied prerequisite
    #[error("Prerequisite missing: {0}")]
    PrerequisiteMissing(String),

    // State machine violations
    #[error("A peace treaty between {0} and {1} is still active")]
    PeaceTreatyActive(EmpireId, EmpireId),

    #[error("War has lasted {turns} turns, {required} required before peace")]
    WarTooShort { turns: u32, required: u32 },

    #[error("{0} and {1} are not at war")]
    NotAtWar(EmpireId, EmpireId),

    #[error("{0} and {1} are already at war")]
    AlreadyAtWar(EmpireId, EmpireId),

    #[error("{0} and {1} have not met")]
    NotMet(EmpireId, EmpireId),

    #[error("Invalid diplomatic transition: {0}")]
    InvalidTransition(String),

    // Loading and persistence
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Map parse error: {0}")]
    MapParse(String),
}

pub type Result<T> = std::result::Result<T, GameError>;
